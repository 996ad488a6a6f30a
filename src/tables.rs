// src/tables.rs

//! Name-rewrite tables
//!
//! Three `key:value` files in the configuration directory map Debian package
//! names to their `Replaces`, `Version` and `Priority` fields. Two further
//! sets are compiled in: packages that implicitly depend on `sunwcs`, and
//! packages that are never converted.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

pub const REPLACES_FILE: &str = "ips2deb.replaces";
pub const VERSIONS_FILE: &str = "ips2deb.versions";
pub const PRIORITIES_FILE: &str = "ips2deb.priorities";

/// Packages that depend on `sunwcs` even though their manifests don't say so
const SPECIAL_PACKAGES: &[&str] = &[
    "system-file-system-zfs",
    "system-file-system-zfs-tests",
    "system-file-system-udfs",
    "system-floating-point-scrubber",
    "system-tnf",
    "diagnostic-cpu-counters",
    "driver-network-eri",
    "compatibility-ucb",
    "diagnostic-powertop",
    "diagnostic-latencytop",
    "network-ipfilter",
    "developer-debug-mdb",
    "system-extended-system-utilities",
    "storage-library-network-array",
    "service-resource-cap",
    "developer-linker",
    "developer-dtrace",
];

/// Packages that are never converted
const IGNORED_PACKAGES: &[&str] = &[
    "consolidation-osnet-osnet-message-files",
    "consolidation-osnet-osnet-incorporation",
    "consolidation-osnet-osnet-redist",
];

/// Whether `name` gets the implicit `sunwcs` dependency
pub fn is_special(name: &str) -> bool {
    SPECIAL_PACKAGES.contains(&name)
}

/// Whether `name` is skipped outright
pub fn is_ignored(name: &str) -> bool {
    IGNORED_PACKAGES.contains(&name)
}

/// Parse `key:value` lines, skipping comments and lines without a colon
pub fn parse_table(content: &str) -> BTreeMap<String, String> {
    content
        .lines()
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// Lookup tables shared by every package in a run
#[derive(Debug, Clone, Default)]
pub struct LookupTables {
    replaces: BTreeMap<String, Vec<String>>,
    versions: BTreeMap<String, String>,
    priorities: BTreeMap<String, String>,
}

impl LookupTables {
    /// Load the three table files from `conf_dir`
    pub fn load(conf_dir: &Path) -> Result<Self> {
        let read = |file: &str| -> Result<BTreeMap<String, String>> {
            let path = conf_dir.join(file);
            let content = std::fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?;
            Ok(parse_table(&content))
        };

        let tables = Self::from_maps(read(REPLACES_FILE)?, read(VERSIONS_FILE)?, read(PRIORITIES_FILE)?);
        debug!(
            "Loaded lookup tables from {}: {} replaces, {} versions, {} priorities",
            conf_dir.display(),
            tables.replaces.len(),
            tables.versions.len(),
            tables.priorities.len()
        );
        Ok(tables)
    }

    /// Build tables from already parsed maps
    pub fn from_maps(
        replaces: BTreeMap<String, String>,
        versions: BTreeMap<String, String>,
        priorities: BTreeMap<String, String>,
    ) -> Self {
        Self {
            replaces: replaces.into_iter().map(|(k, v)| (k, vec![v])).collect(),
            versions,
            priorities,
        }
    }

    /// Record that `renamed` was renamed to `target`, so `target` replaces it
    pub fn record_rename(&mut self, target: &str, renamed: &str) {
        let entry = self.replaces.entry(target.to_string()).or_default();
        if !entry.iter().any(|name| name == renamed) {
            entry.push(renamed.to_string());
        }
    }

    /// Packages `name` replaces
    pub fn replaces(&self, name: &str) -> &[String] {
        self.replaces.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Table version for `name`
    pub fn version(&self, name: &str) -> Option<&str> {
        self.versions.get(name).map(String::as_str)
    }

    /// Table priority for `name`
    pub fn priority(&self, name: &str) -> Option<&str> {
        self.priorities.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table() {
        let table = parse_table(
            "# comment: ignored\nsunwcs:sunwcsd\nno colon here\n  spaced : value \n:empty-key\n",
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("sunwcs").map(String::as_str), Some("sunwcsd"));
        assert_eq!(table.get("spaced").map(String::as_str), Some("value"));
    }

    #[test]
    fn test_value_keeps_later_colons() {
        let table = parse_table("pkg:1.0:extra\n");
        assert_eq!(table.get("pkg").map(String::as_str), Some("1.0:extra"));
    }

    #[test]
    fn test_record_rename_deduplicates() {
        let mut tables = LookupTables::default();
        tables.record_rename("system-library", "sunwcsl");
        tables.record_rename("system-library", "sunwcslr");
        tables.record_rename("system-library", "sunwcsl");
        assert_eq!(tables.replaces("system-library"), ["sunwcsl", "sunwcslr"]);
        assert!(tables.replaces("other").is_empty());
    }

    #[test]
    fn test_special_and_ignored_sets() {
        assert!(is_special("developer-dtrace"));
        assert!(!is_special("sunwcs"));
        assert!(is_ignored("consolidation-osnet-osnet-redist"));
        assert!(!is_ignored("system-kernel"));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(REPLACES_FILE), "system-kernel:sunwckr\n").unwrap();
        std::fs::write(dir.path().join(VERSIONS_FILE), "system-kernel:2.0.0-1\n").unwrap();
        std::fs::write(dir.path().join(PRIORITIES_FILE), "system-kernel:required\n").unwrap();

        let tables = LookupTables::load(dir.path()).unwrap();
        assert_eq!(tables.replaces("system-kernel"), ["sunwckr"]);
        assert_eq!(tables.version("system-kernel"), Some("2.0.0-1"));
        assert_eq!(tables.priority("system-kernel"), Some("required"));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LookupTables::load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
