// src/convert/mod.rs

//! IPS to Debian conversion
//!
//! Conversion runs in two passes over all manifests:
//!
//! 1. Classification decides which manifests become packages. Renamed
//!    packages are not converted; instead the package they were renamed to
//!    gets a `Replaces` entry for them.
//! 2. Generation computes the package metadata, stages the payload under
//!    `debian/<package>/` and collects maintainer script snippets.
//!
//! The second pass only starts once every manifest has been classified so
//! renames found anywhere in the batch reach every package.

pub mod depends;
pub mod scripts;
pub mod stage;

use crate::debian;
use crate::error::{Error, Result};
use crate::manifest::{ActionKind, Fmri, Manifest};
use crate::tables::{self, LookupTables};
use scripts::{MediatorGroup, Scripts, UserSpec, SUNWCS_HARDLINK_SKIP};
use stage::Stager;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

pub const DEFAULT_VERSION: &str = "1.0.0-deb";
pub const DEFAULT_PRIORITY: &str = "optional";
pub const DEFAULT_SECTION: &str = "undef";
pub const DEFAULT_MAINTAINER: &str = "Nexenta Systems <maintainer@nexenta.com>";
pub const DEFAULT_ARCH: &str = "i386";

/// Renamed packages pointing here don't produce Replaces entries
const INCORPORATION: &str = "consolidation-osnet-osnet-incorporation";

/// The core package, which carries a few extra fixups
const SUNWCS: &str = "sunwcs";

/// Settings shared by every package in a run
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Parent of the per-manifest output directories (default: the manifest's directory)
    pub workdir: Option<PathBuf>,
    /// Proto trees searched for payloads
    pub proto_dirs: Vec<PathBuf>,
    /// Debian version override
    pub version: Option<String>,
    /// XBS-Original-Version override
    pub original_version: Option<String>,
    pub maintainer: String,
    pub section: String,
    /// Priority override
    pub priority: Option<String>,
    /// Replaces override
    pub replaces: Option<String>,
    /// Add the `sunwcs` dependency to every package
    pub force_special: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            workdir: None,
            proto_dirs: Vec::new(),
            version: None,
            original_version: None,
            maintainer: DEFAULT_MAINTAINER.to_string(),
            section: DEFAULT_SECTION.to_string(),
            priority: None,
            replaces: None,
            force_special: false,
        }
    }
}

/// Outcome of classifying a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Convert,
    NoFmri,
    Obsolete,
    Consolidation,
    Ignored,
    Renamed,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Disposition::Convert => "to be converted",
            Disposition::NoFmri => "no fmri attribute found",
            Disposition::Obsolete => "package is obsolete",
            Disposition::Consolidation => "package is a consolidation",
            Disposition::Ignored => "package is marked to be ignored",
            Disposition::Renamed => "package is renamed",
        };
        f.write_str(text)
    }
}

/// Control metadata for one generated package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    pub original_name: String,
    pub original_version: String,
    pub architecture: String,
    pub section: String,
    pub priority: String,
    pub maintainer: String,
    pub replaces: Option<String>,
    pub depends: Vec<String>,
    pub summary: String,
    pub description: String,
}

/// Everything needed to write a package's `debian/` directory
#[derive(Debug)]
pub struct GeneratedPackage {
    pub metadata: PackageMetadata,
    pub scripts: Scripts,
    /// `<workdir>/<manifest stem>`
    pub output_dir: PathBuf,
    /// Whether the package delivers anything worth building
    pub has_content: bool,
}

/// One manifest on its way to becoming a Debian package
pub struct Conversion {
    source: PathBuf,
    stem: String,
    manifest: Manifest,
    fmri: Option<Fmri>,
    name: Option<String>,
}

impl Conversion {
    /// Read a manifest and its `pkg.fmri`
    pub fn open(path: &Path) -> Result<Self> {
        let manifest = Manifest::from_path(path)?;
        Self::from_manifest(path, manifest)
    }

    /// Wrap an already parsed manifest read from `path`
    pub fn from_manifest(path: &Path, manifest: Manifest) -> Result<Self> {
        let stem = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .and_then(|n| n.split('.').next().map(str::to_string))
            .unwrap_or_default();
        if stem.is_empty() {
            return Err(Error::Config(format!(
                "{}: manifest file name has no stem to name the output directory",
                path.display()
            )));
        }
        let fmri = manifest.get_first("pkg.fmri").map(Fmri::parse).transpose()?;

        Ok(Self {
            source: path.to_path_buf(),
            stem,
            manifest,
            fmri,
            name: None,
        })
    }

    /// Debian package name, once classified
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Label for log messages
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.source.display().to_string())
    }

    /// Decide whether this manifest is converted, recording renames
    pub fn classify(&mut self, tables: &mut LookupTables) -> Result<Disposition> {
        let Some(fmri) = &self.fmri else {
            return Ok(Disposition::NoFmri);
        };

        let name = fmri.debian_name();
        self.name = Some(name.clone());

        if self.manifest.is_set("pkg.obsolete") {
            return Ok(Disposition::Obsolete);
        }
        if name.contains("consolidation") {
            return Ok(Disposition::Consolidation);
        }
        if tables::is_ignored(&name) {
            return Ok(Disposition::Ignored);
        }

        if self.manifest.is_set("pkg.renamed") {
            for dep in self.manifest.actions_by_kind(&ActionKind::Depend) {
                let Some(target) = dep.attr_first("fmri") else {
                    continue;
                };
                let target = Fmri::parse_lenient(target)?.debian_name();
                if target == INCORPORATION {
                    continue;
                }
                debug!("{} was renamed to {}", name, target);
                tables.record_rename(&target, &name);
            }
            return Ok(Disposition::Renamed);
        }

        Ok(Disposition::Convert)
    }

    /// `<workdir or manifest dir>/<stem>`
    pub fn output_dir(&self, options: &ConvertOptions) -> PathBuf {
        self.output_parent(options).join(&self.stem)
    }

    fn output_parent(&self, options: &ConvertOptions) -> PathBuf {
        options
            .workdir
            .clone()
            .or_else(|| self.source.parent().map(Path::to_path_buf))
            .unwrap_or_default()
    }

    /// Compute metadata, stage files and collect script snippets
    pub fn generate(&self, tables: &LookupTables, options: &ConvertOptions) -> Result<GeneratedPackage> {
        let (Some(fmri), Some(name)) = (&self.fmri, self.name.as_deref()) else {
            return Err(Error::Config(format!(
                "{} has not been classified for conversion",
                self.source.display()
            )));
        };

        let metadata = self.metadata(fmri, name, tables, options)?;

        let parent = self.output_parent(options);
        let output_dir = self.output_dir(options);
        if output_dir == parent {
            return Err(Error::Config(format!(
                "{}: refusing to use {} as the output directory",
                self.source.display(),
                output_dir.display()
            )));
        }
        if output_dir.exists() {
            std::fs::remove_dir_all(&output_dir)?;
        }
        std::fs::create_dir_all(output_dir.join("debian"))?;

        let stager = Stager::new(output_dir.join("debian").join(name), options.proto_dirs.clone());
        let mut scripts = Scripts::default();

        self.stage_dirs(&stager, &mut scripts)?;
        self.stage_files(&stager, &mut scripts, name)?;
        self.add_hardlinks(&mut scripts, name);
        self.add_drivers(&mut scripts)?;
        self.add_links(&stager, &mut scripts, name)?;
        self.add_accounts(&mut scripts)?;

        let has_content = !metadata.depends.is_empty()
            || [
                ActionKind::Dir,
                ActionKind::File,
                ActionKind::Hardlink,
                ActionKind::User,
                ActionKind::Group,
            ]
            .iter()
            .any(|kind| self.manifest.has_actions(kind));

        Ok(GeneratedPackage {
            metadata,
            scripts,
            output_dir,
            has_content,
        })
    }

    fn metadata(
        &self,
        fmri: &Fmri,
        name: &str,
        tables: &LookupTables,
        options: &ConvertOptions,
    ) -> Result<PackageMetadata> {
        let version = options
            .version
            .clone()
            .or_else(|| tables.version(name).filter(|v| !v.is_empty()).map(str::to_string))
            .unwrap_or_else(|| DEFAULT_VERSION.to_string());
        let priority = options
            .priority
            .clone()
            .or_else(|| tables.priority(name).filter(|p| !p.is_empty()).map(str::to_string))
            .unwrap_or_else(|| DEFAULT_PRIORITY.to_string());
        let replaces = options
            .replaces
            .clone()
            .or_else(|| Some(tables.replaces(name).join(", ")))
            .filter(|r| !r.is_empty());

        let original_version = options
            .original_version
            .clone()
            .unwrap_or_else(|| fmri.release().unwrap_or_default().to_string());
        let architecture = format!(
            "solaris-{}",
            self.manifest
                .get_first("variant.arch")
                .filter(|a| !a.is_empty())
                .unwrap_or(DEFAULT_ARCH)
        );

        let special = options.force_special || tables::is_special(name);
        let depends = depends::collect(&self.manifest, &version, special)?;

        Ok(PackageMetadata {
            name: name.to_string(),
            version,
            original_name: fmri.base_name().replace('_', "-"),
            original_version,
            architecture,
            section: options.section.clone(),
            priority,
            maintainer: options.maintainer.clone(),
            replaces,
            depends,
            summary: self.manifest.get_first("pkg.summary").unwrap_or("none").to_string(),
            description: self
                .manifest
                .get_first("pkg.description")
                .unwrap_or("none")
                .to_string(),
        })
    }

    fn stage_dirs(&self, stager: &Stager, scripts: &mut Scripts) -> Result<()> {
        for dir in self.manifest.actions_by_kind(&ActionKind::Dir) {
            let path = dir.require("path")?;
            let mode = dir.require("mode")?;
            let owner = dir.require("owner")?;
            let group = dir.require("group")?;

            stager.create_dir(path, mode, owner, group)?;
            scripts.add_dir(path, mode, owner, group);
        }
        Ok(())
    }

    fn stage_files(&self, stager: &Stager, scripts: &mut Scripts, name: &str) -> Result<()> {
        if name == SUNWCS && self.manifest.has_actions(&ActionKind::File) {
            scripts.add_sunwcs_postinst_copies();
        }

        let mut restarted: Vec<&str> = Vec::new();

        for file in self.manifest.actions_by_kind(&ActionKind::File) {
            let path = file.require("path")?;
            // base-files delivers motd
            if path.contains("etc/motd") {
                continue;
            }
            let mode = file.require("mode")?;
            let owner = file.require("owner")?;
            let group = file.require("group")?;

            scripts
                .fixperms
                .push(format!("mkdir -p $DEST/{}", scripts::dirname(path)));

            let hash = file.payload_hash();
            let payload = if hash == crate::manifest::NOHASH || file.attr("chash").is_some() {
                path
            } else {
                hash
            };
            let source = stager.locate_payload(payload)?;
            stager.install_file(path, &source, mode, owner, group)?;
            scripts.add_file(path, mode, owner, group);

            if let Some(preserve) = file.attr_first("preserve") {
                scripts.add_preserve(path, preserve, name);
            }

            if file.attr_first("variant.opensolaris.zone") == Some("global") {
                scripts.add_global_zone_file(path);
            }

            if let Some(fmris) = file.attr("restart_fmri") {
                for fmri in fmris.values() {
                    if !restarted.contains(&fmri.as_str()) {
                        restarted.push(fmri.as_str());
                        scripts.add_service_restart(fmri);
                    }
                }
            }
        }

        Ok(())
    }

    fn add_hardlinks(&self, scripts: &mut Scripts, name: &str) {
        if name == SUNWCS && self.manifest.has_actions(&ActionKind::Hardlink) {
            scripts.add_sunwcs_fixperms_copies();
        }

        for link in self.manifest.actions_by_kind(&ActionKind::Hardlink) {
            let (Some(path), Some(target)) = (link.attr_first("path"), link.attr_first("target"))
            else {
                continue;
            };
            if SUNWCS_HARDLINK_SKIP.contains(&path) {
                continue;
            }
            let global = link.attr_first("variant.opensolaris.zone") == Some("global");
            scripts.add_hardlink(path, target, global);
        }
    }

    fn add_drivers(&self, scripts: &mut Scripts) -> Result<()> {
        for driver in self.manifest.actions_by_kind(&ActionKind::Driver) {
            scripts.add_driver(&scripts::DriverSpec::from_action(driver)?);
        }
        if self.manifest.has_actions(&ActionKind::Driver) {
            scripts.end_driver_block();
        }
        Ok(())
    }

    fn add_links(&self, stager: &Stager, scripts: &mut Scripts, name: &str) -> Result<()> {
        let mut mediators = MediatorGroup::default();

        for link in self.manifest.actions_by_kind(&ActionKind::Link) {
            let path = link.require("path")?;
            let target = link.require("target")?;
            let zone = link.attr_first("variant.opensolaris.zone");

            let Some(mediator) = link.attr_first("mediator") else {
                scripts::add_symlink(scripts, path, target, zone == Some("global"));
                continue;
            };

            if zone.is_some() {
                return Err(Error::Unsupported {
                    package: name.to_string(),
                    message: "mediated links using variant.opensolaris.zone not supported"
                        .to_string(),
                });
            }

            if mediators.register(mediator, name)? {
                stager.touch(&format!("var/mediator/{}", name))?;
                mediators.start(scripts, mediator, name);
            }
            mediators.add_slave(path, target);
        }

        mediators.finish(scripts);
        Ok(())
    }

    fn add_accounts(&self, scripts: &mut Scripts) -> Result<()> {
        for group in self.manifest.actions_by_kind(&ActionKind::Group) {
            scripts.add_group(group.require("groupname")?, group.attr_first("gid"));
        }
        for user in self.manifest.actions_by_kind(&ActionKind::User) {
            scripts.add_user(&UserSpec::from_action(user)?);
        }
        Ok(())
    }
}

/// Result of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Debian names of the packages written
    pub converted: Vec<String>,
    /// Manifests that were deliberately not converted
    pub skipped: Vec<(String, Disposition)>,
    /// Packages with nothing to save
    pub empty: Vec<String>,
    /// Per-package failures, labelled by package name or manifest path
    pub failures: Vec<(String, Error)>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Convert a set of manifests, continuing past per-package failures
pub fn convert_all(
    manifests: &[PathBuf],
    tables: &mut LookupTables,
    options: &ConvertOptions,
) -> BatchReport {
    let mut report = BatchReport::default();
    let mut pending = Vec::new();

    for path in manifests {
        let classified = Conversion::open(path).and_then(|mut conversion| {
            let disposition = conversion.classify(tables)?;
            Ok((conversion, disposition))
        });

        match classified {
            Ok((conversion, Disposition::Convert)) => pending.push(conversion),
            Ok((conversion, disposition)) => {
                debug!("{}: {}. Skipping.", conversion.label(), disposition);
                report.skipped.push((conversion.label(), disposition));
            }
            Err(e) => {
                error!("{}: {}", path.display(), e);
                report.failures.push((path.display().to_string(), e));
            }
        }
    }

    let mut claimed: BTreeMap<PathBuf, String> = BTreeMap::new();

    for conversion in pending {
        let output_dir = conversion.output_dir(options);
        if let Some(owner) = claimed.get(&output_dir) {
            let e = Error::Config(format!(
                "{} would overwrite the output of {} in {}",
                conversion.source.display(),
                owner,
                output_dir.display()
            ));
            error!("{}: {}", conversion.label(), e);
            report.failures.push((conversion.label(), e));
            continue;
        }
        claimed.insert(output_dir, conversion.source.display().to_string());

        let result = conversion
            .generate(tables, options)
            .and_then(|package| Ok((debian::write_source_tree(&package)?, package)));

        match result {
            Ok((true, package)) => {
                info!(
                    "Generated {} {} in {}",
                    package.metadata.name,
                    package.metadata.version,
                    package.output_dir.display()
                );
                report.converted.push(package.metadata.name);
            }
            Ok((false, package)) => report.empty.push(package.metadata.name),
            Err(e) => {
                error!("{}: {}", conversion.label(), e);
                report.failures.push((conversion.label(), e));
            }
        }
    }

    report
}
