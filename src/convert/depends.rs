// src/convert/depends.rs

//! Debian `Depends` list from `depend` actions

use crate::error::Result;
use crate::manifest::{ActionKind, Fmri, Manifest};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Dependencies every package starts with
pub const BASE_DEPENDS: &[&str] = &["${shlibs:Depends}", "${misc:Depends}"];

/// Package implicitly required by special packages
pub const SUNWCS: &str = "sunwcs";

/// Dependencies on these are dropped
static IGNORED_DEPENDENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:.*__TBD.*|.*consolidation.*|.*release/name.*|.*compatibility-packages-sunwxwplt.*|.*runtime/perl.*)")
        .expect("dependency filter is a valid regex")
});

/// Never versioned, it is delivered outside the normal release cadence
const UNVERSIONED_DEPENDENCY: &str = "driver-serial-usbsksp-usbs49-fw";

/// Build the dependency list for a package
///
/// Dependencies discovered by `pkgdepend` (those carrying
/// `pkg.debug.depend.file`) are pinned to at least `version`; such a
/// dependency is dropped if it is already listed.
pub fn collect(manifest: &Manifest, version: &str, special: bool) -> Result<Vec<String>> {
    let mut depends: Vec<String> = BASE_DEPENDS.iter().map(|d| d.to_string()).collect();
    if special {
        depends.push(SUNWCS.to_string());
    }

    for dep in manifest.actions_by_kind(&ActionKind::Depend) {
        let Some(fmri) = dep.attr_first("fmri") else {
            continue;
        };
        if dep.attr_first("type") != Some("require") {
            continue;
        }

        let fmri = Fmri::parse_lenient(fmri)?;
        if IGNORED_DEPENDENCY.is_match(&fmri.name) {
            debug!("Dropping dependency on {}", fmri.name);
            continue;
        }

        let mut name = fmri.debian_name();
        if dep.attr("pkg.debug.depend.file").is_some() && !version.is_empty() {
            if name.contains(UNVERSIONED_DEPENDENCY) || depends.contains(&name) {
                continue;
            }
            name = format!("{} (>= {})", name, version);
        }

        depends.push(name);
    }

    Ok(depends)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(body: &str) -> Manifest {
        Manifest::parse(body).unwrap()
    }

    #[test]
    fn test_base_and_special_depends() {
        let m = manifest("set name=pkg.fmri value=pkg:/a@1.0,5.11\n");
        assert_eq!(collect(&m, "1.0", false).unwrap(), ["${shlibs:Depends}", "${misc:Depends}"]);
        assert_eq!(
            collect(&m, "1.0", true).unwrap(),
            ["${shlibs:Depends}", "${misc:Depends}", "sunwcs"]
        );
    }

    #[test]
    fn test_require_dependencies_are_renamed() {
        let m = manifest(
            "depend fmri=pkg:/system/library/math@0.5.11,5.11 type=require\n\
             depend fmri=pkg:/shell/Bash_Extra@0.5.11 type=require\n\
             depend fmri=pkg:/system/optional type=optional\n\
             depend type=require\n",
        );
        let deps = collect(&m, "1.0.0-deb", false).unwrap();
        assert_eq!(&deps[2..], ["system-library-math", "shell-bash-extra"]);
    }

    #[test]
    fn test_filtered_dependencies() {
        let m = manifest(
            "depend fmri=consolidation/osnet/osnet-incorporation type=require\n\
             depend fmri=release/name type=require\n\
             depend fmri=runtime/perl-510 type=require\n\
             depend fmri=__TBD type=require\n\
             depend fmri=compatibility-packages-sunwxwplt type=require\n\
             depend fmri=system/kernel type=require\n",
        );
        let deps = collect(&m, "1.0", false).unwrap();
        assert_eq!(&deps[2..], ["system-kernel"]);
    }

    #[test]
    fn test_generated_dependencies_are_versioned() {
        let m = manifest(
            "depend fmri=pkg:/system/library@0.5.11,5.11 type=require pkg.debug.depend.file=libc.so.1\n\
             depend fmri=pkg:/driver/serial/usbsksp/usbs49_fw type=require pkg.debug.depend.file=fw\n\
             depend fmri=system/kernel type=require\n\
             depend fmri=system/kernel type=require pkg.debug.depend.file=unix\n",
        );
        let deps = collect(&m, "2.1-1", false).unwrap();
        assert_eq!(&deps[2..], ["system-library (>= 2.1-1)", "system-kernel"]);
    }

    #[test]
    fn test_invalid_dependency_fmri_is_error() {
        let m = manifest("depend fmri=pkg:/x@bogus,5.11 type=require\n");
        assert!(collect(&m, "1.0", false).is_err());
    }
}
