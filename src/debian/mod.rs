// src/debian/mod.rs

//! Debian source tree writer
//!
//! Produces the `debian/` directory `dpkg-buildpackage` expects next to the
//! staged payload:
//!
//! - `control`, `changelog`, `compat`, `copyright`, `rules`
//! - `<pkg>.fixperms`, run by `rules` to fix modes, owners and links in the
//!   staging tree
//! - `<pkg>.postinst`, `<pkg>.preinst`, `<pkg>.prerm` when they have content
//! - an empty `<pkg>.conffiles`

use crate::convert::{GeneratedPackage, PackageMetadata};
use crate::error::Result;
use chrono::{DateTime, Local};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::{debug, warn};

const POSTINST_TEMPLATE: &str = include_str!("templates/postinst.in");
const PREINST_TEMPLATE: &str = include_str!("templates/preinst.in");
const PRERM_TEMPLATE: &str = include_str!("templates/prerm.in");
const RULES_TEMPLATE: &str = include_str!("templates/rules.in");
const COPYRIGHT: &str = include_str!("templates/copyright");

/// debhelper compatibility level
pub const COMPAT_LEVEL: u32 = 7;

/// PATH exported by fixperms when it has work to do
const FIXPERMS_PATH: &str = "/usr/bin:/sbin:/usr/sbin";

/// Write the `debian/` directory for a generated package
///
/// Returns false, writing nothing, when the package has no content.
pub fn write_source_tree(package: &GeneratedPackage) -> Result<bool> {
    let meta = &package.metadata;
    if !package.has_content {
        warn!("{}: Nothing to save.", meta.name);
        return Ok(false);
    }

    let dir = package.output_dir.join("debian");
    fs::create_dir_all(&dir)?;
    debug!("Writing Debian sources for {} to {}", meta.name, dir.display());

    fs::write(dir.join("control"), render_control(meta))?;
    fs::write(dir.join("changelog"), render_changelog(meta, &Local::now()))?;
    fs::write(dir.join("compat"), format!("{}\n", COMPAT_LEVEL))?;
    fs::write(dir.join("copyright"), COPYRIGHT)?;

    let scripts = &package.scripts;
    fs::write(
        dir.join(format!("{}.fixperms", meta.name)),
        render_fixperms(&scripts.fixperms),
    )?;

    for (suffix, template, lines) in [
        ("postinst", POSTINST_TEMPLATE, &scripts.postinst),
        ("preinst", PREINST_TEMPLATE, &scripts.preinst),
        ("prerm", PRERM_TEMPLATE, &scripts.prerm),
    ] {
        if !lines.is_empty() {
            fs::write(
                dir.join(format!("{}.{}", meta.name, suffix)),
                render_script(template, &meta.name, lines),
            )?;
        }
    }

    let rules = dir.join("rules");
    fs::write(&rules, RULES_TEMPLATE.replace("@PACKAGE@", &meta.name))?;
    set_executable(&rules)?;

    fs::write(dir.join(format!("{}.conffiles", meta.name)), "\n")?;

    Ok(true)
}

/// Render `debian/control`
pub fn render_control(meta: &PackageMetadata) -> String {
    let mut control = format!(
        "Source: {name}\n\
         Section: {section}\n\
         Priority: {priority}\n\
         XBS-Original-Version: {original_version}\n\
         XBS-Category: {section}\n\
         Maintainer: {maintainer}\n\
         \n\
         Package: {name}\n\
         Architecture: {architecture}\n\
         Depends: {depends}\n\
         Provides: {provides}\n",
        name = meta.name,
        section = meta.section,
        priority = meta.priority,
        original_version = meta.original_version,
        maintainer = meta.maintainer,
        architecture = meta.architecture,
        depends = meta.depends.join(", "),
        provides = meta.original_name,
    );

    if let Some(replaces) = &meta.replaces {
        control.push_str(&format!("Replaces: {}\n", replaces));
    }

    control.push_str(&format!("Description: {}\n", meta.summary));
    control.push_str(&extended_description(&meta.description));
    control
}

/// Continuation lines of a Description field
///
/// Every line is indented by one space; empty lines become ` .`.
fn extended_description(text: &str) -> String {
    let mut out = String::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            out.push_str(" .\n");
        } else {
            out.push(' ');
            out.push_str(line);
            out.push('\n');
        }
    }
    if out.is_empty() {
        out.push_str(" .\n");
    }
    out
}

/// Render the single `debian/changelog` entry
pub fn render_changelog(meta: &PackageMetadata, when: &DateTime<Local>) -> String {
    format!(
        "{} ({}) unstable; urgency=low\n\
         \n  * Temporary file, need only for package generation process\n\
         \n -- {}  {}\n",
        meta.name,
        meta.version,
        meta.maintainer,
        when.format("%a, %d %b %Y %H:%M:%S %z")
    )
}

/// Render `<pkg>.fixperms`
pub fn render_fixperms(lines: &[String]) -> String {
    let path = if lines.is_empty() { "" } else { FIXPERMS_PATH };
    format!("#!/bin/sh\n\nexport PATH={}\n\n{}\n", path, lines.join("\n"))
}

/// Fill a maintainer script template
///
/// Snippets are joined so each lands on its own line inside the `case`
/// branch.
pub fn render_script(template: &str, package: &str, lines: &[String]) -> String {
    template
        .replace("@PACKAGE@", package)
        .replace("@SCRIPT@", &lines.join("\n\t"))
}

fn set_executable(path: &Path) -> Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)?;
    Ok(())
}
