// src/main.rs

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use ips2deb::convert::{DEFAULT_MAINTAINER, DEFAULT_SECTION};
use ips2deb::tables::LookupTables;
use ips2deb::ConvertOptions;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ips2deb")]
#[command(author, version, about = "Convert a mogrified pkg manifest to Debian format", long_about = None)]
struct Cli {
    /// Location of the manifest (repeatable; "all" converts the whole gate)
    #[arg(short = 'p', long = "pkg", value_name = "PATH")]
    pkg: Vec<String>,

    /// Output verbose stuff
    #[arg(short, long)]
    verbose: bool,

    /// Package version
    #[arg(long = "pv", value_name = "VERSION")]
    package_version: Option<String>,

    /// XBS-Original-Version Debian field
    #[arg(long = "cv", value_name = "VERSION")]
    original_version: Option<String>,

    /// Where to store the generated packages
    #[arg(short = 'o', long = "wd", value_name = "DIR")]
    workdir: Option<PathBuf>,

    /// Location of all manifests
    #[arg(long = "mg", visible_aliases = ["mfg", "manifest_gate"], value_name = "DIR")]
    gate: Option<PathBuf>,

    /// Debian Maintainer field
    #[arg(long, default_value = DEFAULT_MAINTAINER)]
    maintainer: String,

    /// Extension of manifests (i.e. mog, mf)
    #[arg(long = "me", visible_alias = "mfe", default_value = "res")]
    extension: String,

    /// Debian Section field
    #[arg(short, long, visible_alias = "category", default_value = DEFAULT_SECTION)]
    section: String,

    /// Debian Priority field
    #[arg(short = 'r', long)]
    priority: Option<String>,

    /// Whether this is a "special" package depending on sunwcs
    #[arg(long)]
    spec: bool,

    /// Debian Replaces field
    #[arg(long = "rep")]
    replaces: Option<String>,

    /// Top of a tree of files included in packages (i.e. proto/root_i386)
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    dirs: Vec<PathBuf>,

    /// Directory where the ips2deb lookup tables are stored
    #[arg(long, value_name = "DIR")]
    conf: Option<PathBuf>,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

impl Cli {
    fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            workdir: self.workdir.clone(),
            proto_dirs: self.dirs.clone(),
            version: self.package_version.clone(),
            original_version: self.original_version.clone(),
            maintainer: self.maintainer.clone(),
            section: self.section.clone(),
            priority: self.priority.clone(),
            replaces: self.replaces.clone(),
            force_special: self.spec,
        }
    }
}

/// Lookup tables live in `../etc` next to the installed binary
fn default_conf_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the ips2deb executable")?;
    let bin_dir = exe.parent().unwrap_or(Path::new("."));
    Ok(bin_dir.join("..").join("etc"))
}

/// Manifests named on the command line, or every manifest in the gate
fn manifest_list(pkg: &[String], gate: Option<&Path>, extension: &str) -> Result<Vec<PathBuf>> {
    let convert_gate = pkg.is_empty() || (pkg.len() == 1 && pkg[0] == "all");
    if !convert_gate {
        return Ok(pkg.iter().map(PathBuf::from).collect());
    }

    let gate = gate.ok_or_else(|| {
        anyhow::anyhow!("Manifest gate path needed if no package specified")
    })?;
    let suffix = format!(".{}", extension);

    let mut manifests = Vec::new();
    for entry in std::fs::read_dir(gate)
        .with_context(|| format!("Failed to read manifest gate {}", gate.display()))?
    {
        let path = entry?.path();
        let matches = path
            .file_name()
            .map(|name| name.to_string_lossy().ends_with(&suffix))
            .unwrap_or(false);
        if matches && path.is_file() {
            manifests.push(path);
        }
    }
    manifests.sort();
    Ok(manifests)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "ips2deb", &mut std::io::stdout());
        return Ok(());
    }

    // Initialize tracing subscriber for logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    if cli.dirs.is_empty() {
        return Err(anyhow::anyhow!("Need at least one -d/--dir option"));
    }

    let conf_dir = match &cli.conf {
        Some(dir) => dir.clone(),
        None => default_conf_dir()?,
    };
    let mut tables = LookupTables::load(&conf_dir)?;

    let manifests = manifest_list(&cli.pkg, cli.gate.as_deref(), &cli.extension)?;
    info!("Converting {} manifest(s)", manifests.len());

    let report = ips2deb::convert_all(&manifests, &mut tables, &cli.convert_options());

    println!(
        "Generated {} package(s), skipped {}, nothing to save for {}",
        report.converted.len(),
        report.skipped.len(),
        report.empty.len()
    );

    if report.has_failures() {
        for (label, err) in &report.failures {
            eprintln!("Error: {}: {}", label, err);
        }
        return Err(anyhow::anyhow!(
            "some errors occurred during processing; packages that didn't error out were still generated"
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_aliases() {
        let cli = Cli::try_parse_from([
            "ips2deb",
            "--mfg",
            "/gate",
            "--mfe",
            "mog",
            "--category",
            "admin",
            "-d",
            "/proto/a",
            "-d",
            "/proto/b",
            "--pv",
            "2.0-1",
            "--spec",
        ])
        .unwrap();
        assert_eq!(cli.gate, Some(PathBuf::from("/gate")));
        assert_eq!(cli.extension, "mog");
        assert_eq!(cli.section, "admin");
        assert_eq!(cli.dirs.len(), 2);

        let options = cli.convert_options();
        assert_eq!(options.version.as_deref(), Some("2.0-1"));
        assert!(options.force_special);
        assert_eq!(options.priority, None);
        assert_eq!(options.maintainer, DEFAULT_MAINTAINER);
    }

    #[test]
    fn test_cli_manifest_gate_long_name() {
        let cli = Cli::try_parse_from(["ips2deb", "--manifest_gate", "/m", "-p", "a.res", "-p", "b.res"]).unwrap();
        assert_eq!(cli.gate, Some(PathBuf::from("/m")));
        assert_eq!(cli.pkg, ["a.res", "b.res"]);
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_manifest_list_explicit() {
        let list = manifest_list(&["x/a.res".to_string()], None, "res").unwrap();
        assert_eq!(list, [PathBuf::from("x/a.res")]);
    }

    #[test]
    fn test_manifest_list_from_gate() {
        let gate = tempfile::tempdir().unwrap();
        std::fs::write(gate.path().join("b.res"), "").unwrap();
        std::fs::write(gate.path().join("a.res"), "").unwrap();
        std::fs::write(gate.path().join("a.mog"), "").unwrap();
        std::fs::create_dir(gate.path().join("dir.res")).unwrap();

        let list = manifest_list(&["all".to_string()], Some(gate.path()), "res").unwrap();
        assert_eq!(list, [gate.path().join("a.res"), gate.path().join("b.res")]);

        let list = manifest_list(&[], Some(gate.path()), "mog").unwrap();
        assert_eq!(list, [gate.path().join("a.mog")]);
    }

    #[test]
    fn test_manifest_list_requires_gate() {
        assert!(manifest_list(&[], None, "res").is_err());
    }
}
