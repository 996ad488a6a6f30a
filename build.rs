// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn build_cli() -> Command {
    Command::new("ips2deb")
        .version(env!("CARGO_PKG_VERSION"))
        .author("ips2deb Contributors")
        .about("Convert a mogrified pkg manifest to Debian format")
        .arg(
            Arg::new("pkg")
                .short('p')
                .long("pkg")
                .value_name("PATH")
                .action(ArgAction::Append)
                .help("Location of the manifest (repeatable; \"all\" converts the whole gate)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Output verbose stuff"),
        )
        .arg(Arg::new("pv").long("pv").value_name("VERSION").help("Package version"))
        .arg(
            Arg::new("cv")
                .long("cv")
                .value_name("VERSION")
                .help("XBS-Original-Version Debian field"),
        )
        .arg(
            Arg::new("wd")
                .short('o')
                .long("wd")
                .value_name("DIR")
                .help("Where to store the generated packages"),
        )
        .arg(
            Arg::new("mg")
                .long("mg")
                .visible_aliases(["mfg", "manifest_gate"])
                .value_name("DIR")
                .help("Location of all manifests"),
        )
        .arg(
            Arg::new("maintainer")
                .long("maintainer")
                .default_value("Nexenta Systems <maintainer@nexenta.com>")
                .help("Debian Maintainer field"),
        )
        .arg(
            Arg::new("me")
                .long("me")
                .visible_alias("mfe")
                .default_value("res")
                .help("Extension of manifests (i.e. mog, mf)"),
        )
        .arg(
            Arg::new("section")
                .short('s')
                .long("section")
                .visible_alias("category")
                .default_value("undef")
                .help("Debian Section field"),
        )
        .arg(
            Arg::new("priority")
                .short('r')
                .long("priority")
                .help("Debian Priority field (default: lookup table, then optional)"),
        )
        .arg(
            Arg::new("spec")
                .long("spec")
                .action(ArgAction::SetTrue)
                .help("Whether this is a \"special\" package depending on sunwcs"),
        )
        .arg(Arg::new("rep").long("rep").help("Debian Replaces field"))
        .arg(
            Arg::new("dir")
                .short('d')
                .long("dir")
                .value_name("DIR")
                .action(ArgAction::Append)
                .help("Top of a tree of files included in packages (i.e. proto/root_i386)"),
        )
        .arg(
            Arg::new("conf")
                .long("conf")
                .value_name("DIR")
                .help("Directory where the ips2deb lookup tables are stored"),
        )
        .arg(
            Arg::new("completions")
                .long("completions")
                .value_name("SHELL")
                .value_parser(["bash", "elvish", "fish", "powershell", "zsh"])
                .help("Print shell completions and exit"),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory
    let out_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("Failed to create man directory");

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    man.render(&mut buffer).expect("Failed to render man page");

    let man_path = man_dir.join("ips2deb.1");
    fs::write(&man_path, buffer).expect("Failed to write man page");
}
