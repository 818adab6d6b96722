// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn build_cli() -> Command {
    Command::new("yum-get")
        .version(env!("CARGO_PKG_VERSION"))
        .author("yum-get Contributors")
        .about("Lists or downloads RPM packages from a Yum repository")
        .after_help("Specify each PKG to download as name-ver-rel")
        .arg(
            Arg::new("repo")
                .long("repo")
                .value_name("URL")
                .required(true)
                .help("URL of Yum repository to use"),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .action(ArgAction::SetTrue)
                .help("List packages in repository instead of downloading"),
        )
        .arg(
            Arg::new("force")
                .short('f')
                .long("force")
                .action(ArgAction::SetTrue)
                .help("Overwrite existing files"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable debugging info to stderr"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECS")
                .default_value("30")
                .help("HTTP timeout in seconds (0 disables)"),
        )
        .arg(
            Arg::new("dest")
                .short('d')
                .long("dest")
                .value_name("DIR")
                .default_value(".")
                .help("Directory to save packages into"),
        )
        .arg(
            Arg::new("by_name")
                .long("by-name")
                .action(ArgAction::SetTrue)
                .help("Download every package with the requested name, ignoring ver-rel"),
        )
        .arg(
            Arg::new("packages")
                .value_name("PKG")
                .num_args(0..)
                .help("Packages to download, as name-ver-rel"),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory
    let out_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("Failed to create man directory");

    // Generate main man page
    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();
    man.render(&mut buffer)
        .expect("Failed to render man page");

    let man_path = man_dir.join("yum-get.1");
    fs::write(&man_path, buffer).expect("Failed to write man page");
}
