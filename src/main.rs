// src/main.rs

use anyhow::Result;
use clap::Parser;
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing::{debug, error};
use yum_get::config::Config;
use yum_get::resolver::MatchMode;

#[derive(Parser)]
#[command(name = "yum-get")]
#[command(author, version, about = "Lists or downloads RPM packages from a Yum repository", long_about = None)]
#[command(after_help = "Specify each PKG to download as name-ver-rel")]
struct Cli {
    /// URL of Yum repository to use
    #[arg(long, value_name = "URL")]
    repo: String,

    /// List packages in repository instead of downloading
    #[arg(short, long)]
    list: bool,

    /// Overwrite existing files
    #[arg(short, long)]
    force: bool,

    /// Enable debugging info to stderr
    #[arg(short, long)]
    verbose: bool,

    /// HTTP timeout in seconds (0 disables)
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    timeout: u64,

    /// Directory to save packages into
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    dest: String,

    /// Download every package with the requested name, ignoring ver-rel
    #[arg(long)]
    by_name: bool,

    /// Packages to download, as name-ver-rel
    #[arg(value_name = "PKG")]
    packages: Vec<String>,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "yum_get=debug" } else { "warn" };
    let stderr = io::stderr();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_ansi(stderr.is_terminal())
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn build_config(cli: Cli) -> yum_get::Result<Config> {
    let match_mode = if cli.by_name {
        MatchMode::Name
    } else {
        MatchMode::Identity
    };

    Ok(Config::new(&cli.repo, cli.list, cli.packages)?
        .with_overwrite(cli.force)
        .with_verbose(cli.verbose)
        .with_timeout_secs(cli.timeout)
        .with_dest_dir(cli.dest)
        .with_match_mode(match_mode))
}

fn run(config: &Config) -> Result<()> {
    debug!("using repository {}", config.repository);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    yum_get::commands::run(config, &mut out)
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version also arrive here
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let config = match build_config(cli) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false);
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.verbose);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
