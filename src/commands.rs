// src/commands.rs

//! Command implementations: list the catalog or download packages
//!
//! Everything runs sequentially. When several packages are requested they
//! are handled in the order given and the first failure stops the run;
//! files saved before the failure are kept.

use crate::config::{Config, Mode};
use crate::repository::download::{self, SavedPackage};
use crate::repository::{Fetch, HttpFetcher, PackageCatalog, YumRepository};
use crate::resolver;
use anyhow::{Context, Result};
use std::io::Write;
use tracing::{debug, info};

/// Run against the configured repository over HTTP
pub fn run(config: &Config, out: &mut dyn Write) -> Result<()> {
    let fetcher = HttpFetcher::with_timeout(config.timeout)?;
    run_with(config, fetcher, out)
}

/// Run with a caller-supplied fetcher
pub fn run_with<F: Fetch>(config: &Config, fetcher: F, out: &mut dyn Write) -> Result<()> {
    let repo = YumRepository::new(config.repository.clone(), fetcher);
    let catalog = sync_catalog(&repo)?;

    match &config.mode {
        Mode::List => {
            debug!("listing packages available in repo");
            list(&catalog, out)
        }
        Mode::Download(queries) => {
            download(&repo, &catalog, queries, config, out)?;
            Ok(())
        }
    }
}

/// Fetch the package catalog: repomd.xml, then the primary it names
pub fn sync_catalog<F: Fetch>(repo: &YumRepository<F>) -> Result<PackageCatalog> {
    let repomd = repo
        .fetch_repomd()
        .with_context(|| format!("failed to download repo metadata from {}", repo.base()))?;
    let href = repomd.primary_location()?;
    repo.fetch_primary(href)
        .context("failed to download primary metadata")
}

/// Print one `name-ver-rel (arch): summary` line per record, in catalog order
pub fn list(catalog: &PackageCatalog, out: &mut dyn Write) -> Result<()> {
    for record in catalog {
        writeln!(out, "{record}").context("failed to write package listing")?;
    }
    Ok(())
}

/// Resolve and save each query in order, printing saved file names
pub fn download<F: Fetch>(
    repo: &YumRepository<F>,
    catalog: &PackageCatalog,
    queries: &[String],
    config: &Config,
    out: &mut dyn Write,
) -> Result<Vec<SavedPackage>> {
    let options = config.download_options();
    let mut saved = Vec::new();

    for query in queries {
        let records = resolver::resolve(catalog, query, config.match_mode)?;

        for record in records {
            let package = download::download_package(repo, record, &options)
                .with_context(|| format!("failed to download package {}", record.nvr()))?;

            info!("Saved {} ({} bytes)", package.path.display(), package.bytes);
            writeln!(out, "{}", package.filename).context("failed to write output")?;
            saved.push(package);
        }
    }

    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::client::testing::MemoryFetcher;
    use crate::repository::RepositoryBase;
    use crate::resolver::MatchMode;
    use crate::Error;
    use std::fs;

    const BASE: &str = "http://repo.example.com/el9/";

    const REPOMD: &str = r#"<repomd><data type="primary"><location href="repodata/primary.xml"/></data></repomd>"#;

    const PRIMARY: &str = r#"<metadata>
<package><name>nano</name><arch>x86_64</arch><version epoch="0" ver="5.6.1" rel="5.el9"/><summary>A small text editor</summary><location href="Packages/nano-5.6.1-5.el9.x86_64.rpm"/></package>
<package><name>tmux</name><arch>x86_64</arch><version epoch="0" ver="3.2a" rel="5.el9"/><summary>A terminal multiplexer</summary><location href="Packages/tmux-3.2a-5.el9.x86_64.rpm"/></package>
<package><name>nano</name><arch>x86_64</arch><version epoch="1" ver="5.6.1" rel="5.el9"/><summary>A small text editor</summary><location href="Packages/nano-1-5.6.1-5.el9.x86_64.rpm"/></package>
<package><name>zsh</name><arch>x86_64</arch><version epoch="0" ver="5.8" rel="9.el9"/><summary>Powerful interactive shell</summary><location href="Packages/zsh-5.8-9.el9.x86_64.rpm"/></package>
</metadata>"#;

    fn fetcher() -> MemoryFetcher {
        MemoryFetcher::new()
            .with("http://repo.example.com/el9/repodata/repomd.xml", REPOMD)
            .with("http://repo.example.com/el9/repodata/primary.xml", PRIMARY)
            .with("http://repo.example.com/el9/Packages/nano-1-5.6.1-5.el9.x86_64.rpm", "nano e1")
            .with("http://repo.example.com/el9/Packages/nano-5.6.1-5.el9.x86_64.rpm", "nano e0")
            .with("http://repo.example.com/el9/Packages/tmux-3.2a-5.el9.x86_64.rpm", "tmux")
            .with("http://repo.example.com/el9/Packages/zsh-5.8-9.el9.x86_64.rpm", "zsh")
    }

    fn config(packages: &[&str], dest: &std::path::Path) -> Config {
        Config::new(
            BASE,
            packages.is_empty(),
            packages.iter().map(|p| p.to_string()).collect(),
        )
        .unwrap()
        .with_dest_dir(dest)
    }

    #[test]
    fn test_list_prints_every_record_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut out: Vec<u8> = Vec::new();

        run_with(&config(&[], dir.path()), &fetcher(), &mut out).unwrap();

        let output = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "nano-5.6.1-5.el9 (x86_64): A small text editor",
                "tmux-3.2a-5.el9 (x86_64): A terminal multiplexer",
                "nano-5.6.1-5.el9 (x86_64): A small text editor",
                "zsh-5.8-9.el9 (x86_64): Powerful interactive shell",
            ]
        );
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_download_picks_highest_epoch() {
        let dir = tempfile::tempdir().unwrap();
        let mut out: Vec<u8> = Vec::new();

        run_with(&config(&["nano-5.6.1-5.el9"], dir.path()), &fetcher(), &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "nano-1-5.6.1-5.el9.x86_64.rpm\n");
        assert_eq!(
            fs::read(dir.path().join("nano-1-5.6.1-5.el9.x86_64.rpm")).unwrap(),
            b"nano e1"
        );
    }

    #[test]
    fn test_download_in_request_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut out: Vec<u8> = Vec::new();
        let fetcher = fetcher();

        run_with(
            &config(&["zsh-5.8-9.el9", "tmux-3.2a-5.el9"], dir.path()),
            &fetcher,
            &mut out,
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "zsh-5.8-9.el9.x86_64.rpm\ntmux-3.2a-5.el9.x86_64.rpm\n"
        );
        let requests = fetcher.requests();
        assert!(requests[2].ends_with("zsh-5.8-9.el9.x86_64.rpm"));
        assert!(requests[3].ends_with("tmux-3.2a-5.el9.x86_64.rpm"));
    }

    #[test]
    fn test_first_failure_aborts_remaining() {
        let dir = tempfile::tempdir().unwrap();
        let mut out: Vec<u8> = Vec::new();

        let err = run_with(
            &config(&["tmux-3.2a-5.el9", "vim-9.0-1.el9", "zsh-5.8-9.el9"], dir.path()),
            &fetcher(),
            &mut out,
        )
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::PackageNotFound(_))
        ));
        assert_eq!(String::from_utf8(out).unwrap(), "tmux-3.2a-5.el9.x86_64.rpm\n");
        assert!(dir.path().join("tmux-3.2a-5.el9.x86_64.rpm").exists());
        assert!(!dir.path().join("zsh-5.8-9.el9.x86_64.rpm").exists());
    }

    #[test]
    fn test_invalid_identity_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_with(&config(&["zsh"], dir.path()), &fetcher(), &mut std::io::sink()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidIdentityFormat(_))
        ));
    }

    #[test]
    fn test_conflict_leaves_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("zsh-5.8-9.el9.x86_64.rpm");
        fs::write(&existing, b"local build").unwrap();

        let err = run_with(&config(&["zsh-5.8-9.el9"], dir.path()), &fetcher(), &mut std::io::sink())
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::FileConflict(_))
        ));
        assert_eq!(fs::read(&existing).unwrap(), b"local build");
    }

    #[test]
    fn test_overwrite_permitted() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("zsh-5.8-9.el9.x86_64.rpm");
        fs::write(&existing, b"local build").unwrap();

        let config = config(&["zsh-5.8-9.el9"], dir.path()).with_overwrite(true);
        run_with(&config, &fetcher(), &mut std::io::sink()).unwrap();

        assert_eq!(fs::read(&existing).unwrap(), b"zsh");
    }

    #[test]
    fn test_name_mode_downloads_all_with_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut out: Vec<u8> = Vec::new();

        let config = config(&["nano-0-0"], dir.path()).with_match_mode(MatchMode::Name);
        run_with(&config, &fetcher(), &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "nano-5.6.1-5.el9.x86_64.rpm\nnano-1-5.6.1-5.el9.x86_64.rpm\n"
        );
    }

    #[test]
    fn test_sync_requests_repomd_then_primary() {
        let fetcher = fetcher();
        let repo = YumRepository::new(RepositoryBase::parse(BASE).unwrap(), &fetcher);

        let catalog = sync_catalog(&repo).unwrap();

        assert_eq!(catalog.len(), 4);
        assert_eq!(
            fetcher.requests(),
            vec![
                "http://repo.example.com/el9/repodata/repomd.xml",
                "http://repo.example.com/el9/repodata/primary.xml",
            ]
        );
    }

    #[test]
    fn test_sync_failures_name_their_stage() {
        let repo_missing = MemoryFetcher::new();
        let repo = YumRepository::new(RepositoryBase::parse(BASE).unwrap(), &repo_missing);
        let err = sync_catalog(&repo).unwrap_err();
        assert!(format!("{err:#}").starts_with("failed to download repo metadata from"));

        let primary_missing = MemoryFetcher::new()
            .with("http://repo.example.com/el9/repodata/repomd.xml", REPOMD);
        let repo = YumRepository::new(RepositoryBase::parse(BASE).unwrap(), &primary_missing);
        let err = sync_catalog(&repo).unwrap_err();
        assert!(format!("{err:#}").starts_with("failed to download primary metadata"));
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::RemoteStatus { status: 404, .. })
        ));
    }

    #[test]
    fn test_missing_primary_reported() {
        let fetcher = MemoryFetcher::new().with(
            "http://repo.example.com/el9/repodata/repomd.xml",
            "<repomd></repomd>",
        );
        let dir = tempfile::tempdir().unwrap();

        let err = run_with(&config(&[], dir.path()), &fetcher, &mut std::io::sink()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::PrimaryNotFound)
        ));
    }
}
