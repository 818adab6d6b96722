// src/resolver.rs

//! Package identity parsing and selection
//!
//! Users request packages as `name-ver-rel`. The last two hyphen-separated
//! parts are the version and release; everything before them, hyphens
//! included, is the name. Epoch is never part of the request: when several
//! records share name, version and release, the highest epoch wins.

use crate::error::{Error, Result};
use crate::repository::{PackageCatalog, PackageRecord};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::debug;

/// `name-ver-rel`, with the name allowed to contain hyphens
static IDENTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+)-([^-]+)-([^-]+)$").expect("identity pattern is valid")
});

/// A requested package: name, version and release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageIdentity {
    pub name: String,
    pub ver: String,
    pub rel: String,
}

impl PackageIdentity {
    /// Split `name-ver-rel` from the right
    ///
    /// # Examples
    /// ```
    /// use yum_get::resolver::PackageIdentity;
    ///
    /// let id = PackageIdentity::parse("foo-bar-1.2.3-4").unwrap();
    /// assert_eq!(id.name, "foo-bar");
    /// assert_eq!(id.ver, "1.2.3");
    /// assert_eq!(id.rel, "4");
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let caps = IDENTITY_PATTERN
            .captures(input)
            .ok_or_else(|| Error::InvalidIdentityFormat(input.to_string()))?;

        Ok(Self {
            name: caps[1].to_string(),
            ver: caps[2].to_string(),
            rel: caps[3].to_string(),
        })
    }

    /// Does this record carry exactly this name, version and release?
    pub fn matches(&self, record: &PackageRecord) -> bool {
        record.name == self.name && record.version.ver == self.ver && record.version.rel == self.rel
    }
}

impl FromStr for PackageIdentity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.name, self.ver, self.rel)
    }
}

/// How a request selects records from the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Exact name, version and release; highest epoch wins
    #[default]
    Identity,
    /// Every record with the requested name, any version or architecture
    Name,
}

/// Select the record(s) a request refers to
///
/// In [`MatchMode::Identity`] exactly one record is returned. Architecture
/// is not part of the key, so with several architectures published the
/// first one in document order at the highest epoch is chosen.
pub fn resolve<'a>(
    catalog: &'a PackageCatalog,
    query: &str,
    mode: MatchMode,
) -> Result<Vec<&'a PackageRecord>> {
    let identity = PackageIdentity::parse(query)?;
    debug!(
        "searching for package name {}, ver {}, rel {}",
        identity.name, identity.ver, identity.rel
    );

    let selected: Vec<&PackageRecord> = match mode {
        MatchMode::Identity => select_highest_epoch(catalog, &identity).into_iter().collect(),
        MatchMode::Name => catalog
            .iter()
            .filter(|record| record.name == identity.name)
            .collect(),
    };

    if selected.is_empty() {
        return Err(Error::PackageNotFound(query.to_string()));
    }
    Ok(selected)
}

/// First record with the maximum epoch among exact matches
fn select_highest_epoch<'a>(
    catalog: &'a PackageCatalog,
    identity: &PackageIdentity,
) -> Option<&'a PackageRecord> {
    let mut best: Option<&PackageRecord> = None;

    for record in catalog.iter().filter(|record| identity.matches(record)) {
        match best {
            Some(current) if record.version.epoch <= current.version.epoch => {}
            _ => best = Some(record),
        }
    }

    if let Some(record) = best {
        debug!(
            "selected {} epoch {} ({})",
            record.nvr(),
            record.version.epoch,
            record.arch
        );
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::PackageVersion;

    fn record(name: &str, ver: &str, rel: &str, epoch: i64, arch: &str) -> PackageRecord {
        PackageRecord {
            name: name.to_string(),
            arch: arch.to_string(),
            version: PackageVersion {
                epoch,
                ver: ver.to_string(),
                rel: rel.to_string(),
            },
            location: format!("Packages/{name}-{ver}-{rel}.{arch}.rpm"),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_identity_with_hyphenated_name() {
        let id = PackageIdentity::parse("foo-bar-1.2.3-4").unwrap();
        assert_eq!(id.name, "foo-bar");
        assert_eq!(id.ver, "1.2.3");
        assert_eq!(id.rel, "4");
        assert_eq!(id.to_string(), "foo-bar-1.2.3-4");
    }

    #[test]
    fn test_parse_identity_invalid() {
        for input in ["badformat", "name-1.0", "-1.0-1", "name--1", "name-1.0-", ""] {
            assert!(
                matches!(
                    PackageIdentity::parse(input),
                    Err(Error::InvalidIdentityFormat(_))
                ),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_identity_from_str() {
        let id: PackageIdentity = "kernel-core-6.11.4-301.fc43".parse().unwrap();
        assert_eq!(id.name, "kernel-core");
        assert_eq!(id.ver, "6.11.4");
        assert_eq!(id.rel, "301.fc43");
    }

    #[test]
    fn test_highest_epoch_wins() {
        let catalog = PackageCatalog::new(vec![
            record("perl", "5.40", "1", 0, "x86_64"),
            record("perl", "5.40", "1", 5, "x86_64"),
            record("perl", "5.40", "1", 2, "x86_64"),
        ]);

        let selected = resolve(&catalog, "perl-5.40-1", MatchMode::Identity).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].version.epoch, 5);
    }

    #[test]
    fn test_epoch_tie_keeps_document_order() {
        let catalog = PackageCatalog::new(vec![
            record("glibc", "2.40", "3", 0, "x86_64"),
            record("glibc", "2.40", "3", 0, "i686"),
        ]);

        for _ in 0..3 {
            let selected = resolve(&catalog, "glibc-2.40-3", MatchMode::Identity).unwrap();
            assert_eq!(selected.len(), 1);
            assert_eq!(selected[0].arch, "x86_64");
        }
    }

    #[test]
    fn test_version_and_release_must_match() {
        let catalog = PackageCatalog::new(vec![
            record("curl", "8.9.1", "2", 0, "x86_64"),
            record("curl", "8.9.1", "3", 0, "x86_64"),
            record("curl", "8.10.0", "1", 0, "x86_64"),
        ]);

        let selected = resolve(&catalog, "curl-8.9.1-3", MatchMode::Identity).unwrap();
        assert_eq!(selected[0].version.rel, "3");
    }

    #[test]
    fn test_not_found() {
        let catalog = PackageCatalog::new(vec![record("curl", "8.9.1", "2", 0, "x86_64")]);

        let result = resolve(&catalog, "curl-8.9.1-9", MatchMode::Identity);
        assert!(matches!(result, Err(Error::PackageNotFound(ref q)) if q == "curl-8.9.1-9"));

        let result = resolve(&catalog, "wget-1.0-1", MatchMode::Name);
        assert!(matches!(result, Err(Error::PackageNotFound(_))));
    }

    #[test]
    fn test_invalid_query_rejected_before_search() {
        let catalog = PackageCatalog::new(vec![record("curl", "8.9.1", "2", 0, "x86_64")]);
        let result = resolve(&catalog, "curl", MatchMode::Name);
        assert!(matches!(result, Err(Error::InvalidIdentityFormat(_))));
    }

    #[test]
    fn test_name_mode_returns_all_versions() {
        let catalog = PackageCatalog::new(vec![
            record("curl", "8.9.1", "2", 0, "x86_64"),
            record("wget", "1.24", "1", 0, "x86_64"),
            record("curl", "8.10.0", "1", 1, "aarch64"),
        ]);

        let selected = resolve(&catalog, "curl-0-0", MatchMode::Name).unwrap();
        let versions: Vec<&str> = selected.iter().map(|r| r.version.ver.as_str()).collect();
        assert_eq!(versions, vec!["8.9.1", "8.10.0"]);
    }
}
