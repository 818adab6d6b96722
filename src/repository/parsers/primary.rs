// src/repository/parsers/primary.rs

//! primary.xml parser
//!
//! Parses the package catalog into records, keeping document order.
//! Only the fields needed to list, match and download a package are
//! kept; the `<format>` section (provides, requires, files) is skipped.

use super::{attr, malformed, Checksum};
use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt;
use std::io::BufRead;
use tracing::debug;

/// Depth of `<package>` (children of `<metadata>`)
const PACKAGE_DEPTH: usize = 2;

/// Package version triple from `<version epoch=".." ver=".." rel=".."/>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageVersion {
    /// Defaults to 0 when absent
    pub epoch: i64,
    pub ver: String,
    pub rel: String,
}

/// One `<package>` entry of the primary catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageRecord {
    pub name: String,
    /// x86_64, aarch64, noarch, src, ...
    pub arch: String,
    pub version: PackageVersion,
    /// Published checksum of the package file (not verified)
    pub checksum: Checksum,
    /// `href` of `<location>`, relative to the repository base
    pub location: String,
    /// One-line summary, may be empty
    pub summary: String,
}

impl PackageRecord {
    /// `name-ver-rel`, the form users request packages by
    pub fn nvr(&self) -> String {
        format!("{}-{}-{}", self.name, self.version.ver, self.version.rel)
    }
}

/// Listing format: `name-ver-rel (arch): summary`
impl fmt::Display for PackageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{} ({}): {}",
            self.name, self.version.ver, self.version.rel, self.arch, self.summary
        )
    }
}

/// Parsed primary.xml, records in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageCatalog {
    packages: Vec<PackageRecord>,
}

impl PackageCatalog {
    /// Build a catalog from records already in document order
    pub fn new(packages: Vec<PackageRecord>) -> Self {
        Self { packages }
    }

    /// Parse primary.xml from a buffered (already decompressed) reader
    pub fn parse<R: BufRead>(input: R) -> Result<Self> {
        let mut reader = Reader::from_reader(input);

        let mut state = ParseState::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    state.depth += 1;
                    state.open(&reader, &e)?;
                }
                Ok(Event::Empty(e)) => {
                    state.depth += 1;
                    state.open(&reader, &e)?;
                    state.close(e.local_name().as_ref());
                    state.depth -= 1;
                }
                Ok(Event::Text(e)) => {
                    if state.field.is_some() {
                        let text = e.unescape().map_err(|e| malformed(&reader, e))?;
                        state.text.push_str(&text);
                    }
                }
                Ok(Event::CData(e)) => {
                    if state.field.is_some() {
                        state.text.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Ok(Event::End(e)) => {
                    state.close(e.local_name().as_ref());
                    state.depth = state.depth.saturating_sub(1);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(malformed(&reader, e)),
                _ => {}
            }
            buf.clear();
        }

        if !state.seen_root {
            return Err(Error::MalformedMetadata(
                "primary metadata is empty".to_string(),
            ));
        }
        if state.depth != 0 {
            return Err(Error::MalformedMetadata(
                "unexpected end of primary metadata".to_string(),
            ));
        }

        debug!("primary metadata lists {} packages", state.packages.len());
        Ok(Self::new(state.packages))
    }

    /// Parse primary.xml from a string
    pub fn parse_str(xml: &str) -> Result<Self> {
        Self::parse(xml.as_bytes())
    }

    /// Records in document order
    pub fn packages(&self) -> &[PackageRecord] {
        &self.packages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PackageRecord> {
        self.packages.iter()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl<'a> IntoIterator for &'a PackageCatalog {
    type Item = &'a PackageRecord;
    type IntoIter = std::slice::Iter<'a, PackageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.packages.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Arch,
    Checksum,
    Summary,
}

#[derive(Default)]
struct ParseState {
    packages: Vec<PackageRecord>,
    current: Option<PackageRecord>,
    field: Option<(Field, usize)>,
    text: String,
    depth: usize,
    seen_root: bool,
}

impl ParseState {
    fn open<R>(&mut self, reader: &Reader<R>, e: &BytesStart<'_>) -> Result<()> {
        self.seen_root = true;
        let name = e.local_name();

        if self.depth == PACKAGE_DEPTH {
            if name.as_ref() == b"package" {
                self.current = Some(PackageRecord::default());
            }
            return Ok(());
        }

        if self.depth != PACKAGE_DEPTH + 1 {
            return Ok(());
        }
        let Some(pkg) = self.current.as_mut() else {
            return Ok(());
        };

        match name.as_ref() {
            b"name" => self.begin_field(Field::Name),
            b"arch" => self.begin_field(Field::Arch),
            b"summary" => self.begin_field(Field::Summary),
            b"checksum" => {
                pkg.checksum.checksum_type = attr(reader, e, "type")?.unwrap_or_default();
                self.begin_field(Field::Checksum);
            }
            b"location" => {
                pkg.location = attr(reader, e, "href")?.unwrap_or_default();
            }
            b"version" => {
                pkg.version.ver = attr(reader, e, "ver")?.unwrap_or_default();
                pkg.version.rel = attr(reader, e, "rel")?.unwrap_or_default();
                let epoch = attr(reader, e, "epoch")?.unwrap_or_default();
                pkg.version.epoch = parse_epoch(&epoch).map_err(|err| malformed(reader, err))?;
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        if let Some((field, depth)) = self.field {
            if depth == self.depth {
                self.field = None;
                // Text and CDATA pieces are joined first, then trimmed as a whole
                let text = self.text.trim().to_string();
                self.text.clear();
                if let Some(pkg) = self.current.as_mut() {
                    match field {
                        Field::Name => pkg.name = text,
                        Field::Arch => pkg.arch = text,
                        Field::Checksum => pkg.checksum.value = text,
                        Field::Summary => pkg.summary = text,
                    }
                }
            }
        }

        if name == b"package" && self.depth == PACKAGE_DEPTH {
            if let Some(pkg) = self.current.take() {
                self.packages.push(pkg);
            }
        }
    }

    fn begin_field(&mut self, field: Field) {
        self.field = Some((field, self.depth));
        self.text.clear();
    }
}

/// Absent or empty epoch means 0
fn parse_epoch(value: &str) -> std::result::Result<i64, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse()
        .map_err(|e| format!("invalid epoch '{value}': {e}"))
}
