// src/repository/parsers/repomd.rs

//! repomd.xml parser
//!
//! The repository index lists one `<data type="...">` descriptor per
//! metadata file (primary, filelists, other, ...), each with a checksum,
//! a location relative to the repository base and a timestamp.

use super::{attr, malformed, Checksum};
use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::BufRead;
use tracing::debug;

/// Descriptor kind of the package catalog
pub const PRIMARY_KIND: &str = "primary";

/// Depth of `<data>` and `<revision>` (children of `<repomd>`)
const DESCRIPTOR_DEPTH: usize = 2;

/// Parsed repomd.xml
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoMd {
    /// Repository revision, if published
    pub revision: Option<String>,
    /// Descriptors in document order
    pub data: Vec<RepoData>,
}

/// One `<data>` descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoData {
    /// The `type` attribute ("primary", "filelists", ...)
    pub kind: String,
    pub checksum: Checksum,
    /// `href` of the nested `<location>`, relative to the repository base
    pub location: String,
    /// Unix timestamp of the referenced file
    pub timestamp: Option<i64>,
}

impl RepoMd {
    /// Parse repomd.xml from a buffered reader
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
                    state.close(&reader, e.local_name().as_ref())?;
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
                    state.close(&reader, e.local_name().as_ref())?;
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
                "repomd.xml is empty".to_string(),
            ));
        }
        if state.depth != 0 {
            return Err(Error::MalformedMetadata(
                "unexpected end of repomd.xml".to_string(),
            ));
        }

        debug!(
            "repomd.xml revision {:?} lists {} metadata files",
            state.doc.revision,
            state.doc.data.len()
        );
        Ok(state.doc)
    }

    /// Parse repomd.xml from a string
    pub fn parse_str(xml: &str) -> Result<Self> {
        Self::parse(xml.as_bytes())
    }

    /// The first descriptor of kind "primary"
    ///
    /// Duplicates are not an error; later primaries are ignored.
    pub fn find_primary(&self) -> Option<&RepoData> {
        self.data.iter().find(|data| data.kind == PRIMARY_KIND)
    }

    /// Location of the primary catalog relative to the repository base
    pub fn primary_location(&self) -> Result<&str> {
        match self.find_primary() {
            Some(data) if !data.location.is_empty() => Ok(&data.location),
            _ => Err(Error::PrimaryNotFound),
        }
    }
}

/// Leaf elements whose text we keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Revision,
    Checksum,
    Timestamp,
}

#[derive(Default)]
struct ParseState {
    doc: RepoMd,
    current: Option<RepoData>,
    field: Option<(Field, usize)>,
    text: String,
    depth: usize,
    seen_root: bool,
}

impl ParseState {
    fn open<R>(&mut self, reader: &Reader<R>, e: &BytesStart<'_>) -> Result<()> {
        self.seen_root = true;
        let depth = self.depth;

        match (e.local_name().as_ref(), depth) {
            (b"revision", DESCRIPTOR_DEPTH) => self.begin_field(Field::Revision),
            (b"data", DESCRIPTOR_DEPTH) => {
                self.current = Some(RepoData {
                    kind: attr(reader, e, "type")?.unwrap_or_default(),
                    ..Default::default()
                });
            }
            (name, d) if d == DESCRIPTOR_DEPTH + 1 => {
                let Some(data) = self.current.as_mut() else {
                    return Ok(());
                };
                match name {
                    b"checksum" => {
                        data.checksum.checksum_type = attr(reader, e, "type")?.unwrap_or_default();
                        self.begin_field(Field::Checksum);
                    }
                    b"location" => {
                        data.location = attr(reader, e, "href")?.unwrap_or_default();
                    }
                    b"timestamp" => self.begin_field(Field::Timestamp),
                    _ => {}
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close<R>(&mut self, reader: &Reader<R>, name: &[u8]) -> Result<()> {
        if let Some((field, depth)) = self.field {
            if depth == self.depth {
                self.field = None;
                // Text and CDATA pieces are joined first, then trimmed as a whole
                let text = self.text.trim().to_string();
                self.text.clear();
                self.commit(reader, field, text)?;
            }
        }

        if name == b"data" && self.depth == DESCRIPTOR_DEPTH {
            if let Some(data) = self.current.take() {
                self.doc.data.push(data);
            }
        }
        Ok(())
    }

    fn begin_field(&mut self, field: Field) {
        self.field = Some((field, self.depth));
        self.text.clear();
    }

    fn commit<R>(&mut self, reader: &Reader<R>, field: Field, text: String) -> Result<()> {
        match field {
            Field::Revision => self.doc.revision = Some(text),
            Field::Checksum => {
                if let Some(data) = self.current.as_mut() {
                    data.checksum.value = text;
                }
            }
            Field::Timestamp => {
                if let Some(data) = self.current.as_mut() {
                    let timestamp = text
                        .trim()
                        .parse::<i64>()
                        .map_err(|e| malformed(reader, format!("invalid timestamp '{text}': {e}")))?;
                    data.timestamp = Some(timestamp);
                }
            }
        }
        Ok(())
    }
}
