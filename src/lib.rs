// src/lib.rs

//! yum-get
//!
//! Lists and downloads RPM packages straight from a Yum repository,
//! without a local rpm database or yum configuration.
//!
//! # Pipeline
//!
//! - `repodata/repomd.xml` is fetched and the `primary` descriptor located
//! - The primary catalog is fetched, decompressed by extension and parsed
//! - Requested `name-ver-rel` identities are matched, highest epoch wins
//! - Package payloads are streamed into the destination directory

pub mod commands;
pub mod compression;
pub mod config;
mod error;
pub mod repository;
pub mod resolver;

pub use error::{Error, Result};
