//! Core domain model for chromatune.
//!
//! This crate defines the playlist/track data model shared by the ingest
//! and search pipelines, and the SQLite-backed playlist registry that
//! records which playlists have been ingested.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod registry;

pub use error::{Error, Result};
pub use registry::Registry;
