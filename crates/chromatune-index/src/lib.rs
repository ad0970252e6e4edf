//! Vector index for chromatune.
//!
//! Stores one vector + metadata per song and answers k-nearest queries
//! by squared-L2 distance (ascending, lower = more similar). The store
//! is in-memory with an optional serde snapshot on disk so a later
//! process can attach to a previously built index without re-ingesting.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod memory;
pub mod shared;

pub use error::{IndexError, IndexResult};
pub use memory::{IndexEntry, MemoryIndex};
pub use shared::SharedIndex;

use serde::{Deserialize, Serialize};

/// Write semantics for an ingest run.
///
/// The original system grew three parallel ingestion variants (pure
/// in-memory, full-replace, incremental-upsert); this flag selects the
/// behavior over the one index type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IndexMode {
    /// Build a fresh index off to the side and swap it in atomically at
    /// the end of the ingest. Readers never observe a half-built index.
    #[default]
    Replace,
    /// Upsert each batch into the live index as it is produced. Idempotent
    /// for entries with stable ids; gives partial progress on interruption.
    Accumulate,
}
