//! # Storage Layer
//!
//! Persistence is split in two:
//!
//! - [`StorageBackend`] is raw keyed I/O: it knows *how* to read and write a
//!   record, nothing about notes.
//! - [`note_store::NoteStore`] owns the canonical note collection: ids,
//!   timestamps, mutations, and writing the full collection back after every
//!   change.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: production storage, one `<key>.json` per record
//! - [`mem_backend::MemBackend`]: in-memory storage for tests, with write
//!   counting and simulated write failures
//!
//! ## Storage Format
//!
//! ```text
//! <data dir>/
//! ├── notes.json     # The whole collection (JSON array of notes)
//! └── config.json    # NotesConfig
//! ```

use crate::error::Result;

pub mod fs_backend;
pub mod mem_backend;
pub mod note_store;

pub use note_store::NoteStore;

/// Abstract interface for keyed record storage.
///
/// Writes replace the whole record. Implementations should not leave a
/// half-written record behind when they fail.
pub trait StorageBackend {
    /// Read a record. Returns `Ok(None)` when it was never written.
    fn load_record(&self, key: &str) -> Result<Option<String>>;

    /// Replace a record.
    fn save_record(&self, key: &str, value: &str) -> Result<()>;
}
