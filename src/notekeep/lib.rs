//! # Notekeep Architecture
//!
//! Notekeep keeps short notes on the local device and moves them between
//! devices through portable backup archives. The library has no terminal
//! assumptions; the `notekeep` binary is one client of it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, prints results, owns exit codes        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade owning the single NoteStore                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One module per operation, returns CmdResult              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core                                                       │
//! │  - store/: NoteStore over a StorageBackend                  │
//! │  - archive/: tar.gz backup encode / best-effort decode      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership of notes
//!
//! [`store::NoteStore`] is the only thing that mutates the collection. It is
//! built once and handed to [`api::NotesApi`]. Anything a client edits is a
//! cloned draft until it is passed back through `create` or `update`.
//!
//! After every mutation the full collection is written to the backend before
//! the call returns, so a returned collection is what the next `load` sees.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: Business logic for each command
//! - [`store`]: Note store and storage backends
//! - [`archive`]: Backup archive codec
//! - [`model`]: The `Note` type and draft editing helpers
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod archive;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod store;
