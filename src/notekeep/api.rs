//! # API Facade
//!
//! A thin layer over the commands: one method per user-level operation,
//! each returning a `CmdResult`. It owns the [`NoteStore`] for the life of
//! the process, so every client (the CLI today) goes through the same store
//! instance.
//!
//! Business logic belongs in `commands/*.rs`; tests here only check that
//! calls reach the right command.

use crate::commands;
use crate::config::NotesConfig;
use crate::error::Result;
use crate::model::{NewNote, Note};
use crate::store::{NoteStore, StorageBackend};
use chrono::Utc;
use std::path::{Path, PathBuf};

pub struct NotesApi<B: StorageBackend> {
    store: NoteStore<B>,
    config: NotesConfig,
    config_dir: PathBuf,
}

impl<B: StorageBackend> NotesApi<B> {
    pub fn new(store: NoteStore<B>, config: NotesConfig, config_dir: PathBuf) -> Self {
        Self {
            store,
            config,
            config_dir,
        }
    }

    pub fn notes(&self) -> &[Note] {
        self.store.notes()
    }

    pub fn store(&self) -> &NoteStore<B> {
        &self.store
    }

    pub fn create_note(&mut self, new: NewNote) -> Result<CmdResult> {
        commands::create::run(&mut self.store, new)
    }

    pub fn list_notes(&self, filter: &NoteFilter) -> Result<CmdResult> {
        commands::list::run(&self.store, filter)
    }

    pub fn view_notes<S: AsRef<str>>(&self, references: &[S]) -> Result<CmdResult> {
        commands::view::run(&self.store, references)
    }

    pub fn update_note(&mut self, update: &NoteUpdate) -> Result<CmdResult> {
        commands::update::run(&mut self.store, update)
    }

    pub fn delete_notes<S: AsRef<str>>(&mut self, references: &[S]) -> Result<CmdResult> {
        commands::delete::run(&mut self.store, references)
    }

    pub fn pin_notes<S: AsRef<str>>(&mut self, references: &[S]) -> Result<CmdResult> {
        commands::pinning::pin(&mut self.store, references)
    }

    pub fn unpin_notes<S: AsRef<str>>(&mut self, references: &[S]) -> Result<CmdResult> {
        commands::pinning::unpin(&mut self.store, references)
    }

    pub fn export_notes(&self, output: Option<&Path>) -> Result<CmdResult> {
        commands::export::run(&self.store, &self.config, output, Utc::now())
    }

    pub fn import_notes(&mut self, paths: &[PathBuf]) -> Result<CmdResult> {
        commands::import::run(&mut self.store, &self.config, paths)
    }

    pub fn config(&mut self, action: ConfigAction) -> Result<CmdResult> {
        let result = commands::config::run(&self.config_dir, action)?;
        if let Some(config) = &result.config {
            self.config = config.clone();
        }
        Ok(result)
    }
}

pub use crate::commands::config::ConfigAction;
pub use crate::commands::{CmdMessage, CmdResult, ImportSummary, MessageLevel, NoteFilter, NoteUpdate};
