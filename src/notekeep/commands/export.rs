use crate::archive;
use crate::commands::{CmdMessage, CmdResult};
use crate::config::NotesConfig;
use crate::error::{NotesError, Result};
use crate::store::{NoteStore, StorageBackend};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes a backup archive of every note.
///
/// `output` may be a file path or an existing directory; without it the
/// archive lands in the current directory under a timestamped name.
pub fn run<B: StorageBackend>(
    store: &NoteStore<B>,
    config: &NotesConfig,
    output: Option<&Path>,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    if store.is_empty() {
        let mut res = CmdResult::default();
        res.add_message(CmdMessage::info("No notes to export."));
        return Ok(res);
    }

    let path = output_path(config, output, now);
    let bytes = archive::encode(store.notes(), now)?;
    fs::write(&path, bytes).map_err(NotesError::Io)?;
    info!(path = %path.display(), count = store.len(), "backup written");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Exported {} notes to {}",
        store.len(),
        path.display()
    )));
    result.output_path = Some(path);
    Ok(result)
}

pub fn default_filename(config: &NotesConfig, now: DateTime<Utc>) -> String {
    format!(
        "{}-{}.tar.gz",
        config.export_prefix,
        now.format("%Y-%m-%d_%H-%M-%S")
    )
}

fn output_path(config: &NotesConfig, output: Option<&Path>, now: DateTime<Utc>) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(default_filename(config, now)),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(default_filename(config, now)),
    }
}
