use crate::archive::{self, DecodeReport, ImportSource};
use crate::commands::{CmdMessage, CmdResult};
use crate::config::NotesConfig;
use crate::error::{NotesError, Result};
use crate::store::{NoteStore, StorageBackend};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Counts reported by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub recovered: usize,
    pub skipped_entries: usize,
    pub failed_inputs: usize,
}

/// Restores notes from backup files and directories.
///
/// Recovered notes replace the whole collection. When nothing could be
/// recovered the collection is left as it was.
pub fn run<B: StorageBackend>(
    store: &mut NoteStore<B>,
    config: &NotesConfig,
    paths: &[PathBuf],
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut sources = Vec::new();
    let mut unreadable = 0;

    for path in paths {
        if path.is_dir() {
            for file in importable_files(config, path)? {
                match ImportSource::from_path(&file) {
                    Ok(source) => sources.push(source),
                    Err(e) => {
                        unreadable += 1;
                        warn!(path = %file.display(), error = %e, "could not read import file");
                        result.add_message(CmdMessage::warning(format!(
                            "Failed to read: {}",
                            file.display()
                        )));
                    }
                }
            }
        } else if path.is_file() {
            match ImportSource::from_path(path) {
                Ok(source) => sources.push(source),
                Err(e) => {
                    unreadable += 1;
                    warn!(path = %path.display(), error = %e, "could not read import file");
                    result.add_message(CmdMessage::warning(format!(
                        "Failed to read: {}",
                        path.display()
                    )));
                }
            }
        } else {
            result.add_message(CmdMessage::warning(format!(
                "Path not found: {}",
                path.display()
            )));
        }
    }

    let mut report = DecodeReport::default();
    for source in &sources {
        let part = archive::decode(std::slice::from_ref(source));
        if let Some(message) = manifest_mismatch(source, part.recovered()) {
            result.add_message(message);
        }
        report.merge(part);
    }
    let summary = ImportSummary {
        recovered: report.recovered(),
        skipped_entries: report.skipped_entries,
        failed_inputs: report.failed_inputs + unreadable,
    };

    if report.failed_inputs > 0 {
        result.add_message(CmdMessage::warning(format!(
            "Could not read {} file(s) as a backup",
            report.failed_inputs
        )));
    }
    if summary.skipped_entries > 0 {
        result.add_message(CmdMessage::warning(format!(
            "Skipped {} unreadable note(s)",
            summary.skipped_entries
        )));
    }

    if report.notes.is_empty() {
        result.add_message(CmdMessage::info(
            "No notes recovered; existing notes left unchanged.",
        ));
    } else {
        store.import_replace_all(report.notes)?;
        result.add_message(CmdMessage::success(format!(
            "Imported {} notes",
            summary.recovered
        )));
        result.affected_notes = store.notes().to_vec();
    }

    result.import_summary = Some(summary);
    Ok(result)
}

/// Warns when an archive's manifest counts more or fewer notes than were read.
fn manifest_mismatch(source: &ImportSource, recovered: usize) -> Option<CmdMessage> {
    if !source.is_archive() {
        return None;
    }
    let manifest = match archive::read_manifest(&source.bytes) {
        Ok(Some(manifest)) => manifest,
        Ok(None) => return None,
        Err(e) => {
            warn!(input = %source.name, error = %e, "could not read backup manifest");
            return None;
        }
    };
    if manifest.note_count == recovered {
        return None;
    }
    warn!(
        input = %source.name,
        expected = manifest.note_count,
        recovered,
        "backup manifest does not match its notes"
    );
    Some(CmdMessage::warning(format!(
        "{} lists {} notes but {} were recovered",
        source.name, manifest.note_count, recovered
    )))
}

/// Files directly inside `dir` whose names match the import extensions,
/// sorted by name so imports are reproducible.
fn importable_files(config: &NotesConfig, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(NotesError::Io)? {
        let path = entry.map_err(NotesError::Io)?.path();
        if !path.is_file() {
            continue;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if config.is_importable(&name) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
