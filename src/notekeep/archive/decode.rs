use super::{Manifest, MANIFEST_FILE};
use crate::error::{NotesError, Result};
use crate::model::Note;
use flate2::read::GzDecoder;
use serde_json::Value;
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{debug, warn};
use zip::ZipArchive;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZIP_MAGIC: [u8; 4] = [b'P', b'K', 0x03, 0x04];

/// How an input's bytes are laid out, judged by their leading magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    /// Our own `.tar.gz` backups
    TarGz,
    /// Backups written by the older app
    Zip,
    /// Anything else is tried as JSON
    Document,
}

impl Container {
    fn of(bytes: &[u8]) -> Self {
        if bytes.starts_with(&GZIP_MAGIC) {
            Container::TarGz
        } else if bytes.starts_with(&ZIP_MAGIC) {
            Container::Zip
        } else {
            Container::Document
        }
    }
}

/// One file handed to [`decode`]: a display name and its raw bytes.
#[derive(Debug, Clone)]
pub struct ImportSource {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ImportSource {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(NotesError::Io)?;
        Ok(Self::new(path.display().to_string(), bytes))
    }

    /// Whether the bytes are a tar.gz or zip backup rather than a plain document.
    pub fn is_archive(&self) -> bool {
        Container::of(&self.bytes) != Container::Document
    }
}

/// Outcome of a best-effort decode.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DecodeReport {
    /// Every note recovered, in input order.
    pub notes: Vec<Note>,
    /// Archive entries or array elements that could not be turned into a note.
    pub skipped_entries: usize,
    /// Inputs that could not be read as an archive or a document at all.
    pub failed_inputs: usize,
}

impl DecodeReport {
    pub fn recovered(&self) -> usize {
        self.notes.len()
    }

    /// Appends another report's notes after this one's and adds up the counts.
    pub fn merge(&mut self, other: DecodeReport) {
        self.notes.extend(other.notes);
        self.skipped_entries += other.skipped_entries;
        self.failed_inputs += other.failed_inputs;
    }

    fn skip_entry(&mut self, input: &str, entry: &str, reason: &str) {
        warn!(input, entry, reason, "skipping unreadable note");
        self.skipped_entries += 1;
    }

    fn fail_input(&mut self, input: &str, reason: &str) {
        warn!(input, reason, "skipping unreadable import file");
        self.failed_inputs += 1;
    }

    fn push_entry(&mut self, input: &str, entry: &str, body: &[u8]) {
        match parse_archived_note(body) {
            Ok(note) => self.notes.push(note),
            Err(reason) => self.skip_entry(input, entry, &reason),
        }
    }
}

/// Recovers notes from any mix of archives and plain JSON documents.
///
/// Never fails: unreadable entries and inputs are counted and skipped, and
/// the notes found so far are kept. Nothing is deduplicated.
pub fn decode(inputs: &[ImportSource]) -> DecodeReport {
    let mut report = DecodeReport::default();
    for input in inputs {
        match Container::of(&input.bytes) {
            Container::TarGz => decode_tar(input, &mut report),
            Container::Zip => decode_zip(input, &mut report),
            Container::Document => decode_document(input, &mut report),
        }
    }
    debug!(
        recovered = report.recovered(),
        skipped = report.skipped_entries,
        failed = report.failed_inputs,
        "decode finished"
    );
    report
}

fn decode_tar(input: &ImportSource, report: &mut DecodeReport) {
    // A stream that breaks part-way keeps whatever was read before the break
    if let Err(e) = read_tar_notes(input, report) {
        report.fail_input(&input.name, &e.to_string());
    }
}

fn read_tar_notes(input: &ImportSource, report: &mut DecodeReport) -> std::io::Result<()> {
    let mut archive = tar::Archive::new(GzDecoder::new(input.bytes.as_slice()));
    for entry in archive.entries()? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let path = entry.path()?.to_string_lossy().into_owned();
        if !is_note_entry(&path) {
            continue;
        }

        let mut body = Vec::new();
        entry.read_to_end(&mut body)?;
        report.push_entry(&input.name, &path, &body);
    }
    Ok(())
}

/// Zip has a central directory, so one bad entry does not hide the others.
fn decode_zip(input: &ImportSource, report: &mut DecodeReport) {
    let mut archive = match ZipArchive::new(Cursor::new(input.bytes.as_slice())) {
        Ok(archive) => archive,
        Err(e) => return report.fail_input(&input.name, &e.to_string()),
    };

    for i in 0..archive.len() {
        let mut file = match archive.by_index(i) {
            Ok(file) => file,
            Err(e) => {
                report.skip_entry(&input.name, &format!("#{}", i), &e.to_string());
                continue;
            }
        };
        if file.is_dir() {
            continue;
        }
        let path = file.name().to_string();
        if !is_note_entry(&path) {
            continue;
        }

        let mut body = Vec::new();
        if let Err(e) = file.read_to_end(&mut body) {
            report.skip_entry(&input.name, &path, &e.to_string());
            continue;
        }
        report.push_entry(&input.name, &path, &body);
    }
}

fn is_note_entry(path: &str) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    file_name.ends_with(".json") && file_name != MANIFEST_FILE
}

fn is_manifest_entry(path: &str) -> bool {
    path.rsplit('/').next() == Some(MANIFEST_FILE)
}

/// An archived note must carry a non-empty string `id` and a string `title`.
fn parse_archived_note(body: &[u8]) -> std::result::Result<Note, String> {
    let value: Value = serde_json::from_slice(body).map_err(|e| e.to_string())?;
    if !has_identity(&value) {
        return Err("missing id".to_string());
    }
    if !value.get("title").is_some_and(Value::is_string) {
        return Err("missing title".to_string());
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

fn has_identity(value: &Value) -> bool {
    value
        .get("id")
        .and_then(Value::as_str)
        .is_some_and(|id| !id.is_empty())
}

fn decode_document(input: &ImportSource, report: &mut DecodeReport) {
    let value: Value = match serde_json::from_slice(&input.bytes) {
        Ok(value) => value,
        Err(e) => return report.fail_input(&input.name, &e.to_string()),
    };

    match value {
        Value::Array(items) => {
            for (i, item) in items.into_iter().enumerate() {
                match serde_json::from_value::<Note>(item) {
                    Ok(note) => report.notes.push(note),
                    Err(e) => report.skip_entry(&input.name, &format!("[{}]", i), &e.to_string()),
                }
            }
        }
        value if has_identity(&value) => match serde_json::from_value::<Note>(value) {
            Ok(note) => report.notes.push(note),
            Err(e) => report.fail_input(&input.name, &e.to_string()),
        },
        _ => report.fail_input(&input.name, "not a note or a list of notes"),
    }
}

/// Reads the manifest of a tar.gz or zip backup, if it has one.
pub fn read_manifest(bytes: &[u8]) -> Result<Option<Manifest>> {
    let body = match Container::of(bytes) {
        Container::TarGz => tar_manifest(bytes).map_err(NotesError::Io)?,
        Container::Zip => zip_manifest(bytes)?,
        Container::Document => {
            return Err(NotesError::Archive("not a backup archive".to_string()))
        }
    };
    match body {
        Some(body) => Ok(Some(serde_json::from_slice(&body)?)),
        None => Ok(None),
    }
}

fn tar_manifest(bytes: &[u8]) -> std::io::Result<Option<Vec<u8>>> {
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    for entry in archive.entries()? {
        let mut entry = entry?;
        if is_manifest_entry(&entry.path()?.to_string_lossy()) {
            let mut body = Vec::new();
            entry.read_to_end(&mut body)?;
            return Ok(Some(body));
        }
    }
    Ok(None)
}

fn zip_manifest(bytes: &[u8]) -> Result<Option<Vec<u8>>> {
    let archive_err = |e: zip::result::ZipError| NotesError::Archive(e.to_string());
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(archive_err)?;
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(archive_err)?;
        if !file.is_dir() && is_manifest_entry(file.name()) {
            let mut body = Vec::new();
            file.read_to_end(&mut body).map_err(NotesError::Io)?;
            return Ok(Some(body));
        }
    }
    Ok(None)
}
