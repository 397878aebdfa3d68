//! # Backup Archives
//!
//! A backup is a gzip-compressed tar archive with one pretty-printed JSON
//! document per note plus a manifest:
//!
//! ```text
//! notekeep_backup/
//! ├── manifest.json              # { version, exportDate, noteCount }
//! ├── Groceries_1f2e3.json       # <sanitized title>_<last 5 chars of id>.json
//! └── untitled_a9b8c.json
//! ```
//!
//! [`encode`] writes that layout. [`decode`] reads any mix of such archives,
//! zip backups from the older app (`Noteeeee_Backup/` root, same entry
//! naming) and plain JSON documents (a single note or an array of notes). It
//! recovers as many notes as it can, reporting what it had to skip in a
//! [`DecodeReport`].

use crate::error::{NotesError, Result};
use crate::model::Note;
use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::io::Write;

mod decode;

pub use decode::{decode, read_manifest, DecodeReport, ImportSource};

pub const ROOT_FOLDER: &str = "notekeep_backup";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const FORMAT_VERSION: &str = "1.0";

const MAX_TITLE_CHARS: usize = 50;
const ID_SUFFIX_CHARS: usize = 5;
const FALLBACK_TITLE: &str = "untitled";
const PLACEHOLDER: char = '-';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub note_count: usize,
}

impl Manifest {
    pub fn new(export_date: DateTime<Utc>, note_count: usize) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            export_date,
            note_count,
        }
    }
}

/// Builds a complete archive in memory.
pub fn encode(notes: &[Note], export_date: DateTime<Utc>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_archive(&mut buf, notes, export_date)?;
    Ok(buf)
}

/// Streams an archive of `notes` into `writer`.
pub fn write_archive<W: Write>(
    writer: W,
    notes: &[Note],
    export_date: DateTime<Utc>,
) -> Result<()> {
    let enc = GzEncoder::new(writer, Compression::default());
    let mut tar = tar::Builder::new(enc);
    let mtime = export_date.timestamp().max(0) as u64;

    for note in notes {
        let entry_name = format!("{}/{}", ROOT_FOLDER, entry_filename(&note.title, &note.id));
        let body = serde_json::to_vec_pretty(note)?;
        append_entry(&mut tar, &entry_name, &body, mtime)?;
    }

    let manifest = Manifest::new(export_date, notes.len());
    let body = serde_json::to_vec_pretty(&manifest)?;
    append_entry(
        &mut tar,
        &format!("{}/{}", ROOT_FOLDER, MANIFEST_FILE),
        &body,
        mtime,
    )?;

    let enc = tar.into_inner().map_err(NotesError::Io)?;
    enc.finish().map_err(NotesError::Io)?;
    Ok(())
}

fn append_entry<W: Write>(
    tar: &mut tar::Builder<W>,
    name: &str,
    body: &[u8],
    mtime: u64,
) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(body.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(mtime);
    header.set_cksum();

    tar.append_data(&mut header, name, body)
        .map_err(NotesError::Io)
}

/// Archive entry name for a note: `<sanitized title>_<id suffix>.json`.
///
/// Pure and deterministic. The id suffix keeps notes with identical titles
/// apart.
pub fn entry_filename(title: &str, id: &str) -> String {
    format!("{}_{}.json", sanitize_title(title), id_suffix(id))
}

/// Replaces characters that are illegal on common filesystems with `-`,
/// caps the length and falls back to `untitled` when nothing is left.
pub fn sanitize_title(title: &str) -> String {
    let safe: String = title
        .chars()
        .map(|c| if is_illegal(c) { PLACEHOLDER } else { c })
        .take(MAX_TITLE_CHARS)
        .collect();

    if safe.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        safe
    }
}

fn is_illegal(c: char) -> bool {
    matches!(c, '/' | '\\' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>') || c.is_control()
}

fn id_suffix(id: &str) -> String {
    let count = id.chars().count();
    id.chars()
        .skip(count.saturating_sub(ID_SUFFIX_CHARS))
        .map(|c| if is_illegal(c) { PLACEHOLDER } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewNote;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn note(title: &str, content: &str) -> Note {
        Note::new(NewNote::new(title, content), Utc::now())
    }

    fn entries(bytes: &[u8]) -> Vec<(String, String)> {
        let mut archive = tar::Archive::new(GzDecoder::new(bytes));
        archive
            .entries()
            .unwrap()
            .map(|e| {
                let mut e = e.unwrap();
                let name = e.path().unwrap().to_string_lossy().into_owned();
                let mut body = String::new();
                e.read_to_string(&mut body).unwrap();
                (name, body)
            })
            .collect()
    }

    #[test]
    fn test_encode_writes_one_entry_per_note_plus_manifest() {
        let notes = vec![note("First", "one"), note("Second", "two")];
        let bytes = encode(&notes, Utc::now()).unwrap();

        // gzip magic
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);

        let entries = entries(&bytes);
        assert_eq!(entries.len(), 3);
        assert!(entries
            .iter()
            .all(|(name, _)| name.starts_with("notekeep_backup/")));
        assert!(entries
            .iter()
            .any(|(name, _)| name == &format!("notekeep_backup/{}", entry_filename("First", &notes[0].id))));
    }

    #[test]
    fn test_manifest_content() {
        let export_date = Utc::now();
        let notes = vec![note("a", ""), note("b", ""), note("c", "")];
        let bytes = encode(&notes, export_date).unwrap();

        let (_, body) = entries(&bytes)
            .into_iter()
            .find(|(name, _)| name.ends_with(MANIFEST_FILE))
            .unwrap();
        let manifest: Manifest = serde_json::from_str(&body).unwrap();
        assert_eq!(manifest, Manifest::new(export_date, 3));

        let raw: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(raw["version"], "1.0");
        assert_eq!(raw["noteCount"], 3);
        assert!(raw["exportDate"].is_string());
    }

    #[test]
    fn test_note_entries_are_full_documents() {
        let mut n = note("Shopping", "milk");
        n.add_tag("home");
        n.pinned = true;
        n.color = Some("#ff0000".into());
        let bytes = encode(std::slice::from_ref(&n), Utc::now()).unwrap();

        let (_, body) = entries(&bytes)
            .into_iter()
            .find(|(name, _)| !name.ends_with(MANIFEST_FILE))
            .unwrap();
        let parsed: Note = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed, n);
    }

    #[test]
    fn test_encode_empty_collection() {
        let bytes = encode(&[], Utc::now()).unwrap();
        let entries = entries(&bytes);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].0.ends_with(MANIFEST_FILE));
    }

    #[test]
    fn test_sanitize_replaces_illegal_characters() {
        assert_eq!(sanitize_title("a/b\\c?d%e*f:g|h\"i<j>k"), "a-b-c-d-e-f-g-h-i-j-k");
        assert_eq!(sanitize_title("tab\there"), "tab-here");
        assert_eq!(sanitize_title("Hello World"), "Hello World");
    }

    #[test]
    fn test_sanitize_truncates_and_falls_back() {
        let long = "x".repeat(80);
        assert_eq!(sanitize_title(&long).chars().count(), 50);
        assert_eq!(sanitize_title(""), "untitled");
        assert_eq!(sanitize_title(&"é".repeat(60)).chars().count(), 50);
    }

    #[test]
    fn test_entry_filename_is_deterministic() {
        let id = "123e4567-e89b-12d3-a456-426614174000";
        assert_eq!(entry_filename("Notes: 2024", id), "Notes- 2024_74000.json");
        assert_eq!(entry_filename("Notes: 2024", id), entry_filename("Notes: 2024", id));
        assert_eq!(entry_filename("", "ab"), "untitled_ab.json");
    }

    #[test]
    fn test_entry_filename_never_contains_illegal_characters() {
        let titles = ["a/b", "<script>", "what?", "100%", "C:\\temp", "\"q\"", "x|y*z"];
        for title in titles {
            let name = entry_filename(title, "2024-01-01T00:00:00.000Z");
            assert!(
                !name.chars().any(is_illegal),
                "{:?} produced {:?}",
                title,
                name
            );
        }
    }

    #[test]
    fn test_duplicate_titles_get_distinct_names() {
        let a = note("Same", "");
        let b = note("Same", "");
        assert_ne!(entry_filename(&a.title, &a.id), entry_filename(&b.title, &b.id));
    }
}
