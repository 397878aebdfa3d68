use crate::error::{NotesError, Result};
use crate::store::{NoteStore, StorageBackend};

/// Finds the id a user reference points at: an exact id, or a prefix that
/// matches exactly one note.
///
/// Returns `Ok(None)` when nothing matches and an error when the prefix is
/// ambiguous.
pub fn find_id<B: StorageBackend>(store: &NoteStore<B>, reference: &str) -> Result<Option<String>> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Ok(None);
    }
    if let Some(note) = store.get(reference) {
        return Ok(Some(note.id.clone()));
    }

    let mut matches = store
        .notes()
        .iter()
        .filter(|n| n.id.starts_with(reference));
    match (matches.next(), matches.next()) {
        (Some(note), None) => Ok(Some(note.id.clone())),
        (None, _) => Ok(None),
        (Some(_), Some(_)) => Err(NotesError::Api(format!(
            "Id prefix '{}' matches more than one note",
            reference
        ))),
    }
}

/// Like [`find_id`], but a missing note is an error.
pub fn resolve_id<B: StorageBackend>(store: &NoteStore<B>, reference: &str) -> Result<String> {
    find_id(store, reference)?.ok_or_else(|| NotesError::NoteNotFound(reference.to_string()))
}

/// Short form of an id for display.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}
