use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::Note;
use crate::store::{NoteStore, StorageBackend};
use std::cmp::Reverse;

/// Narrowing applied by `list`.
#[derive(Debug, Clone, Default)]
pub struct NoteFilter {
    /// Case-insensitive match on title, content or any tag
    pub search: Option<String>,
    /// Exact tag the note must carry
    pub tag: Option<String>,
}

impl NoteFilter {
    pub fn matches(&self, note: &Note) -> bool {
        if let Some(tag) = &self.tag {
            if !note.has_tag(tag) {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                note.title.to_lowercase().contains(&term)
                    || note.content.to_lowercase().contains(&term)
                    || note.tags.iter().any(|t| t.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }
}

/// Pinned notes first, then most recently edited.
pub fn run<B: StorageBackend>(store: &NoteStore<B>, filter: &NoteFilter) -> Result<CmdResult> {
    let mut notes: Vec<Note> = store
        .notes()
        .iter()
        .filter(|n| filter.matches(n))
        .cloned()
        .collect();
    notes.sort_by_key(|n| (Reverse(n.pinned), Reverse(n.last_edited)));
    Ok(CmdResult::default().with_listed_notes(notes))
}
