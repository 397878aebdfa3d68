use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::NewNote;
use crate::store::{NoteStore, StorageBackend};

pub fn run<B: StorageBackend>(store: &mut NoteStore<B>, new: NewNote) -> Result<CmdResult> {
    let notes = store.create(new)?;
    let mut result = CmdResult::default();
    if let Some(note) = notes.last() {
        result.add_message(CmdMessage::success(format!(
            "Note created: {}",
            display_title(&note.title)
        )));
        result.affected_notes.push(note.clone());
    }
    Ok(result)
}

pub(crate) fn display_title(title: &str) -> &str {
    if title.trim().is_empty() {
        "(untitled)"
    } else {
        title
    }
}
