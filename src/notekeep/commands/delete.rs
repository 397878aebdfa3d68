use crate::commands::create::display_title;
use crate::commands::helpers::find_id;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::{NoteStore, StorageBackend};

/// Deletes every referenced note with a single store write.
pub fn run<B: StorageBackend, S: AsRef<str>>(
    store: &mut NoteStore<B>,
    references: &[S],
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut ids = Vec::new();

    for reference in references {
        let reference = reference.as_ref();
        match find_id(store, reference)? {
            Some(id) => {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            None => result.add_message(CmdMessage::warning(format!(
                "Note not found: {}",
                reference
            ))),
        }
    }

    if ids.is_empty() {
        result.add_message(CmdMessage::info("Nothing to delete."));
        return Ok(result);
    }

    let removed: Vec<_> = ids.iter().filter_map(|id| store.get(id).cloned()).collect();
    store.delete_many(&ids)?;

    for note in &removed {
        result.add_message(CmdMessage::success(format!(
            "Note deleted: {}",
            display_title(&note.title)
        )));
    }
    Ok(result.with_affected_notes(removed))
}
