use crate::commands::create::display_title;
use crate::commands::helpers::find_id;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::{NoteStore, StorageBackend};

pub fn pin<B: StorageBackend, S: AsRef<str>>(
    store: &mut NoteStore<B>,
    references: &[S],
) -> Result<CmdResult> {
    set_pinned(store, references, true)
}

pub fn unpin<B: StorageBackend, S: AsRef<str>>(
    store: &mut NoteStore<B>,
    references: &[S],
) -> Result<CmdResult> {
    set_pinned(store, references, false)
}

fn set_pinned<B: StorageBackend, S: AsRef<str>>(
    store: &mut NoteStore<B>,
    references: &[S],
    pinned: bool,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let verb = if pinned { "pinned" } else { "unpinned" };

    for reference in references {
        let reference = reference.as_ref();
        let Some(id) = find_id(store, reference)? else {
            result.add_message(CmdMessage::warning(format!(
                "Note not found: {}",
                reference
            )));
            continue;
        };
        let Some(mut draft) = store.get(&id).cloned() else {
            continue;
        };

        if draft.pinned == pinned {
            result.add_message(CmdMessage::info(format!(
                "Note already {}: {}",
                verb,
                display_title(&draft.title)
            )));
            continue;
        }

        draft.pinned = pinned;
        store.update(draft)?;
        if let Some(note) = store.get(&id) {
            result.add_message(CmdMessage::success(format!(
                "Note {}: {}",
                verb,
                display_title(&note.title)
            )));
            result.affected_notes.push(note.clone());
        }
    }
    Ok(result)
}
