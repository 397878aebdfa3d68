use crate::commands::helpers::find_id;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::{NoteStore, StorageBackend};

pub fn run<B: StorageBackend, S: AsRef<str>>(
    store: &NoteStore<B>,
    references: &[S],
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    for reference in references {
        let reference = reference.as_ref();
        match find_id(store, reference)? {
            Some(id) => {
                if let Some(note) = store.get(&id) {
                    result.listed_notes.push(note.clone());
                }
            }
            None => result.add_message(CmdMessage::warning(format!(
                "Note not found: {}",
                reference
            ))),
        }
    }
    Ok(result)
}
