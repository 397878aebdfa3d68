use crate::commands::create::display_title;
use crate::commands::helpers::find_id;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Note;
use crate::store::{NoteStore, StorageBackend};

/// Edits to apply to one note. Unset fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct NoteUpdate {
    pub reference: String,
    pub title: Option<String>,
    pub content: Option<String>,
    /// `Some(None)` clears the color
    pub color: Option<Option<String>>,
    pub pinned: Option<bool>,
    pub add_tags: Vec<String>,
    pub remove_tags: Vec<String>,
    pub add_images: Vec<String>,
    /// Positions into the current image list
    pub remove_images: Vec<usize>,
}

impl NoteUpdate {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            ..Default::default()
        }
    }

    /// Applies the edits to a detached draft.
    pub fn apply_to(&self, draft: &mut Note) {
        if let Some(title) = &self.title {
            draft.title = title.clone();
        }
        if let Some(content) = &self.content {
            draft.content = content.clone();
        }
        if let Some(color) = &self.color {
            draft.set_color(color.clone());
        }
        if let Some(pinned) = self.pinned {
            draft.pinned = pinned;
        }
        for tag in &self.remove_tags {
            draft.remove_tag(tag);
        }
        for tag in &self.add_tags {
            draft.add_tag(tag);
        }

        // Remove from the back so earlier positions stay valid
        let mut positions = self.remove_images.clone();
        positions.sort_unstable();
        positions.dedup();
        for index in positions.into_iter().rev() {
            draft.remove_image(index);
        }
        for image in &self.add_images {
            draft.add_image(image.clone());
        }
    }
}

pub fn run<B: StorageBackend>(store: &mut NoteStore<B>, update: &NoteUpdate) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    let Some(id) = find_id(store, &update.reference)? else {
        result.add_message(CmdMessage::warning(format!(
            "Note not found: {}",
            update.reference
        )));
        return Ok(result);
    };
    let Some(mut draft) = store.get(&id).cloned() else {
        return Ok(result);
    };

    update.apply_to(&mut draft);
    store.update(draft)?;

    if let Some(note) = store.get(&id) {
        result.add_message(CmdMessage::success(format!(
            "Note updated: {}",
            display_title(&note.title)
        )));
        result.affected_notes.push(note.clone());
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewNote;
    use crate::store::mem_backend::MemBackend;

    fn store_with_note() -> (NoteStore<MemBackend>, String) {
        let mut store = NoteStore::open(MemBackend::new());
        let new = NewNote::new("Title", "Body")
            .with_tags(vec!["a".into(), "b".into()])
            .with_images(vec!["img0".into(), "img1".into(), "img2".into()])
            .with_color("#111");
        store.create(new).unwrap();
        let id = store.notes()[0].id.clone();
        (store, id)
    }

    #[test]
    fn test_update_fields() {
        let (mut store, id) = store_with_note();
        let before = store.notes()[0].last_edited;

        let mut update = NoteUpdate::new(&id);
        update.title = Some("New title".into());
        update.content = Some("New body".into());
        update.color = Some(None);
        update.pinned = Some(true);
        let res = run(&mut store, &update).unwrap();

        let note = store.get(&id).unwrap();
        assert_eq!(note.title, "New title");
        assert_eq!(note.content, "New body");
        assert_eq!(note.color, None);
        assert!(note.pinned);
        assert!(note.last_edited >= before);
        assert!(res.messages[0].content.contains("Note updated: New title"));
    }

    #[test]
    fn test_update_tags_keep_order_without_duplicates() {
        let (mut store, id) = store_with_note();
        let mut update = NoteUpdate::new(&id);
        update.remove_tags = vec!["a".into()];
        update.add_tags = vec!["c".into(), "b".into(), " c ".into()];
        run(&mut store, &update).unwrap();

        assert_eq!(store.get(&id).unwrap().tags, vec!["b", "c"]);
    }

    #[test]
    fn test_update_images_by_position() {
        let (mut store, id) = store_with_note();
        let mut update = NoteUpdate::new(&id);
        update.remove_images = vec![2, 0, 9, 0];
        update.add_images = vec!["img3".into()];
        run(&mut store, &update).unwrap();

        assert_eq!(store.get(&id).unwrap().images, vec!["img1", "img3"]);
    }

    #[test]
    fn test_update_missing_note_warns_and_leaves_store_alone() {
        let (mut store, _) = store_with_note();
        let before = store.notes().to_vec();

        let res = run(&mut store, &NoteUpdate::new("missing")).unwrap();

        assert!(res.messages[0].content.contains("Note not found"));
        assert!(res.affected_notes.is_empty());
        assert_eq!(store.notes(), before.as_slice());
    }

    #[test]
    fn test_update_by_prefix() {
        let (mut store, id) = store_with_note();
        let mut update = NoteUpdate::new(&id[..8]);
        update.content = Some("via prefix".into());
        run(&mut store, &update).unwrap();
        assert_eq!(store.get(&id).unwrap().content, "via prefix");
    }
}
