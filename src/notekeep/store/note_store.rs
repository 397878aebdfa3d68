use super::StorageBackend;
use crate::error::Result;
use crate::model::{dedup_tags, NewNote, Note};
use chrono::Utc;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Record key holding the whole collection.
pub const NOTES_KEY: &str = "notes";

/// Owner of the canonical note collection.
///
/// Every mutation updates the in-memory collection first, then writes the
/// full collection to the backend exactly once before returning. When the
/// write fails the error is returned but the in-memory change is kept, so
/// `notes()` stays ahead of disk until the next successful write.
pub struct NoteStore<B: StorageBackend> {
    backend: B,
    notes: Vec<Note>,
}

impl<B: StorageBackend> NoteStore<B> {
    /// Opens the store and loads whatever the backend holds.
    pub fn open(backend: B) -> Self {
        let notes = load_notes(&backend);
        Self { backend, notes }
    }

    /// Re-reads the persisted collection, replacing the in-memory copy.
    ///
    /// Never fails: unreadable or malformed state loads as an empty collection.
    pub fn load(&mut self) -> &[Note] {
        self.notes = load_notes(&self.backend);
        &self.notes
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Appends a new note with a fresh id and `last_edited` set to now.
    /// The new note is always the last element of the returned collection.
    pub fn create(&mut self, new: NewNote) -> Result<&[Note]> {
        let note = Note::new(new, Utc::now());
        debug!(id = %note.id, "note created");
        self.notes.push(note);
        self.persist()?;
        Ok(&self.notes)
    }

    /// Replaces the stored note with the same id.
    ///
    /// The caller's `last_edited` is ignored. An unknown id leaves the
    /// collection untouched (it is still written back).
    pub fn update(&mut self, mut note: Note) -> Result<&[Note]> {
        match self.notes.iter_mut().find(|n| n.id == note.id) {
            Some(existing) => {
                note.last_edited = Utc::now().max(existing.last_edited);
                note.tags = dedup_tags(std::mem::take(&mut note.tags));
                *existing = note;
                debug!(id = %existing.id, "note updated");
            }
            None => warn!(id = %note.id, "update for unknown note ignored"),
        }
        self.persist()?;
        Ok(&self.notes)
    }

    pub fn delete(&mut self, id: &str) -> Result<&[Note]> {
        self.notes.retain(|n| n.id != id);
        self.persist()?;
        Ok(&self.notes)
    }

    /// Removes every note whose id is in `ids`, with a single write.
    pub fn delete_many<I, S>(&mut self, ids: I) -> Result<&[Note]>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids: HashSet<String> = ids.into_iter().map(|s| s.as_ref().to_string()).collect();
        self.notes.retain(|n| !ids.contains(&n.id));
        self.persist()?;
        Ok(&self.notes)
    }

    /// Replaces the whole collection verbatim: no id checks, no merging.
    pub fn import_replace_all(&mut self, notes: Vec<Note>) -> Result<&[Note]> {
        self.notes = notes;
        self.persist()?;
        Ok(&self.notes)
    }

    fn persist(&self) -> Result<()> {
        let content = serde_json::to_string(&self.notes)?;
        self.backend.save_record(NOTES_KEY, &content)?;
        debug!(count = self.notes.len(), "notes persisted");
        Ok(())
    }
}

fn load_notes<B: StorageBackend>(backend: &B) -> Vec<Note> {
    let raw = match backend.load_record(NOTES_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "could not read stored notes, starting empty");
            return Vec::new();
        }
    };

    let items = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            warn!("stored notes are not an array, starting empty");
            return Vec::new();
        }
        Err(e) => {
            warn!(error = %e, "stored notes are not valid JSON, starting empty");
            return Vec::new();
        }
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value::<Note>(item) {
            Ok(note) => Some(note),
            Err(e) => {
                warn!(index = i, error = %e, "skipping malformed stored note");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;
    use chrono::Duration;

    fn store() -> NoteStore<MemBackend> {
        NoteStore::open(MemBackend::new())
    }

    fn reopened(store: &NoteStore<MemBackend>) -> Vec<Note> {
        let raw = store.backend().raw(NOTES_KEY).unwrap_or_default();
        NoteStore::open(MemBackend::with_record(NOTES_KEY, &raw))
            .notes()
            .to_vec()
    }

    #[test]
    fn test_create_delete_many_scenario() {
        let mut store = store();
        assert!(store.is_empty());

        store.create(NewNote::new("A", "x")).unwrap();
        assert_eq!(store.len(), 1);
        let first_id = store.notes()[0].id.clone();
        assert!(!first_id.is_empty());

        store.create(NewNote::new("B", "y")).unwrap();
        assert_eq!(store.len(), 2);
        let second_id = store.notes()[1].id.clone();

        let notes = store.delete_many([first_id.as_str()]).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, second_id);
        assert_eq!(notes[0].title, "B");
    }

    #[test]
    fn test_create_appends_and_persists() {
        let mut store = store();
        let before = Utc::now();
        let notes = store.create(NewNote::new("A", "x")).unwrap();
        let note = notes.last().unwrap();
        assert!(note.last_edited >= before);
        assert!(!note.pinned);
        assert_eq!(store.backend().write_count(), 1);
        assert_eq!(reopened(&store), store.notes());
    }

    #[test]
    fn test_create_allows_blank_notes() {
        let mut store = store();
        store.create(NewNote::default()).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_keeps_id_and_overrides_last_edited() {
        let mut store = store();
        store.create(NewNote::new("A", "x")).unwrap();
        let original = store.notes()[0].clone();

        let mut draft = original.clone();
        draft.title = "A2".into();
        draft.last_edited = original.last_edited - Duration::days(365);
        draft.add_tag("work");
        store.update(draft).unwrap();

        let updated = store.get(&original.id).unwrap();
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.title, "A2");
        assert_eq!(updated.tags, vec!["work"]);
        assert!(updated.last_edited >= original.last_edited);
        assert_eq!(reopened(&store), store.notes());
    }

    #[test]
    fn test_update_ignores_future_last_edited_from_caller() {
        let mut store = store();
        store.create(NewNote::new("A", "x")).unwrap();
        let mut draft = store.notes()[0].clone();
        let far_future = Utc::now() + Duration::days(3650);
        draft.last_edited = far_future;
        store.update(draft).unwrap();
        assert!(store.notes()[0].last_edited < far_future);
    }

    #[test]
    fn test_update_unknown_id_is_noop_but_still_writes() {
        let mut store = store();
        store.create(NewNote::new("A", "x")).unwrap();
        let before = store.notes().to_vec();

        let mut stranger = before[0].clone();
        stranger.id = "nope".into();
        stranger.title = "changed".into();
        let notes = store.update(stranger).unwrap();

        assert_eq!(notes, before.as_slice());
        assert_eq!(store.backend().write_count(), 2);
    }

    #[test]
    fn test_delete_existing_and_missing() {
        let mut store = store();
        store.create(NewNote::new("A", "x")).unwrap();
        store.create(NewNote::new("B", "y")).unwrap();
        let id = store.notes()[0].id.clone();

        assert_eq!(store.delete("missing").unwrap().len(), 2);
        assert_eq!(store.delete(&id).unwrap().len(), 1);
        assert!(store.get(&id).is_none());
        assert_eq!(reopened(&store), store.notes());
    }

    #[test]
    fn test_delete_many_writes_once() {
        let mut store = store();
        for title in ["a", "b", "c", "d"] {
            store.create(NewNote::new(title, "")).unwrap();
        }
        let ids: Vec<String> = store.notes()[..3].iter().map(|n| n.id.clone()).collect();
        let writes_before = store.backend().write_count();

        store.delete_many(&ids).unwrap();

        assert_eq!(store.backend().write_count(), writes_before + 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.notes()[0].title, "d");
    }

    #[test]
    fn test_import_replace_all_is_verbatim() {
        let mut store = store();
        store.create(NewNote::new("existing", "")).unwrap();

        let now = Utc::now();
        let a = Note::new(NewNote::new("a", ""), now);
        let mut dup = a.clone();
        dup.title = "dup".into();

        let notes = store.import_replace_all(vec![a.clone(), dup.clone()]).unwrap();
        assert_eq!(notes, &[a, dup]);
        assert_eq!(reopened(&store), store.notes());
    }

    #[test]
    fn test_load_handles_corrupt_state() {
        for raw in ["not json", "{\"id\":\"x\"}", "42", ""] {
            let store = NoteStore::open(MemBackend::with_record(NOTES_KEY, raw));
            assert!(store.is_empty(), "expected empty store for {:?}", raw);
        }
    }

    #[test]
    fn test_load_skips_malformed_elements() {
        let raw = r#"[
            {"id":"1","title":"ok","content":"","lastEdited":"2024-01-01T00:00:00Z"},
            {"title":"no id"},
            {"id":"2","title":"bad date","content":"","lastEdited":"yesterday"}
        ]"#;
        let store = NoteStore::open(MemBackend::with_record(NOTES_KEY, raw));
        assert_eq!(store.len(), 1);
        assert_eq!(store.notes()[0].id, "1");
    }

    #[test]
    fn test_load_rereads_backend() {
        let mut store = store();
        store.create(NewNote::new("A", "x")).unwrap();
        let expected = store.notes().to_vec();
        assert_eq!(store.load(), expected.as_slice());
    }

    #[test]
    fn test_write_failure_is_reported_but_memory_is_updated() {
        let mut store = store();
        store.create(NewNote::new("A", "x")).unwrap();
        store.backend().set_simulate_write_error(true);

        let result = store.create(NewNote::new("B", "y"));
        assert!(result.is_err());
        assert_eq!(store.len(), 2);
        // Disk still holds the last successful write
        assert_eq!(reopened(&store).len(), 1);

        store.backend().set_simulate_write_error(false);
        store.delete("missing").unwrap();
        assert_eq!(reopened(&store).len(), 2);
    }

    #[test]
    fn test_mixed_sequence_round_trips_through_persistence() {
        let mut store = store();
        for i in 0..5 {
            store.create(NewNote::new(format!("n{}", i), "body")).unwrap();
        }
        let mut draft = store.notes()[2].clone();
        draft.content = "edited".into();
        draft.pinned = true;
        store.update(draft).unwrap();
        let id = store.notes()[0].id.clone();
        store.delete(&id).unwrap();

        assert_eq!(reopened(&store), store.notes());
    }
}
