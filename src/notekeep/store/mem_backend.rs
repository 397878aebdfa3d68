use super::StorageBackend;
use crate::error::{NotesError, Result};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since the store is single-threaded.
/// This keeps `StorageBackend` on `&self` without paying for a lock.
#[derive(Default)]
pub struct MemBackend {
    records: RefCell<HashMap<String, String>>,
    writes: Cell<usize>,
    simulate_write_error: Cell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-seeded with a raw record, e.g. deliberately corrupt data.
    pub fn with_record(key: &str, value: &str) -> Self {
        let backend = Self::new();
        backend
            .records
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        backend
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.records.borrow().get(key).cloned()
    }
}

impl StorageBackend for MemBackend {
    fn load_record(&self, key: &str) -> Result<Option<String>> {
        Ok(self.records.borrow().get(key).cloned())
    }

    fn save_record(&self, key: &str, value: &str) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(NotesError::Store("Simulated write error".to_string()));
        }
        self.records
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_record_is_none() {
        let backend = MemBackend::new();
        assert_eq!(backend.load_record("notes").unwrap(), None);
    }

    #[test]
    fn test_save_and_load() {
        let backend = MemBackend::new();
        backend.save_record("notes", "[]").unwrap();
        assert_eq!(backend.load_record("notes").unwrap().as_deref(), Some("[]"));
        assert_eq!(backend.write_count(), 1);
    }

    #[test]
    fn test_simulated_write_error_keeps_previous_value() {
        let backend = MemBackend::with_record("notes", "[1]");
        backend.set_simulate_write_error(true);
        assert!(backend.save_record("notes", "[2]").is_err());
        assert_eq!(backend.raw("notes").as_deref(), Some("[1]"));
        assert_eq!(backend.write_count(), 0);
    }
}
