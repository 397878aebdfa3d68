use super::StorageBackend;
use crate::error::{NotesError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File-backed storage: each record is `<root>/<key>.json`.
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn record_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(NotesError::Io)?;
        }
        Ok(())
    }
}

impl StorageBackend for FsBackend {
    fn load_record(&self, key: &str) -> Result<Option<String>> {
        let path = self.record_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(NotesError::Io)?;
        Ok(Some(content))
    }

    fn save_record(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_dir()?;

        // Write to a temp file then rename, so readers never see a partial record
        let tmp_file = self.root.join(format!(".{}-{}.tmp", key, Uuid::new_v4()));
        fs::write(&tmp_file, value).map_err(NotesError::Io)?;
        if let Err(e) = fs::rename(&tmp_file, self.record_path(key)) {
            let _ = fs::remove_file(&tmp_file);
            return Err(NotesError::Io(e));
        }
        Ok(())
    }
}
