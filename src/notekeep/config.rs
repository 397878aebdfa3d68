use crate::error::{NotesError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_EXPORT_PREFIX: &str = "notekeep";

/// Configuration for notekeep, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotesConfig {
    /// Prefix of generated backup file names (`<prefix>-<timestamp>.tar.gz`)
    #[serde(default = "default_export_prefix")]
    pub export_prefix: String,

    /// File suffixes picked up when importing a directory
    #[serde(default = "default_import_ext")]
    pub import_extensions: Vec<String>,
}

fn default_export_prefix() -> String {
    DEFAULT_EXPORT_PREFIX.to_string()
}

fn default_import_ext() -> Vec<String> {
    [".tar.gz", ".tgz", ".zip", ".json"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            export_prefix: default_export_prefix(),
            import_extensions: default_import_ext(),
        }
    }
}

impl NotesConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(NotesError::Io)?;
        let config: NotesConfig =
            serde_json::from_str(&content).map_err(NotesError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(NotesError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(NotesError::Serialization)?;
        fs::write(config_path, content).map_err(NotesError::Io)?;
        Ok(())
    }

    /// Whether a file name matches one of the import extensions (case-insensitive).
    pub fn is_importable(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.import_extensions
            .iter()
            .any(|ext| lower.ends_with(&ext.to_lowercase()))
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "export-prefix" => Some(self.export_prefix.clone()),
            "import-extensions" => Some(self.import_extensions.join(",")),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "export-prefix" => {
                let value = value.trim();
                if value.is_empty() {
                    return Err(NotesError::Api("export-prefix cannot be empty".into()));
                }
                self.export_prefix = value.to_string();
            }
            "import-extensions" => {
                self.import_extensions = value
                    .split(',')
                    .map(str::trim)
                    .filter(|ext| !ext.is_empty())
                    .map(normalize_ext)
                    .collect();
            }
            _ => return Err(NotesError::Api(format!("Unknown config key: {}", key))),
        }
        Ok(())
    }
}

fn normalize_ext(ext: &str) -> String {
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}
