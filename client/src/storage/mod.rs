//! Client-side persisted settings.
//!
//! The engine persists a single marker: the id of the last volunteer reply
//! the parent viewed, used to derive the unread badge. The trait abstracts
//! the storage location so workflows can be driven against an in-memory
//! store in tests. The marker is keyed per installation, not per parent.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

/// Storage for the last-viewed volunteer reply marker.
pub trait MarkerStorage: Send + Sync {
    /// Id of the most recently viewed reply, if any was ever recorded.
    fn last_viewed_reply(&self) -> Result<Option<String>>;

    /// Record a reply id as viewed, replacing any previous marker.
    fn set_last_viewed_reply(&self, reply_id: &str) -> Result<()>;
}

/// On-disk client settings, one YAML file in the data directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ClientSettings {
    last_viewed_reply_id: Option<String>,
}

/// YAML-file-backed settings store (`settings.yaml` in the data directory).
///
/// Writes go through a temp file followed by a rename so a crash mid-write
/// cannot leave a truncated settings file behind.
pub struct YamlSettingsStore {
    path: PathBuf,
}

impl YamlSettingsStore {
    pub fn new(data_directory: PathBuf) -> Self {
        Self {
            path: data_directory.join("settings.yaml"),
        }
    }

    fn load(&self) -> Result<ClientSettings> {
        if !self.path.exists() {
            return Ok(ClientSettings::default());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings file {}", self.path.display()))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse settings file {}", self.path.display()))
    }

    fn save(&self, settings: &ClientSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory {}", parent.display()))?;
        }
        let yaml = serde_yaml::to_string(settings).context("Failed to serialize settings")?;
        let temp_path = self.path.with_extension("yaml.tmp");
        fs::write(&temp_path, yaml)
            .with_context(|| format!("Failed to write settings file {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to move settings file into place at {}", self.path.display()))?;
        Ok(())
    }
}

impl MarkerStorage for YamlSettingsStore {
    fn last_viewed_reply(&self) -> Result<Option<String>> {
        Ok(self.load()?.last_viewed_reply_id)
    }

    fn set_last_viewed_reply(&self, reply_id: &str) -> Result<()> {
        debug!("Recording last viewed reply: {}", reply_id);
        let mut settings = self.load()?;
        settings.last_viewed_reply_id = Some(reply_id.to_string());
        self.save(&settings)
    }
}

/// In-memory marker store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemoryMarkerStore {
    marker: Mutex<Option<String>>,
}

impl MarkerStorage for InMemoryMarkerStore {
    fn last_viewed_reply(&self) -> Result<Option<String>> {
        Ok(self.marker.lock().unwrap().clone())
    }

    fn set_last_viewed_reply(&self, reply_id: &str) -> Result<()> {
        *self.marker.lock().unwrap() = Some(reply_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_settings_file_reads_as_no_marker() {
        let dir = tempdir().unwrap();
        let store = YamlSettingsStore::new(dir.path().to_path_buf());
        assert_eq!(store.last_viewed_reply().unwrap(), None);
    }

    #[test]
    fn test_marker_roundtrip_and_overwrite() {
        let dir = tempdir().unwrap();
        let store = YamlSettingsStore::new(dir.path().to_path_buf());

        store.set_last_viewed_reply("t1").unwrap();
        assert_eq!(store.last_viewed_reply().unwrap(), Some("t1".to_string()));

        store.set_last_viewed_reply("t2").unwrap();
        assert_eq!(store.last_viewed_reply().unwrap(), Some("t2".to_string()));

        // A fresh store over the same directory sees the persisted marker.
        let reopened = YamlSettingsStore::new(dir.path().to_path_buf());
        assert_eq!(reopened.last_viewed_reply().unwrap(), Some("t2".to_string()));
    }

    #[test]
    fn test_creates_data_directory_on_first_write() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("milestone-tracker");
        let store = YamlSettingsStore::new(nested.clone());
        store.set_last_viewed_reply("t9").unwrap();
        assert!(nested.join("settings.yaml").exists());
    }

    #[test]
    fn test_in_memory_store() {
        let store = InMemoryMarkerStore::default();
        assert_eq!(store.last_viewed_reply().unwrap(), None);
        store.set_last_viewed_reply("t3").unwrap();
        assert_eq!(store.last_viewed_reply().unwrap(), Some("t3".to_string()));
    }
}
