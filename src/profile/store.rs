// fitagent — Profile store (single JSON document on disk)

use super::ProfileDocument;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the profile document inside the data directory.
pub const DATA_FILE: &str = "user_data.json";
/// Response dump left behind by older versions. Removed on reset.
pub const LEGACY_RESPONSES_FILE: &str = "agent_responses.json";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to access profile store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("profile store {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize profile: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Reads and writes the profile document as a whole. No locking: the last
/// writer wins.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store rooted in `dir`, using the standard file name.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(DATA_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document. A missing file yields the empty default.
    pub fn load(&self) -> Result<ProfileDocument, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No profile store yet, using defaults");
                return Ok(ProfileDocument::default());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let doc = serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), "Profile loaded");
        Ok(doc)
    }

    /// Overwrite the store with `doc`.
    pub fn save(&self, doc: &ProfileDocument) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(doc)?;
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        // Atomic write: write to temp file then rename
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content).map_err(io_err)?;
        std::fs::rename(&tmp_path, &self.path).map_err(io_err)?;

        tracing::debug!(path = %self.path.display(), "Profile saved");
        Ok(())
    }

    /// Delete the store file and its legacy sibling. Absent files are fine.
    pub fn reset(&self) -> Result<(), StoreError> {
        let mut targets = vec![self.path.clone()];
        if let Some(parent) = self.path.parent() {
            targets.push(parent.join(LEGACY_RESPONSES_FILE));
        }

        for target in targets {
            match std::fs::remove_file(&target) {
                Ok(()) => tracing::info!(path = %target.display(), "Removed store file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => return Err(StoreError::Io { path: target, source }),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Gender, Goal, NutritionTargets, PersonalInfo};
    use tempfile::TempDir;

    fn sample() -> ProfileDocument {
        ProfileDocument {
            personal: PersonalInfo {
                name: Some("Sam".into()),
                age: Some(30),
                weight: Some(80.5),
                height: Some(178.0),
                gender: Some(Gender::Other),
            },
            goals: vec![Goal::WeightLoss, Goal::Endurance],
            nutrition: NutritionTargets {
                calories: Some(2200.0),
                protein: Some(140.0),
                fat: Some(60.0),
                carbs: Some(230.0),
            },
            notes: vec!["sore shoulder".into(), "no dairy".into()],
            nutrition_plan: Some("Breakfast: oats\nLunch: rice".into()),
        }
    }

    #[test]
    fn test_load_missing_returns_default() {
        let tmp = TempDir::new().unwrap();
        let store = ProfileStore::in_dir(tmp.path());
        let doc = store.load().unwrap();
        assert_eq!(doc, ProfileDocument::default());
        assert!(doc.personal.is_empty());
        assert!(doc.goals.is_empty());
        assert!(doc.nutrition.is_empty());
        assert!(doc.notes.is_empty());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let store = ProfileStore::in_dir(&tmp.path().join("nested"));
        let doc = sample();

        store.save(&doc).unwrap();
        assert_eq!(store.load().unwrap(), doc);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let store = ProfileStore::in_dir(tmp.path());
        std::fs::write(store.path(), "{not json").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert!(err.to_string().contains("corrupt"));
    }

    #[test]
    fn test_reset_removes_files() {
        let tmp = TempDir::new().unwrap();
        let store = ProfileStore::in_dir(tmp.path());
        store.save(&sample()).unwrap();
        let legacy = tmp.path().join(LEGACY_RESPONSES_FILE);
        std::fs::write(&legacy, "{}").unwrap();

        store.reset().unwrap();
        assert!(!store.path().exists());
        assert!(!legacy.exists());
        assert_eq!(store.load().unwrap(), ProfileDocument::default());
    }

    #[test]
    fn test_reset_when_absent_is_noop() {
        let tmp = TempDir::new().unwrap();
        let store = ProfileStore::in_dir(tmp.path());
        store.reset().unwrap();
        store.reset().unwrap();
    }
}
