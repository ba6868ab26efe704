//! Date-stamped JSON artifact store.
//!
//! Every agent run writes exactly one artifact named `{prefix}-YYYY-MM-DD.json`
//! into a directory under the store root. "Latest" is the lexicographically
//! greatest matching filename — correct only because the date component is
//! zero-padded and ISO-ordered, which is a documented invariant of this
//! store, not an accident of the naming scheme.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::StoreError;

/// One loaded artifact: where it came from and its parsed contents.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub path: PathBuf,
    pub value: Value,
}

/// Filesystem-backed artifact store rooted at one directory.
///
/// Each artifact kind lives in its own subdirectory (`dir`) and shares a
/// filename prefix. Concurrent writers are out of scope; callers serialize
/// runs externally.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the most recent artifact of a kind, or `None` when the
    /// directory is missing or holds no matching files.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the directory exists but cannot be listed,
    /// or the newest matching file cannot be read or parsed.
    pub fn latest(&self, dir: &str, prefix: &str) -> Result<Option<Artifact>, StoreError> {
        let dir_path = self.root.join(dir);
        if !dir_path.exists() {
            return Ok(None);
        }

        let entries = fs::read_dir(&dir_path).map_err(|e| StoreError::Io {
            path: dir_path.display().to_string(),
            source: e,
        })?;

        let full_prefix = format!("{prefix}-");
        let mut newest: Option<String> = None;
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::Io {
                path: dir_path.display().to_string(),
                source: e,
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(&full_prefix) && name.ends_with(".json") {
                // Lexicographic max == most recent date; the invariant this
                // store exists to preserve.
                if newest.as_deref().is_none_or(|n| name.as_str() > n) {
                    newest = Some(name);
                }
            }
        }

        let Some(name) = newest else {
            return Ok(None);
        };
        let path = dir_path.join(name);

        let content = fs::read_to_string(&path).map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let value: Value = serde_json::from_str(&content)?;

        Ok(Some(Artifact { path, value }))
    }

    /// Like [`latest`](Self::latest) but deserialized into a concrete type.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on listing, read, or deserialization failure.
    pub fn latest_as<T: DeserializeOwned>(
        &self,
        dir: &str,
        prefix: &str,
    ) -> Result<Option<(PathBuf, T)>, StoreError> {
        match self.latest(dir, prefix)? {
            Some(artifact) => {
                let typed: T = serde_json::from_value(artifact.value)?;
                Ok(Some((artifact.path, typed)))
            }
            None => Ok(None),
        }
    }

    /// Write one date-stamped artifact, creating the kind directory as
    /// needed. The write is atomic: a temp file in the same directory is
    /// renamed over the final path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the directory cannot be created or the file
    /// cannot be written or renamed.
    pub fn save(
        &self,
        dir: &str,
        prefix: &str,
        date: NaiveDate,
        value: &Value,
    ) -> Result<PathBuf, StoreError> {
        let dir_path = self.root.join(dir);
        fs::create_dir_all(&dir_path).map_err(|e| StoreError::Io {
            path: dir_path.display().to_string(),
            source: e,
        })?;

        let name = format!("{prefix}-{}.json", date.format("%Y-%m-%d"));
        let path = dir_path.join(&name);
        write_json_atomic(&path, value)?;

        Ok(path)
    }
}

/// Serialize `value` as pretty JSON to `path` via a temp file + rename.
pub(crate) fn write_json_atomic(path: &Path, value: &Value) -> Result<(), StoreError> {
    let content = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");

    fs::write(&tmp, content).map_err(|e| StoreError::Io {
        path: tmp.display().to_string(),
        source: e,
    })?;
    fs::rename(&tmp, path).map_err(|e| StoreError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_store() -> (PathBuf, ArtifactStore) {
        let root = std::env::temp_dir().join(format!("growloop-store-{}", uuid::Uuid::new_v4()));
        (root.clone(), ArtifactStore::new(root))
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn latest_returns_none_for_missing_directory() {
        let (_root, store) = temp_store();
        let result = store.latest("prospects", "prospects").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn latest_returns_most_recent_by_filename() {
        let (root, store) = temp_store();

        store
            .save("metrics", "metrics", date("2026-08-10"), &json!({"week": 1}))
            .unwrap();
        store
            .save("metrics", "metrics", date("2026-08-17"), &json!({"week": 2}))
            .unwrap();
        store
            .save("metrics", "metrics", date("2026-08-03"), &json!({"week": 0}))
            .unwrap();

        let artifact = store.latest("metrics", "metrics").unwrap().unwrap();
        assert_eq!(artifact.value["week"], 2);
        assert!(artifact
            .path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .contains("2026-08-17"));

        std::fs::remove_dir_all(root).ok();
    }

    #[test]
    fn latest_ignores_files_with_other_prefixes() {
        let (root, store) = temp_store();

        store
            .save("out", "metrics", date("2026-08-17"), &json!({"kind": "metrics"}))
            .unwrap();
        store
            .save("out", "insights", date("2026-08-24"), &json!({"kind": "insights"}))
            .unwrap();

        let artifact = store.latest("out", "metrics").unwrap().unwrap();
        assert_eq!(artifact.value["kind"], "metrics");

        std::fs::remove_dir_all(root).ok();
    }

    #[test]
    fn save_overwrites_same_date_atomically() {
        let (root, store) = temp_store();

        store
            .save("plans", "campaign", date("2026-08-24"), &json!({"rev": 1}))
            .unwrap();
        store
            .save("plans", "campaign", date("2026-08-24"), &json!({"rev": 2}))
            .unwrap();

        let artifact = store.latest("plans", "campaign").unwrap().unwrap();
        assert_eq!(artifact.value["rev"], 2);

        // No temp files left behind.
        let leftovers: Vec<_> = std::fs::read_dir(root.join("plans"))
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());

        std::fs::remove_dir_all(root).ok();
    }

    #[test]
    fn latest_as_deserializes_typed() {
        #[derive(serde::Deserialize)]
        struct Doc {
            week: u32,
        }

        let (root, store) = temp_store();
        store
            .save("metrics", "metrics", date("2026-08-17"), &json!({"week": 7}))
            .unwrap();

        let (_path, doc): (PathBuf, Doc) =
            store.latest_as("metrics", "metrics").unwrap().unwrap();
        assert_eq!(doc.week, 7);

        std::fs::remove_dir_all(root).ok();
    }
}
