//! JSON file store: one document per survey.
//!
//! ```text
//! <dir>/survey-<id>.json   { "<key>": <value>, ... }
//! ```
//!
//! Writes go to a temp file which is then renamed over the target, so a
//! crash leaves either the old or the new document. A document that no
//! longer parses is replaced by the next write.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;
use survey_model::SurveyId;

use crate::error::{PersistenceError, Result};
use crate::store::SurveyStore;

type Document = BTreeMap<String, Value>;

#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, survey: SurveyId) -> PathBuf {
        self.dir.join(format!("survey-{survey}.json"))
    }

    fn read_document(&self, survey: SurveyId) -> Result<Document> {
        let path = self.path_for(survey);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Document::new()),
            Err(source) => {
                return Err(PersistenceError::Io {
                    operation: "read",
                    path,
                    source,
                });
            }
        };
        serde_json::from_slice(&bytes).map_err(|source| PersistenceError::InvalidFormat {
            operation: "parse",
            path,
            source,
        })
    }

    fn write_document(&self, survey: SurveyId, document: &Document) -> Result<()> {
        let path = self.path_for(survey);
        let bytes =
            serde_json::to_vec_pretty(document).map_err(|source| PersistenceError::InvalidFormat {
                operation: "encode",
                path: path.clone(),
                source,
            })?;

        fs::create_dir_all(&self.dir).map_err(|source| PersistenceError::Io {
            operation: "create directory",
            path: self.dir.clone(),
            source,
        })?;

        let temp_path = path.with_extension("json.tmp");
        let mut file = File::create(&temp_path).map_err(|source| PersistenceError::Io {
            operation: "create",
            path: temp_path.clone(),
            source,
        })?;
        file.write_all(&bytes).map_err(|source| PersistenceError::Io {
            operation: "write",
            path: temp_path.clone(),
            source,
        })?;
        file.sync_all().map_err(|source| PersistenceError::Io {
            operation: "sync",
            path: temp_path.clone(),
            source,
        })?;

        fs::rename(&temp_path, &path).map_err(|source| PersistenceError::AtomicWriteFailed {
            temp_path: temp_path.clone(),
            target_path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "wrote survey settings");
        Ok(())
    }

    fn update(&self, survey: SurveyId, apply: impl FnOnce(&mut Document)) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| PersistenceError::Unavailable("file store lock poisoned".to_string()))?;
        let mut document = match self.read_document(survey) {
            Ok(document) => document,
            Err(error @ PersistenceError::InvalidFormat { .. }) => {
                tracing::warn!(%error, "replacing unreadable survey settings");
                Document::new()
            }
            Err(error) => return Err(error),
        };
        apply(&mut document);
        self.write_document(survey, &document)
    }
}

impl SurveyStore for JsonFileStore {
    fn get(&self, survey: SurveyId, key: &str) -> Result<Option<Value>> {
        Ok(self.read_document(survey)?.remove(key))
    }

    fn set(&self, survey: SurveyId, key: &str, value: Value) -> Result<()> {
        self.update(survey, |document| {
            document.insert(key.to_string(), value);
        })
    }

    fn remove(&self, survey: SurveyId, key: &str) -> Result<()> {
        self.update(survey, |document| {
            document.remove(key);
        })
    }
}
