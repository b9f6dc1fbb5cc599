use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::StoreError;
use crate::models::{Tag, Task};

/// Key holding the JSON array of every task.
pub const TASKS_KEY: &str = "TASKS";
/// Key holding the username of the logged-in user.
pub const SESSION_KEY: &str = "loggedInUser";

/// Whole-document key-value store backed by one JSON file.
///
/// Every value is a JSON-encoded string, mirroring the on-device layout:
/// `TASKS` holds the task array, `loggedInUser` the session pointer, and
/// every other key a single user record. Each call reads or rewrites the
/// whole file; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Store { path: path.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Store::open(config.store_path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the raw encoded value stored under `key`.
    pub fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    /// Stores an already-encoded value under `key`, replacing any previous one.
    pub fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    /// Removes `key`. Removing an absent key is a no-op.
    pub fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        let mut map = self.read_all()?;
        if map.remove(key).is_some() {
            self.write_all(&map)?;
        }
        Ok(())
    }

    /// Applies `f` to every entry and writes the result back in one pass.
    pub fn update<R, F>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> R,
    {
        let mut map = self.read_all()?;
        let out = f(&mut map);
        self.write_all(&map)?;
        Ok(out)
    }

    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read_all()?.into_keys().collect())
    }

    /// Decodes the value under `key`.
    ///
    /// A value that does not decode as `T` is logged and reported as absent.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.get_item(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                warn!(key, error = %e, "ignoring malformed stored value");
                Ok(None)
            }
        }
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(value)?;
        self.set_item(key, &encoded)
    }

    /// Loads the whole task collection.
    ///
    /// The first load on a store that never held tasks seeds and persists the
    /// demonstration set. A malformed collection loads as empty, and so does
    /// a store file that had to be moved aside; neither is reseeded.
    #[tracing::instrument(skip(self), fields(store = %self.path.display()))]
    pub fn load_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let mut doc = self.read_document()?;
        let Some(raw) = doc.entries.remove(TASKS_KEY) else {
            if let Some(backup) = doc.moved_to {
                warn!(backup = %backup.display(), "not seeding over a recovered store");
                return Ok(Vec::new());
            }
            let seeded = demo_tasks();
            info!(count = seeded.len(), "seeding demonstration tasks");
            self.save_tasks(&seeded)?;
            return Ok(seeded);
        };
        match serde_json::from_str::<Vec<Task>>(&raw) {
            Ok(tasks) => {
                debug!(count = tasks.len(), "loaded tasks");
                Ok(tasks)
            }
            Err(e) => {
                warn!(error = %e, "stored task list is malformed, treating it as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Replaces the whole task collection.
    #[tracing::instrument(skip(self, tasks), fields(count = tasks.len()))]
    pub fn save_tasks(&self, tasks: &[Task]) -> Result<(), StoreError> {
        self.set_json(TASKS_KEY, tasks)
    }

    /// Loads a single task by its id.
    pub fn load_task(&self, id: &str) -> Result<Option<Task>, StoreError> {
        Ok(self.load_tasks()?.into_iter().find(|t| t.id == id))
    }

    /// Deletes the store file, dropping every task, user and the session.
    pub fn reset(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(store = %self.path.display(), "store reset");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        Ok(self.read_document()?.entries)
    }

    /// Reads the store file.
    ///
    /// A file that does not parse is renamed to `<name>.corrupt` (or
    /// `<name>.corrupt.N` if that is taken) so no later write can clobber it,
    /// and the store reads as empty.
    fn read_document(&self) -> Result<Document, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Document::default()),
            Err(e) => return Err(self.io_error(e)),
        };
        if text.trim().is_empty() {
            return Ok(Document::default());
        }
        match serde_json::from_str(&text) {
            Ok(entries) => Ok(Document { entries, moved_to: None }),
            Err(e) => {
                let backup = self.backup_path();
                fs::rename(&self.path, &backup).map_err(|e| self.io_error(e))?;
                warn!(
                    store = %self.path.display(),
                    backup = %backup.display(),
                    error = %e,
                    "store file is malformed, moved it aside and starting empty"
                );
                Ok(Document { entries: BTreeMap::new(), moved_to: Some(backup) })
            }
        }
    }

    /// First free `<name>.corrupt[.N]` next to the store file.
    fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".corrupt");
        let base = PathBuf::from(name);
        let mut candidate = base.clone();
        let mut n = 1;
        while candidate.exists() {
            let mut numbered = base.as_os_str().to_os_string();
            numbered.push(format!(".{}", n));
            candidate = PathBuf::from(numbered);
            n += 1;
        }
        candidate
    }

    fn write_all(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| self.io_error(e))?;

        let encoded = serde_json::to_string_pretty(map)?;
        let mut temp = NamedTempFile::new_in(&dir).map_err(|e| self.io_error(e))?;
        temp.write_all(encoded.as_bytes())
            .and_then(|_| temp.flush())
            .map_err(|e| self.io_error(e))?;
        temp.persist(&self.path).map_err(|source| StoreError::Persist {
            path: self.path.display().to_string(),
            source,
        })?;
        debug!(store = %self.path.display(), keys = map.len(), "store written");
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[derive(Default)]
struct Document {
    entries: BTreeMap<String, String>,
    /// Where an unreadable store file was moved on this read.
    moved_to: Option<PathBuf>,
}

/// The fixed set written on first launch.
pub fn demo_tasks() -> Vec<Task> {
    let seed = [
        ("1", "Finish Math Homework 5.2", Tag::Homework, (2025, 11, 24), false,
            "Remember to show all work for questions 3 and 5. Focus on quadratic equations."),
        ("2", "Study for Chemistry Midterm", Tag::Exam, (2025, 11, 26), false,
            "Focus on chapters 4-6. Review lab notes from the titration experiment."),
        ("3", "Start History Project Outline", Tag::Project, (2025, 11, 20), true,
            "Gather sources and create the main bullet points for the presentation."),
        ("4", "Read Chapter 3 of English Lit", Tag::Homework, (2025, 11, 28), false,
            "Take notes on the main character's development."),
        ("5", "Physics Lab Report", Tag::Project, (2025, 12, 1), false,
            "Write up the findings from the kinematics lab. Include all graphs."),
        ("6", "Finalize CS Group Presentation", Tag::Project, (2025, 12, 3), false,
            "Merge all slides and practice the script with the team."),
        ("7", "Spanish Vocabulary Quiz", Tag::Exam, (2025, 12, 5), false,
            "Review all verbs from Unit 5."),
    ];
    seed.into_iter()
        .filter_map(|(id, title, tag, (y, m, d), done, notes)| {
            NaiveDate::from_ymd_opt(y, m, d).map(|deadline| Task {
                id: id.to_string(),
                title: title.to_string(),
                notes: notes.to_string(),
                tag,
                deadline,
                is_completed: done,
            })
        })
        .collect()
}
