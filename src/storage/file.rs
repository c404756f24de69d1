use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, warn};

use super::Storage;

/// Disk-backed storage: a single JSON object of string entries.
///
/// The whole map is rewritten on every mutation; the values here are a
/// handful of short strings (token, serialized profile, theme choice), so
/// there is no point in anything finer-grained. If the file cannot be read
/// or written the store logs a warning and carries on in memory only.
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Open the storage file, loading any existing entries.
    ///
    /// A missing file is an empty store; an unreadable or malformed file is
    /// treated the same way (with a warning) rather than failing startup.
    pub fn open(path: PathBuf) -> Self {
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(map) => map,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Storage file is malformed, starting empty");
                    HashMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Could not read storage file, starting empty");
                HashMap::new()
            }
        };

        debug!(path = %path.display(), entries = entries.len(), "Opened storage");
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %err, "Could not create storage directory");
                return;
            }
        }
        let contents = match serde_json::to_string_pretty(entries) {
            Ok(contents) => contents,
            Err(err) => {
                warn!(error = %err, "Could not serialize storage entries");
                return;
            }
        };
        if let Err(err) = std::fs::write(&self.path, contents) {
            warn!(path = %self.path.display(), error = %err, "Could not write storage file, keeping values in memory");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.lock();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.lock();
        if entries.remove(key).is_some() {
            self.persist(&entries);
        }
    }
}
