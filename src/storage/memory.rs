// Allow dead code: constructed by tests and as the degraded-storage fallback
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use super::Storage;

/// In-memory storage for tests and for running without a usable disk.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.lock().remove(key);
    }
}
