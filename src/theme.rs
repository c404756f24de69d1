//! Light/dark theme preference.
//!
//! The choice persists under the `theme` storage key. `System` defers to a
//! caller-supplied probe (the desktop analog of a `prefers-color-scheme`
//! media query), so the store itself never touches the environment.

use std::sync::Arc;

use tracing::debug;

use crate::storage::Storage;

/// Storage key for the theme choice
const THEME_KEY: &str = "theme";

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeChoice {
    Light,
    Dark,
    System,
}

impl ThemeChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeChoice::Light => "light",
            ThemeChoice::Dark => "dark",
            ThemeChoice::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<ThemeChoice> {
        match value {
            "light" => Some(ThemeChoice::Light),
            "dark" => Some(ThemeChoice::Dark),
            "system" => Some(ThemeChoice::System),
            _ => None,
        }
    }
}

impl std::fmt::Display for ThemeChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What actually gets rendered once `System` is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
}

pub struct ThemeStore {
    choice: ThemeChoice,
    storage: Arc<dyn Storage>,
}

impl ThemeStore {
    /// Load the persisted choice. Anything missing or unrecognized falls
    /// back to `System`.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let choice = storage
            .get(THEME_KEY)
            .and_then(|raw| ThemeChoice::parse(&raw))
            .unwrap_or(ThemeChoice::System);
        debug!(choice = %choice, "Loaded theme preference");
        Self { choice, storage }
    }

    pub fn choice(&self) -> ThemeChoice {
        self.choice
    }

    pub fn set_choice(&mut self, choice: ThemeChoice) {
        self.choice = choice;
        self.storage.set(THEME_KEY, choice.as_str());
    }

    /// Effective theme given whether the surrounding system prefers dark.
    pub fn mode(&self, system_prefers_dark: bool) -> ThemeMode {
        match self.choice {
            ThemeChoice::Light => ThemeMode::Light,
            ThemeChoice::Dark => ThemeMode::Dark,
            ThemeChoice::System => {
                if system_prefers_dark {
                    ThemeMode::Dark
                } else {
                    ThemeMode::Light
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn defaults_to_system() {
        let store = ThemeStore::new(Arc::new(MemoryStorage::new()));
        assert_eq!(store.choice(), ThemeChoice::System);
        assert_eq!(store.mode(true), ThemeMode::Dark);
        assert_eq!(store.mode(false), ThemeMode::Light);
    }

    #[test]
    fn unknown_persisted_value_falls_back_to_system() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.set("theme", "solarized");
        let store = ThemeStore::new(storage);
        assert_eq!(store.choice(), ThemeChoice::System);
    }

    #[test]
    fn explicit_choice_persists_and_overrides_the_probe() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let mut store = ThemeStore::new(Arc::clone(&storage));
        store.set_choice(ThemeChoice::Dark);

        assert_eq!(store.mode(false), ThemeMode::Dark);
        assert_eq!(storage.get("theme"), Some("dark".to_string()));

        // A fresh store sees the persisted choice.
        let reloaded = ThemeStore::new(storage);
        assert_eq!(reloaded.choice(), ThemeChoice::Dark);
    }
}
