//! Durable key-value preferences.
//!
//! The site persists exactly two values, the theme and the locale, under
//! the literal keys [`THEME_KEY`] and [`LANGUAGE_KEY`]. Backends may fail
//! (a profile with storage disabled, an unreadable file); [`Preferences`]
//! absorbs every failure so callers always get a usable value.
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StorageError;
use crate::locale::Locale;
use crate::theme::Theme;

pub const THEME_KEY: &str = "theme";
pub const LANGUAGE_KEY: &str = "language";

/// A string key-value backend scoped to one site profile
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Session-only backend; forgets everything when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Backend standing in for storage disabled by policy: every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

/// Backend persisting a flat JSON object to a file, written through on
/// every `set`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open `path`, starting empty when the file does not exist yet.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let entries = if path.exists() {
            let content = fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            BTreeMap::new()
        };
        Ok(FileStore {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// `<data dir>/clientfirst-site/preferences.json`, if the platform has
    /// a data directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("clientfirst-site").join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Typed, failure-tolerant view over a [`KeyValueStore`].
pub struct Preferences {
    store: Box<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Preferences {
            store: Box::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Preferences::new(MemoryStore::new())
    }

    /// Read `key`; storage errors read as absent.
    pub fn get(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, %err, "preference read failed, using default");
                None
            }
        }
    }

    /// Write `key`; returns whether the value was persisted.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        match self.store.set(key, value) {
            Ok(()) => {
                debug!(key, value, "preference saved");
                true
            }
            Err(err) => {
                warn!(key, %err, "preference write failed, keeping value for this session only");
                false
            }
        }
    }

    /// Saved theme; anything but `light` reads as the dark default.
    pub fn theme(&self) -> Theme {
        match self.get(THEME_KEY).as_deref() {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn set_theme(&mut self, theme: Theme) -> bool {
        self.set(THEME_KEY, theme.as_str())
    }

    /// Saved locale, `en` when absent or unsupported.
    pub fn locale(&self) -> Locale {
        match self.get(LANGUAGE_KEY) {
            Some(tag) => Locale::from_tag(&tag).unwrap_or_else(|| {
                warn!(tag = %tag, "unsupported saved locale, using default");
                Locale::default()
            }),
            None => Locale::default(),
        }
    }

    pub fn set_locale(&mut self, locale: Locale) -> bool {
        self.set(LANGUAGE_KEY, locale.code())
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_on_first_visit() {
        let prefs = Preferences::in_memory();
        assert_eq!(prefs.theme(), Theme::Dark);
        assert_eq!(prefs.locale(), Locale::En);
    }

    #[test]
    fn test_round_trip_in_memory() {
        let mut prefs = Preferences::in_memory();
        assert!(prefs.set_theme(Theme::Light));
        assert!(prefs.set_locale(Locale::PtPt));
        assert_eq!(prefs.theme(), Theme::Light);
        assert_eq!(prefs.locale(), Locale::PtPt);
        assert_eq!(prefs.get(LANGUAGE_KEY).as_deref(), Some("pt-pt"));
    }

    #[test]
    fn test_unavailable_storage_degrades_to_defaults() {
        let mut prefs = Preferences::new(UnavailableStore);
        assert!(!prefs.set_theme(Theme::Light));
        assert_eq!(prefs.theme(), Theme::Dark);
        assert_eq!(prefs.locale(), Locale::En);
    }

    #[test]
    fn test_unknown_saved_values_fall_back() {
        let mut store = MemoryStore::new();
        store.set(THEME_KEY, "sepia").unwrap();
        store.set(LANGUAGE_KEY, "fr").unwrap();
        let prefs = Preferences::new(store);
        assert_eq!(prefs.theme(), Theme::Dark);
        assert_eq!(prefs.locale(), Locale::En);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile").join("preferences.json");

        let mut prefs = Preferences::new(FileStore::open(&path).unwrap());
        prefs.set_theme(Theme::Light);
        prefs.set_locale(Locale::PtPt);

        let reopened = Preferences::new(FileStore::open(&path).unwrap());
        assert_eq!(reopened.theme(), Theme::Light);
        assert_eq!(reopened.locale(), Locale::PtPt);
    }

    #[test]
    fn test_file_store_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        let mut store = FileStore::open(&path).unwrap();
        store.set(THEME_KEY, "light").unwrap();
        store.set(THEME_KEY, "dark").unwrap();
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(FileStore::open(&path), Err(StorageError::Corrupt(_))));
    }
}
