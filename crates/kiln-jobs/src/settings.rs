//! Persistent user settings.
//!
//! An explicit file-backed store with a load-at-startup / save-at-shutdown
//! lifecycle. The controller receives the store at construction; nothing in
//! the crate reads ambient global state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::JobResult;

/// Saved geometry for one named window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Settings persisted across sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Last model directory the user worked in.
    pub model_directory: Option<PathBuf>,
    /// Window geometry keyed by window name.
    pub windows: BTreeMap<String, WindowGeometry>,
}

/// File-backed settings store.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: Option<PathBuf>,
    settings: Settings,
}

impl SettingsStore {
    /// Loads settings from `path`. A missing file yields defaults; a
    /// malformed file is an error the caller can surface.
    pub fn load(path: impl Into<PathBuf>) -> JobResult<Self> {
        let path = path.into();
        let settings = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            toml::from_str(&text)?
        } else {
            debug!(path = %path.display(), "No settings file, using defaults");
            Settings::default()
        };
        Ok(Self { path: Some(path), settings })
    }

    /// A store not backed by any file; `save` is a no-op. Useful for tests
    /// and transient sessions.
    #[must_use]
    pub fn ephemeral() -> Self {
        Self { path: None, settings: Settings::default() }
    }

    /// Writes the settings file, creating parent directories as needed.
    pub fn save(&self) -> JobResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(&self.settings)?;
        std::fs::write(path, text)?;
        debug!(path = %path.display(), "Settings saved");
        Ok(())
    }

    #[must_use]
    pub fn model_directory(&self) -> Option<&Path> {
        self.settings.model_directory.as_deref()
    }

    pub fn set_model_directory(&mut self, dir: PathBuf) {
        self.settings.model_directory = Some(dir);
    }

    #[must_use]
    pub fn window(&self, name: &str) -> Option<WindowGeometry> {
        self.settings.windows.get(name).copied()
    }

    pub fn set_window(&mut self, name: &str, geometry: WindowGeometry) {
        self.settings.windows.insert(name.to_string(), geometry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let store = SettingsStore::load(temp.path().join("settings.toml")).unwrap();
        assert!(store.model_directory().is_none());
        assert!(store.window("main").is_none());
    }

    #[test]
    fn test_settings_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("kiln").join("settings.toml");

        let mut store = SettingsStore::load(&path).unwrap();
        store.set_model_directory(PathBuf::from("/models/thrC"));
        store.set_window("main", WindowGeometry { x: 10, y: 20, width: 662, height: 452 });
        store.save().unwrap();

        let reloaded = SettingsStore::load(&path).unwrap();
        assert_eq!(reloaded.model_directory(), Some(Path::new("/models/thrC")));
        assert_eq!(
            reloaded.window("main"),
            Some(WindowGeometry { x: 10, y: 20, width: 662, height: 452 })
        );
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");
        std::fs::write(&path, "model_directory = [not toml").unwrap();
        assert!(SettingsStore::load(&path).is_err());
    }

    #[test]
    fn test_ephemeral_save_is_noop() {
        let store = SettingsStore::ephemeral();
        store.save().unwrap();
    }
}
