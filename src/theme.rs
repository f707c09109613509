//! Theme state and durable preference storage.
//!
//! The theme survives reloads through a [`PreferenceStore`]; the
//! file-backed implementation writes a small TOML document under the
//! platform config directory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// UI theme (light or dark palette).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light palette.
    Light,
    /// Dark palette.
    Dark,
}

impl Theme {
    /// The opposite theme.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Interpret a stored preference value. Only the literal `"light"`
    /// selects the light theme; anything else falls back to dark.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        if value == "light" {
            Self::Light
        } else {
            Self::Dark
        }
    }

    /// Returns true if this is the dark theme.
    #[must_use]
    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    /// Returns true if this is the light theme.
    #[must_use]
    pub fn is_light(self) -> bool {
        matches!(self, Self::Light)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

/// Durable storage for preferences that survive a reload.
pub trait PreferenceStore: Send {
    /// The stored theme, if any was ever persisted.
    fn load_theme(&self) -> Option<Theme>;

    /// Persist the theme choice.
    fn store_theme(&mut self, theme: Theme) -> anyhow::Result<()>;
}

/// On-disk preference document.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct PreferenceFile {
    theme: Option<String>,
}

/// TOML-backed preference store.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    /// Create a store rooted at `dir` (the file itself is `preferences.toml`).
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join("preferences.toml"),
        }
    }

    /// Platform-appropriate default directory for the preference file.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("palaver"))
    }

    fn read(&self) -> PreferenceFile {
        let Ok(body) = fs::read_to_string(&self.path) else {
            return PreferenceFile::default();
        };
        toml::from_str(&body).unwrap_or_else(|e| {
            debug!("unreadable preference file, starting fresh: {e}");
            PreferenceFile::default()
        })
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load_theme(&self) -> Option<Theme> {
        self.read().theme.map(|value| Theme::from_stored(&value))
    }

    fn store_theme(&mut self, theme: Theme) -> anyhow::Result<()> {
        let mut file = self.read();
        file.theme = Some(theme.to_string());
        let body = toml::to_string_pretty(&file)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, body)?;
        Ok(())
    }
}

/// In-memory preference store for tests and ephemeral hosts.
#[derive(Debug, Default, Clone)]
pub struct MemoryPreferenceStore {
    theme: Option<Theme>,
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load_theme(&self) -> Option<Theme> {
        self.theme
    }

    fn store_theme(&mut self, theme: Theme) -> anyhow::Result<()> {
        self.theme = Some(theme);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn toggle_is_idempotent_over_two_applications() {
        assert_eq!(Theme::Light.toggled().toggled(), Theme::Light);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }

    #[test]
    fn stored_value_interpretation() {
        assert_eq!(Theme::from_stored("light"), Theme::Light);
        assert_eq!(Theme::from_stored("dark"), Theme::Dark);
        assert_eq!(Theme::from_stored("garbage"), Theme::Dark);
    }

    #[test]
    fn display_roundtrip() {
        assert_eq!(Theme::from_stored(&Theme::Light.to_string()), Theme::Light);
        assert_eq!(Theme::from_stored(&Theme::Dark.to_string()), Theme::Dark);
    }

    #[test]
    fn file_store_persists_across_reload() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = FilePreferenceStore::new(dir.path());
        assert!(store.load_theme().is_none());
        store.store_theme(Theme::Light).unwrap();

        // Simulated reload: a fresh store over the same directory.
        let reloaded = FilePreferenceStore::new(dir.path());
        assert_eq!(reloaded.load_theme(), Some(Theme::Light));
    }

    #[test]
    fn file_store_overwrites_previous_choice() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = FilePreferenceStore::new(dir.path());
        store.store_theme(Theme::Light).unwrap();
        store.store_theme(Theme::Dark).unwrap();

        assert_eq!(store.load_theme(), Some(Theme::Dark));
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        fs::write(&path, "not = [valid").unwrap();

        let store = FilePreferenceStore::new(dir.path());
        assert!(store.load_theme().is_none());
    }
}
