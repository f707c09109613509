//! Configuration types for the chat client engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level configuration for the chat client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend API settings.
    pub api: ApiConfig,
    /// Composer (input acquisition) settings.
    pub composer: ComposerConfig,
    /// Dictation locale settings.
    pub dictation: DictationConfig,
    /// Layout and viewport settings.
    pub layout: LayoutConfig,
}

/// Backend API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the chat backend.
    pub base_url: String,
    /// Path prefix where uploaded images are served from.
    pub uploads_prefix: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_owned(),
            uploads_prefix: "/uploads".to_owned(),
        }
    }
}

/// Composer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// How long the mic control must be held before recording locks
    /// into hands-free capture, in milliseconds.
    pub hold_lock_ms: u64,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self { hold_lock_ms: 500 }
    }
}

/// Dictation locale configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DictationConfig {
    /// Language selector value assumed at startup.
    pub default_language: String,
    /// Locale tag used when the selected language has no table entry.
    pub default_locale: String,
    /// Language selector value → dictation locale tag.
    pub locales: HashMap<String, String>,
}

impl Default for DictationConfig {
    fn default() -> Self {
        let mut locales = HashMap::new();
        locales.insert("yo".to_owned(), "yo-NG".to_owned());
        Self {
            default_language: "en".to_owned(),
            default_locale: "en-US".to_owned(),
            locales,
        }
    }
}

impl DictationConfig {
    /// Resolve the dictation locale for a language selector value.
    #[must_use]
    pub fn locale_for(&self, language: &str) -> &str {
        self.locales
            .get(language)
            .map(String::as_str)
            .unwrap_or(&self.default_locale)
    }
}

/// Layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Viewport width (logical pixels) at or below which the sidebar is
    /// dismissed by clicks outside it.
    pub narrow_breakpoint: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            narrow_breakpoint: 768,
        }
    }
}
