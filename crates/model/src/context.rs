//! Explicit view context and localization collaborators.
//!
//! The portal threads a [`ViewContext`] to every component that needs the
//! active locale or theme. There is deliberately no global lookup: stores
//! and their tests never depend on ambient state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Display language for the portal. Kazakh and Russian are the primary
/// languages; English is offered on informational pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Kk,
    Ru,
    En,
}

impl Locale {
    /// Column suffix used for language-suffixed fields (`title_kk`,
    /// `title_ru`, `title_en`).
    pub fn suffix(self) -> &'static str {
        match self {
            Locale::Kk => "kk",
            Locale::Ru => "ru",
            Locale::En => "en",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

/// Per-view configuration passed explicitly to anything that renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewContext {
    pub locale: Locale,
    pub theme: Theme,
}

impl Default for ViewContext {
    fn default() -> Self {
        Self {
            locale: Locale::Kk,
            theme: Theme::Light,
        }
    }
}

/// Maps a string key to a display string. Pure and synchronous; callers use
/// it to label Ready snapshots, the store itself never translates anything.
pub trait Translator {
    fn translate(&self, key: &str) -> String;
}

/// A translator backed by a fixed key→string map.
///
/// Unknown keys fall back to the key itself, so a missing entry shows up
/// as a visible untranslated key rather than an empty label.
#[derive(Debug, Clone, Default)]
pub struct StaticTranslator {
    entries: HashMap<String, String>,
}

impl StaticTranslator {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl Translator for StaticTranslator {
    fn translate(&self, key: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}
