//! Game settings and preferences
//!
//! Persisted separately from level progress in LocalStorage.

use serde::{Deserialize, Serialize};

/// Supported UI languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    En,
    Ru,
}

impl Language {
    /// Resolve a BCP 47 language tag. Several Cyrillic-script locales fall
    /// back to Russian; everything else gets English.
    pub fn from_tag(tag: &str) -> Self {
        let primary: String = tag.chars().take(2).collect::<String>().to_lowercase();
        match primary.as_str() {
            "ru" | "be" | "kk" | "uk" | "uz" => Language::Ru,
            _ => Language::En,
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Language::En => Language::Ru,
            Language::Ru => Language::En,
        }
    }

    pub fn tap_to_start(&self) -> &'static str {
        match self {
            Language::En => "Tap to start",
            Language::Ru => "Нажмите, чтобы начать",
        }
    }

    pub fn new_game(&self) -> &'static str {
        match self {
            Language::En => "New game",
            Language::Ru => "Новая игра",
        }
    }

    pub fn continue_game(&self) -> &'static str {
        match self {
            Language::En => "Continue",
            Language::Ru => "Продолжить",
        }
    }

    pub fn level_cleared(&self) -> &'static str {
        match self {
            Language::En => "Level cleared!",
            Language::Ru => "Уровень пройден!",
        }
    }

    pub fn level_failed(&self) -> &'static str {
        match self {
            Language::En => "Level failed",
            Language::Ru => "Уровень провален",
        }
    }

    pub fn level_label(&self) -> &'static str {
        match self {
            Language::En => "Level",
            Language::Ru => "Уровень",
        }
    }

    pub fn score_label(&self) -> &'static str {
        match self {
            Language::En => "Score",
            Language::Ru => "Очки",
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// UI language
    pub language: Language,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute all audio
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: Language::En,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "bubble_pop_settings";

    /// Default settings with the language picked from a browser locale tag
    pub fn for_locale(tag: &str) -> Self {
        Self {
            language: Language::from_tag(tag),
            ..Self::default()
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        let locale = web_sys::window()
            .map(|w| w.navigator().language().unwrap_or_default())
            .unwrap_or_default();
        log::info!("Using default settings for locale '{locale}'");
        Self::for_locale(&locale)
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
