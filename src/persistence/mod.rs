//! Level progress persistence
//!
//! A cleared level stores the next difficulty and running score so a returning
//! player can continue where they left off. Stored as JSON in LocalStorage;
//! native builds keep no state.

use serde::{Deserialize, Serialize};

/// Saved level progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub difficulty: u32,
    pub score: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            difficulty: 1,
            score: 0,
        }
    }
}

impl Progress {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "bubble_pop_progress";

    /// Whether there is anything worth offering a "continue" for
    pub fn has_progress(&self) -> bool {
        self.difficulty > 1
    }

    /// Load progress from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(progress) = serde_json::from_str(&json) {
                    log::info!("Loaded progress from LocalStorage");
                    return progress;
                }
            }
        }

        Self::default()
    }

    /// Save progress to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Progress saved: level {} score {}", self.difficulty, self.score);
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
