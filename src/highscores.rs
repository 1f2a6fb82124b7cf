//! High score leaderboard system
//!
//! Persisted to LocalStorage, tracks top 10 scores.

use serde::{Deserialize, Serialize};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's score
    pub score: u32,
    /// Highest level cleared
    pub level: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "bubble_pop_highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Ranking order: score first, equal scores broken by the level reached
    fn outranks(score: u32, level: u32, entry: &HighScoreEntry) -> bool {
        score > entry.score || (score == entry.score && level > entry.level)
    }

    /// Check if a run qualifies for the leaderboard
    pub fn qualifies(&self, score: u32, level: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if the run beats the lowest entry
        self.entries
            .last()
            .map(|e| Self::outranks(score, level, e))
            .unwrap_or(true)
    }

    /// Get the rank a run would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u32, level: u32) -> Option<usize> {
        if !self.qualifies(score, level) {
            return None;
        }
        let rank = self
            .entries
            .iter()
            .position(|e| Self::outranks(score, level, e));
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new run to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, score: u32, level: u32, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score, level) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            level,
            timestamp,
        };

        // Find insertion point (sorted by the ranking order)
        let pos = self
            .entries
            .iter()
            .position(|e| Self::outranks(score, level, e));
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        // Trim to max size
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(scores) = serde_json::from_str::<HighScores>(&json) {
                    log::info!("Loaded {} high scores", scores.entries.len());
                    return scores;
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_score_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0, 5));
        assert_eq!(scores.potential_rank(0, 5), None);
    }

    #[test]
    fn test_add_score_sorts_descending() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(10, 2, 0.0), Some(1));
        assert_eq!(scores.add_score(30, 4, 1.0), Some(1));
        assert_eq!(scores.add_score(20, 3, 2.0), Some(2));

        let ordered: Vec<u32> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(ordered, vec![30, 20, 10]);
        assert_eq!(scores.top_score(), Some(30));
    }

    #[test]
    fn test_leaderboard_trims_to_max() {
        let mut scores = HighScores::new();
        for i in 1..=15u32 {
            scores.add_score(i, 1, i as f64);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        // Lowest surviving score is 6
        assert_eq!(scores.entries.last().map(|e| e.score), Some(6));
        assert!(!scores.qualifies(5, 1));
        assert!(scores.qualifies(7, 1));
    }

    #[test]
    fn test_equal_score_at_same_level_ranks_below() {
        let mut scores = HighScores::new();
        scores.add_score(10, 2, 0.0);
        assert_eq!(scores.add_score(10, 2, 1.0), Some(2));
    }

    #[test]
    fn test_equal_score_broken_by_level() {
        let mut scores = HighScores::new();
        scores.add_score(10, 2, 0.0);
        assert_eq!(scores.add_score(10, 4, 1.0), Some(1));
        assert_eq!(scores.entries[0].level, 4);

        // A deeper run with the same score also beats a full board's tail
        for i in 0..MAX_HIGH_SCORES as u32 {
            scores.add_score(10, 2, i as f64);
        }
        assert!(scores.qualifies(10, 3));
        assert!(!scores.qualifies(10, 2));
    }
}
