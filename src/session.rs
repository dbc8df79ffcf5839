use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::catalog::{self, DifficultyKey, Reward, Stage};
use crate::corpus::WordEntry;
use crate::metrics::Metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Playing,
    StageCleared,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Game,
    Scores,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub time_limit_secs: u32,
    pub time_left_secs: u32,
}

impl Timer {
    pub fn new(time_limit_secs: u32) -> Self {
        Self {
            time_limit_secs,
            time_left_secs: time_limit_secs,
        }
    }

    pub fn reset(&mut self) {
        self.time_left_secs = self.time_limit_secs;
    }

    pub fn tick(&mut self) {
        self.time_left_secs = self.time_left_secs.saturating_sub(1);
    }

    pub fn expired(&self) -> bool {
        self.time_left_secs == 0
    }
}

/// Counters for the stage currently being attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StageProgress {
    pub correct_in_stage: u32,
    pub stage_keystrokes: u32,
    pub stage_correct_keystrokes: u32,
}

impl StageProgress {
    /// Keystroke accuracy since the stage began; 1 before any keystroke
    pub fn accuracy(&self) -> f64 {
        if self.stage_keystrokes == 0 {
            1.0
        } else {
            self.stage_correct_keystrokes as f64 / self.stage_keystrokes as f64
        }
    }

    pub fn is_cleared(&self, stage: &Stage) -> bool {
        self.correct_in_stage >= stage.words_to_clear && self.accuracy() >= stage.min_accuracy
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionStats {
    pub correct_words: u32,
    pub errors: u32,
    pub total_keystrokes: u32,
    pub correct_keystrokes: u32,
    pub streak: u32,
    pub max_streak: u32,
    pub current_word_errors: u32,
    pub current_word_keystrokes: u32,
    pub current_word_correct_keystrokes: u32,
    pub session_score: u64,
    pub started_at: Option<DateTime<Local>>,
    pub ended_at: Option<DateTime<Local>>,
}

impl SessionStats {
    pub fn reset_word(&mut self) {
        self.current_word_errors = 0;
        self.current_word_keystrokes = 0;
        self.current_word_correct_keystrokes = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Progress {
    pub stage_index: usize,
    pub stars: u32,
    pub coins: u32,
}

impl Progress {
    pub fn stage(&self) -> Stage {
        catalog::stage(self.stage_index)
    }

    pub fn award(&mut self, reward: Reward) {
        self.stage_index = catalog::clamp_stage_index(self.stage_index.saturating_add(1));
        self.stars = self.stars.saturating_add(reward.stars);
        self.coins = self.coins.saturating_add(reward.coins);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HighScores {
    pub best_net_wpm: f64,
    pub best_accuracy: f64,
    pub best_session_score: u64,
}

impl HighScores {
    /// Monotonic max of the stored bests and one session's results
    pub fn folded(&self, metrics: &Metrics, session_score: u64) -> Self {
        Self {
            best_net_wpm: self.best_net_wpm.max(metrics.net_wpm),
            best_accuracy: self.best_accuracy.max(metrics.accuracy),
            best_session_score: self.best_session_score.max(session_score),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearedStage {
    pub stage_id: u32,
    pub reward: Reward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UiFlags {
    pub last_stage_reward: Option<ClearedStage>,
    pub show_celebration: bool,
}

/// Complete snapshot of a game session
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub profile_name: String,
    pub difficulty_key: DifficultyKey,
    pub status: Status,
    pub screen: Screen,
    pub words: Vec<WordEntry>,
    pub current_word_index: usize,
    pub user_input: String,
    pub timer: Timer,
    pub stage: StageProgress,
    pub stats: SessionStats,
    pub progress: Progress,
    pub high_scores: HighScores,
    pub ui: UiFlags,
}

impl GameState {
    pub fn new(difficulty_key: DifficultyKey, words: Vec<WordEntry>) -> Self {
        Self {
            profile_name: String::new(),
            difficulty_key,
            status: Status::Idle,
            screen: Screen::Game,
            words,
            current_word_index: 0,
            user_input: String::new(),
            timer: Timer::new(difficulty_key.config().time_limit_secs),
            stage: StageProgress::default(),
            stats: SessionStats::default(),
            progress: Progress::default(),
            high_scores: HighScores::default(),
            ui: UiFlags::default(),
        }
    }

    pub fn current_word(&self) -> Option<&WordEntry> {
        self.words.get(self.current_word_index)
    }

    pub fn is_exhausted(&self) -> bool {
        self.current_word_index >= self.words.len()
    }

    pub fn active_stage(&self) -> Stage {
        self.progress.stage()
    }

    pub fn display_name(&self) -> &str {
        if self.profile_name.trim().is_empty() {
            "Guest"
        } else {
            &self.profile_name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_floors_at_zero() {
        let mut timer = Timer::new(2);
        timer.tick();
        timer.tick();
        timer.tick();
        assert_eq!(timer.time_left_secs, 0);
        assert!(timer.expired());
        timer.reset();
        assert_eq!(timer.time_left_secs, 2);
    }

    #[test]
    fn test_stage_accuracy_defaults_to_one() {
        let progress = StageProgress::default();
        assert_eq!(progress.accuracy(), 1.0);
    }

    #[test]
    fn test_stage_cleared_needs_both_thresholds() {
        let stage = catalog::stage(0);
        let mut progress = StageProgress {
            correct_in_stage: 5,
            stage_keystrokes: 20,
            stage_correct_keystrokes: 17,
        };
        assert!(progress.is_cleared(&stage));

        progress.stage_correct_keystrokes = 16;
        assert!(!progress.is_cleared(&stage));

        progress.stage_correct_keystrokes = 20;
        progress.correct_in_stage = 4;
        assert!(!progress.is_cleared(&stage));
    }

    #[test]
    fn test_award_clamps_stage_index() {
        let mut progress = Progress {
            stage_index: catalog::LAST_STAGE_INDEX,
            stars: 2,
            coins: 5,
        };
        progress.award(Reward { stars: 3, coins: 40 });
        assert_eq!(progress.stage_index, catalog::LAST_STAGE_INDEX);
        assert_eq!(progress.stars, 5);
        assert_eq!(progress.coins, 45);
    }

    #[test]
    fn test_high_scores_fold_is_monotonic() {
        let bests = HighScores {
            best_net_wpm: 40.0,
            best_accuracy: 0.9,
            best_session_score: 500,
        };
        let metrics = Metrics {
            accuracy: 0.95,
            elapsed_ms: 60_000,
            gross_wpm: 35.0,
            net_wpm: 30.0,
        };
        let folded = bests.folded(&metrics, 200);
        assert_eq!(folded.best_net_wpm, 40.0);
        assert_eq!(folded.best_accuracy, 0.95);
        assert_eq!(folded.best_session_score, 500);
    }

    #[test]
    fn test_display_name_defaults_to_guest() {
        let mut state = GameState::new(DifficultyKey::Normal, vec![]);
        assert_eq!(state.display_name(), "Guest");
        state.profile_name = "Ada".into();
        assert_eq!(state.display_name(), "Ada");
    }

    #[test]
    fn test_new_state_uses_difficulty_time_limit() {
        let state = GameState::new(DifficultyKey::Easy, vec![]);
        assert_eq!(state.timer, Timer::new(12));
        assert_eq!(state.status, Status::Idle);
        assert!(state.is_exhausted());
    }
}
