use chrono::{DateTime, Local};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::app_dirs::AppDirs;
use crate::catalog::{self, DifficultyKey};
use crate::metrics;
use crate::session::{GameState, HighScores, Progress, SessionStats, Status};

/// Play time below which a running session's speed is not yet a record
pub const MIN_LIVE_WPM_MS: i64 = 1_000;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("profile storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("profile encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The part of a session that outlives the process
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub difficulty_key: DifficultyKey,
    pub progress: Progress,
    pub high_scores: HighScores,
}

impl Profile {
    /// Project a session into its persisted shape. The running session is
    /// folded into the high scores once it has at least one keystroke; its
    /// speed counts only after [`MIN_LIVE_WPM_MS`] of play.
    pub fn assemble(
        name: &str,
        difficulty_key: DifficultyKey,
        progress: Progress,
        high_scores: HighScores,
        stats: &SessionStats,
        now: DateTime<Local>,
    ) -> Self {
        let high_scores = if stats.total_keystrokes > 0 {
            let mut live = metrics::compute(stats, now);
            if live.elapsed_ms < MIN_LIVE_WPM_MS {
                live.net_wpm = 0.0;
            }
            high_scores.folded(&live, stats.session_score)
        } else {
            high_scores
        };

        Self {
            name: name.to_string(),
            difficulty_key,
            progress,
            high_scores,
        }
    }

    /// Only a running session is folded here; a completed one was already
    /// folded when it ended.
    pub fn from_state(state: &GameState, now: DateTime<Local>) -> Self {
        let settled = SessionStats::default();
        let stats = match state.status {
            Status::Playing | Status::StageCleared => &state.stats,
            Status::Idle | Status::Completed => &settled,
        };
        Self::assemble(
            &state.profile_name,
            state.difficulty_key,
            state.progress,
            state.high_scores,
            stats,
            now,
        )
    }

    /// Seed a fresh session from persisted data
    pub fn apply_to(&self, state: &mut GameState) {
        state.profile_name = self.name.clone();
        state.difficulty_key = self.difficulty_key;
        state.progress = Progress {
            stage_index: catalog::clamp_stage_index(self.progress.stage_index),
            ..self.progress
        };
        state.high_scores = self.high_scores;
    }
}

pub trait ProfileStore {
    /// `None` when nothing is stored or the stored blob is unreadable
    fn load(&self) -> Option<Profile>;
    fn save(&self, profile: &Profile) -> Result<(), ProfileError>;
    fn clear(&self) -> Result<(), ProfileError>;
}

#[derive(Debug, Clone)]
pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    pub fn new() -> Self {
        let path = AppDirs::profile_path().unwrap_or_else(|| {
            ProjectDirs::from("", "", "wordsprint")
                .map(|pd| pd.data_dir().join("profile.json"))
                .unwrap_or_else(|| PathBuf::from("wordsprint_profile.json"))
        });
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileStore for FileProfileStore {
    fn load(&self) -> Option<Profile> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no stored profile");
                return None;
            }
        };

        match serde_json::from_slice::<Profile>(&bytes) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable profile");
                None
            }
        }
    }

    fn save(&self, profile: &Profile) -> Result<(), ProfileError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(profile)?;
        fs::write(&self.path, data)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), ProfileError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store keyed on nothing; holds the raw JSON like the file would
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    blob: RefCell<Option<String>>,
    saves: RefCell<usize>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: &str) -> Self {
        Self {
            blob: RefCell::new(Some(blob.to_string())),
            saves: RefCell::new(0),
        }
    }

    pub fn blob(&self) -> Option<String> {
        self.blob.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn load(&self) -> Option<Profile> {
        let blob = self.blob.borrow();
        serde_json::from_str(blob.as_deref()?).ok()
    }

    fn save(&self, profile: &Profile) -> Result<(), ProfileError> {
        *self.blob.borrow_mut() = Some(serde_json::to_string(profile)?);
        *self.saves.borrow_mut() += 1;
        Ok(())
    }

    fn clear(&self) -> Result<(), ProfileError> {
        *self.blob.borrow_mut() = None;
        Ok(())
    }
}

/// Save, logging and dropping any failure
pub fn persist<S: ProfileStore + ?Sized>(store: &S, profile: &Profile) {
    if let Err(e) = store.save(profile) {
        warn!(error = %e, "profile save failed; continuing without it");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn sample() -> Profile {
        Profile {
            name: "Ada".into(),
            difficulty_key: DifficultyKey::Hard,
            progress: Progress {
                stage_index: 2,
                stars: 3,
                coins: 45,
            },
            high_scores: HighScores {
                best_net_wpm: 52.5,
                best_accuracy: 0.97,
                best_session_score: 1320,
            },
        }
    }

    #[test]
    fn roundtrip_default_profile() {
        let dir = tempdir().unwrap();
        let store = FileProfileStore::with_path(dir.path().join("profile.json"));
        let profile = Profile::default();
        store.save(&profile).unwrap();
        assert_eq!(store.load(), Some(profile));
    }

    #[test]
    fn save_and_load_custom_profile() {
        let dir = tempdir().unwrap();
        let store = FileProfileStore::with_path(dir.path().join("nested").join("profile.json"));
        store.save(&sample()).unwrap();
        assert_eq!(store.load(), Some(sample()));
    }

    #[test]
    fn missing_file_loads_none() {
        let dir = tempdir().unwrap();
        let store = FileProfileStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn corrupted_file_loads_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, b"{ this is not json").unwrap();
        assert_eq!(FileProfileStore::with_path(&path).load(), None);
    }

    #[test]
    fn clear_removes_profile_and_tolerates_absence() {
        let dir = tempdir().unwrap();
        let store = FileProfileStore::with_path(dir.path().join("profile.json"));
        store.save(&sample()).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load(), None);
        store.clear().unwrap();
    }

    #[test]
    fn wire_shape_uses_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["difficultyKey"], "hard");
        assert_eq!(json["progress"]["stageIndex"], 2);
        assert_eq!(json["highScores"]["bestSessionScore"], 1320);
        assert_eq!(json["highScores"]["bestNetWpm"], 52.5);
    }

    #[test]
    fn partial_blob_fills_defaults() {
        let store = MemoryProfileStore::with_blob(r#"{"name":"Kim","difficultyKey":"weird"}"#);
        let profile = store.load().unwrap();
        assert_eq!(profile.name, "Kim");
        assert_eq!(profile.difficulty_key, DifficultyKey::Normal);
        assert_eq!(profile.progress, Progress::default());
    }

    #[test]
    fn apply_clamps_stage_index() {
        let mut profile = sample();
        profile.progress.stage_index = 42;
        let mut state = GameState::new(DifficultyKey::Normal, vec![]);
        profile.apply_to(&mut state);
        assert_eq!(state.progress.stage_index, catalog::LAST_STAGE_INDEX);
        assert_eq!(state.profile_name, "Ada");
        assert_eq!(state.difficulty_key, DifficultyKey::Hard);
    }

    #[test]
    fn assemble_folds_only_started_sessions() {
        let now = Local.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let bests = HighScores {
            best_net_wpm: 10.0,
            best_accuracy: 0.5,
            best_session_score: 100,
        };

        let idle = Profile::assemble("", DifficultyKey::Easy, Progress::default(), bests, &SessionStats::default(), now);
        assert_eq!(idle.high_scores, bests);

        let stats = SessionStats {
            total_keystrokes: 10,
            correct_keystrokes: 9,
            session_score: 300,
            started_at: Some(now - chrono::Duration::seconds(12)),
            ..Default::default()
        };
        let live = Profile::assemble("", DifficultyKey::Easy, Progress::default(), bests, &stats, now);
        assert_eq!(live.high_scores.best_session_score, 300);
        assert_eq!(live.high_scores.best_accuracy, 0.9);
        assert_eq!(live.high_scores.best_net_wpm, 10.0);
    }

    #[test]
    fn assemble_ignores_speed_of_a_first_burst() {
        let now = Local.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let stats = SessionStats {
            total_keystrokes: 4,
            correct_keystrokes: 4,
            session_score: 0,
            started_at: Some(now - chrono::Duration::milliseconds(50)),
            ..Default::default()
        };

        let early = Profile::assemble("", DifficultyKey::Easy, Progress::default(), HighScores::default(), &stats, now);
        assert_eq!(early.high_scores.best_net_wpm, 0.0);
        assert_eq!(early.high_scores.best_accuracy, 1.0);

        let later = Profile::assemble(
            "",
            DifficultyKey::Easy,
            Progress::default(),
            HighScores::default(),
            &stats,
            now + chrono::Duration::seconds(6),
        );
        assert!(later.high_scores.best_net_wpm > 0.0);
    }

    #[test]
    fn from_state_skips_finished_session() {
        let now = Local.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let mut state = GameState::new(DifficultyKey::Easy, Vec::new());
        state.status = Status::Completed;
        state.stats = SessionStats {
            total_keystrokes: 3,
            correct_keystrokes: 3,
            session_score: 110,
            started_at: Some(now - chrono::Duration::seconds(6)),
            ended_at: Some(now),
            ..Default::default()
        };

        assert_eq!(Profile::from_state(&state, now).high_scores, HighScores::default());

        state.status = Status::Playing;
        assert_eq!(Profile::from_state(&state, now).high_scores.best_session_score, 110);
    }

    #[test]
    fn persist_swallows_errors() {
        let dir = tempdir().unwrap();
        // a directory where the file should be makes the write fail
        let path = dir.path().join("profile.json");
        fs::create_dir_all(&path).unwrap();
        persist(&FileProfileStore::with_path(&path), &sample());
    }
}
