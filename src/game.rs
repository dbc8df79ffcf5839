use chrono::{DateTime, Local};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::catalog::{Difficulty, DifficultyKey};
use crate::corpus::{Corpus, WordEntry};
use crate::metrics;
use crate::session::{
    ClearedStage, GameState, HighScores, Progress, Screen, SessionStats, StageProgress, Status,
    Timer, UiFlags,
};

/// Everything that can happen to a session
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Navigate(Screen),
    SetProfileName(String),
    SetDifficulty(DifficultyKey),
    StartGame,
    UpdateInput(String),
    Keystroke { is_correct: bool },
    Tick,
    Timeout,
    CorrectWord,
    ContinueAfterStage,
    CompleteGame,
    ResetSession,
    ResetProgress,
    ResetHighScores,
}

/// The reducer's only window on the outside world: wall clock and word draws
pub trait Environment {
    fn now(&self) -> DateTime<Local>;
    fn draw_words(&mut self, difficulty: &Difficulty) -> Vec<WordEntry>;
}

/// Production environment: local clock, shuffled draws from a corpus
#[derive(Debug)]
pub struct SystemEnvironment {
    corpus: Corpus,
    rng: StdRng,
}

impl SystemEnvironment {
    pub fn new(corpus: Corpus, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { corpus, rng }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }
}

impl Environment for SystemEnvironment {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn draw_words(&mut self, difficulty: &Difficulty) -> Vec<WordEntry> {
        self.corpus.shuffled(&difficulty.word_length, &mut self.rng)
    }
}

/// Deterministic environment: a fixed word list in fixed order and a clock
/// that only moves when told to
#[derive(Debug, Clone)]
pub struct FixedEnvironment {
    pub words: Vec<WordEntry>,
    pub now: DateTime<Local>,
    pub draws: usize,
}

impl FixedEnvironment {
    pub fn new(words: &[&str]) -> Self {
        Self {
            words: words.iter().map(|w| WordEntry::new(w, "")).collect(),
            now: Local::now(),
            draws: 0,
        }
    }

    pub fn advance(&mut self, by: chrono::Duration) {
        self.now += by;
    }
}

impl Environment for FixedEnvironment {
    fn now(&self) -> DateTime<Local> {
        self.now
    }

    fn draw_words(&mut self, _difficulty: &Difficulty) -> Vec<WordEntry> {
        self.draws += 1;
        self.words.clone()
    }
}

impl GameState {
    /// Apply one command and return the next snapshot. Commands that do not
    /// fit the current status come back as an unchanged copy.
    pub fn dispatch<E: Environment + ?Sized>(&self, command: Command, env: &mut E) -> GameState {
        let mut next = self.clone();
        debug!(?command, status = ?self.status, "dispatch");

        match command {
            Command::Navigate(screen) => next.screen = screen,
            Command::SetProfileName(name) => next.profile_name = name,
            Command::SetDifficulty(key) => {
                let difficulty = key.config();
                next.difficulty_key = key;
                next.timer = Timer::new(difficulty.time_limit_secs);
                next.words = env.draw_words(&difficulty);
                next.current_word_index = 0;
                next.user_input.clear();
            }
            Command::StartGame => {
                let difficulty = next.difficulty_key.config();
                next.status = Status::Playing;
                next.words = env.draw_words(&difficulty);
                next.current_word_index = 0;
                next.user_input.clear();
                next.timer = Timer::new(difficulty.time_limit_secs);
                next.stage = StageProgress::default();
                next.stats = SessionStats {
                    started_at: Some(env.now()),
                    ..SessionStats::default()
                };
                next.ui = UiFlags::default();
                info!(
                    difficulty = %next.difficulty_key,
                    words = next.words.len(),
                    stage = next.active_stage().id,
                    "session started"
                );
            }
            Command::UpdateInput(text) => {
                if next.status == Status::Playing {
                    let limit = next.current_word().map_or(0, WordEntry::len);
                    next.user_input = text.chars().take(limit).collect();
                }
            }
            Command::Keystroke { is_correct } => record_keystroke(&mut next, is_correct),
            Command::Tick => {
                if next.status == Status::Playing {
                    next.timer.tick();
                }
            }
            Command::Timeout => {
                if next.status == Status::Playing {
                    next.user_input.clear();
                    next.current_word_index += 1;
                    next.timer.reset();
                    next.stats.streak = 0;
                    next.stats.reset_word();
                }
            }
            Command::CorrectWord => {
                if next.status == Status::Playing {
                    complete_word(&mut next);
                }
            }
            Command::ContinueAfterStage => {
                if next.status == Status::StageCleared {
                    next.status = Status::Playing;
                    next.stage = StageProgress::default();
                    next.ui.show_celebration = false;
                    next.timer.reset();
                }
            }
            Command::CompleteGame => {
                if matches!(next.status, Status::Playing | Status::StageCleared) {
                    let now = env.now();
                    next.status = Status::Completed;
                    next.stats.ended_at = Some(now);
                    next.ui.show_celebration = false;
                    let results = metrics::compute(&next.stats, now);
                    next.high_scores = next.high_scores.folded(&results, next.stats.session_score);
                    info!(
                        score = next.stats.session_score,
                        net_wpm = results.net_wpm,
                        accuracy = results.accuracy,
                        "session completed"
                    );
                }
            }
            Command::ResetSession => {
                let difficulty = next.difficulty_key.config();
                next.status = Status::Idle;
                next.words = env.draw_words(&difficulty);
                next.current_word_index = 0;
                next.user_input.clear();
                next.timer = Timer::new(difficulty.time_limit_secs);
                next.stage = StageProgress::default();
                next.stats = SessionStats::default();
                next.ui = UiFlags::default();
            }
            Command::ResetProgress => next.progress = Progress::default(),
            Command::ResetHighScores => next.high_scores = HighScores::default(),
        }

        next
    }
}

fn record_keystroke(state: &mut GameState, is_correct: bool) {
    let stats = &mut state.stats;
    stats.total_keystrokes += 1;
    stats.current_word_keystrokes += 1;
    state.stage.stage_keystrokes += 1;

    if is_correct {
        stats.correct_keystrokes += 1;
        stats.current_word_correct_keystrokes += 1;
        state.stage.stage_correct_keystrokes += 1;
    } else {
        stats.errors += 1;
        stats.current_word_errors += 1;
    }
}

/// Points for a finished word: base 100, streak bonus capped at ten words,
/// five off per mistake, never negative.
pub fn word_score(streak: u32, word_errors: u32) -> u64 {
    let gain = 100 + i64::from(streak.min(10)) * 10 - i64::from(word_errors) * 5;
    gain.max(0) as u64
}

fn complete_word(state: &mut GameState) {
    let stats = &mut state.stats;
    let perfect = stats.current_word_errors == 0;
    stats.streak = if perfect { stats.streak + 1 } else { 0 };
    stats.max_streak = stats.max_streak.max(stats.streak);
    stats.session_score += word_score(stats.streak, stats.current_word_errors);
    stats.correct_words += 1;
    stats.reset_word();

    state.current_word_index += 1;
    state.user_input.clear();
    state.timer.reset();
    state.stage.correct_in_stage += 1;

    let stage = state.active_stage();
    if state.stage.is_cleared(&stage) {
        state.status = Status::StageCleared;
        state.progress.award(stage.reward);
        state.ui.last_stage_reward = Some(ClearedStage {
            stage_id: stage.id,
            reward: stage.reward,
        });
        state.ui.show_celebration = true;
        info!(
            stage = stage.id,
            stars = stage.reward.stars,
            coins = stage.reward.coins,
            accuracy = state.stage.accuracy(),
            "stage cleared"
        );
    }
}
