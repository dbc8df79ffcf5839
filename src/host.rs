use tracing::{debug, info};

use crate::game::{Command, Environment};
use crate::metrics::{self, Metrics};
use crate::profile::{self, Profile, ProfileStore};
use crate::session::{GameState, Screen, Status};

/// Owns the single live session: turns raw input into commands and runs the
/// follow-up steps each transition implies (timeouts, completion, saving).
pub struct Host<S: ProfileStore, E: Environment> {
    state: GameState,
    store: S,
    env: E,
    last_saved: Option<Profile>,
}

impl<S: ProfileStore, E: Environment> Host<S, E> {
    /// Build the session from whatever profile the store holds, or defaults
    pub fn new(store: S, mut env: E) -> Self {
        let loaded = store.load();
        let profile = loaded.clone().unwrap_or_default();

        let words = env.draw_words(&profile.difficulty_key.config());
        let mut state = GameState::new(profile.difficulty_key, words);
        profile.apply_to(&mut state);

        info!(
            name = %state.display_name(),
            difficulty = %state.difficulty_key,
            stage = state.active_stage().id,
            restored = loaded.is_some(),
            "profile loaded"
        );

        Self {
            state,
            store,
            env,
            last_saved: loaded,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn metrics(&self) -> Metrics {
        metrics::compute(&self.state.stats, self.env.now())
    }

    /// Whether the once-a-second tick should reach the session. The countdown
    /// holds while the scores screen is up.
    pub fn timer_armed(&self) -> bool {
        self.state.status == Status::Playing && self.state.screen == Screen::Game
    }

    /// Dispatch a command, then settle the consequences
    pub fn apply(&mut self, command: Command) {
        self.state = self.state.dispatch(command, &mut self.env);
        self.settle();
    }

    /// Feed one typed character. Returns whether it was accepted as a keystroke.
    pub fn type_letter(&mut self, c: char) -> bool {
        if !self.timer_armed() || !c.is_ascii_alphabetic() {
            return false;
        }
        let c = c.to_ascii_lowercase();

        let Some(target) = self.state.current_word().map(|w| w.word.clone()) else {
            return false;
        };
        let position = self.state.user_input.len();
        let Some(expected) = target.chars().nth(position) else {
            // input already as long as the word; a backspace has to come first
            return false;
        };

        self.apply(Command::Keystroke {
            is_correct: c == expected,
        });
        let mut input = self.state.user_input.clone();
        input.push(c);
        self.apply(Command::UpdateInput(input));

        if self.state.user_input == target {
            self.apply(Command::CorrectWord);
        }
        true
    }

    /// Undo the last typed character; counters are left alone
    pub fn backspace(&mut self) {
        if !self.timer_armed() || self.state.user_input.is_empty() {
            return;
        }
        let mut input = self.state.user_input.clone();
        input.pop();
        self.apply(Command::UpdateInput(input));
    }

    /// One second of game time
    pub fn tick(&mut self) {
        if !self.timer_armed() {
            return;
        }
        self.apply(Command::Tick);
        if self.state.status == Status::Playing && self.state.timer.expired() {
            debug!(index = self.state.current_word_index, "word timed out");
            self.apply(Command::Timeout);
        }
    }

    /// Final save; hands the store back to the caller
    pub fn shutdown(mut self) -> S {
        self.save_if_changed();
        info!(stage = self.state.active_stage().id, "session closed");
        self.store
    }

    fn settle(&mut self) {
        if self.state.status == Status::Playing && self.state.is_exhausted() {
            self.state = self.state.dispatch(Command::CompleteGame, &mut self.env);
        }
        self.save_if_changed();
    }

    fn save_if_changed(&mut self) {
        let profile = Profile::from_state(&self.state, self.env.now());
        if self.last_saved.as_ref() == Some(&profile) {
            return;
        }
        profile::persist(&self.store, &profile);
        self.last_saved = Some(profile);
    }
}
