use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::celebration::Celebration;
use crate::game::{Command, Environment};
use crate::host::Host;
use crate::profile::ProfileStore;
use crate::runtime::GameEvent;
use crate::session::{Screen, Status};
use crate::ui::Snapshot;

/// The interactive shell around a [`Host`]: maps keys to commands and keeps
/// the stage-clear animation in step with the session.
pub struct App<S: ProfileStore, E: Environment> {
    pub host: Host<S, E>,
    pub celebration: Celebration,
    pub should_quit: bool,
    size: (u16, u16),
}

impl<S: ProfileStore, E: Environment> App<S, E> {
    pub fn new(host: Host<S, E>) -> Self {
        Self {
            host,
            celebration: Celebration::new(),
            should_quit: false,
            size: (80, 24),
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            state: self.host.state(),
            metrics: self.host.metrics(),
            celebration: &self.celebration,
        }
    }

    pub fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::Key(key) => self.handle_key(key),
            GameEvent::Tick => self.on_tick(),
            GameEvent::Frame => self.celebration.update(),
            GameEvent::Resize => {}
        }
    }

    pub fn on_tick(&mut self) {
        self.tracked(|host| host.tick());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        let state = self.host.state();
        let (status, screen) = (state.status, state.screen);
        debug!(code = ?key.code, ?status, ?screen, "key");

        match (screen, status, key.code) {
            (Screen::Game, _, KeyCode::Tab) => self.command(Command::Navigate(Screen::Scores)),
            (Screen::Scores, _, KeyCode::Tab | KeyCode::Esc) => self.command(Command::Navigate(Screen::Game)),
            (Screen::Scores, _, KeyCode::Char('p')) => self.command(Command::ResetProgress),
            (Screen::Scores, _, KeyCode::Char('h')) => self.command(Command::ResetHighScores),
            (Screen::Scores, s, KeyCode::Char('q')) if s != Status::Playing => self.should_quit = true,

            (Screen::Game, Status::Idle, KeyCode::Enter | KeyCode::Char(' ')) => self.command(Command::StartGame),
            (Screen::Game, Status::Idle, KeyCode::Char('d')) => {
                let next = self.host.state().difficulty_key.next();
                self.command(Command::SetDifficulty(next));
            }
            (Screen::Game, Status::Idle, KeyCode::Char('q') | KeyCode::Esc) => self.should_quit = true,

            (Screen::Game, Status::Playing, KeyCode::Char(c)) => {
                self.tracked(|host| {
                    host.type_letter(c);
                });
            }
            (Screen::Game, Status::Playing, KeyCode::Backspace) => self.host.backspace(),

            (Screen::Game, Status::StageCleared, KeyCode::Enter | KeyCode::Char(' ')) => {
                self.command(Command::ContinueAfterStage)
            }

            (Screen::Game, Status::Completed, KeyCode::Enter) => self.command(Command::ResetSession),
            (Screen::Game, Status::Completed, KeyCode::Char('q')) => self.should_quit = true,

            (Screen::Game, _, KeyCode::Esc) => self.command(Command::ResetSession),
            _ => {}
        }
    }

    pub fn shutdown(self) -> S {
        self.host.shutdown()
    }

    fn command(&mut self, command: Command) {
        self.tracked(|host| host.apply(command));
    }

    /// Run a host action and start or stop the animation when the
    /// celebration flag flips
    fn tracked<F: FnOnce(&mut Host<S, E>)>(&mut self, action: F) {
        let before = self.host.state().ui.show_celebration;
        action(&mut self.host);
        let state = self.host.state();

        match (before, state.ui.show_celebration, state.ui.last_stage_reward) {
            (false, true, Some(cleared)) => {
                let (width, height) = self.size;
                self.celebration.start(width, height, &cleared);
            }
            (true, false, _) => self.celebration.stop(),
            _ => {}
        }
    }
}
