use ratatui::{buffer::Buffer, layout::Rect};

use crate::session::Screen;
use crate::ui::{game_screen::GameView, scores::ScoresView, Snapshot};

/// A UI screen boundary: renders one navigation target from a snapshot
pub trait ScreenView {
    fn render(&self, snapshot: &Snapshot, area: Rect, buf: &mut Buffer);
}

/// Helper to construct the view for the current navigation target
pub fn current_view(screen: Screen) -> Box<dyn ScreenView> {
    match screen {
        Screen::Game => Box::new(GameView),
        Screen::Scores => Box::new(ScoresView),
    }
}
