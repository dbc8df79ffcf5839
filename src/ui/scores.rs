use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Color,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::session::{GameState, Status};
use crate::ui::{bold, dim_bold, fmt_pct, italic, screen::ScreenView, Snapshot, HORIZONTAL_MARGIN, VERTICAL_MARGIN};

/// Campaign progress, personal bests and the running session
pub struct ScoresView;

fn row(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:>18}  "), dim_bold()),
        Span::styled(value, bold()),
    ])
}

fn boxed<'a>(title: &'a str, lines: Vec<Line<'a>>) -> Paragraph<'a> {
    Paragraph::new(lines).block(
        Block::default()
            .title(Span::styled(title, bold().fg(Color::Cyan)))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    )
}

fn progress_lines(state: &GameState) -> Vec<Line<'static>> {
    let stage = state.active_stage();
    vec![
        row("profile", state.display_name().to_string()),
        row("difficulty", state.difficulty_key.config().label.to_string()),
        row("stars", format!("{} ★", state.progress.stars)),
        row("coins", format!("{} ●", state.progress.coins)),
        row(
            "current stage",
            format!(
                "{} ({} words at {})",
                stage.id,
                stage.words_to_clear,
                fmt_pct(stage.min_accuracy)
            ),
        ),
    ]
}

fn best_lines(state: &GameState) -> Vec<Line<'static>> {
    let best = &state.high_scores;
    vec![
        row("best net wpm", format!("{:.1}", best.best_net_wpm)),
        row("best accuracy", fmt_pct(best.best_accuracy)),
        row("best score", best.best_session_score.to_string()),
    ]
}

fn session_lines(snapshot: &Snapshot) -> Vec<Line<'static>> {
    let state = snapshot.state;
    if state.status == Status::Idle || state.stats.total_keystrokes == 0 {
        return vec![Line::from(Span::styled("no session yet", italic()))];
    }
    vec![
        row("score", state.stats.session_score.to_string()),
        row(
            "words",
            format!("{} correct, {} errors", state.stats.correct_words, state.stats.errors),
        ),
        row("max streak", state.stats.max_streak.to_string()),
        row("accuracy", fmt_pct(snapshot.metrics.accuracy)),
        row("net wpm", format!("{:.1}", snapshot.metrics.net_wpm)),
    ]
}

impl ScreenView for ScoresView {
    fn render(&self, snapshot: &Snapshot, area: Rect, buf: &mut Buffer) {
        let state = snapshot.state;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(7), // progress
                Constraint::Length(5), // high scores
                Constraint::Length(7), // session
                Constraint::Min(0),
                Constraint::Length(1), // legend
            ])
            .split(area);

        boxed("Progress", progress_lines(state)).render(chunks[0], buf);
        boxed("High scores", best_lines(state)).render(chunks[1], buf);
        boxed("Last session", session_lines(snapshot)).render(chunks[2], buf);

        Paragraph::new(Span::styled(
            "(tab) back / (p) reset progress / (h) reset high scores",
            italic(),
        ))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
    }
}
