use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::session::{GameState, Status};
use crate::ui::{
    bold, centered_rect, dim_bold, fmt_pct, italic, render_celebration, screen::ScreenView, word_spans,
    Snapshot, HORIZONTAL_MARGIN, VERTICAL_MARGIN,
};

/// Seconds left at which the countdown turns red
const TIMER_WARNING_SECS: u32 = 3;

pub struct GameView;

impl ScreenView for GameView {
    fn render(&self, snapshot: &Snapshot, area: Rect, buf: &mut Buffer) {
        match snapshot.state.status {
            Status::Idle => render_idle(snapshot.state, area, buf),
            Status::Playing => render_playing(snapshot.state, area, buf),
            Status::StageCleared => {
                render_playing(snapshot.state, area, buf);
                render_stage_cleared(snapshot.state, area, buf);
            }
            Status::Completed => render_summary(snapshot, area, buf),
        }

        if snapshot.celebration.is_active {
            render_celebration(snapshot.celebration, area, buf);
        }
    }
}

fn legend(text: &str) -> Paragraph<'_> {
    Paragraph::new(Span::styled(text, italic())).alignment(Alignment::Center)
}

fn stage_goal(state: &GameState) -> String {
    let stage = state.active_stage();
    format!(
        "Stage {}: {} words at {} accuracy",
        stage.id,
        stage.words_to_clear,
        fmt_pct(stage.min_accuracy)
    )
}

fn render_idle(state: &GameState, area: Rect, buf: &mut Buffer) {
    let difficulty = state.difficulty_key.config();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(Span::styled(
        "wordsprint",
        bold().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Line::from(vec![
        Span::styled(state.display_name().to_string(), bold()),
        Span::raw("  ·  "),
        Span::styled(difficulty.label, bold().fg(Color::Cyan)),
        Span::raw(format!(
            "  ·  {}s per word",
            difficulty.time_limit_secs
        )),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Paragraph::new(Span::styled(stage_goal(state), dim_bold()))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    Paragraph::new(Span::styled(
        format!("★ {}   ● {}", state.progress.stars, state.progress.coins),
        Style::default().fg(Color::Yellow),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);

    legend("(enter) start / (d)ifficulty / (tab) scores / (q)uit").render(chunks[6], buf);
}

fn header_line(state: &GameState) -> Line<'static> {
    let shown_index = (state.current_word_index + 1).min(state.words.len());
    Line::from(vec![
        Span::styled(format!("Word {} / {}", shown_index, state.words.len()), bold()),
        Span::raw("   "),
        Span::styled(format!("✓ {}", state.stats.correct_words), bold().fg(Color::Green)),
        Span::raw("   "),
        Span::styled(format!("✗ {}", state.stats.errors), bold().fg(Color::Red)),
        Span::raw("   "),
        Span::raw(format!("score {}", state.stats.session_score)),
        Span::raw("   "),
        Span::raw(format!("streak {}", state.stats.streak)),
    ])
}

fn stage_line(state: &GameState) -> Line<'static> {
    let stage = state.active_stage();
    let accuracy = state.stage.accuracy();
    let accuracy_style = if accuracy >= stage.min_accuracy {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    };

    Line::from(vec![
        Span::styled(format!("Stage {}", stage.id), bold().fg(Color::Cyan)),
        Span::raw(format!(
            "  {}/{} words  accuracy ",
            state.stage.correct_in_stage.min(stage.words_to_clear),
            stage.words_to_clear
        )),
        Span::styled(fmt_pct(accuracy), accuracy_style),
        Span::raw(format!(" (need {})", fmt_pct(stage.min_accuracy))),
    ])
}

fn render_playing(state: &GameState, area: Rect, buf: &mut Buffer) {
    let hints = state.difficulty_key.config().hints;
    let Some(entry) = state.current_word() else {
        return;
    };

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let definition_lines = if hints.show_definition {
        (entry.definition.width() as f64 / max_chars_per_line as f64).ceil() as u16
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Length(1), // stage goal
            Constraint::Min(1),
            Constraint::Length(2), // timer
            Constraint::Length(2), // word
            Constraint::Length(definition_lines),
            Constraint::Min(1),
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(header_line(state))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);
    Paragraph::new(stage_line(state))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let timer_style = if state.timer.time_left_secs <= TIMER_WARNING_SECS {
        bold().fg(Color::Red)
    } else {
        dim_bold()
    };
    Paragraph::new(Span::styled(format!("{}s", state.timer.time_left_secs), timer_style))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    Paragraph::new(Line::from(word_spans(&entry.word, &state.user_input, hints)))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

    if hints.show_definition {
        Paragraph::new(Span::styled(entry.definition.as_str(), italic()))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[5], buf);
    }

    legend("(esc) reset / (tab) scores").render(chunks[7], buf);
}

fn render_stage_cleared(state: &GameState, area: Rect, buf: &mut Buffer) {
    let Some(cleared) = state.ui.last_stage_reward else {
        return;
    };

    let popup = centered_rect(40, 8, area);
    Clear.render(popup, buf);

    let lines = vec![
        Line::from(Span::styled(
            format!("Stage {} cleared!", cleared.stage_id),
            bold().fg(Color::Green),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("+{} ★", cleared.reward.stars), bold().fg(Color::Yellow)),
            Span::raw("   "),
            Span::styled(format!("+{} ●", cleared.reward.coins), bold().fg(Color::LightGreen)),
        ]),
        Line::from(""),
        Line::from(Span::styled("(enter) continue", italic())),
    ];

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .render(popup, buf);
}

fn render_summary(snapshot: &Snapshot, area: Rect, buf: &mut Buffer) {
    let state = snapshot.state;
    let metrics = &snapshot.metrics;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(2),
            Constraint::Length(6),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(Span::styled("Session complete", bold().fg(Color::Yellow)))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:>14}  "), dim_bold()),
            Span::styled(format!("{value:<10}"), bold()),
        ])
    };
    let stats = &state.stats;
    let lines = vec![
        row("score", stats.session_score.to_string()),
        row("correct words", stats.correct_words.to_string()),
        row("errors", stats.errors.to_string()),
        row("max streak", stats.max_streak.to_string()),
        row("accuracy", fmt_pct(metrics.accuracy)),
        row("net wpm", format!("{:.1}", metrics.net_wpm)),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    legend("(enter) play again / (tab) scores / (q)uit").render(chunks[4], buf);
}
