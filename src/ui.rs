pub mod game_screen;
pub mod scores;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    Frame,
};

use crate::catalog::Hints;
use crate::celebration::{Celebration, ParticleKind};
use crate::metrics::Metrics;
use crate::session::GameState;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Everything a frame needs, borrowed from the live session
pub struct Snapshot<'a> {
    pub state: &'a GameState,
    pub metrics: Metrics,
    pub celebration: &'a Celebration,
}

pub fn draw(f: &mut Frame, snapshot: &Snapshot) {
    let area = f.area();
    screen::current_view(snapshot.state.screen).render(snapshot, area, f.buffer_mut());
}

pub fn fmt_pct(value: f64) -> String {
    format!("{}%", (value * 100.0).round() as i64)
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

/// Colour the target word by what has been typed so far. Untyped letters are
/// masked with underscores unless the difficulty reveals them.
pub fn word_spans(word: &str, input: &str, hints: Hints) -> Vec<Span<'static>> {
    let typed: Vec<char> = input.chars().collect();
    let green = bold().fg(Color::Green);
    let red = bold().fg(Color::Red).add_modifier(Modifier::CROSSED_OUT);
    let cursor = dim_bold().add_modifier(Modifier::UNDERLINED);

    word.chars()
        .enumerate()
        .map(|(idx, expected)| match typed.get(idx) {
            Some(&c) if c == expected => Span::styled(expected.to_string(), green),
            Some(&c) => Span::styled(c.to_string(), red),
            None => {
                let shown = if hints.show_target_letters { expected } else { '_' };
                let style = if idx == typed.len() { cursor } else { dim_bold() };
                Span::styled(shown.to_string(), style)
            }
        })
        .collect()
}

/// A `width` x `height` box centred in `area`, shrunk to fit
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Paint celebration particles over whatever is already in the buffer
fn render_celebration(celebration: &Celebration, area: Rect, buf: &mut Buffer) {
    let sparks = [Color::Magenta, Color::Cyan, Color::LightYellow];

    for (i, particle) in celebration.particles.iter().enumerate() {
        if particle.x < 0.0 || particle.y < 0.0 {
            continue;
        }
        let x = particle.x as u16;
        let y = particle.y as u16;
        if x >= area.width || y >= area.height {
            continue;
        }

        let color = match particle.kind {
            ParticleKind::Star => Color::Yellow,
            ParticleKind::Coin => Color::LightGreen,
            ParticleKind::Spark => sparks[i % sparks.len()],
        };
        let style = match particle.fade() {
            f if f > 0.6 => Style::default().fg(color).add_modifier(Modifier::BOLD),
            f if f > 0.25 => Style::default().fg(color),
            _ => Style::default().fg(color).add_modifier(Modifier::DIM),
        };

        if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
            cell.set_symbol(&particle.symbol.to_string());
            cell.set_style(style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REVEAL: Hints = Hints {
        show_definition: true,
        show_target_letters: true,
    };
    const MASK: Hints = Hints {
        show_definition: false,
        show_target_letters: false,
    };

    fn text(spans: &[Span]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_word_spans_reveal() {
        let spans = word_spans("planet", "plx", REVEAL);
        assert_eq!(text(&spans), "plxnet");
        assert_eq!(spans[0].style.fg, Some(Color::Green));
        assert_eq!(spans[2].style.fg, Some(Color::Red));
        assert!(spans[3].style.add_modifier.contains(Modifier::UNDERLINED));
        assert!(!spans[4].style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_word_spans_mask_untyped_letters() {
        let spans = word_spans("planet", "pl", MASK);
        assert_eq!(text(&spans), "pl____");
    }

    #[test]
    fn test_fmt_pct_rounds() {
        assert_eq!(fmt_pct(0.854), "85%");
        assert_eq!(fmt_pct(1.0), "100%");
        assert_eq!(fmt_pct(0.0), "0%");
    }

    #[test]
    fn test_centered_rect_fits_inside() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(centered_rect(40, 10, area), Rect::new(20, 7, 40, 10));
        assert_eq!(centered_rect(200, 50, area), area);
    }
}
