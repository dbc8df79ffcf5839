use chrono::{DateTime, Local};

use crate::session::SessionStats;

/// Keystrokes per "word" for WPM purposes
pub const CHARS_PER_WORD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub accuracy: f64,
    pub elapsed_ms: i64,
    pub gross_wpm: f64,
    pub net_wpm: f64,
}

pub fn accuracy(correct: u32, total: u32) -> f64 {
    if total == 0 {
        1.0
    } else {
        correct as f64 / total as f64
    }
}

/// Milliseconds between start and end, never less than 1. A missing
/// timestamp stands in as `now`.
pub fn elapsed_ms(
    started_at: Option<DateTime<Local>>,
    ended_at: Option<DateTime<Local>>,
    now: DateTime<Local>,
) -> i64 {
    let end = ended_at.unwrap_or(now);
    let start = started_at.unwrap_or(now);
    (end - start).num_milliseconds().max(1)
}

pub fn wpm(keystrokes: u32, elapsed_ms: i64) -> f64 {
    if keystrokes == 0 {
        return 0.0;
    }
    let minutes = elapsed_ms.max(1) as f64 / 60_000.0;
    (keystrokes as f64 / CHARS_PER_WORD) / minutes
}

/// Derive accuracy and speed from session counters. Pure; callable mid-session.
pub fn compute(stats: &SessionStats, now: DateTime<Local>) -> Metrics {
    let elapsed = elapsed_ms(stats.started_at, stats.ended_at, now);
    Metrics {
        accuracy: accuracy(stats.correct_keystrokes, stats.total_keystrokes),
        elapsed_ms: elapsed,
        gross_wpm: wpm(stats.total_keystrokes, elapsed),
        net_wpm: wpm(stats.correct_keystrokes, elapsed),
    }
}
