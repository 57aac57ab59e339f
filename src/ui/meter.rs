//! Volume meter and spinner glyphs for the live-call panel.

use ratatui::style::Color;
use std::time::{SystemTime, UNIX_EPOCH};

const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const SPINNER_CYCLE_MS: u64 = 100;

// Keep the warning/hot transitions reactive for normal speech loudness.
const LEVEL_WARNING: f32 = 0.5;
const LEVEL_HOT: f32 = 0.8;

const BAR_FILLED: char = '█';
const BAR_EMPTY: char = '░';

#[inline]
fn animation_frame(frame_count: usize, cycle_ms: u64) -> usize {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    ((now / cycle_ms) % frame_count as u64) as usize
}

/// Spinner glyph for the current wall-clock tick.
pub(super) fn spinner_glyph() -> char {
    spinner_glyph_at(animation_frame(SPINNER_FRAMES.len(), SPINNER_CYCLE_MS))
}

fn spinner_glyph_at(frame: usize) -> char {
    SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]
}

/// Filled/empty bar for a volume in `0.0..=1.0`. Out-of-range input is clamped.
pub(super) fn volume_bar(level: f32, width: usize) -> String {
    let level = if level.is_finite() {
        level.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (level * width as f32).round() as usize;
    let mut bar = String::with_capacity(width * BAR_FILLED.len_utf8());
    for i in 0..width {
        bar.push(if i < filled { BAR_FILLED } else { BAR_EMPTY });
    }
    bar
}

pub(super) fn level_color(level: f32) -> Color {
    if level < LEVEL_WARNING {
        Color::Rgb(110, 200, 120)
    } else if level < LEVEL_HOT {
        Color::Rgb(255, 200, 90)
    } else {
        Color::Rgb(255, 90, 90)
    }
}
