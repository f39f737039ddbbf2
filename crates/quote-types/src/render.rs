//! Presentation helpers for quote cards: consecutive lines by one author
//! merge into a run with a single attribution, and clearance levels map to
//! a hue for the lock badge.

use crate::models::{LineAuthor, QuoteLine};

/// A maximal run of consecutive lines sharing an author. The attribution
/// label renders once, after the last line of the run.
#[derive(Debug)]
pub struct LineRun<'a> {
    pub lines: Vec<&'a QuoteLine>,
    pub author: &'a LineAuthor,
}

/// Group ordered quote lines into attribution runs. A run closes when the
/// next line references a different author, or at the end of the quote.
pub fn group_lines(lines: &[QuoteLine]) -> Vec<LineRun<'_>> {
    let mut runs: Vec<LineRun> = Vec::new();
    for line in lines {
        match runs.last_mut() {
            Some(run) if run.author.id == line.author.id => run.lines.push(line),
            _ => runs.push(LineRun {
                lines: vec![line],
                author: &line.author,
            }),
        }
    }
    runs
}

/// Hue for a clearance level: 0 (most restrictive color) through 255
/// (least). Linear over the 0..=100 hue range; out-of-range levels clamp.
pub fn clearance_hue(level: i64) -> f32 {
    let level = level.clamp(0, 255) as f32;
    (255.0 - level) / 255.0 * 100.0
}

/// CSS color for the clearance badge. Cosmetic only, not an access check.
pub fn clearance_color(level: i64) -> String {
    format!("hsl({:.0}, 45%, 50%)", clearance_hue(level))
}
