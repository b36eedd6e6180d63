//! Block digit art for the ember countdown.

use ember_core::Remaining;

/// Rows per glyph.
pub const GLYPH_HEIGHT: usize = 5;

/// Width of a digit glyph in cells.
pub const DIGIT_WIDTH: usize = 5;

/// Block digits, 5 rows tall and 5 cells wide.
pub const DIGITS: [[&str; GLYPH_HEIGHT]; 10] = [
    ["█████", "█   █", "█   █", "█   █", "█████"],
    ["  █  ", " ██  ", "  █  ", "  █  ", " ███ "],
    ["█████", "    █", "█████", "█    ", "█████"],
    ["█████", "    █", " ████", "    █", "█████"],
    ["█   █", "█   █", "█████", "    █", "    █"],
    ["█████", "█    ", "█████", "    █", "█████"],
    ["█████", "█    ", "█████", "█   █", "█████"],
    ["█████", "    █", "   █ ", "  █  ", "  █  "],
    ["█████", "█   █", "█████", "█   █", "█████"],
    ["█████", "█   █", "█████", "    █", "█████"],
];

/// Separator between groups, with its surrounding gap.
pub const SEPARATOR: [&str; GLYPH_HEIGHT] = ["   ", " ▪ ", "   ", " ▪ ", "   "];

/// Labels shown under each group, in display order.
pub const LABELS: [&str; 4] = ["DAYS", "HOURS", "MIN", "SEC"];

/// Rendered countdown: glyph rows plus a label row aligned beneath.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownArt {
    pub rows: Vec<String>,
    pub labels: String,
}

impl CountdownArt {
    /// Display width in cells.
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |r| r.chars().count())
    }
}

/// Zero-padded decimal digits of `value`, at least two wide.
fn digits_of(value: u64) -> Vec<usize> {
    format!("{value:02}")
        .bytes()
        .map(|b| (b - b'0') as usize)
        .collect()
}

fn group_width(digit_count: usize) -> usize {
    digit_count * DIGIT_WIDTH + digit_count.saturating_sub(1)
}

/// Build `DD:HH:MM:SS` block art for a snapshot.
///
/// Days widen past two digits when needed; the other groups are always two
/// digits. Each label is centred under its group.
pub fn build_countdown_art(remaining: &Remaining) -> CountdownArt {
    let groups = [
        digits_of(remaining.days),
        digits_of(remaining.hours as u64),
        digits_of(remaining.minutes as u64),
        digits_of(remaining.seconds as u64),
    ];

    let mut rows = Vec::with_capacity(GLYPH_HEIGHT);
    for row in 0..GLYPH_HEIGHT {
        let mut line = String::new();
        for (g, group) in groups.iter().enumerate() {
            if g > 0 {
                line.push_str(SEPARATOR[row]);
            }
            for (i, &d) in group.iter().enumerate() {
                if i > 0 {
                    line.push(' ');
                }
                line.push_str(DIGITS[d][row]);
            }
        }
        rows.push(line);
    }

    let gap = " ".repeat(SEPARATOR[0].chars().count());
    let labels = groups
        .iter()
        .zip(LABELS)
        .map(|(group, label)| format!("{label:^width$}", width = group_width(group.len())))
        .collect::<Vec<_>>()
        .join(&gap);

    CountdownArt { rows, labels }
}
