//! Cell buffer that particle and spark views are plotted into.

use ember_core::{ParticleView, SparkView, Viewport};
use ratatui::{
    style::Style,
    text::{Line, Span},
};

use crate::chars::{ember_char, spark_char};
use crate::color::{BACKDROP, EMBER_GOLD, GLOW_SPREAD, SPARK_GOLD, backdrop, blend};

/// Particle units per terminal column.
pub const CELL_WIDTH: f32 = 8.0;

/// Particle units per terminal row.
pub const CELL_HEIGHT: f32 = 16.0;

/// Particle-space viewport covering a terminal area.
pub fn viewport_for(width: u16, height: u16) -> Viewport {
    Viewport::new(width as f32 * CELL_WIDTH, height as f32 * CELL_HEIGHT)
}

/// Terminal cell holding a particle-space point, if it is on screen.
pub fn cell_at(x: f32, y: f32, width: u16, height: u16) -> Option<(u16, u16)> {
    if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 {
        return None;
    }
    let col = (x / CELL_WIDTH) as u32;
    let row = (y / CELL_HEIGHT) as u32;
    (col < width as u32 && row < height as u32).then_some((col as u16, row as u16))
}

/// Centre of a terminal cell in particle space.
pub fn cell_centre(column: u16, row: u16) -> (f32, f32) {
    (
        (column as f32 + 0.5) * CELL_WIDTH,
        (row as f32 + 0.5) * CELL_HEIGHT,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Mark {
    ch: char,
    color: (u8, u8, u8),
    alpha: f32,
}

/// One frame's worth of plotted embers and sparks.
#[derive(Debug, Clone)]
pub struct EmberCanvas {
    width: u16,
    height: u16,
    marks: Vec<Option<Mark>>,
    glow: Vec<f32>,
    glow_enabled: bool,
}

impl EmberCanvas {
    pub fn new(width: u16, height: u16, glow_enabled: bool) -> Self {
        let cells = width as usize * height as usize;
        Self {
            width,
            height,
            marks: vec![None; cells],
            glow: vec![0.0; cells],
            glow_enabled,
        }
    }

    fn index(&self, col: u16, row: u16) -> usize {
        row as usize * self.width as usize + col as usize
    }

    /// Keep the brighter of the existing and the new mark.
    fn put(&mut self, col: u16, row: u16, mark: Mark) {
        let idx = self.index(col, row);
        let dimmer = matches!(self.marks[idx], Some(existing) if existing.alpha >= mark.alpha);
        if !dimmer {
            self.marks[idx] = Some(mark);
        }
    }

    fn bleed(&mut self, col: u16, row: u16, alpha: f32) {
        let neighbours = [
            (col.checked_sub(1), Some(row)),
            (col.checked_add(1), Some(row)),
            (Some(col), row.checked_sub(1)),
            (Some(col), row.checked_add(1)),
        ];
        for (c, r) in neighbours {
            if let (Some(c), Some(r)) = (c, r)
                && c < self.width
                && r < self.height
            {
                let idx = self.index(c, r);
                self.glow[idx] = self.glow[idx].max(alpha * GLOW_SPREAD);
            }
        }
    }

    pub fn plot_ember(&mut self, ember: ParticleView) {
        let Some((col, row)) = cell_at(ember.x, ember.y, self.width, self.height) else {
            return;
        };
        self.put(
            col,
            row,
            Mark {
                ch: ember_char(ember.radius),
                color: EMBER_GOLD,
                alpha: ember.opacity,
            },
        );
        if self.glow_enabled {
            self.bleed(col, row, ember.opacity);
        }
    }

    pub fn plot_spark(&mut self, spark: SparkView) {
        let Some((col, row)) = cell_at(spark.x, spark.y, self.width, self.height) else {
            return;
        };
        self.put(
            col,
            row,
            Mark {
                ch: spark_char(spark.scale),
                color: SPARK_GOLD,
                alpha: spark.opacity,
            },
        );
    }

    /// Glyph at a cell, if anything was plotted there.
    pub fn glyph(&self, col: u16, row: u16) -> Option<char> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.marks[self.index(col, row)].map(|m| m.ch)
    }

    /// Number of cells holding a glyph.
    pub fn lit(&self) -> usize {
        self.marks.iter().filter(|m| m.is_some()).count()
    }

    pub fn into_lines(self) -> Vec<Line<'static>> {
        (0..self.height)
            .map(|row| {
                let spans: Vec<Span> = (0..self.width)
                    .map(|col| {
                        let idx = self.index(col, row);
                        let bg = if self.glow[idx] > 0.0 {
                            blend(EMBER_GOLD, BACKDROP, self.glow[idx])
                        } else {
                            backdrop()
                        };
                        match self.marks[idx] {
                            Some(mark) => Span::styled(
                                mark.ch.to_string(),
                                Style::new().fg(blend(mark.color, BACKDROP, mark.alpha)).bg(bg),
                            ),
                            None => Span::styled(" ", Style::new().bg(bg)),
                        }
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}
