//! Background animation state management.

use std::time::Instant;

use ember_core::{FrameFlow, FrameLoop, SparkTrail};
use log::debug;
use ratatui::{Frame, layout::Rect, widgets::Paragraph};

use crate::canvas::{CELL_HEIGHT, CELL_WIDTH, EmberCanvas, cell_centre, viewport_for};

/// Ember field and cursor sparks mounted on the terminal.
#[derive(Debug)]
pub struct BackgroundState {
    /// Per-frame driver for the ember field.
    frames: FrameLoop,
    /// Pointer spark trail, if enabled.
    sparks: Option<SparkTrail>,
    /// Whether sparks are currently shown.
    sparks_visible: bool,
    /// Bleed ember light into neighbouring cells.
    glow: bool,
    /// Last known terminal width.
    last_width: u16,
    /// Last known terminal height.
    last_height: u16,
}

impl BackgroundState {
    /// Mount an ember field and an optional spark trail.
    pub fn new(frames: FrameLoop, sparks: Option<SparkTrail>) -> Self {
        let (last_width, last_height) = frames
            .field()
            .map(|f| {
                let vp = f.viewport();
                (
                    (vp.width / CELL_WIDTH) as u16,
                    (vp.height / CELL_HEIGHT) as u16,
                )
            })
            .unwrap_or_default();

        Self {
            frames,
            sparks_visible: sparks.is_some(),
            sparks,
            glow: false,
            last_width,
            last_height,
        }
    }

    pub fn with_glow(mut self, glow: bool) -> Self {
        self.glow = glow;
        self
    }

    /// Advance one frame and plot everything into a fresh canvas.
    ///
    /// A size change is forwarded to the field as a viewport update; the
    /// particles themselves are left where they are.
    pub fn draw(&mut self, width: u16, height: u16, now: Instant) -> EmberCanvas {
        if width != self.last_width || height != self.last_height {
            let vp = viewport_for(width, height);
            self.frames.resize(vp.width, vp.height);
            self.last_width = width;
            self.last_height = height;
            debug!("background resized to {width}x{height}");
        }

        let mut canvas = EmberCanvas::new(width, height, self.glow);
        if self.frames.frame(|p| canvas.plot_ember(p)) == FrameFlow::Stopped {
            return canvas;
        }

        if let Some(trail) = self.sparks.as_mut() {
            trail.prune(now);
            if self.sparks_visible {
                trail.for_each(now, |s| canvas.plot_spark(s));
            }
        }

        canvas
    }

    /// Render the background to the frame.
    pub fn render(&mut self, frame: &mut Frame, now: Instant) {
        let area: Rect = frame.area();
        let canvas = self.draw(area.width, area.height, now);
        frame.render_widget(Paragraph::new(canvas.into_lines()), area);
    }

    /// Feed a pointer position in terminal cells to the spark trail.
    pub fn pointer_moved(&mut self, column: u16, row: u16, now: Instant) {
        if !self.sparks_visible || !self.frames.is_mounted() {
            return;
        }
        if let Some(trail) = self.sparks.as_mut() {
            let (x, y) = cell_centre(column, row);
            trail.on_pointer_move(x, y, now);
        }
    }

    /// Drop all sparks when the pointer leaves.
    pub fn pointer_left(&mut self) {
        if let Some(trail) = self.sparks.as_mut() {
            trail.clear();
        }
    }

    /// Show or hide sparks. Returns the new visibility.
    pub fn toggle_sparks(&mut self) -> bool {
        if self.sparks.is_none() {
            return false;
        }
        self.sparks_visible = !self.sparks_visible;
        if !self.sparks_visible {
            self.pointer_left();
        }
        self.sparks_visible
    }

    pub fn toggle_glow(&mut self) -> bool {
        self.glow = !self.glow;
        self.glow
    }

    /// Stop the ember loop. Later draws produce an empty canvas.
    pub fn unmount(&mut self) {
        self.frames.unmount();
        self.pointer_left();
    }

    pub fn is_mounted(&self) -> bool {
        self.frames.is_mounted()
    }

    /// Frames drawn since mounting.
    pub fn frames_drawn(&self) -> u64 {
        self.frames.frames()
    }
}

impl Drop for BackgroundState {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::{FieldConfig, ParticleField, SparkConfig};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;

    fn background(width: u16, height: u16, count: usize) -> BackgroundState {
        let mut config = FieldConfig::embers(viewport_for(width, height));
        config.count = count;
        let field = ParticleField::seeded(&config, 17).unwrap();
        let trail =
            SparkTrail::with_rng(SparkConfig::default(), StdRng::seed_from_u64(3)).unwrap();
        BackgroundState::new(FrameLoop::mount(field), Some(trail))
    }

    #[test]
    fn test_initial_size_from_field() {
        let bg = background(40, 20, 5);
        assert_eq!((bg.last_width, bg.last_height), (40, 20));
    }

    #[test]
    fn test_draw_counts_frames() {
        let mut bg = background(40, 20, 30);
        let now = Instant::now();
        let canvas = bg.draw(40, 20, now);
        assert!(canvas.lit() > 0);
        bg.draw(40, 20, now);
        assert_eq!(bg.frames_drawn(), 2);
    }

    #[test]
    fn test_resize_updates_viewport_only() {
        let mut bg = background(40, 20, 10);

        // Same seed, resized in place and advanced once by hand.
        let mut config = FieldConfig::embers(viewport_for(40, 20));
        config.count = 10;
        let mut twin = ParticleField::seeded(&config, 17).unwrap();
        let vp = viewport_for(80, 30);
        twin.resize(vp.width, vp.height);
        twin.advance();

        bg.draw(80, 30, Instant::now());
        let field = bg.frames.field().unwrap();
        assert_eq!(field.viewport(), vp);
        assert_eq!(field.particles(), twin.particles());
    }

    #[test]
    fn test_pointer_sparks_drawn() {
        let mut bg = background(10, 10, 0);
        let now = Instant::now();
        bg.pointer_moved(3, 4, now);
        let canvas = bg.draw(10, 10, now);
        assert_eq!(canvas.glyph(3, 4), Some('✦'));

        let later = now + Duration::from_secs(1);
        let canvas = bg.draw(10, 10, later);
        assert_eq!(canvas.lit(), 0);
    }

    #[test]
    fn test_toggle_sparks_hides_trail() {
        let mut bg = background(10, 10, 0);
        assert!(!bg.toggle_sparks());
        let now = Instant::now();
        bg.pointer_moved(1, 1, now);
        assert_eq!(bg.draw(10, 10, now).lit(), 0);
        assert!(bg.toggle_sparks());
    }

    #[test]
    fn test_unmount_draws_nothing() {
        let mut bg = background(20, 10, 50);
        let now = Instant::now();
        bg.draw(20, 10, now);
        bg.unmount();
        assert!(!bg.is_mounted());

        bg.pointer_moved(2, 2, now);
        for _ in 0..5 {
            assert_eq!(bg.draw(20, 10, now).lit(), 0);
        }
        assert_eq!(bg.frames_drawn(), 1);
    }
}
