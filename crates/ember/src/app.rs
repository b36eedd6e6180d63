use std::time::{Duration, Instant};

use chrono::{DateTime, Local, Utc};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use ember_background::{BackgroundState, EMBER_GOLD, SPARK_GOLD, viewport_for};
use ember_config::Config;
use ember_core::{CoreError, CountdownClock, FrameLoop, ParticleField, SparkTrail};
use ember_fonts::{GLYPH_HEIGHT, build_countdown_art};
use log::debug;
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Alignment, Constraint, Layout},
    style::{Color, Style, Stylize},
    text::Line,
    widgets::Paragraph,
};

/// Interval between ember frames (~60 fps).
const FRAME_PERIOD: Duration = Duration::from_millis(16);

/// Frame deadline tracker. Input can wake the loop at any time; only a
/// passed deadline produces a frame.
#[derive(Debug, Clone, Copy)]
struct FramePacer {
    period: Duration,
    next_frame: Instant,
}

impl FramePacer {
    fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_frame: now,
        }
    }

    fn is_due(&self, now: Instant) -> bool {
        now >= self.next_frame
    }

    /// Claim the current frame if its deadline has passed.
    ///
    /// Frames missed while the loop was busy are skipped, not replayed.
    fn try_frame(&mut self, now: Instant) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.next_frame += self.period;
        if self.next_frame <= now {
            self.next_frame = now + self.period;
        }
        true
    }

    /// Time left until the next frame is due.
    fn timeout(&self, now: Instant) -> Duration {
        self.next_frame.saturating_duration_since(now)
    }
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    /// Countdown to the event.
    clock: CountdownClock,
    /// Ember field and cursor sparks.
    background: BackgroundState,
    /// Name shown above the digits.
    event_name: String,
    /// Target in local time, for the date line.
    target: DateTime<Local>,
}

impl App {
    /// Build the app for the current terminal size.
    pub fn new(config: &Config, target: DateTime<Utc>) -> color_eyre::Result<Self> {
        let (width, height) = crossterm::terminal::size()
            .map_err(|e| CoreError::HostUnavailable(format!("cannot read terminal size: {e}")))?;
        Self::with_size(config, target, width, height)
    }

    fn with_size(
        config: &Config,
        target: DateTime<Utc>,
        width: u16,
        height: u16,
    ) -> color_eyre::Result<Self> {
        let field = ParticleField::new(&config.field_config(viewport_for(width, height)))?;
        let sparks = config.spark_config().map(SparkTrail::new).transpose()?;
        let background =
            BackgroundState::new(FrameLoop::mount(field), sparks).with_glow(config.glow);
        let clock = CountdownClock::system(target, config.tick_period())?;

        Ok(Self {
            running: false,
            clock,
            background,
            event_name: config.event_name.clone(),
            target: target.with_timezone(&Local),
        })
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.clock.start()?;
        self.running = true;
        let mut pacer = FramePacer::new(FRAME_PERIOD, Instant::now());
        while self.running {
            if pacer.try_frame(Instant::now()) {
                terminal.draw(|frame| self.render(frame))?;
            }
            self.handle_crossterm_events(&pacer)?;
        }
        self.clock.stop();
        self.background.unmount();
        debug!("drew {} frames", self.background.frames_drawn());
        Ok(())
    }

    /// Renders the user interface.
    fn render(&mut self, frame: &mut Frame) {
        self.background.render(frame, Instant::now());

        let gold = rgb(EMBER_GOLD);
        let highlight = rgb(SPARK_GOLD);
        let remaining = self.clock.current();
        let art = build_countdown_art(&remaining);

        let chunks = Layout::vertical([
            Constraint::Fill(1),                        // Top padding
            Constraint::Length(1),                      // Event name
            Constraint::Length(1),                      // Spacing
            Constraint::Length(GLYPH_HEIGHT as u16),    // Digits
            Constraint::Length(1),                      // Labels
            Constraint::Length(1),                      // Spacing
            Constraint::Length(1),                      // Date
            Constraint::Fill(1),                        // Bottom padding
            Constraint::Length(1),                      // Help or banner
        ])
        .split(frame.area());

        let title = Line::from(self.event_name.as_str())
            .style(Style::new().fg(highlight).bold())
            .centered();
        frame.render_widget(title, chunks[1]);

        let digits: Vec<Line> = art
            .rows
            .into_iter()
            .map(|row| Line::from(row).style(Style::new().fg(gold)))
            .collect();
        frame.render_widget(Paragraph::new(digits).alignment(Alignment::Center), chunks[3]);

        let labels = Line::from(art.labels).style(Style::new().fg(gold).dim()).centered();
        frame.render_widget(labels, chunks[4]);

        let date = Line::from(self.target.format("%A, %B %d, %Y  %H:%M").to_string())
            .style(Style::new().fg(gold))
            .centered();
        frame.render_widget(date, chunks[6]);

        let footer = if self.clock.is_finished() {
            Line::from(format!("✦ {} is live ✦", self.event_name))
                .style(Style::new().fg(highlight).bold())
        } else {
            Line::from(vec![
                "q".bold().fg(gold),
                " quit  ".dark_gray(),
                "s".bold().fg(gold),
                " sparks  ".dark_gray(),
                "g".bold().fg(gold),
                " glow".dark_gray(),
            ])
        };
        frame.render_widget(footer.centered(), chunks[8]);
    }

    /// Reads the crossterm events and updates the state of [`App`].
    ///
    /// Waits at most until the next frame is due, then drains whatever else
    /// is already queued so a burst of input costs no extra frames.
    fn handle_crossterm_events(&mut self, pacer: &FramePacer) -> color_eyre::Result<()> {
        if !event::poll(pacer.timeout(Instant::now()))? {
            return Ok(());
        }
        self.on_event(event::read()?);
        while self.running && !pacer.is_due(Instant::now()) && event::poll(Duration::ZERO)? {
            self.on_event(event::read()?);
        }
        Ok(())
    }

    fn on_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
            Event::Mouse(mouse) => self.on_mouse_event(mouse),
            Event::FocusLost => self.background.pointer_left(),
            // Resizes are picked up by the background on the next draw.
            _ => {}
        }
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char('s')) => {
                let visible = self.background.toggle_sparks();
                debug!("sparks visible: {visible}");
            }
            (_, KeyCode::Char('g')) => {
                let glow = self.background.toggle_glow();
                debug!("glow: {glow}");
            }
            _ => {}
        }
    }

    fn on_mouse_event(&mut self, mouse: MouseEvent) {
        if let MouseEventKind::Moved | MouseEventKind::Drag(_) = mouse.kind {
            self.background
                .pointer_moved(mouse.column, mouse.row, Instant::now());
        }
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}
