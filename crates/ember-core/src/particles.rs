//! Falling ember particle simulation.
//!
//! Pure state: [`ParticleField::advance`] moves every particle one frame and
//! [`ParticleField::for_each`] hands read-only views to a renderer. Nothing in
//! here knows how particles are drawn.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{CoreError, Result};

/// Vertical position a wrapped particle respawns at.
pub const RESPAWN_Y: f32 = -10.0;

/// Spatial frequency of the horizontal sway.
pub const SWAY_FREQUENCY: f32 = 0.01;

/// Upper limit on particle count.
pub const MAX_PARTICLES: usize = 10_000;

/// Inclusive lower / exclusive upper bound for a randomized attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f32,
    pub max: f32,
}

impl Bounds {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Draw a value in `[min, max)`, or `min` when the bounds are collapsed.
    pub fn sample<R: Rng>(self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.random_range(self.min..self.max)
        } else {
            self.min
        }
    }

    pub fn contains(self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(self, name: &'static str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(CoreError::invalid(name, "bounds must be finite"));
        }
        if self.min > self.max {
            return Err(CoreError::invalid(
                name,
                format!("min {} is greater than max {}", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// Size of the drawing surface.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn validate(self) -> Result<()> {
        for (name, value) in [("viewport.width", self.width), ("viewport.height", self.height)] {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::invalid(
                    name,
                    format!("must be a non-negative number, got {value}"),
                ));
            }
        }
        Ok(())
    }

    /// Replace negative or non-finite dimensions with zero.
    fn sanitized(self) -> Self {
        let clean = |v: f32| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Self {
            width: clean(self.width),
            height: clean(self.height),
        }
    }
}

/// Every tunable of a particle field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    pub count: usize,
    pub viewport: Viewport,
    pub radius: Bounds,
    /// Vertical distance travelled per frame.
    pub speed: Bounds,
    pub opacity: Bounds,
    /// Constant horizontal drift per frame.
    pub drift: Bounds,
    /// Peak horizontal sway per frame.
    pub sway_amplitude: f32,
}

impl FieldConfig {
    /// Sparse golden ash: 40 particles with gentle sway.
    pub fn embers(viewport: Viewport) -> Self {
        Self {
            count: 40,
            viewport,
            radius: Bounds::new(0.5, 2.5),
            speed: Bounds::new(0.2, 0.7),
            opacity: Bounds::new(0.1, 0.6),
            drift: Bounds::new(-0.025, 0.025),
            sway_amplitude: 0.5,
        }
    }

    /// Dense ember storm: 200 particles with full sway.
    pub fn storm(viewport: Viewport) -> Self {
        Self {
            count: 200,
            sway_amplitude: 1.0,
            ..Self::embers(viewport)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.count > MAX_PARTICLES {
            return Err(CoreError::invalid(
                "count",
                format!("{} exceeds the limit of {MAX_PARTICLES}", self.count),
            ));
        }
        self.viewport.validate()?;
        self.radius.validate("radius")?;
        self.speed.validate("speed")?;
        self.opacity.validate("opacity")?;
        self.drift.validate("drift")?;

        if self.radius.min < 0.0 {
            return Err(CoreError::invalid("radius", "radius cannot be negative"));
        }
        if self.speed.min < 0.0 {
            return Err(CoreError::invalid("speed", "embers cannot fall upward"));
        }
        if self.opacity.min < 0.0 || self.opacity.max > 1.0 {
            return Err(CoreError::invalid("opacity", "opacity must lie within [0, 1]"));
        }
        if !self.sway_amplitude.is_finite() {
            return Err(CoreError::invalid("sway_amplitude", "must be finite"));
        }
        Ok(())
    }
}

/// A single ember.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    x: f32,
    y: f32,
    radius: f32,
    vertical_speed: f32,
    horizontal_drift: f32,
    opacity: f32,
}

impl Particle {
    fn spawn<R: Rng>(config: &FieldConfig, rng: &mut R) -> Self {
        Self {
            x: Bounds::new(0.0, config.viewport.width).sample(rng),
            y: Bounds::new(0.0, config.viewport.height).sample(rng),
            radius: config.radius.sample(rng),
            vertical_speed: config.speed.sample(rng),
            horizontal_drift: config.drift.sample(rng),
            opacity: config.opacity.sample(rng),
        }
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn vertical_speed(&self) -> f32 {
        self.vertical_speed
    }

    pub fn horizontal_drift(&self) -> f32 {
        self.horizontal_drift
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    fn view(&self) -> ParticleView {
        ParticleView {
            x: self.x,
            y: self.y,
            radius: self.radius,
            opacity: self.opacity,
        }
    }
}

/// What a renderer needs to paint one particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleView {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub opacity: f32,
}

/// Fixed-size set of embers falling through a viewport.
#[derive(Debug, Clone)]
pub struct ParticleField<R = StdRng> {
    particles: Vec<Particle>,
    viewport: Viewport,
    sway_amplitude: f32,
    rng: R,
}

impl ParticleField<StdRng> {
    /// Build a field seeded from the operating system.
    pub fn new(config: &FieldConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Build a field with a fixed seed.
    pub fn seeded(config: &FieldConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ParticleField<R> {
    /// Build a field drawing randomness from `rng`. All particles are spawned
    /// up front inside the viewport.
    pub fn with_rng(config: &FieldConfig, mut rng: R) -> Result<Self> {
        config.validate()?;

        let particles = (0..config.count)
            .map(|_| Particle::spawn(config, &mut rng))
            .collect();

        debug!(
            "spawned {} particles in {}x{}",
            config.count, config.viewport.width, config.viewport.height
        );

        Ok(Self {
            particles,
            viewport: config.viewport,
            sway_amplitude: config.sway_amplitude,
            rng,
        })
    }

    /// Update the viewport. Existing particles keep their positions; only
    /// later respawns use the new bounds.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height).sanitized();
    }

    /// Move every particle one frame. Returns how many wrapped to the top.
    pub fn advance(&mut self) -> usize {
        let Viewport { width, height } = self.viewport;
        let mut wrapped = 0;

        for p in &mut self.particles {
            p.y += p.vertical_speed;
            p.x += (p.y * SWAY_FREQUENCY).sin() * self.sway_amplitude + p.horizontal_drift;

            if p.y > height {
                p.y = RESPAWN_Y;
                p.x = Bounds::new(0.0, width).sample(&mut self.rng);
                wrapped += 1;
            }
        }

        wrapped
    }

    /// Call `draw` once per particle, in order.
    pub fn for_each<F: FnMut(ParticleView)>(&self, mut draw: F) {
        for p in &self.particles {
            draw(p.view());
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn sway_amplitude(&self) -> f32 {
        self.sway_amplitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_field(count: usize, seed: u64) -> ParticleField {
        let mut config = FieldConfig::embers(Viewport::new(200.0, 100.0));
        config.count = count;
        ParticleField::seeded(&config, seed).unwrap()
    }

    #[test]
    fn test_presets() {
        let vp = Viewport::new(10.0, 10.0);
        let embers = FieldConfig::embers(vp);
        let storm = FieldConfig::storm(vp);
        assert_eq!(embers.count, 40);
        assert_eq!(embers.sway_amplitude, 0.5);
        assert_eq!(storm.count, 200);
        assert_eq!(storm.sway_amplitude, 1.0);
        assert_eq!(storm.radius, embers.radius);
        assert!(embers.validate().is_ok());
        assert!(storm.validate().is_ok());
    }

    #[test]
    fn test_spawn_respects_ranges() {
        let config = FieldConfig::storm(Viewport::new(320.0, 240.0));
        let field = ParticleField::seeded(&config, 7).unwrap();

        assert_eq!(field.len(), 200);
        for p in field.particles() {
            let (x, y) = p.position();
            assert!((0.0..=320.0).contains(&x));
            assert!((0.0..=240.0).contains(&y));
            assert!(config.radius.contains(p.radius()));
            assert!(config.speed.contains(p.vertical_speed()));
            assert!(config.opacity.contains(p.opacity()));
            assert!(config.drift.contains(p.horizontal_drift()));
        }
    }

    #[test]
    fn test_seeded_fields_match() {
        let a = small_field(10, 42);
        let b = small_field(10, 42);
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn test_advance_moves_by_speed_and_sway() {
        let mut field = small_field(5, 3);
        let before: Vec<Particle> = field.particles().to_vec();
        field.advance();

        for (old, new) in before.iter().zip(field.particles()) {
            let (ox, oy) = old.position();
            let (nx, ny) = new.position();
            if ny == RESPAWN_Y {
                continue;
            }
            let expected_y = oy + old.vertical_speed();
            let expected_x = ox
                + (expected_y * SWAY_FREQUENCY).sin() * field.sway_amplitude()
                + old.horizontal_drift();
            assert!((ny - expected_y).abs() < 1e-4);
            assert!((nx - expected_x).abs() < 1e-4);
        }
    }

    #[test]
    fn test_collapsed_bounds_sample_min() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(Bounds::new(0.3, 0.3).sample(&mut rng), 0.3);
        assert_eq!(Bounds::new(0.0, 0.0).sample(&mut rng), 0.0);
    }

    #[test]
    fn test_zero_count_is_noop() {
        let mut field = small_field(0, 1);
        assert!(field.is_empty());
        assert_eq!(field.advance(), 0);
        let mut calls = 0;
        field.for_each(|_| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let vp = Viewport::new(100.0, 100.0);

        let mut config = FieldConfig::embers(vp);
        config.count = MAX_PARTICLES + 1;
        assert!(matches!(
            ParticleField::seeded(&config, 0),
            Err(CoreError::InvalidArgument { name: "count", .. })
        ));

        let mut config = FieldConfig::embers(vp);
        config.speed = Bounds::new(1.0, 0.5);
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidArgument { name: "speed", .. })
        ));

        let mut config = FieldConfig::embers(vp);
        config.speed = Bounds::new(-2.0, -1.0);
        assert!(matches!(
            ParticleField::seeded(&config, 0),
            Err(CoreError::InvalidArgument { name: "speed", .. })
        ));

        let mut config = FieldConfig::embers(vp);
        config.opacity = Bounds::new(0.5, 1.5);
        assert!(config.validate().is_err());

        let mut config = FieldConfig::embers(vp);
        config.radius = Bounds::new(-1.0, 1.0);
        assert!(config.validate().is_err());

        let mut config = FieldConfig::embers(Viewport::new(-1.0, 10.0));
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidArgument {
                name: "viewport.width",
                ..
            })
        ));
        config.viewport = Viewport::new(10.0, f32::NAN);
        assert!(config.validate().is_err());

        let mut config = FieldConfig::embers(vp);
        config.drift = Bounds::new(f32::NEG_INFINITY, 0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resize_sanitizes() {
        let mut field = small_field(3, 9);
        field.resize(-5.0, f32::INFINITY);
        assert_eq!(field.viewport(), Viewport::new(0.0, 0.0));
        field.resize(640.0, 480.0);
        assert_eq!(field.viewport(), Viewport::new(640.0, 480.0));
    }
}
