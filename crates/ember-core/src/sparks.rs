//! Short-lived sparks trailing the pointer.

use std::collections::VecDeque;
use std::f32::consts::TAU;
use std::time::{Duration, Instant};

use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{CoreError, Result};

/// Tunables for a [`SparkTrail`].
#[derive(Debug, Clone, PartialEq)]
pub struct SparkConfig {
    /// Maximum live sparks; the oldest slot is reused when full.
    pub capacity: usize,
    /// Minimum gap between two emissions.
    pub throttle: Duration,
    /// How long a spark lives.
    pub lifetime: Duration,
    /// Distance a spark drifts outward over its lifetime.
    pub travel: f32,
}

impl Default for SparkConfig {
    fn default() -> Self {
        Self {
            capacity: 16,
            throttle: Duration::from_millis(50),
            lifetime: Duration::from_millis(600),
            travel: 20.0,
        }
    }
}

impl SparkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CoreError::invalid("capacity", "must hold at least one spark"));
        }
        if self.lifetime.is_zero() {
            return Err(CoreError::invalid("lifetime", "must be greater than zero"));
        }
        if !self.travel.is_finite() || self.travel < 0.0 {
            return Err(CoreError::invalid("travel", "must be a non-negative number"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Spark {
    x: f32,
    y: f32,
    angle: f32,
    born: Instant,
}

/// Spark as seen by a renderer at a given instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparkView {
    pub x: f32,
    pub y: f32,
    /// Fades from 1 to 0 over the spark's life.
    pub opacity: f32,
    /// Shrinks from 1 to 0 over the spark's life.
    pub scale: f32,
}

/// Bounded trail of sparks emitted at pointer positions.
#[derive(Debug, Clone)]
pub struct SparkTrail<R = StdRng> {
    config: SparkConfig,
    sparks: VecDeque<Spark>,
    last_emit: Option<Instant>,
    rng: R,
}

impl SparkTrail<StdRng> {
    pub fn new(config: SparkConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_os_rng())
    }
}

impl<R: Rng> SparkTrail<R> {
    pub fn with_rng(config: SparkConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            sparks: VecDeque::with_capacity(config.capacity),
            config,
            last_emit: None,
            rng,
        })
    }

    /// Emit a spark at the pointer unless one was emitted within the throttle
    /// window. Returns whether a spark was emitted.
    pub fn on_pointer_move(&mut self, x: f32, y: f32, now: Instant) -> bool {
        if let Some(last) = self.last_emit
            && now.saturating_duration_since(last) <= self.config.throttle
        {
            return false;
        }

        if self.sparks.len() == self.config.capacity {
            self.sparks.pop_front();
        }
        self.sparks.push_back(Spark {
            x,
            y,
            angle: self.rng.random_range(0.0..TAU),
            born: now,
        });
        self.last_emit = Some(now);
        true
    }

    /// Drop sparks whose lifetime has elapsed.
    pub fn prune(&mut self, now: Instant) {
        // Sparks are stored oldest first.
        while let Some(front) = self.sparks.front() {
            if now.saturating_duration_since(front.born) >= self.config.lifetime {
                self.sparks.pop_front();
            } else {
                break;
            }
        }
    }

    /// Call `draw` for every live spark as it appears at `now`.
    pub fn for_each<F: FnMut(SparkView)>(&self, now: Instant, mut draw: F) {
        let lifetime = self.config.lifetime.as_secs_f32();
        for spark in &self.sparks {
            let age = now.saturating_duration_since(spark.born).as_secs_f32();
            let t = (age / lifetime).min(1.0);
            if t >= 1.0 {
                continue;
            }
            let reach = self.config.travel * t;
            draw(SparkView {
                x: spark.x + spark.angle.cos() * reach,
                y: spark.y + spark.angle.sin() * reach,
                opacity: 1.0 - t,
                scale: 1.0 - t,
            });
        }
    }

    /// Remove every spark, e.g. when the pointer leaves the surface.
    pub fn clear(&mut self) {
        self.sparks.clear();
        self.last_emit = None;
    }

    pub fn len(&self) -> usize {
        self.sparks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sparks.is_empty()
    }

    pub fn config(&self) -> &SparkConfig {
        &self.config
    }
}
