//! Core engines for the ember fest display.
//!
//! Two independent leaf components live here: a [`CountdownClock`] ticking
//! toward a fixed instant on a host-provided timer, and a [`ParticleField`]
//! of falling embers advanced once per host frame. A [`SparkTrail`] adds the
//! pointer-following sparks. None of them draw anything; hosts read
//! snapshots and views and paint them however they like.

mod countdown;
mod error;
mod frame;
mod host;
mod particles;
mod sparks;

pub use countdown::{CountdownClock, DEFAULT_TICK_PERIOD, Remaining};
pub use error::{CoreError, Result};
pub use frame::{FrameFlow, FrameLoop};
pub use host::{
    Interval, ManualInterval, ManualTimer, SystemTime, ThreadInterval, ThreadTimer, TickFlow,
    TickFn, TimeSource, TimerHost,
};
pub use particles::{
    Bounds, FieldConfig, MAX_PARTICLES, Particle, ParticleField, ParticleView, RESPAWN_Y,
    SWAY_FREQUENCY, Viewport,
};
pub use sparks::{SparkConfig, SparkTrail, SparkView};
