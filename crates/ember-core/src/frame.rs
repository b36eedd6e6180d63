//! Per-frame driver binding a [`ParticleField`] to a host's redraw loop.

use log::debug;
use rand::Rng;
use rand::rngs::StdRng;

use crate::particles::{ParticleField, ParticleView};

/// Whether the host should keep requesting frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFlow {
    Continue,
    Stopped,
}

/// A mounted particle field, advanced and drawn once per host frame.
///
/// After [`FrameLoop::unmount`] every further [`FrameLoop::frame`] call is a
/// no-op that reports [`FrameFlow::Stopped`]; the field is never touched and
/// the draw callback is never called again.
#[derive(Debug)]
pub struct FrameLoop<R = StdRng> {
    field: Option<ParticleField<R>>,
    frames: u64,
}

impl<R: Rng> FrameLoop<R> {
    pub fn mount(field: ParticleField<R>) -> Self {
        debug!("frame loop mounted with {} particles", field.len());
        Self {
            field: Some(field),
            frames: 0,
        }
    }

    /// Advance the field one step, then hand every particle to `draw`.
    pub fn frame<F: FnMut(ParticleView)>(&mut self, draw: F) -> FrameFlow {
        let Some(field) = self.field.as_mut() else {
            return FrameFlow::Stopped;
        };
        field.advance();
        field.for_each(draw);
        self.frames += 1;
        FrameFlow::Continue
    }

    /// Forward a viewport change to the mounted field.
    pub fn resize(&mut self, width: f32, height: f32) {
        if let Some(field) = self.field.as_mut() {
            field.resize(width, height);
        }
    }

    /// Stop the loop and hand back the field, if still mounted.
    pub fn unmount(&mut self) -> Option<ParticleField<R>> {
        let field = self.field.take();
        if field.is_some() {
            debug!("frame loop unmounted after {} frames", self.frames);
        }
        field
    }

    pub fn is_mounted(&self) -> bool {
        self.field.is_some()
    }

    /// Frames drawn since mounting.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn field(&self) -> Option<&ParticleField<R>> {
        self.field.as_ref()
    }
}
