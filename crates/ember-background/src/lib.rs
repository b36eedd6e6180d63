//! Terminal rendering for the ember display.
//!
//! Particles and sparks live in a sub-cell coordinate space (see
//! [`CELL_WIDTH`] and [`CELL_HEIGHT`]) and are plotted into an
//! [`EmberCanvas`] each frame, then painted as styled spans.

mod canvas;
mod chars;
mod color;
mod state;

pub use canvas::{CELL_HEIGHT, CELL_WIDTH, EmberCanvas, cell_at, cell_centre, viewport_for};
pub use color::{BACKDROP, EMBER_GOLD, SPARK_GOLD, backdrop, blend};
pub use state::BackgroundState;
