//! Continuous floor coordinates → discrete canvas cells.

mod core;

pub use self::core::{CoordinateProjector, MIN_CANVAS_CELLS, Projection};
