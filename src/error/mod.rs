mod types;

pub use types::{Result, SpatialError};
