//! Floor canvas rendering and terminal frame output.

mod canvas;
mod core;
mod terminal;

pub use self::canvas::{BLANK, Canvas, GRID_DOT};
pub use self::core::{GridRenderer, PlacedEquipment, Placement, RenderOptions, RenderedFloor};
pub use self::terminal::{FramePresenter, PresenterSettings};
