//! Spatial query and terminal floor-plan rendering for building equipment.
//!
//! Equipment positions come from a [`SpatialRepository`], are filtered by the
//! [`SpatialQueryEngine`], projected onto a character grid by the
//! [`CoordinateProjector`] and painted by the [`GridRenderer`]. The
//! [`NavigationController`] drives Building → Floor → Room → Equipment
//! drill-down and the [`ViewerRuntime`] wires it to a terminal.

pub mod config;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod navigation;
pub mod projection;
pub mod query;
pub mod render;
pub mod repository;
pub mod runtime;
pub mod service;
pub mod symbols;
pub mod width;

pub use config::ViewerConfig;
pub use error::{Result, SpatialError};
pub use geometry::{BoundingBox, Point2D, Point3D, Size};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink, NullSink,
};
pub use metrics::{MetricSnapshot, SessionMetrics};
pub use model::{
    Building, Equipment, EquipmentStatus, Floor, FloorConfidence, FloorSpatialData,
    PositionConfidence, Room, ScanRegion, coverage_ratio,
};
pub use navigation::{
    Crumb, FetchDisposition, FetchKind, FetchPayload, FetchRequest, FetchTicket, NavEvent,
    NavItem, NavLevel, NavNode, NavOutcome, NavigationController,
};
pub use projection::{CoordinateProjector, Projection};
pub use query::{DistanceMode, SpatialQuery, SpatialQueryEngine};
pub use render::{
    Canvas, FramePresenter, GridRenderer, PlacedEquipment, Placement, PresenterSettings,
    RenderOptions, RenderedFloor,
};
pub use repository::{
    BuildingSnapshot, InMemoryRepository, JsonFileRepository, RepositorySnapshot,
    SpatialRepository,
};
pub use runtime::driver::cli::{
    CliDriver, CliDriverError, DriverResult, MIN_SCREEN, checked_screen,
};
pub use runtime::{RuntimeEvent, ViewerCommand, ViewerRuntime};
pub use service::render_floor;
pub use symbols::SymbolRegistry;
pub use width::display_width;
