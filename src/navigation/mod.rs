//! Building → Floor → Room → Equipment drill-down.
//!
//! [`NavigationController::handle`] is a pure transition: it never touches
//! the store, it only hands back the [`FetchRequest`] the caller should run.

mod core;
mod fetch;

pub use self::core::{
    Crumb, FetchDisposition, NavEvent, NavItem, NavLevel, NavNode, NavOutcome,
    NavigationController,
};
pub use fetch::{FetchKind, FetchPayload, FetchRequest, FetchTicket, execute};
