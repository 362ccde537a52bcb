//! Equipment type → glyph resolution.

mod core;

pub use self::core::{SymbolRegistry, UNKNOWN_GLYPH, fallback_glyph};
