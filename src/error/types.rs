use thiserror::Error;

/// Unified result type for the floorgrid crate.
pub type Result<T> = std::result::Result<T, SpatialError>;

/// Errors surfaced by the spatial query and rendering engine.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("{kind} `{id}` not found")]
    NotFound { kind: &'static str, id: String },
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("data unavailable: {0}")]
    DataUnavailable(String),
    #[error("terminal backend error: {0}")]
    Terminal(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl SpatialError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// True for failures the controller keeps on screen next to the last good view.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::DataUnavailable(_))
    }
}
