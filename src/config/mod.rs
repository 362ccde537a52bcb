//! Viewer session configuration.
//!
//! [`RenderOptions`] is the only part the core engine reads; the remaining
//! knobs belong to the terminal runtime.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpatialError};
use crate::logging::Logger;
use crate::render::RenderOptions;
use crate::symbols::SymbolRegistry;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub render: RenderOptions,
    /// Interval between synthetic tick events.
    pub tick_interval_ms: u64,
    /// Interval between metrics snapshot emissions. Zero disables snapshots.
    pub metrics_interval_ms: u64,
    pub metrics_target: String,
    /// Maximum rows given to the item list above the floor canvas.
    pub list_rows: u16,
    /// Equipment type → glyph overrides applied on top of the defaults.
    pub symbols: BTreeMap<String, char>,
    #[serde(skip)]
    pub logger: Option<Logger>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            render: RenderOptions::default(),
            tick_interval_ms: 200,
            metrics_interval_ms: 5_000,
            metrics_target: "floorgrid::runtime.metrics".to_string(),
            list_rows: 8,
            symbols: BTreeMap::new(),
            logger: None,
        }
    }
}

impl ViewerConfig {
    /// Parse and validate a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_render(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_metrics_interval(mut self, interval: Duration) -> Self {
        self.metrics_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_metrics_target(mut self, target: impl Into<String>) -> Self {
        self.metrics_target = target.into();
        self
    }

    pub fn with_list_rows(mut self, rows: u16) -> Self {
        self.list_rows = rows;
        self
    }

    pub fn with_symbol(mut self, type_name: impl Into<String>, glyph: char) -> Self {
        self.symbols.insert(type_name.into(), glyph);
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn metrics_interval(&self) -> Duration {
        Duration::from_millis(self.metrics_interval_ms)
    }

    /// Default symbols with this config's overrides applied.
    pub fn symbol_registry(&self) -> SymbolRegistry {
        let mut registry = SymbolRegistry::new();
        for (type_name, glyph) in &self.symbols {
            registry.set_symbol(type_name, *glyph);
        }
        registry
    }

    pub fn validate(&self) -> Result<()> {
        self.render.validate()?;
        if self.tick_interval_ms == 0 {
            return Err(SpatialError::InvalidConfig(
                "tick_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.metrics_target.trim().is_empty() {
            return Err(SpatialError::InvalidConfig(
                "metrics_target must not be empty".to_string(),
            ));
        }
        if let Some(type_name) = self.symbols.keys().find(|key| key.trim().is_empty()) {
            return Err(SpatialError::InvalidConfig(format!(
                "symbol override has an empty type name: {type_name:?}"
            )));
        }
        Ok(())
    }
}
