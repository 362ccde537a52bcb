use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

/// Counters accumulated over one viewer session.
#[derive(Debug, Default, Clone)]
pub struct SessionMetrics {
    events: u64,
    fetches_issued: u64,
    fetches_applied: u64,
    fetches_discarded: u64,
    fetches_failed: u64,
    renders: u64,
    frames_skipped: u64,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event(&mut self) {
        self.events = self.events.saturating_add(1);
    }

    pub fn record_fetch_issued(&mut self) {
        self.fetches_issued = self.fetches_issued.saturating_add(1);
    }

    pub fn record_fetch_applied(&mut self) {
        self.fetches_applied = self.fetches_applied.saturating_add(1);
    }

    pub fn record_fetch_discarded(&mut self) {
        self.fetches_discarded = self.fetches_discarded.saturating_add(1);
    }

    pub fn record_fetch_failed(&mut self) {
        self.fetches_failed = self.fetches_failed.saturating_add(1);
    }

    /// `written` is false when the presenter skipped an identical frame.
    pub fn record_render(&mut self, written: bool) {
        self.renders = self.renders.saturating_add(1);
        if !written {
            self.frames_skipped = self.frames_skipped.saturating_add(1);
        }
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            events: self.events,
            fetches_issued: self.fetches_issued,
            fetches_applied: self.fetches_applied,
            fetches_discarded: self.fetches_discarded,
            fetches_failed: self.fetches_failed,
            renders: self.renders,
            frames_skipped: self.frames_skipped,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub events: u64,
    pub fetches_issued: u64,
    pub fetches_applied: u64,
    pub fetches_discarded: u64,
    pub fetches_failed: u64,
    pub renders: u64,
    pub frames_skipped: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "session_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("events".to_string(), json!(self.events));
        map.insert("fetches_issued".to_string(), json!(self.fetches_issued));
        map.insert("fetches_applied".to_string(), json!(self.fetches_applied));
        map.insert(
            "fetches_discarded".to_string(),
            json!(self.fetches_discarded),
        );
        map.insert("fetches_failed".to_string(), json!(self.fetches_failed));
        map.insert("renders".to_string(), json!(self.renders));
        map.insert("frames_skipped".to_string(), json!(self.frames_skipped));
        map
    }
}
