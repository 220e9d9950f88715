//! Analytics event model and delivery to an opaque sink.
//!
//! Delivery never fails from the caller's point of view: without a sink,
//! events wait in a bounded queue; sink errors and panics are logged and the
//! event is dropped.

use std::collections::VecDeque;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};

use page_logging::{page_debug, page_error, page_info, page_warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_DEFERRED_LIMIT: usize = 100;

/// Event name plus a flat key/value payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub name: String,
    pub params: Map<String, Value>,
}

impl AnalyticsEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Map::new(),
        }
    }

    /// Adds `event_category: engagement` and `event_label`, the shape every
    /// page event shares.
    pub fn engagement(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name)
            .with("event_category", "engagement")
            .with("event_label", label.into())
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("analytics sink unavailable: {0}")]
    Unavailable(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub trait AnalyticsSink {
    fn send(&mut self, event: &AnalyticsEvent) -> Result<(), SinkError>;
}

/// Writes events through the logging macros.
#[derive(Debug, Default)]
pub struct LogSink;

impl AnalyticsSink for LogSink {
    fn send(&mut self, event: &AnalyticsEvent) -> Result<(), SinkError> {
        let payload = serde_json::to_string(&event.params)?;
        page_info!("analytics {} {}", event.name, payload);
        Ok(())
    }
}

/// Writes one JSON object per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> AnalyticsSink for JsonLinesSink<W> {
    fn send(&mut self, event: &AnalyticsEvent) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Event names per tracked interaction. Deployments disagree on these
/// (`cta_click` versus `hero_cta_click`), so they are configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsNames {
    pub cta_click: String,
    pub section_view: String,
    pub project_interaction: String,
    pub project_view: String,
    pub skill_interaction: String,
    pub stat_view: String,
    pub scroll_depth: String,
    pub time_on_page: String,
    pub page_exit: String,
}

impl Default for AnalyticsNames {
    fn default() -> Self {
        Self {
            cta_click: "cta_click".to_string(),
            section_view: "section_view".to_string(),
            project_interaction: "project_interaction".to_string(),
            project_view: "project_view".to_string(),
            skill_interaction: "skill_interaction".to_string(),
            stat_view: "stat_view".to_string(),
            scroll_depth: "scroll_depth".to_string(),
            time_on_page: "time_on_page".to_string(),
            page_exit: "page_exit".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryStats {
    pub delivered: u64,
    pub dropped: u64,
    pub deferred: usize,
}

pub struct AnalyticsDispatcher {
    sink: Option<Box<dyn AnalyticsSink>>,
    deferred: VecDeque<AnalyticsEvent>,
    deferred_limit: usize,
    delivered: u64,
    dropped: u64,
}

impl Default for AnalyticsDispatcher {
    fn default() -> Self {
        Self::new(None, DEFAULT_DEFERRED_LIMIT)
    }
}

impl AnalyticsDispatcher {
    pub fn new(sink: Option<Box<dyn AnalyticsSink>>, deferred_limit: usize) -> Self {
        Self {
            sink,
            deferred: VecDeque::new(),
            deferred_limit,
            delivered: 0,
            dropped: 0,
        }
    }

    pub fn with_sink(sink: Box<dyn AnalyticsSink>) -> Self {
        Self::new(Some(sink), DEFAULT_DEFERRED_LIMIT)
    }

    pub fn track(&mut self, event: AnalyticsEvent) {
        if self.sink.is_none() {
            self.defer(event);
            return;
        }
        self.deliver(event);
    }

    /// Installs the sink and flushes everything deferred so far, oldest first.
    pub fn attach(&mut self, sink: Box<dyn AnalyticsSink>) {
        self.sink = Some(sink);
        let pending: Vec<AnalyticsEvent> = self.deferred.drain(..).collect();
        if !pending.is_empty() {
            page_info!("Flushing {} deferred analytics events", pending.len());
        }
        for event in pending {
            self.deliver(event);
        }
    }

    pub fn detach(&mut self) -> Option<Box<dyn AnalyticsSink>> {
        self.sink.take()
    }

    pub fn stats(&self) -> DeliveryStats {
        DeliveryStats {
            delivered: self.delivered,
            dropped: self.dropped,
            deferred: self.deferred.len(),
        }
    }

    fn defer(&mut self, event: AnalyticsEvent) {
        if self.deferred_limit == 0 {
            self.dropped += 1;
            return;
        }
        if self.deferred.len() >= self.deferred_limit {
            self.deferred.pop_front();
            self.dropped += 1;
        }
        page_debug!("Deferring analytics event {}", event.name);
        self.deferred.push_back(event);
    }

    fn deliver(&mut self, event: AnalyticsEvent) {
        let Some(sink) = self.sink.as_mut() else {
            self.defer(event);
            return;
        };
        match panic::catch_unwind(AssertUnwindSafe(|| sink.send(&event))) {
            Ok(Ok(())) => self.delivered += 1,
            Ok(Err(err)) => {
                page_warn!("Analytics event {} dropped: {}", event.name, err);
                self.dropped += 1;
            }
            Err(_) => {
                page_error!("Analytics sink panicked on {}; event dropped", event.name);
                self.dropped += 1;
            }
        }
    }
}
