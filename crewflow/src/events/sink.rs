//! Event sink trait and implementations.

use crate::core::StageEvent;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, Level};

/// Trait for event sinks that can receive events.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Emits an event asynchronously.
    async fn emit(&self, event: &StageEvent);

    /// Emits an event without awaiting.
    ///
    /// Must never panic. Errors are logged and suppressed.
    fn try_emit(&self, event: &StageEvent);
}

/// A no-op event sink that discards all events.
///
/// Used as the default when no sink is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: &StageEvent) {}

    fn try_emit(&self, _event: &StageEvent) {}
}

/// An event sink that logs events using the tracing framework.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingEventSink {
    /// Creates a new logging event sink with the specified level.
    #[must_use]
    pub const fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub const fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    /// Creates an info-level logging sink.
    #[must_use]
    pub const fn info() -> Self {
        Self::new(Level::INFO)
    }

    fn log_event(&self, event: &StageEvent) {
        let run_id = event.data_str("run_id").unwrap_or("-");
        let stage = event.data_str("stage").unwrap_or("-");
        if self.level == Level::DEBUG {
            debug!(
                event_type = %event.event_type,
                run_id = %run_id,
                stage = %stage,
                event_data = ?event.data,
                "Event: {}", event.event_type
            );
        } else {
            info!(
                event_type = %event.event_type,
                run_id = %run_id,
                stage = %stage,
                event_data = ?event.data,
                "Event: {}", event.event_type
            );
        }
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event: &StageEvent) {
        self.log_event(event);
    }

    fn try_emit(&self, event: &StageEvent) {
        self.log_event(event);
    }
}

/// A sink that keeps every event in memory, optionally passing each one
/// on to a downstream sink.
///
/// Used by tests and by the dashboard to show a run's timeline.
#[derive(Default)]
pub struct CollectingEventSink {
    events: parking_lot::RwLock<Vec<StageEvent>>,
    downstream: Option<Arc<dyn EventSink>>,
}

impl std::fmt::Debug for CollectingEventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectingEventSink")
            .field("events", &self.len())
            .field("forwarding", &self.downstream.is_some())
            .finish()
    }
}

impl CollectingEventSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that collects and also forwards to `downstream`.
    #[must_use]
    pub fn forwarding_to(downstream: Arc<dyn EventSink>) -> Self {
        Self {
            events: parking_lot::RwLock::default(),
            downstream: Some(downstream),
        }
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<StageEvent> {
        self.events.read().clone()
    }

    /// Returns the collected event types, in order.
    #[must_use]
    pub fn event_types(&self) -> Vec<String> {
        self.events
            .read()
            .iter()
            .map(|event| event.event_type.clone())
            .collect()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Returns events matching a type prefix.
    #[must_use]
    pub fn events_of_type(&self, type_prefix: &str) -> Vec<StageEvent> {
        self.events
            .read()
            .iter()
            .filter(|event| event.event_type.starts_with(type_prefix))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event: &StageEvent) {
        self.events.write().push(event.clone());
        if let Some(downstream) = &self.downstream {
            downstream.emit(event).await;
        }
    }

    fn try_emit(&self, event: &StageEvent) {
        self.events.write().push(event.clone());
        if let Some(downstream) = &self.downstream {
            downstream.try_emit(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_and_logging_sinks_accept_events() {
        let event = StageEvent::started("run", "research");
        NoOpEventSink.emit(&event).await;
        LoggingEventSink::debug().emit(&event).await;
        LoggingEventSink::info().try_emit(&event);
    }

    #[tokio::test]
    async fn test_collecting_sink_keeps_order() {
        let sink = CollectingEventSink::new();
        assert!(sink.is_empty());

        sink.emit(&StageEvent::started("r", "research")).await;
        sink.try_emit(&StageEvent::completed("r", "research", 1.0));

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.event_types(), vec!["stage.started", "stage.completed"]);
    }

    #[tokio::test]
    async fn test_collecting_sink_filter_and_clear() {
        let sink = CollectingEventSink::new();
        sink.emit(&StageEvent::started("r", "a")).await;
        sink.emit(&StageEvent::completed("r", "a", 1.0)).await;
        sink.emit(&StageEvent::tool_invoked("r", "a", "web_search", true)).await;

        assert_eq!(sink.events_of_type("stage.").len(), 2);
        assert_eq!(sink.events_of_type("tool.").len(), 1);

        sink.clear();
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_collecting_sink_forwards_downstream() {
        let downstream = Arc::new(CollectingEventSink::new());
        let sink = CollectingEventSink::forwarding_to(downstream.clone());

        sink.emit(&StageEvent::started("r", "research")).await;
        sink.try_emit(&StageEvent::completed("r", "research", 1.0));

        assert_eq!(sink.event_types(), downstream.event_types());
        assert_eq!(downstream.len(), 2);
    }
}
