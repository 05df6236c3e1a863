//! Event sink system for observability.
//!
//! The harness reports flow lifecycle transitions to an [`EventSink`]. A
//! process-wide sink can be installed with [`set_event_sink`]; harnesses
//! created or restored afterwards pick it up.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

use parking_lot::RwLock;
use std::sync::Arc;

/// Lifecycle event types.
pub mod types {
    /// A flow was started.
    pub const FLOW_STARTED: &str = "flow.started";
    /// A flow suspended for input.
    pub const FLOW_SUSPENDED: &str = "flow.suspended";
    /// A suspended flow received its answer.
    pub const FLOW_RESUMED: &str = "flow.resumed";
    /// A flow completed.
    pub const FLOW_COMPLETED: &str = "flow.completed";
    /// A flow was cancelled.
    pub const FLOW_CANCELLED: &str = "flow.cancelled";
    /// A flow failed.
    pub const FLOW_FAILED: &str = "flow.failed";
    /// A harness discarded its flow.
    pub const FLOW_RESET: &str = "flow.reset";
    /// An idle session was dropped.
    pub const SESSION_EXPIRED: &str = "session.expired";
}

static GLOBAL_EVENT_SINK: RwLock<Option<Arc<dyn EventSink>>> = RwLock::new(None);

/// Sets the current global event sink.
pub fn set_event_sink(sink: Arc<dyn EventSink>) {
    *GLOBAL_EVENT_SINK.write() = Some(sink);
}

/// Clears the current global event sink.
pub fn clear_event_sink() {
    *GLOBAL_EVENT_SINK.write() = None;
}

/// Gets the current global event sink.
///
/// Returns a `NoOpEventSink` if no sink is set.
pub fn get_event_sink() -> Arc<dyn EventSink> {
    GLOBAL_EVENT_SINK
        .read()
        .clone()
        .unwrap_or_else(|| Arc::new(NoOpEventSink))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_sink_round_trip() {
        let sink = Arc::new(CollectingEventSink::new());
        set_event_sink(sink.clone());
        get_event_sink().try_emit(types::FLOW_STARTED, None);
        clear_event_sink();
        get_event_sink().try_emit(types::FLOW_STARTED, None);

        assert!(!sink.events_of_type(types::FLOW_STARTED).is_empty());
    }
}
