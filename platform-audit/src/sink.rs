//! Security event sinks
//!
//! This module provides the sink abstraction the authorization and quota
//! layers emit through, and the built-in implementations.
//!
//! Emission is synchronous and best-effort: a sink must never block the
//! request that triggered the event, and a failure to emit must never fail
//! that request. The trait signature is infallible to make that contract
//! impossible to get wrong at a call site.

use std::sync::Mutex;

use crate::events::{SecurityEvent, Severity};

/// Destination for security events.
///
/// Implementations forward events to the external observability
/// collaborator (log pipeline, SIEM, alerting).
pub trait SecurityEventSink: Send + Sync {
    /// Emit an event. Synchronous, best-effort; must not panic or block.
    fn emit(&self, event: SecurityEvent);
}

/// Sink that writes events as structured log lines via `tracing`.
///
/// This is the production default: the surrounding log pipeline ships the
/// JSON lines to the observability collaborator.
#[derive(Debug, Default, Clone)]
pub struct TracingSink;

impl TracingSink {
    /// Create a new tracing sink.
    pub fn new() -> Self {
        Self
    }
}

impl SecurityEventSink for TracingSink {
    fn emit(&self, event: SecurityEvent) {
        // Serialization of a SecurityEvent cannot fail in practice; the
        // fallback keeps the best-effort contract honest.
        let context = serde_json::to_string(&event.context).unwrap_or_else(|_| "{}".to_string());

        match event.severity {
            Severity::Critical => tracing::error!(
                event_id = %event.id,
                event_type = event.event_type.as_str(),
                severity = event.severity.as_str(),
                environment = %event.environment,
                context = %context,
                "{}",
                event.message
            ),
            Severity::Warning => tracing::warn!(
                event_id = %event.id,
                event_type = event.event_type.as_str(),
                severity = event.severity.as_str(),
                environment = %event.environment,
                context = %context,
                "{}",
                event.message
            ),
            Severity::Info => tracing::info!(
                event_id = %event.id,
                event_type = event.event_type.as_str(),
                severity = event.severity.as_str(),
                environment = %event.environment,
                context = %context,
                "{}",
                event.message
            ),
        }
    }
}

/// In-memory sink that buffers events.
///
/// Suitable for tests and single-process inspection; not a durable
/// destination.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<SecurityEvent>>,
}

impl MemorySink {
    /// Create a new empty memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All events emitted so far, in order.
    pub fn events(&self) -> Vec<SecurityEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Number of events emitted so far.
    pub fn len(&self) -> usize {
        self.events.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Whether no events have been emitted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of events at exactly the given severity.
    pub fn count_for_severity(&self, severity: Severity) -> usize {
        self.events()
            .iter()
            .filter(|event| event.severity == severity)
            .count()
    }

    /// Drop all buffered events.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.events.lock() {
            guard.clear();
        }
    }
}

impl SecurityEventSink for MemorySink {
    fn emit(&self, event: SecurityEvent) {
        // A poisoned buffer drops the event rather than poisoning the
        // request path.
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event);
        }
    }
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone)]
pub struct NullSink;

impl NullSink {
    /// Create a new null sink.
    pub fn new() -> Self {
        Self
    }
}

impl SecurityEventSink for NullSink {
    fn emit(&self, _event: SecurityEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SecurityEventType;

    fn sample(severity: Severity) -> SecurityEvent {
        SecurityEvent::new(
            SecurityEventType::AuthFailure,
            severity,
            "test event",
            "test",
        )
    }

    #[test]
    fn test_memory_sink_buffers_in_order() {
        let sink = MemorySink::new();
        sink.emit(sample(Severity::Info));
        sink.emit(sample(Severity::Critical));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].severity, Severity::Info);
        assert_eq!(events[1].severity, Severity::Critical);
    }

    #[test]
    fn test_memory_sink_severity_counts() {
        let sink = MemorySink::new();
        sink.emit(sample(Severity::Warning));
        sink.emit(sample(Severity::Warning));
        sink.emit(sample(Severity::Critical));

        assert_eq!(sink.count_for_severity(Severity::Warning), 2);
        assert_eq!(sink.count_for_severity(Severity::Critical), 1);
        assert_eq!(sink.count_for_severity(Severity::Info), 0);
    }

    #[test]
    fn test_memory_sink_clear() {
        let sink = MemorySink::new();
        sink.emit(sample(Severity::Info));
        assert!(!sink.is_empty());

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_tracing_and_null_sinks_never_fail() {
        TracingSink::new().emit(sample(Severity::Critical));
        NullSink::new().emit(sample(Severity::Info));
    }
}
