//! Security event types
//!
//! This module defines the structured security events emitted by the
//! authorization and quota layers, consumed by the external observability
//! collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A structured security event.
///
/// Events are the envelope handed to a [`SecurityEventSink`]; they carry
/// routing metadata and an event-specific context map.
///
/// [`SecurityEventSink`]: crate::sink::SecurityEventSink
///
/// # Examples
///
/// ```
/// use platform_audit::{SecurityEvent, SecurityEventType, Severity};
///
/// let event = SecurityEvent::new(
///     SecurityEventType::AuthBypassAttempt,
///     Severity::Critical,
///     "request with no verifiable credentials in production",
///     "production",
/// )
/// .with_context("path", serde_json::json!("/v1/expenses"));
///
/// assert_eq!(event.severity, Severity::Critical);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// Unique event ID
    pub id: Uuid,

    /// Event classification
    pub event_type: SecurityEventType,

    /// How urgently an operator should care
    pub severity: Severity,

    /// Human-readable description
    pub message: String,

    /// Runtime environment the event was observed in
    pub environment: String,

    /// Timestamp when the event was created
    pub timestamp: DateTime<Utc>,

    /// Event-specific context
    #[serde(default)]
    pub context: HashMap<String, serde_json::Value>,
}

impl SecurityEvent {
    /// Create a new security event.
    ///
    /// # Arguments
    ///
    /// * `event_type` - The event classification
    /// * `severity` - Event severity
    /// * `message` - Human-readable description
    /// * `environment` - Runtime environment label
    pub fn new(
        event_type: SecurityEventType,
        severity: Severity,
        message: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            event_type,
            severity,
            message: message.into(),
            environment: environment.into(),
            timestamp: Utc::now(),
            context: HashMap::new(),
        }
    }

    /// Add a context entry.
    pub fn with_context(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }
}

/// Classification of a security event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventType {
    /// A request reached a protected path with no verifiable credentials
    /// in a production runtime
    AuthBypassAttempt,

    /// Credentials were presented but failed verification
    AuthFailure,

    /// The development-only identity was handed out (non-production)
    DevFallbackUsed,

    /// The quota store was unreachable and the request was denied
    QuotaStoreUnavailable,

    /// A quota denial worth flagging to operators
    QuotaDenied,
}

impl SecurityEventType {
    /// Dotted event-type string used in emitted payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityEventType::AuthBypassAttempt => "auth.bypass_attempt",
            SecurityEventType::AuthFailure => "auth.failure",
            SecurityEventType::DevFallbackUsed => "auth.dev_fallback",
            SecurityEventType::QuotaStoreUnavailable => "quota.store_unavailable",
            SecurityEventType::QuotaDenied => "quota.denied",
        }
    }
}

/// Severity of a security event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational
    Info,

    /// Worth a look
    Warning,

    /// Page someone
    Critical,
}

impl Severity {
    /// Get string representation of the severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = SecurityEvent::new(
            SecurityEventType::AuthBypassAttempt,
            Severity::Critical,
            "no credentials",
            "production",
        )
        .with_context("schemes", serde_json::json!({"bearer": false}));

        assert_eq!(event.event_type, SecurityEventType::AuthBypassAttempt);
        assert_eq!(event.severity, Severity::Critical);
        assert_eq!(event.environment, "production");
        assert!(event.context.contains_key("schemes"));
    }

    #[test]
    fn test_event_serializes_to_structured_json() {
        let event = SecurityEvent::new(
            SecurityEventType::QuotaStoreUnavailable,
            Severity::Warning,
            "store timeout",
            "staging",
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "quota_store_unavailable");
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["environment"], "staging");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn test_event_type_strings() {
        assert_eq!(
            SecurityEventType::AuthBypassAttempt.as_str(),
            "auth.bypass_attempt"
        );
        assert_eq!(
            SecurityEventType::QuotaStoreUnavailable.as_str(),
            "quota.store_unavailable"
        );
    }
}
