//! # Platform Security Audit Events
//!
//! This crate provides structured security event emission for the
//! Ledgerline platform, shared across the console, capture, and books
//! handlers.
//!
//! ## Overview
//!
//! The platform-audit crate handles:
//! - **Events**: The structured envelope for authorization failures,
//!   bypass attempts, and quota-store incidents
//! - **Sinks**: Synchronous, best-effort destinations; a sink can never
//!   fail or block the request that triggered the event
//!
//! ## Usage
//!
//! ```rust
//! use platform_audit::{MemorySink, SecurityEvent, SecurityEventSink, SecurityEventType, Severity};
//!
//! let sink = MemorySink::new();
//! sink.emit(SecurityEvent::new(
//!     SecurityEventType::AuthFailure,
//!     Severity::Warning,
//!     "bearer token failed signature verification",
//!     "staging",
//! ));
//!
//! assert_eq!(sink.count_for_severity(Severity::Warning), 1);
//! ```
//!
//! ## Cross-Crate Integration
//!
//! This crate is consumed by:
//! - `platform-auth`: Bypass-attempt and dev-fallback events
//! - `platform-quota`: Store-unavailability events

pub mod events;
pub mod sink;

// Re-export main types for convenience
pub use events::{SecurityEvent, SecurityEventType, Severity};
pub use sink::{MemorySink, NullSink, SecurityEventSink, TracingSink};
