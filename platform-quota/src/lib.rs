//! # Platform Quota Enforcement
//!
//! This crate enforces per-tenant resource quotas for the Ledgerline
//! platform, shared across the console, capture, and books handlers.
//!
//! ## Overview
//!
//! The platform-quota crate handles:
//! - **QuotaStore**: Atomic conditional-increment and conditional-reset
//!   primitives over tenant records; every quota decision and mutation
//!   happens in one indivisible store operation
//! - **QuotaEnforcer**: Tier-aware consume/release over those primitives,
//!   including the monthly expense window roll-over
//!
//! ## The one rule
//!
//! No caller ever reads a counter and later writes based on that read.
//! The store evaluates each precondition and applies the mutation inside
//! a single atomic boundary, which makes the counter history linear per
//! tenant: under any number of concurrent consumes, a counter never
//! exceeds its tier limit.
//!
//! ## Control Flow
//!
//! ```text
//! try_consume(tenant, kind)
//!   ├─ load record (tier lookup only)
//!   ├─ unlimited tier         → allow, no counter write
//!   ├─ projects / users       → one conditional increment
//!   └─ expenses (windowed)    → increment guarded on a fresh window
//!         └─ stale window     → conditional reset (counter = 1)
//!               └─ lost race  → retry increment exactly once
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use platform_audit::TracingSink;
//! use platform_quota::{MemoryQuotaStore, QuotaEnforcer, ResourceKind};
//! use platform_tenant::TenantRecord;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let enforcer = QuotaEnforcer::new(
//!     Arc::new(MemoryQuotaStore::new()),
//!     Arc::new(TracingSink::new()),
//!     "staging",
//! );
//!
//! enforcer
//!     .onboard_tenant(TenantRecord::new("tn_acme", "Acme Corp"))
//!     .await
//!     .unwrap();
//!
//! let decision = enforcer
//!     .try_consume("tn_acme", ResourceKind::Project)
//!     .await
//!     .unwrap();
//! assert!(decision.allowed);
//! # });
//! ```
//!
//! ## Features
//!
//! - `memory` (default): In-memory store for single-process deployments
//!   and tests
//! - `redis`: Distributed store backed by server-side Lua scripts
//!
//! ## Cross-Crate Integration
//!
//! This crate integrates with:
//! - `platform-tenant`: Tenant records, tiers, counter fields
//! - `platform-audit`: Store-incident events

pub mod enforcer;
pub mod error;
pub mod memory;
pub mod store;

#[cfg(feature = "redis")]
pub mod redis_store;

// Re-export main types
pub use enforcer::{DenialReason, QuotaDecision, QuotaEnforcer, ResourceKind};
pub use error::{QuotaError, QuotaResult, StoreError, StoreResult};
pub use memory::MemoryQuotaStore;
pub use store::{ConditionalOutcome, IncrementGuard, QuotaStore};

#[cfg(feature = "redis")]
pub use redis_store::{RedisQuotaStore, RedisQuotaStoreConfig};
