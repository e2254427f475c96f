//! # Platform Tenant Management
//!
//! This crate provides multi-tenant account management for the Ledgerline
//! platform, shared across the console, capture, and books handlers.
//!
//! ## Overview
//!
//! The platform-tenant crate handles:
//! - **Tenant records**: The single persisted row per customer account,
//!   including usage counters and the monthly expense window
//! - **Tiers**: Subscription tiers with per-resource limits
//! - **Roles**: Hierarchical roles within a tenant
//!
//! ## Architecture
//!
//! ```text
//! TenantRecord
//!   ├─ Tier (limits: projects / monthly expenses / users)
//!   ├─ SubscriptionStatus
//!   └─ Counters (mutated only by the quota store's atomic operations)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use platform_tenant::{CounterField, TenantRecord, Tier};
//!
//! let record = TenantRecord::new("tn_01h9xp", "Acme Corp");
//! let limits = record.tier.limits();
//! assert_eq!(limits.for_counter(CounterField::Projects), Some(3));
//! assert_eq!(Tier::Enterprise.limits().projects, None); // unlimited
//! ```
//!
//! ## Cross-Crate Integration
//!
//! This crate is designed to work with:
//! - `platform-quota`: Atomic quota enforcement over tenant counters
//! - `platform-auth`: Tenant roles carried in auth contexts

pub mod roles;
pub mod tenant;
pub mod tiers;

// Re-export main types for convenience
pub use roles::TenantRole;
pub use tenant::{month_start, CounterField, SubscriptionStatus, TenantRecord};
pub use tiers::{Tier, TierLimits};
