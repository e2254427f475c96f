//! Quota store abstraction
//!
//! This module defines the conditional-write primitives every quota
//! decision goes through. The store evaluates each precondition and
//! applies the matching mutation in one indivisible operation; no caller
//! ever reads a counter and later writes based on that read, which is
//! what eliminates the check-then-increment race entirely.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use platform_tenant::{CounterField, SubscriptionStatus, TenantRecord, Tier};

use crate::error::StoreResult;

/// Additional precondition for a conditional increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementGuard {
    /// The stored expense window must start at or after the given instant
    /// (i.e. the window is current, not a leftover from a previous month).
    WindowAtOrAfter(DateTime<Utc>),
}

/// Outcome of a conditional store operation.
///
/// A rejection carries the counter value and expense-window start the
/// store observed while evaluating the failed condition, taken from the
/// rejected write itself rather than a separate read. By the time a
/// caller reports it, the value may already be stale; that is a
/// documented relaxation for diagnostics, never an input to a quota
/// decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalOutcome {
    /// The precondition held and the mutation was applied.
    Applied {
        /// Counter value after the mutation
        new_value: u32,
    },

    /// The precondition failed and the record was left untouched.
    Rejected {
        /// Counter value observed by the failed conditional write
        current: u32,

        /// Expense-window start observed by the failed conditional write
        window_start: Option<DateTime<Utc>>,
    },
}

impl ConditionalOutcome {
    /// Whether the mutation was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, ConditionalOutcome::Applied { .. })
    }
}

/// Atomic conditional-write store for tenant records.
///
/// Implementations must evaluate every precondition and apply the
/// mutation inside a single atomic boundary (a lock critical section, a
/// server-side script, a native conditional write). Counter mutations
/// outside these operations are not allowed.
#[async_trait]
pub trait QuotaStore: Send + Sync {
    /// Read a tenant record.
    ///
    /// Used for tier/status lookup and diagnostics only, never as the
    /// basis for a counter write.
    async fn load(&self, tenant_id: &str) -> StoreResult<Option<TenantRecord>>;

    /// Create a tenant record, failing if one already exists.
    async fn create(&self, record: TenantRecord) -> StoreResult<()>;

    /// Atomically add `delta` to a counter iff the result stays within
    /// `max` (when finite) and `guard` (when given) holds.
    ///
    /// On rejection the record is left untouched and the outcome carries
    /// the observed counter and window values.
    async fn conditional_increment(
        &self,
        tenant_id: &str,
        field: CounterField,
        delta: u32,
        max: Option<u32>,
        guard: Option<IncrementGuard>,
    ) -> StoreResult<ConditionalOutcome>;

    /// Atomically set a counter to `new_value` and the expense window to
    /// `window_start`, iff the stored window is stale (unset, or
    /// strictly before `stale_before`).
    ///
    /// Exactly one of any number of concurrent callers can win this
    /// operation for a given window roll-over; the rest are rejected.
    async fn conditional_reset(
        &self,
        tenant_id: &str,
        field: CounterField,
        new_value: u32,
        window_start: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> StoreResult<ConditionalOutcome>;

    /// Atomically subtract `delta` from a counter, clamping at zero.
    ///
    /// Returns the new counter value.
    async fn decrement_clamped(
        &self,
        tenant_id: &str,
        field: CounterField,
        delta: u32,
    ) -> StoreResult<u32>;

    /// Admin operation: change the tenant's tier.
    async fn update_tier(&self, tenant_id: &str, tier: Tier) -> StoreResult<()>;

    /// Admin operation: change the tenant's subscription status.
    async fn update_status(&self, tenant_id: &str, status: SubscriptionStatus) -> StoreResult<()>;
}
