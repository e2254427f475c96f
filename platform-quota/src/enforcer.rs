//! Quota enforcement
//!
//! This module answers "may this tenant create one more unit of resource
//! X" and applies the matching counter mutation in the same indivisible
//! store operation. The enforcer never reads a counter and then writes
//! based on that read; the only read it performs is the tier lookup, and
//! tier changes are explicit admin operations.

use std::sync::Arc;

use chrono::Utc;
use platform_audit::{SecurityEvent, SecurityEventSink, SecurityEventType, Severity};
use platform_tenant::{month_start, CounterField, TenantRecord, Tier};
use serde::{Deserialize, Serialize};

use crate::error::{QuotaError, QuotaResult, StoreError};
use crate::store::{ConditionalOutcome, IncrementGuard, QuotaStore};

/// The resource kinds a tenant consumes quota for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// An active project
    Project,

    /// An expense in the current calendar month
    Expense,

    /// A seat
    User,
}

impl ResourceKind {
    /// The tenant counter backing this resource kind.
    pub fn counter_field(&self) -> CounterField {
        match self {
            ResourceKind::Project => CounterField::Projects,
            ResourceKind::Expense => CounterField::MonthlyExpenses,
            ResourceKind::User => CounterField::Users,
        }
    }

    /// The denial reason reported when this kind is over quota.
    pub fn denial_reason(&self) -> DenialReason {
        match self {
            ResourceKind::Project => DenialReason::ProjectLimitReached,
            ResourceKind::Expense => DenialReason::ExpenseLimitReached,
            ResourceKind::User => DenialReason::UserLimitReached,
        }
    }

    /// Get string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Project => "project",
            ResourceKind::Expense => "expense",
            ResourceKind::User => "user",
        }
    }
}

/// Enumerated reason carried in a denial payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialReason {
    /// The tier's active-project limit is reached
    ProjectLimitReached,

    /// The tier's monthly expense limit is reached
    ExpenseLimitReached,

    /// The tier's seat limit is reached
    UserLimitReached,
}

/// Result of a quota check-and-consume.
///
/// Serialized by the outer layer into the structured denial payload; it
/// never carries internal store error detail.
///
/// On a denial, `current_usage` is the counter value the store observed
/// while rejecting the write. Under concurrency it may be stale by the
/// time a client reads it; reporting it without a second read is a
/// deliberate relaxation, since an exact value would require re-reading
/// the counter after the decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotaDecision {
    /// Whether the consume was applied
    pub allowed: bool,

    /// Why the consume was denied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenialReason>,

    /// Best-effort usage at decision time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_usage: Option<u32>,

    /// The tier limit the decision was made against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Smallest tier whose limit would admit the request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_tier: Option<Tier>,
}

impl QuotaDecision {
    /// An allow with the post-increment usage.
    pub fn allowed(current_usage: u32, limit: u32) -> Self {
        Self {
            allowed: true,
            reason: None,
            current_usage: Some(current_usage),
            limit: Some(limit),
            suggested_tier: None,
        }
    }

    /// An allow for an unlimited resource (no counter round trip).
    pub fn allowed_unlimited() -> Self {
        Self {
            allowed: true,
            reason: None,
            current_usage: None,
            limit: None,
            suggested_tier: None,
        }
    }

    /// A denial with full diagnostics.
    pub fn denied(kind: ResourceKind, tier: Tier, current_usage: u32, limit: u32) -> Self {
        Self {
            allowed: false,
            reason: Some(kind.denial_reason()),
            current_usage: Some(current_usage),
            limit: Some(limit),
            suggested_tier: tier.suggested_upgrade(kind.counter_field()),
        }
    }

    /// A denial with no usage diagnostics (store unavailable).
    pub fn denied_unavailable(kind: ResourceKind) -> Self {
        Self {
            allowed: false,
            reason: Some(kind.denial_reason()),
            current_usage: None,
            limit: None,
            suggested_tier: None,
        }
    }
}

/// Enforces per-tenant resource quotas against a [`QuotaStore`].
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use platform_audit::TracingSink;
/// use platform_quota::{MemoryQuotaStore, QuotaEnforcer, ResourceKind};
/// use platform_tenant::TenantRecord;
///
/// # async fn demo() -> Result<(), platform_quota::QuotaError> {
/// let enforcer = QuotaEnforcer::new(
///     Arc::new(MemoryQuotaStore::new()),
///     Arc::new(TracingSink::new()),
///     "staging",
/// );
///
/// enforcer.onboard_tenant(TenantRecord::new("tn_acme", "Acme Corp")).await?;
///
/// let decision = enforcer.try_consume("tn_acme", ResourceKind::Project).await?;
/// assert!(decision.allowed);
/// # Ok(())
/// # }
/// ```
pub struct QuotaEnforcer {
    store: Arc<dyn QuotaStore>,
    sink: Arc<dyn SecurityEventSink>,
    environment: String,
}

impl std::fmt::Debug for QuotaEnforcer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaEnforcer")
            .field("environment", &self.environment)
            .finish()
    }
}

impl QuotaEnforcer {
    /// Create a new enforcer.
    ///
    /// # Arguments
    ///
    /// * `store` - The conditional-write store holding tenant records
    /// * `sink` - Destination for store-incident events
    /// * `environment` - Runtime label carried on emitted events
    pub fn new(
        store: Arc<dyn QuotaStore>,
        sink: Arc<dyn SecurityEventSink>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            store,
            sink,
            environment: environment.into(),
        }
    }

    /// Check and consume one unit of `kind` for a tenant.
    ///
    /// The limit check and the increment happen in one conditional store
    /// operation, so concurrent callers can never push a counter past the
    /// tier limit. Callers that abandon the resource after a successful
    /// consume must call [`release`](Self::release) themselves.
    ///
    /// Store failures (including timeouts) deny the request rather than
    /// optimistically allowing it, and are logged distinctly for
    /// operations.
    pub async fn try_consume(
        &self,
        tenant_id: &str,
        kind: ResourceKind,
    ) -> QuotaResult<QuotaDecision> {
        let record = match self.store.load(tenant_id).await {
            Ok(Some(record)) => record,
            Ok(None) => return Err(QuotaError::UnknownTenant(tenant_id.to_string())),
            Err(err) => return Ok(self.fail_closed(tenant_id, kind, &err)),
        };

        let field = kind.counter_field();
        let limit = match record.tier.limits().for_counter(field) {
            // Unlimited tiers never touch the counter.
            None => return Ok(QuotaDecision::allowed_unlimited()),
            Some(limit) => limit,
        };

        if field.is_windowed() {
            self.consume_windowed(tenant_id, kind, record.tier, limit)
                .await
        } else {
            match self
                .store
                .conditional_increment(tenant_id, field, 1, Some(limit), None)
                .await
            {
                Ok(ConditionalOutcome::Applied { new_value }) => {
                    Ok(QuotaDecision::allowed(new_value, limit))
                }
                Ok(ConditionalOutcome::Rejected { current, .. }) => {
                    Ok(QuotaDecision::denied(kind, record.tier, current, limit))
                }
                Err(err) => Ok(self.fail_closed(tenant_id, kind, &err)),
            }
        }
    }

    /// Consume one unit of the monthly-windowed expense counter.
    ///
    /// "Is the month over" and "increment" cannot be one precondition
    /// without also racing the roll-over itself, so the windowed path is
    /// a two-phase dance: increment against the current window; on a
    /// stale window, try to roll it (counter = 1); if another request
    /// already rolled it, retry the increment exactly once. Only one
    /// contender can win the roll, after which every other contender's
    /// increment runs against the fresh window.
    async fn consume_windowed(
        &self,
        tenant_id: &str,
        kind: ResourceKind,
        tier: Tier,
        limit: u32,
    ) -> QuotaResult<QuotaDecision> {
        let field = kind.counter_field();
        let window = month_start(Utc::now());
        let guard = Some(IncrementGuard::WindowAtOrAfter(window));

        // A zero limit can never admit the reset-to-1 write below.
        if limit == 0 {
            return Ok(QuotaDecision::denied(kind, tier, 0, limit));
        }

        let first = match self
            .store
            .conditional_increment(tenant_id, field, 1, Some(limit), guard)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => return Ok(self.fail_closed(tenant_id, kind, &err)),
        };

        let (current, window_start) = match first {
            ConditionalOutcome::Applied { new_value } => {
                return Ok(QuotaDecision::allowed(new_value, limit))
            }
            ConditionalOutcome::Rejected {
                current,
                window_start,
            } => (current, window_start),
        };

        let window_is_stale = window_start.map(|w| w < window).unwrap_or(true);
        if !window_is_stale {
            // Fresh window: the limit is genuinely reached.
            return Ok(QuotaDecision::denied(kind, tier, current, limit));
        }

        match self
            .store
            .conditional_reset(tenant_id, field, 1, window, window)
            .await
        {
            Ok(ConditionalOutcome::Applied { new_value }) => {
                Ok(QuotaDecision::allowed(new_value, limit))
            }
            // Another request already rolled the window; one retry
            // against the now-fresh window settles the outcome.
            Ok(ConditionalOutcome::Rejected { .. }) => {
                match self
                    .store
                    .conditional_increment(tenant_id, field, 1, Some(limit), guard)
                    .await
                {
                    Ok(ConditionalOutcome::Applied { new_value }) => {
                        Ok(QuotaDecision::allowed(new_value, limit))
                    }
                    Ok(ConditionalOutcome::Rejected { current, .. }) => {
                        Ok(QuotaDecision::denied(kind, tier, current, limit))
                    }
                    Err(err) => Ok(self.fail_closed(tenant_id, kind, &err)),
                }
            }
            Err(err) => Ok(self.fail_closed(tenant_id, kind, &err)),
        }
    }

    /// Release one unit of `kind` for a tenant (resource deleted).
    ///
    /// The decrement clamps at zero. Guarding against double-release is
    /// the caller's resource-lifecycle obligation, not this component's.
    ///
    /// Returns the new counter value.
    pub async fn release(&self, tenant_id: &str, kind: ResourceKind) -> QuotaResult<u32> {
        let new_value = self
            .store
            .decrement_clamped(tenant_id, kind.counter_field(), 1)
            .await?;
        Ok(new_value)
    }

    /// Onboard a tenant: create its record with counters at zero.
    pub async fn onboard_tenant(&self, record: TenantRecord) -> QuotaResult<()> {
        self.store.create(record).await?;
        Ok(())
    }

    /// Admin operation: move a tenant to a different tier.
    pub async fn change_tier(&self, tenant_id: &str, tier: Tier) -> QuotaResult<()> {
        self.store.update_tier(tenant_id, tier).await?;
        Ok(())
    }

    fn fail_closed(
        &self,
        tenant_id: &str,
        kind: ResourceKind,
        err: &StoreError,
    ) -> QuotaDecision {
        tracing::warn!(
            tenant_id = %tenant_id,
            resource = kind.as_str(),
            error = %err,
            "quota store unavailable; denying request"
        );
        self.sink.emit(
            SecurityEvent::new(
                SecurityEventType::QuotaStoreUnavailable,
                Severity::Warning,
                "quota store unavailable; request denied",
                self.environment.clone(),
            )
            .with_context("tenant_id", serde_json::json!(tenant_id))
            .with_context("resource", serde_json::json!(kind.as_str())),
        );
        QuotaDecision::denied_unavailable(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryQuotaStore;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone};
    use platform_audit::MemorySink;
    use platform_tenant::SubscriptionStatus;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn enforcer_with(
        store: Arc<dyn QuotaStore>,
    ) -> (QuotaEnforcer, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (QuotaEnforcer::new(store, sink.clone(), "test"), sink)
    }

    async fn seeded_store(record: TenantRecord) -> Arc<MemoryQuotaStore> {
        let store = Arc::new(MemoryQuotaStore::new());
        store.create(record).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_project_allowed_under_limit() {
        let store = seeded_store(TenantRecord::new("tn_1", "Acme")).await;
        let (enforcer, _sink) = enforcer_with(store);

        let decision = enforcer.try_consume("tn_1", ResourceKind::Project).await.unwrap();

        assert!(decision.allowed);
        assert_eq!(decision.current_usage, Some(1));
        assert_eq!(decision.limit, Some(3));
    }

    #[tokio::test]
    async fn test_trial_project_limit_denial() {
        let mut record = TenantRecord::new("tn_1", "Acme");
        record.current_projects = 3;
        let store = seeded_store(record).await;
        let (enforcer, _sink) = enforcer_with(store);

        let decision = enforcer.try_consume("tn_1", ResourceKind::Project).await.unwrap();

        assert_eq!(
            decision,
            QuotaDecision {
                allowed: false,
                reason: Some(DenialReason::ProjectLimitReached),
                current_usage: Some(3),
                limit: Some(3),
                suggested_tier: Some(Tier::Basic),
            }
        );
    }

    #[tokio::test]
    async fn test_denial_serializes_reason_codes() {
        let mut record = TenantRecord::new("tn_1", "Acme");
        record.current_users = 2;
        let store = seeded_store(record).await;
        let (enforcer, _sink) = enforcer_with(store);

        let decision = enforcer.try_consume("tn_1", ResourceKind::User).await.unwrap();
        let json = serde_json::to_value(&decision).unwrap();

        assert_eq!(json["reason"], "USER_LIMIT_REACHED");
        assert_eq!(json["current_usage"], 2);
        assert_eq!(json["limit"], 2);
        assert_eq!(json["suggested_tier"], "basic");
    }

    /// Store wrapper that counts counter-mutation calls.
    struct CountingStore {
        inner: MemoryQuotaStore,
        increments: AtomicUsize,
    }

    #[async_trait]
    impl QuotaStore for CountingStore {
        async fn load(&self, tenant_id: &str) -> crate::error::StoreResult<Option<TenantRecord>> {
            self.inner.load(tenant_id).await
        }

        async fn create(&self, record: TenantRecord) -> crate::error::StoreResult<()> {
            self.inner.create(record).await
        }

        async fn conditional_increment(
            &self,
            tenant_id: &str,
            field: CounterField,
            delta: u32,
            max: Option<u32>,
            guard: Option<IncrementGuard>,
        ) -> crate::error::StoreResult<ConditionalOutcome> {
            self.increments.fetch_add(1, Ordering::SeqCst);
            self.inner
                .conditional_increment(tenant_id, field, delta, max, guard)
                .await
        }

        async fn conditional_reset(
            &self,
            tenant_id: &str,
            field: CounterField,
            new_value: u32,
            window_start: DateTime<Utc>,
            stale_before: DateTime<Utc>,
        ) -> crate::error::StoreResult<ConditionalOutcome> {
            self.inner
                .conditional_reset(tenant_id, field, new_value, window_start, stale_before)
                .await
        }

        async fn decrement_clamped(
            &self,
            tenant_id: &str,
            field: CounterField,
            delta: u32,
        ) -> crate::error::StoreResult<u32> {
            self.inner.decrement_clamped(tenant_id, field, delta).await
        }

        async fn update_tier(&self, tenant_id: &str, tier: Tier) -> crate::error::StoreResult<()> {
            self.inner.update_tier(tenant_id, tier).await
        }

        async fn update_status(
            &self,
            tenant_id: &str,
            status: SubscriptionStatus,
        ) -> crate::error::StoreResult<()> {
            self.inner.update_status(tenant_id, status).await
        }
    }

    #[tokio::test]
    async fn test_unlimited_tier_skips_counter_write() {
        let mut record = TenantRecord::new("tn_1", "Mega Corp");
        record.tier = Tier::Enterprise;
        record.current_projects = 10_000;

        let store = Arc::new(CountingStore {
            inner: MemoryQuotaStore::new(),
            increments: AtomicUsize::new(0),
        });
        store.create(record).await.unwrap();
        let (enforcer, _sink) = enforcer_with(store.clone());

        let decision = enforcer.try_consume("tn_1", ResourceKind::Project).await.unwrap();

        assert!(decision.allowed);
        assert_eq!(decision.current_usage, None);
        assert_eq!(store.increments.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_expense_first_ever_rolls_window() {
        let store = seeded_store(TenantRecord::new("tn_1", "Acme")).await;
        let (enforcer, _sink) = enforcer_with(store.clone());

        let decision = enforcer.try_consume("tn_1", ResourceKind::Expense).await.unwrap();

        assert!(decision.allowed);
        assert_eq!(decision.current_usage, Some(1));

        let record = store.load("tn_1").await.unwrap().unwrap();
        assert_eq!(record.current_monthly_expenses, 1);
        assert_eq!(record.expense_window_start, Some(month_start(Utc::now())));
    }

    #[tokio::test]
    async fn test_expense_stale_window_resets_to_one() {
        let mut record = TenantRecord::new("tn_1", "Acme");
        // At the limit in a previous month; the new month must reset, not
        // deny.
        record.current_monthly_expenses = 25;
        record.expense_window_start = Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        let store = seeded_store(record).await;
        let (enforcer, _sink) = enforcer_with(store.clone());

        let decision = enforcer.try_consume("tn_1", ResourceKind::Expense).await.unwrap();

        assert!(decision.allowed);
        assert_eq!(decision.current_usage, Some(1));
        assert_eq!(
            store.load("tn_1").await.unwrap().unwrap().current_monthly_expenses,
            1
        );
    }

    #[tokio::test]
    async fn test_expense_fresh_window_at_limit_denies() {
        let mut record = TenantRecord::new("tn_1", "Acme");
        record.current_monthly_expenses = 25;
        record.expense_window_start = Some(month_start(Utc::now()));
        let store = seeded_store(record).await;
        let (enforcer, _sink) = enforcer_with(store);

        let decision = enforcer.try_consume("tn_1", ResourceKind::Expense).await.unwrap();

        assert_eq!(decision.reason, Some(DenialReason::ExpenseLimitReached));
        assert_eq!(decision.current_usage, Some(25));
        assert_eq!(decision.limit, Some(25));
        assert_eq!(decision.suggested_tier, Some(Tier::Basic));
    }

    /// Store that replays scripted outcomes for the windowed two-phase
    /// dance.
    struct ScriptedStore {
        record: TenantRecord,
        increments: Mutex<VecDeque<ConditionalOutcome>>,
        resets: Mutex<VecDeque<ConditionalOutcome>>,
        increment_calls: AtomicUsize,
    }

    impl ScriptedStore {
        fn new(
            record: TenantRecord,
            increments: Vec<ConditionalOutcome>,
            resets: Vec<ConditionalOutcome>,
        ) -> Self {
            Self {
                record,
                increments: Mutex::new(increments.into()),
                resets: Mutex::new(resets.into()),
                increment_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl QuotaStore for ScriptedStore {
        async fn load(&self, _tenant_id: &str) -> crate::error::StoreResult<Option<TenantRecord>> {
            Ok(Some(self.record.clone()))
        }

        async fn create(&self, _record: TenantRecord) -> crate::error::StoreResult<()> {
            unreachable!("not scripted")
        }

        async fn conditional_increment(
            &self,
            _tenant_id: &str,
            _field: CounterField,
            _delta: u32,
            _max: Option<u32>,
            _guard: Option<IncrementGuard>,
        ) -> crate::error::StoreResult<ConditionalOutcome> {
            self.increment_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .increments
                .lock()
                .unwrap()
                .pop_front()
                .expect("unscripted increment"))
        }

        async fn conditional_reset(
            &self,
            _tenant_id: &str,
            _field: CounterField,
            _new_value: u32,
            _window_start: DateTime<Utc>,
            _stale_before: DateTime<Utc>,
        ) -> crate::error::StoreResult<ConditionalOutcome> {
            Ok(self
                .resets
                .lock()
                .unwrap()
                .pop_front()
                .expect("unscripted reset"))
        }

        async fn decrement_clamped(
            &self,
            _tenant_id: &str,
            _field: CounterField,
            _delta: u32,
        ) -> crate::error::StoreResult<u32> {
            unreachable!("not scripted")
        }

        async fn update_tier(
            &self,
            _tenant_id: &str,
            _tier: Tier,
        ) -> crate::error::StoreResult<()> {
            unreachable!("not scripted")
        }

        async fn update_status(
            &self,
            _tenant_id: &str,
            _status: SubscriptionStatus,
        ) -> crate::error::StoreResult<()> {
            unreachable!("not scripted")
        }
    }

    #[tokio::test]
    async fn test_lost_rollover_race_retries_exactly_once() {
        let stale = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let store = Arc::new(ScriptedStore::new(
            TenantRecord::new("tn_1", "Acme"),
            vec![
                // First increment sees the stale window.
                ConditionalOutcome::Rejected {
                    current: 25,
                    window_start: Some(stale),
                },
                // Retry after the lost reset succeeds against the fresh
                // window.
                ConditionalOutcome::Applied { new_value: 2 },
            ],
            // The reset loses to a concurrent winner.
            vec![ConditionalOutcome::Rejected {
                current: 1,
                window_start: Some(month_start(Utc::now())),
            }],
        ));
        let (enforcer, _sink) = enforcer_with(store.clone());

        let decision = enforcer.try_consume("tn_1", ResourceKind::Expense).await.unwrap();

        assert!(decision.allowed);
        assert_eq!(decision.current_usage, Some(2));
        assert_eq!(store.increment_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_lost_rollover_race_denies_after_single_retry() {
        let stale = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let fresh = month_start(Utc::now());
        let store = Arc::new(ScriptedStore::new(
            TenantRecord::new("tn_1", "Acme"),
            vec![
                ConditionalOutcome::Rejected {
                    current: 25,
                    window_start: Some(stale),
                },
                // The fresh window is already at the limit.
                ConditionalOutcome::Rejected {
                    current: 25,
                    window_start: Some(fresh),
                },
            ],
            vec![ConditionalOutcome::Rejected {
                current: 25,
                window_start: Some(fresh),
            }],
        ));
        let (enforcer, _sink) = enforcer_with(store.clone());

        let decision = enforcer.try_consume("tn_1", ResourceKind::Expense).await.unwrap();

        assert!(!decision.allowed);
        assert_eq!(decision.reason, Some(DenialReason::ExpenseLimitReached));
        // Exactly one retry: two increments total, no third attempt.
        assert_eq!(store.increment_calls.load(Ordering::SeqCst), 2);
    }

    /// Store whose counter mutations always fail.
    struct FailingStore {
        record: TenantRecord,
    }

    #[async_trait]
    impl QuotaStore for FailingStore {
        async fn load(&self, _tenant_id: &str) -> crate::error::StoreResult<Option<TenantRecord>> {
            Ok(Some(self.record.clone()))
        }

        async fn create(&self, _record: TenantRecord) -> crate::error::StoreResult<()> {
            Err(StoreError::Timeout)
        }

        async fn conditional_increment(
            &self,
            _tenant_id: &str,
            _field: CounterField,
            _delta: u32,
            _max: Option<u32>,
            _guard: Option<IncrementGuard>,
        ) -> crate::error::StoreResult<ConditionalOutcome> {
            Err(StoreError::Timeout)
        }

        async fn conditional_reset(
            &self,
            _tenant_id: &str,
            _field: CounterField,
            _new_value: u32,
            _window_start: DateTime<Utc>,
            _stale_before: DateTime<Utc>,
        ) -> crate::error::StoreResult<ConditionalOutcome> {
            Err(StoreError::Timeout)
        }

        async fn decrement_clamped(
            &self,
            _tenant_id: &str,
            _field: CounterField,
            _delta: u32,
        ) -> crate::error::StoreResult<u32> {
            Err(StoreError::Timeout)
        }

        async fn update_tier(
            &self,
            _tenant_id: &str,
            _tier: Tier,
        ) -> crate::error::StoreResult<()> {
            Err(StoreError::Timeout)
        }

        async fn update_status(
            &self,
            _tenant_id: &str,
            _status: SubscriptionStatus,
        ) -> crate::error::StoreResult<()> {
            Err(StoreError::Timeout)
        }
    }

    #[tokio::test]
    async fn test_store_timeout_fails_closed() {
        let store = Arc::new(FailingStore {
            record: TenantRecord::new("tn_1", "Acme"),
        });
        let (enforcer, sink) = enforcer_with(store);

        let decision = enforcer.try_consume("tn_1", ResourceKind::Project).await.unwrap();

        assert!(!decision.allowed);
        assert_eq!(decision.reason, Some(DenialReason::ProjectLimitReached));
        // No usage diagnostics when the store is unreachable.
        assert_eq!(decision.current_usage, None);
        assert_eq!(decision.limit, None);

        assert_eq!(sink.count_for_severity(Severity::Warning), 1);
        assert_eq!(
            sink.events()[0].event_type,
            SecurityEventType::QuotaStoreUnavailable
        );
    }

    #[tokio::test]
    async fn test_release_clamps_at_zero() {
        let store = seeded_store(TenantRecord::new("tn_1", "Acme")).await;
        let (enforcer, _sink) = enforcer_with(store);

        assert_eq!(enforcer.release("tn_1", ResourceKind::Project).await.unwrap(), 0);
        assert_eq!(enforcer.release("tn_1", ResourceKind::Project).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_consume_then_release_round_trip() {
        let store = seeded_store(TenantRecord::new("tn_1", "Acme")).await;
        let (enforcer, _sink) = enforcer_with(store.clone());

        enforcer.try_consume("tn_1", ResourceKind::User).await.unwrap();
        enforcer.try_consume("tn_1", ResourceKind::User).await.unwrap();
        assert_eq!(enforcer.release("tn_1", ResourceKind::User).await.unwrap(), 1);

        assert_eq!(store.load("tn_1").await.unwrap().unwrap().current_users, 1);
    }

    #[tokio::test]
    async fn test_unknown_tenant() {
        let store = Arc::new(MemoryQuotaStore::new());
        let (enforcer, _sink) = enforcer_with(store);

        let result = enforcer.try_consume("tn_ghost", ResourceKind::Project).await;
        assert!(matches!(result, Err(QuotaError::UnknownTenant(_))));
    }

    #[tokio::test]
    async fn test_onboard_and_change_tier() {
        let store = Arc::new(MemoryQuotaStore::new());
        let (enforcer, _sink) = enforcer_with(store.clone());

        enforcer
            .onboard_tenant(TenantRecord::new("tn_new", "Fresh Inc"))
            .await
            .unwrap();
        enforcer.change_tier("tn_new", Tier::Professional).await.unwrap();

        let record = store.load("tn_new").await.unwrap().unwrap();
        assert_eq!(record.tier, Tier::Professional);
        assert_eq!(record.current_projects, 0);

        // Onboarding the same tenant twice is rejected.
        let result = enforcer
            .onboard_tenant(TenantRecord::new("tn_new", "Fresh Inc"))
            .await;
        assert!(matches!(
            result,
            Err(QuotaError::Store(StoreError::AlreadyExists))
        ));
    }
}
