//! In-memory quota store
//!
//! This store keeps tenant records in a process-local map and runs every
//! conditional operation inside one write-lock critical section, which
//! gives the same indivisibility guarantee a distributed backend provides
//! with server-side conditional writes.
//!
//! Suitable for single-process deployments and tests. For distributed
//! systems, use the Redis backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use platform_tenant::{CounterField, SubscriptionStatus, TenantRecord, Tier};

use crate::error::{StoreError, StoreResult};
use crate::store::{ConditionalOutcome, IncrementGuard, QuotaStore};

/// In-memory [`QuotaStore`] implementation.
#[derive(Debug, Default, Clone)]
pub struct MemoryQuotaStore {
    records: Arc<RwLock<HashMap<String, TenantRecord>>>,
}

impl MemoryQuotaStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in the store.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl QuotaStore for MemoryQuotaStore {
    async fn load(&self, tenant_id: &str) -> StoreResult<Option<TenantRecord>> {
        Ok(self.records.read().await.get(tenant_id).cloned())
    }

    async fn create(&self, record: TenantRecord) -> StoreResult<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.tenant_id) {
            return Err(StoreError::AlreadyExists);
        }
        records.insert(record.tenant_id.clone(), record);
        Ok(())
    }

    async fn conditional_increment(
        &self,
        tenant_id: &str,
        field: CounterField,
        delta: u32,
        max: Option<u32>,
        guard: Option<IncrementGuard>,
    ) -> StoreResult<ConditionalOutcome> {
        let mut records = self.records.write().await;
        let record = records.get_mut(tenant_id).ok_or(StoreError::NotFound)?;

        let current = record.counter(field);
        let window_start = record.expense_window_start;

        if let Some(IncrementGuard::WindowAtOrAfter(at)) = guard {
            let window_is_current = window_start.map(|w| w >= at).unwrap_or(false);
            if !window_is_current {
                return Ok(ConditionalOutcome::Rejected {
                    current,
                    window_start,
                });
            }
        }

        let new_value = current.saturating_add(delta);
        if let Some(max) = max {
            if new_value > max {
                return Ok(ConditionalOutcome::Rejected {
                    current,
                    window_start,
                });
            }
        }

        record.set_counter(field, new_value);
        record.touch();
        Ok(ConditionalOutcome::Applied { new_value })
    }

    async fn conditional_reset(
        &self,
        tenant_id: &str,
        field: CounterField,
        new_value: u32,
        window_start: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> StoreResult<ConditionalOutcome> {
        let mut records = self.records.write().await;
        let record = records.get_mut(tenant_id).ok_or(StoreError::NotFound)?;

        let stored_window = record.expense_window_start;
        let is_stale = stored_window.map(|w| w < stale_before).unwrap_or(true);
        if !is_stale {
            return Ok(ConditionalOutcome::Rejected {
                current: record.counter(field),
                window_start: stored_window,
            });
        }

        record.set_counter(field, new_value);
        record.expense_window_start = Some(window_start);
        record.touch();
        Ok(ConditionalOutcome::Applied { new_value })
    }

    async fn decrement_clamped(
        &self,
        tenant_id: &str,
        field: CounterField,
        delta: u32,
    ) -> StoreResult<u32> {
        let mut records = self.records.write().await;
        let record = records.get_mut(tenant_id).ok_or(StoreError::NotFound)?;

        let new_value = record.counter(field).saturating_sub(delta);
        record.set_counter(field, new_value);
        record.touch();
        Ok(new_value)
    }

    async fn update_tier(&self, tenant_id: &str, tier: Tier) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let record = records.get_mut(tenant_id).ok_or(StoreError::NotFound)?;
        record.tier = tier;
        record.touch();
        Ok(())
    }

    async fn update_status(&self, tenant_id: &str, status: SubscriptionStatus) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let record = records.get_mut(tenant_id).ok_or(StoreError::NotFound)?;
        record.status = status;
        record.touch();
        Ok(())
    }
}
