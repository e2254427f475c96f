//! Tenant account records
//!
//! This module provides the core TenantRecord entity for multi-tenant
//! account management. A tenant is an isolated customer account (company)
//! whose resources and quota counters are tracked independently of all
//! other tenants.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::tiers::Tier;

/// A tenant record is the single persisted row per customer account.
///
/// The record carries the subscription tier, the subscription status, and
/// the usage counters the quota layer enforces against. Counters are only
/// ever mutated through the quota store's atomic conditional operations or
/// through explicit admin tier/status changes; records are never deleted
/// by this subsystem.
///
/// # Invariants
///
/// - Every counter is at most the tier's corresponding limit, unless that
///   limit is unlimited.
/// - `expense_window_start` is the first instant of the calendar month in
///   which the last successful expense increment occurred, or `None` if no
///   expense was ever recorded.
///
/// # Examples
///
/// ```
/// use platform_tenant::{SubscriptionStatus, TenantRecord, Tier};
///
/// let record = TenantRecord::new("tn_01h9xp", "Acme Corp");
/// assert_eq!(record.tier, Tier::Trial);
/// assert_eq!(record.status, SubscriptionStatus::Trialing);
/// assert_eq!(record.current_projects, 0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantRecord {
    /// Primary key, opaque string assigned at signup
    pub tenant_id: String,

    /// Human-readable company name
    pub name: String,

    /// Subscription tier for quota limits
    pub tier: Tier,

    /// Billing lifecycle state
    pub status: SubscriptionStatus,

    /// Number of active projects
    pub current_projects: u32,

    /// Number of expenses recorded in the current window
    pub current_monthly_expenses: u32,

    /// Number of seats in use
    pub current_users: u32,

    /// First instant of the month the expense counter applies to
    pub expense_window_start: Option<DateTime<Utc>>,

    /// When the tenant was created
    pub created_at: DateTime<Utc>,

    /// When the record was last updated
    pub updated_at: DateTime<Utc>,

    /// Custom metadata for extensibility
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl TenantRecord {
    /// Creates a new tenant record with onboarding defaults.
    ///
    /// The record is created with:
    /// - The `Trial` tier and `Trialing` status
    /// - All usage counters at zero
    /// - No expense window (none starts until the first expense)
    /// - Current timestamp for created_at and updated_at
    ///
    /// # Arguments
    ///
    /// * `tenant_id` - Opaque primary key assigned at signup
    /// * `name` - The company name
    pub fn new(tenant_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            tenant_id: tenant_id.into(),
            name: name.into(),
            tier: Tier::Trial,
            status: SubscriptionStatus::Trialing,
            current_projects: 0,
            current_monthly_expenses: 0,
            current_users: 0,
            expense_window_start: None,
            created_at: now,
            updated_at: now,
            metadata: HashMap::new(),
        }
    }

    /// Read a usage counter by field.
    pub fn counter(&self, field: CounterField) -> u32 {
        match field {
            CounterField::Projects => self.current_projects,
            CounterField::MonthlyExpenses => self.current_monthly_expenses,
            CounterField::Users => self.current_users,
        }
    }

    /// Write a usage counter by field.
    pub fn set_counter(&mut self, field: CounterField, value: u32) {
        match field {
            CounterField::Projects => self.current_projects = value,
            CounterField::MonthlyExpenses => self.current_monthly_expenses = value,
            CounterField::Users => self.current_users = value,
        }
    }

    /// Bump `updated_at` to now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Whether the subscription is in a usable state.
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            SubscriptionStatus::Trialing | SubscriptionStatus::Active
        )
    }
}

/// Billing lifecycle state of a tenant's subscription.
///
/// Carried as data on the record; delinquency enforcement is the billing
/// collaborator's concern, not the quota layer's.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// In the evaluation period
    Trialing,

    /// Paid and current
    Active,

    /// Payment failed, in dunning
    PastDue,

    /// Subscription ended
    Canceled,
}

impl SubscriptionStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
        }
    }

    /// Parse status from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trialing" => Some(Self::Trialing),
            "active" => Some(Self::Active),
            "past_due" | "pastdue" => Some(Self::PastDue),
            "canceled" | "cancelled" => Some(Self::Canceled),
            _ => None,
        }
    }
}

impl Default for SubscriptionStatus {
    fn default() -> Self {
        SubscriptionStatus::Trialing
    }
}

/// Names the usage counters on a tenant record.
///
/// Store implementations address counters through this enum rather than
/// raw attribute strings, so a typo cannot silently target the wrong
/// field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CounterField {
    /// Active project count
    Projects,

    /// Monthly-windowed expense count
    MonthlyExpenses,

    /// Seat count
    Users,
}

impl CounterField {
    /// The persisted attribute name for this counter.
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterField::Projects => "current_projects",
            CounterField::MonthlyExpenses => "current_monthly_expenses",
            CounterField::Users => "current_users",
        }
    }

    /// Whether this counter resets on a calendar window.
    pub fn is_windowed(&self) -> bool {
        matches!(self, CounterField::MonthlyExpenses)
    }
}

/// First instant (UTC) of the calendar month containing `at`.
///
/// The expense counter is windowed on this boundary.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use platform_tenant::month_start;
///
/// let at = Utc.with_ymd_and_hms(2026, 8, 15, 13, 45, 0).unwrap();
/// let start = month_start(at);
/// assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap());
/// ```
pub fn month_start(at: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(at.year(), at.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(at)
}
