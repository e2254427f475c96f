//! Subscription tiers and resource limits
//!
//! This module defines the subscription tiers available on the platform
//! and the per-tenant resource limits associated with each tier.

use serde::{Deserialize, Serialize};

use crate::tenant::CounterField;

/// Subscription tier for a tenant.
///
/// Tiers determine how many resources a tenant may hold at once.
///
/// # Tier Hierarchy
///
/// - **Trial**: Evaluation tier every tenant starts on
/// - **Basic**: Entry paid tier for small companies
/// - **Professional**: Paid tier for growing teams
/// - **Enterprise**: Unlimited usage, custom contract
///
/// # Examples
///
/// ```
/// use platform_tenant::Tier;
///
/// let tier = Tier::Basic;
/// let limits = tier.limits();
/// assert_eq!(limits.projects, Some(10));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Evaluation tier (default for new tenants)
    Trial,

    /// Entry paid tier
    Basic,

    /// Paid tier for growing teams
    Professional,

    /// Unlimited usage tier
    Enterprise,
}

impl Tier {
    /// Get the resource limits for this tier.
    ///
    /// # Returns
    ///
    /// A `TierLimits` struct containing the limits for this tier
    ///
    /// # Examples
    ///
    /// ```
    /// use platform_tenant::Tier;
    ///
    /// let limits = Tier::Trial.limits();
    /// assert_eq!(limits.projects, Some(3));
    /// assert_eq!(limits.users, Some(2));
    /// ```
    pub fn limits(&self) -> TierLimits {
        match self {
            Tier::Trial => TierLimits {
                projects: Some(3),
                monthly_expenses: Some(25),
                users: Some(2),
            },
            Tier::Basic => TierLimits {
                projects: Some(10),
                monthly_expenses: Some(100),
                users: Some(5),
            },
            Tier::Professional => TierLimits {
                projects: Some(50),
                monthly_expenses: Some(1000),
                users: Some(25),
            },
            Tier::Enterprise => TierLimits {
                projects: None,
                monthly_expenses: None,
                users: None,
            },
        }
    }

    /// Parse tier from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    ///
    /// # Returns
    ///
    /// `Some(Tier)` if valid, `None` otherwise. Callers looking up limits
    /// for an untrusted tier string should fall back to [`Tier::Trial`]
    /// (the most restrictive tier) when parsing fails, never to unlimited.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "trial" | "free" => Some(Tier::Trial),
            "basic" | "starter" => Some(Tier::Basic),
            "professional" | "pro" => Some(Tier::Professional),
            "enterprise" => Some(Tier::Enterprise),
            _ => None,
        }
    }

    /// Parse a stored tier string, falling back to the most restrictive
    /// tier when the value is unknown.
    ///
    /// Records written by older code may carry tier names this build does
    /// not know; those must never resolve to a laxer limit.
    ///
    /// # Examples
    ///
    /// ```
    /// use platform_tenant::Tier;
    ///
    /// assert_eq!(Tier::parse_or_most_restrictive("professional"), Tier::Professional);
    /// assert_eq!(Tier::parse_or_most_restrictive("platinum"), Tier::Trial);
    /// ```
    pub fn parse_or_most_restrictive(s: &str) -> Self {
        Self::parse(s).unwrap_or(Tier::Trial)
    }

    /// Get string representation of the tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Trial => "trial",
            Tier::Basic => "basic",
            Tier::Professional => "professional",
            Tier::Enterprise => "enterprise",
        }
    }

    /// Get a human-readable display name for the tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            Tier::Trial => "Trial",
            Tier::Basic => "Basic",
            Tier::Professional => "Professional",
            Tier::Enterprise => "Enterprise",
        }
    }

    /// Check if this is a paid tier.
    pub fn is_paid(&self) -> bool {
        !matches!(self, Tier::Trial)
    }

    /// The next tier up the upgrade ladder, if any.
    pub fn next(&self) -> Option<Tier> {
        match self {
            Tier::Trial => Some(Tier::Basic),
            Tier::Basic => Some(Tier::Professional),
            Tier::Professional => Some(Tier::Enterprise),
            Tier::Enterprise => None,
        }
    }

    /// The smallest higher tier whose limit for `field` is larger than this
    /// tier's limit (or unlimited).
    ///
    /// Used to suggest an upgrade in quota-denial responses.
    ///
    /// # Examples
    ///
    /// ```
    /// use platform_tenant::{CounterField, Tier};
    ///
    /// assert_eq!(
    ///     Tier::Trial.suggested_upgrade(CounterField::Projects),
    ///     Some(Tier::Basic)
    /// );
    /// assert_eq!(Tier::Enterprise.suggested_upgrade(CounterField::Projects), None);
    /// ```
    pub fn suggested_upgrade(&self, field: CounterField) -> Option<Tier> {
        let current = self.limits().for_counter(field);
        let mut candidate = self.next();
        while let Some(tier) = candidate {
            match (tier.limits().for_counter(field), current) {
                (None, _) => return Some(tier),
                (Some(upgraded), Some(limit)) if upgraded > limit => return Some(tier),
                _ => candidate = tier.next(),
            }
        }
        None
    }
}

impl Default for Tier {
    fn default() -> Self {
        Tier::Trial
    }
}

/// Resource limits for a subscription tier.
///
/// Values of `None` indicate unlimited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierLimits {
    /// Maximum number of active projects (None = unlimited)
    pub projects: Option<u32>,

    /// Maximum expenses per calendar month (None = unlimited)
    pub monthly_expenses: Option<u32>,

    /// Maximum number of seats (None = unlimited)
    pub users: Option<u32>,
}

impl TierLimits {
    /// Select the limit corresponding to a tenant counter field.
    pub fn for_counter(&self, field: CounterField) -> Option<u32> {
        match field {
            CounterField::Projects => self.projects,
            CounterField::MonthlyExpenses => self.monthly_expenses,
            CounterField::Users => self.users,
        }
    }
}
