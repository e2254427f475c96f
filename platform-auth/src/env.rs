//! Runtime environment detection
//!
//! This module captures the environment signals the resolver consults when
//! a request arrives with no verifiable credentials. The signals are read
//! once at construction time and passed in explicitly; request handling
//! never reaches into ambient process state.

use serde::{Deserialize, Serialize};

/// Environment variable naming the deployment environment.
pub const ENV_ENVIRONMENT: &str = "ENVIRONMENT";

/// Environment variable naming the deployment region.
pub const ENV_DEPLOY_REGION: &str = "DEPLOY_REGION";

/// Environment variable marking a local development run.
pub const ENV_LOCAL_DEV: &str = "LOCAL_DEV";

/// Signals used to decide whether the current runtime is production.
///
/// Production is detected from multiple signals so that a single missing
/// variable in a deployed stack cannot silently downgrade the runtime to
/// development behavior:
///
/// - an explicit `environment = "production"`, or
/// - a deployment region carrying a production marker, with no explicit
///   local-development override.
///
/// # Examples
///
/// ```
/// use platform_auth::EnvironmentSignals;
///
/// let signals = EnvironmentSignals::new(Some("production".into()), None, false);
/// assert!(signals.is_production());
///
/// let local = EnvironmentSignals::new(None, Some("us-east-1-prod".into()), true);
/// assert!(!local.is_production());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentSignals {
    /// Explicit environment name (e.g. "production", "staging")
    pub environment: Option<String>,

    /// Deployment region identifier
    pub deploy_region: Option<String>,

    /// Explicit local-development override
    pub local_override: bool,
}

impl EnvironmentSignals {
    /// Create from explicit values.
    pub fn new(
        environment: Option<String>,
        deploy_region: Option<String>,
        local_override: bool,
    ) -> Self {
        Self {
            environment,
            deploy_region,
            local_override,
        }
    }

    /// Capture the signals from process environment variables.
    ///
    /// Intended to be called once at startup; the resulting value is then
    /// handed to the resolver's constructor.
    pub fn from_env() -> Self {
        Self {
            environment: std::env::var(ENV_ENVIRONMENT).ok().filter(|v| !v.is_empty()),
            deploy_region: std::env::var(ENV_DEPLOY_REGION)
                .ok()
                .filter(|v| !v.is_empty()),
            local_override: std::env::var(ENV_LOCAL_DEV)
                .map(|v| is_truthy(&v))
                .unwrap_or(false),
        }
    }

    /// Whether the signals identify a production runtime.
    pub fn is_production(&self) -> bool {
        if self
            .environment
            .as_deref()
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false)
        {
            return true;
        }

        let region_is_production = self
            .deploy_region
            .as_deref()
            .map(|region| region.to_lowercase().contains("prod"))
            .unwrap_or(false);

        region_is_production && !self.local_override
    }

    /// A short label for the runtime, used in emitted events.
    pub fn label(&self) -> &str {
        if self.is_production() {
            "production"
        } else {
            self.environment.as_deref().unwrap_or("development")
        }
    }

    /// The observed signals as structured event context.
    pub fn describe(&self) -> serde_json::Value {
        serde_json::json!({
            "environment": self.environment,
            "deploy_region": self.deploy_region,
            "local_override": self.local_override,
        })
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes")
}
