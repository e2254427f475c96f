//! Redis-backed quota store for distributed deployments.
//!
//! Tenant records live in a Redis hash per tenant. Every conditional
//! operation executes as a single server-side Lua script, so the
//! precondition check and the mutation stay one indivisible operation
//! across processes, matching the guarantee the in-memory store gets
//! from its lock critical section.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use std::collections::HashMap;

use platform_tenant::{CounterField, SubscriptionStatus, TenantRecord, Tier};

use crate::error::{StoreError, StoreResult};
use crate::store::{ConditionalOutcome, IncrementGuard, QuotaStore};

/// Redis quota store configuration.
#[derive(Debug, Clone)]
pub struct RedisQuotaStoreConfig {
    /// Redis connection URL (e.g., redis://localhost:6379).
    pub url: String,

    /// Prefix for all Redis keys (default: "platform_quota").
    pub key_prefix: String,
}

impl Default for RedisQuotaStoreConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            key_prefix: "platform_quota".to_string(),
        }
    }
}

// Script replies are flat string arrays: a status tag, then the counter
// value and the stored window (epoch seconds, empty when unset).

const INCREMENT_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
  return {'MISSING', '0', ''}
end
local current = tonumber(redis.call('HGET', KEYS[1], ARGV[1]) or '0')
local window = redis.call('HGET', KEYS[1], 'expense_window_start')
if window == false then window = '' end
if ARGV[4] ~= '' then
  if window == '' or tonumber(window) < tonumber(ARGV[4]) then
    return {'REJECTED', tostring(current), window}
  end
end
local delta = tonumber(ARGV[2])
if ARGV[3] ~= '' and current + delta > tonumber(ARGV[3]) then
  return {'REJECTED', tostring(current), window}
end
local new_value = redis.call('HINCRBY', KEYS[1], ARGV[1], delta)
redis.call('HSET', KEYS[1], 'updated_at', ARGV[5])
return {'APPLIED', tostring(new_value), window}
"#;

const RESET_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
  return {'MISSING', '0', ''}
end
local window = redis.call('HGET', KEYS[1], 'expense_window_start')
if window == false then window = '' end
if window ~= '' and tonumber(window) >= tonumber(ARGV[3]) then
  local current = tonumber(redis.call('HGET', KEYS[1], ARGV[1]) or '0')
  return {'REJECTED', tostring(current), window}
end
redis.call('HSET', KEYS[1], ARGV[1], ARGV[2], 'expense_window_start', ARGV[4], 'updated_at', ARGV[5])
return {'APPLIED', ARGV[2], ARGV[4]}
"#;

const DECREMENT_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
  return {'MISSING', '0'}
end
local current = tonumber(redis.call('HGET', KEYS[1], ARGV[1]) or '0')
local new_value = current - tonumber(ARGV[2])
if new_value < 0 then new_value = 0 end
redis.call('HSET', KEYS[1], ARGV[1], tostring(new_value), 'updated_at', ARGV[3])
return {'APPLIED', tostring(new_value)}
"#;

const CREATE_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 1 then
  return 'EXISTS'
end
redis.call('HSET', KEYS[1], unpack(ARGV))
return 'OK'
"#;

/// Redis-backed [`QuotaStore`] implementation.
pub struct RedisQuotaStore {
    conn: ConnectionManager,
    config: RedisQuotaStoreConfig,
    increment_script: Script,
    reset_script: Script,
    decrement_script: Script,
    create_script: Script,
}

impl std::fmt::Debug for RedisQuotaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisQuotaStore")
            .field("config", &self.config)
            .finish()
    }
}

impl RedisQuotaStore {
    /// Create a new Redis quota store.
    pub async fn new(config: RedisQuotaStoreConfig) -> StoreResult<Self> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self {
            conn,
            config,
            increment_script: Script::new(INCREMENT_SCRIPT),
            reset_script: Script::new(RESET_SCRIPT),
            decrement_script: Script::new(DECREMENT_SCRIPT),
            create_script: Script::new(CREATE_SCRIPT),
        })
    }

    /// Create with default configuration.
    pub async fn with_defaults() -> StoreResult<Self> {
        Self::new(RedisQuotaStoreConfig::default()).await
    }

    fn record_key(&self, tenant_id: &str) -> String {
        format!("{}:tenant:{}", self.config.key_prefix, tenant_id)
    }

    fn map_err(err: redis::RedisError) -> StoreError {
        if err.is_timeout() {
            StoreError::Timeout
        } else {
            StoreError::Unavailable(err.to_string())
        }
    }

    fn parse_window(raw: &str) -> Option<DateTime<Utc>> {
        if raw.is_empty() {
            return None;
        }
        raw.parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    fn parse_outcome(reply: Vec<String>) -> StoreResult<ConditionalOutcome> {
        let status = reply.first().map(String::as_str).unwrap_or("");
        match status {
            "APPLIED" => {
                let new_value = reply
                    .get(1)
                    .and_then(|v| v.parse().ok())
                    .ok_or_else(|| StoreError::Serialization("bad script reply".to_string()))?;
                Ok(ConditionalOutcome::Applied { new_value })
            }
            "REJECTED" => {
                let current = reply
                    .get(1)
                    .and_then(|v| v.parse().ok())
                    .ok_or_else(|| StoreError::Serialization("bad script reply".to_string()))?;
                let window_start = reply
                    .get(2)
                    .map(String::as_str)
                    .and_then(Self::parse_window);
                Ok(ConditionalOutcome::Rejected {
                    current,
                    window_start,
                })
            }
            "MISSING" => Err(StoreError::NotFound),
            other => Err(StoreError::Serialization(format!(
                "unexpected script reply: {}",
                other
            ))),
        }
    }

    fn record_fields(record: &TenantRecord) -> StoreResult<Vec<(String, String)>> {
        let metadata = serde_json::to_string(&record.metadata)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        Ok(vec![
            ("tenant_id".to_string(), record.tenant_id.clone()),
            ("name".to_string(), record.name.clone()),
            ("tier".to_string(), record.tier.as_str().to_string()),
            ("status".to_string(), record.status.as_str().to_string()),
            (
                CounterField::Projects.as_str().to_string(),
                record.current_projects.to_string(),
            ),
            (
                CounterField::MonthlyExpenses.as_str().to_string(),
                record.current_monthly_expenses.to_string(),
            ),
            (
                CounterField::Users.as_str().to_string(),
                record.current_users.to_string(),
            ),
            (
                "expense_window_start".to_string(),
                record
                    .expense_window_start
                    .map(|w| w.timestamp().to_string())
                    .unwrap_or_default(),
            ),
            ("created_at".to_string(), record.created_at.to_rfc3339()),
            ("updated_at".to_string(), record.updated_at.to_rfc3339()),
            ("metadata".to_string(), metadata),
        ])
    }

    fn parse_record(map: HashMap<String, String>) -> StoreResult<TenantRecord> {
        let get = |key: &str| map.get(key).cloned().unwrap_or_default();
        let parse_counter = |key: &str| -> StoreResult<u32> {
            let raw = get(key);
            if raw.is_empty() {
                return Ok(0);
            }
            raw.parse()
                .map_err(|_| StoreError::Serialization(format!("bad counter field {}", key)))
        };
        let parse_timestamp = |key: &str| -> StoreResult<DateTime<Utc>> {
            DateTime::parse_from_rfc3339(&get(key))
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| StoreError::Serialization(format!("bad timestamp field {}", key)))
        };

        let tenant_id = get("tenant_id");
        if tenant_id.is_empty() {
            return Err(StoreError::Serialization("missing tenant_id".to_string()));
        }

        let metadata = {
            let raw = get("metadata");
            if raw.is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&raw)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?
            }
        };

        Ok(TenantRecord {
            tenant_id,
            name: get("name"),
            // An unknown stored tier never resolves to a laxer limit.
            tier: Tier::parse_or_most_restrictive(&get("tier")),
            status: SubscriptionStatus::parse(&get("status")).unwrap_or_default(),
            current_projects: parse_counter(CounterField::Projects.as_str())?,
            current_monthly_expenses: parse_counter(CounterField::MonthlyExpenses.as_str())?,
            current_users: parse_counter(CounterField::Users.as_str())?,
            expense_window_start: Self::parse_window(&get("expense_window_start")),
            created_at: parse_timestamp("created_at")?,
            updated_at: parse_timestamp("updated_at")?,
            metadata,
        })
    }
}

#[async_trait]
impl QuotaStore for RedisQuotaStore {
    async fn load(&self, tenant_id: &str) -> StoreResult<Option<TenantRecord>> {
        let mut conn = self.conn.clone();
        let map: HashMap<String, String> = conn
            .hgetall(self.record_key(tenant_id))
            .await
            .map_err(Self::map_err)?;

        if map.is_empty() {
            return Ok(None);
        }
        Self::parse_record(map).map(Some)
    }

    async fn create(&self, record: TenantRecord) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let mut invocation = self.create_script.prepare_invoke();
        invocation.key(self.record_key(&record.tenant_id));
        for (field, value) in Self::record_fields(&record)? {
            invocation.arg(field).arg(value);
        }

        let reply: String = invocation
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        match reply.as_str() {
            "OK" => Ok(()),
            "EXISTS" => Err(StoreError::AlreadyExists),
            other => Err(StoreError::Serialization(format!(
                "unexpected script reply: {}",
                other
            ))),
        }
    }

    async fn conditional_increment(
        &self,
        tenant_id: &str,
        field: CounterField,
        delta: u32,
        max: Option<u32>,
        guard: Option<IncrementGuard>,
    ) -> StoreResult<ConditionalOutcome> {
        let mut conn = self.conn.clone();
        let guard_arg = match guard {
            Some(IncrementGuard::WindowAtOrAfter(at)) => at.timestamp().to_string(),
            None => String::new(),
        };

        let reply: Vec<String> = self
            .increment_script
            .key(self.record_key(tenant_id))
            .arg(field.as_str())
            .arg(delta)
            .arg(max.map(|m| m.to_string()).unwrap_or_default())
            .arg(guard_arg)
            .arg(Utc::now().to_rfc3339())
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        Self::parse_outcome(reply)
    }

    async fn conditional_reset(
        &self,
        tenant_id: &str,
        field: CounterField,
        new_value: u32,
        window_start: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> StoreResult<ConditionalOutcome> {
        let mut conn = self.conn.clone();

        let reply: Vec<String> = self
            .reset_script
            .key(self.record_key(tenant_id))
            .arg(field.as_str())
            .arg(new_value)
            .arg(stale_before.timestamp())
            .arg(window_start.timestamp())
            .arg(Utc::now().to_rfc3339())
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        Self::parse_outcome(reply)
    }

    async fn decrement_clamped(
        &self,
        tenant_id: &str,
        field: CounterField,
        delta: u32,
    ) -> StoreResult<u32> {
        let mut conn = self.conn.clone();

        let reply: Vec<String> = self
            .decrement_script
            .key(self.record_key(tenant_id))
            .arg(field.as_str())
            .arg(delta)
            .arg(Utc::now().to_rfc3339())
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        match reply.first().map(String::as_str) {
            Some("APPLIED") => reply
                .get(1)
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| StoreError::Serialization("bad script reply".to_string())),
            Some("MISSING") => Err(StoreError::NotFound),
            _ => Err(StoreError::Serialization(
                "unexpected script reply".to_string(),
            )),
        }
    }

    async fn update_tier(&self, tenant_id: &str, tier: Tier) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let key = self.record_key(tenant_id);

        let exists: bool = conn.exists(&key).await.map_err(Self::map_err)?;
        if !exists {
            return Err(StoreError::NotFound);
        }

        let _: () = conn
            .hset_multiple(
                &key,
                &[
                    ("tier", tier.as_str().to_string()),
                    ("updated_at", Utc::now().to_rfc3339()),
                ],
            )
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn update_status(&self, tenant_id: &str, status: SubscriptionStatus) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let key = self.record_key(tenant_id);

        let exists: bool = conn.exists(&key).await.map_err(Self::map_err)?;
        if !exists {
            return Err(StoreError::NotFound);
        }

        let _: () = conn
            .hset_multiple(
                &key,
                &[
                    ("status", status.as_str().to_string()),
                    ("updated_at", Utc::now().to_rfc3339()),
                ],
            )
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }
}
