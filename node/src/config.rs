// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::net::SocketAddr;
use std::time::Duration;

use infraction_sync::UserId;

use crate::errors::SyncError;

/// Number of audit entries fetched per correlation attempt.
pub const DEFAULT_AUDIT_WINDOW: usize = 10;

/// Retries run while the per-user slot is held, so both knobs stay small.
pub const MAX_AUDIT_RETRY_ATTEMPTS: u32 = 5;
pub const MAX_AUDIT_RETRY_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub bind_addr: SocketAddr,
    pub auth_token: Option<String>,

    /// Remote ledger service. `None` hosts an in-memory ledger on this node.
    pub ledger_url: Option<String>,

    pub platform_api_url: String,
    pub platform_token: Option<String>,

    /// The bot's own user id; actor of unattributed bans.
    pub bot_user_id: UserId,

    pub audit_window: usize,
    /// Extra audit fetches when the window holds no match yet.
    pub audit_retry_attempts: u32,
    pub audit_retry_delay: Duration,

    /// Upper bound on each ledger/audit call.
    pub call_timeout: Duration,

    pub event_bus_capacity: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            auth_token: None,
            ledger_url: None,
            platform_api_url: "https://discord.com/api/v10".to_string(),
            platform_token: None,
            bot_user_id: UserId(0),
            audit_window: DEFAULT_AUDIT_WINDOW,
            audit_retry_attempts: 1,
            audit_retry_delay: Duration::from_millis(1500),
            call_timeout: Duration::from_secs(10),
            event_bus_capacity: 256,
        }
    }
}

impl NodeConfig {
    /// Defaults overridden by `INFRACTION_SYNC_*` environment variables.
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let get = |name: &str| lookup(&format!("INFRACTION_SYNC_{name}")).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("BIND_ADDR") {
            cfg.bind_addr = parse("BIND_ADDR", &v)?;
        }
        cfg.auth_token = get("AUTH_TOKEN");
        cfg.ledger_url = get("LEDGER_URL");
        if let Some(v) = get("PLATFORM_API_URL") {
            cfg.platform_api_url = v;
        }
        cfg.platform_token = get("PLATFORM_TOKEN");
        if let Some(v) = get("BOT_USER_ID") {
            cfg.bot_user_id = parse("BOT_USER_ID", &v)?;
        }
        if let Some(v) = get("AUDIT_WINDOW") {
            cfg.audit_window = parse("AUDIT_WINDOW", &v)?;
        }
        if let Some(v) = get("AUDIT_RETRY_ATTEMPTS") {
            cfg.audit_retry_attempts = parse("AUDIT_RETRY_ATTEMPTS", &v)?;
        }
        if let Some(v) = get("AUDIT_RETRY_DELAY_MS") {
            cfg.audit_retry_delay = Duration::from_millis(parse("AUDIT_RETRY_DELAY_MS", &v)?);
        }
        if let Some(v) = get("CALL_TIMEOUT_MS") {
            cfg.call_timeout = Duration::from_millis(parse("CALL_TIMEOUT_MS", &v)?);
        }
        if let Some(v) = get("EVENT_BUS_CAPACITY") {
            cfg.event_bus_capacity = parse("EVENT_BUS_CAPACITY", &v)?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), SyncError> {
        // Platform caps audit-log pages at 100 entries
        if self.audit_window == 0 || self.audit_window > 100 {
            return Err(SyncError::InvalidConfig(format!(
                "audit window must be within 1..=100, got {}",
                self.audit_window
            )));
        }
        if self.audit_retry_attempts > MAX_AUDIT_RETRY_ATTEMPTS {
            return Err(SyncError::InvalidConfig(format!(
                "audit retry attempts must be at most {MAX_AUDIT_RETRY_ATTEMPTS}, got {}",
                self.audit_retry_attempts
            )));
        }
        if self.audit_retry_delay > MAX_AUDIT_RETRY_DELAY {
            return Err(SyncError::InvalidConfig(format!(
                "audit retry delay must be at most {MAX_AUDIT_RETRY_DELAY:?}, got {:?}",
                self.audit_retry_delay
            )));
        }
        // Unattributed bans are recorded under this id
        if self.bot_user_id == UserId(0) {
            return Err(SyncError::InvalidConfig(
                "INFRACTION_SYNC_BOT_USER_ID must be set to the bot's user id".into(),
            ));
        }
        if self.call_timeout.is_zero() {
            return Err(SyncError::InvalidConfig("call timeout must be non-zero".into()));
        }
        if self.event_bus_capacity == 0 {
            return Err(SyncError::InvalidConfig("event bus capacity must be non-zero".into()));
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, SyncError> {
    raw.trim()
        .parse()
        .map_err(|_| SyncError::InvalidConfig(format!("INFRACTION_SYNC_{name}: cannot parse {raw:?}")))
}
