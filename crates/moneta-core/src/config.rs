use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 18990;
pub const DEFAULT_BIND: &str = "127.0.0.1";
/// How far ahead of `now` the reminder cycle searches for due occurrences.
pub const DEFAULT_LOOKAHEAD_SECS: u64 = 3600;
/// Per-delivery wall-clock cap so one slow endpoint cannot stall a cycle.
pub const DEFAULT_DELIVERY_TIMEOUT_SECS: u64 = 10;
/// TTL forwarded to the push service with each message.
pub const DEFAULT_PUSH_TTL_SECS: u64 = 3600;

/// Top-level config (moneta.toml + MONETA_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonetaConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub push: PushConfig,
}

impl Default for MonetaConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            database: DatabaseConfig::default(),
            scheduler: SchedulerConfig::default(),
            push: PushConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Shared secret the external cron trigger must present. When unset,
    /// every trigger request is rejected — there is no "open" mode.
    pub cron_secret: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            cron_secret: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_lookahead_secs")]
    pub lookahead_secs: u64,
    #[serde(default = "default_delivery_timeout_secs")]
    pub delivery_timeout_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            lookahead_secs: DEFAULT_LOOKAHEAD_SECS,
            delivery_timeout_secs: DEFAULT_DELIVERY_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    #[serde(default = "default_push_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_PUSH_TTL_SECS,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_lookahead_secs() -> u64 {
    DEFAULT_LOOKAHEAD_SECS
}
fn default_delivery_timeout_secs() -> u64 {
    DEFAULT_DELIVERY_TIMEOUT_SECS
}
fn default_push_ttl_secs() -> u64 {
    DEFAULT_PUSH_TTL_SECS
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.moneta/moneta.db", home)
}

impl MonetaConfig {
    /// Load config from a TOML file with MONETA_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.moneta/moneta.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: MonetaConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("MONETA_").split("_"))
            .extract()
            .map_err(|e| crate::error::CoreError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.moneta/moneta.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = MonetaConfig::default();
        assert_eq!(cfg.gateway.port, DEFAULT_PORT);
        assert_eq!(cfg.scheduler.lookahead_secs, 3600);
        assert!(cfg.gateway.cron_secret.is_none());
    }
}
