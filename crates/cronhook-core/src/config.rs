use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ADMIN_PORT: u16 = 8780;
pub const DEFAULT_ADMIN_BIND: &str = "127.0.0.1";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Top-level config (cronhook.toml + CRONHOOK_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronhookConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

impl Default for CronhookConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            http: HttpConfig::default(),
            admin: AdminConfig::default(),
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

/// Outbound HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Full round-trip timeout for one dispatched call, in seconds.
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_http_timeout(),
        }
    }
}

/// Admin API listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_ADMIN_PORT
}
fn default_bind() -> String {
    DEFAULT_ADMIN_BIND.to_string()
}
fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.cronhook/cronhook.db", home)
}

impl CronhookConfig {
    /// Load config from a TOML file with CRONHOOK_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.cronhook/cronhook.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: CronhookConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("CRONHOOK_").split("_"))
            .extract()
            .map_err(|e| crate::error::CoreError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.cronhook/cronhook.toml", home)
}
