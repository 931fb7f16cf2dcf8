//! Config file loading.
//!
//! The config file is optional. A missing file yields defaults; a file that
//! fails to parse also yields defaults plus a warning the caller logs once
//! logging is up. Config errors never prevent startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use loanbot_core::auth::{AdminCredentials, AdminGate};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub theme: String,
    pub data_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub prompt_delay_ms: u64,
    pub admin: AdminConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".to_owned(),
            theme: "catppuccin-mocha".to_owned(),
            data_dir: PathBuf::from(".loanbot"),
            request_timeout_secs: 30,
            prompt_delay_ms: 500,
            admin: AdminConfig::default(),
        }
    }
}

/// `[admin]` table. Login stays disabled until both username and hash are set.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub token_ttl_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: None,
            password_hash: None,
            token_ttl_secs: 3600,
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn prompt_delay(&self) -> Duration {
        Duration::from_millis(self.prompt_delay_ms)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("loanbot.db")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn admin_gate(&self) -> AdminGate {
        let credentials = match (&self.admin.username, &self.admin.password_hash) {
            (Some(username), Some(password_hash)) => Some(AdminCredentials {
                username: username.clone(),
                password_hash: password_hash.clone(),
            }),
            _ => None,
        };
        AdminGate::new(credentials, Duration::from_secs(self.admin.token_ttl_secs))
    }
}

/// Returns the default config file path.
///
/// Prefers `$XDG_CONFIG_HOME/loanbot/config.toml`; falls back to
/// `~/.config/loanbot/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("loanbot").join("config.toml")
}

/// Loads the config at `path`. Returns defaults and a warning on parse errors.
pub fn load(path: &Path) -> (Config, Option<String>) {
    let raw = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return (Config::default(), None),
    };
    parse(&raw).map_or_else(
        |e| {
            (
                Config::default(),
                Some(format!("config parse error in {}: {e}", path.display())),
            )
        },
        |c| (c, None),
    )
}

pub fn parse(raw: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(raw)
}
