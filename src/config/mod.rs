//! Configuration (spec §6, SPEC_FULL §10.6).
//!
//! `Config::load()` follows the teacher's own shape exactly: a
//! `CONFIG_FILE` env var names the file (default `config.toml`), loaded
//! via `toml::from_str` if present, else `Config::default()` is written
//! out with `toml::to_string_pretty` so the first run produces an
//! editable starting point.

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub upstream_base_url: String,
    pub upstream_timeout_secs: u64,
    pub upstream_max_connections: usize,

    pub proxy_host: String,
    pub proxy_port: u16,

    pub max_filter_complexity: usize,
    pub max_filter_fetch_size: usize,
    pub filter_fetch_multiplier: usize,

    pub cors_origins: String,
    pub log_level: String,
    pub log_format: LogFormat,

    /// Ambient HTTP hardening from the original implementation's
    /// settings (`examples/original_source/app/config.py`); not named by
    /// the distilled spec but not excluded by any Non-goal either.
    pub allowed_hosts: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Text,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream_base_url: "http://localhost:9000/scim/v2".to_string(),
            upstream_timeout_secs: 30,
            upstream_max_connections: 100,

            proxy_host: "0.0.0.0".to_string(),
            proxy_port: 8000,

            max_filter_complexity: 50,
            max_filter_fetch_size: 2000,
            filter_fetch_multiplier: 20,

            cors_origins: "*".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,

            allowed_hosts: vec!["*".to_string()],
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());

        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(&config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(&config_file, contents)?;
            Ok(default_config)
        }
    }

    pub fn upstream_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn cors_origins_list(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}
