// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Runtime configuration loading from environment variables.
//!
//! Values come from `DSPOOL_*` environment variables with sensible defaults.
//! Invalid values fall back to defaults without crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `DSPOOL_CONFIG_PATH` | `datasources.toml` | Datasource definitions (TOML or `.properties`) |
//! | `DSPOOL_ENV_PREFIX` | `DSPOOL_DS_` | Prefix for env overrides of datasource keys |
//! | `DSPOOL_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `DSPOOL_LOG_LEVEL` | `info` | Tracing filter directive |
//! | `DSPOOL_LOG_FILE` | unset | Log file path (stderr when unset) |
//! | `DSPOOL_STRICT` | `false` | Fail `serve` when any datasource fails to deploy |

use std::path::PathBuf;

use serde::Serialize;

use crate::telemetry::{LogConfig, LogFormat};

pub const DEFAULT_CONFIG_PATH: &str = "datasources.toml";
pub const DEFAULT_ENV_PREFIX: &str = "DSPOOL_DS_";

/// Effective runtime configuration summary (serializable).
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub config_path: String,
    pub env_prefix: String,
    pub log_format: String,
    pub log_level: String,
    pub log_file: Option<String>,
    pub strict: bool,
}

/// All runtime configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub config_path: PathBuf,
    pub env_prefix: String,
    pub log: LogConfig,
    pub strict: bool,
}

/// Parse a boolean env var, returning `default` on missing or invalid.
fn parse_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => match val.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

/// Read a non-empty string env var.
fn parse_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn load_log_config() -> LogConfig {
    let format = parse_string("DSPOOL_LOG_FORMAT")
        .and_then(|v| v.parse::<LogFormat>().ok())
        .unwrap_or_default();
    let level = parse_string("DSPOOL_LOG_LEVEL").unwrap_or_else(|| "info".to_string());
    let output_path = parse_string("DSPOOL_LOG_FILE").map(PathBuf::from);
    LogConfig {
        format,
        level,
        output_path,
    }
}

/// Load all configuration from environment variables.
///
/// Missing or invalid values fall back to safe defaults without panicking.
pub fn load() -> EnvConfig {
    let config_path = parse_string("DSPOOL_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let env_prefix =
        parse_string("DSPOOL_ENV_PREFIX").unwrap_or_else(|| DEFAULT_ENV_PREFIX.to_string());

    EnvConfig {
        config_path,
        env_prefix,
        log: load_log_config(),
        strict: parse_bool("DSPOOL_STRICT", false),
    }
}

impl EnvConfig {
    /// Return a serializable summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        let log_format = match self.log.format {
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        };
        EffectiveConfig {
            config_path: self.config_path.display().to_string(),
            env_prefix: self.env_prefix.clone(),
            log_format: log_format.to_string(),
            log_level: self.log.level.clone(),
            log_file: self.log.output_path.as_ref().map(|p| p.display().to_string()),
            strict: self.strict,
        }
    }
}
