// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Config CLI subcommands: show, defaults.
//!
//! These commands read configuration directly from environment variables.

use crate::config::{self, EffectiveConfig};

/// Print effective config as key-value pairs to stdout.
pub fn run_show() {
    let cfg = config::load().effective_config();
    print_config(&cfg);
}

/// Print default config values (no env overrides) to stdout.
pub fn run_defaults() {
    println!("DSPOOL_CONFIG_PATH={}", config::DEFAULT_CONFIG_PATH);
    println!("DSPOOL_ENV_PREFIX={}", config::DEFAULT_ENV_PREFIX);
    println!("DSPOOL_LOG_FORMAT=json");
    println!("DSPOOL_LOG_LEVEL=info");
    println!("DSPOOL_LOG_FILE=");
    println!("DSPOOL_STRICT=false");
}

fn print_config(cfg: &EffectiveConfig) {
    println!("DSPOOL_CONFIG_PATH={}", cfg.config_path);
    println!("DSPOOL_ENV_PREFIX={}", cfg.env_prefix);
    println!("DSPOOL_LOG_FORMAT={}", cfg.log_format);
    println!("DSPOOL_LOG_LEVEL={}", cfg.log_level);
    println!("DSPOOL_LOG_FILE={}", cfg.log_file.as_deref().unwrap_or(""));
    println!("DSPOOL_STRICT={}", cfg.strict);
}
