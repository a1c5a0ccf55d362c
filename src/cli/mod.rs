// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI module for DSPOOL-CORE commands.
//!
//! ## Usage
//!
//! ```bash
//! dspool-core serve [PATH]             # Deploy all datasources, wait for Ctrl-C
//! dspool-core validate [PATH]          # Scan only, report diagnostics
//! dspool-core list [PATH] [--json]     # Print discovered datasources
//! dspool-core config show              # Effective runtime configuration
//! dspool-core config defaults          # Default values
//! ```

pub mod config_cmd;
pub mod datasources_cmd;
pub mod serve_cmd;

use std::path::{Path, PathBuf};

use crate::config::EnvConfig;
use crate::source::{MapConfigSource, SourceError};

/// Exit code for configuration load failures.
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Pick the config path: the first argument that is not a `--flag`, then
/// the env setting.
pub fn resolve_config_path<S: AsRef<str>>(args: &[S], env: &EnvConfig) -> PathBuf {
    args.iter()
        .map(AsRef::as_ref)
        .find(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| env.config_path.clone())
}

/// Load the datasource source from `path` with the env overlay applied.
pub fn load_source(path: &Path, env_prefix: &str) -> Result<MapConfigSource, SourceError> {
    Ok(MapConfigSource::from_file(path)?.with_env_overlay(env_prefix))
}
