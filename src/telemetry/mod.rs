// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Telemetry for DSPOOL-CORE.
//!
//! Structured logging, deploy spans, and metrics through the `metrics` facade.
//! No exporter is installed here; the embedding process picks one.

mod logging;
mod metrics;
mod spans;

pub use self::logging::{init_logging, LogConfig, LogError, LogFormat};
pub use self::metrics::{
    record_config_diagnostic, record_deploy_failure, record_deploy_success, record_pool_closed,
    set_live_pools,
};
pub use self::spans::{DeploySpan, SpanExt};
