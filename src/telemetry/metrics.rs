// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Metric recording helpers.
//!
//! Calls are no-ops until a recorder is installed.

/// Count a successful deploy. Degraded deploys are labelled separately.
pub fn record_deploy_success(degraded: bool) {
    let outcome = if degraded { "degraded" } else { "published" };
    metrics::counter!("dspool_deploy_success_total", "outcome" => outcome).increment(1);
}

pub fn record_deploy_failure(reason: &'static str) {
    metrics::counter!("dspool_deploy_failure_total", "reason" => reason).increment(1);
}

pub fn record_pool_closed() {
    metrics::counter!("dspool_pools_closed_total").increment(1);
}

pub fn record_config_diagnostic(kind: &'static str) {
    metrics::counter!("dspool_config_diagnostics_total", "kind" => kind).increment(1);
}

pub fn set_live_pools(count: usize) {
    metrics::gauge!("dspool_pools_live").set(count as f64);
}
