// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Health reporting over deployed pools.
//!
//! Provides liveness, readiness, and a full health report for orchestrator
//! integration (Kubernetes, systemd).

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::pool::PoolCounts;

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Detailed health report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub state: HealthState,
    pub ready: bool,
    pub pools_published: usize,
    pub pools_degraded: usize,
    pub pools_failed: usize,
    pub pools_closed: usize,
    pub uptime_secs: u64,
}

#[derive(Debug, Clone, Default)]
pub struct HealthConfig {
    /// Not ready until at least one pool is live.
    pub require_pool: bool,
}

/// Aggregates health information from the lifecycle manager.
pub struct HealthChecker {
    config: HealthConfig,
    start_time: Instant,
}

impl HealthChecker {
    pub fn new(config: HealthConfig) -> Self {
        Self {
            config,
            start_time: Instant::now(),
        }
    }

    pub fn is_alive(&self) -> bool {
        true
    }

    /// Ready when running and, if required, at least one pool is live.
    pub fn is_ready(&self, running: bool, counts: &PoolCounts) -> bool {
        if !running {
            return false;
        }
        !(self.config.require_pool && counts.live() == 0)
    }

    pub fn report(&self, running: bool, counts: &PoolCounts) -> HealthReport {
        HealthReport {
            state: self.compute_state(running, counts),
            ready: self.is_ready(running, counts),
            pools_published: counts.published,
            pools_degraded: counts.degraded,
            pools_failed: counts.failed,
            pools_closed: counts.closed,
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }

    fn compute_state(&self, running: bool, counts: &PoolCounts) -> HealthState {
        if !running {
            return HealthState::Unhealthy;
        }
        if counts.live() == 0 && counts.failed > 0 {
            return HealthState::Unhealthy;
        }
        if counts.degraded > 0 || counts.failed > 0 {
            return HealthState::Degraded;
        }
        if self.config.require_pool && counts.live() == 0 {
            return HealthState::Degraded;
        }
        HealthState::Healthy
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new(HealthConfig::default())
    }
}
