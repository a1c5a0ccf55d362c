// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! DSPOOL-CORE
//!
//! Discovers datasource definitions in a flat configuration namespace and
//! turns them into live, transaction-aware connection pools published under
//! a lookup name.
//!
//! # Flow
//!
//! - [`datasource::DatasourceConfigRegistry`] scans `datasource.<id>.<key>`
//!   properties into immutable [`datasource::PoolDescriptor`]s
//! - [`pool::PoolLifecycleManager`] resolves drivers, builds and publishes
//!   pools, and closes them on stop
//!
//! Drivers, naming, transactions and the pooling library sit behind traits;
//! [`InMemoryServices`] wires the in-process implementations together.

pub mod cli;
pub mod config;
pub mod datasource;
pub mod driver;
pub mod health;
pub mod naming;
pub mod pool;
pub mod source;
pub mod telemetry;
pub mod transaction;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use datasource::DatasourceConfigRegistry;
use driver::InMemoryDriverRegistry;
use health::{HealthChecker, HealthConfig, HealthReport};
use naming::InMemoryNamingContext;
use pool::{DeploymentReport, ManagedPoolFactory, PoolCollaborators, PoolLifecycleManager};
use source::ConfigSource;
use transaction::{LocalSynchronizationRegistry, LocalTransactionManager};

/// In-process collaborators with handles kept for inspection.
#[derive(Clone)]
pub struct InMemoryServices {
    pub drivers: Arc<InMemoryDriverRegistry>,
    pub naming: Arc<InMemoryNamingContext>,
}

impl InMemoryServices {
    pub fn new(drivers: InMemoryDriverRegistry) -> Self {
        Self {
            drivers: Arc::new(drivers),
            naming: Arc::new(InMemoryNamingContext::new()),
        }
    }

    /// Drivers read from `driver.<id>.*` properties of `source`.
    pub fn from_source(source: &dyn ConfigSource) -> Self {
        Self::new(InMemoryDriverRegistry::from_source(source))
    }

    pub fn collaborators(&self) -> PoolCollaborators {
        PoolCollaborators {
            drivers: self.drivers.clone(),
            naming: self.naming.clone(),
            pool_factory: Arc::new(ManagedPoolFactory::new()),
            transaction_manager: Arc::new(LocalTransactionManager::default()),
            synchronization_registry: Arc::new(LocalSynchronizationRegistry::default()),
        }
    }
}

/// Registry plus lifecycle manager, started together.
pub struct DatasourceRuntime {
    pub registry: DatasourceConfigRegistry,
    pub manager: PoolLifecycleManager,
    report: DeploymentReport,
    health: HealthChecker,
    running: AtomicBool,
}

impl DatasourceRuntime {
    /// Scan `source` and deploy every datasource found.
    pub fn start(source: &dyn ConfigSource, collaborators: PoolCollaborators) -> Self {
        Self::start_with_health(source, collaborators, HealthConfig::default())
    }

    pub fn start_with_health(
        source: &dyn ConfigSource,
        collaborators: PoolCollaborators,
        health: HealthConfig,
    ) -> Self {
        let registry = DatasourceConfigRegistry::scan(source);
        let manager = PoolLifecycleManager::new(collaborators);
        let report = manager.deploy_all(&registry);
        tracing::info!(
            published = report.published(),
            degraded = report.degraded(),
            failed = report.failed(),
            "datasource runtime started"
        );
        Self {
            registry,
            manager,
            report,
            health: HealthChecker::new(health),
            running: AtomicBool::new(true),
        }
    }

    pub fn report(&self) -> &DeploymentReport {
        &self.report
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn health(&self) -> HealthReport {
        self.health.report(self.is_running(), &self.manager.counts())
    }

    /// Close every pool. Later calls are no-ops.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            self.manager.stop();
            tracing::info!("datasource runtime stopped");
        }
    }
}
