// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Pool lifecycle: deploy descriptors into live pools and close them.
//!
//! Deploy runs in order:
//! 1. Resolve the driver id, then its provider class
//! 2. Check the provider capability against the `xa` flag
//! 3. Build the pool configuration (URL, provider, credentials, transactions)
//! 4. Build the pool and bind it under the lookup name
//!
//! A failed bind leaves the pool live and owned (`Degraded`). Stopping a
//! pool unbinds its lookup name (if this manager bound it) before closing.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use super::config::{ConnectionFactoryConfig, Credential, PoolConfiguration, Principal};
use super::error::DeployError;
use super::managed::{PoolFactory, PooledDataSource};
use crate::datasource::{DatasourceConfigRegistry, PoolDescriptor};
use crate::driver::{DriverRegistry, ProviderCapability, ProviderClass};
use crate::naming::{NamingError, NamingService};
use crate::telemetry::{
    record_deploy_failure, record_deploy_success, record_pool_closed, set_live_pools, DeploySpan,
    SpanExt,
};
use crate::transaction::{
    TransactionIntegration, TransactionManager, TransactionSynchronizationRegistry,
};

/// Per-datasource lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolState {
    Undeployed,
    DeployFailed,
    /// Pool live and bound under its lookup name.
    Published,
    /// Pool live but the bind failed.
    Degraded,
    Closed,
}

impl PoolState {
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Published | Self::Degraded)
    }
}

/// External services the manager deploys against.
#[derive(Clone)]
pub struct PoolCollaborators {
    pub drivers: Arc<dyn DriverRegistry>,
    pub naming: Arc<dyn NamingService>,
    pub pool_factory: Arc<dyn PoolFactory>,
    pub transaction_manager: Arc<dyn TransactionManager>,
    pub synchronization_registry: Arc<dyn TransactionSynchronizationRegistry>,
}

/// Result of a successful deploy.
#[derive(Clone)]
pub struct Deployment {
    pub id: String,
    pub lookup_name: String,
    pub state: PoolState,
    pub publish_error: Option<NamingError>,
    pub pool: Arc<dyn PooledDataSource>,
    pub deployed_at: DateTime<Utc>,
}

impl fmt::Debug for Deployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deployment")
            .field("id", &self.id)
            .field("lookup_name", &self.lookup_name)
            .field("state", &self.state)
            .field("publish_error", &self.publish_error)
            .field("deployed_at", &self.deployed_at)
            .finish()
    }
}

/// Outcome of one datasource in [`PoolLifecycleManager::deploy_all`].
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentOutcome {
    pub id: String,
    pub lookup_name: String,
    pub state: PoolState,
    pub error: Option<String>,
    pub declined: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeploymentReport {
    pub outcomes: Vec<DeploymentOutcome>,
}

impl DeploymentReport {
    pub fn count(&self, state: PoolState) -> usize {
        self.outcomes.iter().filter(|o| o.state == state).count()
    }

    pub fn published(&self) -> usize {
        self.count(PoolState::Published)
    }

    pub fn degraded(&self) -> usize {
        self.count(PoolState::Degraded)
    }

    pub fn failed(&self) -> usize {
        self.count(PoolState::DeployFailed)
    }

    /// True when every datasource was published.
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(|o| o.state == PoolState::Published)
    }

    pub fn outcome(&self, id: &str) -> Option<&DeploymentOutcome> {
        self.outcomes.iter().find(|o| o.id == id)
    }
}

/// Snapshot of pool states across all datasources seen by a manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolCounts {
    pub published: usize,
    pub degraded: usize,
    pub failed: usize,
    pub closed: usize,
}

impl PoolCounts {
    pub fn live(&self) -> usize {
        self.published + self.degraded
    }
}

struct PoolSlot {
    state: PoolState,
    pool: Option<Arc<dyn PooledDataSource>>,
    /// Lookup name this manager bound; `None` for degraded pools.
    bound_name: Option<String>,
}

impl PoolSlot {
    fn take_live(&mut self) -> Option<LivePool> {
        let pool = self.pool.take()?;
        self.state = PoolState::Closed;
        Some(LivePool {
            pool,
            bound_name: self.bound_name.take(),
        })
    }
}

struct LivePool {
    pool: Arc<dyn PooledDataSource>,
    bound_name: Option<String>,
}

/// Owns the live pools created from descriptors.
pub struct PoolLifecycleManager {
    collaborators: PoolCollaborators,
    slots: Mutex<HashMap<String, PoolSlot>>,
}

impl PoolLifecycleManager {
    pub fn new(collaborators: PoolCollaborators) -> Self {
        Self {
            collaborators,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Deploy one descriptor into a live, published pool.
    pub fn deploy(&self, descriptor: &PoolDescriptor) -> Result<Deployment, DeployError> {
        let span = DeploySpan::new(descriptor.id(), descriptor.driver_id());
        let _entered = span.enter();

        let result = self.try_deploy(descriptor);
        span.record_result(&result);

        match &result {
            Ok(deployment) => {
                record_deploy_success(deployment.state == PoolState::Degraded);
            }
            Err(e) => {
                if e.is_declined() {
                    tracing::warn!("{}", e);
                } else {
                    tracing::error!("{}", e);
                }
                record_deploy_failure(e.reason());
                if !matches!(e, DeployError::AlreadyDeployed(_) | DeployError::Closed(_)) {
                    self.mark_failed(descriptor.id());
                }
            }
        }
        result
    }

    fn try_deploy(&self, descriptor: &PoolDescriptor) -> Result<Deployment, DeployError> {
        let id = descriptor.id();
        match self.state(id) {
            PoolState::Published | PoolState::Degraded => {
                return Err(DeployError::AlreadyDeployed(id.to_string()))
            }
            PoolState::Closed => return Err(DeployError::Closed(id.to_string())),
            PoolState::Undeployed | PoolState::DeployFailed => {}
        }

        let provider = self.resolve_provider(descriptor)?;
        check_capability(descriptor, &provider)?;

        let config = self.pool_configuration(descriptor, provider);
        let pool = self.collaborators.pool_factory.build_pool(config)?;

        let lookup_name = descriptor.lookup_name().to_string();
        let (state, publish_error) =
            match self.collaborators.naming.bind(&lookup_name, pool.clone()) {
                Ok(()) => (PoolState::Published, None),
                Err(e) => {
                    tracing::error!(
                        datasource = %id,
                        lookup_name = %lookup_name,
                        "publish failed, pool stays live but unbound: {}",
                        e
                    );
                    (PoolState::Degraded, Some(e))
                }
            };

        {
            let mut slots = self.slots.lock();
            if slots.get(id).map(|s| s.state.is_live()).unwrap_or(false) {
                drop(slots);
                if publish_error.is_none() {
                    let _ = self.collaborators.naming.unbind(&lookup_name);
                }
                pool.close();
                return Err(DeployError::AlreadyDeployed(id.to_string()));
            }
            slots.insert(
                id.to_string(),
                PoolSlot {
                    state,
                    pool: Some(pool.clone()),
                    bound_name: publish_error.is_none().then(|| lookup_name.clone()),
                },
            );
            set_live_pools(live_count(&slots));
        }

        tracing::info!(
            datasource = %id,
            lookup_name = %lookup_name,
            "Started data source {}",
            descriptor.connection_url()
        );

        Ok(Deployment {
            id: id.to_string(),
            lookup_name,
            state,
            publish_error,
            pool,
            deployed_at: Utc::now(),
        })
    }

    fn resolve_provider(&self, descriptor: &PoolDescriptor) -> Result<ProviderClass, DeployError> {
        let id = descriptor.id();
        let driver = self
            .collaborators
            .drivers
            .lookup(descriptor.driver_id())
            .ok_or_else(|| DeployError::MissingDriver {
                id: id.to_string(),
                driver: descriptor.driver_id().to_string(),
            })?;

        let class_name = driver.driver_class_name.trim();
        if class_name.is_empty() {
            return Err(DeployError::DriverClassAbsent {
                id: id.to_string(),
                driver: driver.id,
            });
        }

        self.collaborators
            .drivers
            .resolve_provider(class_name)
            .ok_or_else(|| DeployError::DriverResolution {
                id: id.to_string(),
                class_name: class_name.to_string(),
            })
    }

    /// Assemble the pool configuration for `descriptor`.
    ///
    /// Transaction integration is attached when `jta` or `xa` is set.
    pub fn pool_configuration(
        &self,
        descriptor: &PoolDescriptor,
        provider: ProviderClass,
    ) -> PoolConfiguration {
        let mut factory = ConnectionFactoryConfig::new(descriptor.connection_url(), provider);
        if let Some(username) = descriptor.username() {
            factory = factory.with_principal(Principal::new(username));
        }
        if let Some(password) = descriptor.password() {
            factory = factory.with_credential(Credential::new(password));
        }

        let mut config = PoolConfiguration::new(factory).with_trace_mode(descriptor.trace_mode());
        if descriptor.requires_transaction_integration() {
            config = config.with_transaction_integration(TransactionIntegration::new(
                self.collaborators.transaction_manager.clone(),
                self.collaborators.synchronization_registry.clone(),
                descriptor.is_connectable(),
            ));
        }
        config
    }

    /// Deploy every descriptor in `registry`; failures never block others.
    pub fn deploy_all(&self, registry: &DatasourceConfigRegistry) -> DeploymentReport {
        let mut report = DeploymentReport::default();
        for descriptor in registry {
            let outcome = match self.deploy(descriptor) {
                Ok(deployment) => DeploymentOutcome {
                    id: deployment.id,
                    lookup_name: deployment.lookup_name,
                    state: deployment.state,
                    error: deployment.publish_error.map(|e| e.to_string()),
                    declined: false,
                },
                Err(e) => DeploymentOutcome {
                    id: descriptor.id().to_string(),
                    lookup_name: descriptor.lookup_name().to_string(),
                    state: self.state(descriptor.id()),
                    error: Some(e.to_string()),
                    declined: e.is_declined(),
                },
            };
            report.outcomes.push(outcome);
        }
        report
    }

    fn mark_failed(&self, id: &str) {
        let mut slots = self.slots.lock();
        let slot = slots.entry(id.to_string()).or_insert(PoolSlot {
            state: PoolState::Undeployed,
            pool: None,
            bound_name: None,
        });
        if matches!(slot.state, PoolState::Undeployed | PoolState::DeployFailed) {
            slot.state = PoolState::DeployFailed;
        }
    }

    /// Unbind and close every owned pool. Safe to call repeatedly.
    pub fn stop(&self) {
        let pools: Vec<(String, LivePool)> = {
            let mut slots = self.slots.lock();
            let taken = slots
                .iter_mut()
                .filter_map(|(id, slot)| slot.take_live().map(|live| (id.clone(), live)))
                .collect();
            set_live_pools(0);
            taken
        };

        for (id, live) in pools {
            self.release(&id, live);
        }
    }

    /// Unbind and close a single pool. Returns `true` if a live pool was closed.
    pub fn stop_pool(&self, id: &str) -> bool {
        let live = {
            let mut slots = self.slots.lock();
            let live = slots.get_mut(id).and_then(PoolSlot::take_live);
            set_live_pools(live_count(&slots));
            live
        };

        match live {
            Some(live) => {
                self.release(id, live);
                true
            }
            None => false,
        }
    }

    fn release(&self, id: &str, live: LivePool) {
        if let Some(name) = &live.bound_name {
            if let Err(e) = self.collaborators.naming.unbind(name) {
                tracing::warn!(datasource = %id, lookup_name = %name, "unbind failed: {}", e);
            }
        }
        live.pool.close();
        record_pool_closed();
        tracing::info!(datasource = %id, "Stopped data source");
    }

    pub fn state(&self, id: &str) -> PoolState {
        self.slots
            .lock()
            .get(id)
            .map(|slot| slot.state)
            .unwrap_or(PoolState::Undeployed)
    }

    /// Live pool for `id`, if any.
    pub fn pool(&self, id: &str) -> Option<Arc<dyn PooledDataSource>> {
        self.slots.lock().get(id).and_then(|slot| slot.pool.clone())
    }

    pub fn counts(&self) -> PoolCounts {
        let slots = self.slots.lock();
        let mut counts = PoolCounts::default();
        for slot in slots.values() {
            match slot.state {
                PoolState::Published => counts.published += 1,
                PoolState::Degraded => counts.degraded += 1,
                PoolState::DeployFailed => counts.failed += 1,
                PoolState::Closed => counts.closed += 1,
                PoolState::Undeployed => {}
            }
        }
        counts
    }
}

impl Drop for PoolLifecycleManager {
    fn drop(&mut self) {
        self.stop();
    }
}

fn live_count(slots: &HashMap<String, PoolSlot>) -> usize {
    slots.values().filter(|s| s.pool.is_some()).count()
}

/// `xa` needs an XA provider; everything else needs a plain one.
fn check_capability(descriptor: &PoolDescriptor, provider: &ProviderClass) -> Result<(), DeployError> {
    let expected = if descriptor.is_xa() {
        ProviderCapability::Xa
    } else {
        ProviderCapability::Plain
    };
    if provider.capability != expected {
        return Err(DeployError::CapabilityMismatch {
            id: descriptor.id().to_string(),
            class_name: provider.class_name.clone(),
            expected,
            actual: provider.capability,
        });
    }
    Ok(())
}
