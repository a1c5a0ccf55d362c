//! Tests for PoolLifecycleManager - deploy, publish and stop of live pools.

use dspool_core::datasource::{DatasourceConfigRegistry, PoolDescriptor, TraceMode};
use dspool_core::driver::{InMemoryDriverRegistry, ProviderCapability};
use dspool_core::naming::{InMemoryNamingContext, NamingError, NamingService};
use dspool_core::pool::{
    DeployError, ManagedPoolFactory, PoolCollaborators, PoolConfiguration,
    PoolConstructionError, PoolFactory, PoolLifecycleManager, PoolState, PooledDataSource,
};
use dspool_core::source::MapConfigSource;
use dspool_core::transaction::{LocalSynchronizationRegistry, LocalTransactionManager};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Fakes
// ============================================================================

/// Pool factory that records every configuration it is asked to build.
#[derive(Default)]
struct RecordingFactory {
    built: Mutex<Vec<PoolConfiguration>>,
    fail: bool,
}

impl RecordingFactory {
    fn failing() -> Self {
        Self {
            built: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn calls(&self) -> usize {
        self.built.lock().unwrap().len()
    }

    fn last(&self) -> PoolConfiguration {
        self.built.lock().unwrap().last().cloned().unwrap()
    }
}

impl PoolFactory for RecordingFactory {
    fn build_pool(
        &self,
        config: PoolConfiguration,
    ) -> Result<Arc<dyn PooledDataSource>, PoolConstructionError> {
        self.built.lock().unwrap().push(config.clone());
        if self.fail {
            return Err(PoolConstructionError::Provider("connection refused".into()));
        }
        ManagedPoolFactory::new().build_pool(config)
    }
}

/// Naming service that rejects every bind.
struct UnavailableNaming {
    attempts: AtomicUsize,
}

impl NamingService for UnavailableNaming {
    fn bind(&self, _name: &str, _resource: Arc<dyn PooledDataSource>) -> Result<(), NamingError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(NamingError::Unavailable("naming offline".into()))
    }

    fn unbind(&self, name: &str) -> Result<(), NamingError> {
        panic!("unbind called for {} although nothing was bound", name);
    }
}

struct Fixture {
    drivers: Arc<InMemoryDriverRegistry>,
    naming: Arc<InMemoryNamingContext>,
    factory: Arc<RecordingFactory>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_factory(RecordingFactory::default())
    }

    fn with_factory(factory: RecordingFactory) -> Self {
        let drivers = InMemoryDriverRegistry::new();
        drivers.register("h2", "org.h2.Driver", ProviderCapability::Plain);
        drivers.register("h2xa", "org.h2.jdbcx.JdbcDataSource", ProviderCapability::Xa);
        Self {
            drivers: Arc::new(drivers),
            naming: Arc::new(InMemoryNamingContext::new()),
            factory: Arc::new(factory),
        }
    }

    fn collaborators(&self) -> PoolCollaborators {
        self.collaborators_with_naming(self.naming.clone())
    }

    fn collaborators_with_naming(&self, naming: Arc<dyn NamingService>) -> PoolCollaborators {
        PoolCollaborators {
            drivers: self.drivers.clone(),
            naming,
            pool_factory: self.factory.clone(),
            transaction_manager: Arc::new(LocalTransactionManager::new("test-tm")),
            synchronization_registry: Arc::new(LocalSynchronizationRegistry::new("test-tsr")),
        }
    }

    fn manager(&self) -> PoolLifecycleManager {
        PoolLifecycleManager::new(self.collaborators())
    }
}

fn descriptor(id: &str, driver: &str) -> PoolDescriptor {
    PoolDescriptor::builder(id)
        .driver(driver)
        .connection_url(format!("jdbc:h2:mem:{}", id))
        .build()
        .unwrap()
}

// ============================================================================
// Successful deploys
// ============================================================================

#[test]
fn test_deploy_publishes_pool() {
    let fx = Fixture::new();
    let manager = fx.manager();

    let deployment = manager.deploy(&descriptor("orders", "h2")).unwrap();
    assert_eq!(deployment.state, PoolState::Published);
    assert_eq!(deployment.lookup_name, "java:jboss/datasources/orders");
    assert!(deployment.publish_error.is_none());
    assert!(!deployment.pool.is_closed());

    assert!(fx.naming.lookup("java:jboss/datasources/orders").is_some());
    assert_eq!(manager.state("orders"), PoolState::Published);
    assert!(manager.pool("orders").is_some());
}

#[test]
fn test_configuration_carries_url_provider_and_credentials() {
    let fx = Fixture::new();
    let manager = fx.manager();
    let ds = PoolDescriptor::builder("orders")
        .driver("h2")
        .connection_url("jdbc:example://host/db")
        .username("sa")
        .password("secret")
        .trace_mode(TraceMode::On)
        .build()
        .unwrap();

    manager.deploy(&ds).unwrap();
    let config = fx.factory.last();
    let factory = &config.connection_factory;
    assert_eq!(factory.jdbc_url, "jdbc:example://host/db");
    assert_eq!(factory.provider.class_name, "org.h2.Driver");
    assert_eq!(factory.principal.as_ref().map(|p| p.name()), Some("sa"));
    assert_eq!(factory.credential.as_ref().map(|c| c.expose()), Some("secret"));
    assert_eq!(config.trace_mode, TraceMode::On);
}

#[test]
fn test_no_credentials_when_unset() {
    let fx = Fixture::new();
    fx.manager().deploy(&descriptor("orders", "h2")).unwrap();
    let config = fx.factory.last();
    assert!(config.connection_factory.principal.is_none());
    assert!(config.connection_factory.credential.is_none());
}

#[test]
fn test_jta_attaches_transaction_integration() {
    let fx = Fixture::new();
    let ds = PoolDescriptor::builder("orders")
        .driver("h2")
        .connection_url("jdbc:h2:mem:orders")
        .connectable(true)
        .build()
        .unwrap();
    fx.manager().deploy(&ds).unwrap();

    let integration = fx.factory.last().transaction_integration.unwrap();
    assert!(integration.connectable);
    assert_eq!(integration.transaction_manager.name(), "test-tm");
    assert_eq!(integration.synchronization_registry.name(), "test-tsr");
}

#[test]
fn test_xa_attaches_transaction_integration_without_jta() {
    let fx = Fixture::new();
    let ds = PoolDescriptor::builder("orders")
        .driver("h2xa")
        .connection_url("jdbc:h2:mem:orders")
        .jta(false)
        .xa(true)
        .build()
        .unwrap();
    fx.manager().deploy(&ds).unwrap();
    assert!(fx.factory.last().is_transactional());
}

#[test]
fn test_plain_pool_has_no_transaction_integration() {
    let fx = Fixture::new();
    let ds = PoolDescriptor::builder("orders")
        .driver("h2")
        .connection_url("jdbc:h2:mem:orders")
        .jta(false)
        .xa(false)
        .build()
        .unwrap();
    let deployment = fx.manager().deploy(&ds).unwrap();

    assert!(deployment.pool.configuration().transaction_integration.is_none());
    assert!(!fx.factory.last().is_transactional());
}

// ============================================================================
// Declined and failed deploys
// ============================================================================

#[test]
fn test_missing_driver_declines() {
    let fx = Fixture::new();
    let manager = fx.manager();

    let err = manager.deploy(&descriptor("orders", "oracle")).unwrap_err();
    assert!(matches!(err, DeployError::MissingDriver { ref driver, .. } if driver == "oracle"));
    assert!(err.is_declined());
    assert_eq!(fx.factory.calls(), 0);
    assert_eq!(manager.state("orders"), PoolState::DeployFailed);
    assert!(manager.pool("orders").is_none());
}

#[test]
fn test_unresolvable_provider_class() {
    let fx = Fixture::new();
    fx.drivers.register_driver("pg", "org.postgresql.Driver");
    let manager = fx.manager();

    let err = manager.deploy(&descriptor("orders", "pg")).unwrap_err();
    assert!(matches!(
        err,
        DeployError::DriverResolution { ref class_name, .. } if class_name == "org.postgresql.Driver"
    ));
    assert!(err.is_declined());
    assert_eq!(fx.factory.calls(), 0);
}

#[test]
fn test_absent_driver_class_is_explicit() {
    let fx = Fixture::new();
    fx.drivers.register_driver("blank", "  ");
    let err = fx.manager().deploy(&descriptor("orders", "blank")).unwrap_err();
    assert!(matches!(err, DeployError::DriverClassAbsent { .. }));
    assert_eq!(fx.factory.calls(), 0);
}

#[test]
fn test_xa_with_plain_driver_is_capability_mismatch() {
    let fx = Fixture::new();
    let manager = fx.manager();
    let ds = PoolDescriptor::builder("orders")
        .driver("h2")
        .connection_url("jdbc:h2:mem:orders")
        .xa(true)
        .build()
        .unwrap();

    let err = manager.deploy(&ds).unwrap_err();
    assert!(matches!(
        err,
        DeployError::CapabilityMismatch {
            expected: ProviderCapability::Xa,
            actual: ProviderCapability::Plain,
            ..
        }
    ));
    assert!(!err.is_declined());
    assert_eq!(fx.factory.calls(), 0, "no pool may be half-constructed");
    assert!(fx.naming.is_empty());
    assert!(manager.pool("orders").is_none());
    assert_eq!(manager.state("orders"), PoolState::DeployFailed);
}

#[test]
fn test_non_xa_with_xa_driver_is_capability_mismatch() {
    let fx = Fixture::new();
    let err = fx.manager().deploy(&descriptor("orders", "h2xa")).unwrap_err();
    assert!(matches!(
        err,
        DeployError::CapabilityMismatch { expected: ProviderCapability::Plain, .. }
    ));
}

#[test]
fn test_pool_construction_error_surfaced() {
    let fx = Fixture::with_factory(RecordingFactory::failing());
    let manager = fx.manager();

    let err = manager.deploy(&descriptor("orders", "h2")).unwrap_err();
    assert_eq!(
        err,
        DeployError::PoolConstruction(PoolConstructionError::Provider("connection refused".into()))
    );
    assert!(fx.naming.is_empty());
    assert_eq!(manager.state("orders"), PoolState::DeployFailed);
}

#[test]
fn test_failed_deploy_can_be_retried() {
    let fx = Fixture::new();
    let manager = fx.manager();

    assert!(manager.deploy(&descriptor("orders", "pg")).is_err());
    fx.drivers.register("pg", "org.postgresql.Driver", ProviderCapability::Plain);
    let deployment = manager.deploy(&descriptor("orders", "pg")).unwrap();
    assert_eq!(deployment.state, PoolState::Published);
}

// ============================================================================
// Degraded publish
// ============================================================================

#[test]
fn test_publish_failure_is_degraded_not_rolled_back() {
    let fx = Fixture::new();
    let naming = Arc::new(UnavailableNaming {
        attempts: AtomicUsize::new(0),
    });
    let manager = PoolLifecycleManager::new(fx.collaborators_with_naming(naming.clone()));

    let deployment = manager.deploy(&descriptor("orders", "h2")).unwrap();
    assert_eq!(deployment.state, PoolState::Degraded);
    assert_eq!(
        deployment.publish_error,
        Some(NamingError::Unavailable("naming offline".into()))
    );
    assert!(!deployment.pool.is_closed());
    assert_eq!(naming.attempts.load(Ordering::SeqCst), 1);
    assert_eq!(manager.state("orders"), PoolState::Degraded);

    manager.stop();
    assert!(deployment.pool.is_closed());
    assert_eq!(manager.state("orders"), PoolState::Closed);
}

#[test]
fn test_lookup_name_collision_degrades_second_pool() {
    let fx = Fixture::new();
    let manager = fx.manager();
    let first = PoolDescriptor::builder("a")
        .driver("h2")
        .connection_url("jdbc:h2:mem:a")
        .lookup_name("java:/Shared")
        .build()
        .unwrap();
    let second = PoolDescriptor::builder("b")
        .driver("h2")
        .connection_url("jdbc:h2:mem:b")
        .lookup_name("java:/Shared")
        .build()
        .unwrap();

    assert_eq!(manager.deploy(&first).unwrap().state, PoolState::Published);
    let deployment = manager.deploy(&second).unwrap();
    assert_eq!(deployment.state, PoolState::Degraded);
    assert!(matches!(deployment.publish_error, Some(NamingError::AlreadyBound(_))));

    // Stopping the degraded pool must not unbind the name held by "a".
    assert!(manager.stop_pool("b"));
    let bound = fx.naming.lookup("java:/Shared").unwrap();
    assert!(!bound.is_closed());

    manager.stop();
    assert!(fx.naming.lookup("java:/Shared").is_none());
}

// ============================================================================
// Ownership and stop
// ============================================================================

#[test]
fn test_deploy_twice_is_rejected() {
    let fx = Fixture::new();
    let manager = fx.manager();
    manager.deploy(&descriptor("orders", "h2")).unwrap();

    let err = manager.deploy(&descriptor("orders", "h2")).unwrap_err();
    assert_eq!(err, DeployError::AlreadyDeployed("orders".into()));
    assert_eq!(fx.factory.calls(), 1);
    assert_eq!(manager.state("orders"), PoolState::Published);
}

#[test]
fn test_stop_closes_every_pool_once() {
    let fx = Fixture::new();
    let manager = fx.manager();
    let a = manager.deploy(&descriptor("a", "h2")).unwrap();
    let b = manager.deploy(&descriptor("b", "h2")).unwrap();

    manager.stop();
    assert!(a.pool.is_closed());
    assert!(b.pool.is_closed());
    assert!(fx.naming.is_empty(), "stopped pools stay bound: {:?}", fx.naming.names());
    assert_eq!(manager.state("a"), PoolState::Closed);
    assert_eq!(manager.state("b"), PoolState::Closed);
    assert_eq!(manager.counts().closed, 2);

    manager.stop();
    assert_eq!(manager.counts().closed, 2);
}

#[test]
fn test_stop_without_deploy_is_noop() {
    let fx = Fixture::new();
    let manager = fx.manager();
    manager.stop();
    manager.stop();
    assert_eq!(manager.state("orders"), PoolState::Undeployed);
}

#[test]
fn test_stop_after_failed_deploy_is_noop() {
    let fx = Fixture::new();
    let manager = fx.manager();
    let _ = manager.deploy(&descriptor("orders", "missing"));
    manager.stop();
    assert_eq!(manager.state("orders"), PoolState::DeployFailed);
}

#[test]
fn test_closed_pool_cannot_be_redeployed() {
    let fx = Fixture::new();
    let manager = fx.manager();
    manager.deploy(&descriptor("orders", "h2")).unwrap();
    manager.stop();

    let err = manager.deploy(&descriptor("orders", "h2")).unwrap_err();
    assert_eq!(err, DeployError::Closed("orders".into()));
    assert_eq!(manager.state("orders"), PoolState::Closed);
}

#[test]
fn test_stop_pool_single() {
    let fx = Fixture::new();
    let manager = fx.manager();
    let a = manager.deploy(&descriptor("a", "h2")).unwrap();
    let b = manager.deploy(&descriptor("b", "h2")).unwrap();

    assert!(manager.stop_pool("a"));
    assert!(!manager.stop_pool("a"));
    assert!(!manager.stop_pool("unknown"));
    assert!(a.pool.is_closed());
    assert!(!b.pool.is_closed());
    assert_eq!(fx.naming.names(), vec!["java:jboss/datasources/b".to_string()]);
    assert_eq!(manager.counts().live(), 1);
}

#[test]
fn test_stop_from_another_thread() {
    let fx = Fixture::new();
    let manager = Arc::new(fx.manager());
    let deployment = manager.deploy(&descriptor("orders", "h2")).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let m = manager.clone();
            std::thread::spawn(move || m.stop())
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert!(deployment.pool.is_closed());
    assert_eq!(manager.counts().closed, 1);
}

#[test]
fn test_drop_closes_pools() {
    let fx = Fixture::new();
    let pool = {
        let manager = fx.manager();
        manager.deploy(&descriptor("orders", "h2")).unwrap().pool
    };
    assert!(pool.is_closed());
}

// ============================================================================
// deploy_all
// ============================================================================

#[test]
fn test_deploy_all_isolates_failures() {
    let fx = Fixture::new();
    let manager = fx.manager();
    let source = MapConfigSource::new()
        .with("datasource.good.driver", "h2")
        .with("datasource.good.connection-url", "jdbc:h2:mem:good")
        .with("datasource.nodriver.driver", "oracle")
        .with("datasource.nodriver.connection-url", "jdbc:oracle:thin:@db")
        .with("datasource.wrongcap.driver", "h2xa")
        .with("datasource.wrongcap.connection-url", "jdbc:h2:mem:wrongcap");
    let registry = DatasourceConfigRegistry::scan(&source);

    let report = manager.deploy_all(&registry);
    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.published(), 1);
    assert_eq!(report.failed(), 2);
    assert!(!report.is_clean());

    let good = report.outcome("good").unwrap();
    assert_eq!(good.state, PoolState::Published);
    assert!(good.error.is_none());

    let nodriver = report.outcome("nodriver").unwrap();
    assert!(nodriver.declined);
    assert!(nodriver.error.is_some());

    let wrongcap = report.outcome("wrongcap").unwrap();
    assert!(!wrongcap.declined);
    assert_eq!(wrongcap.state, PoolState::DeployFailed);

    assert_eq!(fx.naming.names(), vec!["java:jboss/datasources/good".to_string()]);
    let counts = manager.counts();
    assert_eq!(counts.published, 1);
    assert_eq!(counts.failed, 2);
}

#[test]
fn test_deploy_all_clean() {
    let fx = Fixture::new();
    let manager = fx.manager();
    let source = MapConfigSource::new()
        .with("datasource.a.driver", "h2")
        .with("datasource.a.connection-url", "jdbc:h2:mem:a")
        .with("datasource.b.driver", "h2")
        .with("datasource.b.connection-url", "jdbc:h2:mem:b");

    let report = manager.deploy_all(&DatasourceConfigRegistry::scan(&source));
    assert!(report.is_clean());
    assert_eq!(report.published(), 2);
    assert_eq!(fx.naming.len(), 2);
}
