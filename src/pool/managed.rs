// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Pooling library seam and the in-process pool handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::config::PoolConfiguration;
use super::error::PoolConstructionError;

/// Live pool handle owned by the pooling library.
pub trait PooledDataSource: Send + Sync {
    fn configuration(&self) -> &PoolConfiguration;

    /// Release the pool. Calling it more than once has no effect.
    fn close(&self);

    fn is_closed(&self) -> bool;
}

/// Builds live pools from a configuration.
pub trait PoolFactory: Send + Sync {
    fn build_pool(
        &self,
        config: PoolConfiguration,
    ) -> Result<Arc<dyn PooledDataSource>, PoolConstructionError>;
}

/// Pool handle that tracks configuration and open/closed state.
pub struct ManagedPool {
    config: PoolConfiguration,
    closed: AtomicBool,
}

impl ManagedPool {
    pub fn new(config: PoolConfiguration) -> Self {
        Self {
            config,
            closed: AtomicBool::new(false),
        }
    }
}

impl PooledDataSource for ManagedPool {
    fn configuration(&self) -> &PoolConfiguration {
        &self.config
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!(url = %self.config.connection_factory.jdbc_url, "pool closed");
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Factory producing [`ManagedPool`] handles after validating the URL.
#[derive(Debug, Default, Clone)]
pub struct ManagedPoolFactory;

impl ManagedPoolFactory {
    pub fn new() -> Self {
        Self
    }
}

impl PoolFactory for ManagedPoolFactory {
    fn build_pool(
        &self,
        config: PoolConfiguration,
    ) -> Result<Arc<dyn PooledDataSource>, PoolConstructionError> {
        let url = config.connection_factory.jdbc_url.trim();
        if url.is_empty() {
            return Err(PoolConstructionError::InvalidConfiguration(
                "empty connection URL".to_string(),
            ));
        }
        if !url.contains(':') {
            return Err(PoolConstructionError::InvalidConfiguration(format!(
                "connection URL '{}' has no scheme",
                url
            )));
        }
        Ok(Arc::new(ManagedPool::new(config)))
    }
}
