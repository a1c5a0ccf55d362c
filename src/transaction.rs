// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Transaction service handles passed through to pool construction.
//!
//! The core never drives transactions itself; it only hands these handles to
//! the pooling library so pooled connections can be enlisted.

use std::fmt;
use std::sync::Arc;

/// Ambient transaction manager.
pub trait TransactionManager: Send + Sync {
    fn name(&self) -> &str;
}

/// Registry of transaction synchronizations.
pub trait TransactionSynchronizationRegistry: Send + Sync {
    fn name(&self) -> &str;
}

/// Local stand-in used when no external transaction service is wired in.
#[derive(Debug, Clone)]
pub struct LocalTransactionManager {
    name: String,
}

impl LocalTransactionManager {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for LocalTransactionManager {
    fn default() -> Self {
        Self::new("local-tm")
    }
}

impl TransactionManager for LocalTransactionManager {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone)]
pub struct LocalSynchronizationRegistry {
    name: String,
}

impl LocalSynchronizationRegistry {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for LocalSynchronizationRegistry {
    fn default() -> Self {
        Self::new("local-tsr")
    }
}

impl TransactionSynchronizationRegistry for LocalSynchronizationRegistry {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Transaction wiring attached to a pool configuration.
#[derive(Clone)]
pub struct TransactionIntegration {
    pub transaction_manager: Arc<dyn TransactionManager>,
    pub synchronization_registry: Arc<dyn TransactionSynchronizationRegistry>,
    /// Whether the pool is connectable for recovery.
    pub connectable: bool,
}

impl TransactionIntegration {
    pub fn new(
        transaction_manager: Arc<dyn TransactionManager>,
        synchronization_registry: Arc<dyn TransactionSynchronizationRegistry>,
        connectable: bool,
    ) -> Self {
        Self {
            transaction_manager,
            synchronization_registry,
            connectable,
        }
    }
}

impl fmt::Debug for TransactionIntegration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionIntegration")
            .field("transaction_manager", &self.transaction_manager.name())
            .field("synchronization_registry", &self.synchronization_registry.name())
            .field("connectable", &self.connectable)
            .finish()
    }
}
