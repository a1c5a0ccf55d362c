// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Naming service used to publish live pools under a lookup name.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;

use crate::pool::PooledDataSource;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NamingError {
    #[error("Invalid name: '{0}'")]
    InvalidName(String),

    #[error("Name already bound: {0}")]
    AlreadyBound(String),

    #[error("Name not bound: {0}")]
    NotBound(String),

    #[error("Naming service unavailable: {0}")]
    Unavailable(String),
}

/// Binds resources under names.
pub trait NamingService: Send + Sync {
    fn bind(&self, name: &str, resource: Arc<dyn PooledDataSource>) -> Result<(), NamingError>;

    fn unbind(&self, name: &str) -> Result<(), NamingError>;
}

/// In-process naming context.
#[derive(Default)]
pub struct InMemoryNamingContext {
    bindings: DashMap<String, Arc<dyn PooledDataSource>>,
}

impl InMemoryNamingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn PooledDataSource>> {
        self.bindings.get(name).map(|e| e.value().clone())
    }

    /// Bound names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl NamingService for InMemoryNamingContext {
    fn bind(&self, name: &str, resource: Arc<dyn PooledDataSource>) -> Result<(), NamingError> {
        if name.trim().is_empty() {
            return Err(NamingError::InvalidName(name.to_string()));
        }
        match self.bindings.entry(name.to_string()) {
            Entry::Occupied(_) => Err(NamingError::AlreadyBound(name.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(resource);
                Ok(())
            }
        }
    }

    fn unbind(&self, name: &str) -> Result<(), NamingError> {
        self.bindings
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| NamingError::NotBound(name.to_string()))
    }
}
