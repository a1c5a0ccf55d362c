// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration handed to the pooling library.

use std::fmt;

use crate::datasource::TraceMode;
use crate::driver::ProviderClass;
use crate::transaction::TransactionIntegration;

/// Connection principal (user name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal(String);

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Connection credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionFactoryConfig {
    pub jdbc_url: String,
    pub provider: ProviderClass,
    pub principal: Option<Principal>,
    pub credential: Option<Credential>,
}

impl ConnectionFactoryConfig {
    pub fn new(jdbc_url: impl Into<String>, provider: ProviderClass) -> Self {
        Self {
            jdbc_url: jdbc_url.into(),
            provider,
            principal: None,
            credential: None,
        }
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }
}

/// Complete pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfiguration {
    pub connection_factory: ConnectionFactoryConfig,
    /// `None` runs the pool without transaction enlistment.
    pub transaction_integration: Option<TransactionIntegration>,
    pub trace_mode: TraceMode,
}

impl PoolConfiguration {
    pub fn new(connection_factory: ConnectionFactoryConfig) -> Self {
        Self {
            connection_factory,
            transaction_integration: None,
            trace_mode: TraceMode::Off,
        }
    }

    pub fn with_transaction_integration(mut self, integration: TransactionIntegration) -> Self {
        self.transaction_integration = Some(integration);
        self
    }

    pub fn with_trace_mode(mut self, mode: TraceMode) -> Self {
        self.trace_mode = mode;
        self
    }

    pub fn is_transactional(&self) -> bool {
        self.transaction_integration.is_some()
    }
}
