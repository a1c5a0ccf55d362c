// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Immutable pool descriptors and their builder.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Naming convention for datasources without an explicit lookup name.
pub const DEFAULT_LOOKUP_PREFIX: &str = "java:jboss/datasources/";

/// Derive the lookup name used when none is configured.
pub fn default_lookup_name(id: &str) -> String {
    format!("{}{}", DEFAULT_LOOKUP_PREFIX, id)
}

/// Tracing instrumentation requested for a pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceMode {
    /// No tracing.
    #[default]
    Off,
    /// Trace every statement.
    On,
    /// Trace only when a span is already active.
    Active,
}

impl fmt::Display for TraceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Off => "OFF",
            Self::On => "ON",
            Self::Active => "ACTIVE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown trace mode '{0}' (expected off, on or active)")]
pub struct ParseTraceModeError(String);

impl FromStr for TraceMode {
    type Err = ParseTraceModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "false" => Ok(Self::Off),
            "on" | "true" | "all" => Ok(Self::On),
            "active" => Ok(Self::Active),
            _ => Err(ParseTraceModeError(s.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("Missing required field '{field}' for datasource '{id}'")]
    MissingField { id: String, field: &'static str },
}

/// Everything needed to deploy one connection pool.
///
/// Built once through [`PoolDescriptorBuilder`] and never mutated.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct PoolDescriptor {
    id: String,
    driver_id: String,
    username: Option<String>,
    #[serde(skip_serializing)]
    password: Option<String>,
    connection_url: String,
    lookup_name: String,
    trace_mode: TraceMode,
    jta: bool,
    xa: bool,
    connectable: bool,
}

impl PoolDescriptor {
    pub fn builder(id: impl Into<String>) -> PoolDescriptorBuilder {
        PoolDescriptorBuilder::new(id)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn driver_id(&self) -> &str {
        &self.driver_id
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn connection_url(&self) -> &str {
        &self.connection_url
    }

    /// Explicit lookup name, or the one derived from the id.
    pub fn lookup_name(&self) -> &str {
        &self.lookup_name
    }

    pub fn trace_mode(&self) -> TraceMode {
        self.trace_mode
    }

    pub fn is_jta(&self) -> bool {
        self.jta
    }

    pub fn is_xa(&self) -> bool {
        self.xa
    }

    pub fn is_connectable(&self) -> bool {
        self.connectable
    }

    /// True when the pool must be enlisted with the transaction manager.
    pub fn requires_transaction_integration(&self) -> bool {
        self.jta || self.xa
    }
}

impl fmt::Debug for PoolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolDescriptor")
            .field("id", &self.id)
            .field("driver_id", &self.driver_id)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("connection_url", &self.connection_url)
            .field("lookup_name", &self.lookup_name)
            .field("trace_mode", &self.trace_mode)
            .field("jta", &self.jta)
            .field("xa", &self.xa)
            .field("connectable", &self.connectable)
            .finish()
    }
}

impl fmt::Display for PoolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[DS: id={}; driver={}; jndiName={}; trace={}]",
            self.id, self.driver_id, self.lookup_name, self.trace_mode
        )
    }
}

/// Accumulates descriptor fields; `build` validates the required ones.
#[derive(Debug, Clone)]
pub struct PoolDescriptorBuilder {
    id: String,
    driver_id: Option<String>,
    username: Option<String>,
    password: Option<String>,
    connection_url: Option<String>,
    lookup_name: Option<String>,
    trace_mode: TraceMode,
    jta: bool,
    xa: bool,
    connectable: bool,
}

impl PoolDescriptorBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            driver_id: None,
            username: None,
            password: None,
            connection_url: None,
            lookup_name: None,
            trace_mode: TraceMode::Off,
            jta: true,
            xa: false,
            connectable: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn driver(mut self, driver_id: impl Into<String>) -> Self {
        self.driver_id = Some(driver_id.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn connection_url(mut self, url: impl Into<String>) -> Self {
        self.connection_url = Some(url.into());
        self
    }

    pub fn lookup_name(mut self, name: impl Into<String>) -> Self {
        self.lookup_name = Some(name.into());
        self
    }

    pub fn trace_mode(mut self, mode: TraceMode) -> Self {
        self.trace_mode = mode;
        self
    }

    pub fn jta(mut self, jta: bool) -> Self {
        self.jta = jta;
        self
    }

    pub fn xa(mut self, xa: bool) -> Self {
        self.xa = xa;
        self
    }

    pub fn connectable(mut self, connectable: bool) -> Self {
        self.connectable = connectable;
        self
    }

    pub fn build(self) -> Result<PoolDescriptor, DescriptorError> {
        let id = self.id;
        if id.is_empty() {
            return Err(DescriptorError::MissingField { id, field: "id" });
        }
        let driver_id = match self.driver_id.filter(|d| !d.is_empty()) {
            Some(d) => d,
            None => return Err(DescriptorError::MissingField { id, field: "driver" }),
        };
        let connection_url = match self.connection_url.filter(|u| !u.is_empty()) {
            Some(u) => u,
            None => {
                return Err(DescriptorError::MissingField {
                    id,
                    field: "connection-url",
                })
            }
        };
        let lookup_name = self
            .lookup_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| default_lookup_name(&id));

        Ok(PoolDescriptor {
            id,
            driver_id,
            username: self.username,
            password: self.password,
            connection_url,
            lookup_name,
            trace_mode: self.trace_mode,
            jta: self.jta,
            xa: self.xa,
            connectable: self.connectable,
        })
    }
}
