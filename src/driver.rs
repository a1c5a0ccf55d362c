// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! JDBC-style driver registry.
//!
//! Drivers are registered by id and point at a provider class name. Provider
//! classes carry a capability tag fixed at registration time, so deploys
//! never have to re-derive what a provider can do.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::source::ConfigSource;

/// Namespace prefix for driver definitions.
pub const DRIVER_PREFIX: &str = "driver.";

/// What kind of connections a provider class hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderCapability {
    /// Plain datasource or driver.
    Plain,
    /// XA-capable datasource.
    Xa,
}

impl fmt::Display for ProviderCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => f.write_str("plain"),
            Self::Xa => f.write_str("xa"),
        }
    }
}

impl FromStr for ProviderCapability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "datasource" | "driver" => Ok(Self::Plain),
            "xa" => Ok(Self::Xa),
            other => Err(format!("unknown provider capability '{}'", other)),
        }
    }
}

/// Registered driver entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverMetadata {
    pub id: String,
    pub driver_class_name: String,
}

/// Resolved provider class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderClass {
    pub class_name: String,
    pub capability: ProviderCapability,
}

impl ProviderClass {
    pub fn new(class_name: impl Into<String>, capability: ProviderCapability) -> Self {
        Self {
            class_name: class_name.into(),
            capability,
        }
    }

    pub fn is_xa(&self) -> bool {
        self.capability == ProviderCapability::Xa
    }
}

/// Lookup of drivers and their provider classes.
pub trait DriverRegistry: Send + Sync {
    fn lookup(&self, driver_id: &str) -> Option<DriverMetadata>;

    fn resolve_provider(&self, class_name: &str) -> Option<ProviderClass>;
}

/// Thread-safe in-memory driver registry.
#[derive(Debug, Default)]
pub struct InMemoryDriverRegistry {
    drivers: DashMap<String, DriverMetadata>,
    providers: DashMap<String, ProviderClass>,
}

impl InMemoryDriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a driver id and its provider class in one step.
    pub fn register(
        &self,
        driver_id: impl Into<String>,
        class_name: impl Into<String>,
        capability: ProviderCapability,
    ) {
        let class_name = class_name.into();
        self.register_provider(ProviderClass::new(class_name.clone(), capability));
        self.register_driver(driver_id, class_name);
    }

    /// Register a driver id without making its class resolvable.
    pub fn register_driver(&self, driver_id: impl Into<String>, class_name: impl Into<String>) {
        let id = driver_id.into();
        let metadata = DriverMetadata {
            id: id.clone(),
            driver_class_name: class_name.into(),
        };
        tracing::debug!(driver = %id, class = %metadata.driver_class_name, "registered driver");
        self.drivers.insert(id, metadata);
    }

    pub fn register_provider(&self, provider: ProviderClass) {
        self.providers.insert(provider.class_name.clone(), provider);
    }

    pub fn driver_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.drivers.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Register drivers defined as `driver.<id>.class-name` with an optional
    /// `driver.<id>.capability` (`plain` or `xa`, default `plain`).
    ///
    /// Entries without a class name or with a bad capability are skipped
    /// with a warning.
    pub fn from_source(source: &dyn ConfigSource) -> Self {
        let registry = Self::new();
        let mut entries: BTreeMap<String, (Option<String>, Option<String>)> = BTreeMap::new();

        for name in source.property_names() {
            let Some(rest) = name.strip_prefix(DRIVER_PREFIX) else {
                continue;
            };
            let Some((id, key)) = rest.split_once('.') else {
                continue;
            };
            let entry = entries.entry(id.to_string()).or_default();
            match key {
                "class-name" => entry.0 = source.get_value(&name),
                "capability" => entry.1 = source.get_value(&name),
                _ => tracing::warn!("unknown driver parameter {}", name),
            }
        }

        for (id, (class_name, capability)) in entries {
            let Some(class_name) = class_name.filter(|c| !c.trim().is_empty()) else {
                tracing::warn!(driver = %id, "driver has no class-name, skipping");
                continue;
            };
            let capability = match capability.as_deref().map(str::parse::<ProviderCapability>) {
                None => ProviderCapability::Plain,
                Some(Ok(c)) => c,
                Some(Err(e)) => {
                    tracing::warn!(driver = %id, "{}, skipping", e);
                    continue;
                }
            };
            registry.register(id, class_name.trim(), capability);
        }
        registry
    }
}

impl DriverRegistry for InMemoryDriverRegistry {
    fn lookup(&self, driver_id: &str) -> Option<DriverMetadata> {
        self.drivers.get(driver_id).map(|e| e.value().clone())
    }

    fn resolve_provider(&self, class_name: &str) -> Option<ProviderClass> {
        self.providers.get(class_name).map(|e| e.value().clone())
    }
}
