// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Discovery of datasource definitions from a flat configuration namespace.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::descriptor::{PoolDescriptor, PoolDescriptorBuilder, TraceMode};
use crate::source::{get_typed, ConfigSource};
use crate::telemetry::record_config_diagnostic;

/// Namespace prefix for datasource properties.
pub const PREFIX: &str = "datasource.";

/// Non-fatal findings from a registry scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigDiagnostic {
    /// Simple key not recognised; the property is ignored. Only the key is
    /// recorded, never the value.
    UnknownParameter { key: String },
    /// Property name has no `<id>.<key>` structure after the prefix.
    MalformedKey { key: String },
    /// Value could not be read or converted.
    InvalidValue { key: String, reason: String },
    /// Group was missing a required field; no descriptor was produced.
    Rejected { id: String, reason: String },
}

impl ConfigDiagnostic {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownParameter { .. } => "unknown_parameter",
            Self::MalformedKey { .. } => "malformed_key",
            Self::InvalidValue { .. } => "invalid_value",
            Self::Rejected { .. } => "rejected",
        }
    }
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownParameter { key } => write!(f, "unknown configuration parameter {}", key),
            Self::MalformedKey { key } => write!(f, "malformed datasource property name: {}", key),
            Self::InvalidValue { key, reason } => write!(f, "invalid value for {}: {}", key, reason),
            Self::Rejected { id, reason } => write!(f, "datasource '{}' rejected: {}", id, reason),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Datasource already registered: {0}")]
    DuplicateId(String),
}

/// Validated set of pool descriptors, one per configured identifier.
#[derive(Debug, Default)]
pub struct DatasourceConfigRegistry {
    datasources: Vec<PoolDescriptor>,
    diagnostics: Vec<ConfigDiagnostic>,
}

impl DatasourceConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `source` for `datasource.<id>.<key>` properties.
    ///
    /// Never fails as a whole: malformed names, bad values and incomplete
    /// groups are skipped and recorded in [`Self::diagnostics`].
    pub fn scan(source: &dyn ConfigSource) -> Self {
        let mut registry = Self::new();

        let mut names: Vec<String> = source
            .property_names()
            .into_iter()
            .filter(|name| name.starts_with(PREFIX))
            .collect();
        names.sort();

        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for name in names {
            match identifier_segment(&name) {
                Some(id) => groups.entry(id.to_string()).or_default().push(name),
                None => registry.diagnose(ConfigDiagnostic::MalformedKey { key: name }),
            }
        }

        for (id, props) in groups {
            if let Some(ds) = registry.create(source, &id, &props) {
                registry.datasources.push(ds);
            }
        }

        tracing::debug!(
            datasources = registry.datasources.len(),
            diagnostics = registry.diagnostics.len(),
            "datasource registry scan complete"
        );
        registry
    }

    fn create(
        &mut self,
        source: &dyn ConfigSource,
        id: &str,
        props: &[String],
    ) -> Option<PoolDescriptor> {
        let group_prefix = format!("{}{}.", PREFIX, id);
        let mut builder = PoolDescriptorBuilder::new(id);

        for prop in props {
            let simple = &prop[group_prefix.len()..];
            builder = match self.apply(source, builder.clone(), prop, simple) {
                Ok(next) => next,
                Err(diagnostic) => {
                    self.diagnose(diagnostic);
                    builder
                }
            };
        }

        match builder.build() {
            Ok(ds) => Some(ds),
            Err(e) => {
                self.diagnose(ConfigDiagnostic::Rejected {
                    id: id.to_string(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    fn apply(
        &self,
        source: &dyn ConfigSource,
        builder: PoolDescriptorBuilder,
        prop: &str,
        simple: &str,
    ) -> Result<PoolDescriptorBuilder, ConfigDiagnostic> {
        let string_value = || read_string(source, prop);
        let next = match simple {
            "connection-url" => builder.connection_url(string_value()?),
            "driver" => builder.driver(string_value()?),
            "username" => builder.username(string_value()?),
            "password" => builder.password(string_value()?),
            "jndi-name" => builder.lookup_name(string_value()?),
            "trace" => {
                let mode = get_typed::<TraceMode>(source, prop).map_err(|e| {
                    ConfigDiagnostic::InvalidValue {
                        key: prop.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                builder.trace_mode(mode)
            }
            _ => {
                return Err(ConfigDiagnostic::UnknownParameter {
                    key: prop.to_string(),
                })
            }
        };
        Ok(next)
    }

    fn diagnose(&mut self, diagnostic: ConfigDiagnostic) {
        match &diagnostic {
            ConfigDiagnostic::Rejected { .. } => tracing::error!("{}", diagnostic),
            _ => tracing::warn!("{}", diagnostic),
        }
        record_config_diagnostic(diagnostic.kind());
        self.diagnostics.push(diagnostic);
    }

    /// Add a descriptor built outside of configuration.
    pub fn register(&mut self, descriptor: PoolDescriptor) -> Result<(), RegistryError> {
        if self.get(descriptor.id()).is_some() {
            return Err(RegistryError::DuplicateId(descriptor.id().to_string()));
        }
        self.datasources.push(descriptor);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&PoolDescriptor> {
        self.datasources.iter().find(|ds| ds.id() == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.datasources.iter().map(|ds| ds.id())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PoolDescriptor> {
        self.datasources.iter()
    }

    pub fn datasources(&self) -> &[PoolDescriptor] {
        &self.datasources
    }

    pub fn diagnostics(&self) -> &[ConfigDiagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.datasources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasources.is_empty()
    }
}

impl<'a> IntoIterator for &'a DatasourceConfigRegistry {
    type Item = &'a PoolDescriptor;
    type IntoIter = std::slice::Iter<'a, PoolDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for DatasourceConfigRegistry {
    type Item = PoolDescriptor;
    type IntoIter = std::vec::IntoIter<PoolDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.datasources.into_iter()
    }
}

/// Identifier between the prefix and the next `.`, if the name also has a
/// non-empty simple key after it.
fn identifier_segment(name: &str) -> Option<&str> {
    let rest = name.strip_prefix(PREFIX)?;
    let (id, simple) = rest.split_once('.')?;
    if id.is_empty() || simple.is_empty() {
        return None;
    }
    Some(id)
}

fn read_string(source: &dyn ConfigSource, prop: &str) -> Result<String, ConfigDiagnostic> {
    source.get_value(prop).ok_or_else(|| ConfigDiagnostic::InvalidValue {
        key: prop.to_string(),
        reason: "value disappeared during scan".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_segment() {
        assert_eq!(identifier_segment("datasource.orders.driver"), Some("orders"));
        assert_eq!(identifier_segment("datasource.orders.a.b"), Some("orders"));
        assert_eq!(identifier_segment("datasource.orders"), None);
        assert_eq!(identifier_segment("datasource..driver"), None);
        assert_eq!(identifier_segment("datasource.orders."), None);
        assert_eq!(identifier_segment("other.orders.driver"), None);
    }

    #[test]
    fn test_diagnostic_display() {
        let d = ConfigDiagnostic::UnknownParameter {
            key: "datasource.orders.pool-size".into(),
        };
        assert_eq!(
            d.to_string(),
            "unknown configuration parameter datasource.orders.pool-size"
        );
        assert_eq!(d.kind(), "unknown_parameter");
    }
}
