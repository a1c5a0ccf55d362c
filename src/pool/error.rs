// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Pool deployment error types.
//!
//! Every error is scoped to a single datasource; none of them stop other
//! datasources from deploying.

use thiserror::Error;

use crate::driver::ProviderCapability;

/// Errors reported by the pooling library.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolConstructionError {
    #[error("Invalid pool configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Provider error: {0}")]
    Provider(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeployError {
    #[error("No registered driver '{driver}' for datasource '{id}'")]
    MissingDriver { id: String, driver: String },

    #[error("Driver '{driver}' for datasource '{id}' has no provider class")]
    DriverClassAbsent { id: String, driver: String },

    #[error("Cannot resolve provider class '{class_name}' for datasource '{id}'")]
    DriverResolution { id: String, class_name: String },

    #[error("Datasource '{id}' requires a {expected} provider but '{class_name}' is {actual}")]
    CapabilityMismatch {
        id: String,
        class_name: String,
        expected: ProviderCapability,
        actual: ProviderCapability,
    },

    #[error("Pool construction failed: {0}")]
    PoolConstruction(#[from] PoolConstructionError),

    #[error("Datasource already deployed: {0}")]
    AlreadyDeployed(String),

    #[error("Datasource was closed and cannot be redeployed: {0}")]
    Closed(String),
}

impl DeployError {
    /// True when deploy was declined because the driver is unavailable.
    pub fn is_declined(&self) -> bool {
        matches!(
            self,
            Self::MissingDriver { .. } | Self::DriverClassAbsent { .. } | Self::DriverResolution { .. }
        )
    }

    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingDriver { .. } => "missing_driver",
            Self::DriverClassAbsent { .. } => "driver_class_absent",
            Self::DriverResolution { .. } => "driver_resolution",
            Self::CapabilityMismatch { .. } => "capability_mismatch",
            Self::PoolConstruction(_) => "pool_construction",
            Self::AlreadyDeployed(_) => "already_deployed",
            Self::Closed(_) => "closed",
        }
    }
}
