// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Connection pool configuration, the pooling library seam, and the
//! lifecycle manager that owns live pools.

mod config;
mod error;
mod lifecycle;
mod managed;

pub use config::{ConnectionFactoryConfig, Credential, PoolConfiguration, Principal};
pub use error::{DeployError, PoolConstructionError};
pub use lifecycle::{
    Deployment, DeploymentOutcome, DeploymentReport, PoolCollaborators, PoolCounts,
    PoolLifecycleManager, PoolState,
};
pub use managed::{ManagedPool, ManagedPoolFactory, PoolFactory, PooledDataSource};
