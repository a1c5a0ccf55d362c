// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Datasource definitions: descriptors and the configuration registry.
//!
//! Properties follow `datasource.<id>.<key>` where `key` is one of
//! `connection-url`, `driver`, `username`, `password`, `jndi-name`, `trace`.

mod descriptor;
mod registry;

pub use descriptor::{
    default_lookup_name, DescriptorError, ParseTraceModeError, PoolDescriptor,
    PoolDescriptorBuilder, TraceMode, DEFAULT_LOOKUP_PREFIX,
};
pub use registry::{ConfigDiagnostic, DatasourceConfigRegistry, RegistryError, PREFIX};
