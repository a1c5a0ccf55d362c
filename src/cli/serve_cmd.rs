// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! `serve`: deploy every datasource, hold the pools until Ctrl-C, then stop.

use std::path::Path;

use crate::config::EnvConfig;
use crate::pool::DeploymentReport;
use crate::{DatasourceRuntime, InMemoryServices};

use super::{load_source, EXIT_CONFIG_ERROR};

/// Returns exit code: 0 on clean shutdown, 1 when strict mode saw a failed
/// deploy, 2 if the configuration cannot be loaded.
pub async fn run_serve(path: &Path, env: &EnvConfig) -> i32 {
    let source = match load_source(path, &env.env_prefix) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(path = %path.display(), "failed to load configuration: {}", e);
            eprintln!("Error loading {}: {}", path.display(), e);
            return EXIT_CONFIG_ERROR;
        }
    };

    let services = InMemoryServices::from_source(&source);
    let runtime = DatasourceRuntime::start(&source, services.collaborators());
    print_report(runtime.report());

    if env.strict && runtime.report().failed() > 0 {
        eprintln!("Strict mode: {} datasource(s) failed to deploy.", runtime.report().failed());
        runtime.stop();
        return 1;
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("shutdown signal received");
    runtime.stop();
    0
}

/// Print one line per datasource outcome to stdout.
pub fn print_report(report: &DeploymentReport) {
    for outcome in &report.outcomes {
        match &outcome.error {
            Some(err) => println!("{:<20} {:?} ({})", outcome.id, outcome.state, err),
            None => println!("{:<20} {:?} {}", outcome.id, outcome.state, outcome.lookup_name),
        }
    }
    println!(
        "{} published, {} degraded, {} failed",
        report.published(),
        report.degraded(),
        report.failed()
    );
}
