// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Span utilities for pool deployment.

use tracing::{info_span, Span};

/// Extension trait for adding context to spans.
pub trait SpanExt {
    /// Record the result of an operation into the span.
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }
}

/// Factory for deploy spans.
pub struct DeploySpan;

impl DeploySpan {
    /// Fields: `datasource`, `driver`, plus `status` and `error.message`
    /// filled in by [`SpanExt::record_result`].
    pub fn new(datasource: &str, driver: &str) -> Span {
        info_span!(
            "pool_deploy",
            datasource = %datasource,
            driver = %driver,
            status = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    }
}
