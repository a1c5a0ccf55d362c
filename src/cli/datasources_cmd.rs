// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Datasource CLI subcommands: list, validate.
//!
//! Both scan the configuration only; no pool is created.

use std::path::Path;

use crate::datasource::{DatasourceConfigRegistry, PoolDescriptor};

use super::{load_source, EXIT_CONFIG_ERROR};

/// Run `list`. Returns exit code: 0 on success, 2 if the file cannot be loaded.
pub fn run_list(path: &Path, env_prefix: &str, json: bool) -> i32 {
    let source = match load_source(path, env_prefix) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading {}: {}", path.display(), e);
            return EXIT_CONFIG_ERROR;
        }
    };
    let registry = DatasourceConfigRegistry::scan(&source);

    if json {
        match serde_json::to_string_pretty(registry.datasources()) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error encoding datasources: {}", e);
                return 1;
            }
        }
    } else {
        print_datasources(registry.datasources());
    }
    0
}

/// Run `validate`. Returns 0 when clean, 1 on diagnostics, 2 on load failure.
pub fn run_validate(path: &Path, env_prefix: &str) -> i32 {
    let source = match load_source(path, env_prefix) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading {}: {}", path.display(), e);
            return EXIT_CONFIG_ERROR;
        }
    };
    let registry = DatasourceConfigRegistry::scan(&source);

    for diagnostic in registry.diagnostics() {
        eprintln!("WARNING: {}", diagnostic);
    }
    if registry.diagnostics().is_empty() {
        println!("Configuration is valid: {} datasource(s).", registry.len());
        0
    } else {
        1
    }
}

/// Format and print descriptors to stdout. Passwords are never shown.
pub fn print_datasources(datasources: &[PoolDescriptor]) {
    if datasources.is_empty() {
        println!("No datasources configured.");
        return;
    }

    println!(
        "{:<20} {:<12} {:<40} {:<8} {:<5} {:<5}",
        "ID", "DRIVER", "LOOKUP NAME", "TRACE", "JTA", "XA"
    );
    println!("{}", "-".repeat(95));

    for ds in datasources {
        println!(
            "{:<20} {:<12} {:<40} {:<8} {:<5} {:<5}",
            truncate(ds.id(), 19),
            truncate(ds.driver_id(), 11),
            truncate(ds.lookup_name(), 39),
            ds.trace_mode(),
            ds.is_jta(),
            ds.is_xa(),
        );
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly-ten", 5), "exact");
        assert_eq!(truncate("", 3), "");
    }

    #[test]
    fn test_validate_exit_codes() {
        let mut clean = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            clean,
            "[datasource.orders]\ndriver = \"h2\"\nconnection-url = \"jdbc:h2:mem:orders\""
        )
        .unwrap();
        assert_eq!(run_validate(clean.path(), "DSPOOL_TEST_NONE_"), 0);

        let mut noisy = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            noisy,
            "[datasource.orders]\ndriver = \"h2\"\nconnection-url = \"jdbc:x\"\npool-size = 5"
        )
        .unwrap();
        assert_eq!(run_validate(noisy.path(), "DSPOOL_TEST_NONE_"), 1);

        assert_eq!(run_validate(Path::new("/nonexistent.toml"), "DSPOOL_TEST_NONE_"), 2);
    }
}
