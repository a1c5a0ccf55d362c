// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! DSPOOL-CORE entry point.
//!
//! ## CLI Subcommands
//!
//! - `dspool-core` or `dspool-core serve [PATH]` - Deploy datasources (default)
//! - `dspool-core validate [PATH]` - Scan configuration and report diagnostics
//! - `dspool-core list [PATH] [--json]` - Print discovered datasources
//! - `dspool-core config show|defaults` - Runtime configuration

use std::process::ExitCode;

use dspool_core::cli::{config_cmd, datasources_cmd, resolve_config_path, serve_cmd};
use dspool_core::config as ds_config;
use dspool_core::telemetry::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("serve");
    let env = ds_config::load();

    match command {
        "serve" | "" => {
            if let Err(e) = init_logging(&env.log) {
                eprintln!("Logging setup failed: {}", e);
                return ExitCode::FAILURE;
            }
            let path = resolve_config_path(args.get(2..).unwrap_or_default(), &env);
            let code = serve_cmd::run_serve(&path, &env).await;
            ExitCode::from(code as u8)
        }
        "validate" => {
            let path = resolve_config_path(args.get(2..).unwrap_or_default(), &env);
            let code = datasources_cmd::run_validate(&path, &env.env_prefix);
            ExitCode::from(code as u8)
        }
        "list" => {
            let path = resolve_config_path(args.get(2..).unwrap_or_default(), &env);
            let json = args.iter().skip(2).any(|a| a == "--json");
            let code = datasources_cmd::run_list(&path, &env.env_prefix, json);
            ExitCode::from(code as u8)
        }
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "show" => {
                    config_cmd::run_show();
                    ExitCode::SUCCESS
                }
                "defaults" => {
                    config_cmd::run_defaults();
                    ExitCode::SUCCESS
                }
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_usage();
                    ExitCode::FAILURE
                }
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("dspool-core {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "dspool-core - datasource registry and pool lifecycle v{}

USAGE:
    dspool-core [COMMAND] [PATH] [OPTIONS]

COMMANDS:
    serve        Deploy all datasources and wait for Ctrl-C (default)
    validate     Scan configuration and report diagnostics
    list         Print discovered datasources
    config       Show runtime configuration (show, defaults)
    version      Show version information
    help         Show this help message

OPTIONS:
    --json       JSON output for list

CONFIGURATION:
    [datasource.orders]
    driver = \"h2\"
    connection-url = \"jdbc:h2:mem:orders\"
    jndi-name = \"java:/OrdersDS\"

    [driver.h2]
    class-name = \"org.h2.Driver\"
    capability = \"plain\"

ENVIRONMENT:
    DSPOOL_CONFIG_PATH   Datasource file (default: datasources.toml)
    DSPOOL_ENV_PREFIX    Override prefix (default: DSPOOL_DS_, e.g. DSPOOL_DS_ORDERS__USERNAME)
    DSPOOL_LOG_FORMAT    json or pretty
    DSPOOL_LOG_LEVEL     Tracing filter (default: info)
    DSPOOL_LOG_FILE      Log file path
    DSPOOL_STRICT        Exit 1 from serve when any deploy fails

EXIT CODES:
    0  Success
    1  Failure / diagnostics found
    2  Configuration error
",
        version
    );
}
