//! HGNC Server - Main entry point

use clap::Parser;
use hgnc_common::logging::{init_logging, LogConfig, LogLevel};
use std::process;
use tracing::error;

use hgnc_server::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut builder = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Info })
        .log_file_prefix("hgnc-server")
        .filter_directives("sqlx=warn,tower_http=debug");
    if let Some(format) = cli.log_format {
        builder = builder.format(format);
    }

    // Environment variables take precedence over flags
    let log_config = match builder.build().merge_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        },
    };

    let _guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: failed to initialize logging: {}", e);
            process::exit(2);
        },
    };

    if let Err(e) = cli.execute().await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
