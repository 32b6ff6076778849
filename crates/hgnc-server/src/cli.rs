//! Command-line interface of the `hgnc-server` binary

use clap::{Parser, Subcommand};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use hgnc_common::logging::LogFormat;
use std::path::PathBuf;

use crate::config::Config;
use crate::db::{self, schema};
use crate::ingest::{HgncPipeline, ImportSummary};

#[derive(Parser, Debug)]
#[command(name = "hgnc-server")]
#[command(author, version, about = "HGNC gene nomenclature import and query server", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log record format (text or json)
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace the stored snapshot with a fresh HGNC import
    Update {
        /// Database URL, overrides DATABASE_URL
        #[arg(short, long)]
        connection: Option<String>,

        /// Hide progress bars
        #[arg(short, long)]
        silent: bool,

        /// Local HGNC complete set JSON instead of downloading it
        #[arg(long)]
        hgnc_file_path: Option<PathBuf>,

        /// Local HCOP table instead of downloading it
        #[arg(long)]
        hcop_file_path: Option<PathBuf>,

        /// Write each gene as soon as it is normalized
        #[arg(short, long)]
        low_memory: bool,

        /// Do not load ortholog predictions
        #[arg(long)]
        skip_orthology: bool,
    },

    /// Serve the query API over HTTP
    Serve {
        /// Bind address, overrides HGNC_HOST
        #[arg(long)]
        host: Option<String>,

        /// Bind port, overrides HGNC_PORT
        #[arg(long)]
        port: Option<u16>,
    },
}

impl Cli {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match &self.command {
            Commands::Update {
                connection,
                silent,
                hgnc_file_path,
                hcop_file_path,
                low_memory,
                skip_orthology,
            } => {
                if let Some(url) = connection {
                    config.database.url = url.clone();
                }
                if let Some(path) = hgnc_file_path {
                    config.import.hgnc_json_path = Some(path.clone());
                }
                if let Some(path) = hcop_file_path {
                    config.import.hcop_path = Some(path.clone());
                }
                config.import.silent |= *silent;
                config.import.low_memory |= *low_memory;
                config.import.skip_orthology |= *skip_orthology;
                config.validate()?;

                let summary = update(&config).await?;
                print!("{}", format_summary(&summary));
                Ok(())
            },
            Commands::Serve { host, port } => {
                if let Some(host) = host {
                    config.server.host = host.clone();
                }
                if let Some(port) = port {
                    config.server.port = *port;
                }
                config.validate()?;

                serve(&config).await
            },
        }
    }
}

/// Run one import against the configured database
pub async fn update(config: &Config) -> anyhow::Result<ImportSummary> {
    let pool = db::create_pool(&config.db_config()).await?;
    let summary = HgncPipeline::new(pool.clone(), config.import.clone()).run().await?;
    pool.close().await;
    Ok(summary)
}

/// Serve the API, creating an empty schema when none exists yet
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let pool = db::create_pool(&config.db_config()).await?;
    {
        let mut conn = pool.acquire().await?;
        schema::create_all(&mut conn).await?;
    }

    crate::api::serve(&config.server, &config.cors, pool).await
}

/// Render an import summary as a table
pub fn format_summary(summary: &ImportSummary) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Item", "Count"]);

    table.add_row(vec!["genes".to_string(), summary.genes.to_string()]);
    table.add_row(vec![
        "orthologs inserted".to_string(),
        summary.orthologs_inserted.to_string(),
    ]);
    table.add_row(vec![
        "orthologs skipped".to_string(),
        summary.orthologs_skipped.to_string(),
    ]);
    for (name, count) in &summary.table_counts {
        table.add_row(vec![name.clone(), count.to_string()]);
    }
    table.add_row(vec!["low memory".to_string(), summary.low_memory.to_string()]);
    table.add_row(vec![
        "elapsed".to_string(),
        format!("{:.2}s", summary.elapsed.as_secs_f64()),
    ]);

    format!("{}\n", table)
}
