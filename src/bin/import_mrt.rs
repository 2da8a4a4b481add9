//! Loads crawler CSV output into the store.

use std::path::PathBuf;

use clap::Parser;
use log::{error, info};
use mrtblog_backend_rs::{
    config::AppConfig,
    db::Store,
    import::{self, ImportOptions},
};

/// Import MRT congestion and passenger stream CSV files
#[derive(Parser, Debug)]
#[command(name = "import-mrt", version, about)]
struct Cli {
    /// Directory holding MRT_carriage_data/ and MRT_stream_data/
    /// (default: $MRT_DATA_DIR or ./crawler)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Database URL (default: $DATABASE_URL or the configured SQLite file)
    #[arg(long)]
    database_url: Option<String>,

    /// Skip carriage congestion files
    #[arg(long)]
    skip_carriage: bool,

    /// Skip passenger stream files
    #[arg(long)]
    skip_stream: bool,

    /// Append to existing records instead of replacing them
    #[arg(long)]
    keep_existing: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = AppConfig::from_env();

    let level = if cli.verbose { "debug" } else { config.log_filter() };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let store = Store::new(cli.database_url.clone().unwrap_or_else(|| config.database_url()));
    store.init().await.map_err(|e| {
        error!("cannot open store {}: {}", store.url(), e);
        std::io::Error::other(e)
    })?;

    let options = ImportOptions {
        data_dir: cli.data_dir.clone().unwrap_or_else(|| config.mrt_data_dir.clone()),
        carriage: !cli.skip_carriage,
        stream: !cli.skip_stream,
        keep_existing: cli.keep_existing,
    };
    info!("importing MRT data from {}", options.data_dir.display());

    let report = import::run(&store, &options).await.map_err(|e| {
        error!("import failed: {}", e);
        std::io::Error::other(e)
    })?;
    if let Some(summary) = report.carriage {
        info!("carriage: {} records, {} rows skipped", summary.records, summary.rows_skipped);
    }
    if let Some(summary) = report.stream {
        info!("stream: {} records, {} rows skipped", summary.records, summary.rows_skipped);
    }
    Ok(())
}
