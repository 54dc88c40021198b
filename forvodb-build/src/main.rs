//! forvodb-build - Pronunciation database builder
//!
//! Converts a pronunciation dump (audio tree + metadata.jsonl + icons)
//! into two SQLite stores: a relational word store and a simplified mdx
//! store for generic dictionary tooling.

use anyhow::Result;
use clap::Parser;
use forvodb_build::run::Processor;
use forvodb_build::store::DEFAULT_BATCH_SIZE;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for forvodb-build
#[derive(Parser, Debug)]
#[command(name = "forvodb-build")]
#[command(about = "Build pronunciation dictionary stores from a recording dump")]
#[command(version)]
struct Args {
    /// Root directory of the pronunciation dump
    root_dir: PathBuf,

    /// Output path of the relational word store
    #[arg(long, default_value = "forvo_database.db", env = "FORVODB_DB_PATH")]
    db_path: PathBuf,

    /// Output path of the simplified mdx store
    #[arg(long, default_value = "forvo_simple.db", env = "FORVODB_SIMPLE_DB_PATH")]
    simple_db_path: PathBuf,

    /// Completed word groups per store commit
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Log verbosity (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing; RUST_LOG overrides --log-level when set
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting forvodb-build v{}", env!("CARGO_PKG_VERSION"));
    info!("Dump root: {}", args.root_dir.display());

    // Cooperative interrupt: Ctrl-C only cancels the token; the pipeline
    // polls it at line and group boundaries and commits staged work.
    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received. Finishing staged work and shutting down...");
            watcher.cancel();
        }
    });

    let mut processor = Processor::new(
        args.root_dir,
        args.db_path,
        args.simple_db_path,
        args.batch_size,
    );
    let summary = processor.run(cancel).await?;

    if summary.interrupted {
        info!("Run interrupted; committed batches are preserved");
    } else {
        info!("Processing completed successfully!");
    }

    Ok(())
}
