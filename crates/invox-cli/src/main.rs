//! Invox - batch invoice extraction entry point.
//!
//! setup → ingest → extract-all → report → teardown. Exit status is zero
//! even when individual documents failed (failures are logged); non-zero
//! only when setup itself fails.

use invox_cli::{pipeline, report, PipelineMode, Settings};
use invox_domain::aggregate;
use invox_domain::traits::InvoiceStore;
use invox_store::SqliteStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Log to stderr so the report stays clean on stdout.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> invox_cli::Result<()> {
    let settings = Settings::load()?;
    let mut store = SqliteStore::new(&settings.database)?;

    match settings.mode {
        PipelineMode::Inline => pipeline::run_inline(&settings, &mut store).await?,
        PipelineMode::Tooling => pipeline::run_tooling(&settings, &mut store).await?,
    };

    let report = aggregate(&store.all_records()?);
    print!("{}", report::render_report(&report));

    Ok(())
}
