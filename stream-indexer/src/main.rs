use std::process::ExitCode;

use tracing::{error, info};

use stream_indexer::logging::{self, LogFormat};
use stream_indexer::{Dependencies, IndexingError, Settings};
use stream_indexer_ingest::orchestrator::RunSummary;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; the environment may already be set.
    dotenv::dotenv().ok();
    logging::init(LogFormat::from_env());

    match run().await {
        Ok(summary) => {
            info!(
                batches = summary.batches,
                indexed = summary.indexed,
                skipped = summary.skipped,
                dropped = summary.dropped,
                commits = summary.commits,
                "Stream indexer stopped"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, kind = e.kind(), "Stream indexer failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<RunSummary, IndexingError> {
    let settings = Settings::from_env()?;
    let Dependencies { mut orchestrator } = Dependencies::new(&settings).await?;

    let shutdown = orchestrator.shutdown_handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal");
                shutdown.shutdown();
            }
            Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
        }
    });

    Ok(orchestrator.run().await?)
}
