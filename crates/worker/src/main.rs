use std::sync::Arc;
use std::time::Duration;

use stockroom_genai::{GenAiConfig, OpenAiClient};
use stockroom_pipeline::{ImportConfig, ImportPipeline, MemoryProgressStore, PgCatalogStore};
use stockroom_worker::{ImportQueue, QueueSettings, WorkerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockroom_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::from_env();

    let pool = stockroom_db::create_pool(&config.database_url).await?;
    sqlx::migrate!("../db/migrations").run(&pool).await?;

    let generation = Arc::new(OpenAiClient::new(GenAiConfig::from_env())?);
    let catalog = Arc::new(PgCatalogStore::new(pool));
    let progress = Arc::new(MemoryProgressStore::new());

    // Reads already ignore expired entries; the hourly sweep reclaims
    // the memory behind them.
    let sweeper = progress.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(60 * 60));
        loop {
            tick.tick().await;
            sweeper.evict_expired().await;
        }
    });

    let pipeline = Arc::new(ImportPipeline::new(
        generation,
        catalog,
        progress.clone(),
        ImportConfig {
            batch_size: config.batch_size,
            batch_pause: config.batch_pause,
        },
    ));

    let queue = ImportQueue::start(
        pipeline,
        progress,
        QueueSettings {
            job_timeout: config.job_timeout,
            max_attempts: config.max_attempts,
        },
    );

    tracing::info!("Import worker ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down, draining queued imports");
    queue.shutdown().await;

    Ok(())
}
