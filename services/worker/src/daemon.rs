use std::sync::Arc;

use clap::Args;
use tracing::info;

use food_insight::cache::RatingCache;
use food_insight::clock::{Clock, SystemClock};
use food_insight::config::AppConfig;
use food_insight::rating::RatingEngine;
use food_insight::scheduler::BatchScheduler;

use crate::demo::seed_catalog;
use crate::error::AppError;
use crate::infra::InMemoryProductStore;
use crate::telemetry;

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured batch size.
    #[arg(long)]
    pub(crate) batch_size: Option<usize>,
    /// Override the configured batch interval, in hours.
    #[arg(long)]
    pub(crate) interval_hours: Option<u64>,
}

pub(crate) async fn run(args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(batch_size) = args.batch_size {
        config.scheduler.batch_size = batch_size;
    }
    if let Some(hours) = args.interval_hours {
        config.scheduler.run_interval = std::time::Duration::from_secs(hours * 3_600);
    }

    telemetry::init(&config.telemetry)?;

    let store = Arc::new(InMemoryProductStore::new(config.scheduler.clone()));
    seed_catalog(&store);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let engine = Arc::new(RatingEngine::new(clock.clone()));
    let cache = Arc::new(RatingCache::new(&config.cache, clock.clone()));
    let scheduler = Arc::new(BatchScheduler::new(
        store,
        engine,
        cache,
        clock,
        config.scheduler.clone(),
    ));

    let handle = scheduler.start(config.cache.sweep_interval);
    info!(
        batch_size = config.scheduler.batch_size,
        "health-rating worker running, press ctrl-c to stop"
    );

    if let Err(err) = tokio::signal::ctrl_c().await {
        info!("shutdown signal listener failed: {err}");
    }
    handle.stop().await;
    info!("health-rating worker stopped");
    Ok(())
}
