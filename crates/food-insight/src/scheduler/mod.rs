//! Batch refresh scheduler.
//!
//! A recurring job that pulls stale or under-rated records from the store,
//! rates them through the cached engine, and writes the results back. Each
//! item runs inside its own failure boundary so one bad record never
//! aborts the batch. The run loop carries an in-progress flag: a tick that
//! lands while the previous run is still in flight is skipped, not queued.

pub mod store;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, RatingCache};
use crate::clock::Clock;
use crate::config::SchedulerConfig;
use crate::rating::{ProductId, RatingEngine};

use store::{ProductRecord, ProductStore, RatingUpdate, StoreError};

/// Per-item success entry in a batch report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub id: ProductId,
    pub score: f64,
    pub rating_changed: bool,
    pub cache_hit: bool,
}

/// Per-item failure entry; surfaced, never silently dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    pub id: ProductId,
    pub message: String,
}

/// Aggregate result of one batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub updated: usize,
    pub errors: usize,
    pub cache_hits: usize,
    pub outcomes: Vec<BatchOutcome>,
    pub failures: Vec<BatchFailure>,
    pub cache_stats: CacheStats,
}

/// Recurring evaluation job over the product store.
pub struct BatchScheduler<S> {
    store: Arc<S>,
    engine: Arc<RatingEngine>,
    cache: Arc<RatingCache>,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
    running: AtomicBool,
}

impl<S> BatchScheduler<S>
where
    S: ProductStore + 'static,
{
    pub fn new(
        store: Arc<S>,
        engine: Arc<RatingEngine>,
        cache: Arc<RatingCache>,
        clock: Arc<dyn Clock>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            store,
            engine,
            cache,
            clock,
            config,
            running: AtomicBool::new(false),
        }
    }

    /// Execute a single batch pass. Returns `None` when a previous run is
    /// still in flight.
    pub async fn run_once(&self) -> Result<Option<BatchReport>, StoreError> {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("previous batch run still in flight, skipping");
            return Ok(None);
        }
        let result = self.process_batch().await;
        self.running.store(false, Ordering::SeqCst);
        result.map(Some)
    }

    async fn process_batch(&self) -> Result<BatchReport, StoreError> {
        let started_at = self.clock.now();
        let candidates = self
            .store
            .due_for_rating(started_at, self.config.batch_size)
            .await?;

        let mut outcomes = Vec::new();
        let mut failures = Vec::new();
        let mut cache_hits = 0;

        for record in candidates {
            let id = record.snapshot.id.clone();
            match self.evaluate_record(&record).await {
                Ok(outcome) => {
                    if outcome.cache_hit {
                        cache_hits += 1;
                    }
                    outcomes.push(outcome);
                }
                Err(error) => {
                    warn!(product = %id, "batch item failed: {error}");
                    failures.push(BatchFailure {
                        id,
                        message: error.to_string(),
                    });
                }
            }
        }

        let report = BatchReport {
            started_at,
            updated: outcomes.len(),
            errors: failures.len(),
            cache_hits,
            outcomes,
            failures,
            cache_stats: self.cache.stats(),
        };
        info!(
            updated = report.updated,
            errors = report.errors,
            cache_hits = report.cache_hits,
            "batch rating run finished"
        );
        Ok(report)
    }

    async fn evaluate_record(&self, record: &ProductRecord) -> Result<BatchOutcome, StoreError> {
        let product = &record.snapshot;

        let (result, cache_hit) = match self.cache.lookup(product) {
            Some(result) => (result, true),
            None => {
                let result = self.engine.analyze(product);
                self.cache.store(product, result.clone());
                (result, false)
            }
        };

        let previous = record.health.as_ref().map(|health| health.health_rating);
        // Minimum-delta threshold: small fluctuations are persisted but do
        // not count as a significant change.
        let rating_changed = previous
            .map(|old| (old - result.score).abs() >= self.config.significant_delta)
            .unwrap_or(true);

        let now = self.clock.now();
        let update = RatingUpdate {
            health_rating: result.score,
            health_analysis: result.analysis.clone(),
            health_rating_label: result.rating.text().to_string(),
            health_rating_color: result.color.text().to_string(),
            confidence: result.confidence,
            data_completeness: result.data_completeness,
            last_fetched: now,
            rating_changed,
            last_significant_update: rating_changed.then_some(now),
            cache_hit,
        };
        self.store.apply_rating(&product.id, update).await?;

        Ok(BatchOutcome {
            id: product.id.clone(),
            score: result.score,
            rating_changed,
            cache_hit,
        })
    }

    /// Spawn the recurring batch loop (first run immediate) and the hourly
    /// cache sweep as independent tasks. The returned handle stops both.
    pub fn start(self: Arc<Self>, sweep_interval: StdDuration) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let batch = {
            let scheduler = Arc::clone(&self);
            let mut shutdown = shutdown_rx.clone();
            tokio::spawn(async move {
                let mut ticks = tokio::time::interval(scheduler.config.run_interval);
                loop {
                    tokio::select! {
                        _ = shutdown.changed() => break,
                        _ = ticks.tick() => {
                            if let Err(error) = scheduler.run_once().await {
                                warn!("batch rating run failed: {error}");
                            }
                        }
                    }
                }
            })
        };

        let sweep = {
            let scheduler = Arc::clone(&self);
            let mut shutdown = shutdown_rx;
            tokio::spawn(async move {
                let mut ticks = tokio::time::interval(sweep_interval);
                // The interval fires immediately; skip that first tick so
                // the sweep starts one period in.
                ticks.tick().await;
                loop {
                    tokio::select! {
                        _ = shutdown.changed() => break,
                        _ = ticks.tick() => {
                            let cleared = scheduler.cache.sweep_expired();
                            info!(cleared, "cache sweep finished");
                        }
                    }
                }
            })
        };

        SchedulerHandle {
            shutdown: shutdown_tx,
            batch,
            sweep,
        }
    }
}

/// Handle over the spawned scheduler tasks.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    batch: JoinHandle<()>,
    sweep: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signal both loops to stop and wait for them to wind down. An
    /// in-flight batch run finishes its current item list first.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.batch.await;
        let _ = self.sweep.await;
    }
}
