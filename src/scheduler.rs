//! # Concurrency Scheduler Module
//!
//! ## Purpose
//! Runs per-county fetch jobs under a bounded-concurrency policy with
//! fail-fast cancellation, collecting per-job outputs as they complete.
//!
//! ## Input/Output Specification
//! - **Input**: FIFO sequence of [`FetchJob`]s and an in-flight limit
//! - **Output**: Per-county record batches in completion order, or the first
//!   job error (with the failing county attached)
//! - **Concurrency**: At most `concurrency` jobs in flight; each completion
//!   admits the next queued job
//!
//! ## Failure policy
//! Fail-fast: the first job to terminate in error wins. Remaining in-flight
//! tasks are abort-requested (best effort, at their next await point) and the
//! set is drained before the error returns; results of any task that completes
//! anyway are discarded. No further jobs are admitted after a fatal error.
//!
//! The collector is owned exclusively by the scheduler and handed out only
//! after the pool drains; it is never shared as ambient state.

use crate::errors::{Result, ScrapeError};
use crate::{DocketRecord, FetchJob};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// Seam between the pool logic and the fetch-and-extract pipeline, so the
/// scheduling behavior is testable without a network.
#[async_trait]
pub trait JobRunner: Send + Sync + 'static {
    /// Run one county job to completion, producing its extracted records.
    async fn run_job(&self, job: FetchJob) -> Result<Vec<DocketRecord>>;
}

/// Bounded worker pool over a FIFO job queue
pub struct ConcurrencyScheduler {
    concurrency: usize,
}

impl ConcurrencyScheduler {
    /// Create a scheduler admitting at most `concurrency` jobs at once.
    /// A zero limit is clamped to one; the entry boundary rejects it earlier.
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    /// Run every job, returning per-county record batches in completion order.
    pub async fn run<R: JobRunner>(
        &self,
        runner: Arc<R>,
        jobs: Vec<FetchJob>,
    ) -> Result<Vec<Vec<DocketRecord>>> {
        let total = jobs.len();
        let mut queue: VecDeque<FetchJob> = jobs.into();
        let mut in_flight = JoinSet::new();
        let mut batches: Vec<Vec<DocketRecord>> = Vec::with_capacity(total);

        info!(jobs = total, concurrency = self.concurrency, "starting county fan-out");

        loop {
            while in_flight.len() < self.concurrency {
                let Some(job) = queue.pop_front() else { break };
                let runner = Arc::clone(&runner);
                in_flight.spawn(async move {
                    let county = job.county.clone();
                    debug!(%county, "county job started");
                    runner.run_job(job).await.map_err(|source| ScrapeError::Job {
                        county,
                        source: Box::new(source),
                    })
                });
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };

            match flatten_join(joined) {
                Ok(records) => {
                    debug!(
                        records = records.len(),
                        completed = batches.len() + 1,
                        total,
                        "county job completed"
                    );
                    batches.push(records);
                }
                Err(err) => {
                    error!(error = %err, "county job failed, aborting remaining jobs");
                    in_flight.abort_all();
                    while in_flight.join_next().await.is_some() {}
                    return Err(err);
                }
            }
        }

        info!(batches = batches.len(), "county fan-out complete");
        Ok(batches)
    }
}

/// Collapse a join outcome into the job result; a panicked or cancelled task
/// surfaces as an internal error rather than being swallowed.
fn flatten_join(
    joined: std::result::Result<Result<Vec<DocketRecord>>, tokio::task::JoinError>,
) -> Result<Vec<DocketRecord>> {
    match joined {
        Ok(outcome) => outcome,
        Err(join_err) => Err(ScrapeError::Internal {
            message: format!("county job task failed to join: {}", join_err),
        }),
    }
}
