//! # Scrape Orchestration Module
//!
//! ## Purpose
//! Ties one complete scrape run together: session bootstrap, per-county
//! fan-out under the concurrency limit, and the final merge.
//!
//! ## Input/Output Specification
//! - **Input**: A validated [`ScrapePlan`]
//! - **Output**: Deduplicated [`DocketRecord`]s sorted by primary participants
//! - **Ordering**: The session bootstrap strictly precedes all county jobs and
//!   runs exactly once per run, regardless of county count
//!
//! ## Control flow
//! bootstrap → one [`FetchJob`] per county (plan order) → scheduler →
//! per-county extraction → merge → caller.

use crate::config::{ScrapePlan, ScraperConfig};
use crate::errors::Result;
use crate::extract::TableExtractor;
use crate::fetch::CountyFetcher;
use crate::merge;
use crate::scheduler::{ConcurrencyScheduler, JobRunner};
use crate::session::SessionBootstrapper;
use crate::transport::RetryingTransport;
use crate::{DocketRecord, FetchJob};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::Duration;
use tracing::info;

/// Orchestrates one complete scrape run against the portal
pub struct DocketScraper {
    config: ScraperConfig,
    client: Client,
}

/// Production pipeline behind the scheduler seam: fetch a county's markup,
/// then extract its records.
pub struct ScrapeJobRunner {
    fetcher: CountyFetcher,
    extractor: TableExtractor,
}

#[async_trait]
impl JobRunner for ScrapeJobRunner {
    async fn run_job(&self, job: FetchJob) -> Result<Vec<DocketRecord>> {
        let markup = self.fetcher.fetch(&job).await?;
        self.extractor.extract(&markup)
    }
}

impl DocketScraper {
    /// Create a scraper with a shared HTTP client carrying the portal's
    /// expected identity and the configured timeout.
    pub fn new(config: ScraperConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .user_agent(&config.portal.user_agent)
            .timeout(Duration::from_secs(config.limits.request_timeout_seconds))
            .build()?;
        Ok(Self { config, client })
    }

    /// Run one complete scrape: bootstrap once, fan out every county in the
    /// plan, merge and order the final set.
    pub async fn scrape(&self, plan: &ScrapePlan) -> Result<Vec<DocketRecord>> {
        let started = Instant::now();
        info!(
            counties = plan.counties.len(),
            filed_start = %plan.filed_start,
            filed_end = %plan.filed_end,
            concurrency = plan.concurrency,
            "scrape run starting"
        );

        let transport = RetryingTransport::new(self.config.retry.clone());
        let search_url = self.config.search_url();

        let bootstrapper =
            SessionBootstrapper::new(self.client.clone(), transport.clone(), search_url.clone());
        let session = Arc::new(bootstrapper.bootstrap().await?);

        let jobs: Vec<FetchJob> = plan
            .counties
            .iter()
            .map(|county| FetchJob {
                county: county.clone(),
                filed_start: plan.filed_start,
                filed_end: plan.filed_end,
                session: Arc::clone(&session),
            })
            .collect();

        let runner = Arc::new(ScrapeJobRunner {
            fetcher: CountyFetcher::new(self.client.clone(), transport, search_url),
            extractor: TableExtractor::new(self.config.origin())?,
        });

        let scheduler = ConcurrencyScheduler::new(plan.concurrency);
        let batches = scheduler.run(runner, jobs).await?;
        let outcome = merge::merge(batches);

        info!(
            dockets = outcome.records.len(),
            duplicates_removed = outcome.duplicates_removed,
            elapsed_secs = started.elapsed().as_secs_f64(),
            "scrape run complete"
        );
        Ok(outcome.records)
    }
}
