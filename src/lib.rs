//! # Pennsylvania Criminal Docket Scraper
//!
//! ## Overview
//! This library scrapes newly-filed criminal case docket listings from the web
//! portal of the Administrative Office of Pennsylvania Courts for a filed-date
//! range and a set of counties, producing a deduplicated, ordered collection of
//! structured records.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `session`: One-time session cookie and anti-forgery token bootstrap
//! - `transport`: Single HTTP exchange with bounded retry and backoff
//! - `fetch`: County-and-date-scoped search requests against the portal
//! - `scheduler`: Bounded-concurrency fan-out of per-county fetch jobs
//! - `extract`: Tolerant parsing of the portal's results table markup
//! - `merge`: Cross-county deduplication and deterministic ordering
//! - `engine`: Orchestrator tying one complete scrape run together
//! - `output`: JSON and CSV writers for the final record set
//! - `config`: Configuration, input validation and the scrape plan
//! - `errors`: Centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: Validated filed-date range, county selection, concurrency limit
//! - **Output**: Deduplicated `DocketRecord` set sorted by primary participants
//!
//! ## Usage
//! ```rust,no_run
//! use pa_docket_scraper::{
//!     config::{CountySelector, ScrapeRequest, ScraperConfig},
//!     engine::DocketScraper,
//! };
//!
//! #[tokio::main]
//! async fn main() -> pa_docket_scraper::Result<()> {
//!     let config = ScraperConfig::default();
//!     let plan = ScrapeRequest {
//!         counties: CountySelector::All,
//!         filed_start: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
//!         filed_end: None,
//!         concurrency: None,
//!     }
//!     .validate(&config)?;
//!     let scraper = DocketScraper::new(config)?;
//!     let dockets = scraper.scrape(&plan).await?;
//!     println!("Found {} dockets", dockets.len());
//!     Ok(())
//! }
//! ```

// Core modules
pub mod config;
pub mod counties;
pub mod engine;
pub mod errors;
pub mod extract;
pub mod fetch;
pub mod merge;
pub mod output;
pub mod scheduler;
pub mod session;
pub mod transport;

// Re-exports for convenience
pub use config::{ScrapePlan, ScrapeRequest, ScraperConfig};
pub use engine::DocketScraper;
pub use errors::{Result, ScrapeError};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Court-type literal that qualifies a results row for extraction
pub const MAGISTERIAL_DISTRICT: &str = "Magisterial District";

/// Immutable session state obtained once from the portal's landing page and
/// shared read-only by every county job. Never refreshed mid-run; if the
/// portal invalidates the session partway through, all subsequent jobs fail
/// uniformly with the same authorization-class error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Folded `set-cookie` values, ready for use as a `cookie` header
    pub cookie_header: String,
    /// Anti-forgery token the portal requires on form submissions
    pub verification_token: String,
}

/// One unit of scrape work: a single county over the filed-date range.
/// Created by the orchestrator when fanning out, consumed exactly once.
#[derive(Debug, Clone)]
pub struct FetchJob {
    /// County name as accepted by the portal's search form
    pub county: String,
    /// Start of the filed-date range (inclusive)
    pub filed_start: NaiveDate,
    /// End of the filed-date range (inclusive)
    pub filed_end: NaiveDate,
    /// Shared session state for the whole run
    pub session: Arc<SessionContext>,
}

/// A single criminal docket listing extracted from the results table.
/// Immutable after extraction; `docket_id` is unique across a final result
/// set, with the first-seen occurrence winning on duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocketRecord {
    /// Structured docket number, e.g. `MJ-51301-CR-0000123-2024`
    pub docket_id: String,
    /// Court type as printed by the portal; always `"Magisterial District"`
    pub court: String,
    /// Case caption
    pub caption: String,
    /// Case status
    pub status: String,
    /// Filing date, normalized from the portal's `MM/DD/YYYY`
    pub filing_date: NaiveDate,
    /// Primary participants; the final sort key
    pub primary_participants: String,
    /// Date of birth, normalized from the portal's `MM/DD/YYYY`
    pub dob: NaiveDate,
    /// County name as printed by the portal
    pub county: String,
    /// Court office
    pub court_office: String,
    /// Police incident / complaint number
    pub police_incident_no: String,
    /// Absolute URL of the docket detail page
    pub docket_url: String,
}
