//! # County Fetch Module
//!
//! ## Purpose
//! Builds the county-and-date-scoped search request and retrieves one page of
//! raw result markup from the portal.
//!
//! ## Input/Output Specification
//! - **Input**: A [`FetchJob`] (county, filed-date range, shared session)
//! - **Output**: Raw HTML of the search results page
//! - **Failure**: Transport errors propagate with no fallback; a fetch failure
//!   is a job failure

use crate::errors::Result;
use crate::transport::RetryingTransport;
use crate::FetchJob;
use reqwest::header::{ACCEPT, COOKIE};
use reqwest::multipart::Form;
use reqwest::Client;
use tracing::debug;

const ISO_DATE: &str = "%Y-%m-%d";

/// Fetches one county's search results using the shared session
pub struct CountyFetcher {
    client: Client,
    transport: RetryingTransport,
    search_url: String,
}

impl CountyFetcher {
    /// Create a fetcher posting to the given search page URL
    pub fn new(client: Client, transport: RetryingTransport, search_url: impl Into<String>) -> Self {
        Self {
            client,
            transport,
            search_url: search_url.into(),
        }
    }

    /// Submit the filed-date search for the job's county and return the raw
    /// result markup.
    pub async fn fetch(&self, job: &FetchJob) -> Result<String> {
        debug!(county = %job.county, "submitting county search");
        let response = self
            .transport
            .execute(|| {
                self.client
                    .post(&self.search_url)
                    .header(ACCEPT, "*/*")
                    .header(COOKIE, &job.session.cookie_header)
                    .multipart(search_form(job))
            })
            .await?;

        Ok(response.text().await?)
    }
}

/// Multipart form the portal expects for a filed-date search. Rebuilt per
/// attempt because multipart bodies cannot be reused.
fn search_form(job: &FetchJob) -> Form {
    Form::new()
        .text("SearchBy", "DateFiled")
        .text("FiledStartDate", job.filed_start.format(ISO_DATE).to_string())
        .text("FiledEndDate", job.filed_end.format(ISO_DATE).to_string())
        .text(
            "__RequestVerificationToken",
            job.session.verification_token.clone(),
        )
        .text("AdvanceSearch", "true")
        .text("County", job.county.clone())
}
