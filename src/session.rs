//! # Session Bootstrap Module
//!
//! ## Purpose
//! Obtains the session cookies and anti-forgery token the portal requires
//! before it will accept a search form submission. Runs exactly once per
//! scrape run, before any county work begins.
//!
//! ## Input/Output Specification
//! - **Input**: The portal's landing page (one GET through the retrying transport)
//! - **Output**: An immutable [`SessionContext`] shared by every county job
//! - **Failure**: Transport errors propagate unchanged; a missing token input
//!   element or absent cookies fail with `ScrapeError::Session`

use crate::errors::{Result, ScrapeError};
use crate::transport::RetryingTransport;
use crate::SessionContext;
use reqwest::header::{HeaderMap, ACCEPT, SET_COOKIE};
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info};

const TOKEN_SELECTOR: &str = r#"input[name="__RequestVerificationToken"]"#;

/// One-shot bootstrap of the portal session
pub struct SessionBootstrapper {
    client: Client,
    transport: RetryingTransport,
    search_url: String,
}

impl SessionBootstrapper {
    /// Create a bootstrapper targeting the given search page URL
    pub fn new(client: Client, transport: RetryingTransport, search_url: impl Into<String>) -> Self {
        Self {
            client,
            transport,
            search_url: search_url.into(),
        }
    }

    /// Fetch the landing page and extract the session cookies and
    /// verification token. No retries beyond what the transport provides;
    /// if this fails the whole scrape aborts before any county work.
    pub async fn bootstrap(&self) -> Result<SessionContext> {
        debug!(url = %self.search_url, "fetching portal landing page");
        let response = self
            .transport
            .execute(|| self.client.get(&self.search_url).header(ACCEPT, "*/*"))
            .await?;

        let cookie_header = fold_cookies(response.headers());
        if cookie_header.is_empty() {
            return Err(ScrapeError::Session {
                details: "landing page set no cookies".to_string(),
            });
        }

        let html = response.text().await?;
        let verification_token = parse_token(&html)?;
        info!("portal session established");

        Ok(SessionContext {
            cookie_header,
            verification_token,
        })
    }
}

/// Fold every `set-cookie` header into a single `cookie` header value,
/// keeping only the name=value portion of each.
fn fold_cookies(headers: &HeaderMap) -> String {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|entry| entry.split(';').next())
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Extract the anti-forgery token from the landing page markup.
fn parse_token(html: &str) -> Result<String> {
    let selector = Selector::parse(TOKEN_SELECTOR).map_err(|_| ScrapeError::Internal {
        message: format!("invalid selector: {}", TOKEN_SELECTOR),
    })?;
    let document = Html::parse_document(html);
    document
        .select(&selector)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(str::to_string)
        .ok_or_else(|| ScrapeError::Session {
            details: "verification token input not found on landing page".to_string(),
        })
}
