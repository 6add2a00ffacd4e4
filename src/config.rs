//! # Configuration Management Module
//!
//! ## Purpose
//! Configuration for the docket scraper (portal endpoints, retry policy,
//! operational limits) plus the validated entry boundary that turns caller
//! input into a normalized scrape plan.
//!
//! ## Input/Output Specification
//! - **Input**: Optional TOML configuration file, caller-supplied scrape request
//! - **Output**: Validated configuration structs with defaults; a `ScrapePlan`
//!   with resolved counties and normalized dates
//! - **Validation**: Date-range policy and county names are checked exactly once
//!   here, before any network access; the core never re-validates
//!
//! ## Usage
//! ```rust,ignore
//! use pa_docket_scraper::config::{CountySelector, ScrapeRequest, ScraperConfig};
//!
//! let config = ScraperConfig::from_file("scraper.toml")?;
//! let plan = ScrapeRequest {
//!     counties: CountySelector::List(vec!["Erie".into()]),
//!     filed_start: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
//!     filed_end: None,
//!     concurrency: None,
//! }
//! .validate(&config)?;
//! # Ok::<(), pa_docket_scraper::ScrapeError>(())
//! ```

use crate::counties;
use crate::errors::{Result, ScrapeError};
use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the scraper
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Portal endpoints and identifying headers
    pub portal: PortalConfig,
    /// Transport retry policy
    pub retry: RetryConfig,
    /// Concurrency and validation limits
    pub limits: LimitsConfig,
}

/// Portal endpoints and request identity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Site origin; also the prefix for relative docket detail links
    pub base_url: String,
    /// Path of the case search page (landing GET and search POST)
    pub search_path: String,
    /// Browser-identifying user-agent string the portal expects
    pub user_agent: String,
}

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per request, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub initial_backoff_ms: u64,
    /// Multiplier applied to the delay after each failed attempt
    pub backoff_multiplier: f64,
    /// Upper bound on a single backoff delay
    pub max_backoff_ms: u64,
}

/// Concurrency and input-policy limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// In-flight county jobs when the caller does not specify a limit
    pub default_concurrency: usize,
    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,
    /// Oldest permitted filed date, in days before today
    pub max_lookback_days: i64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ujsportal.pacourts.us".to_string(),
            search_path: "/CaseSearch".to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_14_6) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/88.0.4324.192 Safari/537.36"
                .to_string(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            backoff_multiplier: 2.0,
            max_backoff_ms: 10_000,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            default_concurrency: 5,
            request_timeout_seconds: 60,
            max_lookback_days: 365,
        }
    }
}

impl ScraperConfig {
    /// Load configuration from a TOML file, falling back to defaults for any
    /// omitted section.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| ScrapeError::Config {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        let config: ScraperConfig = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check configuration invariants once at load time.
    pub fn validate(&self) -> Result<()> {
        if self.portal.base_url.is_empty() {
            return Err(ScrapeError::Config {
                message: "portal.base_url must not be empty".to_string(),
            });
        }
        if self.retry.max_attempts == 0 {
            return Err(ScrapeError::Config {
                message: "retry.max_attempts must be at least 1".to_string(),
            });
        }
        if self.limits.default_concurrency == 0 {
            return Err(ScrapeError::Config {
                message: "limits.default_concurrency must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Full URL of the case search page
    pub fn search_url(&self) -> String {
        format!(
            "{}{}",
            self.portal.base_url.trim_end_matches('/'),
            self.portal.search_path
        )
    }

    /// Origin prefixed onto relative docket detail links
    pub fn origin(&self) -> &str {
        self.portal.base_url.trim_end_matches('/')
    }
}

/// County selection as supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountySelector {
    /// Scrape every county the portal knows about
    All,
    /// Scrape an explicit set of counties
    List(Vec<String>),
}

/// Caller input for one scrape run, unvalidated
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    /// Counties to scrape
    pub counties: CountySelector,
    /// Start of the filed-date range (inclusive)
    pub filed_start: NaiveDate,
    /// End of the filed-date range; defaults to the start date
    pub filed_end: Option<NaiveDate>,
    /// In-flight job limit; defaults to `limits.default_concurrency`
    pub concurrency: Option<usize>,
}

/// Validated, normalized input the core operates on
#[derive(Debug, Clone)]
pub struct ScrapePlan {
    /// Resolved, canonically-cased county names in fan-out order
    pub counties: Vec<String>,
    /// Start of the filed-date range (inclusive)
    pub filed_start: NaiveDate,
    /// End of the filed-date range (inclusive)
    pub filed_end: NaiveDate,
    /// In-flight job limit
    pub concurrency: usize,
}

impl ScrapeRequest {
    /// Validate the request against the configured date policy and the static
    /// county list. Runs before any network access; the resulting plan is the
    /// only input the core accepts.
    pub fn validate(self, config: &ScraperConfig) -> Result<ScrapePlan> {
        let today = Local::now().date_naive();
        let oldest = today - Duration::days(config.limits.max_lookback_days);

        check_filed_date("filed_start", self.filed_start, today, oldest)?;
        let filed_end = self.filed_end.unwrap_or(self.filed_start);
        check_filed_date("filed_end", filed_end, today, oldest)?;
        if filed_end < self.filed_start {
            return Err(ScrapeError::Validation {
                field: "filed_end".to_string(),
                reason: format!(
                    "end date {} precedes start date {}",
                    filed_end, self.filed_start
                ),
            });
        }

        let concurrency = self
            .concurrency
            .unwrap_or(config.limits.default_concurrency);
        if concurrency == 0 {
            return Err(ScrapeError::Validation {
                field: "concurrency".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let counties = match self.counties {
            CountySelector::All => counties::ALL_COUNTIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            CountySelector::List(names) => {
                if names.is_empty() {
                    return Err(ScrapeError::Validation {
                        field: "counties".to_string(),
                        reason: "county list must not be empty".to_string(),
                    });
                }
                counties::resolve_list(&names)?
            }
        };

        Ok(ScrapePlan {
            counties,
            filed_start: self.filed_start,
            filed_end,
            concurrency,
        })
    }
}

fn check_filed_date(
    field: &str,
    date: NaiveDate,
    today: NaiveDate,
    oldest: NaiveDate,
) -> Result<()> {
    if date > today {
        return Err(ScrapeError::Validation {
            field: field.to_string(),
            reason: format!("{} is in the future", date),
        });
    }
    if date < oldest {
        return Err(ScrapeError::Validation {
            field: field.to_string(),
            reason: format!("{} is earlier than the oldest permitted date {}", date, oldest),
        });
    }
    Ok(())
}
