//! # Retrying Transport Module
//!
//! ## Purpose
//! Performs a single logical HTTP exchange with bounded retry, exponential
//! backoff, and status validation. Every network round trip in the crate goes
//! through this layer.
//!
//! ## Input/Output Specification
//! - **Input**: A request factory, invoked once per attempt (multipart bodies
//!   are not reusable across attempts)
//! - **Output**: A success-status response, or `ScrapeError::Http` carrying the
//!   last observed status once the retry budget is exhausted
//! - **Retryable**: Network errors, 408, 429, and all 5xx responses
//!
//! ## Key Features
//! - Bounded attempts with exponential backoff and a delay cap
//! - Immediate failure on non-retryable 4xx client errors
//! - No silent pass-through of error bodies: non-2xx never reaches callers

use crate::config::RetryConfig;
use crate::errors::{retryable_status, Result, ScrapeError};
use tokio::time::{sleep, Duration};
use tracing::warn;

/// Transport wrapper applying the retry policy to each exchange
#[derive(Debug, Clone)]
pub struct RetryingTransport {
    policy: RetryConfig,
}

impl RetryingTransport {
    /// Create a transport with the given retry policy
    pub fn new(policy: RetryConfig) -> Self {
        Self { policy }
    }

    /// Execute one logical exchange. `build_request` is called once per
    /// attempt to produce a fresh request.
    pub async fn execute<F>(&self, build_request: F) -> Result<reqwest::Response>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let outcome = build_request().send().await;
            let last_attempt = attempt == max_attempts;

            match outcome {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    let error = ScrapeError::Http {
                        status_code: status.as_u16(),
                        message: status
                            .canonical_reason()
                            .unwrap_or("unrecognized status")
                            .to_string(),
                    };
                    if last_attempt || !retryable_status(status.as_u16()) {
                        return Err(error);
                    }
                    warn!(
                        attempt,
                        max_attempts,
                        status = status.as_u16(),
                        "retryable response status, backing off"
                    );
                }
                Err(err) => {
                    if last_attempt {
                        return Err(err.into());
                    }
                    warn!(attempt, max_attempts, error = %err, "request failed, backing off");
                }
            }

            sleep(self.backoff_delay(attempt)).await;
        }

        Err(ScrapeError::Internal {
            message: "retry loop exited without an outcome".to_string(),
        })
    }

    /// Delay before the attempt following `attempt` failures
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = self.policy.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        let delay = (self.policy.initial_backoff_ms as f64 * factor) as u64;
        Duration::from_millis(delay.min(self.policy.max_backoff_ms))
    }
}
