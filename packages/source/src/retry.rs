//! HTTP retry helpers for transient errors.
//!
//! Fetchers call [`send_json`] instead of `reqwest::RequestBuilder::send()`
//! so that every request is retried with exponential backoff on timeouts,
//! connection resets, HTTP 429 and HTTP 5xx.
//!
//! ```ignore
//! let body = retry::send_json(|| client.get(&url).query(&params)).await?;
//! ```

use std::time::Duration;

use crate::SourceError;

/// Maximum number of retry attempts for transient HTTP errors.
///
/// Backoff doubles from 2s, so five retries wait 62 seconds in total.
const MAX_RETRIES: u32 = 5;

/// Maximum number of full re-fetches when a response body cannot be
/// decoded (truncated JSON and the like).
const MAX_BODY_RETRIES: u32 = 3;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 300;

/// Sends an HTTP request and parses the response body as JSON.
///
/// `build_request` is called once per attempt since request builders are
/// consumed by `.send()`. Connection-level failures are retried by
/// [`send_inner`]; a response whose body fails to decode is re-fetched up
/// to [`MAX_BODY_RETRIES`] times. HTTP 4xx other than 429 is permanent.
///
/// # Errors
///
/// Returns [`SourceError`] if the request still fails after all retries,
/// the server returns a non-retryable status, or the body never decodes.
#[allow(clippy::future_not_send)]
pub async fn send_json<F>(build_request: F) -> Result<serde_json::Value, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut body_attempt = 0;

    loop {
        let response = send_inner(&build_request, MAX_RETRIES).await?;
        let url = response.url().to_string();
        let status = response.status();

        let failure = match response.text().await {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let preview: String = text.chars().take(BODY_PREVIEW_LEN).collect();
                    log::debug!("Undecodable body from {url}: {preview}");
                    SourceError::Normalization {
                        message: format!(
                            "JSON parse failed: {e} (status={status}, received {} bytes)",
                            text.len()
                        ),
                    }
                }
            },
            Err(e) => SourceError::Http(e),
        };

        if body_attempt >= MAX_BODY_RETRIES {
            log::error!("Giving up on {url} after {MAX_BODY_RETRIES} body retries: {failure}");
            return Err(failure);
        }

        body_attempt += 1;
        let delay = Duration::from_secs(1u64 << body_attempt);
        log::warn!(
            "Body read failed for {url} (body retry {body_attempt}/{MAX_BODY_RETRIES}), \
             re-fetching in {delay:?}: {failure}"
        );
        tokio::time::sleep(delay).await;
    }
}

/// Sends the request built by `build_request`, retrying transient errors
/// up to `max_retries` times with exponential backoff.
#[allow(clippy::future_not_send)]
async fn send_inner<F>(
    build_request: &F,
    max_retries: u32,
) -> Result<reqwest::Response, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;

    loop {
        let retryable = match build_request().send().await {
            Err(e) if is_transient(&e) => SourceError::Http(e),
            Err(e) => return Err(SourceError::Http(e)),
            Ok(response) => {
                let status = response.status();
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    SourceError::Normalization {
                        message: format!("HTTP {status}"),
                    }
                } else if status.is_client_error() {
                    return Err(SourceError::Normalization {
                        message: format!("HTTP {status}"),
                    });
                } else {
                    return Ok(response);
                }
            }
        };

        if attempt >= max_retries {
            log::error!("Request failed after {max_retries} retries: {retryable}");
            return Err(retryable);
        }

        attempt += 1;
        let delay = Duration::from_secs(1u64 << attempt);
        log::warn!("  {retryable}; retry {attempt}/{max_retries} in {delay:?}...");
        tokio::time::sleep(delay).await;
    }
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_decode() || e.is_request()
}
