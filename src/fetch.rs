//! HTTP client wrapping reqwest for the probing tiers.
//!
//! Three request shapes, one per tier family: a metadata-only HEAD, a
//! `Range` GET, and an unrestricted GET. Requests are single-shot — a
//! failed probe waits for the next scheduled run rather than retrying.

use reqwest::header::{CONTENT_LENGTH, CONTENT_RANGE, RANGE};
use std::time::Duration;
use thiserror::Error;

/// Failure modes of a single request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network, DNS, timeout, or protocol failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with a status the tier cannot use.
    #[error("unexpected status {0}")]
    Status(u16),
}

/// Body bytes plus what the response revealed about the whole document.
#[derive(Debug, Clone)]
pub struct FetchedBody {
    /// HTTP status code (200 or 206 for range requests).
    pub status: u16,
    /// Raw body bytes as transferred.
    pub body: Vec<u8>,
    /// Total document length, when the response declared one
    /// (`Content-Range` total for partial responses, body size for full).
    pub total_len: Option<u64>,
}

/// HTTP client shared by all tiers of the cascade.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl Fetcher {
    /// Build a client with the configured timeout and user agent.
    pub fn new(timeout_ms: u64, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(user_agent)
            .build()
            .unwrap_or_default();
        Self {
            client,
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// HEAD the resource and read its declared `Content-Length`.
    ///
    /// `Ok(None)` means the server answered but declared no usable length
    /// (absent or non-numeric header).
    pub async fn head_content_length(&self, url: &str) -> Result<Option<u64>, FetchError> {
        let resp = self
            .client
            .head(url)
            .timeout(self.timeout)
            .send()
            .await?;
        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(FetchError::Status(status));
        }
        Ok(resp
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok()))
    }

    /// GET an inclusive byte range `[start, end]`.
    ///
    /// Servers that ignore `Range` answer 200 with the full body; both 200
    /// and 206 are accepted and the caller works with whatever arrived.
    pub async fn get_range(&self, url: &str, start: u64, end: u64) -> Result<FetchedBody, FetchError> {
        let resp = self
            .client
            .get(url)
            .header(RANGE, format!("bytes={start}-{end}"))
            .timeout(self.timeout)
            .send()
            .await?;
        let status = resp.status().as_u16();
        if status != 200 && status != 206 {
            return Err(FetchError::Status(status));
        }
        let total_len = content_range_total(resp.headers());
        let body = resp.bytes().await?.to_vec();
        let total_len = total_len.or_else(|| {
            // A 200 means the server sent the whole document.
            (status == 200).then_some(body.len() as u64)
        });
        Ok(FetchedBody {
            status,
            body,
            total_len,
        })
    }

    /// GET the entire document.
    pub async fn get_full(&self, url: &str) -> Result<FetchedBody, FetchError> {
        let resp = self.client.get(url).timeout(self.timeout).send().await?;
        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(FetchError::Status(status));
        }
        let body = resp.bytes().await?.to_vec();
        let total_len = Some(body.len() as u64);
        Ok(FetchedBody {
            status,
            body,
            total_len,
        })
    }
}

/// Total document size from a `Content-Range: bytes a-b/total` header.
fn content_range_total(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    let value = headers.get(CONTENT_RANGE)?.to_str().ok()?;
    let total = value.rsplit('/').next()?;
    total.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;

    fn headers_with_range(v: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(CONTENT_RANGE, v.parse().unwrap());
        h
    }

    #[test]
    fn test_content_range_total() {
        let h = headers_with_range("bytes 0-49999/1234567");
        assert_eq!(content_range_total(&h), Some(1_234_567));
    }

    #[test]
    fn test_content_range_unknown_total() {
        let h = headers_with_range("bytes 0-49999/*");
        assert_eq!(content_range_total(&h), None);
    }

    #[test]
    fn test_content_range_absent() {
        assert_eq!(content_range_total(&HeaderMap::new()), None);
    }

    #[test]
    fn test_fetcher_builds() {
        let f = Fetcher::new(10_000, "lexwatch-test");
        let _ = f;
    }
}
