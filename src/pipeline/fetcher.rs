//! HTTP page fetcher
//!
//! This module handles all requests to the origin site:
//! - Building a pooled HTTP client with a fixed user agent and timeout
//! - GET requests that return the page body
//! - Error classification (timeout, transport, non-success status)
//! - Memoizing the last successful body per URL, for the current day only

use crate::config::OriginConfig;
use crate::FetchError;
use chrono::{Local, NaiveDate};
use lru::LruCache;
use reqwest::Client;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The origin configuration (user agent and timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &OriginConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches origin pages and remembers recent bodies
///
/// The memo is bounded and evicts the least recently used URL first. It is
/// bound to the local calendar day: the first fetch on a new day empties it,
/// so a body memoized yesterday never answers for today even when nothing
/// else clears it.
///
/// Cloning is cheap; clones share the connection pool and the memo.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    memo: Arc<Mutex<Memo>>,
}

/// Memoized bodies and the day they were fetched on
#[derive(Debug)]
struct Memo {
    day: Option<NaiveDate>,
    pages: LruCache<String, String>,
}

impl Memo {
    fn roll_to(&mut self, day: NaiveDate) {
        if self.day == Some(day) {
            return;
        }
        if !self.pages.is_empty() {
            tracing::debug!("Dropping {} memoized pages from {:?}", self.pages.len(), self.day);
        }
        self.pages.clear();
        self.day = Some(day);
    }
}

impl PageFetcher {
    /// Creates a fetcher with a freshly built client
    pub fn new(config: &OriginConfig, memo_capacity: usize) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?, memo_capacity))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, memo_capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(memo_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            client,
            memo: Arc::new(Mutex::new(Memo {
                day: None,
                pages: LruCache::new(capacity),
            })),
        }
    }

    /// Fetches a URL and returns its body
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | URL memoized today | Memoized body, no request |
    /// | HTTP 2xx | Body, memoized |
    /// | Other HTTP status | `FetchError::Status` |
    /// | Timeout | `FetchError::Timeout` |
    /// | Any other client error | `FetchError::Transport` |
    ///
    /// Nothing is retried and failures are never memoized.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let memoized = {
            let mut memo = self.memo();
            memo.roll_to(Local::now().date_naive());
            memo.pages.get(url).cloned()
        };
        if let Some(body) = memoized {
            tracing::trace!("Memo hit for {}", url);
            return Ok(body);
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        self.memo().pages.put(url.to_string(), body.clone());
        tracing::debug!("Fetched {} ({} bytes)", url, body.len());

        Ok(body)
    }

    /// Forgets every memoized body
    pub fn clear_memo(&self) {
        self.memo().pages.clear();
    }

    /// Binds the memo to `day`, forgetting bodies memoized on any other day
    pub fn roll_memo_to(&self, day: NaiveDate) {
        self.memo().roll_to(day);
    }

    /// Number of memoized bodies
    pub fn memo_len(&self) -> usize {
        self.memo().pages.len()
    }

    fn memo(&self) -> MutexGuard<'_, Memo> {
        self.memo.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}
