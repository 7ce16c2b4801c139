//! Fetch orchestration
//!
//! Resolves a saint page URL into records. A single-saint page yields at most
//! one record; a list page fans out over its saint links with bounded
//! concurrency and keeps the records in link order.

use crate::pipeline::extractor::{saints_list_links, RecordExtractor};
use crate::pipeline::fetcher::PageFetcher;
use crate::record::SaintRecord;
use crate::FetchError;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Default number of saint pages fetched at once for one list page
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 5;

/// Drives the fetcher and extractor for one requested page
#[derive(Debug, Clone)]
pub struct FetchOrchestrator {
    fetcher: PageFetcher,
    extractor: Arc<RecordExtractor>,
    max_concurrent: usize,
}

impl FetchOrchestrator {
    pub fn new(fetcher: PageFetcher, extractor: RecordExtractor, max_concurrent: usize) -> Self {
        Self {
            fetcher,
            extractor: Arc::new(extractor),
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    /// Resolves a page into saint records
    ///
    /// # Flow
    ///
    /// 1. Fetch `url`; failure here fails the whole call
    /// 2. If the page has a saints list, fetch and extract every linked page
    ///    with at most `max_concurrent` in flight. Pages that fail to fetch or
    ///    extract are logged and left out
    /// 3. Otherwise extract the page itself; a page that does not extract
    ///    yields no records
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<SaintRecord>)` - Records in link order, possibly empty
    /// * `Err(FetchError)` - The top-level page could not be fetched
    pub async fn resolve(&self, url: &Url) -> Result<Vec<SaintRecord>, FetchError> {
        let body = self.fetcher.fetch(url.as_str()).await?;

        let links = match saints_list_links(&body, url) {
            Ok(links) => links,
            Err(e) => {
                tracing::error!("Failed to inspect {} for a saints list: {}", url, e);
                return Ok(Vec::new());
            }
        };

        match links {
            Some(links) => {
                tracing::debug!("{} lists {} saints", url, links.len());
                Ok(self.fan_out(links).await)
            }
            None => match self.extractor.extract(&body) {
                Ok(record) => Ok(vec![record]),
                Err(e) => {
                    tracing::warn!("No saint extracted from {}: {}", url, e);
                    Ok(Vec::new())
                }
            },
        }
    }

    /// Fetches and extracts every link, keeping results in input order
    async fn fan_out(&self, links: Vec<Url>) -> Vec<SaintRecord> {
        let total = links.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut workers = JoinSet::new();

        for (index, link) in links.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let fetcher = self.fetcher.clone();
            let extractor = Arc::clone(&self.extractor);

            workers.spawn(async move {
                let record = match semaphore.acquire_owned().await {
                    Ok(_permit) => fetch_record(&fetcher, &extractor, &link).await,
                    Err(_) => None,
                };
                (index, record)
            });
        }

        let mut slots: Vec<Option<SaintRecord>> = vec![None; total];
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((index, record)) => slots[index] = record,
                Err(e) => tracing::error!("Saint page worker failed: {}", e),
            }
        }

        let records: Vec<SaintRecord> = slots.into_iter().flatten().collect();
        if records.len() < total {
            tracing::warn!(
                "Dropped {} of {} saint pages",
                total - records.len(),
                total
            );
        }
        records
    }
}

/// Fetches and extracts one saint page, logging and swallowing failures
async fn fetch_record(
    fetcher: &PageFetcher,
    extractor: &RecordExtractor,
    url: &Url,
) -> Option<SaintRecord> {
    let body = match fetcher.fetch(url.as_str()).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Skipping saint page: {}", e);
            return None;
        }
    };

    match extractor.extract(&body) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!("Skipping saint page {}: {}", url, e);
            None
        }
    }
}
