//! Fetch → parse pipeline
//!
//! This module contains the scraping side of the service:
//! - HTTP fetching with a short-lived body memo
//! - Positional extraction of saint records from HTML
//! - Fan-out over list pages with bounded concurrency
//! - The daily refresh job that clears and pre-warms the caches

mod extractor;
mod fetcher;
mod orchestrator;
mod refresh;

pub use extractor::{saints_list_links, RecordExtractor, Sections};
pub use fetcher::{build_http_client, PageFetcher};
pub use orchestrator::{FetchOrchestrator, DEFAULT_MAX_CONCURRENT_FETCHES};
pub use refresh::{
    duration_until_next, RefreshHandle, RefreshReport, RefreshSchedule, RefreshScheduler,
};
