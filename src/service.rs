//! Cache-aside access to saint records
//!
//! [`SaintService`] is the one object the HTTP routes and the refresh job
//! share. It owns the result cache, the page fetcher and the orchestrator,
//! and is built once at startup and passed around behind an `Arc`.

use crate::cache::{CacheKey, CacheStore};
use crate::config::Config;
use crate::pipeline::{FetchOrchestrator, PageFetcher, RecordExtractor};
use crate::record::SaintRecord;
use crate::FetchError;
use chrono::{Datelike, Local, NaiveDate};
use std::time::Duration;
use url::Url;

/// A question the API can ask of the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaintQuery {
    /// Whatever the origin shows as today's saint
    Today,
    /// The saints of a given day and month, passed to the origin unchecked
    Date { day: u32, month: u32 },
}

impl SaintQuery {
    /// The date query for a calendar date
    pub fn for_date(date: NaiveDate) -> Self {
        Self::Date {
            day: date.day(),
            month: date.month(),
        }
    }

    /// Cache key for this query on `date`
    pub fn cache_key(&self, date: NaiveDate) -> CacheKey {
        match self {
            Self::Today => CacheKey::derive("today", &[], date),
            Self::Date { day, month } => CacheKey::derive(
                "date",
                &[("day", day.to_string()), ("month", month.to_string())],
                date,
            ),
        }
    }

    /// Origin URL answering this query
    pub fn url(&self, saint_page: &Url) -> Url {
        let mut url = saint_page.clone();
        if let Self::Date { day, month } = self {
            url.query_pairs_mut()
                .append_pair("day", &day.to_string())
                .append_pair("month", &month.to_string());
        }
        url
    }
}

/// Whether a lookup was answered from the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
        }
    }
}

/// Records for a query along with how they were obtained
#[derive(Debug, Clone)]
pub struct Lookup {
    pub records: Vec<SaintRecord>,
    pub cache_status: CacheStatus,
}

/// Cache-aside front of the fetch pipeline
#[derive(Debug)]
pub struct SaintService {
    cache: CacheStore<Vec<SaintRecord>>,
    orchestrator: FetchOrchestrator,
    saint_page: Url,
    ttl: Duration,
}

impl SaintService {
    /// Builds the service and its HTTP client from configuration
    pub fn new(config: &Config) -> crate::Result<Self> {
        let saint_page = Url::parse(&config.origin.base_url)?.join(&config.origin.saint_path)?;
        let fetcher = PageFetcher::new(&config.origin, config.cache.memo_capacity)?;
        let extractor = RecordExtractor::new(config.origin.base_url.as_str());
        let orchestrator = FetchOrchestrator::new(
            fetcher,
            extractor,
            config.pipeline.max_concurrent_fetches,
        );

        Ok(Self {
            cache: CacheStore::new(),
            orchestrator,
            saint_page,
            ttl: Duration::from_secs(config.cache.ttl_secs),
        })
    }

    pub fn cache(&self) -> &CacheStore<Vec<SaintRecord>> {
        &self.cache
    }

    pub fn fetcher(&self) -> &PageFetcher {
        self.orchestrator.fetcher()
    }

    /// Today's saints
    pub async fn today(&self) -> Result<Lookup, FetchError> {
        self.lookup(SaintQuery::Today).await
    }

    /// The saints of a day and month
    pub async fn for_date(&self, day: u32, month: u32) -> Result<Lookup, FetchError> {
        self.lookup(SaintQuery::Date { day, month }).await
    }

    /// Answers a query from the cache, resolving and caching it on a miss
    ///
    /// An empty record list is a valid answer and is cached like any other.
    pub async fn lookup(&self, query: SaintQuery) -> Result<Lookup, FetchError> {
        self.lookup_on(query, Local::now().date_naive()).await
    }

    /// Answers a query as of the calendar day `today`
    ///
    /// On a miss the fetch memo is first rolled to `today`, so the first miss
    /// of a new day never resolves from pages memoized the day before.
    pub async fn lookup_on(
        &self,
        query: SaintQuery,
        today: NaiveDate,
    ) -> Result<Lookup, FetchError> {
        let key = query.cache_key(today);

        let stats = self.cache.stats();
        tracing::debug!(
            hits = stats.hits,
            misses = stats.misses,
            entries = stats.entries,
            "Cache statistics"
        );

        if let Some(records) = self.cache.get(&key) {
            tracing::debug!("Cache hit for {:?}", query);
            return Ok(Lookup {
                records,
                cache_status: CacheStatus::Hit,
            });
        }

        tracing::debug!("Cache miss for {:?}", query);
        self.fetcher().roll_memo_to(today);
        let records = self.orchestrator.resolve(&query.url(&self.saint_page)).await?;
        self.cache.set(key, records.clone(), self.ttl);

        Ok(Lookup {
            records,
            cache_status: CacheStatus::Miss,
        })
    }

    /// Resolves a query and stores the result under `date`'s key, bypassing reads
    ///
    /// Returns the number of records stored.
    pub async fn warm(&self, query: SaintQuery, date: NaiveDate) -> Result<usize, FetchError> {
        self.fetcher().roll_memo_to(date);
        let records = self.orchestrator.resolve(&query.url(&self.saint_page)).await?;
        let count = records.len();
        self.cache.set(query.cache_key(date), records, self.ttl);
        Ok(count)
    }

    /// Empties the result cache and the fetch memo
    pub fn clear_caches(&self) {
        self.cache.clear();
        self.fetcher().clear_memo();
        tracing::info!("Cleared result cache and fetch memo");
    }
}
