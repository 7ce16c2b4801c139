//! Date-bound cache key derivation

use chrono::{Local, NaiveDate};
use sha2::{Digest, Sha256};
use std::fmt;

/// Opaque, fixed-length cache key
///
/// Keys embed the calendar date, so the same operation and parameters map
/// to a different key every day.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives a key from an operation name, its parameters, and a date
    ///
    /// Parameters are sorted by name before hashing, so their order in
    /// `params` does not matter. The hashed string is the operation, each
    /// `name:value` pair, and the date joined by `_`, for example
    /// `date_day:18_month:10_2024-10-18`.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use daily_saints::cache::CacheKey;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 10, 18).unwrap();
    /// let a = CacheKey::derive("date", &[("day", "18".into()), ("month", "10".into())], date);
    /// let b = CacheKey::derive("date", &[("month", "10".into()), ("day", "18".into())], date);
    /// assert_eq!(a, b);
    /// assert_eq!(a.as_str().len(), 64);
    /// ```
    pub fn derive(operation: &str, params: &[(&str, String)], date: NaiveDate) -> Self {
        let mut sorted: Vec<&(&str, String)> = params.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let mut parts = Vec::with_capacity(sorted.len() + 2);
        parts.push(operation.to_string());
        parts.extend(sorted.iter().map(|(name, value)| format!("{}:{}", name, value)));
        parts.push(date.format("%Y-%m-%d").to_string());

        let mut hasher = Sha256::new();
        hasher.update(parts.join("_").as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Derives a key bound to today's local calendar date
    pub fn for_today(operation: &str, params: &[(&str, String)]) -> Self {
        Self::derive(operation, params, Local::now().date_naive())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
