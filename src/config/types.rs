use serde::Deserialize;

/// Main configuration structure for the daily saints service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub origin: OriginConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

/// HTTP API listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address the API binds to
    #[serde(rename = "bind-address", default = "default_bind_address")]
    pub bind_address: String,
}

/// Origin site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OriginConfig {
    /// Scheme and host of the origin, also the prefix for portrait URLs
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Path of the saint-of-the-day page
    #[serde(rename = "saint-path", default = "default_saint_path")]
    pub saint_path: String,

    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of a cached result list (seconds)
    #[serde(rename = "ttl-secs", default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Number of page bodies the fetcher memoizes
    #[serde(rename = "memo-capacity", default = "default_memo_capacity")]
    pub memo_capacity: usize,
}

/// Fan-out configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Maximum child pages fetched at once for a single list page
    #[serde(
        rename = "max-concurrent-fetches",
        default = "default_max_concurrent_fetches"
    )]
    pub max_concurrent_fetches: usize,
}

/// Daily refresh configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Whether the daily refresh job runs at all
    #[serde(default = "default_refresh_enabled")]
    pub enabled: bool,

    /// Local time of day the job fires, as `HH:MM`
    #[serde(rename = "daily-at", default = "default_daily_at")]
    pub daily_at: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            saint_path: default_saint_path(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            memo_capacity: default_memo_capacity(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: default_refresh_enabled(),
            daily_at: default_daily_at(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_base_url() -> String {
    "https://www.a12.com".to_string()
}

fn default_saint_path() -> String {
    "/reze-no-santuario/santo-do-dia".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/107.0.0.0 Safari/537.36".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_ttl_secs() -> u64 {
    86_400
}

fn default_memo_capacity() -> usize {
    128
}

fn default_max_concurrent_fetches() -> usize {
    5
}

fn default_refresh_enabled() -> bool {
    true
}

fn default_daily_at() -> String {
    "00:00".to_string()
}
