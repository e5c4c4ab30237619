//! Application-level configuration loading: upstream endpoints, routing defaults, rate
//! limits, and cache lifetimes.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::riot::routing::{Region, Shard};

/// Default location on disk where the bot looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SPIKE_STATS_CONFIG_PATH";
const DEFAULT_LINKS_PATH: &str = "data/links.json";

/// Token bucket settings for the shared upstream gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Permits available per interval.
    pub capacity: u32,
    /// Time after which the bucket refills.
    pub interval: Duration,
}

/// Retry behaviour for upstream `429 Too Many Requests` responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first rate-limited attempt.
    pub max_retries: u32,
    /// Wait used when `Retry-After` is absent or unusable.
    pub default_retry_after: Duration,
}

/// Lifetimes for each cached endpoint class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Match history lifetime.
    pub match_list_ttl: Duration,
    /// Single match record lifetime.
    pub match_ttl: Duration,
    /// Agent and map roster lifetime.
    pub asset_ttl: Duration,
}

/// Base URLs for the upstream services. `{region}` and `{shard}` are substituted per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Account endpoint base, with a `{region}` placeholder.
    pub account_base_url: String,
    /// Match endpoint base, with a `{shard}` placeholder.
    pub match_base_url: String,
    /// Static asset service base.
    pub assets_base_url: String,
}

/// How many matches the stats commands fetch when the caller does not say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchCountConfig {
    /// Count used when none is given.
    pub default: u8,
    /// Upper bound on any requested count.
    pub max: u8,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Key sent as `X-Riot-Token`.
    pub api_key: String,
    /// Region used when neither an override nor a link sets one.
    pub default_region: Region,
    /// Shard used when neither an override nor a link sets one.
    pub default_shard: Shard,
    /// Outbound request budget.
    pub rate_limit: RateLimitConfig,
    /// 429 handling.
    pub retry: RetryConfig,
    /// Cache lifetimes.
    pub cache: CacheConfig,
    /// Upstream endpoints.
    pub api: ApiConfig,
    /// Stats command match counts.
    pub match_count: MatchCountConfig,
    /// File backing the link store.
    pub links_path: PathBuf,
}

impl AppConfig {
    /// Load the configuration file (falling back to built-in defaults) and apply
    /// environment overrides on top.
    pub fn load() -> Self {
        let mut config = Self::load_file();
        config.apply_env();
        config
    }

    fn load_file() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded configuration file");
                    raw.into()
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    fn apply_env(&mut self) {
        match env::var("RIOT_API_KEY") {
            Ok(key) => self.api_key = key,
            Err(_) => warn!("RIOT_API_KEY is not set; upstream calls will be rejected"),
        }

        if let Ok(value) = env::var("DEFAULT_REGION") {
            match value.parse() {
                Ok(region) => self.default_region = region,
                Err(err) => warn!(error = %err, "ignoring DEFAULT_REGION"),
            }
        }
        if let Ok(value) = env::var("DEFAULT_SHARD") {
            match value.parse() {
                Ok(shard) => self.default_shard = shard,
                Err(err) => warn!(error = %err, "ignoring DEFAULT_SHARD"),
            }
        }

        if let Some(path) = env::var_os("LINKS_PATH").filter(|p| !p.is_empty()) {
            self.links_path = PathBuf::from(path);
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            default_region: Region::Americas,
            default_shard: Shard::Na,
            rate_limit: RateLimitConfig {
                capacity: 20,
                interval: Duration::from_secs(10),
            },
            retry: RetryConfig {
                max_retries: 2,
                default_retry_after: Duration::from_secs(1),
            },
            cache: CacheConfig {
                match_list_ttl: Duration::from_secs(30),
                match_ttl: Duration::from_secs(60),
                asset_ttl: Duration::from_secs(60 * 60),
            },
            api: ApiConfig {
                account_base_url: "https://{region}.api.riotgames.com".into(),
                match_base_url: "https://{shard}.api.riotgames.com".into(),
                assets_base_url: "https://valorant-api.com/v1".into(),
            },
            match_count: MatchCountConfig { default: 5, max: 20 },
            links_path: PathBuf::from(DEFAULT_LINKS_PATH),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    default_region: Option<Region>,
    default_shard: Option<Shard>,
    rate_limit: RawRateLimit,
    retry: RawRetry,
    cache: RawCache,
    api: RawApi,
    match_count: RawMatchCount,
    links_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRateLimit {
    capacity: Option<u32>,
    interval_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRetry {
    max_retries: Option<u32>,
    default_retry_after_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCache {
    match_list_ttl_secs: Option<u64>,
    match_ttl_secs: Option<u64>,
    asset_ttl_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawApi {
    account_base_url: Option<String>,
    match_base_url: Option<String>,
    assets_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMatchCount {
    default: Option<u8>,
    max: Option<u8>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = AppConfig::default();
        let max = raw
            .match_count
            .max
            .unwrap_or(defaults.match_count.max)
            .max(1);

        Self {
            api_key: defaults.api_key,
            default_region: raw.default_region.unwrap_or(defaults.default_region),
            default_shard: raw.default_shard.unwrap_or(defaults.default_shard),
            rate_limit: RateLimitConfig {
                capacity: raw
                    .rate_limit
                    .capacity
                    .unwrap_or(defaults.rate_limit.capacity)
                    .max(1),
                interval: raw
                    .rate_limit
                    .interval_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.rate_limit.interval),
            },
            retry: RetryConfig {
                max_retries: raw.retry.max_retries.unwrap_or(defaults.retry.max_retries),
                default_retry_after: raw
                    .retry
                    .default_retry_after_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.retry.default_retry_after),
            },
            cache: CacheConfig {
                match_list_ttl: raw
                    .cache
                    .match_list_ttl_secs
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.cache.match_list_ttl),
                match_ttl: raw
                    .cache
                    .match_ttl_secs
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.cache.match_ttl),
                asset_ttl: raw
                    .cache
                    .asset_ttl_secs
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.cache.asset_ttl),
            },
            api: ApiConfig {
                account_base_url: raw
                    .api
                    .account_base_url
                    .unwrap_or(defaults.api.account_base_url),
                match_base_url: raw
                    .api
                    .match_base_url
                    .unwrap_or(defaults.api.match_base_url),
                assets_base_url: raw
                    .api
                    .assets_base_url
                    .unwrap_or(defaults.api.assets_base_url),
            },
            match_count: MatchCountConfig {
                default: raw
                    .match_count
                    .default
                    .unwrap_or(defaults.match_count.default)
                    .clamp(1, max),
                max,
            },
            links_path: raw.links_path.unwrap_or(defaults.links_path),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
