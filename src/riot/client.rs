//! Rate-gated, retrying and caching client for the account and match endpoints.

use std::{sync::Arc, time::Duration};

use futures::future::try_join_all;
use reqwest::{Client, StatusCode, Url, header::HeaderMap, header::RETRY_AFTER};
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{
    cache::TtlCache,
    config::{ApiConfig, AppConfig, CacheConfig, RetryConfig},
};

use super::{
    error::{ApiError, ApiResult, body_excerpt},
    models::{Account, MatchList, MatchRecord},
    rate_gate::RateGate,
    routing::{Region, Shard},
};

const API_KEY_HEADER: &str = "X-Riot-Token";

/// Client for the account and match endpoints.
///
/// Every request first takes a permit from the shared [`RateGate`]. Match lists and
/// match records are cached per shard; account lookups are not.
pub struct RiotClient {
    http: Client,
    api_key: Arc<str>,
    api: ApiConfig,
    retry: RetryConfig,
    ttl: CacheConfig,
    gate: Arc<RateGate>,
    match_lists: TtlCache<(Shard, String), Arc<MatchList>>,
    matches: TtlCache<(Shard, String), Arc<MatchRecord>>,
}

impl RiotClient {
    /// Client sharing `http` and `gate` with the rest of the process.
    pub fn new(http: Client, config: &AppConfig, gate: Arc<RateGate>) -> Self {
        Self {
            http,
            api_key: Arc::from(config.api_key.as_str()),
            api: config.api.clone(),
            retry: config.retry,
            ttl: config.cache,
            gate,
            match_lists: TtlCache::new(),
            matches: TtlCache::new(),
        }
    }

    /// Look up an account by display name and tag in the given region.
    pub async fn account_by_riot_id(
        &self,
        region: Region,
        game_name: &str,
        tag_line: &str,
    ) -> ApiResult<Account> {
        let url = endpoint(
            &regional_base(&self.api.account_base_url, region),
            &["riot", "account", "v1", "accounts", "by-riot-id", game_name, tag_line],
        )?;
        self.call(url.as_str()).await
    }

    /// Full match history of a player, most recent first.
    pub async fn match_list(&self, shard: Shard, puuid: &str) -> ApiResult<Arc<MatchList>> {
        let key = (shard, puuid.to_string());
        if let Some(list) = self.match_lists.get(&key) {
            debug!(%shard, puuid, "match list cache hit");
            return Ok(list);
        }
        debug!(%shard, puuid, "match list cache miss");

        let url = endpoint(
            &sharded_base(&self.api.match_base_url, shard),
            &["val", "match", "v1", "matchlists", "by-puuid", puuid],
        )?;
        let list = Arc::new(self.call::<MatchList>(url.as_str()).await?);
        self.match_lists
            .set(key, list.clone(), self.ttl.match_list_ttl);
        Ok(list)
    }

    /// Up to `count` match identifiers starting `offset` games back.
    pub async fn recent_match_ids(
        &self,
        shard: Shard,
        puuid: &str,
        offset: usize,
        count: usize,
    ) -> ApiResult<Vec<String>> {
        Ok(self.match_list(shard, puuid).await?.ids(offset, count))
    }

    /// Full record of a single match.
    pub async fn match_record(&self, shard: Shard, match_id: &str) -> ApiResult<Arc<MatchRecord>> {
        let key = (shard, match_id.to_string());
        if let Some(record) = self.matches.get(&key) {
            debug!(%shard, match_id, "match cache hit");
            return Ok(record);
        }
        debug!(%shard, match_id, "match cache miss");

        let url = endpoint(
            &sharded_base(&self.api.match_base_url, shard),
            &["val", "match", "v1", "matches", match_id],
        )?;
        let record = Arc::new(self.call::<MatchRecord>(url.as_str()).await?);
        self.matches.set(key, record.clone(), self.ttl.match_ttl);
        Ok(record)
    }

    /// Records of the player's most recent matches, in history order.
    pub async fn recent_matches(
        &self,
        shard: Shard,
        puuid: &str,
        offset: usize,
        count: usize,
    ) -> ApiResult<Vec<Arc<MatchRecord>>> {
        let ids = self.recent_match_ids(shard, puuid, offset, count).await?;
        try_join_all(ids.iter().map(|id| self.match_record(shard, id))).await
    }

    /// Issue a gated GET, retrying `429` responses up to the configured budget.
    async fn call<T>(&self, url: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let mut retries = 0;

        loop {
            self.gate.acquire().await;

            let response = self
                .http
                .get(url)
                .header(API_KEY_HEADER, &*self.api_key)
                .send()
                .await
                .map_err(|source| ApiError::Network {
                    url: url.to_string(),
                    source,
                })?;

            let status = response.status();
            if status.is_success() {
                return response.json::<T>().await.map_err(|source| ApiError::Decode {
                    url: url.to_string(),
                    source,
                });
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                if retries >= self.retry.max_retries {
                    warn!(url, attempts = retries + 1, "upstream rate limit retries exhausted");
                    return Err(ApiError::RateLimited {
                        url: url.to_string(),
                        attempts: retries + 1,
                    });
                }

                let wait = retry_after(response.headers()).unwrap_or(self.retry.default_retry_after);
                retries += 1;
                warn!(
                    url,
                    attempt = retries,
                    retry_after_ms = wait.as_millis() as u64,
                    "upstream rate limited; retrying"
                );
                sleep(wait).await;
                continue;
            }

            let body = response
                .text()
                .await
                .map(|body| body_excerpt(&body))
                .unwrap_or_default();
            warn!(url, %status, "upstream request failed");
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }
    }
}

/// Parse a `Retry-After` header expressed in (possibly fractional) seconds.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let seconds = headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()?;
    Duration::try_from_secs_f64(seconds).ok()
}

fn regional_base(template: &str, region: Region) -> String {
    template
        .replace("{region}", region.as_str())
        .trim_end_matches('/')
        .to_string()
}

fn sharded_base(template: &str, shard: Shard) -> String {
    template
        .replace("{shard}", shard.as_str())
        .trim_end_matches('/')
        .to_string()
}

/// Append percent-encoded path segments to an upstream base URL.
fn endpoint(base: &str, segments: &[&str]) -> ApiResult<Url> {
    let invalid = || ApiError::InvalidUrl {
        url: base.to_string(),
    };
    let mut url = Url::parse(base).map_err(|_| invalid())?;
    url.path_segments_mut()
        .map_err(|_| invalid())?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server};
    use reqwest::header::HeaderValue;

    use super::*;
    use crate::config::RateLimitConfig;

    fn test_config(base_url: &str) -> AppConfig {
        let mut config = AppConfig::default();
        config.api_key = "test-key".into();
        config.api.account_base_url = base_url.to_string();
        config.api.match_base_url = base_url.to_string();
        config.retry.default_retry_after = Duration::ZERO;
        config.rate_limit = RateLimitConfig {
            capacity: 100,
            interval: Duration::from_secs(10),
        };
        config
    }

    fn test_client(base_url: &str) -> RiotClient {
        let config = test_config(base_url);
        RiotClient::new(
            Client::new(),
            &config,
            Arc::new(RateGate::from_config(config.rate_limit)),
        )
    }

    const MATCH_BODY: &str = r#"{
        "matchInfo": { "matchId": "m1", "mapId": "/Game/Maps/Ascent/Ascent", "queueId": "competitive" },
        "players": [],
        "teams": []
    }"#;

    #[tokio::test]
    async fn account_lookup_sends_api_key_and_encodes_name() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/riot/account/v1/accounts/by-riot-id/Nick%20Name/TAG")
            .match_header("x-riot-token", "test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"puuid":"p-1","gameName":"Nick Name","tagLine":"TAG"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let account = client
            .account_by_riot_id(Region::Americas, "Nick Name", "TAG")
            .await
            .unwrap();

        assert_eq!(account.puuid, "p-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn retries_after_rate_limit_then_succeeds() {
        let mut server = Server::new_async().await;
        let limited = server
            .mock("GET", "/val/match/v1/matches/m1")
            .with_status(429)
            .with_header("retry-after", "0")
            .expect(1)
            .create_async()
            .await;
        let ok = server
            .mock("GET", "/val/match/v1/matches/m1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(MATCH_BODY)
            .expect(1)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let record = client.match_record(Shard::Na, "m1").await.unwrap();

        assert_eq!(record.match_info.queue_id, "competitive");
        limited.assert_async().await;
        ok.assert_async().await;
    }

    #[tokio::test]
    async fn unusable_retry_after_falls_back_to_default_wait() {
        let mut server = Server::new_async().await;
        let limited = server
            .mock("GET", "/val/match/v1/matches/m1")
            .with_status(429)
            .with_header("retry-after", "1e20")
            .expect(1)
            .create_async()
            .await;
        let ok = server
            .mock("GET", "/val/match/v1/matches/m1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(MATCH_BODY)
            .expect(1)
            .create_async()
            .await;

        let client = test_client(&server.url());
        client.match_record(Shard::Na, "m1").await.unwrap();

        limited.assert_async().await;
        ok.assert_async().await;
    }

    #[tokio::test]
    async fn gives_up_after_retry_budget() {
        let mut server = Server::new_async().await;
        let limited = server
            .mock("GET", "/val/match/v1/matches/m1")
            .with_status(429)
            .expect(3)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.match_record(Shard::Na, "m1").await.unwrap_err();

        assert!(matches!(err, ApiError::RateLimited { attempts: 3, .. }));
        limited.assert_async().await;
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let mut server = Server::new_async().await;
        let failing = server
            .mock("GET", Matcher::Regex("^/val/match/v1/matchlists/.*".into()))
            .with_status(503)
            .with_body("upstream   down")
            .expect(1)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.match_list(Shard::Eu, "p-1").await.unwrap_err();

        match err {
            ApiError::Status { status, body, .. } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "upstream down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        failing.assert_async().await;
    }

    #[tokio::test]
    async fn match_list_is_cached_per_shard() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/val/match/v1/matchlists/by-puuid/p-1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"puuid":"p-1","history":[{"matchId":"a"},{"matchId":"b"}]}"#)
            .expect(2)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let first = client.recent_match_ids(Shard::Na, "p-1", 0, 1).await.unwrap();
        let second = client.recent_match_ids(Shard::Na, "p-1", 1, 5).await.unwrap();
        client.match_list(Shard::Eu, "p-1").await.unwrap();

        assert_eq!(first, vec!["a".to_string()]);
        assert_eq!(second, vec!["b".to_string()]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn match_record_is_cached() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/val/match/v1/matches/m1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(MATCH_BODY)
            .expect(1)
            .create_async()
            .await;

        let client = test_client(&server.url());
        client.match_record(Shard::Na, "m1").await.unwrap();
        client.match_record(Shard::Na, "m1").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_network_error() {
        let client = test_client("http://127.0.0.1:9");
        let err = client
            .account_by_riot_id(Region::Europe, "a", "b")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Network { .. }));
    }

    #[test]
    fn retry_after_parses_seconds() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("2"));
        assert_eq!(retry_after(&headers), Some(Duration::from_secs(2)));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("0.5"));
        assert_eq!(retry_after(&headers), Some(Duration::from_millis(500)));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));
        assert_eq!(retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("-1"));
        assert_eq!(retry_after(&headers), None);
    }

    #[test]
    fn oversized_retry_after_is_ignored() {
        let mut headers = HeaderMap::new();
        for value in ["1e20", "inf", "NaN"] {
            headers.insert(RETRY_AFTER, HeaderValue::from_static(value));
            assert_eq!(retry_after(&headers), None, "{value}");
        }
    }

    #[test]
    fn base_url_templates_are_substituted() {
        assert_eq!(
            regional_base("https://{region}.api.riotgames.com/", Region::Asia),
            "https://asia.api.riotgames.com"
        );
        assert_eq!(
            sharded_base("https://{shard}.api.riotgames.com", Shard::Latam),
            "https://latam.api.riotgames.com"
        );
    }

    #[test]
    fn endpoint_encodes_segments() {
        let url = endpoint(
            "https://europe.api.riotgames.com",
            &["riot", "account", "Ni ck#1", "ünï/x"],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://europe.api.riotgames.com/riot/account/Ni%20ck%231/%C3%BCn%C3%AF%2Fx"
        );

        let nested = endpoint("http://127.0.0.1:1234/proxy/", &["val", "m1"]).unwrap();
        assert_eq!(nested.as_str(), "http://127.0.0.1:1234/proxy/val/m1");

        assert!(matches!(
            endpoint("not a url", &["x"]),
            Err(ApiError::InvalidUrl { .. })
        ));
    }
}
