use crate::cache::TtlCache;
use crate::codeforces::model::{CfRatingChange, CfSubmission, CfUser, CodeforcesResponse};
use crate::throttle::RateGate;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

type Result<T> = std::result::Result<T, CodeforcesError>;

#[derive(Debug, Error)]
pub enum CodeforcesError {
    #[error("failed to request to codeforces api")]
    RequestError(#[from] reqwest::Error),
    #[error("invalid codeforces api url given")]
    InvalidUrlError(#[from] url::ParseError),
    #[error("handle not found: {0}")]
    HandleNotFound(String),
    #[error("codeforces api error: {0}")]
    ApiError(String),
}

/// Read-only slice of the Codeforces REST API used by the aggregation and
/// team paths. Implementations are expected to rate-limit and cache.
#[async_trait]
pub trait CodeforcesApi {
    async fn user_info(&self, handle: &str) -> Result<CfUser>;
    async fn user_status(&self, handle: &str) -> Result<Vec<CfSubmission>>;
    async fn user_rating(&self, handle: &str) -> Result<Vec<CfRatingChange>>;
}

/// HTTP client for the Codeforces API.
///
/// Every outbound call passes through one [`RateGate`]; responses are kept
/// in per-endpoint TTL caches so a hit bypasses the gate entirely.
pub struct CodeforcesClient {
    base_url: Url,
    client: Client,
    gate: RateGate,
    info_cache: TtlCache<CfUser>,
    status_cache: TtlCache<Vec<CfSubmission>>,
    rating_cache: TtlCache<Vec<CfRatingChange>>,
}

impl CodeforcesClient {
    pub fn new(base_url: &str, min_call_interval: Duration, cache_ttl: Duration) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        // Url::join drops the last path segment unless it ends with a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .gzip(true)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(CodeforcesClient {
            base_url,
            client,
            gate: RateGate::new(min_call_interval),
            info_cache: TtlCache::new(cache_ttl),
            status_cache: TtlCache::new(cache_ttl),
            rating_cache: TtlCache::new(cache_ttl),
        })
    }

    async fn fetch<T>(&self, method: &str, params: &[(&str, &str)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.base_url.join(method)?;

        self.gate.wait().await;
        tracing::info!("request {} to codeforces api", method);
        let res = self.client.get(url).query(params).send().await?;

        // Failures still carry the JSON envelope, so parse before checking
        // the HTTP status.
        let body: CodeforcesResponse<T> = res.json().await?;
        if body.status != "OK" {
            let comment = body
                .comment
                .unwrap_or_else(|| String::from("unknown upstream failure"));
            if comment.to_ascii_lowercase().contains("not found") {
                return Err(CodeforcesError::HandleNotFound(comment));
            }
            return Err(CodeforcesError::ApiError(comment));
        }

        body.result
            .ok_or_else(|| CodeforcesError::ApiError(String::from("response has no result")))
    }
}

#[async_trait]
impl CodeforcesApi for CodeforcesClient {
    async fn user_info(&self, handle: &str) -> Result<CfUser> {
        let cache_key = format!("userInfo:{}", handle);
        if let Some(user) = self.info_cache.get(&cache_key) {
            tracing::debug!("cache hit: {}", cache_key);
            return Ok(user);
        }

        let users: Vec<CfUser> = self.fetch("user.info", &[("handles", handle)]).await?;
        let user = users.into_iter().next().ok_or_else(|| {
            CodeforcesError::HandleNotFound(format!("handle {} not found", handle))
        })?;

        self.info_cache.set(&cache_key, user.clone());
        Ok(user)
    }

    async fn user_status(&self, handle: &str) -> Result<Vec<CfSubmission>> {
        let cache_key = format!("userStatus:{}", handle);
        if let Some(submissions) = self.status_cache.get(&cache_key) {
            tracing::debug!("cache hit: {}", cache_key);
            return Ok(submissions);
        }

        let submissions: Vec<CfSubmission> =
            self.fetch("user.status", &[("handle", handle)]).await?;

        self.status_cache.set(&cache_key, submissions.clone());
        Ok(submissions)
    }

    async fn user_rating(&self, handle: &str) -> Result<Vec<CfRatingChange>> {
        let cache_key = format!("userRating:{}", handle);
        if let Some(history) = self.rating_cache.get(&cache_key) {
            tracing::debug!("cache hit: {}", cache_key);
            return Ok(history);
        }

        let history: Vec<CfRatingChange> =
            self.fetch("user.rating", &[("handle", handle)]).await?;

        self.rating_cache.set(&cache_key, history.clone());
        Ok(history)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn create_new_client_normalizes_base_url() {
        let client = CodeforcesClient::new(
            "https://codeforces.com/api",
            Duration::from_millis(2000),
            Duration::from_secs(600),
        )
        .unwrap();

        assert_eq!(
            client.base_url.join("user.info").unwrap(),
            Url::parse("https://codeforces.com/api/user.info").unwrap()
        );
    }

    /// Normal system test against the live Codeforces API.
    ///
    /// Issues real rate-limited requests; run manually with
    ///
    /// ```ignore
    /// cargo test -p codeforces_insight_libs -- --ignored
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_user_info() {
        let client = CodeforcesClient::new(
            "https://codeforces.com/api",
            Duration::from_millis(2000),
            Duration::from_secs(600),
        )
        .unwrap();

        let user = client.user_info("tourist").await.unwrap();

        assert_eq!(user.handle, "tourist");
    }

    /// Anomaly system test against the live Codeforces API: an unknown
    /// handle must surface as `HandleNotFound`.
    #[tokio::test]
    #[ignore]
    async fn test_user_info_unknown_handle() {
        let client = CodeforcesClient::new(
            "https://codeforces.com/api",
            Duration::from_millis(2000),
            Duration::from_secs(600),
        )
        .unwrap();

        let result = client.user_info("nonexistentuser12345xyz").await;

        assert!(matches!(result, Err(CodeforcesError::HandleNotFound(_))));
    }
}
