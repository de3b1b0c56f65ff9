//! Filing download and memoization
//!
//! Fetches filing documents over HTTP and caches the body text by filing
//! path for the lifetime of the process. Concurrent first requests for the
//! same path are coalesced into a single network call: each path owns a
//! `tokio::sync::OnceCell` and every requester waits on the same
//! initialization, so at most one fetch per path is ever in flight.
//!
//! The cache never evicts and never retries; a path that fails once is
//! reported as a `FetchError` to every waiter of that attempt.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request for {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Process-lifetime cache of filing bodies keyed by filing path.
pub struct FilingCache {
    client: reqwest::Client,
    base_url: String,
    entries: Mutex<HashMap<String, Arc<OnceCell<String>>>>,
}

impl FilingCache {
    /// Build a cache that resolves paths against `base_url` and identifies
    /// itself with `user_agent` on every request.
    pub fn new(base_url: &str, user_agent: &str, request_timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            entries: Mutex::new(HashMap::new()),
        })
    }

    /// Fetch the filing at `path`, downloading it on first request and
    /// serving the cached body afterwards.
    pub async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let cell = {
            let mut entries = self.entries.lock().await;
            entries
                .entry(path.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let body = cell
            .get_or_try_init(|| self.download(path))
            .await?;
        Ok(body.clone())
    }

    async fn download(&self, path: &str) -> Result<String, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Downloading filing: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }

        response.text().await.map_err(|source| FetchError::Transport { url, source })
    }

    /// Number of paths with a completed download.
    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.values().filter(|cell| cell.initialized()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn cache_for(server: &MockServer) -> FilingCache {
        FilingCache::new(
            &format!("{}/Archives/", server.uri()),
            "lenderfinder-test/1.0",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_caches_body_and_hits_network_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/Archives/edgar/data/1/doc.htm"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>body</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let cache = cache_for(&server).await;
        let first = cache.fetch("edgar/data/1/doc.htm").await.unwrap();
        let second = cache.fetch("edgar/data/1/doc.htm").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "<html>body</html>");
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_fetches_coalesce() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/Archives/edgar/data/2/doc.htm"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("payload")
                    .set_delay(Duration::from_millis(50)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let cache = Arc::new(cache_for(&server).await);
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.fetch("edgar/data/2/doc.htm").await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), "payload");
        }
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/Archives/missing.htm"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let cache = cache_for(&server).await;
        let err = cache.fetch("missing.htm").await.unwrap_err();
        match err {
            FetchError::Status { status, .. } => assert_eq!(status, 404),
            other => panic!("expected status error, got {:?}", other),
        }
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_distinct_paths_fetch_independently() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/Archives/a.htm"))
            .respond_with(ResponseTemplate::new(200).set_body_string("a"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(url_path("/Archives/b.htm"))
            .respond_with(ResponseTemplate::new(200).set_body_string("b"))
            .mount(&server)
            .await;

        let cache = cache_for(&server).await;
        assert_eq!(cache.fetch("a.htm").await.unwrap(), "a");
        assert_eq!(cache.fetch("b.htm").await.unwrap(), "b");
        assert_eq!(cache.len().await, 2);
    }
}
