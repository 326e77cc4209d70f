//! Stream URL resolution with a persistent cache.
//!
//! A station's stream page answers with a single HTTP redirect to the
//! real media URL. Resolution follows that one hop (without fetching
//! the media) and persists the result per station id, so warm runs
//! never touch the network for known stations.
//!
//! Everything here runs on one task with one request in flight; a
//! caller that parallelizes station processing would additionally need
//! per-id single-flight around [`StreamResolver::resolve`].

mod cache;
mod error;

pub use cache::StreamCache;
pub use error::ResolveError;

use tracing::debug;

/// Source of redirect targets for stream-page URLs.
///
/// Implemented over HTTP by [`HttpRedirectSource`]; tests substitute an
/// in-memory implementation to count lookups.
pub trait RedirectSource {
    /// Fetch `url` once, without following redirects, and return the
    /// Location target.
    fn locate(&self, url: &str) -> impl Future<Output = Result<String, ResolveError>> + Send;
}

impl<S: RedirectSource + Sync> RedirectSource for &S {
    async fn locate(&self, url: &str) -> Result<String, ResolveError> {
        (**self).locate(url).await
    }
}

/// Configuration for the HTTP redirect source.
#[derive(Debug, Clone)]
pub struct RedirectConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// Redirect lookup over HTTP with redirect-following disabled.
#[derive(Debug, Clone)]
pub struct HttpRedirectSource {
    http: reqwest::Client,
}

impl HttpRedirectSource {
    /// Create a new source with the given configuration.
    pub fn new(config: RedirectConfig) -> Result<Self, ResolveError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http })
    }
}

impl RedirectSource for HttpRedirectSource {
    async fn locate(&self, url: &str) -> Result<String, ResolveError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_redirection() {
            return Err(ResolveError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ResolveError::MissingLocation {
                status: status.as_u16(),
            })?;

        Ok(location.to_string())
    }
}

/// Redirect resolver backed by the persistent stream cache.
///
/// A cache hit returns without any network call. A miss performs
/// exactly one lookup and persists the result before returning, so a
/// crash after the write never loses it and a failed lookup never
/// leaves a partial entry.
pub struct StreamResolver<S> {
    source: S,
    cache: StreamCache,
}

impl<S: RedirectSource> StreamResolver<S> {
    /// Create a resolver over a redirect source and an opened cache.
    pub fn new(source: S, cache: StreamCache) -> Self {
        Self { source, cache }
    }

    /// Resolve a station's stream-page URL to its playable media URL.
    pub async fn resolve(
        &self,
        station_id: &str,
        candidate_url: &str,
    ) -> Result<String, ResolveError> {
        if let Some(cached) = self.cache.get(station_id) {
            debug!(station_id, "stream cache hit");
            return Ok(cached);
        }

        let stream_url = self.source.locate(candidate_url).await?;

        self.cache.put(station_id, &stream_url)?;
        debug!(station_id, %stream_url, "resolved and cached stream");

        Ok(stream_url)
    }

    /// Access the underlying cache.
    pub fn cache(&self) -> &StreamCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tempfile::tempdir;

    /// In-memory redirect source that counts lookups.
    struct FakeSource {
        targets: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(targets: &[(&str, &str)]) -> Self {
            Self {
                targets: targets
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl RedirectSource for FakeSource {
        async fn locate(&self, url: &str) -> Result<String, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.targets
                .get(url)
                .cloned()
                .ok_or(ResolveError::UnexpectedStatus { status: 200 })
        }
    }

    #[tokio::test]
    async fn second_resolve_hits_cache() {
        let dir = tempdir().unwrap();
        let cache = StreamCache::open(dir.path(), "v1").unwrap();
        let source = FakeSource::new(&[("http://page/abc", "http://stream.example/abc")]);
        let resolver = StreamResolver::new(source, cache);

        let first = resolver.resolve("abc", "http://page/abc").await.unwrap();
        let second = resolver.resolve("abc", "http://page/abc").await.unwrap();

        assert_eq!(first, "http://stream.example/abc");
        assert_eq!(first, second);
        assert_eq!(resolver.source.calls(), 1);
    }

    #[tokio::test]
    async fn restart_reuses_persisted_result() {
        let dir = tempdir().unwrap();

        {
            let cache = StreamCache::open(dir.path(), "v1").unwrap();
            let source = FakeSource::new(&[("http://page/abc", "http://stream.example/abc")]);
            let resolver = StreamResolver::new(source, cache);
            resolver.resolve("abc", "http://page/abc").await.unwrap();
        }

        // Fresh resolver over the same directory: no targets needed.
        let cache = StreamCache::open(dir.path(), "v1").unwrap();
        let source = FakeSource::new(&[]);
        let resolver = StreamResolver::new(source, cache);

        let resolved = resolver.resolve("abc", "http://page/abc").await.unwrap();
        assert_eq!(resolved, "http://stream.example/abc");
        assert_eq!(resolver.source.calls(), 0);
    }

    #[tokio::test]
    async fn failed_lookup_caches_nothing() {
        let dir = tempdir().unwrap();
        let cache = StreamCache::open(dir.path(), "v1").unwrap();
        let source = FakeSource::new(&[]);
        let resolver = StreamResolver::new(source, cache);

        let err = resolver.resolve("abc", "http://page/abc").await.unwrap_err();
        assert!(matches!(err, ResolveError::UnexpectedStatus { status: 200 }));
        assert!(resolver.cache().get("abc").is_none());

        // Every retry goes back to the network: failures are not cached.
        let _ = resolver.resolve("abc", "http://page/abc").await;
        assert_eq!(resolver.source.calls(), 2);
    }

    #[tokio::test]
    async fn cache_is_keyed_by_station_id_not_url() {
        let dir = tempdir().unwrap();
        let cache = StreamCache::open(dir.path(), "v1").unwrap();
        let source = FakeSource::new(&[("http://page/abc?r=1", "http://stream.example/abc")]);
        let resolver = StreamResolver::new(source, cache);

        resolver.resolve("abc", "http://page/abc?r=1").await.unwrap();

        // Same station, different query string: still a hit.
        let resolved = resolver.resolve("abc", "http://page/abc?r=2").await.unwrap();
        assert_eq!(resolved, "http://stream.example/abc");
        assert_eq!(resolver.source.calls(), 1);
    }
}
