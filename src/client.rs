//! Poster API client, builder, and transport helpers.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::api::{
    CommentsApi, ConversationsApi, NotificationsApi, PostsApi, ReportsApi, SpotifyApi, UploadsApi,
    UsersApi,
};
use crate::cache::ExpiringCache;
use crate::error::{Error, ErrorResponse, Result};
use crate::realtime::RealtimeChannel;

/// Default TTL for cached responses.
const DEFAULT_TTL: Duration = Duration::from_millis(60_000);

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Poster API client.
///
/// Cloning is cheap: clones share the HTTP connection pool, the auth token,
/// the response cache, and the realtime channel. Each client constructed
/// through [`ClientBuilder`] owns independent cache state.
///
/// # Example
///
/// ```no_run
/// use poster_client::PosterClient;
///
/// # async fn example() -> poster_client::Result<()> {
/// let client = PosterClient::builder()
///     .base_url("https://api.poster-social.com")
///     .auth_token("secret")
///     .build()?;
///
/// let feed = client.users().home_feed(1).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PosterClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client.
    http: reqwest::Client,
    /// Base URL for API requests.
    base_url: Url,
    /// Bearer token applied to subsequent requests, replaceable at any time.
    auth_token: RwLock<Option<String>>,
    /// Response cache, one instance per client.
    cache: Mutex<ExpiringCache>,
    /// Whether cacheable reads consult the cache at all.
    cache_enabled: bool,
    /// TTL applied when a cacheable read does not specify one.
    default_ttl: Duration,
    /// Lazily established realtime channel.
    realtime: tokio::sync::Mutex<Option<RealtimeChannel>>,
}

impl PosterClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Set or replace the bearer token used for subsequent requests.
    ///
    /// Requests already in flight are unaffected. The realtime channel
    /// authenticates with the token current at connection time and is not
    /// re-authenticated here.
    pub fn set_auth_token(&self, token: impl Into<String>) {
        *self.inner.auth_token.write() = Some(token.into());
    }

    /// Remove the bearer token; subsequent requests carry no
    /// `Authorization` header.
    pub fn clear_auth_token(&self) {
        *self.inner.auth_token.write() = None;
    }

    /// Whether a bearer token is currently set.
    pub fn has_auth_token(&self) -> bool {
        self.inner.auth_token.read().is_some()
    }

    /// Evict a cached response by key. No-op when the key is absent.
    pub fn invalidate(&self, key: &str) {
        self.inner.cache.lock().clear(key);
    }

    // ─────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────

    /// Access the users API (accounts, profiles, follows, feed).
    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.clone())
    }

    /// Access the posts API.
    pub fn posts(&self) -> PostsApi {
        PostsApi::new(self.clone())
    }

    /// Access the comments API.
    pub fn comments(&self) -> CommentsApi {
        CommentsApi::new(self.clone())
    }

    /// Access the conversations and messaging API.
    pub fn conversations(&self) -> ConversationsApi {
        ConversationsApi::new(self.clone())
    }

    /// Access the notifications API.
    pub fn notifications(&self) -> NotificationsApi {
        NotificationsApi::new(self.clone())
    }

    /// Access the image upload API.
    pub fn uploads(&self) -> UploadsApi {
        UploadsApi::new(self.clone())
    }

    /// Access the Spotify integration API.
    pub fn spotify(&self) -> SpotifyApi {
        SpotifyApi::new(self.clone())
    }

    /// Access the reports API.
    pub fn reports(&self) -> ReportsApi {
        ReportsApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Realtime channel
    // ─────────────────────────────────────────────────────────────────────

    /// Get the realtime event channel, connecting on first use.
    ///
    /// The first call establishes a single WebSocket connection derived from
    /// the base URL (`http` → `ws`, `https` → `wss`), authenticated with the
    /// bearer token current at connection time. Later calls reuse the same
    /// connection; a channel whose connection has ended is replaced on the
    /// next call. No automatic reconnection happens in the background.
    pub async fn realtime(&self) -> Result<RealtimeChannel> {
        let mut guard = self.inner.realtime.lock().await;
        if let Some(channel) = guard.as_ref() {
            if !channel.is_closed() {
                return Ok(channel.clone());
            }
        }

        let url = self.realtime_endpoint()?;
        let token = self.inner.auth_token.read().clone();
        let channel = RealtimeChannel::connect(&url, token).await?;
        *guard = Some(channel.clone());
        Ok(channel)
    }

    /// Derive the WebSocket endpoint from the base URL.
    fn realtime_endpoint(&self) -> Result<Url> {
        let mut url = self.inner.base_url.clone();
        let scheme = match url.scheme() {
            "https" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme)
            .map_err(|_| Error::Config(format!("Cannot derive websocket URL from {}", url)))?;
        Ok(url)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Cache-or-fetch coordinator
    // ─────────────────────────────────────────────────────────────────────

    /// Serve `key` from the cache when live, otherwise fetch and store.
    ///
    /// With caching disabled the fetch runs unconditionally and nothing is
    /// stored. On a miss the result is cached under `key` with `ttl`, or the
    /// client's default TTL when `ttl` is `None`.
    ///
    /// Concurrent calls for the same key that all miss before the first
    /// fetch resolves each invoke their own fetch and each overwrite the
    /// entry; there is no single-flight coalescing.
    pub(crate) async fn cached_request<T, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        fetch: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if self.inner.cache_enabled {
            if let Some(hit) = self.inner.cache.lock().get(key) {
                tracing::debug!(key, "cache hit");
                return serde_json::from_value(hit).map_err(Error::from);
            }
            tracing::debug!(key, "cache miss");
        }

        let value = fetch().await?;

        if self.inner.cache_enabled {
            let ttl = ttl.unwrap_or(self.inner.default_ttl);
            let stored = serde_json::to_value(&value)?;
            self.inner.cache.lock().set(key, stored, ttl);
        }

        Ok(value)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner.base_url.join(path).map_err(Error::from)
    }

    /// Apply the current bearer token, if any.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.inner.auth_token.read().as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Make a GET request.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        let response = self.authorize(self.inner.http.get(url)).send().await?;
        self.handle_response(response).await
    }

    /// Make a POST request with a JSON body.
    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let response = self
            .authorize(self.inner.http.post(url))
            .json(body)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a POST request without a body.
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        let response = self.authorize(self.inner.http.post(url)).send().await?;
        self.handle_response(response).await
    }

    /// Make a PATCH request without a body.
    pub(crate) async fn patch_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        let response = self.authorize(self.inner.http.patch(url)).send().await?;
        self.handle_response(response).await
    }

    /// Make a DELETE request.
    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        let response = self.authorize(self.inner.http.delete(url)).send().await?;
        self.handle_response(response).await
    }

    /// Make a multipart POST uploading `bytes` as the `image` form field.
    pub(crate) async fn post_image<T: DeserializeOwned>(
        &self,
        path: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<T> {
        let url = self.url(path)?;
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("image", part);
        let response = self
            .authorize(self.inner.http.post(url))
            .multipart(form)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Handle a response, extracting the body or error.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract an error from a failed response.
    async fn extract_error(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();

        match response.json::<ErrorResponse>().await {
            Ok(err) => match status {
                401 => Error::Auth(err.message),
                404 => Error::NotFound(err.message),
                _ => Error::Api {
                    status,
                    message: err.message,
                },
            },
            Err(_) => Error::Api {
                status,
                message: format!("HTTP {}", status),
            },
        }
    }
}

/// Builder for creating a [`PosterClient`].
///
/// `base_url` is required; everything else has a documented default.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    auth_token: Option<String>,
    cache_enabled: bool,
    default_ttl: Duration,
    timeout: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults: caching enabled, 60 second TTL,
    /// 30 second request timeout.
    pub fn new() -> Self {
        Self {
            base_url: None,
            auth_token: None,
            cache_enabled: true,
            default_ttl: DEFAULT_TTL,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Set the base URL of the Poster API deployment. Required.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the initial bearer token.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Enable or disable the response cache.
    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Set the TTL applied to cached responses that do not specify one.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client, validating the configuration.
    pub fn build(self) -> Result<PosterClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize so path joins keep any URL prefix
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("poster-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(self.timeout)
            .build()?;

        Ok(PosterClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                auth_token: RwLock::new(self.auth_token),
                cache: Mutex::new(ExpiringCache::new()),
                cache_enabled: self.cache_enabled,
                default_ttl: self.default_ttl,
                realtime: tokio::sync::Mutex::new(None),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_client() -> PosterClient {
        ClientBuilder::new()
            .base_url("http://localhost:3000")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_base_url() {
        let result = ClientBuilder::new().build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_rejects_malformed_base_url() {
        let result = ClientBuilder::new().base_url("not a url").build();
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_builder_normalizes_trailing_slash() {
        let client = test_client();
        assert_eq!(client.base_url().as_str(), "http://localhost:3000/");
    }

    #[test]
    fn test_url_building() {
        let client = test_client();

        let url = client.url("user/register").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/user/register");

        let url = client.url("/user/register").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/user/register");
    }

    #[test]
    fn test_auth_token_set_and_clear() {
        let client = test_client();
        assert!(!client.has_auth_token());

        client.set_auth_token("tok");
        assert!(client.has_auth_token());

        client.clear_auth_token();
        assert!(!client.has_auth_token());
    }

    #[test]
    fn test_realtime_endpoint_scheme_swap() {
        let client = ClientBuilder::new()
            .base_url("https://api.poster-social.com")
            .build()
            .unwrap();
        let url = client.realtime_endpoint().unwrap();
        assert_eq!(url.scheme(), "wss");

        let client = test_client();
        let url = client.realtime_endpoint().unwrap();
        assert_eq!(url.scheme(), "ws");
    }

    #[tokio::test]
    async fn test_cached_request_hit_skips_fetch() {
        let client = test_client();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: serde_json::Value = client
                .cached_request("k", None, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(serde_json::json!({"user": {"id": "1"}}))
                })
                .await
                .unwrap();
            assert_eq!(value["user"]["id"], "1");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cached_request_disabled_always_fetches() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:3000")
            .cache_enabled(false)
            .build()
            .unwrap();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let _: serde_json::Value = client
                .cached_request("k", None, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(serde_json::json!(1))
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_cached_request_refetches_after_default_ttl() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:3000")
            .default_ttl(Duration::from_millis(20))
            .build()
            .unwrap();
        let calls = AtomicUsize::new(0);

        let fetch = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::json!("v"))
        };

        // ttl=None stores with the configured default TTL
        let _: serde_json::Value = client.cached_request("k", None, fetch).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        let _: serde_json::Value = client
            .cached_request("k", None, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(serde_json::json!("v"))
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cached_request_explicit_ttl_overrides_default() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:3000")
            .default_ttl(Duration::from_millis(10))
            .build()
            .unwrap();
        let calls = AtomicUsize::new(0);

        let _: serde_json::Value = client
            .cached_request("k", Some(Duration::from_secs(60)), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(serde_json::json!("v"))
            })
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        // Entry outlives the short default because the explicit TTL won
        let _: serde_json::Value = client
            .cached_request("k", Some(Duration::from_secs(60)), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(serde_json::json!("v"))
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let client = test_client();
        let calls = AtomicUsize::new(0);

        let _: serde_json::Value = client
            .cached_request("k", None, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(serde_json::json!(1))
            })
            .await
            .unwrap();

        client.invalidate("k");

        let _: serde_json::Value = client
            .cached_request("k", None, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(serde_json::json!(1))
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cached_request_error_is_not_cached() {
        let client = test_client();
        let calls = AtomicUsize::new(0);

        let failed: Result<serde_json::Value> = client
            .cached_request("k", None, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::Config("boom".to_string()))
            })
            .await;
        assert!(failed.is_err());

        let ok: serde_json::Value = client
            .cached_request("k", None, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(serde_json::json!("recovered"))
            })
            .await
            .unwrap();
        assert_eq!(ok, serde_json::json!("recovered"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
