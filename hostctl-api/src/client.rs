//! HTTP client for the resource and job REST API.
//!
//! Owns the shared transport and the endpoint configuration, builds
//! requests under the endpoint path, and applies the status policy to
//! every response.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use hostctl_core::config::{AppConfig, StatusPolicy};
use hostctl_core::constants;
use hostctl_core::error::{HcError, HcResult};
use hostctl_core::platform::Platform;

use crate::response::decode_response;

/// Per-call options supplied by the caller.
///
/// Governs a single HTTP request only. The overall wait for an
/// asynchronous job is bounded separately by the client's async timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext {
    timeout: Option<Duration>,
}

impl RequestContext {
    /// Context without a per-call deadline; the client default applies.
    pub fn background() -> Self {
        Self::default()
    }

    /// Context whose request must finish within `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    /// The per-call timeout, if one was set.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// HTTP client for the resource API.
///
/// Cloning is cheap: clones share the underlying connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Client,
    /// Base URL; request paths are appended to its path.
    endpoint: Url,
    api_key: String,
    secret_key: String,
    /// Wait for add/delete jobs to reach their terminal status.
    async_mode: bool,
    /// Overall budget for one job wait.
    async_timeout: Duration,
    /// Spacing between job status fetches.
    poll_interval: Duration,
    /// Default timeout of a single request.
    request_timeout: Duration,
    /// Collection segments for list/add/delete.
    resource_path: Vec<String>,
    status_policy: StatusPolicy,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &self.api_key)
            .field("secret_key", &"<redacted>")
            .field("async_mode", &self.async_mode)
            .field("async_timeout", &self.async_timeout)
            .field("poll_interval", &self.poll_interval)
            .field("request_timeout", &self.request_timeout)
            .field("resource_path", &self.resource_path)
            .field("status_policy", &self.status_policy)
            .finish()
    }
}

impl ApiClient {
    /// Create a client whose mutating operations return without waiting.
    pub fn new(endpoint: &str, api_key: &str, secret_key: &str) -> HcResult<Self> {
        Self::build(endpoint, api_key, secret_key, false)
    }

    /// Create a client whose add/delete calls wait for their job to finish.
    pub fn new_async(endpoint: &str, api_key: &str, secret_key: &str) -> HcResult<Self> {
        Self::build(endpoint, api_key, secret_key, true)
    }

    /// Create a client from the application configuration.
    pub fn from_config(config: &AppConfig) -> HcResult<Self> {
        if config.jobs.poll_interval_ms < constants::MIN_POLL_INTERVAL_MS {
            return Err(HcError::Config(format!(
                "jobs.poll_interval_ms must be at least {}",
                constants::MIN_POLL_INTERVAL_MS
            )));
        }
        let endpoint = AppConfig::sanitize_endpoint(&config.server.endpoint);
        let mut client = Self::build(
            &endpoint,
            &config.server.api_key,
            &config.server.secret_key,
            config.jobs.async_mode,
        )?
        .with_request_timeout(config.server.request_timeout())
        .with_poll_interval(config.jobs.poll_interval())
        .with_status_policy(config.server.status_policy)
        .with_resource_path(&config.server.resource_path)?;

        client.set_async_timeout(config.jobs.timeout());
        Ok(client)
    }

    fn build(endpoint: &str, api_key: &str, secret_key: &str, async_mode: bool) -> HcResult<Self> {
        let endpoint = parse_endpoint(endpoint)?;

        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(constants::CONNECT_TIMEOUT_SECS))
            .user_agent(Platform::user_agent())
            .build()
            .map_err(|e| HcError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            endpoint,
            api_key: api_key.to_string(),
            secret_key: secret_key.to_string(),
            async_mode,
            async_timeout: Duration::from_secs(constants::DEFAULT_JOB_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(constants::DEFAULT_POLL_INTERVAL_MS),
            request_timeout: Duration::from_millis(constants::DEFAULT_REQUEST_TIMEOUT_MS),
            resource_path: vec![constants::DEFAULT_RESOURCE_PATH.to_string()],
            status_policy: StatusPolicy::default(),
        })
    }

    /// Use an externally built transport (shared pool, proxies, TLS settings).
    pub fn with_http_client(mut self, inner: Client) -> Self {
        self.inner = inner;
        self
    }

    /// Set the spacing between job status fetches. Values below
    /// `MIN_POLL_INTERVAL_MS` are raised to it.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(constants::MIN_POLL_INTERVAL_MS));
        self
    }

    /// Set how non-2xx responses are handled.
    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    /// Set the default per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the collection path used by list/add/delete, e.g. "hosts" or "v2/hosts".
    pub fn with_resource_path(mut self, path: &str) -> HcResult<Self> {
        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if segments.is_empty() {
            return Err(HcError::Config("resource path must not be empty".into()));
        }
        for segment in &segments {
            validate_segment(segment)?;
        }
        self.resource_path = segments;
        Ok(self)
    }

    /// Change the budget for subsequent job waits. Waits already running keep
    /// the deadline they started with.
    pub fn set_async_timeout(&mut self, timeout: Duration) {
        self.async_timeout = timeout;
        debug!("async job timeout set to {:.1}s", timeout.as_secs_f64());
    }

    /// The configured endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The configured API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Whether add/delete wait for their job.
    pub fn is_async(&self) -> bool {
        self.async_mode
    }

    /// Budget for one job wait.
    pub fn async_timeout(&self) -> Duration {
        self.async_timeout
    }

    /// Spacing between job status fetches.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// The active status policy.
    pub fn status_policy(&self) -> StatusPolicy {
        self.status_policy
    }

    /// Collection segments used by list/add/delete.
    pub(crate) fn resource_segments(&self) -> Vec<&str> {
        self.resource_path.iter().map(String::as_str).collect()
    }

    /// Append `segments` to the endpoint path.
    ///
    /// Each segment is percent-encoded as exactly one path segment, so ids
    /// containing `/` cannot reach other routes.
    pub fn endpoint_url(&self, segments: &[&str]) -> HcResult<Url> {
        let mut url = self.endpoint.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| HcError::Config(format!("endpoint {} cannot carry a path", self.endpoint)))?;
            path.pop_if_empty();
            for segment in segments {
                validate_segment(segment)?;
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// Build a request for `segments` under the endpoint, with an optional JSON body.
    pub fn build_request(
        &self,
        ctx: &RequestContext,
        method: Method,
        segments: &[&str],
        body: Option<&serde_json::Value>,
    ) -> HcResult<RequestBuilder> {
        let url = self.endpoint_url(segments)?;
        debug!("{} {}", method, url);

        let timeout = ctx.timeout().unwrap_or(self.request_timeout);
        let mut builder = self.inner.request(method, url).timeout(timeout);
        if let Some(b) = body {
            builder = builder.json(b);
        }
        Ok(builder)
    }

    /// Send a built request and apply the status policy.
    pub async fn execute(&self, builder: RequestBuilder) -> HcResult<Response> {
        let response = builder.send().await.map_err(Self::classify_error)?;
        self.check_status(response).await
    }

    /// Build, send, and decode in one step.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        method: Method,
        segments: &[&str],
        body: Option<&serde_json::Value>,
    ) -> HcResult<T> {
        let builder = self.build_request(ctx, method, segments, body)?;
        let response = self.execute(builder).await?;
        decode_response(response).await
    }

    /// Check the HTTP status code according to the status policy.
    async fn check_status(&self, response: Response) -> HcResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match self.status_policy {
            StatusPolicy::Strict => Err(api_error(status.as_u16(), response.text().await)),
            StatusPolicy::Permissive => {
                warn!("{} returned {status}, decoding body anyway", response.url());
                Ok(response)
            }
        }
    }

    /// Classify a reqwest error into an HcError variant.
    fn classify_error(e: reqwest::Error) -> HcError {
        if e.is_timeout() {
            HcError::Timeout(e.to_string())
        } else if e.is_connect() {
            HcError::Transport(format!("connection failed: {e}"))
        } else {
            HcError::Transport(e.to_string())
        }
    }
}

/// Parse and normalize the endpoint URL.
fn parse_endpoint(endpoint: &str) -> HcResult<Url> {
    let mut url = Url::parse(endpoint)
        .map_err(|e| HcError::Config(format!("invalid endpoint {endpoint:?}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(HcError::Config(format!(
            "invalid endpoint {endpoint:?}: unsupported scheme {}",
            url.scheme()
        )));
    }
    if url.cannot_be_a_base() {
        return Err(HcError::Config(format!("invalid endpoint {endpoint:?}: cannot carry a path")));
    }

    // Collapse empty segments so joined paths never contain "//".
    let path = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect::<Vec<_>>().join("/"))
        .unwrap_or_default();
    url.set_path(&format!("/{path}"));

    Ok(url)
}

/// Reject segments that would be dropped or resolved by the URL parser.
fn validate_segment(segment: &str) -> HcResult<()> {
    match segment {
        "" => Err(HcError::InvalidArgument("empty path segment".into())),
        "." | ".." => Err(HcError::InvalidArgument(format!(
            "path segment {segment:?} is not allowed"
        ))),
        _ => Ok(()),
    }
}

/// Build the error for a rejected response. A body that could not be read
/// is logged and described in place of the body.
fn api_error<E: std::fmt::Display>(status: u16, body: Result<String, E>) -> HcError {
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            warn!(status, "failed to read error response body: {e}");
            format!("<unreadable body: {e}>")
        }
    };
    HcError::Api { status, body }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> ApiClient {
        ApiClient::new(endpoint, "key", "secret").unwrap()
    }

    #[test]
    fn test_invalid_endpoint_is_config_error() {
        for bad in ["not a url", "mailto:ops@example.com", "ftp://example.com", ""] {
            let err = ApiClient::new(bad, "", "").unwrap_err();
            assert!(matches!(err, HcError::Config(_)), "{bad} -> {err}");
        }
    }

    #[test]
    fn test_defaults() {
        let c = client("http://localhost:8080");
        assert!(!c.is_async());
        assert_eq!(c.async_timeout(), Duration::from_secs(60));
        assert_eq!(c.poll_interval(), Duration::from_secs(1));
        assert_eq!(c.status_policy(), StatusPolicy::Strict);
        assert!(ApiClient::new_async("http://localhost", "", "").unwrap().is_async());
    }

    #[test]
    fn test_set_async_timeout() {
        let mut c = client("http://localhost");
        c.set_async_timeout(Duration::from_secs(5));
        assert_eq!(c.async_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_join_without_double_slashes() {
        let cases = [
            ("http://h", &["path"][..], "/path"),
            ("http://h/", &["path"][..], "/path"),
            ("http://h/api/v1", &["path", "host1"][..], "/api/v1/path/host1"),
            ("http://h/api/v1/", &["path", "host1"][..], "/api/v1/path/host1"),
            ("http://h//api//v1//", &["jobs", "j-1"][..], "/api/v1/jobs/j-1"),
        ];
        for (endpoint, segments, expected) in cases {
            let url = client(endpoint).endpoint_url(segments).unwrap();
            assert_eq!(url.path(), expected, "endpoint {endpoint}");
            assert!(!url.path().contains("//"));
        }
    }

    #[test]
    fn test_segment_is_encoded() {
        let url = client("http://h/api").endpoint_url(&["path", "a/b c"]).unwrap();
        assert_eq!(url.path(), "/api/path/a%2Fb%20c");
    }

    #[test]
    fn test_traversal_segments_rejected() {
        let c = client("http://h/api");
        for bad in ["..", ".", ""] {
            let err = c.endpoint_url(&["path", bad]).unwrap_err();
            assert!(matches!(err, HcError::InvalidArgument(_)), "{bad:?}");
        }
    }

    #[test]
    fn test_build_request_with_body_and_context() {
        let c = client("http://h/api/v1");
        let body = serde_json::json!({ "ipaddress": "10.0.0.1", "port": 22 });
        let ctx = RequestContext::with_timeout(Duration::from_secs(3));
        let req = c
            .build_request(&ctx, Method::POST, &["path", "host1"], Some(&body))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(req.method(), &Method::POST);
        assert_eq!(req.url().as_str(), "http://h/api/v1/path/host1");
        assert_eq!(req.timeout(), Some(&Duration::from_secs(3)));
        let sent: serde_json::Value =
            serde_json::from_slice(req.body().and_then(|b| b.as_bytes()).unwrap()).unwrap();
        assert_eq!(sent, body);
    }

    #[test]
    fn test_build_request_uses_default_timeout() {
        let c = client("http://h").with_request_timeout(Duration::from_millis(750));
        let req = c
            .build_request(&RequestContext::background(), Method::GET, &["path"], None)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(req.timeout(), Some(&Duration::from_millis(750)));
        assert!(req.body().is_none());
    }

    #[test]
    fn test_resource_path() {
        let c = client("http://h").with_resource_path("/v2/hosts/").unwrap();
        assert_eq!(c.resource_segments(), vec!["v2", "hosts"]);
        assert!(client("http://h").with_resource_path("//").is_err());
        assert!(client("http://h").with_resource_path("a/../b").is_err());
    }

    #[test]
    fn test_from_config() {
        let mut config = AppConfig::default();
        config.server.endpoint = "api.example.com/v1/".into();
        config.server.status_policy = StatusPolicy::Permissive;
        config.jobs.async_mode = true;
        config.jobs.timeout_secs = 7;
        config.jobs.poll_interval_ms = 250;

        let c = ApiClient::from_config(&config).unwrap();
        assert_eq!(c.endpoint().as_str(), "http://api.example.com/v1");
        assert!(c.is_async());
        assert_eq!(c.async_timeout(), Duration::from_secs(7));
        assert_eq!(c.poll_interval(), Duration::from_millis(250));
        assert_eq!(c.status_policy(), StatusPolicy::Permissive);
    }

    #[test]
    fn test_from_config_rejects_zero_poll_interval() {
        let mut config = AppConfig::default();
        config.server.endpoint = "http://h".into();
        config.jobs.poll_interval_ms = 0;
        assert!(matches!(ApiClient::from_config(&config), Err(HcError::Config(_))));
    }

    #[test]
    fn test_poll_interval_has_floor() {
        let c = client("http://h").with_poll_interval(Duration::ZERO);
        assert_eq!(c.poll_interval(), Duration::from_millis(constants::MIN_POLL_INTERVAL_MS));
    }

    #[test]
    fn test_api_error_keeps_body_read_failure() {
        match api_error(500, Err::<String, _>("connection reset")) {
            HcError::Api { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "<unreadable body: connection reset>");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = api_error(404, Ok::<_, &str>("missing".to_string()));
        assert!(matches!(err, HcError::Api { status: 404, ref body } if body == "missing"));
    }

    #[test]
    fn test_with_http_client_keeps_settings() {
        let shared = Client::builder().build().unwrap();
        let c = ApiClient::new_async("http://h/api", "key-1", "secret")
            .unwrap()
            .with_http_client(shared);
        assert!(c.is_async());
        assert_eq!(c.api_key(), "key-1");
        assert_eq!(c.endpoint().as_str(), "http://h/api");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", client("http://h"));
        assert!(!rendered.contains("\"secret\""));
        assert!(rendered.contains("<redacted>"));
    }
}
