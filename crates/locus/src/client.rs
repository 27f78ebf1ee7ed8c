//! Rate-limited client for the forge REST API.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::http::{HttpError, HttpRequest, HttpTransport, ReqwestTransport};
use crate::rate_limit::{DEFAULT_REQUEST_DELAY_MS, RequestPacer};
use crate::retry::{RetryConfig, with_retry};

/// Public GitHub REST API root.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("locus/", env!("CARGO_PKG_VERSION"));

/// Errors that prevent a request from producing a usable response.
///
/// A response with a non-200 status is *not* an error at this level; callers
/// receive it through [`ApiResponse::status`] and decide what it means.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: HttpError,
    },

    #[error("invalid JSON in response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
}

/// Raw status code and decoded JSON body of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiResponse {
    /// Whether the request succeeded with exactly `200 OK`.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// The `message` field GitHub puts in error bodies, if any.
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(|v| v.as_str())
    }
}

/// Tunables for [`RateLimitedClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// API root, without a trailing slash.
    pub api_url: String,
    /// Pause after every completed request.
    pub request_delay: Duration,
    /// Per-request timeout. Expiry counts as a transport failure.
    pub timeout: Duration,
    /// Retry policy for transport failures.
    pub retry: RetryConfig,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_url: GITHUB_API_URL.to_string(),
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryConfig::default(),
        }
    }
}

/// Client that sends every request with a static token and a fixed pause.
///
/// Requests are issued one at a time by whoever holds the client; the pacer
/// owned by the instance pauses after each one, success or not. Transport
/// failures are retried according to the configured [`RetryConfig`], and
/// statuses are never retried.
#[derive(Clone)]
pub struct RateLimitedClient {
    transport: Arc<dyn HttpTransport>,
    api_url: String,
    token: String,
    pacer: RequestPacer,
    retry: RetryConfig,
}

impl RateLimitedClient {
    /// Create a client backed by a real reqwest transport.
    pub fn new(token: &str, options: ClientOptions) -> Result<Self, ApiError> {
        let transport =
            ReqwestTransport::with_timeout(options.timeout).map_err(|source| ApiError::Transport {
                url: options.api_url.clone(),
                source,
            })?;

        Ok(Self::new_with_transport(token, options, Arc::new(transport)))
    }

    pub fn new_with_transport(
        token: &str,
        options: ClientOptions,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            transport,
            api_url: options.api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            pacer: RequestPacer::new(options.request_delay),
            retry: options.retry,
        }
    }

    /// The API root this client talks to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Build the absolute URL for `path` with form-encoded `query` pairs.
    pub fn url_for(&self, path: &str, query: &[(&str, &str)]) -> Result<String, ApiError> {
        let raw = format!("{}{}", self.api_url, path);
        let mut url = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        Ok(url.into())
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![
            (
                "Accept".to_string(),
                "application/vnd.github+json".to_string(),
            ),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
            ("Authorization".to_string(), format!("token {}", self.token)),
        ]
    }

    /// Issue `GET {path}?{query}` and return the raw status with the decoded body.
    ///
    /// The call always ends with the pacer's pause, whatever the outcome.
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<ApiResponse, ApiError> {
        let url = self.url_for(path, query)?;
        let request = HttpRequest {
            url: url.clone(),
            headers: self.headers(),
        };

        let response = self
            .pacer
            .run(|| {
                with_retry(
                    || self.transport.get(request.clone()),
                    &self.retry,
                    |e: &HttpError| matches!(e, HttpError::Transport(_)),
                    &url,
                )
            })
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        tracing::debug!(url = %url, status = response.status, "GET");

        let body = decode_body(&response.body, response.status, &url)?;
        Ok(ApiResponse {
            status: response.status,
            body,
        })
    }
}

/// Decode a response body as JSON.
///
/// An empty body decodes to `null`. A body that is not JSON is an error for a
/// successful response; for an error response the raw text is kept instead,
/// since proxies and gateways often answer with HTML.
fn decode_body(bytes: &[u8], status: u16, url: &str) -> Result<serde_json::Value, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Null);
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Ok(value),
        Err(_) if !(200..300).contains(&status) => Ok(serde_json::Value::String(
            String::from_utf8_lossy(bytes).into_owned(),
        )),
        Err(source) => Err(ApiError::Decode {
            url: url.to_string(),
            source,
        }),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::http::{HttpResponse, MockTransport, header_get};
    use tokio::time::Instant;

    pub(crate) const API: &str = "https://api.test";

    /// Options pointing at the mock API host with retries disabled.
    pub(crate) fn test_options() -> ClientOptions {
        ClientOptions {
            api_url: API.to_string(),
            request_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(5),
            retry: RetryConfig::disabled(),
        }
    }

    pub(crate) fn test_client(transport: &MockTransport) -> RateLimitedClient {
        RateLimitedClient::new_with_transport(
            "secret",
            test_options(),
            Arc::new(transport.clone()),
        )
    }

    #[test]
    fn url_for_encodes_query_pairs_in_order() {
        let client = test_client(&MockTransport::new());
        let url = client
            .url_for(
                "/search/users",
                &[
                    ("q", "location:Bangalore followers:>100"),
                    ("per_page", "100"),
                    ("page", "1"),
                ],
            )
            .unwrap();
        assert_eq!(
            url,
            "https://api.test/search/users?q=location%3ABangalore+followers%3A%3E100&per_page=100&page=1"
        );
    }

    #[test]
    fn url_for_without_query_has_no_question_mark() {
        let client = test_client(&MockTransport::new());
        assert_eq!(
            client.url_for("/users/octocat", &[]).unwrap(),
            "https://api.test/users/octocat"
        );
    }

    #[test]
    fn new_with_transport_trims_trailing_slash() {
        let options = ClientOptions {
            api_url: "https://api.test///".to_string(),
            ..test_options()
        };
        let client =
            RateLimitedClient::new_with_transport("t", options, Arc::new(MockTransport::new()));
        assert_eq!(client.api_url(), "https://api.test");
    }

    #[tokio::test(start_paused = true)]
    async fn get_attaches_credential_and_returns_status_and_body() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{API}/users/octocat"),
            200,
            serde_json::json!({"login": "octocat"}),
        );
        let client = test_client(&transport);

        let resp = client.get("/users/octocat", &[]).await.unwrap();
        assert!(resp.is_ok());
        assert_eq!(resp.body["login"], "octocat");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            header_get(&requests[0].headers, "authorization"),
            Some("token secret")
        );
        assert!(header_get(&requests[0].headers, "user-agent").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn get_returns_non_200_without_error() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{API}/users/ghost"),
            404,
            serde_json::json!({"message": "Not Found"}),
        );
        let client = test_client(&transport);

        let resp = client.get("/users/ghost", &[]).await.unwrap();
        assert_eq!(resp.status, 404);
        assert!(!resp.is_ok());
        assert_eq!(resp.message(), Some("Not Found"));
    }

    #[tokio::test(start_paused = true)]
    async fn get_pauses_after_every_request() {
        let transport = MockTransport::new();
        let url = format!("{API}/users/octocat");
        transport.push_json(&url, 200, serde_json::json!({}));
        transport.push_json(&url, 500, serde_json::json!({}));
        let client = test_client(&transport);

        let start = Instant::now();
        client.get("/users/octocat", &[]).await.unwrap();
        client.get("/users/octocat", &[]).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn get_keeps_text_body_of_error_responses() {
        let transport = MockTransport::new();
        transport.push_response(
            format!("{API}/users/octocat"),
            HttpResponse {
                status: 502,
                body: b"<html>Bad Gateway</html>".to_vec(),
            },
        );
        let client = test_client(&transport);

        let resp = client.get("/users/octocat", &[]).await.unwrap();
        assert_eq!(resp.status, 502);
        assert_eq!(resp.body, serde_json::json!("<html>Bad Gateway</html>"));
    }

    #[tokio::test(start_paused = true)]
    async fn get_rejects_malformed_success_body() {
        let transport = MockTransport::new();
        transport.push_response(
            format!("{API}/users/octocat"),
            HttpResponse {
                status: 200,
                body: b"{not json".to_vec(),
            },
        );
        let client = test_client(&transport);

        let err = client.get("/users/octocat", &[]).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn get_decodes_empty_body_as_null() {
        let transport = MockTransport::new();
        transport.push_response(
            format!("{API}/user"),
            HttpResponse {
                status: 204,
                body: Vec::new(),
            },
        );
        let client = test_client(&transport);

        let resp = client.get("/user", &[]).await.unwrap();
        assert_eq!(resp.body, serde_json::Value::Null);
    }

    #[tokio::test(start_paused = true)]
    async fn get_retries_transport_failures_per_policy() {
        let transport = MockTransport::new();
        let url = format!("{API}/users/octocat");
        transport.push_failure(&url, "connection reset");
        transport.push_failure(&url, "operation timed out");
        transport.push_json(&url, 200, serde_json::json!({"login": "octocat"}));

        let options = ClientOptions {
            retry: RetryConfig::new(Duration::from_millis(10), Duration::from_millis(100), 2)
                .with_jitter(false),
            ..test_options()
        };
        let client =
            RateLimitedClient::new_with_transport("secret", options, Arc::new(transport.clone()));

        let resp = client.get("/users/octocat", &[]).await.unwrap();
        assert!(resp.is_ok());
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn get_surfaces_transport_failure_when_retries_are_exhausted() {
        let transport = MockTransport::new();
        transport.push_failure(format!("{API}/users/octocat"), "operation timed out");
        let client = test_client(&transport);

        let err = client.get("/users/octocat", &[]).await.unwrap_err();
        match err {
            ApiError::Transport { url, source } => {
                assert_eq!(url, format!("{API}/users/octocat"));
                assert!(matches!(source, HttpError::Transport(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(transport.requests().len(), 1);
    }
}
