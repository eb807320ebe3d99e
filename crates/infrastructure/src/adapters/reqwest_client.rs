//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! It handles all HTTP communication for the runner.

use std::collections::HashMap;
use std::error::Error as _;
use std::time::Instant;

use apicheck_application::ports::{HttpClient, HttpClientError, HttpFuture};
use apicheck_domain::{HttpMethod, PreparedRequest, RawResponse};
use reqwest::{Client, Method};
use tracing::trace;

/// Maximum number of redirects followed before giving up.
pub const MAX_REDIRECTS: usize = 10;

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("apicheck/", env!("CARGO_PKG_VERSION"));

/// HTTP client implementation using reqwest.
///
/// Wraps `reqwest::Client` and implements the `HttpClient` port from the
/// application layer. One instance is shared by every case of a run.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Creates a new HTTP client with default settings.
    ///
    /// Default configuration:
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    /// - User-Agent: `apicheck/<version>`
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> Result<Self, HttpClientError> {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    /// Creates a client sending the given `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn with_user_agent(user_agent: &str) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Maps reqwest errors to `HttpClientError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout { timeout_ms };
        }

        let host = || {
            error
                .url()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_else(|| "unknown".to_string())
        };
        let message = error_chain(error);
        let lower = message.to_lowercase();

        if error.is_connect() {
            if lower.contains("dns") || lower.contains("resolve") {
                return HttpClientError::DnsError {
                    host: host(),
                    message,
                };
            }
            if lower.contains("refused") {
                return HttpClientError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(reqwest::Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            if lower.contains("certificate") || lower.contains("tls") {
                return HttpClientError::TlsError(message);
            }
            return HttpClientError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return HttpClientError::TooManyRedirects { max: MAX_REDIRECTS };
        }

        if error.is_builder() {
            return HttpClientError::InvalidUrl(message);
        }

        HttpClientError::Other(message)
    }
}

/// Renders an error with its sources, `outer: inner: root`.
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl HttpClient for ReqwestHttpClient {
    fn execute(&self, request: &PreparedRequest) -> HttpFuture<'_> {
        // Clone what we need to move into the async block
        let method = request.method;
        let url = request.url.clone();
        let body = request.body.clone();
        let timeout = request.timeout();
        let timeout_ms = request.timeout_ms;

        Box::pin(async move {
            let start = Instant::now();

            let mut builder = self
                .client
                .request(Self::to_reqwest_method(method), url)
                .timeout(timeout);

            // `json` also sets `Content-Type: application/json`
            if let Some(body) = &body {
                builder = builder.json(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_error(&e, timeout_ms))?;

            // Elapsed time covers the request up to the response headers
            let duration = start.elapsed();
            let status = response.status().as_u16();

            let response_headers: HashMap<String, String> = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
                .collect();

            let body_bytes = response
                .bytes()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        HttpClientError::Timeout { timeout_ms }
                    } else {
                        HttpClientError::Other(format!("Failed to read body: {}", error_chain(&e)))
                    }
                })?
                .to_vec();

            trace!(status, bytes = body_bytes.len(), "response body read");

            Ok(RawResponse::new(
                status,
                response_headers,
                body_bytes,
                duration,
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Get),
            Method::GET
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Post),
            Method::POST
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Put),
            Method::PUT
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Delete),
            Method::DELETE
        );
    }

    #[test]
    fn test_client_creation() {
        assert!(ReqwestHttpClient::new().is_ok());
        assert!(ReqwestHttpClient::with_user_agent("custom/1.0").is_ok());
    }

    #[test]
    fn test_default_user_agent() {
        assert!(DEFAULT_USER_AGENT.starts_with("apicheck/"));
    }

    mod against_server {
        #![allow(clippy::unwrap_used)]

        use super::*;
        use pretty_assertions::assert_eq;
        use serde_json::json;
        use url::Url;
        use wiremock::matchers::{body_json, header, method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        fn request(method: HttpMethod, url: &str) -> PreparedRequest {
            PreparedRequest::new(method, Url::parse(url).unwrap())
        }

        #[tokio::test]
        async fn test_sends_json_body_and_user_agent() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/posts"))
                .and(header("content-type", "application/json"))
                .and(header("user-agent", "apicheck-test"))
                .and(body_json(json!({"title": "New Post"})))
                .respond_with(
                    ResponseTemplate::new(201)
                        .set_body_json(json!({"id": 101, "title": "New Post"})),
                )
                .expect(1)
                .mount(&server)
                .await;

            let client = ReqwestHttpClient::with_user_agent("apicheck-test").unwrap();
            let req = request(HttpMethod::Post, &format!("{}/posts", server.uri()))
                .with_body(json!({"title": "New Post"}));
            let response = client.execute(&req).await.unwrap();

            assert_eq!(response.status, 201);
            assert_eq!(
                response.content_type().map(|c| c.contains("application/json")),
                Some(true)
            );
            let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
            assert_eq!(body["id"], 101);
        }

        #[tokio::test]
        async fn test_query_string_is_sent() {
            let server = MockServer::start().await;
            Mock::given(method("DELETE"))
                .and(path("/posts/1"))
                .and(query_param("userId", "1"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
                .expect(1)
                .mount(&server)
                .await;

            let client = ReqwestHttpClient::new().unwrap();
            let req = request(
                HttpMethod::Delete,
                &format!("{}/posts/1?userId=1", server.uri()),
            );
            let response = client.execute(&req).await.unwrap();

            assert_eq!(response.status, 200);
            assert_eq!(response.body, b"{}".to_vec());
        }

        #[tokio::test]
        async fn test_timeout_is_mapped() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(
                    ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(5)),
                )
                .mount(&server)
                .await;

            let client = ReqwestHttpClient::new().unwrap();
            let req = request(HttpMethod::Get, &format!("{}/posts", server.uri()))
                .with_timeout_ms(100);
            let err = client.execute(&req).await.unwrap_err();

            assert_eq!(err, HttpClientError::Timeout { timeout_ms: 100 });
        }

        #[tokio::test]
        async fn test_refused_connection_is_network_failure() {
            let client = ReqwestHttpClient::new().unwrap();
            let req = request(HttpMethod::Get, "http://127.0.0.1:1/posts");
            let err = client.execute(&req).await.unwrap_err();

            assert_eq!(
                err.to_error_kind(),
                apicheck_domain::ErrorKind::NetworkFailure
            );
        }
    }
}
