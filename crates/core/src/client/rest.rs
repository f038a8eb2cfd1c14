//! JSON-over-HTTP client for the backend REST API.
//!
//! Wraps `reqwest` with URL building relative to a configurable base URL,
//! optional bearer auth, and uniform mapping of non-success responses and
//! malformed bodies into [`ApiError`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};
use url::Url;

use super::error::ApiError;

/// Longest body excerpt written to logs or error messages.
const BODY_EXCERPT_LEN: usize = 500;

/// Client for the backend REST API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<RestClientInner>,
}

struct RestClientInner {
    http: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl RestClient {
    /// Create a client rooted at `base_url`.
    ///
    /// `timeout` of `None` leaves requests to the transport's own defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if `base_url` cannot be parsed or cannot
    /// carry a path, and [`ApiError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        // Normalise to exactly one trailing slash so path segments append
        // after any prefix instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!(
                "{base_url}: cannot carry a path"
            )));
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("kiosk/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: Arc::new(RestClientInner {
                http: builder.build()?,
                base_url,
            }),
        })
    }

    /// The normalised base URL (always ends with `/`).
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build an absolute URL from path segments and query pairs.
    ///
    /// Segments are percent-encoded individually, so user-supplied keys are
    /// safe to pass.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the base URL cannot carry a path.
    pub fn url(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// Start a request against `segments` relative to the base URL.
    #[must_use]
    pub fn call<'a>(&'a self, method: Method, segments: &[&str]) -> Call<'a> {
        Call {
            client: self,
            method,
            segments: segments.iter().map(|s| (*s).to_owned()).collect(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    /// Shorthand for `call(Method::GET, ..)`.
    #[must_use]
    pub fn get<'a>(&'a self, segments: &[&str]) -> Call<'a> {
        self.call(Method::GET, segments)
    }

    /// Shorthand for `call(Method::POST, ..)`.
    #[must_use]
    pub fn post<'a>(&'a self, segments: &[&str]) -> Call<'a> {
        self.call(Method::POST, segments)
    }

    /// Shorthand for `call(Method::PUT, ..)`.
    #[must_use]
    pub fn put<'a>(&'a self, segments: &[&str]) -> Call<'a> {
        self.call(Method::PUT, segments)
    }

    /// Shorthand for `call(Method::DELETE, ..)`.
    #[must_use]
    pub fn delete<'a>(&'a self, segments: &[&str]) -> Call<'a> {
        self.call(Method::DELETE, segments)
    }
}

/// A request being assembled.
#[must_use = "a Call does nothing until `fetch` or `send` is awaited"]
pub struct Call<'a> {
    client: &'a RestClient,
    method: Method,
    segments: Vec<String>,
    query: Vec<(&'static str, String)>,
    body: Option<Result<serde_json::Value, serde_json::Error>>,
    bearer: Option<String>,
}

impl Call<'_> {
    /// Append a query parameter.
    pub fn query(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.query.push((name, value.into()));
        self
    }

    /// Append a query parameter when `value` is present.
    pub fn query_opt(self, name: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.query(name, value),
            None => self,
        }
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.body = Some(serde_json::to_value(body));
        self
    }

    /// Authenticate with a bearer token when one is available.
    pub fn bearer(mut self, token: Option<&SecretString>) -> Self {
        self.bearer = token.map(|t| t.expose_secret().to_owned());
        self
    }

    /// Send the request and decode the JSON response body.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-success status, or a
    /// body that does not decode as `T`.
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let context = self.context();
        let text = self.send_raw().await?;
        decode(context, &text)
    }

    /// Like [`fetch`](Self::fetch), but an empty or `null` body is `None`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-success status, or a
    /// non-empty body that does not decode as `T`.
    pub async fn fetch_optional<T: DeserializeOwned>(self) -> Result<Option<T>, ApiError> {
        let context = self.context();
        let text = self.send_raw().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        decode(context, &text)
    }

    /// Send the request, ignoring any response body.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or non-success status.
    pub async fn send(self) -> Result<(), ApiError> {
        self.send_raw().await.map(|_| ())
    }

    fn context(&self) -> String {
        format!("{} /{}", self.method, self.segments.join("/"))
    }

    #[instrument(skip_all, fields(method = %self.method, path = %self.segments.join("/")))]
    async fn send_raw(self) -> Result<String, ApiError> {
        let segments: Vec<&str> = self.segments.iter().map(String::as_str).collect();
        let query: Vec<(&str, String)> = self.query.clone();
        let url = self.client.url(&segments, &query)?;

        let mut request = self.client.inner.http.request(self.method.clone(), url);
        if let Some(token) = &self.bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = self.body {
            request = request.json(&body.map_err(ApiError::Encode)?);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            debug!(status = %status, "API request succeeded");
            return Ok(text);
        }

        let detail = error_detail(&text);
        error!(
            status = %status,
            body = %excerpt(&text),
            "API returned non-success status"
        );
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(detail),
            StatusCode::NOT_FOUND => ApiError::NotFound(detail),
            _ => ApiError::Status {
                status: status.as_u16(),
                detail,
            },
        })
    }
}

/// Pull the human-readable message out of an error body.
///
/// The backend answers errors with `{"detail": "..."}`; validation failures
/// carry a list under `detail` instead, which is rendered as JSON.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => excerpt(body),
        },
        _ if body.trim().is_empty() => "(empty body)".to_string(),
        _ => excerpt(body),
    }
}

fn decode<T: DeserializeOwned>(context: String, text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| {
        error!(
            error = %e,
            context = %context,
            body = %excerpt(text),
            "Failed to parse API response"
        );
        ApiError::Parse { context, source: e }
    })
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_LEN).collect()
}
