//! JSON-over-HTTP client for the voting backend

use super::error::ClientError;
use crate::config::FileApiConfig;
use consensus_application::ApiError;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};

/// Longest backend error text carried into an [`ApiError`]
const MAX_DETAIL_LEN: usize = 200;

/// Shared HTTP client
///
/// Every request is bounded by the configured timeout. Nothing is retried or
/// cached; each call goes to the backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        token: Option<&str>,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "scheme must be http or https".to_string(),
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Token {}", token))
                .map_err(|e| ClientError::InvalidToken(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .user_agent(concat!("rule-consensus/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
        })
    }

    pub fn from_config(config: &FileApiConfig) -> Result<Self, ClientError> {
        Self::new(&config.base_url, config.timeout(), config.token.as_deref())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.http.get(self.url(path));
        self.send_json("GET", path, request).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.http.get(self.url(path)).query(query);
        self.send_json("GET", path, request).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http.post(self.url(path)).json(body);
        self.send_json("POST", path, request).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http.put(self.url(path)).json(body);
        self.send_json("PUT", path, request).await
    }

    /// DELETE; the response body, if any, is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.http.delete(self.url(path));
        self.execute("DELETE", path, request).await.map(|_| ())
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.execute(method, path, request).await?;
        serde_json::from_str(&body).map_err(|e| {
            debug!("Undecodable response from {} {}: {}", method, path, e);
            ApiError::Decode(format!("{} {}: {}", method, path, e))
        })
    }

    async fn execute(
        &self,
        method: &str,
        path: &str,
        request: RequestBuilder,
    ) -> Result<String, ApiError> {
        debug!("{} {}", method, path);
        let response = request.send().await.map_err(map_transport)?;
        let status = response.status();
        let body = response.text().await.map_err(map_transport)?;
        trace!("{} {} -> {} ({} bytes)", method, path, status, body.len());

        if status.is_success() {
            Ok(body)
        } else {
            let err = map_status(status.as_u16(), &body, path);
            debug!("{} {} failed: {}", method, path, err);
            Err(err)
        }
    }
}

/// Classify a failure that produced no HTTP status.
fn map_transport(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else if err.is_decode() {
        ApiError::Decode(err.to_string())
    } else {
        ApiError::Network(err.to_string())
    }
}

/// Classify a non-success HTTP status.
pub fn map_status(status: u16, body: &str, path: &str) -> ApiError {
    let detail = extract_detail(body).unwrap_or_else(|| format!("HTTP {}", status));
    match status {
        404 => ApiError::NotFound(path.to_string()),
        409 => ApiError::Conflict(detail),
        400 | 422 => ApiError::BadRequest(detail),
        401 => ApiError::Unauthorized(detail),
        403 => ApiError::Forbidden(detail),
        _ => ApiError::Server {
            status,
            message: detail,
        },
    }
}

/// Pull a readable message out of an error body.
///
/// Understands `{"detail": "..."}` and field error maps such as
/// `{"name": ["This field may not be blank."]}`; anything else is used as
/// plain text.
fn extract_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let detail = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(detail)) => detail.clone(),
            _ => map
                .iter()
                .map(|(field, value)| format!("{}: {}", field, flatten(value)))
                .collect::<Vec<_>>()
                .join("; "),
        },
        Ok(other) => flatten(&other),
        Err(_) => body.to_string(),
    };

    if detail.is_empty() {
        return None;
    }
    Some(truncate(detail))
}

fn flatten(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(flatten)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn truncate(mut text: String) -> String {
    if text.len() > MAX_DETAIL_LEN {
        let cut = (0..=MAX_DETAIL_LEN)
            .rev()
            .find(|&i| text.is_char_boundary(i))
            .unwrap_or(0);
        text.truncate(cut);
        text.push('…');
    }
    text
}
