use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::{Error, Result};

use super::request::RequestInput;
use super::response::HttpResponse;

/// Thin wrapper over a pooled `reqwest::Client` bound to one base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, path: &str) -> Result<reqwest::Url> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        reqwest::Url::parse(&raw).map_err(|e| Error::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })
    }

    pub async fn send(&self, request: RequestInput) -> Result<HttpResponse> {
        let url = self.url_for(&request.path)?;
        let method: reqwest::Method = request.method.into();

        let mut req_builder = self
            .client
            .request(method, url.clone())
            .header(ACCEPT, "application/json");
        if let Some(body) = &request.body {
            req_builder = req_builder.json(body);
        }

        let started = Instant::now();
        let response = req_builder.send().await.map_err(Error::Transport)?;
        let elapsed = started.elapsed().as_millis();

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("text/plain")
            .to_string();
        let bytes = response.bytes().await.map_err(Error::ResponseRead)?;

        debug!(
            method = %request.method,
            url = %url,
            status = status.as_u16(),
            duration_ms = elapsed as u64,
            "request completed"
        );

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            duration_ms: elapsed,
            size_bytes: bytes.len(),
            content_type,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::Config("Base URL cannot be empty".to_string()));
    }

    let url = reqwest::Url::parse(trimmed).map_err(|e| Error::InvalidUrl {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "Base URL must use http or https: `{trimmed}`"
        )));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = ApiClient::new("https://example.com/", None).unwrap();
        assert_eq!(client.base_url(), "https://example.com");
    }

    #[test]
    fn url_for_joins_paths() {
        let client = ApiClient::new("http://127.0.0.1:8080", None).unwrap();
        let url = client.url_for("/api/1/item/abc").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/api/1/item/abc");
    }

    #[test]
    fn rejects_empty_and_non_http_urls() {
        assert!(matches!(ApiClient::new("  ", None), Err(Error::Config(_))));
        assert!(matches!(ApiClient::new("not a url", None), Err(Error::InvalidUrl { .. })));
        assert!(matches!(ApiClient::new("ftp://example.com", None), Err(Error::Config(_))));
    }
}
