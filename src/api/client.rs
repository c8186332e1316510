use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use super::error::{error_message, ApiError, Result};
use crate::config::Config;

/// JSON-over-HTTP transport bound to a single backend base URL.
///
/// Cloning is cheap: the underlying `reqwest::Client` shares its pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("coddoc/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Interactive API documentation served by the backend.
    pub fn docs_url(&self) -> String {
        format!("{}/docs", self.base_url.as_str().trim_end_matches('/'))
    }

    /// Resolve `path` (e.g. `/api/reviews`) against the base URL, keeping any
    /// path prefix the base URL carries.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{}/{}", base, path)).map_err(|e| ApiError::InvalidUrl(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        self.send::<(), T>(Method::GET, path, query, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, &[], Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send::<(), T>(Method::DELETE, path, &[], None).await
    }

    /// Perform one request and decode the JSON body.
    ///
    /// An empty 2xx body decodes as JSON `null`, so `T = ()` accepts `204 No Content`.
    pub async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut url = self.endpoint(path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        debug!(%method, %url, "api request");

        let mut request = self.http.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(%method, path, error = %e, "api request failed");
            ApiError::Network(e)
        })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = error_message(status, &text);
            warn!(%method, path, %status, %message, "api returned error status");
            return Err(ApiError::Status { status, message });
        }

        debug!(%method, path, %status, bytes = text.len(), "api response");

        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidUrl("API base URL is empty".to_string()));
    }
    let url = Url::parse(trimmed).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", trimmed, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ApiError::InvalidUrl(format!(
            "unsupported scheme '{}' in {}",
            other, trimmed
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_urls() {
        assert!(matches!(ApiClient::new("", None), Err(ApiError::InvalidUrl(_))));
        assert!(matches!(
            ApiClient::new("not a url", None),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(
            ApiClient::new("ftp://example.com", None),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_endpoint_joins_path() {
        let client = ApiClient::new("http://localhost:8000", None).unwrap();
        assert_eq!(
            client.endpoint("/api/health").unwrap().as_str(),
            "http://localhost:8000/api/health"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_prefix() {
        let client = ApiClient::new("https://example.com/coddoc/", None).unwrap();
        assert_eq!(
            client.endpoint("/api/reviews").unwrap().as_str(),
            "https://example.com/coddoc/api/reviews"
        );
    }

    #[test]
    fn test_docs_url() {
        let client = ApiClient::new("http://localhost:8000/", None).unwrap();
        assert_eq!(client.docs_url(), "http://localhost:8000/docs");
    }
}
