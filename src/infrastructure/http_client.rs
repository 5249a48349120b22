//! Page fetching with browser-like headers
//!
//! One attempt per call with a fixed timeout. Retail sites routinely reject
//! library user agents, so every request carries the configured browser
//! User-Agent, Accept and Accept-Language headers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::{Client, ClientBuilder};
use tracing::{debug, info, warn};

use crate::domain::errors::{ServiceError, ServiceResult, TransportKind};
use crate::domain::services::PageFetcher;
use crate::infrastructure::config::{HttpConfig, defaults};

/// Configuration for HTTP client behavior
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub follow_redirects: bool,
}

impl HttpClientConfig {
    pub fn from_http_config(config: &HttpConfig) -> Self {
        Self {
            timeout_seconds: config.timeout_seconds,
            user_agent: config.user_agent.clone(),
            accept: config.accept.clone(),
            accept_language: config.accept_language.clone(),
            follow_redirects: config.follow_redirects,
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from_http_config(&HttpConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new() -> ServiceResult<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> ServiceResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value(&config.accept, defaults::BROWSER_ACCEPT));
        headers.insert(
            ACCEPT_LANGUAGE,
            header_value(&config.accept_language, defaults::BROWSER_ACCEPT_LANGUAGE),
        );

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .map_err(|e| ServiceError::transport(TransportKind::Other, "http client", e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Fetch a page body as text, non-success statuses are errors
    pub async fn fetch_html_string(&self, url: &str) -> ServiceResult<String> {
        info!("🌐 HTTP GET: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ServiceError::from_reqwest(&e, url))?;

        let status = response.status();
        if !status.is_success() {
            warn!("❌ HTTP error {}: {}", status, url);
            return Err(ServiceError::transport(
                TransportKind::Status(status.as_u16()),
                url,
                format!("HTTP {status}"),
            ));
        }

        let body = response.text().await.map_err(|e| ServiceError::from_reqwest(&e, url))?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

fn header_value(value: &str, fallback: &'static str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| {
        warn!("Invalid header value '{}', using default", value);
        HeaderValue::from_static(fallback)
    })
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_page(&self, url: &str) -> ServiceResult<String> {
        self.fetch_html_string(url).await
    }
}
