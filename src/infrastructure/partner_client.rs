//! Affiliate partner conversion API over HTTP

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::errors::{ServiceError, ServiceResult, TransportKind};
use crate::domain::services::{ConversionClient, ConvertMode};
use crate::infrastructure::config::PartnerConfig;

#[derive(Debug, Serialize)]
struct ConvertRequest<'a> {
    deal: &'a str,
    convert_option: &'a str,
}

/// Posts `{"deal", "convert_option"}` with a bearer token
#[derive(Debug, Clone)]
pub struct HttpConversionClient {
    client: Client,
    config: PartnerConfig,
}

impl HttpConversionClient {
    pub fn new(config: PartnerConfig) -> ServiceResult<Self> {
        let client = Client::builder()
            .gzip(true)
            .build()
            .map_err(|e| ServiceError::transport(TransportKind::Other, "partner client", e.to_string()))?;
        if config.api_token.is_empty() {
            warn!("⚠️ Partner API token is empty, conversions will be rejected");
        }
        Ok(Self { client, config })
    }

    /// Convert-only calls are short, scrape calls get the longer budget
    pub fn timeout_for(&self, mode: ConvertMode) -> Duration {
        Duration::from_secs(match mode {
            ConvertMode::ConvertOnly => self.config.convert_timeout_seconds,
            ConvertMode::ConvertAndScrape => self.config.scrape_timeout_seconds,
        })
    }
}

#[async_trait]
impl ConversionClient for HttpConversionClient {
    async fn submit(&self, url: &str, mode: ConvertMode) -> ServiceResult<Value> {
        if self.config.api_token.is_empty() {
            return Err(ServiceError::upstream("partner API token is not configured"));
        }

        info!("🔗 Partner {} for {}", mode.as_str(), url);
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_token)
            .timeout(self.timeout_for(mode))
            .json(&ConvertRequest {
                deal: url,
                convert_option: mode.as_str(),
            })
            .send()
            .await
            .map_err(|e| ServiceError::from_reqwest(&e, &self.config.endpoint))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::from_reqwest(&e, &self.config.endpoint))?;

        // Error bodies are still JSON with an error flag, let the caller read them
        match serde_json::from_str::<Value>(&body) {
            Ok(value) => {
                debug!("Partner response ({}): {}", status, value);
                Ok(value)
            }
            Err(_) if !status.is_success() => Err(ServiceError::transport(
                TransportKind::Status(status.as_u16()),
                &self.config.endpoint,
                format!("HTTP {status}"),
            )),
            Err(e) => Err(ServiceError::transport(
                TransportKind::Decode,
                &self.config.endpoint,
                format!("response is not JSON: {e}"),
            )),
        }
    }
}
