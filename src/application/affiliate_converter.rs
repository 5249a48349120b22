//! Affiliate link conversion with product detail enrichment
//!
//! Details come from the local extraction pipeline first. Only when that
//! produced neither a title nor an image is the partner asked to fetch and
//! scrape the page itself, and its answer may only fill fields that are
//! still empty.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};
use url::Url;

use super::dto::ConvertedProduct;
use crate::domain::errors::{ServiceError, ServiceResult};
use crate::domain::product::ExtractionResult;
use crate::domain::services::{ConversionClient, ConvertMode};
use crate::infrastructure::extraction::ExtractionPipeline;
use crate::infrastructure::extraction::metadata::truncate_chars;

const AFFILIATE_URL_KEYS: [&str; 4] = ["affiliateUrl", "affiliate_url", "converted_url", "url"];
const TITLE_KEYS: [&str; 3] = ["title", "product_title", "name"];
const IMAGE_KEYS: [&str; 5] = ["image", "imageUrl", "image_url", "product_image", "img"];
const PRICE_KEYS: [&str; 4] = ["price", "selling_price", "sale_price", "product_price"];
const DESCRIPTION_KEYS: [&str; 3] = ["description", "product_description", "desc"];
const CATEGORY_KEYS: [&str; 1] = ["category"];

pub struct AffiliateConverter {
    partner: Arc<dyn ConversionClient>,
    pipeline: Arc<ExtractionPipeline>,
}

impl AffiliateConverter {
    pub fn new(partner: Arc<dyn ConversionClient>, pipeline: Arc<ExtractionPipeline>) -> Self {
        Self { partner, pipeline }
    }

    /// Affiliate link for `url`
    ///
    /// Timeouts, other transport failures and partner-reported errors come
    /// back as distinct [`ServiceError`] kinds.
    pub async fn convert(&self, url: &str) -> ServiceResult<String> {
        Url::parse(url).map_err(|e| ServiceError::parse("url", e.to_string()))?;

        let body = self.partner.submit(url, ConvertMode::ConvertOnly).await?;
        let affiliate_url = affiliate_url_from(&body)?;
        info!("🔗 Converted {} -> {}", url, affiliate_url);
        Ok(affiliate_url)
    }

    /// Product details, local extraction first with the partner scrape as fallback
    pub async fn get_product_details(&self, url: &str) -> ExtractionResult {
        self.resolve_details(url).await.0
    }

    /// Link and details in one call
    pub async fn convert_with_details(&self, url: &str) -> ServiceResult<ConvertedProduct> {
        let (converted, (details, used_partner_scrape)) = tokio::join!(self.convert(url), self.resolve_details(url));

        Ok(ConvertedProduct {
            original_url: url.to_string(),
            affiliate_url: converted?,
            platform: self.pipeline.platform_name(url).to_string(),
            details,
            used_partner_scrape,
        })
    }

    async fn resolve_details(&self, url: &str) -> (ExtractionResult, bool) {
        let fast = self.pipeline.extract(url).await;
        if !fast.is_blank() {
            return (fast, false);
        }

        info!("🛡️ No title or image from {}, asking partner to scrape", url);
        let body = match self.partner.submit(url, ConvertMode::ConvertAndScrape).await {
            Ok(body) => body,
            Err(e) => {
                warn!("⚠️ Partner scrape failed for {}: {}", url, e);
                return (fast, false);
            }
        };
        if let Some(message) = reported_error(&body) {
            warn!("⚠️ Partner scrape rejected {}: {}", url, message);
            return (fast, false);
        }

        let max_description = self.pipeline.table().description_max_chars;
        merge_scraped(fast, &body, max_description)
    }
}

/// Fill only empty fields from a partner scrape response
///
/// Returns the merged result and whether any field came from the partner.
pub fn merge_scraped(mut details: ExtractionResult, body: &Value, max_description: usize) -> (ExtractionResult, bool) {
    let sources = scrape_sources(body);
    let mut filled = false;

    let mut fill = |field: &mut String, keys: &[&str]| {
        if field.is_empty() {
            if let Some(value) = first_string(&sources, keys) {
                *field = value;
                filled = true;
            }
        }
    };
    fill(&mut details.title, &TITLE_KEYS);
    fill(&mut details.image_url, &IMAGE_KEYS);
    fill(&mut details.price, &PRICE_KEYS);
    fill(&mut details.description, &DESCRIPTION_KEYS);

    if details.has_default_category() {
        if let Some(category) = first_string(&sources, &CATEGORY_KEYS) {
            details.category = category;
            filled = true;
        }
    }
    details.description = truncate_chars(&details.description, max_description);
    (details, filled)
}

/// Top-level object plus a nested `data` object, in that order
fn scrape_sources(body: &Value) -> Vec<&serde_json::Map<String, Value>> {
    let mut sources = Vec::new();
    if let Some(top) = body.as_object() {
        sources.push(top);
        if let Some(data) = top.get("data").and_then(Value::as_object) {
            sources.push(data);
        }
    }
    sources
}

fn first_string(sources: &[&serde_json::Map<String, Value>], keys: &[&str]) -> Option<String> {
    sources.iter().find_map(|source| {
        keys.iter().find_map(|key| match source.get(*key)? {
            Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    })
}

/// Partner error flag: non-zero number, `true`, or a non-empty string
fn reported_error(body: &Value) -> Option<String> {
    let flagged = match body.get("error")? {
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.trim().is_empty() && s != "0" && !s.eq_ignore_ascii_case("false"),
        _ => false,
    };
    flagged.then(|| error_message(body))
}

fn error_message(body: &Value) -> String {
    ["message", "msg"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .or_else(|| body.get("error").and_then(Value::as_str))
        .unwrap_or("conversion rejected")
        .to_string()
}

/// Extract the link from a convert-only response
pub fn affiliate_url_from(body: &Value) -> ServiceResult<String> {
    if let Some(message) = reported_error(body) {
        return Err(ServiceError::upstream(message));
    }

    let from_data_string = body
        .get("data")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    if let Some(url) = from_data_string.or_else(|| first_string(&scrape_sources(body), &AFFILIATE_URL_KEYS)) {
        return Ok(url);
    }

    let success = body.get("success").map(|flag| match flag {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => true,
    });
    if success == Some(false) {
        return Err(ServiceError::upstream(error_message(body)));
    }
    Err(ServiceError::upstream("partner response carried no affiliate link"))
}
