//! Product page extraction
//!
//! `extract` never fails: every strategy contributes a field or nothing, and a
//! page that cannot be fetched produces the default result.

use std::sync::Arc;
use std::time::Instant;

use scraper::Html;
use tracing::{debug, info, warn};
use url::Url;

use super::category::resolve_category;
use super::metadata::{MetadataSelectors, truncate_chars};
use super::platform_table::{PlatformTable, Strategy};
use super::price::{generic_price, platform_price};
use crate::domain::product::ExtractionResult;
use crate::domain::services::PageFetcher;
use crate::infrastructure::parsing_error::ParsingResult;

pub struct ExtractionPipeline {
    fetcher: Arc<dyn PageFetcher>,
    table: Arc<PlatformTable>,
    metadata: MetadataSelectors,
}

impl ExtractionPipeline {
    /// Pipeline over the built-in platform table
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> ParsingResult<Self> {
        Self::with_table(fetcher, Arc::new(PlatformTable::builtin()?))
    }

    pub fn with_table(fetcher: Arc<dyn PageFetcher>, table: Arc<PlatformTable>) -> ParsingResult<Self> {
        Ok(Self {
            fetcher,
            table,
            metadata: MetadataSelectors::new()?,
        })
    }

    pub fn table(&self) -> &PlatformTable {
        &self.table
    }

    /// Name of the platform handling `url`, "Generic" when none matches
    pub fn platform_name(&self, url: &str) -> &str {
        &self.table.detect(url).name
    }

    pub async fn extract(&self, url: &str) -> ExtractionResult {
        let started = Instant::now();

        if Url::parse(url).is_err() {
            warn!("⚠️ Not a valid product URL, skipping extraction: {}", url);
            return ExtractionResult::default();
        }

        let body = match self.fetcher.fetch_page(url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("⚠️ Page fetch failed for {}: {}", url, e);
                return ExtractionResult::default();
            }
        };

        let result = self.extract_from_html(url, &body);
        info!(
            "🔍 [{}] title={} image={} price={} category={} ({:?})",
            self.platform_name(url),
            if result.title.is_empty() { "NOT FOUND" } else { "✓" },
            if result.image_url.is_empty() { "NOT FOUND" } else { "✓" },
            if result.price.is_empty() { "NOT FOUND" } else { result.price.as_str() },
            result.category,
            started.elapsed()
        );
        result
    }

    /// Run every strategy over already-fetched markup
    pub fn extract_from_html(&self, url: &str, body: &str) -> ExtractionResult {
        let document = Html::parse_document(body);
        let profile = self.table.detect(url);
        let preview = self.metadata.extract(&document, self.table.description_max_chars);

        let title = non_empty(preview.title).or_else(|| first_value(&document, &profile.title));

        let image = non_empty(preview.image)
            .or_else(|| first_value(&document, &profile.image))
            .map(|src| resolve_url(url, &src));

        let description = non_empty(preview.description).or_else(|| {
            first_value(&document, &profile.description)
                .map(|text| truncate_chars(&text, self.table.description_max_chars))
        });

        let price = platform_price(&document, profile, &self.table)
            .or_else(|e| {
                debug!("{}, falling back to text scan", e);
                generic_price(&document, &self.table)
            })
            .unwrap_or_else(|e| {
                debug!("{} for {}", e, url);
                String::new()
            });

        ExtractionResult {
            title: title.unwrap_or_default(),
            image_url: image.unwrap_or_default(),
            price,
            description: description.unwrap_or_default(),
            category: resolve_category(url, Some(&document), profile, &self.table),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

/// First non-empty value produced by a title/image/description rule list
fn first_value(document: &Html, strategies: &[Strategy]) -> Option<String> {
    strategies.iter().find_map(|strategy| match strategy {
        Strategy::Text { selector, .. } => document
            .select(selector)
            .map(|element| element.text().collect::<Vec<_>>().join(" "))
            .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
            .find(|text| !text.is_empty()),
        Strategy::Attribute { selector, attrs, .. } => document.select(selector).find_map(|element| {
            attrs
                .iter()
                .filter_map(|attr| element.value().attr(attr))
                .map(str::trim)
                .find(|value| !value.is_empty())
                .map(str::to_string)
        }),
        Strategy::ScriptPattern { pattern, .. } => document
            .root_element()
            .text()
            .find_map(|text| pattern.captures(text))
            .and_then(|captures| captures.get(1).map(|m| m.as_str().trim().to_string())),
    })
}

/// Make a possibly relative or protocol-relative image reference absolute
fn resolve_url(page_url: &str, src: &str) -> String {
    Url::parse(page_url)
        .and_then(|base| base.join(src))
        .map(|resolved| resolved.to_string())
        .unwrap_or_else(|_| src.to_string())
}
