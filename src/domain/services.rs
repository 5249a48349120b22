//! Collaborator interfaces
//!
//! The core is written against these traits so the catalog API, the partner
//! conversion API, page fetching and wall-clock time can all be swapped out.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::catalog::{SearchKey, SortBy};
use super::errors::ServiceResult;

/// Product-advertising catalog search
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Run one search and return the raw, untrusted items
    async fn search(&self, request: &CatalogSearch) -> ServiceResult<Vec<Value>>;
}

/// Parameters forwarded to the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSearch {
    pub keywords: String,
    pub search_index: String,
    pub item_count: u32,
    pub item_page: u32,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub min_reviews_rating: Option<u8>,
    pub brand: Option<String>,
    pub prime_only: bool,
    pub sort_by: Option<SortBy>,
}

impl CatalogSearch {
    /// Plain keyword search used for category deal listings
    pub fn keywords(keywords: impl Into<String>, search_index: impl Into<String>, item_count: u32) -> Self {
        Self {
            keywords: keywords.into(),
            search_index: search_index.into(),
            item_count,
            item_page: 1,
            min_price: None,
            max_price: None,
            min_reviews_rating: None,
            brand: None,
            prime_only: false,
            sort_by: None,
        }
    }

    pub fn from_key(key: &SearchKey, search_index: String) -> Self {
        Self {
            keywords: key.keywords.clone(),
            search_index,
            item_count: key.items_per_page,
            item_page: key.page,
            min_price: key.min_price,
            max_price: key.max_price,
            min_reviews_rating: key.min_rating,
            brand: key.brand.clone(),
            prime_only: key.prime_only,
            sort_by: (key.sort_by != SortBy::Relevance).then_some(key.sort_by),
        }
    }
}

/// Partner conversion modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvertMode {
    ConvertOnly,
    ConvertAndScrape,
}

impl ConvertMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConvertOnly => "convert_only",
            Self::ConvertAndScrape => "convert_and_scrape",
        }
    }
}

/// Partner network that turns product URLs into affiliate links
#[async_trait]
pub trait ConversionClient: Send + Sync {
    /// Submit a URL and return the partner's JSON body as-is
    async fn submit(&self, url: &str, mode: ConvertMode) -> ServiceResult<Value>;
}

/// Static page fetcher
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> ServiceResult<String>;
}

/// Time source for cache expiry
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
