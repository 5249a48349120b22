//! Data Transfer Objects handed to the HTTP layer
//!
//! Serialized in camelCase; timestamps are RFC 3339.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::product::{ExtractionResult, ProductRecord};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDeals {
    pub category: String,
    pub total: usize,
    pub deals: Vec<ProductRecord>,
    pub cached_at: DateTime<Utc>,
    pub cache_valid_until: DateTime<Utc>,
    /// Served without calling the catalog
    pub cached: bool,
    /// Catalog items that could not be decoded
    pub skipped_items: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllDeals {
    pub total: usize,
    pub deals: Vec<ProductRecord>,
    pub cached_at: BTreeMap<String, DateTime<Utc>>,
    pub cache_valid_until: BTreeMap<String, DateTime<Utc>>,
    pub skipped_items: usize,
    /// Categories whose catalog call failed and are missing from `deals`
    pub failed_categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub products: Vec<ProductRecord>,
    pub total_results: usize,
    pub has_more: bool,
    pub cached: bool,
    pub timestamp: DateTime<Utc>,
    pub skipped_items: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertedProduct {
    pub original_url: String,
    pub affiliate_url: String,
    pub platform: String,
    pub details: ExtractionResult,
    /// Whether the partner scrape filled any field
    pub used_partner_scrape: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSummary {
    pub status: String,
    pub message: String,
    pub categories: usize,
    pub total_deals: usize,
    pub invalidated_entries: usize,
    pub timestamp: DateTime<Utc>,
}
