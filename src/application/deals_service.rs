//! Deal listings and product search over the catalog, behind TTL caches

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tracing::{info, warn};

use super::dto::{AllDeals, CategoryDeals, RefreshSummary, SearchResults};
use super::item_normalizer::{ItemNormalizer, NormalizedBatch, ResultFilter};
use crate::domain::catalog::{CategoryRegistry, SearchKey, SearchQuery};
use crate::domain::errors::{ServiceError, ServiceResult};
use crate::domain::product::DEFAULT_CATEGORY;
use crate::domain::services::{CatalogClient, CatalogSearch, Clock, SystemClock};
use crate::infrastructure::cache_store::{CacheStore, Cached};
use crate::infrastructure::config::AppConfig;

/// Tunables for listings and search
#[derive(Debug, Clone)]
pub struct DealsSettings {
    pub deals_ttl: Duration,
    pub search_ttl: Duration,
    pub deals_per_category: u32,
    pub deals_query_suffix: String,
    pub max_search_pages: u32,
}

impl Default for DealsSettings {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

impl DealsSettings {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            deals_ttl: config.deals_ttl(),
            search_ttl: config.search_ttl(),
            deals_per_category: config.catalog.deals_per_category,
            deals_query_suffix: config.catalog.deals_query_suffix.clone(),
            max_search_pages: config.catalog.max_search_pages,
        }
    }
}

pub struct DealsService {
    catalog: Arc<dyn CatalogClient>,
    normalizer: ItemNormalizer,
    registry: CategoryRegistry,
    settings: DealsSettings,
    deals_cache: CacheStore<String, NormalizedBatch>,
    search_cache: CacheStore<SearchKey, NormalizedBatch>,
}

impl DealsService {
    pub fn new(catalog: Arc<dyn CatalogClient>, settings: DealsSettings) -> Self {
        Self::with_clock(catalog, settings, CategoryRegistry::default(), Arc::new(SystemClock))
    }

    pub fn with_clock(
        catalog: Arc<dyn CatalogClient>,
        settings: DealsSettings,
        registry: CategoryRegistry,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            normalizer: ItemNormalizer::new(),
            registry,
            settings,
            deals_cache: CacheStore::with_clock("deals", clock.clone()),
            search_cache: CacheStore::with_clock("search", clock),
        }
    }

    pub fn categories(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Discounted items for one storefront category
    pub async fn category_deals(&self, category: &str, force_refresh: bool) -> ServiceResult<CategoryDeals> {
        let search_index = self
            .registry
            .search_index(category)
            .ok_or_else(|| ServiceError::not_found(category))?
            .to_string();

        let cached = self
            .deals_cache
            .get_or_fetch(category.to_string(), self.settings.deals_ttl, force_refresh, move || {
                self.fetch_category(category, search_index)
            })
            .await?;

        Ok(category_response(category, cached))
    }

    async fn fetch_category(&self, category: &str, search_index: String) -> ServiceResult<NormalizedBatch> {
        let keywords = format!("{} {}", category, self.settings.deals_query_suffix);
        let request = CatalogSearch::keywords(keywords, search_index, self.settings.deals_per_category);
        let items = self.catalog.search(&request).await?;
        let batch = self.normalizer.normalize_all(&items, category, ResultFilter::DealsOnly);
        info!("Found {} deals for {}", batch.records.len(), category);
        Ok(batch)
    }

    /// Deals from every category
    ///
    /// A failing category is logged and left out; the call only fails when
    /// every category failed.
    pub async fn all_deals(&self, force_refresh: bool) -> ServiceResult<AllDeals> {
        let names = self.registry.names();
        let results = join_all(names.iter().map(|name| self.category_deals(name, force_refresh))).await;

        let mut response = AllDeals {
            total: 0,
            deals: Vec::new(),
            cached_at: BTreeMap::new(),
            cache_valid_until: BTreeMap::new(),
            skipped_items: 0,
            failed_categories: Vec::new(),
        };
        let mut first_error = None;

        for (name, result) in names.into_iter().zip(results) {
            match result {
                Ok(listing) => {
                    response.cached_at.insert(name.clone(), listing.cached_at);
                    response.cache_valid_until.insert(name, listing.cache_valid_until);
                    response.skipped_items += listing.skipped_items;
                    response.deals.extend(listing.deals);
                }
                Err(e) => {
                    warn!("⚠️ Deals for {} unavailable: {}", name, e);
                    response.failed_categories.push(name);
                    first_error.get_or_insert(e);
                }
            }
        }

        if response.cached_at.is_empty() {
            if let Some(e) = first_error {
                return Err(e);
            }
        }
        response.total = response.deals.len();
        Ok(response)
    }

    /// Catalog search, cached per canonical filter tuple, not deal-filtered
    pub async fn search(&self, query: &SearchQuery, force_refresh: bool) -> ServiceResult<SearchResults> {
        let key = query.canonical();
        if key.keywords.is_empty() {
            return Err(ServiceError::parse("keywords", "search needs at least one keyword"));
        }

        let search_index = self.registry.search_index_for(key.category.as_deref());
        let request = CatalogSearch::from_key(&key, search_index);
        let label = key.category.clone().unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        let (catalog, normalizer, request, label) = (&self.catalog, &self.normalizer, &request, label.as_str());
        let cached = self
            .search_cache
            .get_or_fetch(key.clone(), self.settings.search_ttl, force_refresh, move || async move {
                let items = catalog.search(request).await?;
                Ok::<_, ServiceError>(normalizer.normalize_all(&items, label, ResultFilter::All))
            })
            .await?;

        // Undecodable items occupy page slots too
        let page_len = cached.value.records.len() + cached.value.skipped;
        let has_more = page_len >= key.items_per_page as usize && key.page < self.settings.max_search_pages;
        Ok(SearchResults {
            total_results: cached.value.records.len(),
            has_more,
            cached: cached.is_hit(),
            timestamp: cached.fetched_at,
            skipped_items: cached.value.skipped,
            products: cached.value.records,
        })
    }

    /// Drop both caches and refetch every category
    pub async fn refresh_all(&self) -> ServiceResult<RefreshSummary> {
        info!("Manual cache refresh triggered");
        let invalidated = self.deals_cache.invalidate_all().await + self.search_cache.invalidate_all().await;
        let deals = self.all_deals(true).await?;

        Ok(RefreshSummary {
            status: "success".to_string(),
            message: format!(
                "Cache refreshed for {} of {} categories",
                deals.cached_at.len(),
                self.registry.names().len()
            ),
            categories: deals.cached_at.len(),
            total_deals: deals.total,
            invalidated_entries: invalidated,
            timestamp: Utc::now(),
        })
    }

    pub fn settings(&self) -> &DealsSettings {
        &self.settings
    }
}

fn category_response(category: &str, cached: Cached<NormalizedBatch>) -> CategoryDeals {
    let cached_flag = cached.is_hit();
    CategoryDeals {
        category: category.to_string(),
        total: cached.value.records.len(),
        skipped_items: cached.value.skipped,
        deals: cached.value.records,
        cached_at: cached.fetched_at,
        cache_valid_until: cached.valid_until,
        cached: cached_flag,
    }
}
