//! Catalog input schema and search parameters
//!
//! Raw catalog items are untrusted: any nested section may be missing or carry
//! the wrong JSON type. Every field below decodes through [`tolerant`], so a bad
//! section becomes `None` instead of failing the whole item.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decode a field, turning any type mismatch into `None`
fn tolerant<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// One catalog search hit, fully optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawCatalogItem {
    #[serde(rename = "ASIN", default, deserialize_with = "tolerant")]
    pub asin: Option<String>,
    #[serde(rename = "DetailPageURL", default, deserialize_with = "tolerant")]
    pub detail_page_url: Option<String>,
    #[serde(default, deserialize_with = "tolerant")]
    pub item_info: Option<ItemInfo>,
    #[serde(default, deserialize_with = "tolerant")]
    pub images: Option<Images>,
    #[serde(default, deserialize_with = "tolerant")]
    pub offers: Option<Offers>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemInfo {
    #[serde(default, deserialize_with = "tolerant")]
    pub title: Option<DisplayValue>,
    #[serde(default, deserialize_with = "tolerant")]
    pub features: Option<DisplayValues>,
    #[serde(default, deserialize_with = "tolerant")]
    pub by_line_info: Option<ByLineInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DisplayValue {
    #[serde(default, deserialize_with = "tolerant")]
    pub display_value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DisplayValues {
    #[serde(default, deserialize_with = "tolerant")]
    pub display_values: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ByLineInfo {
    #[serde(default, deserialize_with = "tolerant")]
    pub brand: Option<DisplayValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Images {
    #[serde(default, deserialize_with = "tolerant")]
    pub primary: Option<ImageSet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageSet {
    #[serde(default, deserialize_with = "tolerant")]
    pub large: Option<ImageVariant>,
    #[serde(default, deserialize_with = "tolerant")]
    pub medium: Option<ImageVariant>,
    #[serde(default, deserialize_with = "tolerant")]
    pub small: Option<ImageVariant>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageVariant {
    #[serde(rename = "URL", default, deserialize_with = "tolerant")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Offers {
    /// Kept raw so one malformed listing cannot hide the others
    #[serde(default, deserialize_with = "tolerant")]
    pub listings: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Listing {
    #[serde(default, deserialize_with = "tolerant")]
    pub price: Option<Money>,
    #[serde(default, deserialize_with = "tolerant")]
    pub saving_basis: Option<Money>,
    #[serde(default, deserialize_with = "tolerant")]
    pub delivery_info: Option<DeliveryInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Money {
    /// Number on the wire, occasionally a numeric string
    #[serde(default, deserialize_with = "tolerant")]
    pub amount: Option<Value>,
    #[serde(default, deserialize_with = "tolerant")]
    pub display_amount: Option<String>,
}

impl Money {
    pub fn numeric_amount(&self) -> Option<f64> {
        match self.amount.as_ref()? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeliveryInfo {
    #[serde(default, deserialize_with = "tolerant")]
    pub is_prime_eligible: Option<bool>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl RawCatalogItem {
    pub fn title(&self) -> Option<&str> {
        let title = self.item_info.as_ref()?.title.as_ref()?;
        non_blank(title.display_value.as_ref())
    }

    /// Largest available image variant
    pub fn image_url(&self) -> Option<&str> {
        let primary = self.images.as_ref()?.primary.as_ref()?;
        [&primary.large, &primary.medium, &primary.small]
            .into_iter()
            .flatten()
            .find_map(|variant| non_blank(variant.url.as_ref()))
    }

    pub fn features(&self, limit: usize) -> Vec<String> {
        self.item_info
            .as_ref()
            .and_then(|info| info.features.as_ref())
            .and_then(|features| features.display_values.as_ref())
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .take(limit)
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn brand(&self) -> Option<&str> {
        let brand = self.item_info.as_ref()?.by_line_info.as_ref()?.brand.as_ref()?;
        non_blank(brand.display_value.as_ref())
    }

    /// First listing, decoded on its own
    pub fn first_listing(&self) -> Option<Listing> {
        let raw = self.offers.as_ref()?.listings.as_ref()?.first()?;
        serde_json::from_value(raw.clone()).ok()
    }
}

/// Sort orders understood by the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortBy {
    #[default]
    Relevance,
    #[serde(rename = "Price:LowToHigh")]
    PriceLowToHigh,
    #[serde(rename = "Price:HighToLow")]
    PriceHighToLow,
    AvgCustomerReviews,
    NewestArrivals,
    Featured,
}

impl SortBy {
    pub const fn as_catalog_value(self) -> &'static str {
        match self {
            Self::Relevance => "Relevance",
            Self::PriceLowToHigh => "Price:LowToHigh",
            Self::PriceHighToLow => "Price:HighToLow",
            Self::AvgCustomerReviews => "AvgCustomerReviews",
            Self::NewestArrivals => "NewestArrivals",
            Self::Featured => "Featured",
        }
    }
}

/// Search request as sent by the storefront
///
/// Prices are in minor currency units (paise).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub keywords: String,
    pub category: Option<String>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub min_rating: Option<u8>,
    pub brand: Option<String>,
    pub prime_only: bool,
    pub sort_by: Option<SortBy>,
    pub page: Option<u32>,
    pub items_per_page: Option<u32>,
}

/// Upper bound the catalog accepts for one page
pub const MAX_ITEMS_PER_PAGE: u32 = 10;

/// Canonical cache key covering every search and filter dimension
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchKey {
    pub keywords: String,
    pub category: Option<String>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub min_rating: Option<u8>,
    pub brand: Option<String>,
    pub prime_only: bool,
    pub sort_by: SortBy,
    pub page: u32,
    pub items_per_page: u32,
}

fn canonical_text(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn canonical_opt(value: Option<&String>) -> Option<String> {
    value.map(|s| canonical_text(s)).filter(|s| !s.is_empty())
}

impl SearchQuery {
    pub fn new(keywords: &str) -> Self {
        Self {
            keywords: keywords.to_string(),
            ..Self::default()
        }
    }

    /// Canonicalize into the cache key
    ///
    /// Whitespace is collapsed, blank strings and the pseudo-category `All`
    /// become absent, the rating is limited to 1..=5 and paging is clamped.
    pub fn canonical(&self) -> SearchKey {
        SearchKey {
            keywords: canonical_text(&self.keywords),
            category: canonical_opt(self.category.as_ref()).filter(|c| !c.eq_ignore_ascii_case("all")),
            min_price: self.min_price,
            max_price: self.max_price,
            min_rating: self.min_rating.filter(|r| *r > 0).map(|r| r.min(5)),
            brand: canonical_opt(self.brand.as_ref()),
            prime_only: self.prime_only,
            sort_by: self.sort_by.unwrap_or_default(),
            page: self.page.unwrap_or(1).max(1),
            items_per_page: self
                .items_per_page
                .unwrap_or(MAX_ITEMS_PER_PAGE)
                .clamp(1, MAX_ITEMS_PER_PAGE),
        }
    }
}

/// Fixed mapping between storefront category names and catalog search indexes
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    entries: Vec<(String, String)>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::new(&[
            ("Home & Kitchen", "HomeAndKitchen"),
            ("Fashion", "Fashion"),
            ("Electronics", "Electronics"),
            ("Sports", "SportingGoods"),
            ("Beauty & Daily Needs", "Beauty"),
            ("Grooming & Wellness", "HealthPersonalCare"),
        ])
    }
}

impl CategoryRegistry {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(name, index)| ((*name).to_string(), (*index).to_string()))
                .collect(),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.search_index(name).is_some()
    }

    /// Search index for a storefront category name
    pub fn search_index(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(display, _)| display == name)
            .map(|(_, index)| index.as_str())
    }

    /// Search index for a free-form search category
    ///
    /// Accepts either a display name or a raw index; anything else searches everywhere.
    pub fn search_index_for(&self, category: Option<&str>) -> String {
        let Some(category) = category else {
            return "All".to_string();
        };
        self.search_index(category)
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|(_, index)| index == category)
                    .map(|(_, index)| index.as_str())
            })
            .unwrap_or("All")
            .to_string()
    }
}
