//! Catalog item normalization
//!
//! Turns untrusted catalog hits into [`ProductRecord`]s. Missing or malformed
//! fields fall back to defaults; only an item that is not an object at all is
//! dropped.

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::catalog::{Money, RawCatalogItem};
use crate::domain::product::{ProductRecord, discount_percent, parse_display_amount};
use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};

/// Title used when the catalog sends none
pub const MISSING_TITLE: &str = "No title";

/// Features kept per record
pub const FEATURE_LIMIT: usize = 3;

/// Which records survive a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultFilter {
    /// Category listings: discounted items only
    DealsOnly,
    /// Search results: everything
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedBatch {
    pub records: Vec<ProductRecord>,
    /// Items dropped because they could not be decoded at all
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct ItemNormalizer {
    feature_limit: usize,
}

impl Default for ItemNormalizer {
    fn default() -> Self {
        Self {
            feature_limit: FEATURE_LIMIT,
        }
    }
}

impl ItemNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feature_limit(feature_limit: usize) -> Self {
        Self { feature_limit }
    }

    /// Normalize one raw item into a record tagged with `category`
    pub fn normalize(&self, raw: &Value, category: &str) -> ParsingResult<ProductRecord> {
        if !raw.is_object() {
            return Err(ParsingError::item_unparseable(format!(
                "expected an object, got {}",
                json_type(raw)
            )));
        }
        let item: RawCatalogItem = serde_json::from_value(raw.clone()).map_err(ParsingError::item_unparseable)?;

        let listing = item.first_listing().unwrap_or_default();
        let price = display_amount(listing.price.as_ref());
        let original_price = Some(display_amount(listing.saving_basis.as_ref())).filter(|s| !s.is_empty());
        let discount = discount_percent(
            numeric_amount(listing.price.as_ref()),
            numeric_amount(listing.saving_basis.as_ref()),
        );

        let features = item.features(self.feature_limit);

        Ok(ProductRecord {
            id: item.asin.clone().filter(|id| !id.trim().is_empty()),
            title: item.title().unwrap_or(MISSING_TITLE).to_string(),
            price,
            original_price,
            discount_percent: discount,
            image_url: item.image_url().unwrap_or_default().to_string(),
            description: features.join(", "),
            features,
            brand: item.brand().map(str::to_string),
            detail_url: item.detail_page_url.clone().unwrap_or_default(),
            category: category.to_string(),
            is_prime: listing
                .delivery_info
                .and_then(|info| info.is_prime_eligible)
                .unwrap_or(false),
        })
    }

    /// Normalize a batch, logging and counting items that cannot be decoded
    pub fn normalize_all(&self, items: &[Value], category: &str, filter: ResultFilter) -> NormalizedBatch {
        let mut batch = NormalizedBatch::default();
        for (index, raw) in items.iter().enumerate() {
            match self.normalize(raw, category) {
                Ok(record) if filter == ResultFilter::DealsOnly && !record.is_deal() => {
                    debug!("Skipping non-deal item {:?} in {}", record.id, category);
                }
                Ok(record) => batch.records.push(record),
                Err(e) => {
                    warn!("Error processing item {} in {}: {}", index, category, e);
                    batch.skipped += 1;
                }
            }
        }
        debug!(
            "Normalized {} of {} items for {} ({} skipped)",
            batch.records.len(),
            items.len(),
            category,
            batch.skipped
        );
        batch
    }
}

fn display_amount(money: Option<&Money>) -> String {
    money
        .and_then(|m| m.display_amount.as_deref())
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

/// Numeric amount, else parsed from the display string
fn numeric_amount(money: Option<&Money>) -> Option<f64> {
    let money = money?;
    money
        .numeric_amount()
        .or_else(|| money.display_amount.as_deref().and_then(parse_display_amount))
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_item() -> Value {
        json!({
            "ASIN": "B0TEST1234",
            "DetailPageURL": "https://www.amazon.in/dp/B0TEST1234?tag=affili-21",
            "ItemInfo": {
                "Title": { "DisplayValue": "Steel Water Bottle 1L" },
                "Features": { "DisplayValues": ["Leak proof", "BPA free", "Keeps cold 24h", "Dishwasher safe"] },
                "ByLineInfo": { "Brand": { "DisplayValue": "Milton" } }
            },
            "Images": { "Primary": { "Large": { "URL": "https://m.media-amazon.com/images/L.jpg" } } },
            "Offers": { "Listings": [{
                "Price": { "Amount": 649.0, "DisplayAmount": "₹649.00" },
                "SavingBasis": { "Amount": 999.0, "DisplayAmount": "₹999.00" },
                "DeliveryInfo": { "IsPrimeEligible": true }
            }]}
        })
    }

    #[test]
    fn test_full_item() {
        let record = ItemNormalizer::new().normalize(&full_item(), "Home & Kitchen").unwrap();
        assert_eq!(record.id.as_deref(), Some("B0TEST1234"));
        assert_eq!(record.title, "Steel Water Bottle 1L");
        assert_eq!(record.price, "₹649.00");
        assert_eq!(record.original_price.as_deref(), Some("₹999.00"));
        assert_eq!(record.discount_percent, 35);
        assert_eq!(record.features.len(), 3);
        assert_eq!(record.description, "Leak proof, BPA free, Keeps cold 24h");
        assert_eq!(record.brand.as_deref(), Some("Milton"));
        assert_eq!(record.category, "Home & Kitchen");
        assert!(record.is_prime);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let record = ItemNormalizer::new()
            .normalize(&json!({ "ASIN": "B0EMPTY", "ItemInfo": "garbage", "Offers": { "Listings": [] } }), "Fashion")
            .unwrap();
        assert_eq!(record.title, MISSING_TITLE);
        assert_eq!(record.price, "");
        assert_eq!(record.original_price, None);
        assert_eq!(record.discount_percent, 0);
        assert_eq!(record.image_url, "");
        assert!(!record.is_prime);
    }

    #[test]
    fn test_medium_image_fallback_and_display_amounts() {
        let raw = json!({
            "Images": { "Primary": { "Medium": { "URL": "https://img.test/m.jpg" } } },
            "Offers": { "Listings": [{
                "Price": { "DisplayAmount": "₹1,500" },
                "SavingBasis": { "Amount": "not a number", "DisplayAmount": "₹2,000" }
            }]}
        });
        let record = ItemNormalizer::new().normalize(&raw, "Sports").unwrap();
        assert_eq!(record.image_url, "https://img.test/m.jpg");
        assert_eq!(record.discount_percent, 25);
    }

    #[test]
    fn test_non_object_is_skipped() {
        let normalizer = ItemNormalizer::new();
        assert!(matches!(
            normalizer.normalize(&json!("B0TEST"), "Fashion"),
            Err(ParsingError::ItemUnparseable { .. })
        ));

        let items = vec![full_item(), json!(42), json!({ "ASIN": "B0NODEAL" })];
        let deals = normalizer.normalize_all(&items, "Fashion", ResultFilter::DealsOnly);
        assert_eq!(deals.records.len(), 1);
        assert_eq!(deals.skipped, 1);

        let all = normalizer.normalize_all(&items, "Fashion", ResultFilter::All);
        assert_eq!(all.records.len(), 2);
        assert_eq!(all.skipped, 1);
    }
}
