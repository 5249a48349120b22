use serde::{Deserialize, Serialize};

/// Category reported when nothing more specific could be resolved
pub const DEFAULT_CATEGORY: &str = "General";

/// Canonical product/deal record built from one catalog item
///
/// Records are rebuilt for every request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: Option<String>,
    pub title: String,
    pub price: String,
    #[serde(rename = "originalPrice")]
    pub original_price: Option<String>,
    #[serde(rename = "discountPercent")]
    pub discount_percent: u8,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub description: String,
    pub features: Vec<String>,
    pub brand: Option<String>,
    #[serde(rename = "detailUrl")]
    pub detail_url: String,
    pub category: String,
    #[serde(rename = "isPrime")]
    pub is_prime: bool,
}

impl ProductRecord {
    /// A record is a deal when it carries a positive discount
    pub const fn is_deal(&self) -> bool {
        self.discount_percent > 0
    }
}

/// Fields pulled out of an arbitrary retail product page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub title: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub price: String,
    pub description: String,
    pub category: String,
}

impl Default for ExtractionResult {
    fn default() -> Self {
        Self {
            title: String::new(),
            image_url: String::new(),
            price: String::new(),
            description: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

impl ExtractionResult {
    /// Neither title nor image: the page was bot-defended or rendered client-side
    pub fn is_blank(&self) -> bool {
        self.title.is_empty() && self.image_url.is_empty()
    }

    pub fn has_default_category(&self) -> bool {
        self.category.is_empty() || self.category == DEFAULT_CATEGORY
    }
}

/// Discount in whole percent, rounded, clamped to 0..=100
///
/// Returns 0 when either amount is missing, the original is not positive,
/// or the arithmetic produces something that is not a finite number.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn discount_percent(current: Option<f64>, original: Option<f64>) -> u8 {
    let (Some(current), Some(original)) = (current, original) else {
        return 0;
    };
    if !current.is_finite() || !original.is_finite() || original <= 0.0 {
        return 0;
    }

    let percent = ((original - current) / original * 100.0).round();
    if !percent.is_finite() || percent <= 0.0 {
        return 0;
    }

    percent.min(100.0) as u8
}

/// Parse a display amount such as `₹1,299.00` or `$ 24.99` into a number
pub fn parse_display_amount(display: &str) -> Option<f64> {
    let digits: String = display
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .filter(|c| *c != ',')
        .collect();

    let digits = digits.trim_end_matches('.');
    if digits.is_empty() {
        return None;
    }
    digits.parse::<f64>().ok()
}
