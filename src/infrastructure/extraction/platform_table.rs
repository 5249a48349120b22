//! Declarative per-platform selector table
//!
//! The table is plain data (`platforms.json`, versioned) so that adding a
//! storefront or a newer markup pattern is a data edit. Within each field the
//! rules are ordered most-recent markup first. Selectors and patterns are
//! compiled once at load; an invalid entry is logged and skipped instead of
//! failing the whole table.

use std::path::Path;

use regex::Regex;
use scraper::Selector;
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};

const BUILTIN_TABLE: &str = include_str!("platforms.json");

/// One rule as written in the table file
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum RuleSpec {
    /// Text content of the matched element(s), optionally prefixed
    Text {
        selector: String,
        #[serde(default)]
        prefix: Option<String>,
    },
    /// First non-empty attribute among `attrs`
    Attribute { selector: String, attrs: Vec<String> },
    /// Regex over inline `<script>` bodies, first capture group wins
    ScriptPattern { pattern: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformSpec {
    pub name: String,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub fixed_category: Option<String>,
    #[serde(default)]
    pub title: Vec<RuleSpec>,
    #[serde(default)]
    pub image: Vec<RuleSpec>,
    #[serde(default)]
    pub price: Vec<RuleSpec>,
    #[serde(default)]
    pub description: Vec<RuleSpec>,
    #[serde(default)]
    pub category: Vec<RuleSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableSpec {
    pub version: u32,
    pub currency_symbols: Vec<String>,
    #[serde(default = "default_price_label_max_chars")]
    pub price_label_max_chars: usize,
    #[serde(default = "default_description_max_chars")]
    pub description_max_chars: usize,
    #[serde(default)]
    pub category_keywords: Vec<(String, String)>,
    #[serde(default)]
    pub platforms: Vec<PlatformSpec>,
    pub generic: PlatformSpec,
}

const fn default_price_label_max_chars() -> usize {
    25
}

const fn default_description_max_chars() -> usize {
    200
}

/// Compiled rule
#[derive(Debug, Clone)]
pub enum Strategy {
    Text {
        source: String,
        selector: Selector,
        prefix: Option<String>,
    },
    Attribute {
        source: String,
        selector: Selector,
        attrs: Vec<String>,
    },
    ScriptPattern { source: String, pattern: Regex },
}

impl Strategy {
    fn compile(spec: &RuleSpec) -> ParsingResult<Self> {
        match spec {
            RuleSpec::Text { selector, prefix } => Ok(Self::Text {
                source: selector.clone(),
                selector: parse_selector(selector)?,
                prefix: prefix.clone(),
            }),
            RuleSpec::Attribute { selector, attrs } => Ok(Self::Attribute {
                source: selector.clone(),
                selector: parse_selector(selector)?,
                attrs: attrs.clone(),
            }),
            RuleSpec::ScriptPattern { pattern } => Ok(Self::ScriptPattern {
                source: pattern.clone(),
                pattern: Regex::new(pattern).map_err(|e| ParsingError::invalid_pattern(pattern, e))?,
            }),
        }
    }

    /// Original selector or pattern text, for logs
    pub fn source(&self) -> &str {
        match self {
            Self::Text { source, .. } | Self::Attribute { source, .. } | Self::ScriptPattern { source, .. } => {
                source
            }
        }
    }
}

pub(crate) fn parse_selector(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector).map_err(|e| ParsingError::invalid_selector(selector, e))
}

fn compile_rules(platform: &str, field: &str, specs: &[RuleSpec]) -> Vec<Strategy> {
    specs
        .iter()
        .filter_map(|spec| match Strategy::compile(spec) {
            Ok(strategy) => Some(strategy),
            Err(e) => {
                warn!("Skipping {} rule for {}: {}", field, platform, e);
                None
            }
        })
        .collect()
}

/// A storefront and its ordered rules per field
#[derive(Debug, Clone)]
pub struct PlatformProfile {
    pub name: String,
    pub domains: Vec<String>,
    pub fixed_category: Option<String>,
    pub title: Vec<Strategy>,
    pub image: Vec<Strategy>,
    pub price: Vec<Strategy>,
    pub description: Vec<Strategy>,
    pub category: Vec<Strategy>,
}

impl PlatformProfile {
    fn compile(spec: &PlatformSpec) -> Self {
        Self {
            name: spec.name.clone(),
            domains: spec.domains.iter().map(|d| d.trim().to_ascii_lowercase()).collect(),
            fixed_category: spec.fixed_category.clone(),
            title: compile_rules(&spec.name, "title", &spec.title),
            image: compile_rules(&spec.name, "image", &spec.image),
            price: compile_rules(&spec.name, "price", &spec.price),
            description: compile_rules(&spec.name, "description", &spec.description),
            category: compile_rules(&spec.name, "category", &spec.category),
        }
    }

    /// Host equals a registered domain or is a subdomain of one
    pub fn matches_host(&self, host: &str) -> bool {
        self.domains.iter().any(|domain| {
            host == domain
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|rest| rest.ends_with('.'))
        })
    }
}

/// Compiled platform registry
#[derive(Debug, Clone)]
pub struct PlatformTable {
    pub version: u32,
    pub currency_symbols: Vec<String>,
    pub price_label_max_chars: usize,
    pub description_max_chars: usize,
    pub category_keywords: Vec<(String, String)>,
    pub platforms: Vec<PlatformProfile>,
    pub generic: PlatformProfile,
    /// Currency symbol followed by digits, built from `currency_symbols`
    pub price_pattern: Regex,
}

impl PlatformTable {
    /// Table shipped with the crate
    pub fn builtin() -> ParsingResult<Self> {
        Self::from_json(BUILTIN_TABLE)
    }

    pub fn from_json(content: &str) -> ParsingResult<Self> {
        let spec: TableSpec = serde_json::from_str(content).map_err(ParsingError::table_load_failed)?;
        Self::compile(&spec)
    }

    pub fn from_path(path: &Path) -> ParsingResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ParsingError::table_load_failed(format!("{}: {}", path.display(), e)))?;
        let table = Self::from_json(&content)?;
        info!("Loaded platform table v{} from {}", table.version, path.display());
        Ok(table)
    }

    pub fn compile(spec: &TableSpec) -> ParsingResult<Self> {
        if spec.currency_symbols.is_empty() {
            return Err(ParsingError::table_load_failed("currency_symbols must not be empty"));
        }

        let symbols = spec
            .currency_symbols
            .iter()
            .map(|s| regex::escape(s))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r"(?:{symbols})\s?\d[\d,]*(?:\.\d+)?");
        let price_pattern = Regex::new(&pattern).map_err(|e| ParsingError::invalid_pattern(&pattern, e))?;

        Ok(Self {
            version: spec.version,
            currency_symbols: spec.currency_symbols.clone(),
            price_label_max_chars: spec.price_label_max_chars,
            description_max_chars: spec.description_max_chars,
            category_keywords: spec
                .category_keywords
                .iter()
                .map(|(keyword, category)| (keyword.to_lowercase(), category.clone()))
                .collect(),
            platforms: spec.platforms.iter().map(PlatformProfile::compile).collect(),
            generic: PlatformProfile::compile(&spec.generic),
            price_pattern,
        })
    }

    /// Platform for a product URL; unknown or unparseable hosts get the generic profile
    pub fn detect(&self, url: &str) -> &PlatformProfile {
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase));

        host.and_then(|host| self.platforms.iter().find(|p| p.matches_host(&host)))
            .unwrap_or(&self.generic)
    }

    pub fn has_currency_symbol(&self, text: &str) -> bool {
        self.currency_symbols.iter().any(|symbol| text.contains(symbol.as_str()))
    }

    /// First keyword contained in `haystack`, in table order
    pub fn category_for_keywords(&self, haystack: &str) -> Option<&str> {
        let haystack = haystack.to_lowercase();
        self.category_keywords
            .iter()
            .find(|(keyword, _)| haystack.contains(keyword.as_str()))
            .map(|(_, category)| category.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_compiles_every_rule() {
        let table = PlatformTable::builtin().unwrap();
        assert!(table.version >= 1);
        assert!(table.platforms.len() >= 9);
        let flipkart = table.platforms.iter().find(|p| p.name == "Flipkart").unwrap();
        assert_eq!(flipkart.price.len(), 4);
        assert_eq!(table.generic.price.len(), 1);
    }

    #[test]
    fn test_detect_by_host() {
        let table = PlatformTable::builtin().unwrap();
        assert_eq!(table.detect("https://www.flipkart.com/p/itm123").name, "Flipkart");
        assert_eq!(table.detect("https://dl.flipkart.com/s/abc").name, "Flipkart");
        assert_eq!(table.detect("https://www.nykaa.com/lipstick/p/1").name, "Nykaa");
        assert_eq!(table.detect("https://www.nykaafashion.com/dress/p/2").name, "Nykaa Fashion");
        assert_eq!(table.detect("https://notflipkart.com/p").name, "Generic");
        assert_eq!(table.detect("not a url").name, "Generic");
    }

    #[test]
    fn test_invalid_rules_are_skipped() {
        let json = r#"{
            "version": 1,
            "currency_symbols": ["₹"],
            "platforms": [{ "name": "Shop", "domains": ["shop.test"],
                "price": [ {"strategy": "text", "selector": "div[[["},
                           {"strategy": "text", "selector": "span.price"} ] }],
            "generic": { "name": "Generic" }
        }"#;
        let table = PlatformTable::from_json(json).unwrap();
        assert_eq!(table.platforms[0].price.len(), 1);
        assert_eq!(table.platforms[0].price[0].source(), "span.price");
    }

    #[test]
    fn test_missing_currency_symbols_rejected() {
        let json = r#"{ "version": 1, "currency_symbols": [], "generic": { "name": "Generic" } }"#;
        assert!(matches!(
            PlatformTable::from_json(json),
            Err(ParsingError::TableLoadFailed { .. })
        ));
    }

    #[test]
    fn test_keyword_order_wins() {
        let table = PlatformTable::builtin().unwrap();
        assert_eq!(table.category_for_keywords("https://shop.test/mobile-phones"), Some("Electronics"));
        assert_eq!(table.category_for_keywords("https://shop.test/Kitchen/pan"), Some("Home & Kitchen"));
        assert_eq!(table.category_for_keywords("https://shop.test/x"), None);
    }
}
