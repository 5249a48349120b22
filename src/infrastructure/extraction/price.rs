//! Price strategies
//!
//! Preview metadata never carries a price, so price always comes from page
//! structure: platform rules first, then the generic text-node scan.

use scraper::{Html, Node};
use tracing::debug;

use super::platform_table::{PlatformProfile, PlatformTable, Strategy};
use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};

const SKIPPED_TEXT_PARENTS: [&str; 3] = ["script", "style", "noscript"];

/// Platform rules in order, first currency-bearing candidate wins
pub fn platform_price(html: &Html, profile: &PlatformProfile, table: &PlatformTable) -> ParsingResult<String> {
    for strategy in &profile.price {
        if let Some(price) = apply_price_rule(html, strategy, table) {
            debug!("💰 {} price via '{}'", profile.name, strategy.source());
            return Ok(price);
        }
    }
    Err(ParsingError::NoCurrencyAmount {
        field: format!("{} price", profile.name),
        tried: profile.price.len(),
    })
}

fn apply_price_rule(html: &Html, strategy: &Strategy, table: &PlatformTable) -> Option<String> {
    match strategy {
        Strategy::Text { selector, prefix, .. } => html
            .select(selector)
            .map(|element| collapse_whitespace(&element.text().collect::<String>()))
            .find_map(|text| accept_price(text, prefix.as_deref(), table)),
        Strategy::Attribute { selector, attrs, .. } => html
            .select(selector)
            .flat_map(|element| attrs.iter().filter_map(move |attr| element.value().attr(attr)))
            .find_map(|value| accept_price(value.trim().to_string(), None, table)),
        Strategy::ScriptPattern { pattern, .. } => script_bodies(html).find_map(|body| {
            pattern.captures(&body).and_then(|captures| {
                captures
                    .get(1)
                    .or_else(|| captures.get(0))
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|price| !price.is_empty())
            })
        }),
    }
}

/// Prefix split-price markup, then require a currency symbol and a digit
fn accept_price(text: String, prefix: Option<&str>, table: &PlatformTable) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let candidate = match prefix {
        Some(prefix) if !table.has_currency_symbol(&text) => {
            let amount = strip_rupee_abbreviation(&text);
            if !amount.starts_with(|c: char| c.is_ascii_digit()) {
                return None;
            }
            format!("{}{}", prefix, amount.trim_end_matches('.'))
        }
        _ => text,
    };
    let valid = table.has_currency_symbol(&candidate) && candidate.chars().any(|c| c.is_ascii_digit());
    valid.then_some(candidate)
}

/// `Rs. 1,299` / `Rs1,299` -> `1,299`, anything else unchanged
fn strip_rupee_abbreviation(text: &str) -> &str {
    let text = text.trim_start();
    let rest = ["Rs.", "Rs", "RS.", "RS", "rs.", "rs"]
        .iter()
        .find_map(|abbreviation| text.strip_prefix(abbreviation));
    rest.map_or(text, str::trim_start)
}

/// Scan visible text nodes for a short price label
///
/// A node longer than `price_label_max_chars` is treated as promotional copy
/// even when it contains an amount.
pub fn generic_price(html: &Html, table: &PlatformTable) -> ParsingResult<String> {
    let mut scanned = 0;
    for node in html.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let inside_skipped = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|e| e.name()))
            .is_some_and(|name| SKIPPED_TEXT_PARENTS.contains(&name));
        if inside_skipped {
            continue;
        }

        let cleaned = text.trim();
        if cleaned.is_empty() {
            continue;
        }
        scanned += 1;
        if cleaned.chars().count() > table.price_label_max_chars {
            continue;
        }
        if let Some(found) = table.price_pattern.find(cleaned) {
            return Ok(found.as_str().to_string());
        }
    }
    Err(ParsingError::NoCurrencyAmount {
        field: "generic price".to_string(),
        tried: scanned,
    })
}

fn script_bodies(html: &Html) -> impl Iterator<Item = String> + '_ {
    html.root_element()
        .descendants()
        .filter_map(|node| node.value().as_element().map(|e| (node, e)))
        .filter(|(_, element)| element.name() == "script")
        .map(|(node, _)| {
            node.children()
                .filter_map(|child| match child.value() {
                    Node::Text(text) => Some(text.to_string()),
                    _ => None,
                })
                .collect::<String>()
        })
        .filter(|body| !body.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
