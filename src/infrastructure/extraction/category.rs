//! Category resolution
//!
//! Priority: fixed platform override, breadcrumb text mapped through the
//! keyword table, keyword table against the URL, then the default.

use scraper::Html;

use super::platform_table::{PlatformProfile, PlatformTable, Strategy};
use crate::domain::product::DEFAULT_CATEGORY;

pub fn resolve_category(url: &str, html: Option<&Html>, profile: &PlatformProfile, table: &PlatformTable) -> String {
    if let Some(fixed) = profile.fixed_category.as_deref() {
        return fixed.to_string();
    }

    if let Some(category) = html.and_then(|html| breadcrumb_category(html, profile, table)) {
        return category;
    }

    table
        .category_for_keywords(url)
        .unwrap_or(DEFAULT_CATEGORY)
        .to_string()
}

/// Root crumb every storefront trail starts with, never a category
const ROOT_CRUMB: &str = "home";

/// Crumbs are matched one at a time from the leaf up, skipping the root
fn breadcrumb_category(html: &Html, profile: &PlatformProfile, table: &PlatformTable) -> Option<String> {
    let crumbs = profile.category.iter().find_map(|strategy| match strategy {
        Strategy::Text { selector, .. } => {
            let crumbs: Vec<String> = html
                .select(selector)
                .map(|element| element.text().collect::<String>().trim().to_string())
                .filter(|text| !text.is_empty() && !text.eq_ignore_ascii_case(ROOT_CRUMB))
                .collect();
            (!crumbs.is_empty()).then_some(crumbs)
        }
        _ => None,
    })?;

    crumbs
        .iter()
        .rev()
        .find_map(|crumb| table.category_for_keywords(crumb))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_override_ignores_url_keywords() {
        let table = PlatformTable::builtin().unwrap();
        let url = "https://www.nykaafashion.com/home-decor/p/9";
        let profile = table.detect(url);
        assert_eq!(resolve_category(url, None, profile, &table), "Fashion");
    }

    #[test]
    fn test_breadcrumb_before_url() {
        let table = PlatformTable::builtin().unwrap();
        let url = "https://www.flipkart.com/item-home/p/itm1";
        let html = Html::parse_document(
            r#"<div class="_7eSDEz"><a>Home</a><a>Mobiles & Accessories</a><a>Mobile</a></div>"#,
        );
        let profile = table.detect(url);
        assert_eq!(resolve_category(url, Some(&html), profile, &table), "Electronics");
    }

    #[test]
    fn test_root_crumb_is_not_a_category() {
        let table = PlatformTable::builtin().unwrap();
        let url = "https://www.flipkart.com/the-alchemist/p/itm1";
        let profile = table.detect(url);

        let books = Html::parse_document(r#"<div class="_7eSDEz"><a>Home</a><a>Books</a><a>Fiction</a></div>"#);
        assert_eq!(resolve_category(url, Some(&books), profile, &table), "Books");

        let makeup = Html::parse_document(
            r#"<div class="_7eSDEz"><a>Home</a><a>Beauty and Grooming</a><a>Makeup</a></div>"#,
        );
        assert_eq!(resolve_category(url, Some(&makeup), profile, &table), "Beauty & Daily Needs");

        let root_only = Html::parse_document(r#"<div class="_7eSDEz"><a>Home</a></div>"#);
        assert_eq!(resolve_category(url, Some(&root_only), profile, &table), DEFAULT_CATEGORY);
    }

    #[test]
    fn test_unmatched_breadcrumb_falls_through_to_url() {
        let table = PlatformTable::builtin().unwrap();
        let url = "https://www.amazon.in/running-shoes/dp/B01";
        let html = Html::parse_document(
            r#"<div id="wayfinding-breadcrumbs_feature_div"><ul><li><a>Misc</a></li></ul></div>"#,
        );
        let profile = table.detect(url);
        assert_eq!(resolve_category(url, Some(&html), profile, &table), "Fashion");
    }

    #[test]
    fn test_default_category() {
        let table = PlatformTable::builtin().unwrap();
        let url = "https://shop.example.org/p/42";
        assert_eq!(resolve_category(url, None, table.detect(url), &table), DEFAULT_CATEGORY);
    }
}
