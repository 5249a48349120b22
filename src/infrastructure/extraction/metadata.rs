//! Link-preview metadata (Open Graph and plain meta tags)

use scraper::{Html, Selector};

use super::platform_table::parse_selector;
use crate::infrastructure::parsing_error::ParsingResult;

/// Values read from preview tags, empty when absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewMetadata {
    pub title: String,
    pub image: String,
    pub description: String,
}

/// Compiled selectors for the preview tags, in precedence order per field
#[derive(Debug, Clone)]
pub struct MetadataSelectors {
    title: Vec<Selector>,
    image: Vec<Selector>,
    description: Vec<Selector>,
}

impl MetadataSelectors {
    pub fn new() -> ParsingResult<Self> {
        Ok(Self {
            title: vec![
                parse_selector(r#"meta[property="og:title"]"#)?,
                parse_selector(r#"meta[name="og:title"]"#)?,
                parse_selector(r#"meta[name="title"]"#)?,
            ],
            image: vec![
                parse_selector(r#"meta[property="og:image"]"#)?,
                parse_selector(r#"meta[name="og:image"]"#)?,
            ],
            description: vec![
                parse_selector(r#"meta[property="og:description"]"#)?,
                parse_selector(r#"meta[name="og:description"]"#)?,
                parse_selector(r#"meta[name="description"]"#)?,
            ],
        })
    }

    pub fn extract(&self, html: &Html, description_max_chars: usize) -> PreviewMetadata {
        PreviewMetadata {
            title: first_content(html, &self.title),
            image: first_content(html, &self.image),
            description: truncate_chars(&first_content(html, &self.description), description_max_chars),
        }
    }
}

fn first_content(html: &Html, selectors: &[Selector]) -> String {
    selectors
        .iter()
        .flat_map(|selector| html.select(selector))
        .filter_map(|element| element.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Cut to at most `max` characters without splitting a code point
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}
