//! Application layer
//!
//! Services that combine the cache, the catalog and the extraction pipeline
//! into the operations the HTTP layer exposes, plus their DTOs.

pub mod affiliate_converter;
pub mod deals_service;
pub mod dto;
pub mod item_normalizer;

pub use affiliate_converter::AffiliateConverter;
pub use deals_service::{DealsService, DealsSettings};
pub use dto::{AllDeals, CategoryDeals, ConvertedProduct, RefreshSummary, SearchResults};
pub use item_normalizer::{ItemNormalizer, NormalizedBatch, ResultFilter};
