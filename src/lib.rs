//! AffiliStore Core - product extraction, catalog normalization and deal caching
//!
//! This crate provides the resilient part of the AffiliStore deals backend:
//! a TTL cache for licensed catalog data, a normalizer for partially populated
//! catalog items, a multi-strategy product page extractor and the affiliate
//! link converter built on top of it. HTTP routing lives outside this crate.

// Module declarations
pub mod domain;
pub mod application;
pub mod infrastructure;

// Re-export the types an embedding server needs most often
pub use application::{AffiliateConverter, DealsService, ItemNormalizer};
pub use domain::errors::{ServiceError, ServiceResult, TransportKind};
pub use domain::product::{ExtractionResult, ProductRecord};
pub use infrastructure::cache_store::{CacheStore, Cached};
pub use infrastructure::extraction::ExtractionPipeline;
