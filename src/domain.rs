//! Domain layer
//!
//! Canonical product types, the catalog input schema, the error taxonomy and
//! the collaborator traits the rest of the crate is written against.

pub mod catalog;
pub mod errors;
pub mod product;
pub mod services;

pub use catalog::{CategoryRegistry, RawCatalogItem, SearchKey, SearchQuery, SortBy};
pub use errors::{ServiceError, ServiceResult, TransportKind};
pub use product::{DEFAULT_CATEGORY, ExtractionResult, ProductRecord};
pub use services::{CatalogClient, CatalogSearch, Clock, ConversionClient, ConvertMode, PageFetcher, SystemClock};
