//! Product detail extraction from retailer pages

pub mod category;
pub mod metadata;
pub mod pipeline;
pub mod platform_table;
pub mod price;

pub use pipeline::ExtractionPipeline;
pub use platform_table::{PlatformProfile, PlatformTable};
