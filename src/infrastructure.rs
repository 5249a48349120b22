//! Infrastructure layer: caching, page fetching, extraction and external integrations

pub mod cache_store;
pub mod config; // Layered configuration
pub mod extraction;
pub mod http_client;
pub mod logging;
pub mod parsing_error;
pub mod partner_client;

pub use cache_store::{CacheStatus, CacheStore, Cached, ManualClock};
pub use config::{AppConfig, ConfigManager};
pub use extraction::{ExtractionPipeline, PlatformTable};
pub use http_client::{HttpClient, HttpClientConfig};
pub use logging::{get_log_directory, init_logging, init_logging_with_config};
pub use parsing_error::{ParsingError, ParsingResult};
pub use partner_client::HttpConversionClient;
