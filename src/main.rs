//! Extraction probe
//!
//! Runs the product extraction pipeline against one URL and prints the result
//! as JSON. With `--convert` the affiliate link is requested too.
//!
//! ```text
//! affilistore-probe <product-url> [--convert] [--config <path>]
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::info;

use affilistore_core::application::AffiliateConverter;
use affilistore_core::infrastructure::config::{AppConfig, ConfigManager};
use affilistore_core::infrastructure::logging::{init_logging_with_config, log_system_info};
use affilistore_core::infrastructure::{
    ExtractionPipeline, HttpClient, HttpClientConfig, HttpConversionClient, PlatformTable,
};

struct ProbeArgs {
    url: String,
    convert: bool,
    config_path: Option<PathBuf>,
}

fn parse_args() -> Result<ProbeArgs> {
    let mut url = None;
    let mut convert = false;
    let mut config_path = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--convert" => convert = true,
            "--config" => {
                config_path = Some(PathBuf::from(args.next().context("--config needs a path")?));
            }
            other if other.starts_with("--") => bail!("Unknown option: {other}"),
            other => url = Some(other.to_string()),
        }
    }

    Ok(ProbeArgs {
        url: url.context("usage: affilistore-probe <product-url> [--convert] [--config <path>]")?,
        convert,
        config_path,
    })
}

fn load_config(path: Option<PathBuf>) -> Result<AppConfig> {
    let manager = match path {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    manager.load_config()
}

fn build_pipeline(config: &AppConfig) -> Result<ExtractionPipeline> {
    let fetcher = Arc::new(HttpClient::with_config(HttpClientConfig::from_http_config(&config.http))?);
    let table = match &config.extraction.platform_table_path {
        Some(path) => PlatformTable::from_path(path)?,
        None => PlatformTable::builtin()?,
    };
    Ok(ExtractionPipeline::with_table(fetcher, Arc::new(table))?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args()?;
    let config = load_config(args.config_path)?;
    init_logging_with_config(&config.logging)?;
    log_system_info();

    let pipeline = Arc::new(build_pipeline(&config)?);
    info!("Platform for {}: {}", args.url, pipeline.platform_name(&args.url));

    let output = if args.convert {
        let partner = Arc::new(HttpConversionClient::new(config.partner.clone())?);
        let converter = AffiliateConverter::new(partner, pipeline);
        serde_json::to_string_pretty(&converter.convert_with_details(&args.url).await?)?
    } else {
        serde_json::to_string_pretty(&pipeline.extract(&args.url).await)?
    };

    println!("{output}");
    Ok(())
}
