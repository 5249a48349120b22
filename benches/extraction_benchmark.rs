//! Extraction and normalization throughput
//!
//! Pages are parsed from memory; nothing here touches the network.

use std::hint::black_box;
use std::sync::Arc;

use async_trait::async_trait;
use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};

use affilistore_core::application::ResultFilter;
use affilistore_core::domain::services::PageFetcher;
use affilistore_core::{ExtractionPipeline, ItemNormalizer, ServiceError, ServiceResult, TransportKind};

struct Offline;

#[async_trait]
impl PageFetcher for Offline {
    async fn fetch_page(&self, url: &str) -> ServiceResult<String> {
        Err(ServiceError::transport(TransportKind::Connect, url, "offline"))
    }
}

fn product_page(padding: usize) -> String {
    let filler = "<div class=\"row\"><p>Customers also viewed these items recently</p><span>4.2 ★</span></div>".repeat(padding);
    format!(
        r#"<html><head>
            <meta property="og:title" content="Apple iPhone 15 (Black, 128 GB)">
            <meta property="og:image" content="/images/iphone.jpeg">
            <meta property="og:description" content="Dynamic Island, 48MP camera, USB-C">
        </head><body>
            <div class="_7eSDEz"><a>Home</a><a>Mobiles &amp; Accessories</a></div>
            {filler}
            <div class="Nx9bqj CxhGGd">₹69,999</div>
        </body></html>"#
    )
}

fn catalog_batch(size: usize) -> Vec<Value> {
    (0..size)
        .map(|i| {
            json!({
                "ASIN": format!("B0BENCH{i:04}"),
                "DetailPageURL": format!("https://www.amazon.in/dp/B0BENCH{i:04}"),
                "ItemInfo": {
                    "Title": { "DisplayValue": format!("Bench item {i}") },
                    "Features": { "DisplayValues": ["One", "Two", "Three", "Four"] }
                },
                "Offers": { "Listings": [{
                    "Price": { "Amount": 499.0 + i as f64, "DisplayAmount": format!("₹{}", 499 + i) },
                    "SavingBasis": { "Amount": 999.0, "DisplayAmount": "₹999" }
                }]}
            })
        })
        .collect()
}

fn extraction(c: &mut Criterion) {
    let pipeline = ExtractionPipeline::new(Arc::new(Offline)).expect("built-in table compiles");
    let url = "https://www.flipkart.com/apple-iphone-15/p/itm6ac6485515ae4";

    let mut group = c.benchmark_group("extract_from_html");
    for padding in [10, 200] {
        let page = product_page(padding);
        group.bench_function(format!("flipkart_{padding}_rows"), |b| {
            b.iter(|| pipeline.extract_from_html(black_box(url), black_box(&page)));
        });
    }
    let generic = product_page(50);
    group.bench_function("generic_text_scan", |b| {
        b.iter(|| pipeline.extract_from_html(black_box("https://shop.example/p/1"), black_box(&generic)));
    });
    group.finish();
}

fn normalization(c: &mut Criterion) {
    let normalizer = ItemNormalizer::new();
    let batch = catalog_batch(20);
    c.bench_function("normalize_20_deals", |b| {
        b.iter(|| normalizer.normalize_all(black_box(&batch), "Electronics", ResultFilter::DealsOnly));
    });
}

criterion_group!(benches, extraction, normalization);
criterion_main!(benches);
