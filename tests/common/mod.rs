//! In-memory collaborators shared by the integration suites

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};

use affilistore_core::domain::services::{CatalogClient, CatalogSearch, ConversionClient, ConvertMode, PageFetcher};
use affilistore_core::{ServiceError, ServiceResult, TransportKind};

/// Serves fixed markup per URL, anything else is a connect failure
#[derive(Default)]
pub struct StaticPages {
    pages: HashMap<String, String>,
    pub fetches: AtomicUsize,
}

impl StaticPages {
    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }
}

#[async_trait]
impl PageFetcher for StaticPages {
    async fn fetch_page(&self, url: &str) -> ServiceResult<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ServiceError::transport(TransportKind::Connect, url, "no route to host"))
    }
}

/// Catalog returning canned items, or a canned error
#[derive(Default)]
pub struct FakeCatalog {
    items: Mutex<Vec<Value>>,
    failure: Mutex<Option<ServiceError>>,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<CatalogSearch>>,
}

impl FakeCatalog {
    pub fn with_items(items: Vec<Value>) -> Self {
        let catalog = Self::default();
        *catalog.items.lock().unwrap() = items;
        catalog
    }

    pub fn set_items(&self, items: Vec<Value>) {
        *self.items.lock().unwrap() = items;
    }

    pub fn fail_with(&self, error: Option<ServiceError>) {
        *self.failure.lock().unwrap() = error;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn search(&self, request: &CatalogSearch) -> ServiceResult<Vec<Value>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.items.lock().unwrap().clone())
    }
}

/// Partner answering each mode with a canned body or error
pub struct FakePartner {
    pub convert: ServiceResult<Value>,
    pub scrape: ServiceResult<Value>,
    pub scrape_calls: AtomicUsize,
}

impl FakePartner {
    pub fn new(convert: ServiceResult<Value>, scrape: ServiceResult<Value>) -> Self {
        Self {
            convert,
            scrape,
            scrape_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ConversionClient for FakePartner {
    async fn submit(&self, _url: &str, mode: ConvertMode) -> ServiceResult<Value> {
        match mode {
            ConvertMode::ConvertOnly => self.convert.clone(),
            ConvertMode::ConvertAndScrape => {
                self.scrape_calls.fetch_add(1, Ordering::SeqCst);
                self.scrape.clone()
            }
        }
    }
}

/// Catalog hit with a price and an optional saving basis
pub fn catalog_item(asin: &str, price: f64, original: Option<f64>) -> Value {
    let mut listing = json!({
        "Price": { "Amount": price, "DisplayAmount": format!("₹{price:.2}") },
        "DeliveryInfo": { "IsPrimeEligible": true }
    });
    if let Some(original) = original {
        listing["SavingBasis"] = json!({ "Amount": original, "DisplayAmount": format!("₹{original:.2}") });
    }
    json!({
        "ASIN": asin,
        "DetailPageURL": format!("https://www.amazon.in/dp/{asin}"),
        "ItemInfo": { "Title": { "DisplayValue": format!("Item {asin}") } },
        "Images": { "Primary": { "Large": { "URL": format!("https://m.media-amazon.com/{asin}.jpg") } } },
        "Offers": { "Listings": [listing] }
    })
}
