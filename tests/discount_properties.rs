//! Discount and normalization properties over arbitrary inputs

use proptest::prelude::*;
use serde_json::{Value, json};

use affilistore_core::ItemNormalizer;
use affilistore_core::application::ResultFilter;
use affilistore_core::domain::product::discount_percent;

fn amount() -> impl Strategy<Value = f64> {
    prop_oneof![
        -1.0e6..1.0e9f64,
        Just(0.0),
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
    ]
}

proptest! {
    #[test]
    fn discount_is_a_percentage(current in proptest::option::of(amount()), original in proptest::option::of(amount())) {
        prop_assert!(discount_percent(current, original) <= 100);
    }

    #[test]
    fn no_positive_original_means_no_discount(current in proptest::option::of(amount()), original in -1.0e6..=0.0f64) {
        prop_assert_eq!(discount_percent(current, Some(original)), 0);
        prop_assert_eq!(discount_percent(current, None), 0);
    }

    #[test]
    fn cheaper_than_original_is_a_deal(original in 1.0..1.0e7f64, fraction in 0.0..0.99f64) {
        let current = original * fraction;
        let percent = discount_percent(Some(current), Some(original));
        prop_assert!(percent >= 1);
    }

    #[test]
    fn normalizer_never_panics_on_objects(
        asin in proptest::option::of("[A-Z0-9]{0,12}"),
        title in prop_oneof![Just(Value::Null), any::<i64>().prop_map(Value::from), ".{0,40}".prop_map(Value::from)],
        price in prop_oneof![Just(Value::Null), any::<f64>().prop_map(|f| json!(f)), "[₹$0-9,. ]{0,12}".prop_map(Value::from)],
    ) {
        let item = json!({
            "ASIN": asin,
            "ItemInfo": { "Title": { "DisplayValue": title } },
            "Offers": { "Listings": [{ "Price": { "Amount": price.clone(), "DisplayAmount": price } }] }
        });
        let batch = ItemNormalizer::new().normalize_all(&[item], "Sports", ResultFilter::All);
        prop_assert_eq!(batch.records.len() + batch.skipped, 1);
        if let Some(record) = batch.records.first() {
            prop_assert!(record.discount_percent <= 100);
            prop_assert!(!record.title.is_empty());
        }
    }
}
