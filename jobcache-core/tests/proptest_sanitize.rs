use jobcache_core::{sanitize, CellValue, SnapshotBuilder};
use proptest::prelude::*;
use serde_json::Value;

// Arbitrary cells including every float bit pattern, nested a few levels
fn arb_cell() -> impl Strategy<Value = CellValue> {
    let leaf = prop_oneof![
        Just(CellValue::Null),
        any::<bool>().prop_map(CellValue::Bool),
        any::<i64>().prop_map(CellValue::Int),
        any::<f64>().prop_map(CellValue::Float),
        prop_oneof![Just(f64::NAN), Just(f64::INFINITY), Just(f64::NEG_INFINITY)]
            .prop_map(CellValue::Float),
        ".{0,8}".prop_map(CellValue::Text),
    ];

    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(CellValue::List),
            prop::collection::vec(("[a-z]{1,4}", inner), 0..6).prop_map(CellValue::Map),
        ]
    })
}

fn all_numbers_finite(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_f64().map_or(true, f64::is_finite),
        Value::Array(items) => items.iter().all(all_numbers_finite),
        Value::Object(map) => map.values().all(all_numbers_finite),
        _ => true,
    }
}

proptest! {
    /// Property: sanitized output always serializes, whatever the input floats were
    #[test]
    fn prop_sanitized_output_serializes(cell in arb_cell()) {
        let out = sanitize(cell);
        prop_assert!(all_numbers_finite(&out));
        prop_assert!(serde_json::to_string(&out).is_ok());
    }

    /// Property: list length counts every company row, keyed or not
    #[test]
    fn prop_company_list_counts_all_rows(keys in prop::collection::vec(prop::option::of("[0-9]{1,3}"), 0..40)) {
        let mut builder = SnapshotBuilder::new(vec!["quality".into()]);
        for key in &keys {
            builder.push_company(vec![
                ("corporate_number".into(), CellValue::from(key.clone())),
                ("quality".into(), CellValue::Float(f64::NAN)),
            ]);
        }
        let snapshot = builder.build();

        prop_assert_eq!(snapshot.companies().len(), keys.len());

        let distinct: std::collections::HashSet<_> = keys.iter().flatten().collect();
        prop_assert_eq!(snapshot.counts().companies, distinct.len());

        for key in keys.iter().flatten() {
            prop_assert!(snapshot.company(key).is_some());
        }
        prop_assert!(snapshot.companies().iter().all(|r| !r.contains_key("quality")));
    }
}
