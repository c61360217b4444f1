//! Rows, records and key extraction.

use serde_json::{Map, Number, Value};

use crate::value::CellValue;

/// Natural key column of the `company` table.
pub const COMPANY_KEY: &str = "corporate_number";

/// Natural key column of the `recruit` table.
pub const RECRUITMENT_KEY: &str = "media_internal_id";

/// Textual null marker some upstream writers store instead of SQL NULL.
pub const NULL_MARKER: &str = "None";

// Largest magnitude below which every integral f64 is exact.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// A raw row as decoded from the database, in column order.
pub type Row = Vec<(String, CellValue)>;

/// A sanitized row, ready to serialize. Column order is preserved.
pub type Record = Map<String, Value>;

/// Extract the lookup key of a record.
///
/// Returns `None` when the column is missing, null, empty, the
/// [`NULL_MARKER`] string, or not a scalar that has a natural textual form
/// (strings and numbers). Whole-valued floats key without a fraction, so a
/// NUMERIC `4010001` is found under `"4010001"`.
pub fn record_key(record: &Record, column: &str) -> Option<String> {
    match record.get(column)? {
        Value::String(s) if !s.is_empty() && s != NULL_MARKER => Some(s.clone()),
        Value::Number(n) => Some(number_key(n)),
        _ => None,
    }
}

fn number_key(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < MAX_EXACT_INT => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

/// Drop every column whose name contains any of `substrings`.
pub fn exclude_columns(row: Row, substrings: &[String]) -> Row {
    if substrings.is_empty() {
        return row;
    }

    row.into_iter()
        .filter(|(name, _)| !substrings.iter().any(|s| name.contains(s.as_str())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn string_and_numeric_keys_are_used() {
        let r = record(json!({"corporate_number": "C1"}));
        assert_eq!(record_key(&r, COMPANY_KEY).as_deref(), Some("C1"));

        let r = record(json!({"corporate_number": 4010001}));
        assert_eq!(record_key(&r, COMPANY_KEY).as_deref(), Some("4010001"));
    }

    #[test]
    fn absent_keys_are_skipped() {
        for value in [
            json!({}),
            json!({"corporate_number": null}),
            json!({"corporate_number": ""}),
            json!({"corporate_number": true}),
            json!({"corporate_number": ["C1"]}),
        ] {
            assert_eq!(record_key(&record(value.clone()), COMPANY_KEY), None, "{value}");
        }
    }

    #[test]
    fn null_marker_string_is_not_a_key() {
        let r = record(json!({"corporate_number": "None"}));
        assert_eq!(record_key(&r, COMPANY_KEY), None);

        // only the exact marker
        let r = record(json!({"corporate_number": "none"}));
        assert_eq!(record_key(&r, COMPANY_KEY).as_deref(), Some("none"));
    }

    #[test]
    fn whole_floats_key_like_integers() {
        let r = record(json!({"corporate_number": 4010001.0}));
        assert_eq!(record_key(&r, COMPANY_KEY).as_deref(), Some("4010001"));

        let r = record(json!({"corporate_number": -12.0}));
        assert_eq!(record_key(&r, COMPANY_KEY).as_deref(), Some("-12"));

        let r = record(json!({"corporate_number": 12.5}));
        assert_eq!(record_key(&r, COMPANY_KEY).as_deref(), Some("12.5"));
    }

    #[test]
    fn exclusion_applies_every_substring() {
        let row: Row = vec![
            ("corporate_number".into(), "1".into()),
            ("quality_score".into(), CellValue::Float(0.5)),
            ("company_name".into(), "Acme".into()),
            ("updated_at".into(), "2024-01-01".into()),
            ("data_quality".into(), CellValue::Int(3)),
        ];
        let substrings = vec!["quality".to_string(), "updated_at".to_string()];

        let names: Vec<_> = exclude_columns(row, &substrings)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, ["corporate_number", "company_name"]);
    }

    #[test]
    fn no_substrings_keeps_row() {
        let row: Row = vec![("quality".into(), CellValue::Null)];
        assert_eq!(exclude_columns(row.clone(), &[]), row);
    }
}
