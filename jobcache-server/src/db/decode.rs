//! Row decoding for `SELECT *` reads.
//!
//! Columns are not known at compile time, so each one is decoded by its
//! Postgres type name into a [`CellValue`]. Every non-null cell keeps a value:
//! types without a dedicated mapping pass through as text when the server sent
//! them in text form, and otherwise fail the read with [`DbError::Decode`].

use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::postgres::types::{Oid, PgInterval};
use sqlx::postgres::{PgRow, PgTypeInfo, PgTypeKind, PgValueFormat, PgValueRef};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use uuid::Uuid;

use jobcache_core::{CellValue, Row};

use super::DbError;

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Decode every column of a row, keeping column order.
pub fn decode_row(row: &PgRow) -> Result<Row, DbError> {
    row.columns()
        .iter()
        .map(|column| {
            let cell = decode_cell(row, column.ordinal(), column.name(), column.type_info())?;
            Ok((column.name().to_string(), cell))
        })
        .collect()
}

fn decode_cell(
    row: &PgRow,
    index: usize,
    name: &str,
    ty: &PgTypeInfo,
) -> Result<CellValue, DbError> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(CellValue::Null);
    }

    let err = |e: sqlx::Error| DbError::decode(name, e);

    let cell = match ty.name() {
        "BOOL" => CellValue::Bool(row.try_get(index).map_err(err)?),
        "\"CHAR\"" => {
            let byte = row.try_get::<i8, _>(index).map_err(err)? as u8;
            CellValue::Text(char::from(byte).to_string())
        }
        "INT2" => CellValue::Int(row.try_get::<i16, _>(index).map_err(err)?.into()),
        "INT4" => CellValue::Int(row.try_get::<i32, _>(index).map_err(err)?.into()),
        "INT8" => CellValue::Int(row.try_get(index).map_err(err)?),
        "OID" => CellValue::Int(row.try_get::<Oid, _>(index).map_err(err)?.0.into()),
        "FLOAT4" => CellValue::Float(widen_f32(row.try_get(index).map_err(err)?)),
        "FLOAT8" => CellValue::Float(row.try_get(index).map_err(err)?),
        "NUMERIC" => CellValue::Float(decode_numeric(raw).map_err(|e| DbError::decode(name, e))?),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CITEXT" | "citext" | "UNKNOWN" => {
            CellValue::Text(row.try_get_unchecked(index).map_err(err)?)
        }
        "BYTEA" => CellValue::Text(bytea_hex(&row.try_get::<Vec<u8>, _>(index).map_err(err)?)),
        "UUID" => CellValue::Text(row.try_get::<Uuid, _>(index).map_err(err)?.to_string()),
        "DATE" => CellValue::Text(row.try_get::<NaiveDate, _>(index).map_err(err)?.to_string()),
        "TIME" => CellValue::Text(row.try_get::<NaiveTime, _>(index).map_err(err)?.to_string()),
        "TIMESTAMP" => CellValue::Text(
            row.try_get::<NaiveDateTime, _>(index)
                .map_err(err)?
                .format(TIMESTAMP_FORMAT)
                .to_string(),
        ),
        "TIMESTAMPTZ" => CellValue::Text(
            row.try_get::<DateTime<Utc>, _>(index)
                .map_err(err)?
                .to_rfc3339(),
        ),
        "INTERVAL" => {
            let interval = row.try_get::<PgInterval, _>(index).map_err(err)?;
            CellValue::Text(interval_iso(interval.months, interval.days, interval.microseconds))
        }
        "JSON" | "JSONB" => row.try_get::<serde_json::Value, _>(index).map_err(err)?.into(),
        "BOOL[]" => list(row.try_get::<Vec<Option<bool>>, _>(index).map_err(err)?),
        "TEXT[]" | "VARCHAR[]" | "BPCHAR[]" | "NAME[]" => {
            list(row.try_get::<Vec<Option<String>>, _>(index).map_err(err)?)
        }
        "INT2[]" => list(
            row.try_get::<Vec<Option<i16>>, _>(index)
                .map_err(err)?
                .into_iter()
                .map(|v| v.map(i64::from)),
        ),
        "INT4[]" => list(
            row.try_get::<Vec<Option<i32>>, _>(index)
                .map_err(err)?
                .into_iter()
                .map(|v| v.map(i64::from)),
        ),
        "INT8[]" => list(row.try_get::<Vec<Option<i64>>, _>(index).map_err(err)?),
        "FLOAT4[]" => list(
            row.try_get::<Vec<Option<f32>>, _>(index)
                .map_err(err)?
                .into_iter()
                .map(|v| v.map(widen_f32)),
        ),
        "FLOAT8[]" => list(row.try_get::<Vec<Option<f64>>, _>(index).map_err(err)?),
        "NUMERIC[]" => match raw.format() {
            PgValueFormat::Binary => {
                let bytes = raw.as_bytes().map_err(|e| DbError::decode(name, e))?;
                list(numeric_array_from_binary(bytes).map_err(|e| DbError::decode(name, e))?)
            }
            PgValueFormat::Text => {
                let text = raw.as_str().map_err(|e| DbError::decode(name, e))?;
                unmapped(name, "NUMERIC[]", Some(text))?
            }
        },
        "UUID[]" => list(
            row.try_get::<Vec<Option<Uuid>>, _>(index)
                .map_err(err)?
                .into_iter()
                .map(|v| v.map(|u| u.to_string())),
        ),
        "DATE[]" => list(
            row.try_get::<Vec<Option<NaiveDate>>, _>(index)
                .map_err(err)?
                .into_iter()
                .map(|v| v.map(|d| d.to_string())),
        ),
        "TIMESTAMP[]" => list(
            row.try_get::<Vec<Option<NaiveDateTime>>, _>(index)
                .map_err(err)?
                .into_iter()
                .map(|v| v.map(|t| t.format(TIMESTAMP_FORMAT).to_string())),
        ),
        "TIMESTAMPTZ[]" => list(
            row.try_get::<Vec<Option<DateTime<Utc>>>, _>(index)
                .map_err(err)?
                .into_iter()
                .map(|v| v.map(|t| t.to_rfc3339())),
        ),
        _ if matches!(ty.kind(), PgTypeKind::Enum(_)) => {
            CellValue::Text(row.try_get_unchecked(index).map_err(err)?)
        }
        other => {
            let text = match raw.format() {
                PgValueFormat::Text => Some(raw.as_str().map_err(|e| DbError::decode(name, e))?),
                PgValueFormat::Binary => None,
            };
            unmapped(name, other, text)?
        }
    };

    Ok(cell)
}

/// Last resort for a column type with no mapping: keep the server's text
/// rendition, or refuse rather than invent a value.
fn unmapped(column: &str, ty: &str, text: Option<&str>) -> Result<CellValue, DbError> {
    match text {
        Some(text) => {
            tracing::debug!(column, ty, "no decoder for column type, keeping text form");
            Ok(CellValue::Text(text.to_owned()))
        }
        None => Err(DbError::decode(column, format!("unsupported column type {ty}"))),
    }
}

fn list<T>(items: impl IntoIterator<Item = Option<T>>) -> CellValue
where
    T: Into<CellValue>,
{
    CellValue::List(items.into_iter().map(CellValue::from).collect())
}

/// Widen through the shortest decimal form so `0.1::float4` stays `0.1`.
fn widen_f32(value: f32) -> f64 {
    value
        .to_string()
        .parse()
        .unwrap_or_else(|_| f64::from(value))
}

/// Postgres' own hex output format, `\x` followed by two digits per byte.
fn bytea_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("\\x");
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

/// ISO 8601 duration, e.g. `P1Y2M3DT4H5M6.5S`.
fn interval_iso(months: i32, days: i32, microseconds: i64) -> String {
    let mut out = String::from("P");
    let (years, months) = (months / 12, months % 12);
    if years != 0 {
        let _ = write!(out, "{years}Y");
    }
    if months != 0 {
        let _ = write!(out, "{months}M");
    }
    if days != 0 {
        let _ = write!(out, "{days}D");
    }

    if microseconds != 0 {
        out.push('T');
        let sign = if microseconds < 0 { "-" } else { "" };
        let total = microseconds.unsigned_abs();
        let hours = total / 3_600_000_000;
        let minutes = total % 3_600_000_000 / 60_000_000;
        let seconds = total % 60_000_000 / 1_000_000;
        let micros = total % 1_000_000;

        if hours != 0 {
            let _ = write!(out, "{sign}{hours}H");
        }
        if minutes != 0 {
            let _ = write!(out, "{sign}{minutes}M");
        }
        if micros != 0 {
            let fraction = format!("{micros:06}");
            let _ = write!(out, "{sign}{seconds}.{}S", fraction.trim_end_matches('0'));
        } else if seconds != 0 {
            let _ = write!(out, "{sign}{seconds}S");
        }
    }

    if out == "P" {
        out.push_str("T0S");
    }
    out
}

/// Decode a NUMERIC value to `f64`, keeping NaN and the infinities.
fn decode_numeric(raw: PgValueRef<'_>) -> Result<f64, String> {
    match raw.format() {
        PgValueFormat::Binary => {
            let bytes = raw.as_bytes().map_err(|e| e.to_string())?;
            numeric_from_binary(bytes)
        }
        PgValueFormat::Text => {
            let text = raw.as_str().map_err(|e| e.to_string())?;
            text.trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid numeric '{text}': {e}"))
        }
    }
}

/// Binary NUMERIC layout: ndigits, weight, sign, dscale (all 16-bit, big
/// endian) followed by `ndigits` base-10000 digits, most significant first.
fn numeric_from_binary(bytes: &[u8]) -> Result<f64, String> {
    let word = |at: usize| -> Result<u16, String> {
        bytes
            .get(at..at + 2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .ok_or_else(|| format!("numeric truncated at byte {at}"))
    };

    let ndigits = word(0)? as usize;
    let weight = word(2)? as i16;
    let sign = word(4)?;

    let negative = match sign {
        NUMERIC_POS => false,
        NUMERIC_NEG => true,
        NUMERIC_NAN => return Ok(f64::NAN),
        NUMERIC_PINF => return Ok(f64::INFINITY),
        NUMERIC_NINF => return Ok(f64::NEG_INFINITY),
        other => return Err(format!("unknown numeric sign {other:#06x}")),
    };

    if ndigits == 0 {
        return Ok(0.0);
    }

    let mut mantissa = String::with_capacity(ndigits * 4 + 1);
    if negative {
        mantissa.push('-');
    }
    for i in 0..ndigits {
        let digit = word(8 + i * 2)?;
        if digit > 9999 {
            return Err(format!("numeric digit {digit} out of range"));
        }
        mantissa.push_str(&format!("{digit:04}"));
    }

    // value = mantissa * 10000^(weight + 1 - ndigits)
    let exponent = 4 * (i32::from(weight) + 1 - ndigits as i32);
    format!("{mantissa}e{exponent}")
        .parse::<f64>()
        .map_err(|e| e.to_string())
}

/// Binary array layout: ndim, has-null flag, element oid (32-bit each), one
/// (length, lower bound) pair per dimension, then each element as a 32-bit
/// length (-1 for NULL) and its bytes. Only one-dimensional arrays are read.
fn numeric_array_from_binary(bytes: &[u8]) -> Result<Vec<Option<f64>>, String> {
    let int = |at: usize| -> Result<i32, String> {
        bytes
            .get(at..at + 4)
            .map(|b| i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
            .ok_or_else(|| format!("array truncated at byte {at}"))
    };

    let ndim = int(0)?;
    match ndim {
        0 => return Ok(Vec::new()),
        1 => {}
        n => return Err(format!("{n}-dimensional numeric arrays are not supported")),
    }

    let len = usize::try_from(int(12)?).map_err(|e| e.to_string())?;
    let mut at = 20;
    let mut items = Vec::with_capacity(len);
    for _ in 0..len {
        let size = int(at)?;
        at += 4;
        if size < 0 {
            items.push(None);
            continue;
        }
        let end = at + size as usize;
        let element = bytes
            .get(at..end)
            .ok_or_else(|| format!("array element truncated at byte {at}"))?;
        items.push(Some(numeric_from_binary(element)?));
        at = end;
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(weight: i16, sign: u16, digits: &[u16]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(digits.len() as u16).to_be_bytes());
        out.extend_from_slice(&weight.to_be_bytes());
        out.extend_from_slice(&sign.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        for d in digits {
            out.extend_from_slice(&d.to_be_bytes());
        }
        out
    }

    #[test]
    fn decodes_integers_and_fractions() {
        // 12345.678 = [1, 2345, 6780] weight 1
        let bytes = numeric(1, NUMERIC_POS, &[1, 2345, 6780]);
        assert_eq!(numeric_from_binary(&bytes).unwrap(), 12345.678);

        // -0.05 = [500] weight -1
        let bytes = numeric(-1, NUMERIC_NEG, &[500]);
        assert_eq!(numeric_from_binary(&bytes).unwrap(), -0.05);

        // 20000 = [2] weight 1
        let bytes = numeric(1, NUMERIC_POS, &[2]);
        assert_eq!(numeric_from_binary(&bytes).unwrap(), 20000.0);
    }

    #[test]
    fn zero_has_no_digits() {
        let bytes = numeric(0, NUMERIC_POS, &[]);
        assert_eq!(numeric_from_binary(&bytes).unwrap(), 0.0);
    }

    #[test]
    fn special_values_survive_for_the_sanitizer() {
        assert!(numeric_from_binary(&numeric(0, NUMERIC_NAN, &[])).unwrap().is_nan());
        assert_eq!(
            numeric_from_binary(&numeric(0, NUMERIC_PINF, &[])).unwrap(),
            f64::INFINITY
        );
        assert_eq!(
            numeric_from_binary(&numeric(0, NUMERIC_NINF, &[])).unwrap(),
            f64::NEG_INFINITY
        );
    }

    fn numeric_array(elements: &[Option<Vec<u8>>]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&1i32.to_be_bytes());
        out.extend_from_slice(&1i32.to_be_bytes());
        out.extend_from_slice(&1700i32.to_be_bytes());
        out.extend_from_slice(&(elements.len() as i32).to_be_bytes());
        out.extend_from_slice(&1i32.to_be_bytes());
        for element in elements {
            match element {
                Some(bytes) => {
                    out.extend_from_slice(&(bytes.len() as i32).to_be_bytes());
                    out.extend_from_slice(bytes);
                }
                None => out.extend_from_slice(&(-1i32).to_be_bytes()),
            }
        }
        out
    }

    #[test]
    fn numeric_arrays_keep_nulls_and_special_values() {
        let bytes = numeric_array(&[
            Some(numeric(0, NUMERIC_POS, &[7])),
            None,
            Some(numeric(0, NUMERIC_NAN, &[])),
        ]);
        let items = numeric_array_from_binary(&bytes).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], Some(7.0));
        assert_eq!(items[1], None);
        assert!(items[2].unwrap().is_nan());
    }

    #[test]
    fn empty_numeric_array_has_no_dimensions() {
        let bytes = [0u8; 12];
        assert_eq!(numeric_array_from_binary(&bytes).unwrap(), Vec::new());
    }

    #[test]
    fn truncated_numeric_array_is_an_error() {
        let mut bytes = numeric_array(&[Some(numeric(0, NUMERIC_POS, &[7]))]);
        bytes.truncate(bytes.len() - 1);
        assert!(numeric_array_from_binary(&bytes).is_err());
    }

    #[test]
    fn float4_widens_to_its_shortest_decimal() {
        assert_eq!(widen_f32(0.1), 0.1);
        assert_eq!(widen_f32(-2.5), -2.5);
        assert!(widen_f32(f32::NAN).is_nan());
        assert_eq!(widen_f32(f32::INFINITY), f64::INFINITY);
    }

    #[test]
    fn bytea_renders_as_postgres_hex() {
        assert_eq!(bytea_hex(&[0x00, 0xab, 0x1f]), "\\x00ab1f");
        assert_eq!(bytea_hex(&[]), "\\x");
    }

    #[test]
    fn intervals_render_as_iso_durations() {
        assert_eq!(interval_iso(14, 3, 3_723_500_000), "P1Y2M3DT1H2M3.5S");
        assert_eq!(interval_iso(0, 0, 0), "PT0S");
        assert_eq!(interval_iso(0, 1, 0), "P1D");
        assert_eq!(interval_iso(0, 0, -90_000_000), "PT-1M-30S");
    }

    #[test]
    fn unmapped_types_keep_text_or_fail() {
        assert_eq!(
            unmapped("addr", "INET", Some("10.0.0.1/32")).unwrap(),
            CellValue::Text("10.0.0.1/32".into())
        );

        let err = unmapped("addr", "INET", None).unwrap_err();
        assert!(err.to_string().contains("addr"));
        assert!(err.to_string().contains("INET"));
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(numeric_from_binary(&[0, 1]).is_err());
        // claims two digits, carries one
        let mut bytes = numeric(0, NUMERIC_POS, &[1]);
        bytes[1] = 2;
        assert!(numeric_from_binary(&bytes).is_err());
        assert!(numeric_from_binary(&numeric(0, 0x1234, &[1])).is_err());
        assert!(numeric_from_binary(&numeric(0, NUMERIC_POS, &[10000])).is_err());
    }
}
