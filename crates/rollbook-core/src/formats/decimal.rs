//! # Decimal Fields
//!
//! The backend stores `credits` and `score` as fixed-point decimals and
//! renders them as JSON strings (`"3.0"`, `"87.50"`). Older deployments and
//! hand-written fixtures send plain numbers instead. Both are accepted on the
//! way in; the client always sends numbers on the way out.

use crate::RollbookError;
use serde::{Deserialize, Deserializer, de};

/// A decimal as it appears on the wire.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireDecimal {
    Number(f64),
    Text(String),
}

/// Parse a decimal string such as `"87.50"`.
pub fn parse_decimal(text: &str) -> Result<f64, RollbookError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RollbookError::InvalidDecimal(text.to_string()))
}

/// Render a decimal for a form field or a table cell.
///
/// Uses the shortest representation that reads back to the same value, so
/// `87.5` renders as `"87.5"` and `3.0` as `"3"`.
pub fn format_decimal(value: f64) -> String {
    format!("{value}")
}

/// `deserialize_with` target for decimal fields.
pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match WireDecimal::deserialize(deserializer)? {
        WireDecimal::Number(v) => Ok(v),
        WireDecimal::Text(s) => parse_decimal(&s).map_err(de::Error::custom),
    }
}
