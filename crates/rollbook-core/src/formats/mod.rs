//! # Wire Formats
//!
//! Encodings the records backend uses that plain serde derives do not cover.

pub mod decimal;

pub use decimal::{format_decimal, parse_decimal};
