//! Arbitrary-precision decoding of numeric results.
//!
//! Epoch and difficulty values can exceed 64-bit range, so the node sends
//! large ones as decimal strings and small ones as bare JSON numbers. Both
//! shapes land in a [`bigdecimal::BigDecimal`]; the fixed-width projections
//! are explicit and lossy by contract.

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode};
use num_traits::{Signed, ToPrimitive};
use serde_json::Value;
use thiserror::Error;

use crate::rpc::types::Response;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericError {
    /// The result was a JSON string but not a base-10 number.
    #[error("cannot parse {input:?} as a decimal number")]
    UnparseableNumber { input: String },

    /// The result was some JSON kind other than string or number.
    #[error("numeric result has unexpected shape: got {found}")]
    UnknownResultShape { found: &'static str },
}

/// A decoded numeric result. Exact when the wire carried a decimal string;
/// projections to fixed-width types are the caller's precision trade-off.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericValue(BigDecimal);

impl NumericValue {
    /// Decode a raw JSON result fragment.
    ///
    /// A JSON string parses as a base-10 arbitrary-precision decimal; a JSON
    /// number loads directly. Everything else — object, array, bool, null —
    /// is [`NumericError::UnknownResultShape`].
    pub fn parse(raw: &str) -> Result<Self, NumericError> {
        let value: Value = serde_json::from_str(raw).map_err(|_| NumericError::UnknownResultShape {
            found: "invalid json",
        })?;
        match value {
            Value::String(s) => BigDecimal::from_str(&s)
                .map(Self)
                .map_err(|_| NumericError::UnparseableNumber { input: s }),
            Value::Number(n) => BigDecimal::from_str(&n.to_string())
                .map(Self)
                .map_err(|_| NumericError::UnparseableNumber {
                    input: n.to_string(),
                }),
            other => Err(NumericError::UnknownResultShape {
                found: json_kind(&other),
            }),
        }
    }

    /// Decode the `result` member of a response. An absent result fails the
    /// same way a non-numeric shape does.
    pub fn from_response(response: &Response) -> Result<Self, NumericError> {
        match response.raw_result() {
            Some(raw) => Self::parse(raw),
            None => Err(NumericError::UnknownResultShape { found: "absent" }),
        }
    }

    /// The exact decoded value.
    pub fn as_decimal(&self) -> &BigDecimal {
        &self.0
    }

    /// Truncating projection to `i64`, saturating at the type bounds.
    pub fn to_i64(&self) -> i64 {
        match self.0.with_scale_round(0, RoundingMode::Down).to_i64() {
            Some(n) => n,
            None if self.0.is_negative() => i64::MIN,
            None => i64::MAX,
        }
    }

    /// Lossy projection to `f64`.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }
}

impl std::fmt::Display for NumericValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
