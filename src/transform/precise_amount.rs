//! `precise_amount` string → JSON number conversion.

use std::str::FromStr;

use axum::body::Bytes;
use indexmap::IndexMap;
use num_bigint::BigInt;
use serde_json::value::RawValue;
use thiserror::Error;

/// Top-level fields in input order, each value kept as its source text.
type Document = IndexMap<String, Box<RawValue>>;

/// The only body field subject to rewriting.
pub const PRECISE_AMOUNT_FIELD: &str = "precise_amount";

/// Reasons a body could not be transformed.
///
/// Neither is ever surfaced to the caller; the original body is forwarded.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Body is not a JSON object (or could not be written back).
    #[error("JSON processing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Field is a string but not a base-10 integer.
    #[error("invalid precise_amount value: {original:?}")]
    InvalidPreciseAmount { original: String },
}

/// What happened to the body.
#[derive(Debug)]
pub enum Outcome {
    /// Field absent or not a string; nothing to do.
    Unchanged,
    /// Field rewritten from a string to a numeric literal.
    Converted { original: String, value: BigInt },
    /// Transformation attempted and abandoned.
    Failed(TransformError),
}

impl Outcome {
    pub fn is_converted(&self) -> bool {
        matches!(self, Outcome::Converted { .. })
    }

    /// The string value found in the body, if one was inspected.
    pub fn original(&self) -> Option<&str> {
        match self {
            Outcome::Converted { original, .. } => Some(original),
            Outcome::Failed(TransformError::InvalidPreciseAmount { original }) => Some(original),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&BigInt> {
        match self {
            Outcome::Converted { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&TransformError> {
        match self {
            Outcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Body to forward plus the outcome that produced it.
#[derive(Debug)]
pub struct Transformed {
    pub body: Bytes,
    pub outcome: Outcome,
}

impl Transformed {
    fn untouched(body: &Bytes, outcome: Outcome) -> Self {
        Self {
            body: body.clone(),
            outcome,
        }
    }
}

/// Rewrite a string `precise_amount` into an exact JSON integer.
///
/// Every other top-level value is written back from its original text, in
/// its original position. Only insignificant whitespace between top-level
/// tokens is lost.
pub fn convert_precise_amount(body: &Bytes) -> Transformed {
    let mut document: Document = match serde_json::from_slice(body) {
        Ok(document) => document,
        Err(e) => return Transformed::untouched(body, Outcome::Failed(e.into())),
    };

    let Some(original) = document
        .get(PRECISE_AMOUNT_FIELD)
        .and_then(|raw| serde_json::from_str::<String>(raw.get()).ok())
    else {
        return Transformed::untouched(body, Outcome::Unchanged);
    };

    let Some(value) = parse_integer(&original) else {
        return Transformed::untouched(
            body,
            Outcome::Failed(TransformError::InvalidPreciseAmount { original }),
        );
    };

    let literal = match RawValue::from_string(value.to_string()) {
        Ok(literal) => literal,
        Err(e) => return Transformed::untouched(body, Outcome::Failed(e.into())),
    };
    if let Some(slot) = document.get_mut(PRECISE_AMOUNT_FIELD) {
        *slot = literal;
    }

    match serde_json::to_vec(&document) {
        Ok(updated) => Transformed {
            body: Bytes::from(updated),
            outcome: Outcome::Converted { original, value },
        },
        Err(e) => Transformed::untouched(body, Outcome::Failed(e.into())),
    }
}

/// Optional sign, then one or more ASCII digits. Nothing else.
fn parse_integer(s: &str) -> Option<BigInt> {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigInt::from_str(s).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(body: &str) -> Transformed {
        convert_precise_amount(&Bytes::from(body.to_string()))
    }

    fn parse(body: &Bytes) -> Document {
        serde_json::from_slice(body).unwrap()
    }

    #[test]
    fn body_without_field_is_byte_identical() {
        let input = r#"{ "note" : "x",  "amount": 12 }"#;
        let out = run(input);
        assert_eq!(out.body, input.as_bytes());
        assert!(matches!(out.outcome, Outcome::Unchanged));
        assert!(!out.outcome.is_converted());
        assert!(out.outcome.original().is_none());
    }

    #[test]
    fn numeric_field_is_left_alone() {
        let input = r#"{"precise_amount": 42}"#;
        let out = run(input);
        assert_eq!(out.body, input.as_bytes());
        assert!(matches!(out.outcome, Outcome::Unchanged));
    }

    #[test]
    fn null_field_is_left_alone() {
        let input = r#"{"precise_amount": null}"#;
        let out = run(input);
        assert_eq!(out.body, input.as_bytes());
        assert!(matches!(out.outcome, Outcome::Unchanged));
    }

    #[test]
    fn converts_amount_beyond_i64() {
        let out = run(r#"{"precise_amount":"123456789012345678901234567890","note":"x"}"#);
        assert_eq!(
            out.body,
            r#"{"precise_amount":123456789012345678901234567890,"note":"x"}"#.as_bytes()
        );
        assert!(out.outcome.is_converted());
        assert_eq!(out.outcome.original(), Some("123456789012345678901234567890"));
        assert_eq!(
            out.outcome.value().map(ToString::to_string).as_deref(),
            Some("123456789012345678901234567890")
        );
    }

    #[test]
    fn converts_negative_amount() {
        let out = run(r#"{"precise_amount":"-99999999999999999999999"}"#);
        assert_eq!(out.body, r#"{"precise_amount":-99999999999999999999999}"#.as_bytes());
    }

    #[test]
    fn plus_sign_and_leading_zeros_are_normalized() {
        let out = run(r#"{"precise_amount":"+000120"}"#);
        assert_eq!(out.body, r#"{"precise_amount":120}"#.as_bytes());
        assert_eq!(out.outcome.original(), Some("+000120"));
    }

    #[test]
    fn other_fields_survive_conversion() {
        let input = json!({
            "precise_amount": "18446744073709551616",
            "currency": "EUR",
            "count": 18446744073709551615u64,
            "rate": 0.1,
            "tags": ["a", "b"],
            "meta": {"nested": true, "empty": null}
        });
        let source: Document = serde_json::from_str(&input.to_string()).unwrap();
        let out = convert_precise_amount(&Bytes::from(input.to_string()));
        assert!(out.outcome.is_converted());

        let output = parse(&out.body);
        assert_eq!(output.len(), source.len());
        for (key, value) in &source {
            if key != PRECISE_AMOUNT_FIELD {
                assert_eq!(output[key].get(), value.get(), "field {key} changed");
            }
        }
        assert_eq!(output[PRECISE_AMOUNT_FIELD].get(), "18446744073709551616");
    }

    #[test]
    fn field_order_is_preserved() {
        let out = run(r#"{"z":1,"precise_amount":"7","a":2}"#);
        assert_eq!(out.body, r#"{"z":1,"precise_amount":7,"a":2}"#.as_bytes());
    }

    #[test]
    fn unrelated_values_keep_their_text() {
        let out = run(r#"{"precise_amount":"7","meta":{"$serde_json::private::Number":"12"}}"#);
        assert!(out.outcome.is_converted());
        assert_eq!(
            out.body,
            r#"{"precise_amount":7,"meta":{"$serde_json::private::Number":"12"}}"#.as_bytes()
        );

        let out = run(r#"{"rate":1.50,"big":12345678901234567890123,"precise_amount":"-0"}"#);
        assert_eq!(
            out.body,
            r#"{"rate":1.50,"big":12345678901234567890123,"precise_amount":0}"#.as_bytes()
        );
    }

    #[test]
    fn escaped_string_amount_is_decoded_first() {
        let out = run(r#"{"precise_amount":"\u0031\u0032"}"#);
        assert_eq!(out.body, r#"{"precise_amount":12}"#.as_bytes());
        assert_eq!(out.outcome.original(), Some("12"));
    }

    #[test]
    fn invalid_strings_fail_without_touching_body() {
        for bad in ["abc", "12.5", "", "-", "1e10", " 12", "1_000", "0x10", "++1"] {
            let input = format!(r#"{{"precise_amount":"{bad}"}}"#);
            let out = run(&input);
            assert_eq!(out.body, input.as_bytes(), "body changed for {bad:?}");
            assert!(!out.outcome.is_converted());
            assert_eq!(out.outcome.original(), Some(bad));
            assert!(matches!(
                out.outcome.error(),
                Some(TransformError::InvalidPreciseAmount { .. })
            ));
        }
    }

    #[test]
    fn malformed_json_is_reported_and_passed_through() {
        for input in ["{not json", "[1,2,3]", "\"string\"", "42"] {
            let out = run(input);
            assert_eq!(out.body, input.as_bytes());
            assert!(matches!(out.outcome.error(), Some(TransformError::Json(_))));
            assert!(out.outcome.original().is_none());
        }
    }
}
