//! Deterministic JSON rendering used as fingerprint input.
//!
//! This rendering is part of the interchange format: every implementation that
//! recomputes fingerprints must produce the same bytes.
//!
//! - objects: keys sorted by code point, `{"k":v}` with no whitespace
//! - arrays: element order preserved
//! - strings: JSON escapes for `"`, `\`, and control characters; everything
//!   else verbatim UTF-8
//! - numbers: integers in decimal; integral floats below 1e21 in plain decimal
//!   digits; other floats in shortest round-trip form (exponent form such as
//!   `1e21` or `1.5e-7` is not guaranteed to match other renderers)
//! - `true`, `false`, `null`

use serde::ser::Error as _;
use serde::Serialize;
use serde_json::ser::{CompactFormatter, Formatter};
use serde_json::{Map, Serializer, Value};
use std::io::{self, Write};

/// Magnitude from which floats are written in exponent form.
const EXPONENT_THRESHOLD: f64 = 1e21;

/// Render a JSON value canonically.
pub fn canonical_json(value: &Value) -> Result<String, serde_json::Error> {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, CanonicalFormatter);
    sorted(value).serialize(&mut serializer)?;
    String::from_utf8(out).map_err(serde_json::Error::custom)
}

/// Copy of `value` with every object rebuilt in key order.
///
/// Map iteration order depends on serde_json features, so the order is fixed
/// here rather than relied on.
fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            let map: Map<String, Value> = entries
                .into_iter()
                .map(|(key, value)| (key.clone(), sorted(value)))
                .collect();
            Value::Object(map)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

/// Compact output with integral floats written as integers.
struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if value.fract() == 0.0 && value.abs() < EXPONENT_THRESHOLD {
            // Exact: every such float is an integer well inside i128.
            write!(writer, "{}", value as i128)
        } else {
            CompactFormatter.write_f64(writer, value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sorts_keys_at_every_level() {
        let value = json!({
            "zeta": 1,
            "alpha": {"y": true, "b": null},
            "mid": [{"d": 1, "c": 2}]
        });
        assert_eq!(
            canonical_json(&value).unwrap(),
            r#"{"alpha":{"b":null,"y":true},"mid":[{"c":2,"d":1}],"zeta":1}"#
        );
    }

    #[test]
    fn test_arrays_keep_order() {
        assert_eq!(canonical_json(&json!([3, 1, 2])).unwrap(), "[3,1,2]");
    }

    #[test]
    fn test_string_escapes() {
        let value = json!("line1\nline2\t\"quoted\" back\\slash \u{01} caf\u{e9}");
        assert_eq!(
            canonical_json(&value).unwrap(),
            r#""line1\nline2\t\"quoted\" back\\slash \u0001 café""#
        );
    }

    #[test]
    fn test_matches_compact_serde_output_for_sorted_input() {
        let value = json!({"a": "x/y", "b": [1, -2, 3], "c": {"d": false}});
        assert_eq!(
            canonical_json(&value).unwrap(),
            serde_json::to_string(&value).unwrap()
        );
    }

    #[test]
    fn test_number_rendering() {
        assert_eq!(canonical_json(&json!(42)).unwrap(), "42");
        assert_eq!(canonical_json(&json!(-7)).unwrap(), "-7");
        assert_eq!(canonical_json(&json!(u64::MAX)).unwrap(), "18446744073709551615");
        assert_eq!(canonical_json(&json!(2.0)).unwrap(), "2");
        assert_eq!(canonical_json(&json!(1.5)).unwrap(), "1.5");
        assert_eq!(canonical_json(&json!(-0.25)).unwrap(), "-0.25");
    }

    #[test]
    fn test_large_integral_floats_stay_decimal() {
        assert_eq!(canonical_json(&json!(1e20)).unwrap(), "100000000000000000000");
        assert_eq!(
            canonical_json(&json!(1_152_921_504_606_846_976.0_f64)).unwrap(),
            "1152921504606846976"
        );
        assert_eq!(canonical_json(&json!(-3e19)).unwrap(), "-30000000000000000000");
        assert_eq!(canonical_json(&json!(-0.0)).unwrap(), "0");
    }

    #[test]
    fn test_nested_floats_and_keys() {
        let value = json!({"b": [{"y": 2.0, "x": 0.5}], "a": 1e20});
        assert_eq!(
            canonical_json(&value).unwrap(),
            r#"{"a":100000000000000000000,"b":[{"x":0.5,"y":2}]}"#
        );
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(canonical_json(&json!({})).unwrap(), "{}");
        assert_eq!(canonical_json(&json!([])).unwrap(), "[]");
    }
}
