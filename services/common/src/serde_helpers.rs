//! Lenient field decoders for upstream JSON
//!
//! The market-data API omits fields, sends `null`, and mixes numbers with
//! numeric strings. These helpers coerce all of that to plain values with a
//! zero/empty default. Use them with `#[serde(default, deserialize_with = ...)]`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Numeric value of `v`; numbers and numeric strings, anything else is 0
#[must_use]
pub fn value_as_f64(v: &Value) -> f64 {
    let parsed = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite()).unwrap_or(0.0)
}

/// String value of `v`; numbers are rendered, anything else is empty
#[must_use]
pub fn value_as_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// `f64` that tolerates null, strings and garbage
///
/// # Errors
/// Only if the input is not valid JSON at all
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map_or(0.0, value_as_f64))
}

/// `f64` that stays `None` unless a number or numeric string was sent
///
/// # Errors
/// Only if the input is not valid JSON at all
pub fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
    .filter(|f| f.is_finite()))
}

/// `String` that tolerates null and numbers
///
/// # Errors
/// Only if the input is not valid JSON at all
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map_or_else(String::new, value_as_string))
}

/// Non-negative integer that tolerates null, strings and fractions
///
/// # Errors
/// Only if the input is not valid JSON at all
pub fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_f64(deserializer)?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let whole = if value > 0.0 { value as u64 } else { 0 };
    Ok(whole)
}

/// Token decimal precision, clamped to `u32`
///
/// # Errors
/// Only if the input is not valid JSON at all
pub fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_u64(deserializer)?;
    Ok(u32::try_from(value).unwrap_or(u32::MAX))
}

/// `bool` where null or anything non-boolean is false
///
/// # Errors
/// Only if the input is not valid JSON at all
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(matches!(value, Some(Value::Bool(true))))
}

/// Nested object where `null` means `T::default()`
///
/// # Errors
/// If a non-null value does not decode as `T`
pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "lenient_f64")]
        amount: f64,
        #[serde(default, deserialize_with = "lenient_string")]
        label: String,
        #[serde(default, deserialize_with = "lenient_u32")]
        decimals: u32,
        #[serde(default, deserialize_with = "lenient_bool")]
        flag: bool,
    }

    #[test]
    fn test_missing_fields_default() {
        let s: Sample = serde_json::from_value(json!({})).unwrap();
        assert_eq!(s.amount, 0.0);
        assert!(s.label.is_empty());
        assert_eq!(s.decimals, 0);
        assert!(!s.flag);
    }

    #[test]
    fn test_null_and_strings() {
        let s: Sample = serde_json::from_value(json!({
            "amount": "12.5",
            "label": null,
            "decimals": "9",
            "flag": "yes"
        }))
        .unwrap();
        assert_eq!(s.amount, 12.5);
        assert!(s.label.is_empty());
        assert_eq!(s.decimals, 9);
        assert!(!s.flag);
    }

    #[derive(Debug, Deserialize)]
    struct Scored {
        #[serde(default, deserialize_with = "lenient_opt_f64")]
        score: Option<f64>,
    }

    #[test]
    fn test_optional_number_keeps_absence() {
        let parse = |v| serde_json::from_value::<Scored>(v).unwrap().score;
        assert_eq!(parse(json!({})), None);
        assert_eq!(parse(json!({"score": null})), None);
        assert_eq!(parse(json!({"score": "n/a"})), None);
        assert_eq!(parse(json!({"score": "4"})), Some(4.0));
        assert_eq!(parse(json!({"score": 0})), Some(0.0));
    }

    #[test]
    fn test_garbage_numbers_are_zero() {
        let s: Sample = serde_json::from_value(json!({
            "amount": {"usd": 3},
            "label": 42,
            "decimals": -4
        }))
        .unwrap();
        assert_eq!(s.amount, 0.0);
        assert_eq!(s.label, "42");
        assert_eq!(s.decimals, 0);
    }
}
