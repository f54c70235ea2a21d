//! Untyped value inference.
//!
//! `setAttr` values written without `-type` are classified from their
//! spelling: boolean words become `Bool`, integer-shaped tokens `Int`, and
//! anything else numeric `Double`. A single float-shaped token turns the
//! whole run into doubles.

use crate::error::{DecodeError, DecodeResult};
use crate::ma::types::AttrType;
use crate::ma::value::AttrValue;

/// Parse a MEL boolean spelling.
pub fn parse_bool(token: &str) -> Option<bool> {
    match token {
        "on" | "yes" | "true" => Some(true),
        "off" | "no" | "false" => Some(false),
        _ => None,
    }
}

/// Optional sign followed by at least one digit.
pub fn is_int_shaped(token: &str) -> bool {
    let digits = token
        .strip_prefix('-')
        .or_else(|| token.strip_prefix('+'))
        .unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Classify and decode untyped value tokens.
///
/// Returns `AttrType::Invalid` with no values for an empty token list.
pub fn infer_values(tokens: &[String]) -> DecodeResult<(AttrType, Vec<AttrValue>)> {
    if tokens.is_empty() {
        return Ok((AttrType::Invalid, Vec::new()));
    }

    if parse_bool(&tokens[0]).is_some() {
        let values = tokens
            .iter()
            .map(|t| {
                parse_bool(t).map(AttrValue::Bool).ok_or_else(|| DecodeError::InvalidValue {
                    expected: "boolean",
                    found: t.clone(),
                })
            })
            .collect::<DecodeResult<Vec<_>>>()?;
        return Ok((AttrType::Bool, values));
    }

    let mut attr_type = AttrType::Int;
    let mut values = Vec::with_capacity(tokens.len());

    for token in tokens {
        if attr_type == AttrType::Int && is_int_shaped(token) {
            if let Ok(v) = token.parse::<i64>() {
                values.push(AttrValue::Int(v));
                continue;
            }
        }

        let v = token
            .parse::<f64>()
            .map_err(|_| DecodeError::InvalidNumber(token.clone()))?;

        if attr_type == AttrType::Int {
            // Promote what was collected so far
            for value in values.iter_mut() {
                if let AttrValue::Int(i) = *value {
                    *value = AttrValue::Double(i as f64);
                }
            }
            attr_type = AttrType::Double;
        }
        values.push(AttrValue::Double(v));
    }

    Ok((attr_type, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_bool_spellings() {
        let (ty, values) = infer_values(&tokens("on off yes no true false")).unwrap();
        assert_eq!(ty, AttrType::Bool);
        assert_eq!(
            values,
            vec![
                AttrValue::Bool(true),
                AttrValue::Bool(false),
                AttrValue::Bool(true),
                AttrValue::Bool(false),
                AttrValue::Bool(true),
                AttrValue::Bool(false),
            ]
        );
    }

    #[test]
    fn test_ints() {
        let (ty, values) = infer_values(&tokens("1 -2 +3")).unwrap();
        assert_eq!(ty, AttrType::Int);
        assert_eq!(values, vec![AttrValue::Int(1), AttrValue::Int(-2), AttrValue::Int(3)]);
    }

    #[test]
    fn test_promotion_in_place() {
        let (ty, values) = infer_values(&tokens("1 2 3.5 4")).unwrap();
        assert_eq!(ty, AttrType::Double);
        assert_eq!(
            values,
            vec![
                AttrValue::Double(1.0),
                AttrValue::Double(2.0),
                AttrValue::Double(3.5),
                AttrValue::Double(4.0),
            ]
        );
    }

    #[test]
    fn test_exponent_is_double() {
        let (ty, values) = infer_values(&tokens("-1e-05")).unwrap();
        assert_eq!(ty, AttrType::Double);
        assert_eq!(values, vec![AttrValue::Double(-1e-5)]);
    }

    #[test]
    fn test_empty() {
        assert_eq!(infer_values(&[]).unwrap(), (AttrType::Invalid, Vec::new()));
    }

    #[test]
    fn test_invalid_tokens() {
        assert!(matches!(
            infer_values(&tokens("1 abc")),
            Err(DecodeError::InvalidNumber(_))
        ));
        assert!(matches!(
            infer_values(&tokens("yes 1")),
            Err(DecodeError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_int_shape() {
        assert!(is_int_shaped("12"));
        assert!(is_int_shaped("-0"));
        assert!(!is_int_shaped("-"));
        assert!(!is_int_shaped("1.0"));
        assert!(!is_int_shaped("1e5"));
    }
}
