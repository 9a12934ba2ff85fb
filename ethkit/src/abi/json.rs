//! JSON ABI descriptors and JSON value conversion.

use serde::Deserialize;
use serde_json::Value;

use ethkit_common::{decode_hex, encode_hex};

use super::element::{
    AbiElement, Constructor, ErrorDef, Event, Fallback, Function, Param, StateMutability,
};
use super::types::ParamType;
use super::value::AbiValue;
use super::AbiError;
use crate::crypto::{parse_address, to_checksum};
use crate::primitives::{I256, U256};

#[derive(Deserialize)]
struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    components: Option<Vec<RawParam>>,
    #[serde(default)]
    indexed: Option<bool>,
}

#[derive(Deserialize)]
struct RawElement {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Option<Vec<RawParam>>,
    #[serde(default)]
    outputs: Option<Vec<RawParam>>,
    #[serde(rename = "stateMutability", default)]
    state_mutability: Option<String>,
    #[serde(default)]
    constant: Option<bool>,
    #[serde(default)]
    payable: Option<bool>,
    #[serde(default)]
    anonymous: Option<bool>,
}

impl RawParam {
    fn into_param(self) -> Result<Param, AbiError> {
        let components = match self.components {
            Some(raw) => Some(
                raw.into_iter()
                    .map(|c| c.into_param().map(|p| p.kind))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };
        Ok(Param {
            name: self.name,
            kind: ParamType::parse_with_components(&self.kind, components)?,
            indexed: self.indexed.unwrap_or(false),
        })
    }
}

fn convert_params(raw: Option<Vec<RawParam>>) -> Result<Vec<Param>, AbiError> {
    raw.unwrap_or_default()
        .into_iter()
        .map(RawParam::into_param)
        .collect()
}

impl RawElement {
    fn mutability(&self) -> Result<StateMutability, AbiError> {
        if let Some(s) = &self.state_mutability {
            return StateMutability::parse(s)
                .ok_or_else(|| AbiError::InvalidJson(format!("unknown stateMutability {s:?}")));
        }
        // Pre-0.4.16 compilers emit `constant` and `payable` flags instead.
        Ok(match (self.constant, self.payable) {
            (Some(true), _) => StateMutability::View,
            (_, Some(true)) => StateMutability::Payable,
            _ => StateMutability::NonPayable,
        })
    }

    fn into_element(self) -> Result<AbiElement, AbiError> {
        let state_mutability = self.mutability()?;
        let kind = self.kind.as_deref().unwrap_or("function");
        let element = match kind {
            "function" => AbiElement::Function(Function {
                name: self.name,
                inputs: convert_params(self.inputs)?,
                outputs: convert_params(self.outputs)?,
                state_mutability,
            }),
            "event" => AbiElement::Event(Event {
                name: self.name,
                inputs: convert_params(self.inputs)?,
                anonymous: self.anonymous.unwrap_or(false),
            }),
            "constructor" => AbiElement::Constructor(Constructor {
                inputs: convert_params(self.inputs)?,
                state_mutability,
            }),
            "error" => AbiElement::Error(ErrorDef {
                name: self.name,
                inputs: convert_params(self.inputs)?,
            }),
            "fallback" => AbiElement::Fallback(Fallback { state_mutability }),
            "receive" => AbiElement::Receive,
            other => {
                return Err(AbiError::InvalidJson(format!("unknown element type {other:?}")))
            }
        };
        Ok(element)
    }
}

/// Parses a JSON ABI: an array of element objects, or a build artifact
/// object carrying that array under `"abi"`.
///
/// Elements without `type` are functions. Unknown keys are ignored.
pub fn parse_abi_json(json: &str) -> Result<Vec<AbiElement>, AbiError> {
    let value: Value = serde_json::from_str(json)?;
    let array = match value {
        Value::Object(mut map) => map
            .remove("abi")
            .ok_or_else(|| AbiError::InvalidJson("expected an array or an \"abi\" key".into()))?,
        other => other,
    };
    let raw: Vec<RawElement> = serde_json::from_value(array)?;
    raw.into_iter().map(RawElement::into_element).collect()
}

// =============================================================================
// Values
// =============================================================================

fn invalid(ty: &ParamType, value: &Value) -> AbiError {
    AbiError::InvalidValue(format!("{value} is not a valid {ty}"))
}

fn parse_u256(s: &str) -> Option<U256> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(digits) if !digits.is_empty() => U256::from_str_radix(digits, 16).ok(),
        Some(_) => None,
        None => U256::from_dec_str(s).ok(),
    }
}

/// Converts a JSON value into an [`AbiValue`] of type `ty`.
///
/// Integers may be JSON numbers or strings (decimal, or `0x` hex for
/// unsigned). Byte values are `0x` hex strings. Arrays and tuples are JSON
/// arrays.
pub fn value_from_json(value: &Value, ty: &ParamType) -> Result<AbiValue, AbiError> {
    let converted = match ty {
        ParamType::Uint(_) => {
            let n = match value {
                Value::Number(n) => n.as_u64().map(U256::from),
                Value::String(s) => parse_u256(s),
                _ => None,
            };
            AbiValue::Uint(n.ok_or_else(|| invalid(ty, value))?)
        }
        ParamType::Int(_) => {
            let n = match value {
                Value::Number(n) => n.as_i64().map(I256::from),
                Value::String(s) => I256::from_dec_str(s).ok(),
                _ => None,
            };
            AbiValue::Int(n.ok_or_else(|| invalid(ty, value))?)
        }
        ParamType::Address => {
            let s = value.as_str().ok_or_else(|| invalid(ty, value))?;
            AbiValue::Address(
                parse_address(s).map_err(|e| AbiError::InvalidValue(format!("{s}: {e}")))?,
            )
        }
        ParamType::Bool => match value {
            Value::Bool(b) => AbiValue::Bool(*b),
            Value::String(s) if s == "true" => AbiValue::Bool(true),
            Value::String(s) if s == "false" => AbiValue::Bool(false),
            _ => return Err(invalid(ty, value)),
        },
        ParamType::FixedBytes(_) | ParamType::Bytes => {
            let s = value.as_str().ok_or_else(|| invalid(ty, value))?;
            let bytes = decode_hex(s).map_err(|_| invalid(ty, value))?;
            if matches!(ty, ParamType::Bytes) {
                AbiValue::Bytes(bytes)
            } else {
                AbiValue::FixedBytes(bytes)
            }
        }
        ParamType::String => AbiValue::String(
            value
                .as_str()
                .ok_or_else(|| invalid(ty, value))?
                .to_string(),
        ),
        ParamType::FixedArray(inner, _) | ParamType::DynamicArray(inner) => {
            let items = value.as_array().ok_or_else(|| invalid(ty, value))?;
            AbiValue::Array(
                items
                    .iter()
                    .map(|item| value_from_json(item, inner))
                    .collect::<Result<_, _>>()?,
            )
        }
        ParamType::Tuple(types) => {
            let items = value.as_array().ok_or_else(|| invalid(ty, value))?;
            if items.len() != types.len() {
                return Err(AbiError::ArityMismatch {
                    expected: types.len(),
                    found: items.len(),
                });
            }
            AbiValue::Tuple(
                items
                    .iter()
                    .zip(types)
                    .map(|(item, t)| value_from_json(item, t))
                    .collect::<Result<_, _>>()?,
            )
        }
    };
    converted.type_check(ty)?;
    Ok(converted)
}

/// Converts a list of JSON values positionally.
pub fn values_from_json(values: &[Value], types: &[ParamType]) -> Result<Vec<AbiValue>, AbiError> {
    if values.len() != types.len() {
        return Err(AbiError::ArityMismatch {
            expected: types.len(),
            found: values.len(),
        });
    }
    values
        .iter()
        .zip(types)
        .map(|(v, t)| value_from_json(v, t))
        .collect()
}

/// Renders an [`AbiValue`] as JSON. Integers become decimal strings.
pub fn value_to_json(value: &AbiValue) -> Value {
    match value {
        AbiValue::Uint(v) => Value::String(v.to_string()),
        AbiValue::Int(v) => Value::String(v.to_string()),
        AbiValue::Address(addr) => Value::String(to_checksum(addr)),
        AbiValue::Bool(b) => Value::Bool(*b),
        AbiValue::FixedBytes(data) | AbiValue::Bytes(data) => Value::String(encode_hex(data)),
        AbiValue::String(s) => Value::String(s.clone()),
        AbiValue::Array(items) | AbiValue::Tuple(items) => {
            Value::Array(items.iter().map(value_to_json).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ERC20_FRAGMENT: &str = r#"[
        {"type":"function","name":"transfer","stateMutability":"nonpayable",
         "inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],
         "outputs":[{"name":"","type":"bool"}]},
        {"type":"event","name":"Transfer","anonymous":false,
         "inputs":[{"name":"from","type":"address","indexed":true},
                   {"name":"to","type":"address","indexed":true},
                   {"name":"value","type":"uint256","indexed":false}]},
        {"type":"constructor","inputs":[{"name":"supply","type":"uint256"}]},
        {"type":"error","name":"InsufficientBalance",
         "inputs":[{"name":"available","type":"uint256"},{"name":"required","type":"uint256"}]},
        {"type":"receive","stateMutability":"payable"},
        {"type":"fallback","stateMutability":"nonpayable"}
    ]"#;

    #[test]
    fn test_parse_elements() {
        let elements = parse_abi_json(ERC20_FRAGMENT).unwrap();
        assert_eq!(elements.len(), 6);
        match &elements[0] {
            AbiElement::Function(f) => {
                assert_eq!(f.signature(), "transfer(address,uint256)");
                assert_eq!(f.outputs.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
        match &elements[1] {
            AbiElement::Event(e) => {
                assert!(e.inputs[0].indexed);
                assert!(!e.inputs[2].indexed);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(elements[4], AbiElement::Receive));
    }

    #[test]
    fn test_missing_type_defaults_to_function() {
        let elements = parse_abi_json(
            r#"[{"name":"owner","inputs":[],"outputs":[{"type":"address"}],"constant":true,"extra":1}]"#,
        )
        .unwrap();
        match &elements[0] {
            AbiElement::Function(f) => {
                assert_eq!(f.name, "owner");
                assert_eq!(f.state_mutability, StateMutability::View);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_tuple_components() {
        let elements = parse_abi_json(
            r#"[{"type":"function","name":"submit","inputs":[
                {"name":"orders","type":"tuple[]","components":[
                    {"name":"maker","type":"address"},
                    {"name":"legs","type":"tuple[2]","components":[{"name":"x","type":"uint8"}]}
                ]}
            ]}]"#,
        )
        .unwrap();
        match &elements[0] {
            AbiElement::Function(f) => {
                assert_eq!(f.signature(), "submit((address,(uint8)[2])[])")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_artifact_wrapper_and_errors() {
        let elements = parse_abi_json(r#"{"contractName":"X","abi":[{"type":"receive"}]}"#).unwrap();
        assert_eq!(elements, vec![AbiElement::Receive]);

        assert!(matches!(
            parse_abi_json(r#"[{"type":"modifier"}]"#),
            Err(AbiError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_abi_json(r#"[{"type":"function","name":"f","inputs":[{"type":"uint7"}]}]"#),
            Err(AbiError::UnknownType(_))
        ));
    }

    #[test]
    fn test_value_from_json() {
        let ty = ParamType::parse("(uint256,int8,address,bool,bytes2,string)[]").unwrap();
        let value = value_from_json(
            &json!([["1000", -5, "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed", true, "0xabcd", "hi"]]),
            &ty,
        )
        .unwrap();
        let rendered = value_to_json(&value);
        assert_eq!(
            rendered,
            json!([["1000", "-5", "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed", true, "0xabcd", "hi"]])
        );
    }

    #[test]
    fn test_value_from_json_rejects() {
        assert!(value_from_json(&json!("0x1ff"), &ParamType::Uint(8)).is_err());
        assert!(value_from_json(&json!(-1), &ParamType::Uint(256)).is_err());
        assert!(value_from_json(&json!("0xabcd"), &ParamType::FixedBytes(4)).is_err());
        assert!(value_from_json(&json!(1), &ParamType::String).is_err());
        assert!(value_from_json(
            &json!("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD"),
            &ParamType::Address
        )
        .is_err());
    }
}
