//! Canonical JSON coding of variant values.
//!
//! The canonical form is a dictionary carrying an explicit type code:
//! `{ "type": "int", "value": 10 }` for atoms and
//! `{ "type": "int_array", "items": [10, 20] }` for arrays. Points
//! serialize as two-element numeric arrays. A compatibility decoder also
//! accepts a "coalesced" bare JSON value and infers the variant type from
//! the JSON shape.

use std::fmt;

use atelier_types::{AtomArray, AtomValue, Variant};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Failures of variant decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodingError {
    /// The `type` field names no known type code.
    #[error("unknown value type code {0:?}")]
    UnknownTypeCode(String),

    /// The payload does not fit the declared or inferred type.
    #[error("malformed value: expected {0}")]
    Malformed(&'static str),
}

fn point_value(x: f64, y: f64) -> Value {
    json!([x, y])
}

/// Encodes a variant into its canonical JSON form.
pub fn encode_variant(variant: &Variant) -> Value {
    match variant {
        Variant::Atom(atom) => {
            let (code, value) = match atom {
                AtomValue::Bool(flag) => ("bool", json!(flag)),
                AtomValue::Int(value) => ("int", json!(value)),
                AtomValue::Double(value) => ("float", json!(value)),
                AtomValue::String(text) => ("string", json!(text)),
                AtomValue::Point(x, y) => ("point", point_value(*x, *y)),
            };
            json!({ "type": code, "value": value })
        }
        Variant::Array(array) => {
            let (code, items) = match array {
                AtomArray::Bool(items) => ("bool_array", json!(items)),
                AtomArray::Int(items) => ("int_array", json!(items)),
                AtomArray::Double(items) => ("float_array", json!(items)),
                AtomArray::String(items) => ("string_array", json!(items)),
                AtomArray::Point(items) => (
                    "point_array",
                    Value::Array(items.iter().map(|(x, y)| point_value(*x, *y)).collect()),
                ),
            };
            json!({ "type": code, "items": items })
        }
    }
}

fn decode_point(value: &Value) -> Result<(f64, f64), CodingError> {
    let expected = "a two-element numeric array";
    let items = value.as_array().ok_or(CodingError::Malformed(expected))?;
    match items.as_slice() {
        [x, y] => {
            let x = x.as_f64().ok_or(CodingError::Malformed(expected))?;
            let y = y.as_f64().ok_or(CodingError::Malformed(expected))?;
            Ok((x, y))
        }
        _ => Err(CodingError::Malformed(expected)),
    }
}

fn decode_typed(code: &str, payload: &Value) -> Result<Variant, CodingError> {
    let atom = |value: AtomValue| Ok(Variant::Atom(value));
    match code {
        "bool" => atom(AtomValue::Bool(
            payload
                .as_bool()
                .ok_or(CodingError::Malformed("a boolean"))?,
        )),
        "int" => atom(AtomValue::Int(
            payload
                .as_i64()
                .ok_or(CodingError::Malformed("an integer"))?,
        )),
        "float" => atom(AtomValue::Double(
            payload.as_f64().ok_or(CodingError::Malformed("a number"))?,
        )),
        "string" => atom(AtomValue::String(
            payload
                .as_str()
                .ok_or(CodingError::Malformed("a string"))?
                .to_string(),
        )),
        "point" => {
            let (x, y) = decode_point(payload)?;
            atom(AtomValue::Point(x, y))
        }
        "bool_array" | "int_array" | "float_array" | "string_array" | "point_array" => {
            let items = payload
                .as_array()
                .ok_or(CodingError::Malformed("an array"))?;
            decode_array(code, items)
        }
        _ => Err(CodingError::UnknownTypeCode(code.to_string())),
    }
}

fn decode_array(code: &str, items: &[Value]) -> Result<Variant, CodingError> {
    let array = match code {
        "bool_array" => AtomArray::Bool(
            items
                .iter()
                .map(|item| item.as_bool().ok_or(CodingError::Malformed("booleans")))
                .collect::<Result<_, _>>()?,
        ),
        "int_array" => AtomArray::Int(
            items
                .iter()
                .map(|item| item.as_i64().ok_or(CodingError::Malformed("integers")))
                .collect::<Result<_, _>>()?,
        ),
        "float_array" => AtomArray::Double(
            items
                .iter()
                .map(|item| item.as_f64().ok_or(CodingError::Malformed("numbers")))
                .collect::<Result<_, _>>()?,
        ),
        "string_array" => AtomArray::String(
            items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or(CodingError::Malformed("strings"))
                })
                .collect::<Result<_, _>>()?,
        ),
        "point_array" => AtomArray::Point(
            items
                .iter()
                .map(decode_point)
                .collect::<Result<_, _>>()?,
        ),
        _ => return Err(CodingError::UnknownTypeCode(code.to_string())),
    };
    Ok(Variant::Array(array))
}

/// Decodes a coalesced bare JSON value, inferring the variant type from
/// the JSON shape.
fn decode_coalesced(value: &Value) -> Result<Variant, CodingError> {
    match value {
        Value::Bool(flag) => Ok(Variant::Atom(AtomValue::Bool(*flag))),
        Value::Number(number) => {
            if let Some(value) = number.as_i64() {
                Ok(Variant::Atom(AtomValue::Int(value)))
            } else {
                let value = number
                    .as_f64()
                    .ok_or(CodingError::Malformed("a representable number"))?;
                Ok(Variant::Atom(AtomValue::Double(value)))
            }
        }
        Value::String(text) => Ok(Variant::Atom(AtomValue::String(text.clone()))),
        Value::Array(items) => {
            if items.iter().all(Value::is_boolean) {
                decode_array("bool_array", items)
            } else if items.iter().all(|item| item.as_i64().is_some()) {
                decode_array("int_array", items)
            } else if items.iter().all(Value::is_number) {
                decode_array("float_array", items)
            } else if items.iter().all(Value::is_string) {
                decode_array("string_array", items)
            } else if items.iter().all(Value::is_array) {
                decode_array("point_array", items)
            } else {
                Err(CodingError::Malformed("a homogeneous array"))
            }
        }
        _ => Err(CodingError::Malformed("a scalar or an array")),
    }
}

/// Decodes a JSON value into a variant: the canonical typed dictionary,
/// or a coalesced bare value.
pub fn decode_variant(value: &Value) -> Result<Variant, CodingError> {
    if let Value::Object(map) = value {
        if let Some(code) = map.get("type").and_then(Value::as_str) {
            let payload = map
                .get("value")
                .or_else(|| map.get("items"))
                .ok_or(CodingError::Malformed("a value or items field"))?;
            return decode_typed(code, payload);
        }
    }
    decode_coalesced(value)
}

/// A variant with the canonical JSON encoding attached.
#[derive(Clone, Debug, PartialEq)]
pub struct CodedValue(pub Variant);

impl From<Variant> for CodedValue {
    fn from(variant: Variant) -> Self {
        CodedValue(variant)
    }
}

impl fmt::Display for CodedValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for CodedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        encode_variant(&self.0).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CodedValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<CodedValue, D::Error> {
        let value = Value::deserialize(deserializer)?;
        decode_variant(&value)
            .map(CodedValue)
            .map_err(serde::de::Error::custom)
    }
}
