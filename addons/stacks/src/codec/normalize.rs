use std::collections::BTreeMap;

use bbox_kit::bbox_error;
use bbox_kit::errors::{BboxError, BboxResult};
use bbox_kit::num_bigint::{BigInt, BigUint};
use serde_json::{Map, Number, Value as JsonValue};

use super::cv::{cv_to_normalized, decode_cv_hex};
use super::tagged;

/// Plain data produced from a contract response.
///
/// The listing fee path only ever deals with `String`, `UInt` and `Record`; the other
/// shapes come out of the optionals, responses and lists returned by the app and vote
/// queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedValue {
    String(String),
    UInt(BigUint),
    Int(BigInt),
    Bool(bool),
    Record(BTreeMap<String, NormalizedValue>),
    List(Vec<NormalizedValue>),
    None,
}

impl NormalizedValue {
    /// Decodes untagged JSON. A record field holding `{ "value": x }` is unwrapped once;
    /// a second wrapper inside it is rejected rather than returned as a non scalar.
    pub fn from_json(value: &JsonValue) -> BboxResult<NormalizedValue> {
        tagged::decode_value(value)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            NormalizedValue::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<&BigUint> {
        match self {
            NormalizedValue::UInt(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            NormalizedValue::Int(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            NormalizedValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&BTreeMap<String, NormalizedValue>> {
        match self {
            NormalizedValue::Record(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<NormalizedValue>> {
        match self {
            NormalizedValue::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&NormalizedValue> {
        self.as_record().and_then(|map| map.get(name))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, NormalizedValue::None)
    }

    /// Integers are emitted as exact JSON numbers.
    pub fn to_json(&self) -> JsonValue {
        match self {
            NormalizedValue::String(value) => JsonValue::String(value.clone()),
            NormalizedValue::UInt(value) => exact_number(value.to_string()),
            NormalizedValue::Int(value) => exact_number(value.to_string()),
            NormalizedValue::Bool(value) => JsonValue::Bool(*value),
            NormalizedValue::Record(map) => {
                let mut object = Map::new();
                for (key, value) in map.iter() {
                    object.insert(key.clone(), value.to_json());
                }
                JsonValue::Object(object)
            }
            NormalizedValue::List(values) => {
                JsonValue::Array(values.iter().map(|v| v.to_json()).collect())
            }
            NormalizedValue::None => JsonValue::Null,
        }
    }
}

fn exact_number(digits: String) -> JsonValue {
    match digits.parse::<Number>() {
        Ok(number) => JsonValue::Number(number),
        Err(_) => JsonValue::String(digits),
    }
}

/// The two wire encodings of a read-only call result.
#[derive(Debug, Clone, PartialEq)]
pub enum ClarityResult {
    /// `0x` prefixed consensus serialization
    Hex(String),
    /// Pre-decoded object carrying a type discriminator
    Tagged(JsonValue),
}

impl ClarityResult {
    pub fn from_json(raw: &JsonValue) -> BboxResult<ClarityResult> {
        match raw {
            JsonValue::String(value) if value.starts_with("0x") => {
                Ok(ClarityResult::Hex(value.clone()))
            }
            JsonValue::Object(map) if tagged::has_known_tag(map) => {
                Ok(ClarityResult::Tagged(raw.clone()))
            }
            _ => Err(bbox_error!(
                BboxError::UnexpectedResponseShape,
                "result is neither a hex encoded nor a tagged clarity value: {}",
                raw
            )),
        }
    }

    pub fn decode(&self) -> BboxResult<NormalizedValue> {
        match self {
            ClarityResult::Hex(hex) => cv_to_normalized(decode_cv_hex(hex)?),
            ClarityResult::Tagged(value) => tagged::decode_value(value),
        }
    }
}

pub fn normalize(raw: &JsonValue) -> BboxResult<NormalizedValue> {
    ClarityResult::from_json(raw)?.decode()
}
