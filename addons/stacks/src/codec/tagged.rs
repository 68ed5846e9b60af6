//! Decoder for clarity values the read-only API hands back already parsed.
//!
//! Three dialects are accepted: the short string tags (`uint`, `ascii`, `tuple`, ...),
//! the type-signature tags of the JSON repr (`(string-ascii 4)`, `(tuple ...)`), and the
//! numeric type ids of older SDK releases.

use std::collections::BTreeMap;
use std::str::FromStr;

use bbox_kit::bbox_error;
use bbox_kit::errors::{BboxError, BboxResult};
use bbox_kit::num_bigint::{BigInt, BigUint};
use serde_json::{Map, Value as JsonValue};

use super::normalize::NormalizedValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Int,
    UInt,
    Bool(Option<bool>),
    String,
    Buffer,
    Principal,
    None,
    Wrapped,
    List,
    Tuple,
}

const PAYLOAD_KEYS: [&str; 4] = ["value", "data", "list", "buffer"];

fn parse_tag(raw: &str) -> Option<Tag> {
    let word = raw
        .trim()
        .trim_start_matches('(')
        .split(|c: char| c.is_whitespace() || c == '(' || c == ')')
        .next()?;
    let tag = match word {
        "int" => Tag::Int,
        "uint" => Tag::UInt,
        "bool" => Tag::Bool(None),
        "true" => Tag::Bool(Some(true)),
        "false" => Tag::Bool(Some(false)),
        "ascii" | "utf8" | "string-ascii" | "string-utf8" => Tag::String,
        "buffer" | "buff" => Tag::Buffer,
        "address" | "contract" | "principal" => Tag::Principal,
        "none" => Tag::None,
        "some" | "ok" | "err" | "optional" | "response" => Tag::Wrapped,
        "list" => Tag::List,
        "tuple" => Tag::Tuple,
        _ => return None,
    };
    Some(tag)
}

fn numeric_tag(id: u64) -> Option<Tag> {
    let tag = match id {
        0 => Tag::Int,
        1 => Tag::UInt,
        2 => Tag::Buffer,
        3 => Tag::Bool(Some(true)),
        4 => Tag::Bool(Some(false)),
        7 | 8 | 10 => Tag::Wrapped,
        9 => Tag::None,
        11 => Tag::List,
        12 => Tag::Tuple,
        13 | 14 => Tag::String,
        // 5 and 6 carry structured principals
        _ => return None,
    };
    Some(tag)
}

fn tag_of(map: &Map<String, JsonValue>) -> Option<Tag> {
    match map.get("type")? {
        JsonValue::String(raw) => parse_tag(raw),
        JsonValue::Number(id) => id.as_u64().and_then(numeric_tag),
        _ => None,
    }
}

pub fn has_known_tag(map: &Map<String, JsonValue>) -> bool {
    tag_of(map).is_some()
}

fn payload(map: &Map<String, JsonValue>) -> Option<&JsonValue> {
    PAYLOAD_KEYS.iter().find_map(|key| map.get(*key))
}

fn malformed(tag: Tag, found: Option<&JsonValue>) -> bbox_kit::error_stack::Report<BboxError> {
    match found {
        Some(found) => bbox_error!(
            BboxError::MalformedContractResponse,
            "unexpected payload {} for {:?} value",
            found,
            tag
        ),
        None => bbox_error!(BboxError::MalformedContractResponse, "missing payload for {:?} value", tag),
    }
}

/// Decodes any JSON value: tagged objects by their tag, everything else structurally.
pub fn decode_value(value: &JsonValue) -> BboxResult<NormalizedValue> {
    match value {
        JsonValue::Object(map) if map.contains_key("type") => match tag_of(map) {
            Some(tag) => decode_tagged(tag, map),
            None => Err(bbox_error!(
                BboxError::UnexpectedResponseShape,
                "unrecognized type discriminator {}",
                map.get("type").cloned().unwrap_or(JsonValue::Null)
            )),
        },
        JsonValue::Object(map) => decode_record(map),
        JsonValue::String(value) => Ok(NormalizedValue::String(value.clone())),
        JsonValue::Number(number) => parse_integer(&number.to_string()),
        JsonValue::Bool(value) => Ok(NormalizedValue::Bool(*value)),
        JsonValue::Null => Ok(NormalizedValue::None),
        JsonValue::Array(values) => {
            let values = values.iter().map(decode_value).collect::<BboxResult<Vec<_>>>()?;
            Ok(NormalizedValue::List(values))
        }
    }
}

fn decode_tagged(tag: Tag, map: &Map<String, JsonValue>) -> BboxResult<NormalizedValue> {
    let found = payload(map);
    match tag {
        Tag::UInt => match found {
            Some(JsonValue::String(digits)) => parse_uint(digits),
            Some(JsonValue::Number(number)) => parse_uint(&number.to_string()),
            _ => Err(malformed(tag, found)),
        },
        Tag::Int => match found {
            Some(JsonValue::String(digits)) => parse_int(digits),
            Some(JsonValue::Number(number)) => parse_int(&number.to_string()),
            _ => Err(malformed(tag, found)),
        },
        Tag::Bool(Some(value)) => Ok(NormalizedValue::Bool(value)),
        Tag::Bool(None) => match found {
            Some(JsonValue::Bool(value)) => Ok(NormalizedValue::Bool(*value)),
            _ => Err(malformed(tag, found)),
        },
        Tag::String | Tag::Principal => match found {
            Some(JsonValue::String(value)) => Ok(NormalizedValue::String(value.clone())),
            _ => Err(malformed(tag, found)),
        },
        Tag::Buffer => match found {
            Some(JsonValue::String(value)) => {
                let raw = value.strip_prefix("0x").unwrap_or(value);
                let bytes = bbox_kit::hex::decode(raw).map_err(|e| {
                    bbox_error!(BboxError::MalformedContractResponse, "invalid buffer: {}", e)
                })?;
                Ok(NormalizedValue::String(format!("0x{}", bbox_kit::hex::encode(bytes))))
            }
            _ => Err(malformed(tag, found)),
        },
        Tag::None => Ok(NormalizedValue::None),
        Tag::Wrapped => match found {
            None | Some(JsonValue::Null) => Ok(NormalizedValue::None),
            Some(inner) => decode_value(inner),
        },
        Tag::List => match found {
            Some(JsonValue::Array(values)) => {
                let values = values.iter().map(decode_value).collect::<BboxResult<Vec<_>>>()?;
                Ok(NormalizedValue::List(values))
            }
            _ => Err(malformed(tag, found)),
        },
        Tag::Tuple => match found {
            Some(JsonValue::Object(fields)) => decode_record(fields),
            _ => Err(malformed(tag, found)),
        },
    }
}

fn is_wrapper(value: &JsonValue) -> bool {
    match value {
        JsonValue::Object(map) => !map.contains_key("type") && map.contains_key("value"),
        _ => false,
    }
}

fn decode_record(map: &Map<String, JsonValue>) -> BboxResult<NormalizedValue> {
    let mut record = BTreeMap::new();
    for (key, value) in map.iter() {
        record.insert(key.clone(), decode_field(key, value)?);
    }
    Ok(NormalizedValue::Record(record))
}

fn decode_field(key: &str, value: &JsonValue) -> BboxResult<NormalizedValue> {
    if !is_wrapper(value) {
        return decode_value(value);
    }
    let inner = &value["value"];
    if is_wrapper(inner) {
        return Err(bbox_error!(
            BboxError::MalformedContractResponse,
            "field '{}' is wrapped more than once",
            key
        ));
    }
    decode_value(inner)
}

fn parse_uint(digits: &str) -> BboxResult<NormalizedValue> {
    BigUint::from_str(digits.trim()).map(NormalizedValue::UInt).map_err(|e| {
        bbox_error!(BboxError::MalformedContractResponse, "invalid unsigned integer '{}': {}", digits, e)
    })
}

fn parse_int(digits: &str) -> BboxResult<NormalizedValue> {
    BigInt::from_str(digits.trim()).map(NormalizedValue::Int).map_err(|e| {
        bbox_error!(BboxError::MalformedContractResponse, "invalid integer '{}': {}", digits, e)
    })
}

fn parse_integer(digits: &str) -> BboxResult<NormalizedValue> {
    if digits.starts_with('-') {
        parse_int(digits)
    } else {
        parse_uint(digits)
    }
}
