use std::collections::BTreeMap;

use bbox_kit::bbox_error;
use bbox_kit::errors::{BboxError, BboxResult};
use bbox_kit::num_bigint::{BigInt, BigUint};
use clarity::codec::StacksMessageCodec;
use clarity::vm::types::{
    BuffData, CharType, ListData, OptionalData, PrincipalData, ResponseData, SequenceData,
    TupleData, UTF8Data,
};
use clarity::vm::Value as ClarityValue;

use super::normalize::NormalizedValue;

pub fn cv_string_ascii(value: &str) -> BboxResult<ClarityValue> {
    ClarityValue::string_ascii_from_bytes(value.as_bytes().to_vec()).map_err(|e| {
        bbox_error!(BboxError::MalformedContractResponse, "invalid ascii string '{}': {}", value, e)
    })
}

pub fn cv_uint(value: u128) -> ClarityValue {
    ClarityValue::UInt(value)
}

pub fn cv_principal(value: &str) -> BboxResult<ClarityValue> {
    let principal = PrincipalData::parse(value).map_err(|e| {
        bbox_error!(BboxError::MalformedContractResponse, "invalid principal '{}': {}", value, e)
    })?;
    Ok(ClarityValue::Principal(principal))
}

/// `0x` prefixed lowercase hex of the consensus serialization.
pub fn encode_cv_hex(value: &ClarityValue) -> String {
    let bytes = StacksMessageCodec::serialize_to_vec(value);
    format!("0x{}", bbox_kit::hex::encode(bytes))
}

pub fn decode_cv_bytes(bytes: &[u8]) -> BboxResult<ClarityValue> {
    <ClarityValue as StacksMessageCodec>::consensus_deserialize(&mut &bytes[..]).map_err(|e| {
        bbox_error!(BboxError::MalformedContractResponse, "failed to parse clarity value: {}", e)
    })
}

pub fn decode_cv_hex(value: &str) -> BboxResult<ClarityValue> {
    let raw = value.strip_prefix("0x").unwrap_or(value);
    let bytes = bbox_kit::hex::decode(raw).map_err(|e| {
        bbox_error!(BboxError::MalformedContractResponse, "invalid hex encoded value: {}", e)
    })?;
    decode_cv_bytes(&bytes)
}

pub fn cv_to_normalized(clarity_value: ClarityValue) -> BboxResult<NormalizedValue> {
    let value = match clarity_value {
        ClarityValue::Int(val) => NormalizedValue::Int(BigInt::from(val)),
        ClarityValue::UInt(val) => NormalizedValue::UInt(BigUint::from(val)),
        ClarityValue::Bool(val) => NormalizedValue::Bool(val),
        ClarityValue::Sequence(SequenceData::List(ListData { data, .. })) => {
            let values = data
                .into_iter()
                .map(cv_to_normalized)
                .collect::<BboxResult<Vec<_>>>()?;
            NormalizedValue::List(values)
        }
        ClarityValue::Sequence(SequenceData::Buffer(BuffData { data })) => {
            NormalizedValue::String(format!("0x{}", bbox_kit::hex::encode(data)))
        }
        ClarityValue::Sequence(SequenceData::String(CharType::ASCII(ascii))) => {
            let string = String::from_utf8(ascii.data).map_err(|e| {
                bbox_error!(BboxError::MalformedContractResponse, "invalid ascii string: {}", e)
            })?;
            NormalizedValue::String(string)
        }
        ClarityValue::Sequence(SequenceData::String(CharType::UTF8(UTF8Data { data }))) => {
            let string = String::from_utf8(data.concat()).map_err(|e| {
                bbox_error!(BboxError::MalformedContractResponse, "invalid utf8 string: {}", e)
            })?;
            NormalizedValue::String(string)
        }
        ClarityValue::Principal(val) => NormalizedValue::String(val.to_string()),
        ClarityValue::Tuple(TupleData { data_map, .. }) => {
            let mut map = BTreeMap::new();
            for (k, v) in data_map.into_iter() {
                map.insert(k.to_string(), cv_to_normalized(v)?);
            }
            NormalizedValue::Record(map)
        }
        ClarityValue::Optional(OptionalData { data }) => match data {
            Some(value) => cv_to_normalized(*value)?,
            None => NormalizedValue::None,
        },
        ClarityValue::Response(ResponseData { data, .. }) => cv_to_normalized(*data)?,
        ClarityValue::CallableContract(val) => {
            NormalizedValue::String(val.contract_identifier.to_string())
        }
    };
    Ok(value)
}

/// Shortened txid for logs. Wallets hand back opaque strings, so this cuts on char boundaries.
pub fn txid_display_str(txid: &str) -> String {
    let char_count = txid.chars().count();
    if char_count <= 12 {
        return txid.to_string();
    }
    let first_six: String = txid.chars().take(6).collect();
    let last_six: String = txid.chars().skip(char_count - 6).collect();
    format!("{}...{}", first_six, last_six)
}
