use std::fmt;

use bbox_kit::bbox_error;
use bbox_kit::errors::{BboxError, BboxResult};
use bbox_kit::num_bigint::BigUint;

use crate::codec::NormalizedValue;
use crate::constants::{DEFAULT_LISTING_FEE_AMOUNT, DEFAULT_LISTING_FEE_TOKEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteKind {
    Upvote,
    Downvote,
}

impl VoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteKind::Upvote => "upvote",
            VoteKind::Downvote => "downvote",
        }
    }

    pub fn parse(value: &str) -> Option<VoteKind> {
        match value {
            "upvote" => Some(VoteKind::Upvote),
            "downvote" => Some(VoteKind::Downvote),
            _ => None,
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fee a publisher pays to list an app, `amount` in the token's smallest unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFee {
    pub token: String,
    pub amount: BigUint,
}

impl ListingFee {
    /// Served whenever the contract cannot be queried or answers with something unusable.
    pub fn fallback() -> ListingFee {
        ListingFee {
            token: DEFAULT_LISTING_FEE_TOKEN.to_string(),
            amount: BigUint::from(DEFAULT_LISTING_FEE_AMOUNT),
        }
    }

    pub fn from_normalized(value: &NormalizedValue) -> BboxResult<ListingFee> {
        let NormalizedValue::Record(fields) = value else {
            return Err(bbox_error!(
                BboxError::UnexpectedResponseShape,
                "listing fee is not a record: {:?}",
                value
            ));
        };
        let token = match fields.get("token") {
            Some(NormalizedValue::String(token)) => token.clone(),
            other => {
                return Err(bbox_error!(
                    BboxError::UnexpectedResponseShape,
                    "listing fee token is not a string: {:?}",
                    other
                ))
            }
        };
        let amount = match fields.get("amount") {
            Some(NormalizedValue::UInt(amount)) => amount.clone(),
            Some(NormalizedValue::String(digits)) => digits.parse::<BigUint>().map_err(|e| {
                bbox_error!(
                    BboxError::MalformedContractResponse,
                    "listing fee amount '{}' is not an integer: {}",
                    digits,
                    e
                )
            })?,
            other => {
                return Err(bbox_error!(
                    BboxError::UnexpectedResponseShape,
                    "listing fee amount is not an unsigned integer: {:?}",
                    other
                ))
            }
        };
        Ok(ListingFee { token, amount })
    }
}
