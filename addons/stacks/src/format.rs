use bbox_kit::helpers::{format_currency, format_units};
use bbox_kit::num_bigint::BigUint;

use crate::constants::{DEFAULT_LISTING_FEE_TOKEN, EXPLORER_URL, SBTC_DECIMALS};
use crate::network::{contract_identifier_for, NetworkProfile};

pub fn sats_to_btc(sats: &BigUint) -> String {
    format_units(sats, SBTC_DECIMALS)
}

pub fn format_listing_fee(amount: &BigUint, token: &str) -> String {
    if token == DEFAULT_LISTING_FEE_TOKEN {
        return format_currency(amount, SBTC_DECIMALS, token);
    }
    format!("{} {}", amount, token)
}

pub fn explorer_tx_url(txid: &str, network: &str) -> String {
    format!("{}/txid/{}?chain={}", EXPLORER_URL, txid, network)
}

pub fn explorer_contract_url(profile: &NetworkProfile) -> String {
    let contract = contract_identifier_for(profile);
    format!(
        "{}/address/{}?chain={}#{}",
        EXPLORER_URL,
        contract.address,
        profile.key,
        contract.name.unwrap_or_default()
    )
}
