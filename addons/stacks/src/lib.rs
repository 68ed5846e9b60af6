#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate hiro_system_kit;

#[macro_use]
extern crate serde_derive;

pub mod codec;
pub mod constants;
pub mod contract;
pub mod format;
pub mod network;
pub mod rpc;
pub mod submission;
pub mod typing;
pub mod wallets;

#[cfg(test)]
mod tests;

pub use contract::BboxContract;
pub use network::{
    contract_identifier_for, resolve_network, ContractIdentifier, InMemoryNetworkPreference,
    NetworkKey, NetworkPreference, NetworkProfile,
};
pub use submission::{
    ListingSubmitter, SubmissionConfig, SubmissionHandle, SubmissionOutcome, SubmissionStage,
};
pub use typing::{ListingFee, VoteKind};
