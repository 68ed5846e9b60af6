use std::fmt;
use std::sync::Mutex;

use bbox_kit::errors::{BboxError, BboxResult, ErrorAttachments};
use bbox_kit::bbox_error;

use crate::constants::{
    DEVNET_API_URL, DEVNET_CONTRACT_ID, MAINNET_API_URL, MAINNET_CONTRACT_ID, TESTNET_API_URL,
    TESTNET_CONTRACT_ID,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkKey {
    Mainnet,
    Testnet,
    Devnet,
}

impl NetworkKey {
    pub const ALL: [NetworkKey; 3] = [NetworkKey::Mainnet, NetworkKey::Testnet, NetworkKey::Devnet];

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkKey::Mainnet => "mainnet",
            NetworkKey::Testnet => "testnet",
            NetworkKey::Devnet => "devnet",
        }
    }

    pub fn parse(value: &str) -> Option<NetworkKey> {
        NetworkKey::ALL.into_iter().find(|key| key.as_str() == value)
    }
}

impl fmt::Display for NetworkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One deployment environment of the listing contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    pub key: NetworkKey,
    pub contract_id: &'static str,
    pub api_url: &'static str,
}

impl NetworkProfile {
    /// Network handed to wallets when signing: devnet transactions are testnet transactions.
    pub fn signing_network(&self) -> NetworkKey {
        match self.key {
            NetworkKey::Mainnet => NetworkKey::Mainnet,
            NetworkKey::Testnet | NetworkKey::Devnet => NetworkKey::Testnet,
        }
    }
}

lazy_static! {
    pub static ref NETWORK_PROFILES: [NetworkProfile; 3] = [
        NetworkProfile {
            key: NetworkKey::Mainnet,
            contract_id: MAINNET_CONTRACT_ID,
            api_url: MAINNET_API_URL,
        },
        NetworkProfile {
            key: NetworkKey::Testnet,
            contract_id: TESTNET_CONTRACT_ID,
            api_url: TESTNET_API_URL,
        },
        NetworkProfile {
            key: NetworkKey::Devnet,
            contract_id: DEVNET_CONTRACT_ID,
            api_url: DEVNET_API_URL,
        },
    ];
}

pub fn profile_for(key: NetworkKey) -> &'static NetworkProfile {
    match key {
        NetworkKey::Mainnet => &NETWORK_PROFILES[0],
        NetworkKey::Testnet => &NETWORK_PROFILES[1],
        NetworkKey::Devnet => &NETWORK_PROFILES[2],
    }
}

/// Maps a stored preference to a profile. Missing or unknown values resolve to testnet.
pub fn resolve_profile(stored: Option<&str>) -> &'static NetworkProfile {
    let key = stored.and_then(NetworkKey::parse).unwrap_or(NetworkKey::Testnet);
    profile_for(key)
}

pub fn resolve_network(preference: &dyn NetworkPreference) -> &'static NetworkProfile {
    resolve_profile(preference.get().as_deref())
}

/// Single string accessor for the user's persisted network choice.
pub trait NetworkPreference: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, value: &str) -> BboxResult<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryNetworkPreference {
    value: Mutex<Option<String>>,
}

impl InMemoryNetworkPreference {
    pub fn new(value: Option<&str>) -> Self {
        Self { value: Mutex::new(value.map(|v| v.to_string())) }
    }
}

impl NetworkPreference for InMemoryNetworkPreference {
    fn get(&self) -> Option<String> {
        self.value.lock().ok().and_then(|v| v.clone())
    }

    fn set(&self, value: &str) -> BboxResult<()> {
        let mut guard = self
            .value
            .lock()
            .map_err(|e| bbox_error!(BboxError::Config, "network preference poisoned: {}", e))?;
        *guard = Some(value.to_string());
        Ok(())
    }
}

/// `principal.name` pair. A missing name is carried through as `None` and rejected by
/// [`ContractIdentifier::require_name`] at the point of use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractIdentifier {
    pub address: String,
    pub name: Option<String>,
}

impl ContractIdentifier {
    pub fn parse(contract_id: &str) -> ContractIdentifier {
        match contract_id.split_once('.') {
            Some((address, name)) => ContractIdentifier {
                address: address.to_string(),
                name: Some(name.to_string()),
            },
            None => ContractIdentifier { address: contract_id.to_string(), name: None },
        }
    }

    pub fn require_name(&self) -> BboxResult<&str> {
        match self.name.as_deref() {
            Some(name) => Ok(name),
            None => Err(bbox_error!(
                BboxError::Config,
                "contract identifier '{}' has no contract name",
                self.address
            ))
            .with_documentation("Contract identifiers must be formatted as <principal>.<name>"),
        }
    }
}

impl fmt::Display for ContractIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}.{}", self.address, name),
            None => write!(f, "{}", self.address),
        }
    }
}

pub fn contract_identifier_for(profile: &NetworkProfile) -> ContractIdentifier {
    ContractIdentifier::parse(profile.contract_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("mainnet", NetworkKey::Mainnet)]
    #[test_case("testnet", NetworkKey::Testnet)]
    #[test_case("devnet", NetworkKey::Devnet)]
    fn resolves_known_keys(stored: &str, expected: NetworkKey) {
        let preference = InMemoryNetworkPreference::new(Some(stored));
        assert_eq!(resolve_network(&preference).key, expected);
    }

    #[test_case(Some("regtest"))]
    #[test_case(Some("Mainnet"))]
    #[test_case(Some(""))]
    #[test_case(None)]
    fn unknown_keys_fall_back_to_testnet(stored: Option<&str>) {
        let preference = InMemoryNetworkPreference::new(stored);
        let profile = resolve_network(&preference);
        assert_eq!(profile.key, NetworkKey::Testnet);
        assert_eq!(profile.api_url, TESTNET_API_URL);
    }

    #[test]
    fn preference_updates_are_observed() {
        let preference = InMemoryNetworkPreference::default();
        assert_eq!(resolve_network(&preference).key, NetworkKey::Testnet);
        preference.set("mainnet").unwrap();
        assert_eq!(resolve_network(&preference).key, NetworkKey::Mainnet);
    }

    #[test]
    fn splits_contract_identifier() {
        let id = ContractIdentifier::parse("ADDR.name");
        assert_eq!(id.address, "ADDR");
        assert_eq!(id.name.as_deref(), Some("name"));
        assert_eq!(id.to_string(), "ADDR.name");
    }

    #[test]
    fn splits_on_first_dot_only() {
        let id = ContractIdentifier::parse("ADDR.name.v2");
        assert_eq!(id.address, "ADDR");
        assert_eq!(id.name.as_deref(), Some("name.v2"));
    }

    #[test]
    fn missing_name_is_kept_as_none() {
        let id = ContractIdentifier::parse("ADDR");
        assert_eq!(id.address, "ADDR");
        assert_eq!(id.name, None);
        let error = id.require_name().unwrap_err();
        assert_eq!(*error.current_context(), BboxError::Config);
    }

    #[test]
    fn devnet_signs_as_testnet() {
        assert_eq!(profile_for(NetworkKey::Devnet).signing_network(), NetworkKey::Testnet);
        assert_eq!(profile_for(NetworkKey::Mainnet).signing_network(), NetworkKey::Mainnet);
        let id = contract_identifier_for(profile_for(NetworkKey::Devnet));
        assert_eq!(id.name.as_deref(), Some("bbox"));
    }
}
