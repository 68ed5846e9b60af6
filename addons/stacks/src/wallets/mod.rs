use std::fmt;
use std::sync::{Arc, Mutex};

use serde_json::Value as JsonValue;

use crate::rpc::RpcFuture;

pub mod web_wallet;

pub use web_wallet::{
    AppDetails, ContractCallCallbacks, ContractCallFlow, ContractCallOptions, ContractCallRequest,
    FinishedContractCall, PostConditionMode, RelayedContractCallFlow,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletProviderKind {
    /// Exposes a generic `request(method, params)` surface
    Leather,
    /// Marker consumed by the generic signing flow
    StacksProvider,
    Xverse,
}

impl fmt::Display for WalletProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletProviderKind::Leather => write!(f, "Leather"),
            WalletProviderKind::StacksProvider => write!(f, "Stacks provider"),
            WalletProviderKind::Xverse => write!(f, "Xverse"),
        }
    }
}

/// Direct RPC surface of a wallet extension.
pub trait RpcWalletProvider: Send + Sync {
    fn request(&self, method: &str, params: JsonValue) -> RpcFuture<JsonValue>;
}

/// Capability marker for one detected provider family.
#[derive(Clone)]
pub enum WalletProviderHandle {
    Leather(Arc<dyn RpcWalletProvider>),
    StacksProvider,
    Xverse,
}

impl WalletProviderHandle {
    pub fn kind(&self) -> WalletProviderKind {
        match self {
            WalletProviderHandle::Leather(_) => WalletProviderKind::Leather,
            WalletProviderHandle::StacksProvider => WalletProviderKind::StacksProvider,
            WalletProviderHandle::Xverse => WalletProviderKind::Xverse,
        }
    }

    pub fn rpc(&self) -> Option<&Arc<dyn RpcWalletProvider>> {
        match self {
            WalletProviderHandle::Leather(provider) => Some(provider),
            _ => None,
        }
    }
}

impl fmt::Debug for WalletProviderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WalletProviderHandle({})", self.kind())
    }
}

/// Injected view of the wallet providers available to the host.
pub trait WalletProviderRegistry: Send + Sync {
    /// Whether the host can make network calls and host wallet providers at all.
    fn supports_wallet_interaction(&self) -> bool;

    /// Providers installed right now. Queried on every submission attempt since
    /// extensions come and go between attempts.
    fn detect(&self) -> Vec<WalletProviderHandle>;
}

/// Registry backed by an explicit, mutable list of providers.
#[derive(Default)]
pub struct StaticWalletRegistry {
    providers: Mutex<Vec<WalletProviderHandle>>,
}

impl StaticWalletRegistry {
    pub fn new(providers: Vec<WalletProviderHandle>) -> Self {
        Self { providers: Mutex::new(providers) }
    }

    pub fn install(&self, provider: WalletProviderHandle) {
        if let Ok(mut providers) = self.providers.lock() {
            providers.retain(|p| p.kind() != provider.kind());
            providers.push(provider);
        }
    }

    pub fn remove(&self, kind: WalletProviderKind) {
        if let Ok(mut providers) = self.providers.lock() {
            providers.retain(|p| p.kind() != kind);
        }
    }
}

impl WalletProviderRegistry for StaticWalletRegistry {
    fn supports_wallet_interaction(&self) -> bool {
        true
    }

    fn detect(&self) -> Vec<WalletProviderHandle> {
        self.providers.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

/// Non-interactive host: no network bindings, no wallets.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessEnvironment;

impl WalletProviderRegistry for HeadlessEnvironment {
    fn supports_wallet_interaction(&self) -> bool {
        false
    }

    fn detect(&self) -> Vec<WalletProviderHandle> {
        vec![]
    }
}
