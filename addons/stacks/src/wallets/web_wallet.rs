use std::fmt;

use bbox_kit::bbox_error;
use bbox_kit::channel;
use bbox_kit::errors::{BboxError, BboxResult, ErrorAttachments};
use clarity::vm::Value as ClarityValue;

use crate::constants::{DEFAULT_APP_ICON, DEFAULT_APP_NAME};
use crate::network::NetworkKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostConditionMode {
    /// Transfers not covered by a post-condition are allowed
    Allow,
    /// Any transfer not covered by a post-condition aborts the transaction
    Deny,
}

/// Identity shown by the wallet while the user reviews the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDetails {
    pub name: String,
    pub icon: String,
}

impl Default for AppDetails {
    fn default() -> Self {
        Self { name: DEFAULT_APP_NAME.to_string(), icon: DEFAULT_APP_ICON.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContractCallOptions {
    pub network: NetworkKey,
    pub contract_address: String,
    pub contract_name: String,
    pub function_name: String,
    pub function_args: Vec<ClarityValue>,
    pub post_condition_mode: PostConditionMode,
    pub app_details: AppDetails,
}

impl ContractCallOptions {
    pub fn validate(&self) -> BboxResult<()> {
        let missing = [
            ("contract address", &self.contract_address),
            ("contract name", &self.contract_name),
            ("function name", &self.function_name),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty());
        match missing {
            Some((field, _)) => Err(bbox_error!(
                BboxError::WalletInvocationFailed,
                "contract call options are missing a {}",
                field
            )),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinishedContractCall {
    pub txid: Option<String>,
}

pub struct ContractCallCallbacks {
    pub on_finish: Box<dyn FnOnce(FinishedContractCall) + Send>,
    pub on_cancel: Box<dyn FnOnce() + Send>,
}

impl fmt::Debug for ContractCallCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContractCallCallbacks")
    }
}

/// Generic sign-and-broadcast flow. `open_contract_call` returns as soon as the signing
/// UI has the request; the outcome only ever arrives through the callbacks.
pub trait ContractCallFlow: Send + Sync {
    fn open_contract_call(
        &self,
        options: ContractCallOptions,
        callbacks: ContractCallCallbacks,
    ) -> BboxResult<()>;
}

/// A pending call handed over to whoever drives the signing UI.
#[derive(Debug)]
pub struct ContractCallRequest {
    pub options: ContractCallOptions,
    pub callbacks: ContractCallCallbacks,
}

impl ContractCallRequest {
    pub fn finish(self, txid: Option<String>) {
        (self.callbacks.on_finish)(FinishedContractCall { txid })
    }

    pub fn cancel(self) {
        (self.callbacks.on_cancel)()
    }
}

/// Relays contract calls over a channel to a supervising signer front end.
#[derive(Clone)]
pub struct RelayedContractCallFlow {
    requests_tx: channel::Sender<ContractCallRequest>,
}

impl RelayedContractCallFlow {
    pub fn new() -> (Self, channel::Receiver<ContractCallRequest>) {
        let (requests_tx, requests_rx) = channel::unbounded();
        (Self { requests_tx }, requests_rx)
    }
}

impl ContractCallFlow for RelayedContractCallFlow {
    fn open_contract_call(
        &self,
        options: ContractCallOptions,
        callbacks: ContractCallCallbacks,
    ) -> BboxResult<()> {
        options.validate()?;
        self.requests_tx
            .send(ContractCallRequest { options, callbacks })
            .map_err(|_| {
                bbox_error!(BboxError::WalletInvocationFailed, "signing front end is not listening")
            })
            .with_documentation("Make sure your wallet extension is installed and unlocked, and that no popup blocker is active.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn options() -> ContractCallOptions {
        ContractCallOptions {
            network: NetworkKey::Testnet,
            contract_address: "ST193GXQTNHVV9WSAPHAB89M6R9QSEXZKS3N9P3DZ".into(),
            contract_name: "bbox".into(),
            function_name: "rate-app".into(),
            function_args: vec![ClarityValue::UInt(1), ClarityValue::UInt(4)],
            post_condition_mode: PostConditionMode::Deny,
            app_details: AppDetails::default(),
        }
    }

    #[test]
    fn relays_requests_and_callbacks() {
        let (flow, requests_rx) = RelayedContractCallFlow::new();
        let finished = Arc::new(Mutex::new(None));
        let finished_inner = finished.clone();
        flow.open_contract_call(
            options(),
            ContractCallCallbacks {
                on_finish: Box::new(move |data| *finished_inner.lock().unwrap() = data.txid),
                on_cancel: Box::new(|| panic!("not cancelled")),
            },
        )
        .unwrap();

        let request = requests_rx.try_recv().unwrap();
        assert_eq!(request.options.function_args.len(), 2);
        request.finish(Some("0xfeed".into()));
        assert_eq!(finished.lock().unwrap().as_deref(), Some("0xfeed"));
    }

    #[test]
    fn fails_when_nobody_listens() {
        let (flow, requests_rx) = RelayedContractCallFlow::new();
        drop(requests_rx);
        let error = flow
            .open_contract_call(
                options(),
                ContractCallCallbacks { on_finish: Box::new(|_| {}), on_cancel: Box::new(|| {}) },
            )
            .unwrap_err();
        assert_eq!(*error.current_context(), BboxError::WalletInvocationFailed);
    }

    #[test]
    fn rejects_incomplete_options() {
        let mut options = options();
        options.contract_name.clear();
        assert!(options.validate().is_err());
    }
}
