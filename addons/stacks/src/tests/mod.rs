use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bbox_kit::bbox_error;
use bbox_kit::errors::{remediation, summary, BboxError, HttpStatus};
use bbox_kit::futures::future;
use bbox_kit::Context;
use serde_json::{json, Value as JsonValue};

use crate::rpc::{ReadOnlyApi, ReadOnlyCall, ReadOnlyCallResponse, RpcFuture};
use crate::wallets::{
    ContractCallCallbacks, ContractCallFlow, ContractCallOptions, ContractCallRequest,
    RpcWalletProvider, StaticWalletRegistry, WalletProviderHandle, WalletProviderRegistry,
};
use crate::{InMemoryNetworkPreference, ListingSubmitter, SubmissionConfig};


#[derive(Clone, Debug)]
pub enum FakeReply {
    Envelope(JsonValue),
    Status(u16),
    Unreachable,
}

/// Scripted read-only API, one reply per contract function.
pub struct FakeReadOnlyApi {
    replies: Mutex<HashMap<String, FakeReply>>,
    interface_reply: Mutex<FakeReply>,
    pub read_calls: AtomicUsize,
    pub interface_checks: AtomicUsize,
    pub calls: Mutex<Vec<ReadOnlyCall>>,
}

impl FakeReadOnlyApi {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(HashMap::new()),
            interface_reply: Mutex::new(FakeReply::Status(200)),
            read_calls: AtomicUsize::new(0),
            interface_checks: AtomicUsize::new(0),
            calls: Mutex::new(vec![]),
        }
    }

    pub fn reply(self, function: &str, reply: FakeReply) -> Self {
        self.replies.lock().unwrap().insert(function.to_string(), reply);
        self
    }

    pub fn interface(self, reply: FakeReply) -> Self {
        *self.interface_reply.lock().unwrap() = reply;
        self
    }

    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub fn interface_checks(&self) -> usize {
        self.interface_checks.load(Ordering::SeqCst)
    }

    pub fn last_call(&self) -> ReadOnlyCall {
        self.calls.lock().unwrap().last().cloned().unwrap()
    }
}

impl ReadOnlyApi for FakeReadOnlyApi {
    fn call_read_only(&self, call: ReadOnlyCall) -> RpcFuture<ReadOnlyCallResponse> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(&call.function)
            .cloned()
            .unwrap_or(FakeReply::Status(404));
        self.calls.lock().unwrap().push(call);
        let result = match reply {
            FakeReply::Envelope(envelope) => serde_json::from_value(envelope)
                .map_err(|e| bbox_error!(BboxError::UnexpectedResponseShape, "{}", e)),
            FakeReply::Status(status) => {
                Err(bbox_error!(BboxError::Rpc, "HTTP {}", status).attach(HttpStatus(status)))
            }
            FakeReply::Unreachable => Err(bbox_error!(BboxError::Rpc, "connection refused")),
        };
        Box::pin(future::ready(result))
    }

    fn contract_interface_status(
        &self,
        _api_url: &str,
        _contract_address: &str,
        _contract_name: &str,
    ) -> RpcFuture<u16> {
        self.interface_checks.fetch_add(1, Ordering::SeqCst);
        let result = match self.interface_reply.lock().unwrap().clone() {
            FakeReply::Status(status) => Ok(status),
            _ => Err(bbox_error!(BboxError::Rpc, "connection refused")),
        };
        Box::pin(future::ready(result))
    }
}

/// Wallet extension exposing `request`, answering every call the same way.
pub struct FakeRpcWallet {
    reply: Result<JsonValue, String>,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<(String, JsonValue)>>,
}

impl FakeRpcWallet {
    pub fn answering(reply: Result<JsonValue, String>) -> Arc<Self> {
        Arc::new(Self { reply, calls: AtomicUsize::new(0), requests: Mutex::new(vec![]) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RpcWalletProvider for FakeRpcWallet {
    fn request(&self, method: &str, params: JsonValue) -> RpcFuture<JsonValue> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push((method.to_string(), params));
        let result = self
            .reply
            .clone()
            .map_err(|e| bbox_error!(BboxError::WalletInvocationFailed, "{}", e));
        Box::pin(future::ready(result))
    }
}

/// Signing flow that keeps every request for the test to settle.
#[derive(Default)]
pub struct RecordingFlow {
    reject: bool,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<ContractCallRequest>>,
}

impl RecordingFlow {
    pub fn rejecting() -> Self {
        Self { reject: true, ..Default::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn take_request(&self) -> ContractCallRequest {
        self.requests.lock().unwrap().remove(0)
    }
}

impl ContractCallFlow for RecordingFlow {
    fn open_contract_call(
        &self,
        options: ContractCallOptions,
        callbacks: ContractCallCallbacks,
    ) -> bbox_kit::errors::BboxResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reject {
            return Err(bbox_error!(BboxError::Config, "popup blocked"));
        }
        self.requests.lock().unwrap().push(ContractCallRequest { options, callbacks });
        Ok(())
    }
}

pub struct Harness {
    pub api: Arc<FakeReadOnlyApi>,
    pub preference: Arc<InMemoryNetworkPreference>,
    pub flow: Arc<RecordingFlow>,
    pub submitter: ListingSubmitter,
}

pub fn harness(
    api: FakeReadOnlyApi,
    wallets: Arc<dyn WalletProviderRegistry>,
    flow: RecordingFlow,
    config: SubmissionConfig,
) -> Harness {
    let api = Arc::new(api);
    let preference = Arc::new(InMemoryNetworkPreference::new(Some("testnet")));
    let flow = Arc::new(flow);
    let submitter = ListingSubmitter::new(
        api.clone(),
        preference.clone(),
        wallets,
        flow.clone(),
        config,
        &logging_context(),
    );
    Harness { api, preference, flow, submitter }
}

/// Terminal logger, so every `try_log` closure runs under test.
pub fn logging_context() -> Context {
    Context::new(hiro_system_kit::log::setup_logger())
}

pub fn wallets(providers: Vec<WalletProviderHandle>) -> Arc<dyn WalletProviderRegistry> {
    Arc::new(StaticWalletRegistry::new(providers))
}

pub fn envelope(result: JsonValue) -> FakeReply {
    FakeReply::Envelope(json!({ "okay": true, "result": result }))
}

#[test]
fn fake_errors_render_for_display() {
    let error = bbox_error!(BboxError::Rpc, "HTTP {}", 500).attach(HttpStatus(500));
    assert_eq!(summary(&error), "Read-only API request failed: HTTP 500");
    assert!(remediation(&error).is_none());
}
