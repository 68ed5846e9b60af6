use std::future::Future;
use std::pin::Pin;

use bbox_kit::bbox_error;
use bbox_kit::errors::{BboxError, BboxResult, HttpStatus, RpcContext};
use bbox_kit::reqwest::Client;
use serde_json::{json, Value as JsonValue};

pub type RpcFuture<T> = Pin<Box<dyn Future<Output = BboxResult<T>> + Send>>;

/// A read-only contract call, arguments already hex encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOnlyCall {
    pub api_url: String,
    pub contract_address: String,
    pub contract_name: String,
    pub function: String,
    pub arguments: Vec<String>,
    pub sender: String,
}

impl ReadOnlyCall {
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v2/contracts/call-read/{}/{}/{}",
            self.api_url, self.contract_address, self.contract_name, self.function
        )
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ReadOnlyCallResponse {
    pub okay: bool,
    #[serde(default)]
    pub result: Option<JsonValue>,
    #[serde(default)]
    pub cause: Option<String>,
}

/// The two endpoints of the read-only API the listing client needs.
pub trait ReadOnlyApi: Send + Sync {
    fn call_read_only(&self, call: ReadOnlyCall) -> RpcFuture<ReadOnlyCallResponse>;

    /// Status code of `GET /v2/contracts/interface/{address}/{name}`.
    fn contract_interface_status(
        &self,
        api_url: &str,
        contract_address: &str,
        contract_name: &str,
    ) -> RpcFuture<u16>;
}

#[derive(Clone, Debug, Default)]
pub struct StacksRpc {
    pub client: Client,
}

impl StacksRpc {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

impl ReadOnlyApi for StacksRpc {
    fn call_read_only(&self, call: ReadOnlyCall) -> RpcFuture<ReadOnlyCallResponse> {
        let client = self.client.clone();
        Box::pin(async move {
            let path = call.endpoint();
            let rpc_context = RpcContext { endpoint: path.clone(), method: "POST".into() };
            let res = client
                .post(&path)
                .json(&json!({
                    "sender": call.sender,
                    "arguments": call.arguments,
                }))
                .send()
                .await
                .map_err(|e| {
                    bbox_error!(BboxError::Rpc, "failed to call {}: {}", call.function, e)
                        .attach(rpc_context.clone())
                })?;

            let status = res.status();
            if !status.is_success() {
                let message = res.text().await.unwrap_or_default();
                return Err(bbox_error!(
                    BboxError::Rpc,
                    "read-only call to {} failed ({}): {}",
                    call.function,
                    status.as_u16(),
                    message
                )
                .attach(HttpStatus(status.as_u16()))
                .attach(rpc_context));
            }

            res.json::<ReadOnlyCallResponse>().await.map_err(|e| {
                bbox_error!(BboxError::UnexpectedResponseShape, "invalid read-only envelope: {}", e)
                    .attach(rpc_context)
            })
        })
    }

    fn contract_interface_status(
        &self,
        api_url: &str,
        contract_address: &str,
        contract_name: &str,
    ) -> RpcFuture<u16> {
        let client = self.client.clone();
        let path = format!("{}/v2/contracts/interface/{}/{}", api_url, contract_address, contract_name);
        Box::pin(async move {
            let res = client.get(&path).send().await.map_err(|e| {
                bbox_error!(BboxError::Rpc, "failed to reach {}: {}", path, e)
                    .attach(RpcContext { endpoint: path.clone(), method: "GET".into() })
            })?;
            Ok(res.status().as_u16())
        })
    }
}
