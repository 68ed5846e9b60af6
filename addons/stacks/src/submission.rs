use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context as TaskContext, Poll};

use bbox_kit::bbox_error;
use bbox_kit::error_stack::Report;
use bbox_kit::errors::{summary, BboxError, BboxResult, ErrorAttachments, HttpStatus};
use bbox_kit::futures::channel::oneshot;
use bbox_kit::Context;
use clarity::vm::Value as ClarityValue;
use serde_json::json;

use crate::codec::cv::{cv_string_ascii, cv_uint, encode_cv_hex, txid_display_str};
use crate::constants::{
    FN_RATE_APP, FN_SUBMIT_APP, FN_VOTE_APP, LEATHER_INSTALL_URL, MAX_RATING, MIN_RATING,
    STX_CALL_CONTRACT_METHOD,
};
use crate::network::{
    contract_identifier_for, resolve_network, ContractIdentifier, NetworkPreference,
    NetworkProfile,
};
use crate::rpc::ReadOnlyApi;
use crate::typing::VoteKind;
use crate::wallets::{
    AppDetails, ContractCallCallbacks, ContractCallFlow, ContractCallOptions,
    FinishedContractCall, PostConditionMode, RpcWalletProvider, WalletProviderRegistry,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionConfig {
    /// Try the provider's `stx_callContract` method before the generic signing flow
    pub use_rpc_strategy: bool,
    pub app_details: AppDetails,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self { use_rpc_strategy: false, app_details: AppDetails::default() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    Idle,
    PreconditionChecking,
    RpcAttempting,
    FlowAttempting,
    AwaitingUserSignature,
    Success,
    Cancelled,
    Failed,
}

impl fmt::Display for SubmissionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SubmissionStage::Idle => "idle",
            SubmissionStage::PreconditionChecking => "checking preconditions",
            SubmissionStage::RpcAttempting => "attempting wallet rpc",
            SubmissionStage::FlowAttempting => "opening signing flow",
            SubmissionStage::AwaitingUserSignature => "awaiting user signature",
            SubmissionStage::Success => "success",
            SubmissionStage::Cancelled => "cancelled",
            SubmissionStage::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug)]
pub enum SubmissionOutcome {
    Success(String),
    Cancelled,
    Failed(Report<BboxError>),
}

impl SubmissionOutcome {
    pub fn stage(&self) -> SubmissionStage {
        match self {
            SubmissionOutcome::Success(_) => SubmissionStage::Success,
            SubmissionOutcome::Cancelled => SubmissionStage::Cancelled,
            SubmissionOutcome::Failed(_) => SubmissionStage::Failed,
        }
    }

    pub fn txid(&self) -> Option<&str> {
        match self {
            SubmissionOutcome::Success(txid) => Some(txid.as_str()),
            _ => None,
        }
    }
}

/// Resolves once the user signed, rejected or abandoned the call.
///
/// There is no timeout: a signing prompt the user never answers keeps the handle pending.
/// Dropping the handle only stops listening for the outcome.
#[derive(Debug)]
pub struct SubmissionHandle {
    outcome_rx: oneshot::Receiver<SubmissionOutcome>,
}

impl SubmissionHandle {
    fn pending() -> (oneshot::Sender<SubmissionOutcome>, SubmissionHandle) {
        let (outcome_tx, outcome_rx) = oneshot::channel();
        (outcome_tx, SubmissionHandle { outcome_rx })
    }

    pub fn ready(outcome: SubmissionOutcome) -> SubmissionHandle {
        let (outcome_tx, handle) = SubmissionHandle::pending();
        let _ = outcome_tx.send(outcome);
        handle
    }

    /// Callback style completion: `on_success(txid)` or `on_cancel()`, failures returned.
    pub async fn on_completion<S, C>(self, on_success: S, on_cancel: C) -> BboxResult<()>
    where
        S: FnOnce(String),
        C: FnOnce(),
    {
        match self.await {
            SubmissionOutcome::Success(txid) => {
                on_success(txid);
                Ok(())
            }
            SubmissionOutcome::Cancelled => {
                on_cancel();
                Ok(())
            }
            SubmissionOutcome::Failed(report) => Err(report),
        }
    }
}

impl Future for SubmissionHandle {
    type Output = SubmissionOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.outcome_rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            // the signing flow dropped both callbacks without calling either
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(SubmissionOutcome::Cancelled),
            Poll::Pending => Poll::Pending,
        }
    }
}

type SharedOutcomeSender = Arc<Mutex<Option<oneshot::Sender<SubmissionOutcome>>>>;

fn complete(ctx: &Context, sender: &SharedOutcomeSender, outcome: SubmissionOutcome) {
    ctx.try_log(|logger| {
        debug!(
            logger,
            "submission: {} -> {}",
            SubmissionStage::AwaitingUserSignature,
            outcome.stage()
        )
    });
    if let Ok(mut guard) = sender.lock() {
        if let Some(outcome_tx) = guard.take() {
            let _ = outcome_tx.send(outcome);
        }
    }
}

/// Write side of the listing contract.
///
/// Holds no state between calls: two submissions of the same hash both proceed.
pub struct ListingSubmitter {
    api: Arc<dyn ReadOnlyApi>,
    preference: Arc<dyn NetworkPreference>,
    wallets: Arc<dyn WalletProviderRegistry>,
    flow: Arc<dyn ContractCallFlow>,
    config: SubmissionConfig,
    ctx: Context,
}

impl ListingSubmitter {
    pub fn new(
        api: Arc<dyn ReadOnlyApi>,
        preference: Arc<dyn NetworkPreference>,
        wallets: Arc<dyn WalletProviderRegistry>,
        flow: Arc<dyn ContractCallFlow>,
        config: SubmissionConfig,
        ctx: &Context,
    ) -> Self {
        Self { api, preference, wallets, flow, config, ctx: ctx.clone() }
    }

    fn transition(&self, from: SubmissionStage, to: SubmissionStage) {
        self.ctx.try_log(|logger| debug!(logger, "submission: {} -> {}", from, to));
    }

    fn fail<T>(&self, stage: SubmissionStage, result: BboxResult<T>) -> BboxResult<T> {
        if let Err(e) = &result {
            self.ctx.try_log(|logger| error!(logger, "{}", summary(e)));
            self.transition(stage, SubmissionStage::Failed);
        }
        result
    }

    /// Submits `ipfs_hash` to `submit-app`.
    ///
    /// Preconditions are checked in a fixed order (host support, wallet presence, contract
    /// deployment) and returned as errors. Past them, the outcome arrives through the handle.
    pub async fn submit_listing(&self, ipfs_hash: &str) -> BboxResult<SubmissionHandle> {
        self.transition(SubmissionStage::Idle, SubmissionStage::PreconditionChecking);
        let profile = resolve_network(self.preference.as_ref());
        let contract = contract_identifier_for(profile);

        let result = self.check_preconditions(profile, &contract).await;
        let providers = self.fail(SubmissionStage::PreconditionChecking, result)?;

        let argument = cv_string_ascii(ipfs_hash)
            .map_err(|e| e.change_context(BboxError::WalletInvocationFailed));
        let argument = self.fail(SubmissionStage::PreconditionChecking, argument)?;

        let rpc_provider =
            providers.iter().find_map(|p| p.rpc()).filter(|_| self.config.use_rpc_strategy);
        match rpc_provider {
            Some(provider) => {
                self.transition(SubmissionStage::PreconditionChecking, SubmissionStage::RpcAttempting);
                self.ctx.try_log(|logger| info!(logger, "submitting {} through wallet rpc", ipfs_hash));
                match self.try_rpc_strategy(provider.as_ref(), &contract, &argument).await {
                    Ok(txid) => {
                        self.ctx.try_log(|logger| {
                            info!(logger, "transaction {} submitted", txid_display_str(&txid))
                        });
                        let outcome = SubmissionOutcome::Success(txid);
                        self.transition(SubmissionStage::RpcAttempting, outcome.stage());
                        return Ok(SubmissionHandle::ready(outcome));
                    }
                    Err(e) => {
                        self.ctx.try_log(|logger| {
                            warn!(logger, "wallet rpc failed, using signing flow: {}", summary(&e))
                        });
                        self.transition(SubmissionStage::RpcAttempting, SubmissionStage::FlowAttempting);
                    }
                }
            }
            None => {
                self.transition(SubmissionStage::PreconditionChecking, SubmissionStage::FlowAttempting)
            }
        }

        self.ctx.try_log(|logger| info!(logger, "submitting {} through signing flow", ipfs_hash));
        self.open_flow(
            profile,
            &contract,
            FN_SUBMIT_APP,
            vec![argument],
            // the call may carry an sBTC transfer whose amount is only known on chain
            PostConditionMode::Allow,
        )
    }

    async fn check_preconditions(
        &self,
        profile: &NetworkProfile,
        contract: &ContractIdentifier,
    ) -> BboxResult<Vec<crate::wallets::WalletProviderHandle>> {
        if !self.wallets.supports_wallet_interaction() {
            return Err(bbox_error!(
                BboxError::EnvironmentUnsupported,
                "Cannot call contract: wallet providers are not reachable from this host"
            ))
            .with_documentation("Run the submission from an interactive host with a Stacks wallet available.");
        }

        let providers = self.wallets.detect();
        if providers.is_empty() {
            return Err(bbox_error!(
                BboxError::NoWalletDetected,
                "No Stacks wallet extension detected. Please install Leather or Xverse wallet and refresh."
            ))
            .with_documentation("Install Leather or Xverse wallet and refresh.")
            .with_link(LEATHER_INSTALL_URL);
        }
        self.ctx.try_log(|logger| {
            let kinds = providers.iter().map(|p| p.kind().to_string()).collect::<Vec<_>>();
            debug!(logger, "wallet providers detected: {}", kinds.join(", "))
        });

        let contract_name = contract.require_name()?;
        let status = self
            .api
            .contract_interface_status(profile.api_url, &contract.address, contract_name)
            .await
            .map_err(|e| {
                e.change_context(BboxError::ContractNotDeployed).attach_printable(format!(
                    "Contract verification failed. The bbox contract must be deployed at {} before you can submit apps.",
                    profile.contract_id
                ))
            })
            .with_documentation(format!("Deploy the bbox contract to {}.", profile.contract_id))
            .with_contract_info(profile.contract_id, None)?;

        if !(200..300).contains(&status) {
            return Err(bbox_error!(
                BboxError::ContractNotDeployed,
                "Contract not found (HTTP {}). Please deploy the bbox contract to {} before submitting apps.",
                status,
                profile.contract_id
            )
            .attach(HttpStatus(status)))
            .with_documentation(format!("Deploy the bbox contract to {}.", profile.contract_id))
            .with_contract_info(profile.contract_id, None);
        }
        Ok(providers)
    }

    async fn try_rpc_strategy(
        &self,
        provider: &dyn RpcWalletProvider,
        contract: &ContractIdentifier,
        argument: &ClarityValue,
    ) -> BboxResult<String> {
        let params = json!({
            "contract": contract.to_string(),
            "functionName": FN_SUBMIT_APP,
            "functionArgs": [encode_cv_hex(argument)],
        });
        let response = provider.request(STX_CALL_CONTRACT_METHOD, params).await?;
        response
            .pointer("/result/txid")
            .and_then(|txid| txid.as_str())
            .map(|txid| txid.to_string())
            .ok_or_else(|| {
                bbox_error!(
                    BboxError::WalletInvocationFailed,
                    "No transaction ID returned from wallet: {}",
                    response
                )
            })
    }

    /// Votes on an app. No preconditions, strict post-conditions.
    pub fn cast_vote(&self, app_id: u64, vote: VoteKind) -> BboxResult<SubmissionHandle> {
        let profile = resolve_network(self.preference.as_ref());
        let contract = contract_identifier_for(profile);
        let vote = cv_string_ascii(vote.as_str())?;
        self.transition(SubmissionStage::Idle, SubmissionStage::FlowAttempting);
        self.open_flow(
            profile,
            &contract,
            FN_VOTE_APP,
            vec![cv_uint(app_id.into()), vote],
            PostConditionMode::Deny,
        )
    }

    /// Rates an app from 1 to 5. Out of range ratings fail before any I/O.
    pub fn submit_rating(&self, app_id: u64, rating: u32) -> BboxResult<SubmissionHandle> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(bbox_error!(
                BboxError::InvalidRating,
                "Rating must be between {} and {}, got {}",
                MIN_RATING,
                MAX_RATING,
                rating
            ))
            .with_documentation(format!("Pick a rating between {} and {}.", MIN_RATING, MAX_RATING));
        }
        let profile = resolve_network(self.preference.as_ref());
        let contract = contract_identifier_for(profile);
        self.transition(SubmissionStage::Idle, SubmissionStage::FlowAttempting);
        self.open_flow(
            profile,
            &contract,
            FN_RATE_APP,
            vec![cv_uint(app_id.into()), cv_uint(rating.into())],
            PostConditionMode::Deny,
        )
    }

    fn open_flow(
        &self,
        profile: &NetworkProfile,
        contract: &ContractIdentifier,
        function_name: &str,
        function_args: Vec<ClarityValue>,
        post_condition_mode: PostConditionMode,
    ) -> BboxResult<SubmissionHandle> {
        let contract_name = contract.require_name()?.to_string();
        let options = ContractCallOptions {
            network: profile.signing_network(),
            contract_address: contract.address.clone(),
            contract_name,
            function_name: function_name.to_string(),
            function_args,
            post_condition_mode,
            app_details: self.config.app_details.clone(),
        };

        let (outcome_tx, handle) = SubmissionHandle::pending();
        let sender: SharedOutcomeSender = Arc::new(Mutex::new(Some(outcome_tx)));
        let finish_sender = sender.clone();
        let finish_ctx = self.ctx.clone();
        let cancel_ctx = self.ctx.clone();
        let function = function_name.to_string();
        let callbacks = ContractCallCallbacks {
            on_finish: Box::new(move |data: FinishedContractCall| {
                let outcome = match data.txid {
                    Some(txid) => {
                        finish_ctx.try_log(|logger| {
                            info!(logger, "{} submitted: {}", function, txid_display_str(&txid))
                        });
                        SubmissionOutcome::Success(txid)
                    }
                    None => {
                        finish_ctx.try_log(|logger| {
                            warn!(logger, "{} finished without a transaction id", function)
                        });
                        SubmissionOutcome::Failed(bbox_error!(
                            BboxError::WalletInvocationFailed,
                            "wallet finished without returning a transaction id"
                        ))
                    }
                };
                complete(&finish_ctx, &finish_sender, outcome);
            }),
            on_cancel: Box::new(move || {
                cancel_ctx.try_log(|logger| info!(logger, "transaction cancelled by user"));
                complete(&cancel_ctx, &sender, SubmissionOutcome::Cancelled);
            }),
        };

        let opened = self.flow.open_contract_call(options, callbacks).map_err(|e| {
            let message = format!("Failed to open wallet for signing: {}", summary(&e));
            e.change_context(BboxError::WalletInvocationFailed).attach_printable(message)
        });
        self.fail(SubmissionStage::FlowAttempting, opened)?;
        self.transition(SubmissionStage::FlowAttempting, SubmissionStage::AwaitingUserSignature);
        Ok(handle)
    }
}
