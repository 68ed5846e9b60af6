use std::sync::Arc;

use bbox_kit::bbox_error;
use bbox_kit::errors::{summary, BboxError, BboxResult, ErrorAttachments};
use bbox_kit::Context;
use clarity::vm::Value as ClarityValue;

use crate::codec::cv::{cv_principal, cv_uint, encode_cv_hex};
use crate::codec::{normalize, NormalizedValue};
use crate::constants::{
    FN_GET_APP, FN_GET_LISTING_FEE, FN_GET_TOTAL_APPS, FN_GET_USER_RATING, FN_GET_USER_VOTE,
};
use crate::network::{contract_identifier_for, resolve_network, NetworkPreference};
use crate::rpc::{ReadOnlyApi, ReadOnlyCall};
use crate::typing::ListingFee;

/// Read side of the listing contract.
///
/// Every query resolves the network on each call and degrades to a default (or `None`)
/// instead of failing: an undeployed or unreachable contract never breaks a read path.
#[derive(Clone)]
pub struct BboxContract {
    api: Arc<dyn ReadOnlyApi>,
    preference: Arc<dyn NetworkPreference>,
    ctx: Context,
}

impl BboxContract {
    pub fn new(
        api: Arc<dyn ReadOnlyApi>,
        preference: Arc<dyn NetworkPreference>,
        ctx: &Context,
    ) -> Self {
        Self { api, preference, ctx: ctx.clone() }
    }

    /// Calls `function` and normalizes its result.
    pub async fn read(
        &self,
        function: &str,
        args: Vec<ClarityValue>,
    ) -> BboxResult<NormalizedValue> {
        let profile = resolve_network(self.preference.as_ref());
        let contract = contract_identifier_for(profile);
        let contract_name = contract.require_name()?.to_string();

        let call = ReadOnlyCall {
            api_url: profile.api_url.to_string(),
            contract_address: contract.address.clone(),
            contract_name,
            function: function.to_string(),
            arguments: args.iter().map(encode_cv_hex).collect(),
            sender: contract.address.clone(),
        };

        let response = self
            .api
            .call_read_only(call)
            .await
            .with_contract_info(profile.contract_id, Some(function))?;

        if !response.okay {
            return Err(bbox_error!(
                BboxError::Rpc,
                "read-only call {} was rejected: {}",
                function,
                response.cause.as_deref().unwrap_or("no cause given")
            ))
            .with_contract_info(profile.contract_id, Some(function));
        }

        let Some(result) = response.result else {
            return Err(bbox_error!(
                BboxError::UnexpectedResponseShape,
                "read-only call {} returned no result",
                function
            ));
        };

        normalize(&result).with_contract_info(profile.contract_id, Some(function))
    }

    pub async fn get_listing_fee(&self) -> ListingFee {
        let fee = match self.read(FN_GET_LISTING_FEE, vec![]).await {
            Ok(value) => ListingFee::from_normalized(&value),
            Err(e) => Err(e),
        };
        match fee {
            Ok(fee) => {
                self.ctx.try_log(|logger| {
                    debug!(logger, "listing fee: {} {}", fee.amount, fee.token)
                });
                fee
            }
            Err(e) => {
                self.ctx.try_log(|logger| {
                    warn!(
                        logger,
                        "using default listing fee (contract may not be deployed yet): {}",
                        summary(&e)
                    )
                });
                ListingFee::fallback()
            }
        }
    }

    pub async fn get_total_apps(&self) -> u64 {
        let total = self.read(FN_GET_TOTAL_APPS, vec![]).await.and_then(|value| {
            value.as_uint().and_then(|v| u64::try_from(v).ok()).ok_or_else(|| {
                bbox_error!(
                    BboxError::UnexpectedResponseShape,
                    "total apps is not an unsigned integer: {:?}",
                    value
                )
            })
        });
        match total {
            Ok(total) => total,
            Err(e) => {
                self.ctx.try_log(|logger| {
                    warn!(logger, "unable to read total apps: {}", summary(&e))
                });
                0
            }
        }
    }

    pub async fn get_app(&self, app_id: u64) -> Option<NormalizedValue> {
        let result = self.read(FN_GET_APP, vec![cv_uint(app_id.into())]).await;
        self.or_none(FN_GET_APP, result)
    }

    pub async fn get_user_vote(&self, voter: &str, app_id: u64) -> Option<NormalizedValue> {
        let result = match cv_principal(voter) {
            Ok(principal) => self.read(FN_GET_USER_VOTE, vec![principal, cv_uint(app_id.into())]).await,
            Err(e) => Err(e),
        };
        self.or_none(FN_GET_USER_VOTE, result)
    }

    pub async fn get_user_rating(&self, voter: &str, app_id: u64) -> Option<NormalizedValue> {
        let result = match cv_principal(voter) {
            Ok(principal) => {
                self.read(FN_GET_USER_RATING, vec![principal, cv_uint(app_id.into())]).await
            }
            Err(e) => Err(e),
        };
        self.or_none(FN_GET_USER_RATING, result)
    }

    fn or_none(
        &self,
        function: &str,
        result: BboxResult<NormalizedValue>,
    ) -> Option<NormalizedValue> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.ctx.try_log(|logger| {
                    warn!(logger, "{} unavailable: {}", function, summary(&e))
                });
                None
            }
        }
    }
}
