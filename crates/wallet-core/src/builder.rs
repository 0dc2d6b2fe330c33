use alloy_primitives::{Address, U256};
use chain_eth::transaction::FeeModel;
use chain_eth::units::format_ether;
use eth_rpc::{CallRequest, TransactionReceipt};
use serde::Serialize;
use tracing::{info, warn};

use crate::context::WalletContext;
use crate::error::WalletError;
use crate::intent::TransactionIntent;
use crate::signer::ReceiptSummary;

/// Lifecycle of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BuilderState {
    Idle,
    Estimating,
    Ready,
    Submitting,
    Confirmed,
    Failed,
}

/// Gas and fee resolution for an intent. All amounts are wei; the `_ether`
/// strings are derived from the same integers for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimateResult {
    pub gas_limit: u64,
    pub fees: FeeModel,
    /// `gas_limit × max price per gas`.
    pub estimated_fee: U256,
    /// `value + estimated_fee`.
    pub total_cost: U256,
    pub estimated_fee_ether: String,
    pub total_cost_ether: String,
}

#[derive(Debug, Clone)]
struct Estimation {
    intent: TransactionIntent,
    signer: Address,
    result: EstimateResult,
}

/// Drives a transaction from intent to receipt:
/// `Idle → Estimating → Ready → Submitting → Confirmed | Failed`.
#[derive(Debug)]
pub struct TransactionBuilder {
    state: BuilderState,
    estimation: Option<Estimation>,
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self {
            state: BuilderState::Idle,
            estimation: None,
        }
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    pub fn estimate(&self) -> Option<&EstimateResult> {
        self.estimation.as_ref().map(|e| &e.result)
    }

    /// Resolves gas limit and fee model for `intent` and writes them into it.
    ///
    /// Local validation happens before any network call. Existing gas and fee
    /// fields are overwritten.
    pub async fn estimate_gas(
        &mut self,
        intent: &mut TransactionIntent,
        ctx: &WalletContext,
    ) -> Result<EstimateResult, WalletError> {
        if self.state == BuilderState::Submitting {
            return Err(WalletError::precondition("a submission is in progress"));
        }
        let signer = ctx.require_signer()?.address();
        let to = intent.recipient()?;
        let value = intent.value_wei()?;
        let data = intent.calldata()?;

        self.state = BuilderState::Estimating;
        self.estimation = None;

        let request = CallRequest {
            from: Some(signer),
            to: Some(to),
            value: Some(value),
            data: (!data.is_empty()).then_some(data),
            ..CallRequest::default()
        };

        match resolve(ctx, &request, value).await {
            Ok(result) => {
                intent.apply_fees(result.gas_limit, result.fees);
                self.estimation = Some(Estimation {
                    intent: intent.clone(),
                    signer,
                    result: result.clone(),
                });
                self.state = BuilderState::Ready;
                Ok(result)
            }
            Err(e) => {
                self.state = BuilderState::Failed;
                Err(e)
            }
        }
    }

    /// Broadcasts the estimated intent and waits for its receipt.
    ///
    /// Refuses unless the builder is `Ready` for exactly this intent and
    /// signer, and unless the signer's balance covers value plus fee. A
    /// reverted transaction is reported with `status: reverted`, not as an
    /// error.
    pub async fn submit(
        &mut self,
        intent: &TransactionIntent,
        ctx: &WalletContext,
    ) -> Result<ReceiptSummary, WalletError> {
        if self.state != BuilderState::Ready {
            return Err(WalletError::precondition("gas not estimated"));
        }
        let Some(estimation) = self.estimation.as_ref() else {
            return Err(WalletError::precondition("gas not estimated"));
        };
        if estimation.intent != *intent {
            return Err(WalletError::precondition(
                "transaction changed since estimation; estimate again",
            ));
        }
        let signer = ctx.require_signer()?;
        if signer.address() != estimation.signer {
            return Err(WalletError::precondition(
                "active account changed since estimation; estimate again",
            ));
        }
        let total_cost = estimation.result.total_cost;

        self.state = BuilderState::Submitting;
        let outcome: Result<TransactionReceipt, WalletError> = async {
            let balance = ctx.rpc().get_balance(signer.address()).await?;
            if total_cost > balance {
                warn!("Refusing to submit: need {total_cost} wei, balance {balance} wei");
                return Err(WalletError::InsufficientFunds {
                    required: total_cost.to_string(),
                    available: balance.to_string(),
                });
            }
            let pending = signer.send_signed(intent, ctx.rpc()).await?;
            pending.wait().await
        }
        .await;

        match outcome {
            Ok(receipt) => {
                self.state = if receipt.succeeded() {
                    BuilderState::Confirmed
                } else {
                    BuilderState::Failed
                };
                info!("Transaction {} finished: {:?}", receipt.transaction_hash, receipt.status);
                Ok(ReceiptSummary::from(&receipt))
            }
            Err(e) => {
                self.state = BuilderState::Failed;
                Err(e)
            }
        }
    }
}

async fn resolve(
    ctx: &WalletContext,
    request: &CallRequest,
    value: U256,
) -> Result<EstimateResult, WalletError> {
    let quote = ctx.rpc().get_fee_data().await?;
    let fees = match (quote.eip1559(), quote.gas_price) {
        (Some((max_fee_per_gas, max_priority_fee_per_gas)), _) => FeeModel::Eip1559 {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        },
        (None, Some(gas_price)) => FeeModel::Legacy { gas_price },
        (None, None) => {
            return Err(WalletError::Rpc {
                code: 0,
                message: "node returned no fee data".into(),
                revert_reason: None,
            })
        }
    };

    let gas_limit = ctx.rpc().estimate_gas(request).await?;
    let estimated_fee = U256::from(gas_limit).saturating_mul(fees.max_price_per_gas());
    let total_cost = value.saturating_add(estimated_fee);

    Ok(EstimateResult {
        gas_limit,
        fees,
        estimated_fee,
        total_cost,
        estimated_fee_ether: format_ether(estimated_fee),
        total_cost_ether: format_ether(total_cost),
    })
}
