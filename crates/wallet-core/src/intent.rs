use alloy_primitives::{Address, Bytes, U256};
use chain_eth::address::parse_address;
use chain_eth::transaction::{FeeModel, UnsignedTransaction};
use chain_eth::units::parse_ether;
use serde::{Deserialize, Serialize};

use crate::error::WalletError;

/// What the user wants to send, as entered at the UI boundary.
///
/// `value` is a decimal ether amount and `data` optional `0x` hex. The gas
/// and fee fields are filled in by estimation; at most one fee model is ever
/// populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionIntent {
    pub to: String,
    pub value: String,
    #[serde(default)]
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<U256>,
}

/// Per-transaction values taken from the chain at signing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainContext {
    pub chain_id: u64,
    pub nonce: u64,
}

impl TransactionIntent {
    pub fn new(to: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = data.into();
        self
    }

    pub fn recipient(&self) -> Result<Address, WalletError> {
        let to = self.to.trim();
        if to.is_empty() {
            return Err(WalletError::validation("recipient address is required"));
        }
        Ok(parse_address(to)?)
    }

    /// Transfer value in wei.
    pub fn value_wei(&self) -> Result<U256, WalletError> {
        let value = self.value.trim();
        if value.is_empty() {
            return Err(WalletError::validation("value is required"));
        }
        Ok(parse_ether(value)?)
    }

    /// Calldata; `""` and `"0x"` both mean none.
    pub fn calldata(&self) -> Result<Bytes, WalletError> {
        let data = self.data.trim();
        if data.is_empty() {
            return Ok(Bytes::new());
        }
        let digits = data
            .strip_prefix("0x")
            .ok_or_else(|| WalletError::validation("data must be 0x-prefixed hex"))?;
        hex::decode(digits)
            .map(Bytes::from)
            .map_err(|e| WalletError::validation(format!("data is not valid hex: {e}")))
    }

    /// The fee model carried by the intent. EIP-1559 wins when both of its
    /// fields are set.
    pub fn fee_model(&self) -> Option<FeeModel> {
        match (self.max_fee_per_gas, self.max_priority_fee_per_gas, self.gas_price) {
            (Some(max_fee_per_gas), Some(max_priority_fee_per_gas), _) => Some(FeeModel::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            }),
            (_, _, Some(gas_price)) => Some(FeeModel::Legacy { gas_price }),
            _ => None,
        }
    }

    /// Replaces every gas/fee field; the fee model not chosen is cleared.
    pub fn apply_fees(&mut self, gas_limit: u64, fees: FeeModel) {
        self.gas_limit = Some(gas_limit);
        match fees {
            FeeModel::Legacy { gas_price } => {
                self.gas_price = Some(gas_price);
                self.max_fee_per_gas = None;
                self.max_priority_fee_per_gas = None;
            }
            FeeModel::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => {
                self.gas_price = None;
                self.max_fee_per_gas = Some(max_fee_per_gas);
                self.max_priority_fee_per_gas = Some(max_priority_fee_per_gas);
            }
        }
    }

    /// The on-chain transaction for this intent. Gas and fees must already
    /// be resolved.
    pub fn to_unsigned(&self, chain: &ChainContext) -> Result<UnsignedTransaction, WalletError> {
        let gas_limit = self
            .gas_limit
            .ok_or_else(|| WalletError::precondition("gas not estimated"))?;
        let fees = self
            .fee_model()
            .ok_or_else(|| WalletError::precondition("fees not estimated"))?;

        Ok(UnsignedTransaction {
            chain_id: chain.chain_id,
            nonce: chain.nonce,
            to: self.recipient()?,
            value: self.value_wei()?,
            data: self.calldata()?,
            gas_limit,
            fees,
        })
    }
}
