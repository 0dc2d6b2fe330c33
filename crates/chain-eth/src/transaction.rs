use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_rlp::{Encodable, RlpEncodable};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};

use crate::address::verifying_key_to_address;
use crate::error::EthError;

/// EIP-2718 type byte of a priority-fee transaction.
const EIP1559_TX_TYPE: u8 = 0x02;

/// How a transaction pays for gas. The two models never mix: a transaction
/// carries either a single `gas_price` or the EIP-1559 pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeModel {
    Legacy {
        gas_price: U256,
    },
    Eip1559 {
        max_fee_per_gas: U256,
        max_priority_fee_per_gas: U256,
    },
}

impl FeeModel {
    /// Worst-case price per unit of gas, used for fee estimates.
    pub fn max_price_per_gas(&self) -> U256 {
        match self {
            FeeModel::Legacy { gas_price } => *gas_price,
            FeeModel::Eip1559 { max_fee_per_gas, .. } => *max_fee_per_gas,
        }
    }

    pub fn is_eip1559(&self) -> bool {
        matches!(self, FeeModel::Eip1559 { .. })
    }
}

/// A fully populated transaction awaiting a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub to: Address,
    /// Transfer value in wei.
    pub value: U256,
    /// Calldata (empty for plain transfers).
    pub data: Bytes,
    pub gas_limit: u64,
    pub fees: FeeModel,
}

/// A signed transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub transaction: UnsignedTransaction,
    /// Network encoding: `0x02 || rlp(..)` for EIP-1559, a bare RLP list for legacy.
    pub raw: Vec<u8>,
    /// Keccak-256 of `raw`.
    pub hash: B256,
    pub r: U256,
    pub s: U256,
    pub y_parity: bool,
}

impl UnsignedTransaction {
    /// Bytes whose Keccak-256 digest is signed.
    ///
    /// - Legacy (EIP-155): `rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0])`
    /// - EIP-1559: `0x02 || rlp([chainId, nonce, maxPriorityFee, maxFee, gas, to, value, data, accessList])`
    pub fn signing_payload(&self) -> Vec<u8> {
        match self.fees {
            FeeModel::Legacy { gas_price } => {
                let fields = LegacySigningFields {
                    nonce: self.nonce,
                    gas_price,
                    gas_limit: self.gas_limit,
                    to: self.to,
                    value: self.value,
                    data: self.data.clone(),
                    chain_id: self.chain_id,
                    empty_r: 0,
                    empty_s: 0,
                };
                let mut out = Vec::new();
                fields.encode(&mut out);
                out
            }
            FeeModel::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => {
                let fields = Eip1559Fields {
                    chain_id: self.chain_id,
                    nonce: self.nonce,
                    max_priority_fee_per_gas,
                    max_fee_per_gas,
                    gas_limit: self.gas_limit,
                    to: self.to,
                    value: self.value,
                    data: self.data.clone(),
                    access_list: Vec::new(),
                };
                typed_envelope(&fields)
            }
        }
    }

    pub fn signing_hash(&self) -> B256 {
        B256::from_slice(&Keccak256::digest(self.signing_payload()))
    }

    /// Signs the transaction and produces its network encoding.
    pub fn sign(&self, key: &SigningKey) -> Result<SignedTransaction, EthError> {
        let hash = self.signing_hash();
        let (signature, recovery_id): (Signature, RecoveryId) = key
            .sign_prehash(hash.as_slice())
            .map_err(|e| EthError::SigningError(e.to_string()))?;

        let r = U256::from_be_slice(&signature.r().to_bytes());
        let s = U256::from_be_slice(&signature.s().to_bytes());
        let y_parity = recovery_id.is_y_odd();

        let raw = match self.fees {
            FeeModel::Legacy { gas_price } => {
                let v = self
                    .chain_id
                    .checked_mul(2)
                    .and_then(|v| v.checked_add(35 + y_parity as u64))
                    .ok_or_else(|| {
                        EthError::TransactionBuildError(format!(
                            "chain id {} too large for EIP-155",
                            self.chain_id
                        ))
                    })?;
                let fields = LegacySignedFields {
                    nonce: self.nonce,
                    gas_price,
                    gas_limit: self.gas_limit,
                    to: self.to,
                    value: self.value,
                    data: self.data.clone(),
                    v,
                    r,
                    s,
                };
                let mut out = Vec::new();
                fields.encode(&mut out);
                out
            }
            FeeModel::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => {
                let fields = Eip1559SignedFields {
                    chain_id: self.chain_id,
                    nonce: self.nonce,
                    max_priority_fee_per_gas,
                    max_fee_per_gas,
                    gas_limit: self.gas_limit,
                    to: self.to,
                    value: self.value,
                    data: self.data.clone(),
                    access_list: Vec::new(),
                    y_parity: y_parity as u8,
                    r,
                    s,
                };
                typed_envelope(&fields)
            }
        };

        let hash = B256::from_slice(&Keccak256::digest(&raw));

        Ok(SignedTransaction {
            transaction: self.clone(),
            raw,
            hash,
            r,
            s,
            y_parity,
        })
    }
}

impl SignedTransaction {
    /// `0x`-prefixed hex of the raw bytes, as sent to the node.
    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw))
    }

    pub fn hash_hex(&self) -> String {
        format!("0x{}", hex::encode(self.hash))
    }

    /// Recovers the address that produced this signature.
    pub fn recover_signer(&self) -> Result<Address, EthError> {
        let prehash = self.transaction.signing_hash();
        recover_address(
            prehash.as_slice(),
            &self.r.to_be_bytes::<32>(),
            &self.s.to_be_bytes::<32>(),
            self.y_parity,
        )
    }
}

/// EIP-191 `personal_sign` digest:
/// `keccak256("\x19Ethereum Signed Message:\n" + len(message) + message)`.
pub fn hash_message(message: &[u8]) -> B256 {
    let prefix = format!("\x19Ethereum Signed Message:\n{}", message.len());
    let mut hasher = Keccak256::new();
    hasher.update(prefix.as_bytes());
    hasher.update(message);
    B256::from_slice(&hasher.finalize())
}

/// Signs an arbitrary message using EIP-191 personal_sign.
///
/// Returns the 65-byte signature (r[32] + s[32] + v[1]) where v is 27 or 28.
pub fn sign_message(message: &[u8], key: &SigningKey) -> Result<[u8; 65], EthError> {
    let digest = hash_message(message);
    let (signature, recovery_id): (Signature, RecoveryId) = key
        .sign_prehash(digest.as_slice())
        .map_err(|e| EthError::SigningError(e.to_string()))?;

    let mut sig = [0u8; 65];
    sig[..32].copy_from_slice(&signature.r().to_bytes());
    sig[32..64].copy_from_slice(&signature.s().to_bytes());
    sig[64] = recovery_id.is_y_odd() as u8 + 27;
    Ok(sig)
}

/// Recovers the signer of an EIP-191 message from a 65-byte signature.
pub fn recover_message_signer(message: &[u8], signature: &[u8]) -> Result<Address, EthError> {
    if signature.len() != 65 {
        return Err(EthError::DecodingError(format!(
            "expected a 65-byte signature, got {}",
            signature.len()
        )));
    }
    let y_parity = match signature[64] {
        0 | 27 => false,
        1 | 28 => true,
        v => return Err(EthError::DecodingError(format!("invalid recovery byte {v}"))),
    };
    recover_address(
        hash_message(message).as_slice(),
        &signature[..32],
        &signature[32..64],
        y_parity,
    )
}

fn recover_address(prehash: &[u8], r: &[u8], s: &[u8], y_parity: bool) -> Result<Address, EthError> {
    let mut rs = [0u8; 64];
    rs[..32].copy_from_slice(r);
    rs[32..].copy_from_slice(s);

    let signature =
        Signature::from_slice(&rs).map_err(|e| EthError::DecodingError(e.to_string()))?;
    let recovery_id = RecoveryId::new(y_parity, false);
    let key = VerifyingKey::recover_from_prehash(prehash, &signature, recovery_id)
        .map_err(|e| EthError::SigningError(format!("signature recovery failed: {e}")))?;
    Ok(verifying_key_to_address(&key))
}

fn typed_envelope<T: Encodable>(fields: &T) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + fields.length());
    out.push(EIP1559_TX_TYPE);
    fields.encode(&mut out);
    out
}

// ---------------------------------------------------------------------------
// RLP-encodable structures
// ---------------------------------------------------------------------------

#[derive(RlpEncodable)]
struct LegacySigningFields {
    nonce: u64,
    gas_price: U256,
    gas_limit: u64,
    to: Address,
    value: U256,
    data: Bytes,
    chain_id: u64,
    empty_r: u8,
    empty_s: u8,
}

#[derive(RlpEncodable)]
struct LegacySignedFields {
    nonce: u64,
    gas_price: U256,
    gas_limit: u64,
    to: Address,
    value: U256,
    data: Bytes,
    v: u64,
    r: U256,
    s: U256,
}

#[derive(RlpEncodable)]
struct Eip1559Fields {
    chain_id: u64,
    nonce: u64,
    max_priority_fee_per_gas: U256,
    max_fee_per_gas: U256,
    gas_limit: u64,
    to: Address,
    value: U256,
    data: Bytes,
    access_list: Vec<AccessListItem>,
}

#[derive(RlpEncodable)]
struct Eip1559SignedFields {
    chain_id: u64,
    nonce: u64,
    max_priority_fee_per_gas: U256,
    max_fee_per_gas: U256,
    gas_limit: u64,
    to: Address,
    value: U256,
    data: Bytes,
    access_list: Vec<AccessListItem>,
    y_parity: u8,
    r: U256,
    s: U256,
}

/// An EIP-2930 access list entry (always empty here).
#[derive(Debug, Clone, RlpEncodable)]
struct AccessListItem {
    address: Address,
    storage_keys: Vec<B256>,
}
