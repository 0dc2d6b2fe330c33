//! Wallet-dashboard core: key management, transaction building and
//! submission, contract interaction and raw JSON-RPC, on top of the
//! `eth-rpc` client and `chain-eth` primitives.

pub mod analysis;
pub mod builder;
pub mod context;
pub mod contract;
pub mod error;
pub mod hd_derivation;
pub mod intent;
pub mod logging;
pub mod mnemonic;
pub mod raw_rpc;
pub mod signer;
pub mod utilities;

pub use analysis::{analyze_bytecode, BytecodeAnalysis};
pub use builder::{BuilderState, EstimateResult, TransactionBuilder};
pub use context::{GeneratedAccount, WalletContext, WalletSession};
pub use contract::{ContractDescriptor, InvocationResult, MethodDescriptor};
pub use error::{ErrorKind, WalletError};
pub use intent::{ChainContext, TransactionIntent};
pub use logging::init_tracing;
pub use raw_rpc::{DecoderTable, RawRpcExecutor, RpcCallRecord};
pub use signer::{Account, GeneratedWallet, KeySigner, PendingTransaction, ReceiptSummary};
