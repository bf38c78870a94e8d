//! Error types for the Obol consensus kernel.
//!
//! Validation errors never abort the process: handlers log and drop. The
//! `Orphan*` variants carry the offending value so callers can queue it on
//! the corresponding orphan list.

use thiserror::Error;

use crate::types::{Block, OutPoint, Transaction};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("serialize: {0}")] Serialize(String),
    #[error("deserialize: {0}")] Deserialize(String),
}

/// Failure to satisfy the unlocking conditions of a spent output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TxUnlockError {
    #[error("missing public key")] MissingPubkey,
    #[error("invalid public key bytes")] InvalidPubkey,
    #[error("pubkey doesn't match UTXO address")] PubkeyMismatch,
    #[error("signature doesn't match")] BadSignature,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TxnValidationError {
    #[error("missing txouts or txins")] MissingInputsOrOutputs,
    #[error("transaction too large: {size} > {max}")] Oversized { size: usize, max: usize },
    #[error("zero-value output at index {0}")] ZeroValueOutput(usize),
    #[error("spend value too high")] SpendValueTooHigh,
    #[error("could find no UTXO for input {index} -- orphaning txn")]
    MissingUtxo { index: usize, orphan: Box<Transaction> },
    #[error("coinbase UTXO {outpoint} not ready for spend")] ImmatureCoinbase { outpoint: OutPoint },
    #[error("input {index} is not a valid spend: {source}")]
    Unlock { index: usize, source: TxUnlockError },
    #[error("spend value is more than available: have {have}, spending {need}")]
    InsufficientInputValue { have: u64, need: u64 },
    #[error(transparent)] Codec(#[from] CodecError),
}

impl TxnValidationError {
    /// The transaction to queue on the orphan list, if this failure marks one.
    pub fn to_orphan(&self) -> Option<&Transaction> {
        match self {
            Self::MissingUtxo { orphan, .. } => Some(orphan),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockValidationError {
    #[error("txns empty")] NoTransactions,
    #[error("block timestamp too far in future")] TimestampTooFarInFuture,
    #[error("block header doesn't satisfy bits")] InsufficientWork,
    #[error("first txn must be coinbase and no more")] BadCoinbasePlacement,
    #[error("txn {index} failed to validate: {source}")]
    Transaction { index: usize, source: TxnValidationError },
    #[error("merkle hash invalid")] MerkleMismatch,
    #[error("bits is incorrect: got {got}, expected {expected}")]
    IncorrectBits { got: u8, expected: u8 },
    #[error("timestamp too old")] TimestampTooOld,
    #[error("prev block not found in any chain -- orphaning block")]
    UnknownParent { orphan: Box<Block> },
    #[error("block does not match the genesis literal")] BadGenesis,
    #[error(transparent)] Codec(#[from] CodecError),
}

impl BlockValidationError {
    /// The block to queue on the orphan list, if this failure marks one.
    pub fn to_orphan(&self) -> Option<&Block> {
        match self {
            Self::UnknownParent { orphan } => Some(orphan),
            _ => None,
        }
    }
}

/// Umbrella error for chain-state operations that mix failure domains.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error(transparent)] Txn(#[from] TxnValidationError),
    #[error(transparent)] Block(#[from] BlockValidationError),
    #[error(transparent)] Codec(#[from] CodecError),
    #[error("candidate block too large")] OversizedCandidate,
    #[error("no spendable output found for fee calculation: {0}")] MissingFeeSource(OutPoint),
    #[error("chain is empty")] EmptyChain,
}
