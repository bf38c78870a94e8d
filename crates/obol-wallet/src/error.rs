//! Wallet error types.

use thiserror::Error;

use obol_core::error::{CodecError, TxUnlockError};

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("wallet file i/o: {0}")] Io(#[from] std::io::Error),
    #[error("wallet file holds an invalid key: {0}")] InvalidKey(TxUnlockError),
    #[error("insufficient funds: have {have}, need more than {need}")]
    InsufficientFunds { have: u64, need: u64 },
    #[error(transparent)] Codec(#[from] CodecError),
}
