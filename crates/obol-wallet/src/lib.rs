//! # obol-wallet
//! Single-key wallet: raw key-file persistence, greedy coin selection, and
//! signed transaction construction.

pub mod builder;
pub mod error;
pub mod keys;

pub use builder::build_send_txn;
pub use error::WalletError;
pub use keys::Wallet;
