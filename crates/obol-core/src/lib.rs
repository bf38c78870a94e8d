//! # obol-core
//! Consensus kernel for the Obol protocol: data model, canonical codec,
//! validation rules, chain management with reorganization, UTXO set,
//! mempool, and the proof-of-work schedule.

pub mod address;
pub mod chain;
pub mod codec;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod genesis;
pub mod mempool;
pub mod merkle;
pub mod reward;
pub mod types;
pub mod utxo;
