//! The unspent-transaction-output set.
//!
//! In-memory map from outpoint to [`UnspentTxOut`]. Mutated only while the
//! chain lock is held: outputs are created when their block connects, spent
//! when a spending transaction connects, and resurrected when a block is
//! disconnected during reorganization.

use std::collections::HashMap;

use crate::types::{Hash256, OutPoint, Transaction, TxOut, UnspentTxOut};

/// The committed UTXO set, keyed by outpoint.
#[derive(Clone, Debug, Default)]
pub struct UtxoSet {
    entries: HashMap<OutPoint, UnspentTxOut>,
}

impl UtxoSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one output of a connected transaction.
    pub fn add(&mut self, txout: &TxOut, txid: Hash256, idx: u32, is_coinbase: bool, height: i64) {
        let utxo = UnspentTxOut {
            value: txout.value,
            to_address: txout.to_address.clone(),
            txid,
            tx_idx: idx,
            is_coinbase,
            height,
        };
        self.entries.insert(utxo.outpoint(), utxo);
    }

    /// Record every output of a connected transaction.
    pub fn add_transaction(&mut self, tx: &Transaction, txid: Hash256, height: i64) {
        let is_coinbase = tx.is_coinbase();
        for (idx, txout) in tx.txouts.iter().enumerate() {
            self.add(txout, txid, idx as u32, is_coinbase, height);
        }
    }

    pub fn remove(&mut self, outpoint: &OutPoint) -> Option<UnspentTxOut> {
        self.entries.remove(outpoint)
    }

    pub fn get(&self, outpoint: &OutPoint) -> Option<&UnspentTxOut> {
        self.entries.get(outpoint)
    }

    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.entries.contains_key(outpoint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OutPoint, &UnspentTxOut)> {
        self.entries.iter()
    }

    /// All outputs currently owned by an address.
    pub fn find_for_address(&self, addr: &str) -> Vec<UnspentTxOut> {
        self.entries
            .values()
            .filter(|u| u.to_address == addr)
            .cloned()
            .collect()
    }

    /// Total value currently owned by an address.
    pub fn balance(&self, addr: &str) -> u64 {
        self.entries
            .values()
            .filter(|u| u.to_address == addr)
            .map(|u| u.value)
            .sum()
    }

    /// Total value held by the entire set.
    pub fn total_value(&self) -> u64 {
        self.entries.values().map(|u| u.value).sum()
    }
}
