//! Pool of validated, unmined transactions.
//!
//! A map from txid to transaction that preserves insertion order for
//! iteration; block assembly fills candidates in that order (fee
//! prioritization is out of scope). Mutated only under the chain lock.
//! Transactions leave the pool when mined and return when their block is
//! disconnected in a reorganization.

use std::collections::HashMap;

use crate::types::{Hash256, Transaction, UnspentTxOut};

/// Set of yet-unmined transactions, iterated in insertion order.
#[derive(Clone, Debug, Default)]
pub struct Mempool {
    txns: HashMap<Hash256, Transaction>,
    order: Vec<Hash256>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a validated transaction. Re-inserting an existing txid is a
    /// no-op so iteration order stays stable.
    pub fn insert(&mut self, txid: Hash256, txn: Transaction) {
        if self.txns.insert(txid, txn).is_none() {
            self.order.push(txid);
        }
    }

    pub fn remove(&mut self, txid: &Hash256) -> Option<Transaction> {
        let removed = self.txns.remove(txid);
        if removed.is_some() {
            self.order.retain(|id| id != txid);
        }
        removed
    }

    pub fn contains(&self, txid: &Hash256) -> bool {
        self.txns.contains_key(txid)
    }

    pub fn get(&self, txid: &Hash256) -> Option<&Transaction> {
        self.txns.get(txid)
    }

    pub fn len(&self) -> usize {
        self.txns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txns.is_empty()
    }

    /// Txids in insertion order.
    pub fn txids(&self) -> Vec<Hash256> {
        self.order.clone()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Hash256, &Transaction)> {
        self.order.iter().filter_map(|id| self.txns.get(id).map(|tx| (id, tx)))
    }

    /// Find an output produced by a pool transaction, viewed as a spendable
    /// UTXO. Mempool-origin UTXOs carry the `-1` height sentinel and are
    /// never coinbase (a coinbase would already have been mined).
    pub fn find_utxo(&self, outpoint: &crate::types::OutPoint) -> Option<UnspentTxOut> {
        let tx = self.txns.get(&outpoint.txid)?;
        let txout = tx.txouts.get(outpoint.index as usize)?;
        Some(UnspentTxOut {
            value: txout.value,
            to_address: txout.to_address.clone(),
            txid: outpoint.txid,
            tx_idx: outpoint.index,
            is_coinbase: false,
            height: UnspentTxOut::MEMPOOL_HEIGHT,
        })
    }
}
