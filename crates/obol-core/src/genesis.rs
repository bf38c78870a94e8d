//! The hard-coded genesis block.
//!
//! The genesis block is fixed protocol data, not something any node mines or
//! validates: an empty chain admits it by identity and every other block is
//! validated against the full rule set. Its single transaction has no inputs
//! and one 50-coin output.

use crate::types::{Block, Hash256, Transaction, TxOut};

/// Merkle hash carried by the genesis header.
const GENESIS_MERKLE_HASH: Hash256 = Hash256([
    0xdf, 0xef, 0x8e, 0xb9, 0x72, 0x02, 0x6b, 0xbe, 0x9e, 0x98, 0xb2, 0x66, 0x16, 0xfe, 0x90,
    0xe6, 0x0e, 0x3f, 0xf2, 0x23, 0xd0, 0xa5, 0x96, 0xe7, 0x8b, 0xde, 0x66, 0x32, 0x10, 0x9d,
    0x7e, 0xf0,
]);

/// Address paid by the genesis output.
pub const GENESIS_ADDRESS: &str = "143UVyz7ooiAv1pMqbwPPpnH4BV9ifJGFF";

/// Value of the single genesis output, in belushis.
pub const GENESIS_OUTPUT_VALUE: u64 = 5_000_000_000;

/// Build the genesis block literal.
pub fn genesis_block() -> Block {
    Block {
        version: 0,
        prev_block_hash: None,
        merkle_hash: GENESIS_MERKLE_HASH,
        timestamp: 1_501_396_299,
        bits: 26,
        nonce: 1_845_989,
        txns: vec![Transaction {
            txins: vec![],
            txouts: vec![TxOut {
                value: GENESIS_OUTPUT_VALUE,
                to_address: GENESIS_ADDRESS.to_string(),
            }],
            locktime: None,
        }],
    }
}

/// Whether a block is the genesis literal.
pub fn is_genesis(block: &Block) -> bool {
    *block == genesis_block()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_is_stable() {
        assert_eq!(genesis_block(), genesis_block());
        assert_eq!(genesis_block().id(), genesis_block().id());
    }

    #[test]
    fn genesis_has_no_parent() {
        assert!(genesis_block().prev_block_hash.is_none());
    }

    #[test]
    fn genesis_pays_fifty_coins() {
        let g = genesis_block();
        assert_eq!(g.txns.len(), 1);
        assert_eq!(g.txns[0].txouts[0].value, GENESIS_OUTPUT_VALUE);
        assert_eq!(g.txns[0].txouts[0].to_address, GENESIS_ADDRESS);
    }

    #[test]
    fn is_genesis_detects_mutation() {
        let mut g = genesis_block();
        assert!(is_genesis(&g));
        g.nonce += 1;
        assert!(!is_genesis(&g));
    }

    #[test]
    fn merkle_hash_literal_round_trips() {
        assert_eq!(
            GENESIS_MERKLE_HASH.to_string(),
            "dfef8eb972026bbe9e98b26616fe90e60e3ff223d0a596e78bde6632109d7ef0"
        );
    }
}
