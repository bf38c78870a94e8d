//! Merkle accumulator over transaction IDs.
//!
//! Leaves are `sha256d` of the txid hex text; each internal node is `sha256d`
//! of the concatenated child hex texts. Odd levels duplicate their last
//! element. The root over an empty list is undefined: blocks always contain
//! at least the coinbase, so callers must pass a non-empty slice.

use crate::codec::sha256d;
use crate::types::Hash256;

/// Compute the merkle root over an ordered list of transaction IDs.
///
/// Returns `None` for an empty list.
pub fn merkle_root(txids: &[Hash256]) -> Option<Hash256> {
    if txids.is_empty() {
        return None;
    }

    let mut level: Vec<Hash256> = txids.iter().map(|id| sha256d(id.to_string())).collect();

    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(*level.last().expect("level is non-empty"));
        }
        level = level
            .chunks(2)
            .map(|pair| node_hash(&pair[0], &pair[1]))
            .collect();
    }

    Some(level[0])
}

fn node_hash(left: &Hash256, right: &Hash256) -> Hash256 {
    sha256d(format!("{left}{right}"))
}
