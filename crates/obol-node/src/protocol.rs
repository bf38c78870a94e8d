//! Wire messages for the Obol peer protocol.
//!
//! Every message is one canonical text record carrying a serde type tag, so
//! the receiving dispatcher reconstructs the exact variant. A connection
//! carries exactly one message: read to EOF, handle, optionally write a
//! single reply, close.

use serde::{Deserialize, Serialize};

use obol_core::codec;
use obol_core::error::CodecError;
use obol_core::types::{Block, Hash256, Transaction};

/// A message exchanged between peers.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// A transaction offered for mempool admission.
    Txn { txn: Transaction },
    /// A block offered for connection.
    Block { block: Block },
    /// Request a page of active-chain blocks following `from_blockid`.
    GetBlocks { from_blockid: Hash256 },
    /// Inventory announcement carrying full payloads.
    Inv { inv: Inventory },
    /// Request the summed UTXO value of an address; replied with a decimal
    /// string on the same connection.
    Balance { addr: String },
    /// Ask the receiving node to pay `value` belushis to `addr` out of its
    /// own wallet.
    Send { addr: String, value: u64 },
    /// Request the list of mempool txids; replied on the same connection.
    GetMempool,
}

/// Inventory payloads: full typed values, not bare ids.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Inventory {
    Blocks(Vec<Block>),
    Txns(Vec<Transaction>),
}

impl Message {
    /// Encode for the wire.
    pub fn encode(&self) -> Result<String, CodecError> {
        codec::serialize(self)
    }

    /// Decode a full wire record.
    pub fn decode(text: &str) -> Result<Self, CodecError> {
        codec::deserialize(text)
    }
}
