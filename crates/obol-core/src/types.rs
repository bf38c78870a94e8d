//! Core protocol types: transactions, blocks, outpoints, UTXOs.
//!
//! All monetary values are in belushis (1 coin = 10^8 belushis). Transaction
//! identity is `sha256d` over the canonical serialization; block identity is
//! `sha256d` over the header text (see [`Block::header_string`]).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec;
use crate::constants::MAX_BLOCK_SERIALIZED_SIZE;
use crate::error::{CodecError, TxnValidationError};

/// A 32-byte hash, displayed and serialized as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Leading zero bits, counted from the most significant bit.
    ///
    /// A hash viewed as a 256-bit big-endian integer is strictly below
    /// `2^(256 - bits)` exactly when it has at least `bits` leading zeros.
    pub fn leading_zero_bits(&self) -> u32 {
        let mut count = 0;
        for byte in &self.0 {
            if *byte == 0 {
                count += 8;
            } else {
                count += byte.leading_zeros();
                break;
            }
        }
        count
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({self})")
    }
}

impl FromStr for Hash256 {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| CodecError::Deserialize(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CodecError::Deserialize("expected 32 hex-encoded bytes".into()))?;
        Ok(Self(arr))
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Reference to a specific output of a previous transaction.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct OutPoint {
    /// ID of the transaction holding the referenced output.
    pub txid: Hash256,
    /// Index of the output within that transaction.
    pub index: u32,
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.index)
    }
}

/// An input to a transaction.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TxIn {
    /// The output being spent. `None` only in a coinbase input.
    pub to_spend: Option<OutPoint>,
    /// Signature unlocking the spent output for this transaction.
    #[serde(with = "codec::hexbytes")]
    pub unlock_sig: Vec<u8>,
    /// Public key matching the spent output's address. `None` for coinbase.
    #[serde(with = "codec::hexbytes_opt")]
    pub unlock_pk: Option<Vec<u8>>,
    /// Sender-defined sequence number.
    pub sequence: u32,
}

/// An output from a transaction.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TxOut {
    /// The number of belushis this output awards.
    pub value: u64,
    /// Base58check address of the owner.
    pub to_address: String,
}

/// A transaction transferring value between addresses.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub txins: Vec<TxIn>,
    pub txouts: Vec<TxOut>,
    /// Block height or timestamp before which this transaction is locked.
    /// Carried on the wire but not enforced by validation.
    pub locktime: Option<u64>,
}

impl Transaction {
    /// Transaction ID: `sha256d` over the canonical serialization.
    pub fn id(&self) -> Result<Hash256, CodecError> {
        Ok(codec::sha256d(codec::serialize(self)?))
    }

    /// A coinbase has exactly one input, and that input spends nothing.
    pub fn is_coinbase(&self) -> bool {
        self.txins.len() == 1 && self.txins[0].to_spend.is_none()
    }

    /// Build the coinbase transaction for a block at the given height.
    ///
    /// The height is pushed into `unlock_sig` so coinbase IDs are unique
    /// across blocks paying the same address.
    pub fn create_coinbase(pay_to_addr: &str, value: u64, height: u64) -> Self {
        Self {
            txins: vec![TxIn {
                to_spend: None,
                unlock_sig: height.to_string().into_bytes(),
                unlock_pk: None,
                sequence: 0,
            }],
            txouts: vec![TxOut {
                value,
                to_address: pay_to_addr.to_string(),
            }],
            locktime: None,
        }
    }

    /// Sum of all output values, saturating at `u64::MAX`.
    pub fn total_output_value(&self) -> u64 {
        self.txouts
            .iter()
            .fold(0u64, |acc, out| acc.saturating_add(out.value))
    }

    /// Context-free structural checks shared by mempool and block validation.
    pub fn validate_basics(&self, as_coinbase: bool) -> Result<(), TxnValidationError> {
        if self.txouts.is_empty() || (self.txins.is_empty() && !as_coinbase) {
            return Err(TxnValidationError::MissingInputsOrOutputs);
        }

        for (i, txout) in self.txouts.iter().enumerate() {
            if txout.value == 0 {
                return Err(TxnValidationError::ZeroValueOutput(i));
            }
        }

        let size = codec::serialize(self)?.len();
        if size > MAX_BLOCK_SERIALIZED_SIZE {
            return Err(TxnValidationError::Oversized {
                size,
                max: MAX_BLOCK_SERIALIZED_SIZE,
            });
        }

        if self.total_output_value() > crate::constants::MAX_MONEY {
            return Err(TxnValidationError::SpendValueTooHigh);
        }

        Ok(())
    }
}

/// An entry in the unspent-output set.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UnspentTxOut {
    pub value: u64,
    pub to_address: String,
    /// ID of the transaction this output belongs to.
    pub txid: Hash256,
    pub tx_idx: u32,
    /// Whether this output came from a coinbase transaction.
    pub is_coinbase: bool,
    /// Chain height at which this output was included. `-1` marks an output
    /// produced by a transaction still in the mempool.
    pub height: i64,
}

impl UnspentTxOut {
    /// Height sentinel for outputs produced by unmined mempool transactions.
    pub const MEMPOOL_HEIGHT: i64 = -1;

    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            txid: self.txid,
            index: self.tx_idx,
        }
    }
}

/// A block: proof-of-work header fields plus an ordered transaction list.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub version: u32,
    /// Header hash of the previous block. `None` only for the genesis block.
    pub prev_block_hash: Option<Hash256>,
    /// Merkle root over the IDs of `txns`.
    pub merkle_hash: Hash256,
    /// UNIX timestamp of block creation.
    pub timestamp: u64,
    /// Difficulty: the header hash must have at least this many leading zero
    /// bits, i.e. be strictly below `2^(256 - bits)` as a 256-bit integer.
    pub bits: u8,
    /// Incremented by the miner until the header hash satisfies `bits`.
    pub nonce: u64,
    pub txns: Vec<Transaction>,
}

impl Block {
    /// Canonical header text hashed for block identity.
    ///
    /// Concatenates version, previous hash (empty when absent), merkle root,
    /// timestamp, bits, and the given nonce as decimal/hex text.
    pub fn header_string(&self, nonce: u64) -> String {
        let prev = self
            .prev_block_hash
            .map(|h| h.to_string())
            .unwrap_or_default();
        format!(
            "{}{}{}{}{}{}",
            self.version, prev, self.merkle_hash, self.timestamp, self.bits, nonce
        )
    }

    /// Block ID: `sha256d` over the header text with the stored nonce.
    pub fn id(&self) -> Hash256 {
        codec::sha256d(self.header_string(self.nonce))
    }
}
