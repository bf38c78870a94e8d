//! ECDSA signing over secp256k1 and the spend-message construction.
//!
//! Every non-coinbase input is unlocked by a signature over a **spend
//! message** binding the input to the exact output set it funds (a
//! simplification of SIGHASH_ALL):
//!
//! ```text
//! sha256d(serialize(outpoint) || decimal(sequence) || hex(pubkey) || serialize(txouts))
//! ```
//!
//! Public keys travel in their 33-byte compressed encoding; signatures in the
//! 64-byte compact encoding.

use secp256k1::ecdsa::Signature;
use secp256k1::global::SECP256K1;
use secp256k1::{Message, PublicKey, SecretKey};

use crate::codec;
use crate::error::{CodecError, TxUnlockError};
use crate::types::{Hash256, OutPoint, TxOut};

/// A secp256k1 keypair for signing transaction inputs.
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    /// Generate a random keypair from the thread RNG.
    pub fn generate() -> Self {
        let secret = SecretKey::new(&mut rand::thread_rng());
        let public = PublicKey::from_secret_key(SECP256K1, &secret);
        Self { secret, public }
    }

    /// Rebuild a keypair from the 32-byte secret encoding.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, TxUnlockError> {
        let secret = SecretKey::from_slice(bytes).map_err(|_| TxUnlockError::InvalidPubkey)?;
        let public = PublicKey::from_secret_key(SECP256K1, &secret);
        Ok(Self { secret, public })
    }

    /// Raw secret key bytes, as persisted in the wallet file.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.secret.secret_bytes()
    }

    /// Compressed public key encoding (33 bytes).
    pub fn public_bytes(&self) -> Vec<u8> {
        self.public.serialize().to_vec()
    }

    /// The base58check address owning this keypair.
    pub fn address(&self) -> String {
        crate::address::pubkey_to_address(&self.public_bytes())
    }

    /// Sign a 32-byte digest, returning the compact signature encoding.
    pub fn sign(&self, digest: &Hash256) -> Vec<u8> {
        let message = Message::from_digest(*digest.as_bytes());
        SECP256K1
            .sign_ecdsa(&message, &self.secret)
            .serialize_compact()
            .to_vec()
    }
}

impl Clone for KeyPair {
    fn clone(&self) -> Self {
        Self {
            secret: self.secret,
            public: self.public,
        }
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Verify a compact signature over a 32-byte digest.
pub fn verify_signature(
    pubkey: &[u8],
    digest: &Hash256,
    signature: &[u8],
) -> Result<(), TxUnlockError> {
    let public = PublicKey::from_slice(pubkey).map_err(|_| TxUnlockError::InvalidPubkey)?;
    let signature = Signature::from_compact(signature).map_err(|_| TxUnlockError::BadSignature)?;
    let message = Message::from_digest(*digest.as_bytes());
    SECP256K1
        .verify_ecdsa(&message, &signature, &public)
        .map_err(|_| TxUnlockError::BadSignature)
}

/// Build the digest signed to spend an output.
pub fn build_spend_message(
    to_spend: &OutPoint,
    pubkey: &[u8],
    sequence: u32,
    txouts: &[TxOut],
) -> Result<Hash256, CodecError> {
    let mut text = codec::serialize(to_spend)?;
    text.push_str(&sequence.to_string());
    text.push_str(&hex::encode(pubkey));
    text.push_str(&codec::serialize(&txouts)?);
    Ok(codec::sha256d(text))
}
