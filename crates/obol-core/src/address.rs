//! Pay-to-public-key-hash address derivation.
//!
//! `address = base58check(0x00 || RIPEMD160(SHA256(pubkey)))`, the classic
//! versioned-payload scheme. The base58check checksum is handled by `bs58`'s
//! `check` feature.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Version byte prepended to the hashed public key.
const ADDRESS_VERSION: u8 = 0x00;

/// Derive the base58check address owning a public key.
pub fn pubkey_to_address(pubkey: &[u8]) -> String {
    let sha = Sha256::digest(pubkey);
    let ripe = Ripemd160::digest(sha);

    let mut payload = Vec::with_capacity(1 + ripe.len());
    payload.push(ADDRESS_VERSION);
    payload.extend_from_slice(&ripe);

    bs58::encode(payload).with_check().into_string()
}
