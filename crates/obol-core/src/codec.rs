//! Canonical serialization and double-SHA-256 hashing.
//!
//! Every domain value serializes to a compact JSON text with a stable field
//! order (struct declaration order), so equal values always produce identical
//! bytes and `sha256d(serialize(x))` is a usable identity. Byte-string fields
//! are encoded as lowercase hex via the [`hexbytes`] serde helpers; wire
//! messages carry a serde type tag so the decoder reconstructs the exact
//! variant.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::CodecError;
use crate::types::Hash256;

/// Serialize a domain value to its canonical text form.
pub fn serialize<T: Serialize>(value: &T) -> Result<String, CodecError> {
    serde_json::to_string(value).map_err(|e| CodecError::Serialize(e.to_string()))
}

/// Decode a domain value from its canonical text form.
pub fn deserialize<T: DeserializeOwned>(text: &str) -> Result<T, CodecError> {
    serde_json::from_str(text).map_err(|e| CodecError::Deserialize(e.to_string()))
}

/// Double SHA-256 over arbitrary bytes.
pub fn sha256d(data: impl AsRef<[u8]>) -> Hash256 {
    let first = Sha256::digest(data.as_ref());
    Hash256(Sha256::digest(first).into())
}

/// Serde helpers encoding `Vec<u8>` as a lowercase hex string.
pub mod hexbytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex::decode(&text).map_err(serde::de::Error::custom)
    }
}

/// Serde helpers encoding `Option<Vec<u8>>` as hex or `null`.
pub mod hexbytes_opt {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(b) => serializer.serialize_some(&hex::encode(b)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let text = Option::<String>::deserialize(deserializer)?;
        text.map(|t| hex::decode(&t).map_err(serde::de::Error::custom))
            .transpose()
    }
}
