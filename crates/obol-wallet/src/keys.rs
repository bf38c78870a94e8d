//! Key-file persistence.
//!
//! A wallet owns exactly one signing key, stored as its raw 32-byte secret
//! encoding. The file is read once at startup; if it does not exist, a new
//! key is generated and written.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use obol_core::crypto::KeyPair;

use crate::error::WalletError;

/// A single-key wallet bound to its on-disk file.
pub struct Wallet {
    keypair: KeyPair,
    address: String,
    path: PathBuf,
}

impl Wallet {
    /// Load the key from `path`, generating and persisting a fresh one if
    /// the file does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self, WalletError> {
        let keypair = match fs::read(path) {
            Ok(bytes) => KeyPair::from_secret_bytes(&bytes).map_err(WalletError::InvalidKey)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!("no wallet at {}; generating new signing key", path.display());
                let keypair = KeyPair::generate();
                fs::write(path, keypair.secret_bytes())?;
                keypair
            }
            Err(err) => return Err(err.into()),
        };

        let address = keypair.address();
        Ok(Self {
            keypair,
            address,
            path: path.to_path_buf(),
        })
    }

    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }

    /// The base58check address this wallet receives to.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
