//! Node configuration.
//!
//! Peers come from the `OBOL_PEERS` environment variable as comma-separated
//! `host:port` entries; everything else is CLI flags with defaults.

use std::path::PathBuf;

use obol_core::constants::DEFAULT_PORT;

/// Environment variable holding the static peer list.
pub const PEERS_ENV: &str = "OBOL_PEERS";

#[derive(Clone, Debug)]
pub struct NodeConfig {
    /// TCP port the peer protocol listens on (all interfaces).
    pub listen_port: u16,
    /// Path of the raw private-key wallet file.
    pub wallet_path: PathBuf,
    /// Static `host:port` peers gossiped to after every state change.
    pub peers: Vec<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_port: DEFAULT_PORT,
            wallet_path: PathBuf::from("wallet.dat"),
            peers: peers_from_env(),
        }
    }
}

/// Parse the peer list from [`PEERS_ENV`]. Empty entries are dropped.
pub fn peers_from_env() -> Vec<String> {
    std::env::var(PEERS_ENV)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_listens_on_protocol_port() {
        // Can't touch the process environment safely in parallel tests, so
        // only the flag defaults are checked here.
        let config = NodeConfig {
            peers: Vec::new(),
            ..NodeConfig::default()
        };
        assert_eq!(config.listen_port, 9999);
        assert_eq!(config.wallet_path, PathBuf::from("wallet.dat"));
    }
}
