//! # obol-node
//! Node composition for Obol: the peer protocol and its dispatcher, the TCP
//! acceptor, outbound gossip, and the mining loop.

pub mod client;
pub mod config;
pub mod miner;
pub mod node;
pub mod protocol;
pub mod server;

pub use config::NodeConfig;
pub use node::{Node, NodeError};
pub use protocol::{Inventory, Message};
