//! Node composition and inbound message dispatch.
//!
//! [`Node`] wires the consensus state (one mutex around [`ChainState`]), the
//! wallet, the static peer list, the miner interrupt, and an outbound gossip
//! queue. Handlers take the chain lock only for the mutating operation;
//! gossip happens after the mutation completes, from a dedicated task that
//! opens a fresh connection per message.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::{Mutex, MutexGuard};
use rand::seq::SliceRandom;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use obol_core::chain::{
    AcceptOutcome, ChainState, ConnectOutcome, ACTIVE_CHAIN_IDX, GETBLOCKS_CHUNK_SIZE,
};
use obol_core::error::{ChainError, CodecError};
use obol_core::genesis::genesis_block;
use obol_core::types::{Block, Hash256, Transaction};
use obol_wallet::{build_send_txn, Wallet, WalletError};

use crate::client;
use crate::config::NodeConfig;
use crate::protocol::{Inventory, Message};

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("i/o: {0}")] Io(#[from] std::io::Error),
    #[error(transparent)] Codec(#[from] CodecError),
    #[error(transparent)] Wallet(#[from] WalletError),
}

/// Current UNIX time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// A running Obol node: consensus state, wallet, peers, miner interrupt.
pub struct Node {
    chain: Mutex<ChainState>,
    wallet: Wallet,
    peers: Vec<String>,
    /// Edge-triggered signal telling the miner its candidate went stale.
    mine_interrupt: AtomicBool,
    outbound: mpsc::UnboundedSender<(String, Message)>,
}

impl Node {
    /// Build a node from configuration plus its outbound gossip queue.
    /// The caller drives the returned receiver with [`run_gossip`].
    pub fn new(
        config: &NodeConfig,
        wallet: Wallet,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<(String, Message)>) {
        Self::with_chain(ChainState::new(), wallet, config.peers.clone())
    }

    /// Build a node around an existing chain state (tests inject overridden
    /// consensus parameters this way).
    pub fn with_chain(
        chain: ChainState,
        wallet: Wallet,
        peers: Vec<String>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<(String, Message)>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        let node = Arc::new(Self {
            chain: Mutex::new(chain),
            wallet,
            peers,
            mine_interrupt: AtomicBool::new(false),
            outbound,
        });
        (node, rx)
    }

    /// Connect the genesis literal on an empty chain.
    pub fn bootstrap(&self) {
        let mut chain = self.chain.lock();
        if chain.height() == 0 {
            chain
                .connect_block(genesis_block(), unix_now())
                .expect("the genesis literal always connects on an empty chain");
        }
    }

    pub fn chain(&self) -> MutexGuard<'_, ChainState> {
        self.chain.lock()
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn mine_interrupt(&self) -> &AtomicBool {
        &self.mine_interrupt
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Handle one inbound message, returning the reply to write on the same
    /// connection, if the message calls for one.
    pub async fn handle_message(
        self: &Arc<Self>,
        msg: Message,
    ) -> Result<Option<String>, NodeError> {
        match msg {
            Message::Txn { txn } => {
                self.accept_txn(txn);
                Ok(None)
            }
            Message::Block { block } => {
                self.submit_block(block);
                Ok(None)
            }
            Message::GetBlocks { from_blockid } => {
                let blocks = self.blocks_after(&from_blockid);
                debug!("[p2p] serving {} blocks from getblocks", blocks.len());
                let reply = Message::Inv {
                    inv: Inventory::Blocks(blocks),
                }
                .encode()?;
                Ok(Some(reply))
            }
            Message::Inv { inv } => {
                self.handle_inv(inv).await;
                Ok(None)
            }
            Message::Balance { addr } => {
                let balance = self.chain.lock().balance(&addr);
                Ok(Some(balance.to_string()))
            }
            Message::Send { addr, value } => {
                self.handle_send(&addr, value)?;
                Ok(None)
            }
            Message::GetMempool => {
                let txids = self.chain.lock().mempool().txids();
                Ok(Some(obol_core::codec::serialize(&txids)?))
            }
        }
    }

    // ------------------------------------------------------------------
    // State changes
    // ------------------------------------------------------------------

    /// Run a transaction through mempool admission and gossip it on success.
    pub fn accept_txn(&self, txn: Transaction) -> Option<AcceptOutcome> {
        let outcome = self.chain.lock().accept_txn(txn.clone());
        match outcome {
            Ok(AcceptOutcome::Accepted(txid)) => {
                self.gossip(Message::Txn { txn });
                Some(AcceptOutcome::Accepted(txid))
            }
            Ok(outcome) => Some(outcome),
            Err(err) => {
                debug!("txn rejected: {err}");
                None
            }
        }
    }

    /// Connect a block; on success interrupt the miner as needed and gossip
    /// the block to all peers.
    pub fn submit_block(&self, block: Block) -> Option<ConnectOutcome> {
        let outcome = self.chain.lock().connect_block(block.clone(), unix_now());
        match outcome {
            Ok(outcome) => {
                if outcome.extends_active_chain() {
                    self.mine_interrupt.store(true, Ordering::SeqCst);
                }
                if matches!(outcome, ConnectOutcome::Connected { .. }) {
                    self.gossip(Message::Block { block });
                }
                Some(outcome)
            }
            Err(err) => {
                warn!("block {} rejected: {err}", block.id());
                None
            }
        }
    }

    /// Assemble an unmined candidate block on the current tip.
    pub fn assemble_candidate(&self) -> Result<Block, ChainError> {
        self.chain
            .lock()
            .assemble_candidate_block(self.wallet.address(), unix_now())
    }

    /// Page of active-chain blocks following a locator, for `GetBlocks`.
    ///
    /// An unknown locator (or the genesis block) starts the page at height 1.
    pub fn blocks_after(&self, from_blockid: &Hash256) -> Vec<Block> {
        let chain = self.chain.lock();
        let start = match chain.find_block(from_blockid) {
            Some((ACTIVE_CHAIN_IDX, idx)) if idx > 0 => idx,
            _ => 1,
        };
        let active = chain.active_chain();
        let start = start.min(active.len());
        let end = (start + GETBLOCKS_CHUNK_SIZE).min(active.len());
        active[start..end].to_vec()
    }

    /// Handle an inventory announcement.
    async fn handle_inv(self: &Arc<Self>, inv: Inventory) {
        match inv {
            Inventory::Blocks(blocks) => {
                let unseen: Vec<Block> = {
                    let chain = self.chain.lock();
                    blocks
                        .into_iter()
                        .filter(|b| chain.find_block(&b.id()).is_none())
                        .collect()
                };
                if unseen.is_empty() {
                    return;
                }
                for block in unseen {
                    self.submit_block(block);
                }
                // Something new arrived; ask a peer for the next batch.
                let chosen_peer = self.peers.choose(&mut rand::thread_rng()).cloned();
                if let Some(peer) = chosen_peer {
                    self.sync_from(&peer).await;
                }
            }
            Inventory::Txns(txns) => {
                let mut chain = self.chain.lock();
                for txn in txns {
                    match chain.insert_mempool_txn(txn) {
                        Ok(txid) => debug!("inv txn {txid} inserted"),
                        Err(err) => warn!("dropping undecodable inv txn: {err}"),
                    }
                }
            }
        }
    }

    /// Pull blocks from a peer until a page yields nothing new.
    pub async fn sync_from(self: &Arc<Self>, peer: &str) {
        loop {
            let tip_id = match self.chain.lock().tip() {
                Some(tip) => tip.id(),
                None => return,
            };
            let request = Message::GetBlocks {
                from_blockid: tip_id,
            };
            let reply = match client::request(peer, &request).await {
                Ok(reply) => reply,
                Err(err) => {
                    warn!("getblocks to {peer} failed: {err}");
                    return;
                }
            };
            let blocks = match Message::decode(&reply) {
                Ok(Message::Inv {
                    inv: Inventory::Blocks(blocks),
                }) => blocks,
                Ok(other) => {
                    warn!("unexpected getblocks reply: {other:?}");
                    return;
                }
                Err(err) => {
                    warn!("undecodable getblocks reply: {err}");
                    return;
                }
            };

            let unseen: Vec<Block> = {
                let chain = self.chain.lock();
                blocks
                    .into_iter()
                    .filter(|b| chain.find_block(&b.id()).is_none())
                    .collect()
            };
            if unseen.is_empty() {
                return;
            }
            info!("[p2p] connecting {} blocks from {peer}", unseen.len());
            for block in unseen {
                self.submit_block(block);
            }
        }
    }

    /// Initial block download against every configured peer.
    pub async fn sync_with_peers(self: &Arc<Self>) {
        for peer in self.peers.clone() {
            self.sync_from(&peer).await;
        }
    }

    /// Pay `value` belushis to `addr` from this node's wallet and submit the
    /// transaction through normal mempool admission.
    fn handle_send(&self, addr: &str, value: u64) -> Result<(), NodeError> {
        let txn = {
            let chain = self.chain.lock();
            let utxos = chain.utxos_for_address(self.wallet.address());
            build_send_txn(&utxos, addr, value, self.wallet.keypair())?
        };
        info!("submitting to network: {}", txn.id()?);
        self.accept_txn(txn);
        Ok(())
    }

    /// Queue a message for every configured peer.
    fn gossip(&self, msg: Message) {
        for peer in &self.peers {
            if self.outbound.send((peer.clone(), msg.clone())).is_err() {
                warn!("gossip queue closed; dropping message for {peer}");
            }
        }
    }
}

/// Drain the outbound queue, one fresh connection per message.
pub async fn run_gossip(mut rx: mpsc::UnboundedReceiver<(String, Message)>) {
    while let Some((peer, msg)) = rx.recv().await {
        if let Err(err) = client::send_to_peer(&peer, &msg).await {
            warn!("failed to send to peer {peer}: {err}");
        }
    }
}
