//! The mining loop.
//!
//! The nonce search runs on a blocking thread and never holds the chain
//! lock: the candidate is assembled under the lock, then solved outside it.
//! An edge-triggered interrupt flag, set whenever the active chain grows or
//! reorganizes, makes the miner abandon stale candidates and reassemble
//! against the new tip.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use obol_core::codec::sha256d;
use obol_core::types::Block;

use crate::node::Node;

/// How many nonces to try between interrupt polls.
const INTERRUPT_POLL_INTERVAL: u64 = 10_000;

/// Search nonces from zero until the header hash satisfies the block's bits.
///
/// Clears the interrupt at the start of the attempt; on observing it set,
/// clears it again and returns `None` so the caller can rebuild against the
/// new tip.
pub fn mine(mut block: Block, interrupt: &AtomicBool) -> Option<Block> {
    let start = Instant::now();
    let mut nonce: u64 = 0;
    interrupt.store(false, Ordering::SeqCst);

    while sha256d(block.header_string(nonce)).leading_zero_bits() < block.bits as u32 {
        nonce += 1;

        if nonce % INTERRUPT_POLL_INTERVAL == 0 && interrupt.load(Ordering::SeqCst) {
            info!("[mining] interrupted");
            interrupt.store(false, Ordering::SeqCst);
            return None;
        }
    }

    block.nonce = nonce;
    let secs = start.elapsed().as_secs_f64().max(0.001);
    let khs = (nonce as f64 / secs) / 1000.0;
    info!("block found! {secs:.1} s - {khs:.0} KH/s - {}", block.id());

    Some(block)
}

/// Assemble and solve candidate blocks forever, connecting each solution.
pub async fn mine_forever(node: Arc<Node>) {
    loop {
        let worker = {
            let node = node.clone();
            tokio::task::spawn_blocking(move || {
                let candidate = match node.assemble_candidate() {
                    Ok(candidate) => candidate,
                    Err(err) => {
                        warn!("[mining] could not assemble a candidate: {err}");
                        return None;
                    }
                };
                mine(candidate, node.mine_interrupt())
            })
        };

        match worker.await {
            Ok(Some(block)) => {
                node.submit_block(block);
            }
            Ok(None) => {
                // Interrupted or unassemblable; rebuild against the new tip.
            }
            Err(err) => {
                warn!("[mining] worker panicked: {err}");
                return;
            }
        }
    }
}
