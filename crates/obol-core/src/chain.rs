//! The chain manager: active chain, side branches, and reorganization.
//!
//! [`ChainState`] owns every piece of consensus state — the active chain,
//! side branches, UTXO set, mempool, and orphan lists — so that one mutex
//! around it forms the single mutual-exclusion domain. Helpers that the
//! source material exposed as free functions over globals are `&self`
//! methods here, which keeps `connect_block` and `try_reorg` observationally
//! atomic without needing a reentrant lock.
//!
//! Chain indexing convention: index `0` is the active chain; side branch `i`
//! has chain index `i + 1`. Heights are 1-based (`height() == 1` after the
//! genesis block connects), matching the heights recorded on UTXOs.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::address::pubkey_to_address;
use crate::codec;
use crate::constants::{Params, MAX_BLOCK_SERIALIZED_SIZE, MEDIAN_TIME_PAST_BLOCKS};
use crate::crypto;
use crate::error::{BlockValidationError, ChainError, TxUnlockError, TxnValidationError};
use crate::genesis;
use crate::mempool::Mempool;
use crate::merkle;
use crate::reward;
use crate::types::{Block, Hash256, OutPoint, Transaction, TxIn, TxOut, UnspentTxOut};
use crate::utxo::UtxoSet;

/// Chain index of the active chain in [`ChainState::find_block`] results.
pub const ACTIVE_CHAIN_IDX: usize = 0;

/// Blocks returned per `GetBlocks` page.
pub const GETBLOCKS_CHUNK_SIZE: usize = 50;

/// Result of [`ChainState::connect_block`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// The block was appended to the chain with the given index. `reorged`
    /// is set when the connection triggered a successful reorganization.
    Connected { chain_idx: usize, reorged: bool },
    /// The block id was already present in some chain; dropped silently.
    Duplicate,
    /// The block's parent is unknown; it was queued on the orphan list.
    Orphaned,
}

impl ConnectOutcome {
    /// Whether this connection grew or replaced the active chain, i.e.
    /// whether the miner should abandon its current candidate.
    pub fn extends_active_chain(&self) -> bool {
        matches!(
            self,
            Self::Connected { chain_idx: ACTIVE_CHAIN_IDX, .. }
                | Self::Connected { reorged: true, .. }
        )
    }
}

/// Result of [`ChainState::accept_txn`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// Validated and inserted into the mempool; worth gossiping.
    Accepted(Hash256),
    /// Inputs referenced unknown UTXOs; queued on the orphan list.
    Orphaned(Hash256),
}

/// All consensus state, guarded by a single external mutex.
pub struct ChainState {
    /// The highest-work valid chain. Index 0 is the genesis block.
    active_chain: Vec<Block>,
    /// Branches off the active chain; branch `i` is chain index `i + 1`.
    side_branches: Vec<Vec<Block>>,
    utxo_set: UtxoSet,
    mempool: Mempool,
    /// Blocks whose parent is unknown. Stored, never reprocessed.
    orphan_blocks: Vec<Block>,
    /// Transactions whose inputs reference unknown UTXOs. Stored, never
    /// reprocessed.
    orphan_txns: Vec<Transaction>,
    params: Params,
}

impl Default for ChainState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainState {
    pub fn new() -> Self {
        Self {
            active_chain: Vec::new(),
            side_branches: Vec::new(),
            utxo_set: UtxoSet::new(),
            mempool: Mempool::new(),
            orphan_blocks: Vec::new(),
            orphan_txns: Vec::new(),
            params: Params::default(),
        }
    }

    /// Build a chain state with overridden consensus parameters.
    ///
    /// Test-only: lets suites lower the difficulty or shrink the retarget
    /// period so blocks can be mined in microseconds.
    #[cfg(any(test, feature = "testing"))]
    pub fn with_params(params: Params) -> Self {
        Self {
            params,
            ..Self::new()
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Current height: the number of blocks in the active chain.
    pub fn height(&self) -> u64 {
        self.active_chain.len() as u64
    }

    pub fn tip(&self) -> Option<&Block> {
        self.active_chain.last()
    }

    pub fn active_chain(&self) -> &[Block] {
        &self.active_chain
    }

    pub fn side_branches(&self) -> &[Vec<Block>] {
        &self.side_branches
    }

    pub fn utxo_set(&self) -> &UtxoSet {
        &self.utxo_set
    }

    pub fn mempool(&self) -> &Mempool {
        &self.mempool
    }

    pub fn orphan_blocks(&self) -> &[Block] {
        &self.orphan_blocks
    }

    pub fn orphan_txns(&self) -> &[Transaction] {
        &self.orphan_txns
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Locate a block by id across the active chain and all side branches.
    ///
    /// Returns `(chain_idx, height_idx)` where `height_idx` is the 0-based
    /// position within that chain.
    pub fn find_block(&self, block_id: &Hash256) -> Option<(usize, usize)> {
        for (chain_idx, chain) in self.chains().enumerate() {
            for (height_idx, block) in chain.iter().enumerate() {
                if block.id() == *block_id {
                    return Some((chain_idx, height_idx));
                }
            }
        }
        None
    }

    fn chains(&self) -> impl Iterator<Item = &Vec<Block>> {
        std::iter::once(&self.active_chain).chain(self.side_branches.iter())
    }

    fn chain(&self, chain_idx: usize) -> &Vec<Block> {
        if chain_idx == ACTIVE_CHAIN_IDX {
            &self.active_chain
        } else {
            &self.side_branches[chain_idx - 1]
        }
    }

    /// Timestamp of the median element among the last `n` active blocks,
    /// walking newest-first. Zero on an empty chain.
    pub fn median_time_past(&self, n: usize) -> u64 {
        let recent: Vec<u64> = self
            .active_chain
            .iter()
            .rev()
            .take(n)
            .map(|b| b.timestamp)
            .collect();
        if recent.is_empty() {
            0
        } else {
            recent[recent.len() / 2]
        }
    }

    // ------------------------------------------------------------------
    // Proof-of-work schedule
    // ------------------------------------------------------------------

    /// Difficulty required of the block following `prev_block_hash`.
    ///
    /// `None` when the hash is unknown to every chain. With no previous
    /// block at all, the initial difficulty applies.
    pub fn next_work_required(&self, prev_block_hash: Option<&Hash256>) -> Option<u8> {
        match prev_block_hash {
            None => Some(self.params.initial_difficulty_bits),
            Some(hash) => {
                let located = self.find_block(hash)?;
                Some(self.next_work_required_located(Some(located)))
            }
        }
    }

    fn next_work_required_located(&self, prev: Option<(usize, usize)>) -> u8 {
        let Some((chain_idx, height_idx)) = prev else {
            return self.params.initial_difficulty_bits;
        };
        let prev_block = &self.chain(chain_idx)[height_idx];

        // The genesis literal's bits are historical data, not a difficulty
        // signal: the first mined period runs at the initial difficulty.
        if prev_block.prev_block_hash.is_none() {
            return self.params.initial_difficulty_bits;
        }

        let period = self.params.difficulty_period_in_blocks;
        if (height_idx as u64 + 1) % period != 0 {
            return prev_block.bits;
        }

        let start_idx = (height_idx as u64).saturating_sub(period - 1) as usize;
        let Some(period_start) = self.active_chain.get(start_idx) else {
            return prev_block.bits;
        };

        let elapsed = prev_block.timestamp.saturating_sub(period_start.timestamp);
        match elapsed.cmp(&self.params.difficulty_period_in_secs_target) {
            std::cmp::Ordering::Less => prev_block.bits.saturating_add(1),
            std::cmp::Ordering::Greater => prev_block.bits.saturating_sub(1),
            std::cmp::Ordering::Equal => prev_block.bits,
        }
    }

    // ------------------------------------------------------------------
    // Transaction validation
    // ------------------------------------------------------------------

    /// Full contextual validation of a transaction.
    ///
    /// `allow_mempool_utxos` lets inputs spend outputs of transactions that
    /// are still in the mempool (used for mempool admission, never for
    /// block connection). An input whose UTXO cannot be found in either
    /// place fails with the orphan marker carrying the transaction.
    pub fn validate_txn(
        &self,
        txn: &Transaction,
        as_coinbase: bool,
        allow_mempool_utxos: bool,
    ) -> Result<(), TxnValidationError> {
        txn.validate_basics(as_coinbase)?;

        let mut available: u64 = 0;

        for (index, txin) in txn.txins.iter().enumerate() {
            let utxo = txin.to_spend.as_ref().and_then(|op| {
                self.utxo_set.get(op).cloned().or_else(|| {
                    if allow_mempool_utxos {
                        self.mempool.find_utxo(op)
                    } else {
                        None
                    }
                })
            });
            let Some(utxo) = utxo else {
                return Err(TxnValidationError::MissingUtxo {
                    index,
                    orphan: Box::new(txn.clone()),
                });
            };

            if utxo.is_coinbase
                && (self.height() as i64 - utxo.height) < self.params.coinbase_maturity as i64
            {
                return Err(TxnValidationError::ImmatureCoinbase {
                    outpoint: utxo.outpoint(),
                });
            }

            check_unlock(index, txin, &utxo, &txn.txouts)?;

            available = available.saturating_add(utxo.value);
        }

        let spending = txn.total_output_value();
        if available < spending {
            return Err(TxnValidationError::InsufficientInputValue {
                have: available,
                need: spending,
            });
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Block validation
    // ------------------------------------------------------------------

    /// Validate a block and determine the chain it attaches to.
    ///
    /// Returns the chain index: `0` for an active-chain extension, `i + 1`
    /// for side branch `i` (which may be one past the current branch count
    /// when the block opens a new fork off the middle of the active chain —
    /// the caller allocates the slot).
    ///
    /// A block attaching to a side branch only receives structural checks;
    /// full transaction validation happens if the branch later wins a
    /// reorganization.
    pub fn validate_block(&self, block: &Block, now: u64) -> Result<usize, BlockValidationError> {
        if block.txns.is_empty() {
            return Err(BlockValidationError::NoTransactions);
        }

        // An empty chain admits the genesis literal by identity; it carries
        // historical bits no retarget schedule would reproduce.
        if block.prev_block_hash.is_none() && self.active_chain.is_empty() {
            return if genesis::is_genesis(block) {
                Ok(ACTIVE_CHAIN_IDX)
            } else {
                Err(BlockValidationError::BadGenesis)
            };
        }

        if block.timestamp > now + self.params.max_future_block_time {
            return Err(BlockValidationError::TimestampTooFarInFuture);
        }

        if block.id().leading_zero_bits() < block.bits as u32 {
            return Err(BlockValidationError::InsufficientWork);
        }

        let coinbase_positions: Vec<usize> = block
            .txns
            .iter()
            .enumerate()
            .filter(|(_, tx)| tx.is_coinbase())
            .map(|(i, _)| i)
            .collect();
        if coinbase_positions != [0] {
            return Err(BlockValidationError::BadCoinbasePlacement);
        }

        for (index, txn) in block.txns.iter().enumerate() {
            txn.validate_basics(index == 0)
                .map_err(|source| BlockValidationError::Transaction { index, source })?;
        }

        let txids = block
            .txns
            .iter()
            .map(|t| t.id())
            .collect::<Result<Vec<_>, _>>()?;
        let root = merkle::merkle_root(&txids).ok_or(BlockValidationError::NoTransactions)?;
        if root != block.merkle_hash {
            return Err(BlockValidationError::MerkleMismatch);
        }

        // Locate the parent before the difficulty check: the retarget
        // schedule is anchored at the parent's height.
        let located = block
            .prev_block_hash
            .as_ref()
            .and_then(|hash| self.find_block(hash));
        let Some((prev_chain_idx, prev_height_idx)) = located else {
            return Err(BlockValidationError::UnknownParent {
                orphan: Box::new(block.clone()),
            });
        };

        let expected_bits = self.next_work_required_located(Some((prev_chain_idx, prev_height_idx)));
        if block.bits != expected_bits {
            return Err(BlockValidationError::IncorrectBits {
                got: block.bits,
                expected: expected_bits,
            });
        }

        if block.timestamp <= self.median_time_past(MEDIAN_TIME_PAST_BLOCKS) {
            return Err(BlockValidationError::TimestampTooOld);
        }

        // Attaching to a side branch: no further validation here.
        if prev_chain_idx != ACTIVE_CHAIN_IDX {
            return Ok(prev_chain_idx);
        }

        // Parent is in the active chain but not the tip: a new fork opens in
        // the first unused side-branch slot.
        if prev_height_idx != self.active_chain.len() - 1 {
            return Ok(self.side_branches.len() + 1);
        }

        // Extending the active tip: validate every spend against the
        // committed UTXO set only.
        for (index, txn) in block.txns.iter().enumerate().skip(1) {
            self.validate_txn(txn, false, false)
                .map_err(|source| BlockValidationError::Transaction { index, source })?;
        }

        Ok(ACTIVE_CHAIN_IDX)
    }

    // ------------------------------------------------------------------
    // Connection / disconnection
    // ------------------------------------------------------------------

    /// Validate a block and append it to the chain it belongs to.
    ///
    /// Active-chain extensions update the UTXO set and evict mined
    /// transactions from the mempool; a successful connect may trigger a
    /// reorganization to a now-taller side branch.
    pub fn connect_block(
        &mut self,
        block: Block,
        now: u64,
    ) -> Result<ConnectOutcome, BlockValidationError> {
        let block_id = block.id();

        let chain_idx = match self.validate_block(&block, now) {
            Ok(idx) => idx,
            Err(err) => {
                if let Some(orphan) = err.to_orphan() {
                    info!("saw orphan block {block_id}");
                    self.orphan_blocks.push(orphan.clone());
                    return Ok(ConnectOutcome::Orphaned);
                }
                warn!("block {block_id} failed validation: {err}");
                return Err(err);
            }
        };

        if self.find_block(&block_id).is_some() {
            debug!("ignoring block already seen: {block_id}");
            return Ok(ConnectOutcome::Duplicate);
        }

        info!("connecting block {block_id} to chain {chain_idx}");
        let txn_count = block.txns.len();

        if chain_idx == ACTIVE_CHAIN_IDX {
            self.apply_to_active(block)?;
        } else {
            let slot = chain_idx - 1;
            if slot < self.side_branches.len() {
                self.side_branches[slot].push(block);
            } else {
                self.side_branches.push(vec![block]);
            }
        }

        let reorged = self.reorg_if_necessary(now);
        if reorged || chain_idx == ACTIVE_CHAIN_IDX {
            info!(
                "block accepted height={} txns={txn_count}",
                self.height()
            );
        }

        Ok(ConnectOutcome::Connected { chain_idx, reorged })
    }

    /// Append a validated block to the active chain, spending its inputs,
    /// indexing its outputs at the new height, and evicting its
    /// transactions from the mempool.
    fn apply_to_active(&mut self, block: Block) -> Result<(), BlockValidationError> {
        let height = self.active_chain.len() as i64 + 1;

        for tx in &block.txns {
            let txid = tx.id()?;
            self.mempool.remove(&txid);

            if !tx.is_coinbase() {
                for txin in &tx.txins {
                    if let Some(op) = &txin.to_spend {
                        if self.utxo_set.remove(op).is_none() {
                            warn!("spent output {op} was missing from the UTXO set");
                        }
                    }
                }
            }
            self.utxo_set.add_transaction(tx, txid, height);
        }

        self.active_chain.push(block);
        Ok(())
    }

    /// Disconnect the active tip, resurrecting the outputs it spent and
    /// returning its non-coinbase transactions to the mempool.
    pub fn disconnect_tip(&mut self) -> Result<Block, ChainError> {
        let block = self
            .active_chain
            .last()
            .cloned()
            .ok_or(ChainError::EmptyChain)?;

        for tx in &block.txns {
            let txid = tx.id().map_err(ChainError::Codec)?;

            if !tx.is_coinbase() {
                self.mempool.insert(txid, tx.clone());

                for txin in &tx.txins {
                    let Some(op) = &txin.to_spend else { continue };
                    match self.find_txout_for_txin(op) {
                        Some((txout, src_is_coinbase, src_height)) => {
                            self.utxo_set
                                .add(&txout, op.txid, op.index, src_is_coinbase, src_height);
                        }
                        None => warn!("no spent output found to resurrect for {op}"),
                    }
                }
            }

            for idx in 0..tx.txouts.len() {
                self.utxo_set.remove(&OutPoint {
                    txid,
                    index: idx as u32,
                });
            }
        }

        self.active_chain.pop();
        info!("block {} disconnected", block.id());
        Ok(block)
    }

    /// Look up the output a disconnected input had spent by scanning the
    /// active chain. Returns the output plus its producing transaction's
    /// coinbase flag and 1-based height.
    fn find_txout_for_txin(&self, op: &OutPoint) -> Option<(TxOut, bool, i64)> {
        for (idx, block) in self.active_chain.iter().enumerate() {
            for tx in &block.txns {
                if tx.id().ok()? != op.txid {
                    continue;
                }
                let txout = tx.txouts.get(op.index as usize)?.clone();
                return Some((txout, tx.is_coinbase(), idx as i64 + 1));
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Reorganization
    // ------------------------------------------------------------------

    /// Switch to any side branch whose tip now stands taller than the
    /// active chain. Greedy on tip height; ties stay with the active chain.
    fn reorg_if_necessary(&mut self, now: u64) -> bool {
        let mut reorged = false;

        for branch_idx in 0..self.side_branches.len() {
            let Some(fork_idx) = self.fork_index(branch_idx) else {
                continue;
            };
            let fork_height = fork_idx as u64 + 1;
            let branch_height = fork_height + self.side_branches[branch_idx].len() as u64;
            if branch_height > self.height() {
                reorged |= self.try_reorg(branch_idx, fork_idx, now);
            }
        }

        reorged
    }

    /// Index in the active chain of the block a side branch forks from.
    fn fork_index(&self, branch_idx: usize) -> Option<usize> {
        let first = self.side_branches[branch_idx].first()?;
        let prev_hash = first.prev_block_hash.as_ref()?;
        self.active_chain.iter().position(|b| b.id() == *prev_hash)
    }

    /// Attempt to replace the active tail past `fork_idx` with a side
    /// branch. On any branch-block validation failure the previous active
    /// chain, UTXO set, and mempool are restored and the branch is left in
    /// place.
    fn try_reorg(&mut self, branch_idx: usize, fork_idx: usize, now: u64) -> bool {
        let branch = self.side_branches[branch_idx].clone();
        info!(
            "attempting reorg to branch {} forking at height {}",
            branch_idx + 1,
            fork_idx + 1
        );

        let mempool_before = self.mempool.clone();

        // Disconnect the displaced tail, tip first, remembering chain order.
        let mut old_active = Vec::new();
        while self.active_chain.len() > fork_idx + 1 {
            match self.disconnect_tip() {
                Ok(block) => old_active.insert(0, block),
                Err(err) => {
                    warn!("disconnect during reorg failed: {err}");
                    return false;
                }
            }
        }

        // Connect the branch with full validation, tracking how far we got.
        let mut connected = 0usize;
        let mut failed = false;
        for block in &branch {
            match self.validate_block(block, now) {
                Ok(ACTIVE_CHAIN_IDX) => {
                    if self.apply_to_active(block.clone()).is_err() {
                        failed = true;
                        break;
                    }
                    connected += 1;
                }
                Ok(_) | Err(_) => {
                    info!("block reorg failed - block {} invalid", block.id());
                    failed = true;
                    break;
                }
            }
        }

        if failed {
            for _ in 0..connected {
                if let Err(err) = self.disconnect_tip() {
                    warn!("rollback disconnect failed: {err}");
                }
            }
            for block in old_active {
                if let Err(err) = self.apply_to_active(block) {
                    warn!("rollback reconnect failed: {err}");
                }
            }
            self.mempool = mempool_before;
            return false;
        }

        // The displaced tail becomes the new alternative branch.
        self.side_branches[branch_idx] = old_active;

        info!(
            "chain reorg! new height: {}, tip: {}",
            self.height(),
            self.tip().map(|b| b.id().to_string()).unwrap_or_default()
        );
        true
    }

    // ------------------------------------------------------------------
    // Mempool admission
    // ------------------------------------------------------------------

    /// Validate a transaction for mempool admission.
    ///
    /// Orphan-marked failures queue the transaction instead of erroring;
    /// any other failure is returned for the caller to log and drop.
    pub fn accept_txn(&mut self, txn: Transaction) -> Result<AcceptOutcome, TxnValidationError> {
        let txid = txn.id()?;

        match self.validate_txn(&txn, false, true) {
            Ok(()) => {
                info!("txn {txid} added to mempool");
                self.mempool.insert(txid, txn);
                Ok(AcceptOutcome::Accepted(txid))
            }
            Err(err) => {
                if let Some(orphan) = err.to_orphan() {
                    info!("txn {txid} submitted as orphan");
                    self.orphan_txns.push(orphan.clone());
                    Ok(AcceptOutcome::Orphaned(txid))
                } else {
                    warn!("txn {txid} rejected: {err}");
                    Err(err)
                }
            }
        }
    }

    /// Insert a peer-announced transaction into the mempool without
    /// revalidation; already-known txids are left untouched.
    pub fn insert_mempool_txn(
        &mut self,
        txn: Transaction,
    ) -> Result<Hash256, crate::error::CodecError> {
        let txid = txn.id()?;
        if !self.mempool.contains(&txid) {
            self.mempool.insert(txid, txn);
        }
        Ok(txid)
    }

    // ------------------------------------------------------------------
    // Block assembly
    // ------------------------------------------------------------------

    /// Build an unmined candidate block on the current tip: mempool
    /// transactions under the size cap, a coinbase paying subsidy plus fees
    /// to `pay_to_addr`, and the merkle root over the result. The nonce
    /// search happens outside the chain lock.
    pub fn assemble_candidate_block(
        &self,
        pay_to_addr: &str,
        now: u64,
    ) -> Result<Block, ChainError> {
        let prev_block_hash = self.tip().map(|b| b.id());
        let prev_located = if self.active_chain.is_empty() {
            None
        } else {
            Some((ACTIVE_CHAIN_IDX, self.active_chain.len() - 1))
        };

        let shell = Block {
            version: 0,
            prev_block_hash,
            merkle_hash: Hash256::default(),
            timestamp: now,
            bits: self.next_work_required_located(prev_located),
            nonce: 0,
            txns: Vec::new(),
        };

        let mut block = self.select_from_mempool(&shell)?;

        let fees = self.calculate_fees(&block)?;
        let coinbase = Transaction::create_coinbase(
            pay_to_addr,
            reward::block_subsidy(self.height()) + fees,
            self.height(),
        );
        block.txns.insert(0, coinbase);

        let txids = block
            .txns
            .iter()
            .map(|t| t.id())
            .collect::<Result<Vec<_>, _>>()
            .map_err(ChainError::Codec)?;
        block.merkle_hash =
            merkle::merkle_root(&txids).expect("candidate block always has a coinbase");

        if codec::serialize(&block)?.len() > MAX_BLOCK_SERIALIZED_SIZE {
            return Err(ChainError::OversizedCandidate);
        }

        Ok(block)
    }

    /// Greedily fill a candidate block from the mempool in insertion order,
    /// pulling in mempool ancestors ahead of their spenders and stopping at
    /// the serialized size cap.
    fn select_from_mempool(&self, shell: &Block) -> Result<Block, ChainError> {
        let mut block = shell.clone();
        let mut added: HashSet<Hash256> = HashSet::new();

        for txid in self.mempool.txids() {
            match self.add_to_block(block.clone(), &txid, &mut added)? {
                AddOutcome::Added(next) => block = next,
                AddOutcome::Skipped => continue,
                AddOutcome::Full => break,
            }
        }

        Ok(block)
    }

    fn add_to_block(
        &self,
        block: Block,
        txid: &Hash256,
        added: &mut HashSet<Hash256>,
    ) -> Result<AddOutcome, ChainError> {
        if added.contains(txid) {
            return Ok(AddOutcome::Added(block));
        }
        let Some(tx) = self.mempool.get(txid).cloned() else {
            return Ok(AddOutcome::Skipped);
        };

        let mut block = block;

        // Any input not spendable from the committed set must be funded by
        // another mempool transaction, which goes into the block first. An
        // unresolvable ancestor disqualifies the whole transaction.
        for txin in &tx.txins {
            let Some(op) = &txin.to_spend else {
                return Ok(AddOutcome::Skipped);
            };
            if self.utxo_set.contains(op) {
                continue;
            }
            let Some(parent) = self.mempool.find_utxo(op) else {
                debug!("no UTXO found for {op}; skipping {txid}");
                return Ok(AddOutcome::Skipped);
            };
            match self.add_to_block(block, &parent.txid, added)? {
                AddOutcome::Added(next) => block = next,
                AddOutcome::Skipped => return Ok(AddOutcome::Skipped),
                AddOutcome::Full => return Ok(AddOutcome::Full),
            }
        }

        let mut candidate = block.clone();
        candidate.txns.push(tx);

        if codec::serialize(&candidate)?.len() < MAX_BLOCK_SERIALIZED_SIZE {
            debug!("added txn {txid} to block");
            added.insert(*txid);
            Ok(AddOutcome::Added(candidate))
        } else {
            Ok(AddOutcome::Full)
        }
    }

    /// Total fees carried by a candidate block's transactions: the excess of
    /// spent input value over output value, with inputs resolved from the
    /// UTXO set or from outputs created earlier in the same block.
    fn calculate_fees(&self, block: &Block) -> Result<u64, ChainError> {
        let mut fees: u64 = 0;

        for tx in &block.txns {
            if tx.is_coinbase() {
                continue;
            }
            let mut spent: u64 = 0;
            for txin in &tx.txins {
                let Some(op) = &txin.to_spend else { continue };
                let value = self
                    .utxo_set
                    .get(op)
                    .map(|u| u.value)
                    .or_else(|| utxo_value_from_block(block, op))
                    .ok_or_else(|| ChainError::MissingFeeSource(op.clone()))?;
                spent = spent.saturating_add(value);
            }
            fees = fees.saturating_add(spent.saturating_sub(tx.total_output_value()));
        }

        Ok(fees)
    }

    // ------------------------------------------------------------------
    // Wallet-facing queries
    // ------------------------------------------------------------------

    /// Committed balance of an address, in belushis.
    pub fn balance(&self, addr: &str) -> u64 {
        self.utxo_set.balance(addr)
    }

    /// Committed UTXOs owned by an address.
    pub fn utxos_for_address(&self, addr: &str) -> Vec<UnspentTxOut> {
        self.utxo_set.find_for_address(addr)
    }
}

enum AddOutcome {
    Added(Block),
    Skipped,
    Full,
}

/// Verify that an input's key and signature unlock the UTXO it spends.
fn check_unlock(
    index: usize,
    txin: &TxIn,
    utxo: &UnspentTxOut,
    txouts: &[TxOut],
) -> Result<(), TxnValidationError> {
    let unlock = |source| TxnValidationError::Unlock { index, source };

    let pk = txin
        .unlock_pk
        .as_deref()
        .ok_or(unlock(TxUnlockError::MissingPubkey))?;

    if pubkey_to_address(pk) != utxo.to_address {
        return Err(unlock(TxUnlockError::PubkeyMismatch));
    }

    let op = txin
        .to_spend
        .as_ref()
        .ok_or(unlock(TxUnlockError::MissingPubkey))?;
    let message = crypto::build_spend_message(op, pk, txin.sequence, txouts)?;
    crypto::verify_signature(pk, &message, &txin.unlock_sig).map_err(unlock)
}

/// Value of an output created earlier in the same candidate block.
fn utxo_value_from_block(block: &Block, op: &OutPoint) -> Option<u64> {
    for tx in &block.txns {
        if tx.id().ok()? == op.txid {
            return tx.txouts.get(op.index as usize).map(|o| o.value);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{BELUSHIS_PER_COIN, MAX_FUTURE_BLOCK_TIME};
    use crate::crypto::KeyPair;
    use crate::genesis::{genesis_block, GENESIS_ADDRESS, GENESIS_OUTPUT_VALUE};

    /// Comfortably after the genesis timestamp.
    const NOW: u64 = 1_600_000_000;

    fn trivial_params() -> Params {
        Params {
            initial_difficulty_bits: 1,
            ..Params::default()
        }
    }

    /// Search nonces until the block satisfies its own bits.
    fn solve(mut block: Block) -> Block {
        while block.id().leading_zero_bits() < block.bits as u32 {
            block.nonce += 1;
        }
        block
    }

    /// Build and solve a block on `prev` with the given transactions.
    fn build_block(prev: &Block, bits: u8, timestamp: u64, txns: Vec<Transaction>) -> Block {
        let txids: Vec<Hash256> = txns.iter().map(|t| t.id().unwrap()).collect();
        solve(Block {
            version: 0,
            prev_block_hash: Some(prev.id()),
            merkle_hash: merkle::merkle_root(&txids).unwrap(),
            timestamp,
            bits,
            nonce: 0,
            txns,
        })
    }

    /// Build a signed single-input, single-output spend of `outpoint`.
    fn make_spend_txn(kp: &KeyPair, outpoint: OutPoint, value: u64, to: &str) -> Transaction {
        let txout = TxOut {
            value,
            to_address: to.to_string(),
        };
        let pk = kp.public_bytes();
        let message =
            crypto::build_spend_message(&outpoint, &pk, 0, std::slice::from_ref(&txout)).unwrap();
        Transaction {
            txins: vec![TxIn {
                to_spend: Some(outpoint),
                unlock_sig: kp.sign(&message),
                unlock_pk: Some(pk),
                sequence: 0,
            }],
            txouts: vec![txout],
            locktime: None,
        }
    }

    /// Mine one block onto the tip via the production assembly path.
    fn mine_next(chain: &mut ChainState, kp: &KeyPair, now: u64) -> Block {
        let candidate = chain.assemble_candidate_block(&kp.address(), now).unwrap();
        let block = solve(candidate);
        let outcome = chain.connect_block(block.clone(), now).unwrap();
        assert!(outcome.extends_active_chain(), "got {outcome:?}");
        block
    }

    // ------------------------------------------------------------------
    // Genesis bootstrap
    // ------------------------------------------------------------------

    #[test]
    fn genesis_bootstrap_creates_initial_utxo() {
        let mut chain = ChainState::new();
        let outcome = chain.connect_block(genesis_block(), NOW).unwrap();
        assert_eq!(
            outcome,
            ConnectOutcome::Connected {
                chain_idx: ACTIVE_CHAIN_IDX,
                reorged: false
            }
        );

        assert_eq!(chain.height(), 1);
        let utxos = chain.utxos_for_address(GENESIS_ADDRESS);
        assert_eq!(utxos.len(), 1);
        assert_eq!(utxos[0].value, GENESIS_OUTPUT_VALUE);
        assert_eq!(utxos[0].height, 1);
        assert_eq!(chain.utxo_set().len(), 1);
    }

    #[test]
    fn non_genesis_block_rejected_on_empty_chain() {
        let chain = ChainState::new();
        let mut fake = genesis_block();
        fake.timestamp += 1;
        assert_eq!(
            chain.validate_block(&fake, NOW),
            Err(BlockValidationError::BadGenesis)
        );
    }

    #[test]
    fn duplicate_genesis_dropped_silently() {
        let mut chain = ChainState::new();
        chain.connect_block(genesis_block(), NOW).unwrap();
        assert_eq!(
            chain.connect_block(genesis_block(), NOW).unwrap(),
            ConnectOutcome::Duplicate
        );
        assert_eq!(chain.height(), 1);
    }

    // ------------------------------------------------------------------
    // Mining after genesis
    // ------------------------------------------------------------------

    #[test]
    fn mining_after_genesis_pays_full_subsidy() {
        let mut chain = ChainState::with_params(trivial_params());
        chain.connect_block(genesis_block(), NOW).unwrap();

        let kp = KeyPair::generate();
        let candidate = chain.assemble_candidate_block(&kp.address(), NOW).unwrap();
        assert_eq!(candidate.bits, 1);

        let block = solve(candidate);
        let outcome = chain.connect_block(block, NOW).unwrap();
        assert!(outcome.extends_active_chain());

        assert_eq!(chain.height(), 2);
        assert_eq!(chain.balance(&kp.address()), 50 * BELUSHIS_PER_COIN);
        let utxos = chain.utxos_for_address(&kp.address());
        assert_eq!(utxos.len(), 1);
        assert!(utxos[0].is_coinbase);
        assert_eq!(utxos[0].height, 2);
    }

    // ------------------------------------------------------------------
    // Mempool admission and double spends
    // ------------------------------------------------------------------

    #[test]
    fn double_spend_of_mined_output_is_orphaned() {
        let mut chain = ChainState::with_params(trivial_params());
        chain.connect_block(genesis_block(), NOW).unwrap();

        let kp = KeyPair::generate();
        let mined = mine_next(&mut chain, &kp, NOW + 1);
        mine_next(&mut chain, &kp, NOW + 2);
        mine_next(&mut chain, &kp, NOW + 3);

        // Height 4: the block-2 coinbase is exactly COINBASE_MATURITY deep.
        let coinbase_outpoint = OutPoint {
            txid: mined.txns[0].id().unwrap(),
            index: 0,
        };
        let tx_a = make_spend_txn(&kp, coinbase_outpoint.clone(), 50 * BELUSHIS_PER_COIN, "1x");
        let tx_a_id = tx_a.id().unwrap();
        assert_eq!(
            chain.accept_txn(tx_a).unwrap(),
            AcceptOutcome::Accepted(tx_a_id)
        );

        // Mine tx_a into a block.
        mine_next(&mut chain, &kp, NOW + 4);
        assert!(!chain.mempool().contains(&tx_a_id));
        assert!(!chain.utxo_set().contains(&coinbase_outpoint));

        // A second spend of the same outpoint no longer finds its UTXO.
        let tx_b = make_spend_txn(&kp, coinbase_outpoint, 49 * BELUSHIS_PER_COIN, "1y");
        let tx_b_id = tx_b.id().unwrap();
        assert_eq!(
            chain.accept_txn(tx_b).unwrap(),
            AcceptOutcome::Orphaned(tx_b_id)
        );
        assert_eq!(chain.orphan_txns().len(), 1);
        assert!(!chain.mempool().contains(&tx_b_id));
    }

    #[test]
    fn immature_coinbase_spend_rejected_then_accepted_at_maturity() {
        let mut chain = ChainState::with_params(trivial_params());
        chain.connect_block(genesis_block(), NOW).unwrap();

        let kp = KeyPair::generate();
        let mined = mine_next(&mut chain, &kp, NOW + 1);
        mine_next(&mut chain, &kp, NOW + 2);

        // Height 3: depth of the block-2 coinbase is 1 < COINBASE_MATURITY.
        let outpoint = OutPoint {
            txid: mined.txns[0].id().unwrap(),
            index: 0,
        };
        let spend = make_spend_txn(&kp, outpoint.clone(), 50 * BELUSHIS_PER_COIN, "1x");
        assert!(matches!(
            chain.validate_txn(&spend, false, true),
            Err(TxnValidationError::ImmatureCoinbase { .. })
        ));

        // One more block: depth is exactly COINBASE_MATURITY.
        mine_next(&mut chain, &kp, NOW + 3);
        assert!(chain.validate_txn(&spend, false, true).is_ok());
    }

    #[test]
    fn overspending_inputs_rejected() {
        let mut chain = ChainState::with_params(trivial_params());
        chain.connect_block(genesis_block(), NOW).unwrap();

        let kp = KeyPair::generate();
        let mined = mine_next(&mut chain, &kp, NOW + 1);
        mine_next(&mut chain, &kp, NOW + 2);
        mine_next(&mut chain, &kp, NOW + 3);

        let outpoint = OutPoint {
            txid: mined.txns[0].id().unwrap(),
            index: 0,
        };
        let spend = make_spend_txn(&kp, outpoint, 51 * BELUSHIS_PER_COIN, "1x");
        assert!(matches!(
            chain.validate_txn(&spend, false, true),
            Err(TxnValidationError::InsufficientInputValue { .. })
        ));
    }

    #[test]
    fn wrong_key_cannot_unlock_utxo() {
        let mut chain = ChainState::with_params(trivial_params());
        chain.connect_block(genesis_block(), NOW).unwrap();

        let kp = KeyPair::generate();
        let thief = KeyPair::generate();
        let mined = mine_next(&mut chain, &kp, NOW + 1);
        mine_next(&mut chain, &kp, NOW + 2);
        mine_next(&mut chain, &kp, NOW + 3);

        let outpoint = OutPoint {
            txid: mined.txns[0].id().unwrap(),
            index: 0,
        };
        let spend = make_spend_txn(&thief, outpoint, 50 * BELUSHIS_PER_COIN, "1x");
        assert!(matches!(
            chain.validate_txn(&spend, false, true),
            Err(TxnValidationError::Unlock {
                source: TxUnlockError::PubkeyMismatch,
                ..
            })
        ));
    }

    #[test]
    fn mempool_chained_spend_is_accepted_via_mempool_utxos() {
        let mut params = trivial_params();
        params.coinbase_maturity = 0;
        let mut chain = ChainState::with_params(params);
        chain.connect_block(genesis_block(), NOW).unwrap();

        let kp = KeyPair::generate();
        let mined = mine_next(&mut chain, &kp, NOW + 1);

        let outpoint = OutPoint {
            txid: mined.txns[0].id().unwrap(),
            index: 0,
        };
        let parent = make_spend_txn(&kp, outpoint, 50 * BELUSHIS_PER_COIN, &kp.address());
        let parent_id = parent.id().unwrap();
        chain.accept_txn(parent).unwrap();

        // The child spends an output that exists only in the mempool.
        let child = make_spend_txn(
            &kp,
            OutPoint {
                txid: parent_id,
                index: 0,
            },
            49 * BELUSHIS_PER_COIN,
            "1x",
        );
        let child_id = child.id().unwrap();
        assert_eq!(
            chain.accept_txn(child).unwrap(),
            AcceptOutcome::Accepted(child_id)
        );
    }

    // ------------------------------------------------------------------
    // Reorganization
    // ------------------------------------------------------------------

    #[test]
    fn taller_side_branch_triggers_reorg() {
        let mut params = trivial_params();
        params.coinbase_maturity = 0;
        let mut chain = ChainState::with_params(params);
        chain.connect_block(genesis_block(), NOW).unwrap();
        let genesis = genesis_block();

        let kp_a = KeyPair::generate();
        let kp_b = KeyPair::generate();

        // Active chain: [G, A1, A2]; A2 carries a spend of A1's coinbase.
        let a1 = mine_next(&mut chain, &kp_a, NOW + 1);
        let a1_coinbase = OutPoint {
            txid: a1.txns[0].id().unwrap(),
            index: 0,
        };
        let spend = make_spend_txn(&kp_a, a1_coinbase, 50 * BELUSHIS_PER_COIN, "1x");
        let spend_id = spend.id().unwrap();
        chain.accept_txn(spend).unwrap();
        mine_next(&mut chain, &kp_a, NOW + 2);
        assert_eq!(chain.height(), 3);
        assert!(!chain.mempool().contains(&spend_id));

        // Competing branch rooted at G. Timestamps clear the active chain's
        // median-time-past at connect time.
        let cb = |height| {
            Transaction::create_coinbase(&kp_b.address(), 50 * BELUSHIS_PER_COIN, height)
        };
        let b1 = build_block(&genesis, 1, NOW + 10, vec![cb(1)]);
        let b2 = build_block(&b1, 1, NOW + 11, vec![cb(2)]);
        let b3 = build_block(&b2, 1, NOW + 12, vec![cb(3)]);

        assert_eq!(
            chain.connect_block(b1.clone(), NOW + 20).unwrap(),
            ConnectOutcome::Connected {
                chain_idx: 1,
                reorged: false
            }
        );
        assert_eq!(
            chain.connect_block(b2.clone(), NOW + 20).unwrap(),
            ConnectOutcome::Connected {
                chain_idx: 1,
                reorged: false
            }
        );

        // The third branch block makes the fork taller than the active chain.
        let outcome = chain.connect_block(b3.clone(), NOW + 20).unwrap();
        assert_eq!(
            outcome,
            ConnectOutcome::Connected {
                chain_idx: 1,
                reorged: true
            }
        );

        assert_eq!(chain.height(), 4);
        assert_eq!(chain.tip().unwrap().id(), b3.id());

        // The displaced tail became the alternative branch.
        let branch: Vec<Hash256> = chain.side_branches()[0].iter().map(|b| b.id()).collect();
        assert_eq!(branch.len(), 2);
        assert_eq!(branch[0], a1.id());

        // A2's spend returned to the mempool; only B outputs (plus genesis)
        // remain in the UTXO set.
        assert!(chain.mempool().contains(&spend_id));
        assert_eq!(chain.balance(&kp_b.address()), 150 * BELUSHIS_PER_COIN);
        assert_eq!(chain.balance(&kp_a.address()), 0);
        assert_eq!(chain.utxo_set().len(), 4); // genesis + 3 branch coinbases
    }

    #[test]
    fn failed_reorg_restores_previous_chain() {
        let mut chain = ChainState::with_params(trivial_params());
        chain.connect_block(genesis_block(), NOW).unwrap();
        let genesis = genesis_block();

        let kp = KeyPair::generate();
        let a1 = mine_next(&mut chain, &kp, NOW + 1);
        let utxos_before: usize = chain.utxo_set().len();

        // Branch of two blocks; the second one carries an invalid spend
        // (bogus signature bytes), so the reorg must roll back.
        let cb = |height| {
            Transaction::create_coinbase(&kp.address(), 50 * BELUSHIS_PER_COIN, height)
        };
        let b1 = build_block(&genesis, 1, NOW + 10, vec![cb(10)]);
        let bogus = Transaction {
            txins: vec![TxIn {
                to_spend: Some(OutPoint {
                    txid: b1.txns[0].id().unwrap(),
                    index: 0,
                }),
                unlock_sig: vec![0xAB; 64],
                unlock_pk: Some(kp.public_bytes()),
                sequence: 0,
            }],
            txouts: vec![TxOut {
                value: 1,
                to_address: "1x".into(),
            }],
            locktime: None,
        };
        let b2 = build_block(&b1, 1, NOW + 11, vec![cb(11), bogus]);

        chain.connect_block(b1, NOW + 20).unwrap();
        let outcome = chain.connect_block(b2, NOW + 20).unwrap();
        assert_eq!(
            outcome,
            ConnectOutcome::Connected {
                chain_idx: 1,
                reorged: false
            }
        );

        // Active chain untouched.
        assert_eq!(chain.height(), 2);
        assert_eq!(chain.tip().unwrap().id(), a1.id());
        assert_eq!(chain.utxo_set().len(), utxos_before);
        assert!(chain.mempool().is_empty());
    }

    // ------------------------------------------------------------------
    // Difficulty retargeting
    // ------------------------------------------------------------------

    #[test]
    fn retarget_raises_bits_after_fast_period() {
        let params = Params {
            initial_difficulty_bits: 1,
            difficulty_period_in_blocks: 2,
            ..Params::default()
        };
        let mut chain = ChainState::with_params(params);

        let genesis = genesis_block();
        let start = genesis.timestamp;
        chain.connect_block(genesis_block(), start + 1).unwrap();

        // Block 2 mined one second after genesis: far under the period target.
        let kp = KeyPair::generate();
        let b1 = {
            let candidate = chain
                .assemble_candidate_block(&kp.address(), start + 1)
                .unwrap();
            let block = solve(candidate);
            chain.connect_block(block.clone(), start + 1).unwrap();
            block
        };
        assert_eq!(b1.bits, 1);

        // The period of two blocks elapsed in well under the target time, so
        // the third block must be one bit harder.
        assert_eq!(chain.next_work_required(Some(&b1.id())), Some(2));

        let candidate = chain
            .assemble_candidate_block(&kp.address(), start + 2)
            .unwrap();
        assert_eq!(candidate.bits, 2);
        let block = solve(candidate);
        chain.connect_block(block, start + 2).unwrap();
        assert_eq!(chain.height(), 3);
    }

    #[test]
    fn bits_must_match_schedule() {
        let mut chain = ChainState::with_params(trivial_params());
        chain.connect_block(genesis_block(), NOW).unwrap();

        let kp = KeyPair::generate();
        let cb = Transaction::create_coinbase(&kp.address(), 50 * BELUSHIS_PER_COIN, 1);
        let block = build_block(&genesis_block(), 3, NOW + 1, vec![cb]);
        assert_eq!(
            chain.validate_block(&block, NOW + 2),
            Err(BlockValidationError::IncorrectBits {
                got: 3,
                expected: 1
            })
        );
    }

    // ------------------------------------------------------------------
    // Timestamp boundaries
    // ------------------------------------------------------------------

    #[test]
    fn future_timestamp_boundary() {
        let mut chain = ChainState::with_params(trivial_params());
        chain.connect_block(genesis_block(), NOW).unwrap();

        let kp = KeyPair::generate();
        let cb = Transaction::create_coinbase(&kp.address(), 50 * BELUSHIS_PER_COIN, 1);

        let at_limit = build_block(
            &genesis_block(),
            1,
            NOW + MAX_FUTURE_BLOCK_TIME,
            vec![cb.clone()],
        );
        assert_eq!(chain.validate_block(&at_limit, NOW), Ok(ACTIVE_CHAIN_IDX));

        let past_limit = build_block(&genesis_block(), 1, NOW + MAX_FUTURE_BLOCK_TIME + 1, vec![cb]);
        assert_eq!(
            chain.validate_block(&past_limit, NOW),
            Err(BlockValidationError::TimestampTooFarInFuture)
        );
    }

    #[test]
    fn stale_timestamp_rejected() {
        let mut chain = ChainState::with_params(trivial_params());
        chain.connect_block(genesis_block(), NOW).unwrap();

        let kp = KeyPair::generate();
        let cb = Transaction::create_coinbase(&kp.address(), 50 * BELUSHIS_PER_COIN, 1);
        // Equal to the median time past (the genesis timestamp) is too old.
        let stale = build_block(&genesis_block(), 1, genesis_block().timestamp, vec![cb]);
        assert_eq!(
            chain.validate_block(&stale, NOW),
            Err(BlockValidationError::TimestampTooOld)
        );
    }

    // ------------------------------------------------------------------
    // Orphan blocks
    // ------------------------------------------------------------------

    #[test]
    fn unknown_parent_queues_orphan() {
        let mut chain = ChainState::with_params(trivial_params());
        chain.connect_block(genesis_block(), NOW).unwrap();

        let kp = KeyPair::generate();
        let unknown_parent = Block {
            version: 0,
            prev_block_hash: Some(Hash256([0xEE; 32])),
            merkle_hash: Hash256::default(),
            timestamp: NOW + 1,
            bits: 1,
            nonce: 0,
            txns: vec![Transaction::create_coinbase(
                &kp.address(),
                50 * BELUSHIS_PER_COIN,
                9,
            )],
        };
        let txids = vec![unknown_parent.txns[0].id().unwrap()];
        let mut orphan = unknown_parent;
        orphan.merkle_hash = merkle::merkle_root(&txids).unwrap();
        let orphan = solve(orphan);

        assert_eq!(
            chain.connect_block(orphan, NOW + 2).unwrap(),
            ConnectOutcome::Orphaned
        );
        assert_eq!(chain.orphan_blocks().len(), 1);
        assert_eq!(chain.height(), 1);
    }

    #[test]
    fn merkle_mismatch_rejected() {
        let mut chain = ChainState::with_params(trivial_params());
        chain.connect_block(genesis_block(), NOW).unwrap();

        let kp = KeyPair::generate();
        let cb = Transaction::create_coinbase(&kp.address(), 50 * BELUSHIS_PER_COIN, 1);
        let mut block = build_block(&genesis_block(), 1, NOW + 1, vec![cb]);
        block.merkle_hash = Hash256([0x99; 32]);
        let block = solve(block);

        assert_eq!(
            chain.validate_block(&block, NOW + 2),
            Err(BlockValidationError::MerkleMismatch)
        );
    }

    // ------------------------------------------------------------------
    // Fees
    // ------------------------------------------------------------------

    #[test]
    fn miner_collects_implicit_fees() {
        let mut params = trivial_params();
        params.coinbase_maturity = 0;
        let mut chain = ChainState::with_params(params);
        chain.connect_block(genesis_block(), NOW).unwrap();

        let kp = KeyPair::generate();
        let mined = mine_next(&mut chain, &kp, NOW + 1);

        // Spend 50 coins but only claim 49: one coin of implicit fee.
        let outpoint = OutPoint {
            txid: mined.txns[0].id().unwrap(),
            index: 0,
        };
        let spend = make_spend_txn(&kp, outpoint, 49 * BELUSHIS_PER_COIN, "1x");
        chain.accept_txn(spend).unwrap();

        let miner = KeyPair::generate();
        let candidate = chain
            .assemble_candidate_block(&miner.address(), NOW + 2)
            .unwrap();
        assert_eq!(candidate.txns.len(), 2);
        assert_eq!(
            candidate.txns[0].txouts[0].value,
            51 * BELUSHIS_PER_COIN // 50 subsidy + 1 fee
        );
    }
}
