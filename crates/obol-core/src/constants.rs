//! Protocol constants. All monetary values in belushis (1 coin = 10^8 belushis).

/// Maximum serialized size of a block or transaction, in bytes.
pub const MAX_BLOCK_SERIALIZED_SIZE: usize = 1_000_000;

/// Blocks that must elapse before a coinbase output can be spent.
pub const COINBASE_MATURITY: u64 = 2;

/// Accept blocks timestamped up to this many seconds in the future.
pub const MAX_FUTURE_BLOCK_TIME: u64 = 60 * 60 * 2;

/// The number of belushis per coin.
pub const BELUSHIS_PER_COIN: u64 = 100_000_000;

pub const TOTAL_COINS: u64 = 21_000_000;

/// The maximum number of belushis that will ever exist.
pub const MAX_MONEY: u64 = BELUSHIS_PER_COIN * TOTAL_COINS;

/// Desired seconds between blocks.
pub const TIME_BETWEEN_BLOCKS_IN_SECS_TARGET: u64 = 60;

/// Desired duration of one difficulty period, in seconds.
pub const DIFFICULTY_PERIOD_IN_SECS_TARGET: u64 = 60 * 60 * 10;

/// Blocks per difficulty adjustment period.
pub const DIFFICULTY_PERIOD_IN_BLOCKS: u64 =
    DIFFICULTY_PERIOD_IN_SECS_TARGET / TIME_BETWEEN_BLOCKS_IN_SECS_TARGET;

/// Leading-zero-bit requirement for the first difficulty period.
pub const INITIAL_DIFFICULTY_BITS: u8 = 22;

/// Blocks after which the mining subsidy halves.
pub const HALVE_SUBSIDY_AFTER_BLOCKS_NUM: u64 = 210_000;

/// Number of recent blocks consulted for the median-time-past check.
pub const MEDIAN_TIME_PAST_BLOCKS: usize = 11;

/// Default TCP listen port for the peer protocol.
pub const DEFAULT_PORT: u16 = 9999;

/// Consensus parameters that tests may override.
///
/// Defaults are the protocol constants above. Production code always runs
/// with [`Params::default`]; the `testing` feature exposes
/// [`ChainState::with_params`](crate::chain::ChainState::with_params) so test
/// suites can lower difficulty or shrink the retarget period.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Params {
    pub initial_difficulty_bits: u8,
    pub difficulty_period_in_blocks: u64,
    pub difficulty_period_in_secs_target: u64,
    pub coinbase_maturity: u64,
    pub max_future_block_time: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            initial_difficulty_bits: INITIAL_DIFFICULTY_BITS,
            difficulty_period_in_blocks: DIFFICULTY_PERIOD_IN_BLOCKS,
            difficulty_period_in_secs_target: DIFFICULTY_PERIOD_IN_SECS_TARGET,
            coinbase_maturity: COINBASE_MATURITY,
            max_future_block_time: MAX_FUTURE_BLOCK_TIME,
        }
    }
}
