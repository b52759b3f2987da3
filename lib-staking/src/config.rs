//! Engine Configuration

use lib_types::Amount;
use serde::{Deserialize, Serialize};

/// Smallest-unit scale of an 18-decimal asset
pub const TOKEN_UNIT: Amount = 1_000_000_000_000_000_000;

/// Default minimum initial funding for a new pool (100 whole tokens)
pub const DEFAULT_MIN_POOL_FUNDS: Amount = 100 * TOKEN_UNIT;

/// Default cooldown between a flexible unstake request and its finalization (5 days)
pub const DEFAULT_UNSTAKE_COOLDOWN_SECS: u64 = 5 * 24 * 60 * 60;

/// Staking engine parameters
///
/// All amounts are in smallest token units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingConfig {
    /// Minimum initial funding accepted by pool creation
    pub min_pool_funds: Amount,
    /// Seconds between a flexible unstake request and its finalization
    pub unstake_cooldown_secs: u64,
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            min_pool_funds: DEFAULT_MIN_POOL_FUNDS,
            unstake_cooldown_secs: DEFAULT_UNSTAKE_COOLDOWN_SECS,
        }
    }
}

impl StakingConfig {
    /// Create config for testing (small minimums, short cooldown)
    pub fn for_testing() -> Self {
        Self {
            min_pool_funds: 100,
            unstake_cooldown_secs: 10,
        }
    }
}
