//! Stake Position State

use lib_types::{Address, Amount, PoolId, StakeId, UnixTime};
use serde::{Deserialize, Serialize};

/// One staker's position in a pool.
///
/// Created by `stake`, wound down by `unstake` and `claim_rewards` (or by
/// pool-removal settlement for flexible pools). Never deleted: a terminal
/// position stays in the registry as an audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePosition {
    /// Unique identifier, assigned at stake time
    pub id: StakeId,
    /// The account that opened the position; only it may unstake or claim
    pub staker: Address,
    /// The pool this position stakes into
    pub pool_id: PoolId,
    /// Staked principal
    pub amount: Amount,
    /// Timestamp of stake creation
    pub start_time: UnixTime,
    /// Set on the first flexible unstake call; accrual stops here
    pub unstake_requested_at: Option<UnixTime>,
    /// Principal has been returned
    pub unstaked: bool,
    /// Reward has been disbursed
    pub claimed: bool,
    /// Final reward, fixed at claim or settlement time
    pub amount_rewarded: Amount,
}

impl StakePosition {
    /// Whether the principal is still locked in the pool
    pub fn is_open(&self) -> bool {
        !self.unstaked
    }

    /// Seconds of reward accrual as of `now`.
    ///
    /// A pending unstake request caps the window at the request time.
    pub fn accrual_secs(&self, now: UnixTime) -> u64 {
        self.unstake_requested_at
            .unwrap_or(now)
            .saturating_sub(self.start_time)
    }
}

/// What an `unstake` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnstakeOutcome {
    /// Flexible first phase: cooldown started, principal still locked
    Requested {
        /// Earliest timestamp the second phase can run
        available_at: UnixTime,
    },
    /// Principal returned to the staker
    Unstaked,
}
