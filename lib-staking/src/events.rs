//! Engine Notifications
//!
//! Append-only event log entries. These five variants are the entire
//! notification surface: whitelisting and top-up funding emit nothing.

use lib_types::{Address, Amount, PoolId, StakeId};
use serde::{Deserialize, Serialize};

/// A state transition worth announcing to the outside world
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakingEvent {
    /// A fixed-term pool was created and seeded
    PoolCreated {
        pool_id: PoolId,
        owner: Address,
        duration_secs: u64,
        apy_numerator: u32,
        apy_denominator: u32,
        funds: Amount,
    },
    /// A flexible pool was created and seeded
    FlexiblePoolCreated {
        pool_id: PoolId,
        owner: Address,
        apy_numerator: u32,
        apy_denominator: u32,
        funds: Amount,
    },
    /// A stake position was opened
    Staked {
        stake_id: StakeId,
        staker: Address,
        pool_id: PoolId,
        amount: Amount,
    },
    /// A pool reached its terminal state
    PoolRemoved { pool_id: PoolId },
    /// A reward was disbursed, by claim or by removal settlement
    RewardClaimed {
        stake_id: StakeId,
        staker: Address,
        amount: Amount,
    },
}
