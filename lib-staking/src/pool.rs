//! Pool and Funding State

use crate::errors::{StakingError, StakingResult};
use lib_types::{Address, Amount, AssetId, PoolId, UnixTime};
use serde::{Deserialize, Serialize};

/// A funded yield offer with fixed or flexible term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    /// Unique identifier, assigned at creation
    pub id: PoolId,
    /// The funder that created the pool
    pub owner: Address,
    /// External ledger asset the pool is denominated in
    pub asset: AssetId,
    /// Lock length for fixed-term pools; zero marks a flexible pool
    pub duration_secs: u64,
    /// APY numerator (rate is `apy_numerator / apy_denominator` percent)
    pub apy_numerator: u32,
    /// APY denominator, nonzero
    pub apy_denominator: u32,
    /// Funds available for rewards, net of rewards already paid
    pub total_funds: Amount,
    /// Open-ended pool with continuous accrual
    pub flexible: bool,
    /// Terminal flag; removed pools accept no funding or stakes
    pub removed: bool,
}

impl Pool {
    /// Maturity timestamp for a stake opened at `start_time`
    pub fn maturity(&self, start_time: UnixTime) -> UnixTime {
        start_time.saturating_add(self.duration_secs)
    }
}

/// Parameters for creating a new pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolParams {
    /// Lock length in seconds; must be zero iff `flexible`
    pub duration_secs: u64,
    /// APY numerator
    pub apy_numerator: u32,
    /// APY denominator
    pub apy_denominator: u32,
    /// Funds seeding the pool, pulled from the creator
    pub initial_funds: Amount,
    /// Asset the pool is denominated in
    pub asset: AssetId,
    /// Open-ended pool with continuous accrual
    pub flexible: bool,
}

impl PoolParams {
    /// Validate creation parameters against the configured minimum funding.
    ///
    /// # Errors
    ///
    /// - [`StakingError::ZeroApyDenominator`] on a zero denominator
    /// - [`StakingError::ZeroDuration`] on a fixed-term pool without a duration
    /// - [`StakingError::FlexibleWithDuration`] on a flexible pool with one
    /// - [`StakingError::BelowMinimumFunds`] when seeding below `min_funds`
    pub fn validate(&self, min_funds: Amount) -> StakingResult<()> {
        if self.apy_denominator == 0 {
            return Err(StakingError::ZeroApyDenominator);
        }
        if self.flexible {
            if self.duration_secs != 0 {
                return Err(StakingError::FlexibleWithDuration {
                    duration_secs: self.duration_secs,
                });
            }
        } else if self.duration_secs == 0 {
            return Err(StakingError::ZeroDuration);
        }
        if self.initial_funds < min_funds {
            return Err(StakingError::BelowMinimumFunds {
                provided: self.initial_funds,
                minimum: min_funds,
            });
        }
        Ok(())
    }
}

/// Running contribution total for one funder account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FundRecord {
    /// Total contributed across pools, never decremented by stake activity
    pub amount_funded: Amount,
}
