//! Staking Engine Errors

use crate::ledger::LedgerError;
use lib_types::{Amount, PoolId, StakeId, UnixTime};
use thiserror::Error;

/// Error during staking operations
#[derive(Error, Debug, Clone)]
pub enum StakingError {
    #[error("Caller is not the registry owner")]
    NotOwner,

    #[error("Account is already whitelisted")]
    AlreadyWhitelisted,

    #[error("Caller is not a whitelisted funder")]
    NotWhitelisted,

    #[error("Whitelisted funders cannot stake")]
    FundersCannotStake,

    #[error("Caller is not the staker of this position")]
    NotStaker,

    #[error("Caller is not the owner of this pool")]
    NotPoolOwner,

    #[error("Pool not found: {0}")]
    PoolNotFound(PoolId),

    #[error("Stake not found: {0}")]
    StakeNotFound(StakeId),

    #[error("APY denominator cannot be zero")]
    ZeroApyDenominator,

    #[error("Fixed-term pool duration cannot be zero")]
    ZeroDuration,

    #[error("Flexible pool cannot have a duration: got {duration_secs}s")]
    FlexibleWithDuration { duration_secs: u64 },

    #[error("Initial funds below minimum: provided {provided}, minimum {minimum}")]
    BelowMinimumFunds { provided: Amount, minimum: Amount },

    #[error("Zero amount not allowed")]
    ZeroAmount,

    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: Amount, need: Amount },

    #[error("Insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance { have: Amount, need: Amount },

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Pool is removed: {0}")]
    PoolRemoved(PoolId),

    #[error("Pool already removed: {0}")]
    PoolAlreadyRemoved(PoolId),

    #[error("Pool {pool_id} still has {open} open stakes")]
    ActiveStakes { pool_id: PoolId, open: usize },

    #[error("Projected rewards exceed pool funds: projected {projected}, available {available}")]
    RewardsExceedFunds {
        projected: Amount,
        available: Amount,
    },

    #[error("Stake already unstaked: {0}")]
    AlreadyUnstaked(StakeId),

    #[error("Stake must be unstaked before claiming: {0}")]
    UnstakeRequired(StakeId),

    #[error("Reward already claimed: {0}")]
    AlreadyClaimed(StakeId),

    #[error("Pool funds cannot cover the reward yet: available {available}, required {required}")]
    InsufficientRewardFunds {
        available: Amount,
        required: Amount,
    },

    #[error("Staking period not over: matures at {matures_at}, now {now}")]
    PeriodNotOver { matures_at: UnixTime, now: UnixTime },

    #[error("Unstake cooldown active: available at {available_at}, now {now}")]
    CooldownActive {
        available_at: UnixTime,
        now: UnixTime,
    },

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Failure class of a [`StakingError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller lacks the role the operation requires
    Authorization,
    /// Malformed or unsatisfiable input
    Validation,
    /// Operation invalid in the current lifecycle state
    State,
    /// Time window not yet open
    Temporal,
}

impl StakingError {
    /// Classify this error into the four failure classes
    pub fn kind(&self) -> ErrorKind {
        match self {
            StakingError::NotOwner
            | StakingError::NotWhitelisted
            | StakingError::FundersCannotStake
            | StakingError::NotStaker
            | StakingError::NotPoolOwner => ErrorKind::Authorization,

            StakingError::PoolNotFound(_)
            | StakingError::StakeNotFound(_)
            | StakingError::ZeroApyDenominator
            | StakingError::ZeroDuration
            | StakingError::FlexibleWithDuration { .. }
            | StakingError::BelowMinimumFunds { .. }
            | StakingError::ZeroAmount
            | StakingError::InsufficientBalance { .. }
            | StakingError::InsufficientAllowance { .. }
            | StakingError::Overflow
            | StakingError::Ledger(_) => ErrorKind::Validation,

            StakingError::AlreadyWhitelisted
            | StakingError::PoolRemoved(_)
            | StakingError::PoolAlreadyRemoved(_)
            | StakingError::ActiveStakes { .. }
            | StakingError::RewardsExceedFunds { .. }
            | StakingError::AlreadyUnstaked(_)
            | StakingError::UnstakeRequired(_)
            | StakingError::AlreadyClaimed(_)
            | StakingError::InsufficientRewardFunds { .. } => ErrorKind::State,

            StakingError::PeriodNotOver { .. } | StakingError::CooldownActive { .. } => {
                ErrorKind::Temporal
            }
        }
    }

    /// Whether retrying the same call can succeed without caller-side changes.
    ///
    /// True only for claims blocked on pool funds: once the pool is refunded,
    /// the identical claim goes through.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StakingError::InsufficientRewardFunds { .. })
    }
}

/// Result type for staking operations
pub type StakingResult<T> = Result<T, StakingError>;
