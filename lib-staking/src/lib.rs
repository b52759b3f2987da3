//! Pooled Staking Engine
//!
//! Time-bound staking pools over an external asset ledger. Whitelisted
//! funders create and top up reward pools; stakers lock principal against
//! them and collect rewards once their positions unwind.
//!
//! Two pool shapes are supported:
//! - **Fixed-term**: principal locks until the pool duration elapses, then
//!   the full-term APY pays out regardless of how long the stake actually
//!   sat beyond maturity
//! - **Flexible**: rewards accrue per second; unstaking is two-phase, a
//!   request that stops accrual followed by a cooldown before the principal
//!   returns
//!
//! # Key Types
//!
//! - [`StakingEngine`]: owns all registries and drives every operation
//! - [`AssetLedger`]: the seam to the external token ledger holding custody
//! - [`Pool`] / [`StakePosition`] / [`FundRecord`]: persistent state records
//! - [`StakingEvent`]: append-only notification log entries
//! - [`StakingError`] / [`ErrorKind`]: failure taxonomy for callers
//!
//! All arithmetic is integer-only and checked. Operations never panic on
//! untrusted input and never leave partial state behind a failed ledger
//! call.

pub mod access;
pub mod config;
pub mod engine;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod pool;
pub mod rewards;
pub mod stake;

pub use access::AccessRegistry;
pub use config::{StakingConfig, DEFAULT_MIN_POOL_FUNDS, DEFAULT_UNSTAKE_COOLDOWN_SECS, TOKEN_UNIT};
pub use engine::StakingEngine;
pub use errors::{ErrorKind, StakingError, StakingResult};
pub use events::StakingEvent;
pub use ledger::{AssetLedger, LedgerError, LedgerResult};
pub use pool::{FundRecord, Pool, PoolParams};
pub use rewards::{fixed_term_reward, flexible_reward, SECONDS_PER_YEAR};
pub use stake::{StakePosition, UnstakeOutcome};

pub use lib_types::{Address, Amount, AssetId, PoolId, StakeId, UnixTime};
