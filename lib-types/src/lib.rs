//! Staking workspace primitives.
//! Stable, protocol-neutral, behavior-free.
//!
//! Rule: No String identifiers in engine state. Ever.

pub mod primitives;

pub use primitives::{Address, Amount, AssetId, PoolId, StakeId, UnixTime};
