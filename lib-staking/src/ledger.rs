//! External Asset Ledger Boundary
//!
//! The engine never holds balances itself. All funds live on an external
//! fungible-asset ledger reached through the [`AssetLedger`] trait, with the
//! engine acting through a single custody account (see
//! [`StakingEngine`](crate::engine::StakingEngine)).

use lib_types::{Address, Amount, AssetId};
use thiserror::Error;

/// Error reported by an asset-ledger implementation
#[derive(Error, Debug, Clone)]
pub enum LedgerError {
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: Amount, need: Amount },

    #[error("Insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance { have: Amount, need: Amount },

    #[error("Transfer rejected: {0}")]
    Rejected(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Interface to the external fungible-asset ledger.
///
/// Implementations are bound to the engine's custody account: [`transfer`]
/// moves funds out of custody, [`transfer_from`] pulls funds from a third
/// party that granted the custody account an allowance. Balance and allowance
/// reads are views and report zero for unknown accounts.
///
/// [`transfer`]: AssetLedger::transfer
/// [`transfer_from`]: AssetLedger::transfer_from
pub trait AssetLedger {
    /// Get the balance of an account for an asset
    fn balance_of(&self, asset: AssetId, account: Address) -> Amount;

    /// Get the amount `owner` has approved `spender` to move
    fn allowance(&self, asset: AssetId, owner: Address, spender: Address) -> Amount;

    /// Transfer out of the custody account
    fn transfer(&mut self, asset: AssetId, to: Address, amount: Amount) -> LedgerResult<()>;

    /// Transfer from `from` to `to` against the custody account's allowance
    fn transfer_from(
        &mut self,
        asset: AssetId,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> LedgerResult<()>;
}
