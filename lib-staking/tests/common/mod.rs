//! Shared Test Helpers for lib-staking Tests
//!
//! Consolidates the mock ledger and account fixtures used by the
//! integration test files.
//!
//! Usage:
//! ```ignore
//! mod common;
//! use common::*;
//! ```

use lib_staking::{
    Address, Amount, AssetId, AssetLedger, LedgerError, LedgerResult, PoolParams, StakingEngine,
    TOKEN_UNIT,
};
use std::collections::HashMap;

// ============================================================================
// Accounts
// ============================================================================

pub const OWNER: Address = Address::new([0xAA; 32]);
pub const CUSTODY: Address = Address::new([0xCC; 32]);
pub const FUNDER: Address = Address::new([0x01; 32]);
pub const FUNDER_B: Address = Address::new([0x02; 32]);
pub const STAKER: Address = Address::new([0x11; 32]);
pub const STAKER_B: Address = Address::new([0x12; 32]);
pub const ASSET: AssetId = AssetId::new([0xF0; 32]);

/// Generous balance and allowance for every seeded account
pub const SEED_BALANCE: Amount = 1_000_000 * TOKEN_UNIT;

// ============================================================================
// Mock Ledger
// ============================================================================

/// In-memory asset ledger with ERC20-style balances and allowances
pub struct MockLedger {
    custody: Address,
    balances: HashMap<(AssetId, Address), Amount>,
    allowances: HashMap<(AssetId, Address, Address), Amount>,
}

impl MockLedger {
    pub fn new(custody: Address) -> Self {
        Self {
            custody,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    pub fn mint(&mut self, asset: AssetId, account: Address, amount: Amount) {
        *self.balances.entry((asset, account)).or_insert(0) += amount;
    }

    pub fn approve_custody(&mut self, asset: AssetId, owner: Address, amount: Amount) {
        self.allowances.insert((asset, owner, self.custody), amount);
    }

    /// Sum of every account's balance, for conservation assertions
    pub fn total_supply(&self, asset: AssetId) -> Amount {
        self.balances
            .iter()
            .filter(|((a, _), _)| *a == asset)
            .map(|(_, amount)| amount)
            .sum()
    }

    fn move_funds(
        &mut self,
        asset: AssetId,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> LedgerResult<()> {
        let have = *self.balances.get(&(asset, from)).unwrap_or(&0);
        if have < amount {
            return Err(LedgerError::InsufficientBalance { have, need: amount });
        }
        self.balances.insert((asset, from), have - amount);
        *self.balances.entry((asset, to)).or_insert(0) += amount;
        Ok(())
    }
}

impl AssetLedger for MockLedger {
    fn balance_of(&self, asset: AssetId, account: Address) -> Amount {
        *self.balances.get(&(asset, account)).unwrap_or(&0)
    }

    fn allowance(&self, asset: AssetId, owner: Address, spender: Address) -> Amount {
        *self.allowances.get(&(asset, owner, spender)).unwrap_or(&0)
    }

    fn transfer(&mut self, asset: AssetId, to: Address, amount: Amount) -> LedgerResult<()> {
        let custody = self.custody;
        self.move_funds(asset, custody, to, amount)
    }

    fn transfer_from(
        &mut self,
        asset: AssetId,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> LedgerResult<()> {
        let key = (asset, from, self.custody);
        let approved = *self.allowances.get(&key).unwrap_or(&0);
        if approved < amount {
            return Err(LedgerError::InsufficientAllowance {
                have: approved,
                need: amount,
            });
        }
        self.allowances.insert(key, approved - amount);
        self.move_funds(asset, from, to, amount)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Engine with production parameters, one whitelisted funder, and seeded
/// balances and allowances for both funders and both stakers
pub fn setup() -> (StakingEngine, MockLedger) {
    let mut engine = StakingEngine::new(OWNER, CUSTODY);
    let mut ledger = MockLedger::new(CUSTODY);
    for account in [FUNDER, FUNDER_B, STAKER, STAKER_B] {
        ledger.mint(ASSET, account, SEED_BALANCE);
        ledger.approve_custody(ASSET, account, SEED_BALANCE);
    }
    engine.whitelist(OWNER, FUNDER).unwrap();
    (engine, ledger)
}

pub fn fixed_params(
    duration_secs: u64,
    apy_numerator: u32,
    apy_denominator: u32,
    initial_funds: Amount,
) -> PoolParams {
    PoolParams {
        duration_secs,
        apy_numerator,
        apy_denominator,
        initial_funds,
        asset: ASSET,
        flexible: false,
    }
}

pub fn flexible_params(
    apy_numerator: u32,
    apy_denominator: u32,
    initial_funds: Amount,
) -> PoolParams {
    PoolParams {
        duration_secs: 0,
        apy_numerator,
        apy_denominator,
        initial_funds,
        asset: ASSET,
        flexible: true,
    }
}
