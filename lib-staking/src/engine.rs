//! Staking Engine
//!
//! The `StakingEngine` owns every registry (access, pools, stakes, per-funder
//! contributions), the id counters, and the append-only event log. Funds never
//! live here: deposits are pulled into the custody account on the external
//! ledger and payouts leave it, through the [`AssetLedger`] seam.
//!
//! # Enforcement
//!
//! Every mutating operation is atomic at the level of its ledger dispatch:
//! - **Checks**: role, lifecycle, amount, balance and allowance validation,
//!   with all fallible arithmetic done up front
//! - **Effects**: internal state is mutated before the ledger is called
//! - **Interactions**: ledger transfers run last; a refusal restores the
//!   records mutated for that transfer, so nothing is ever recorded unpaid
//!   or paid unrecorded
//! - **Events**: appended only once the transition they describe has held
//!
//! Operations that dispatch a single transfer therefore leave no observable
//! change on failure. Pool-removal settlement dispatches one payout per
//! position and keeps already-paid positions settled when a later payout is
//! refused; see [`StakingEngine::remove_pool`].
//!
//! Time is an input: operations that read the clock take `now`, and callers
//! must supply a monotonically non-decreasing sequence.

use crate::access::AccessRegistry;
use crate::config::StakingConfig;
use crate::errors::{StakingError, StakingResult};
use crate::events::StakingEvent;
use crate::ledger::AssetLedger;
use crate::pool::{FundRecord, Pool, PoolParams};
use crate::rewards;
use crate::stake::{StakePosition, UnstakeOutcome};
use lib_types::{Address, Amount, AssetId, PoolId, StakeId, UnixTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pooled staking engine over an external asset ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingEngine {
    config: StakingConfig,
    access: AccessRegistry,
    custody: Address,
    pools: BTreeMap<PoolId, Pool>,
    stakes: BTreeMap<StakeId, StakePosition>,
    fund_records: BTreeMap<Address, FundRecord>,
    next_pool_id: PoolId,
    next_stake_id: StakeId,
    events: Vec<StakingEvent>,
}

/// One position's payout computed during flexible-pool settlement
struct Settlement {
    stake_id: StakeId,
    staker: Address,
    reward: Amount,
    payout: Amount,
}

impl StakingEngine {
    /// Create an engine administered by `owner`, holding funds in `custody`
    pub fn new(owner: Address, custody: Address) -> Self {
        Self::with_config(owner, custody, StakingConfig::default())
    }

    /// Create an engine with explicit parameters
    pub fn with_config(owner: Address, custody: Address, config: StakingConfig) -> Self {
        let engine = Self {
            config,
            access: AccessRegistry::new(owner),
            custody,
            pools: BTreeMap::new(),
            stakes: BTreeMap::new(),
            fund_records: BTreeMap::new(),
            next_pool_id: 1,
            next_stake_id: 1,
            events: Vec::new(),
        };

        tracing::info!(
            "Staking engine initialized (owner {}, custody {})",
            owner,
            custody
        );
        engine
    }

    /// Mark `account` as a funder entitled to create and fund pools.
    /// Owner-only; whitelisting the same account twice fails.
    pub fn whitelist(&mut self, caller: Address, account: Address) -> StakingResult<()> {
        self.access.whitelist(&caller, account)?;

        tracing::info!("Whitelisted funder {}", account);
        Ok(())
    }

    /// Create a pool seeded with `params.initial_funds` pulled from the caller.
    ///
    /// The caller must be a whitelisted funder and becomes the pool's owner.
    pub fn create_pool(
        &mut self,
        ledger: &mut dyn AssetLedger,
        caller: Address,
        params: PoolParams,
    ) -> StakingResult<PoolId> {
        // =====================================================================
        // Checks
        // =====================================================================
        if !self.access.is_funder(&caller) {
            return Err(StakingError::NotWhitelisted);
        }
        params.validate(self.config.min_pool_funds)?;
        self.check_deposit(&*ledger, params.asset, caller, params.initial_funds)?;

        let record_before = self.fund_records.get(&caller).copied();
        let new_funded = record_before
            .unwrap_or_default()
            .amount_funded
            .checked_add(params.initial_funds)
            .ok_or(StakingError::Overflow)?;

        // =====================================================================
        // Effects
        // =====================================================================
        let pool_id = self.next_pool_id;
        self.pools.insert(
            pool_id,
            Pool {
                id: pool_id,
                owner: caller,
                asset: params.asset,
                duration_secs: params.duration_secs,
                apy_numerator: params.apy_numerator,
                apy_denominator: params.apy_denominator,
                total_funds: params.initial_funds,
                flexible: params.flexible,
                removed: false,
            },
        );
        self.next_pool_id += 1;
        self.fund_records.insert(
            caller,
            FundRecord {
                amount_funded: new_funded,
            },
        );

        // =====================================================================
        // Interactions
        // =====================================================================
        if let Err(err) =
            ledger.transfer_from(params.asset, caller, self.custody, params.initial_funds)
        {
            self.pools.remove(&pool_id);
            self.next_pool_id = pool_id;
            match record_before {
                Some(record) => self.fund_records.insert(caller, record),
                None => self.fund_records.remove(&caller),
            };
            return Err(err.into());
        }

        // =====================================================================
        // Events
        // =====================================================================
        let event = if params.flexible {
            StakingEvent::FlexiblePoolCreated {
                pool_id,
                owner: caller,
                apy_numerator: params.apy_numerator,
                apy_denominator: params.apy_denominator,
                funds: params.initial_funds,
            }
        } else {
            StakingEvent::PoolCreated {
                pool_id,
                owner: caller,
                duration_secs: params.duration_secs,
                apy_numerator: params.apy_numerator,
                apy_denominator: params.apy_denominator,
                funds: params.initial_funds,
            }
        };
        self.events.push(event);

        tracing::info!(
            "Pool {} created by {}: apy {}/{}, duration {}s, funds {}",
            pool_id,
            caller,
            params.apy_numerator,
            params.apy_denominator,
            params.duration_secs,
            params.initial_funds
        );
        Ok(pool_id)
    }

    /// Add funds to an existing pool. Any whitelisted funder may contribute.
    pub fn add_funds(
        &mut self,
        ledger: &mut dyn AssetLedger,
        caller: Address,
        pool_id: PoolId,
        amount: Amount,
    ) -> StakingResult<()> {
        // =====================================================================
        // Checks
        // =====================================================================
        if !self.access.is_funder(&caller) {
            return Err(StakingError::NotWhitelisted);
        }
        let pool = self
            .pools
            .get(&pool_id)
            .ok_or(StakingError::PoolNotFound(pool_id))?;
        if pool.removed {
            return Err(StakingError::PoolRemoved(pool_id));
        }
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        let asset = pool.asset;
        let total_before = pool.total_funds;
        let new_total = total_before
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        self.check_deposit(&*ledger, asset, caller, amount)?;

        let record_before = self.fund_records.get(&caller).copied();
        let new_funded = record_before
            .unwrap_or_default()
            .amount_funded
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;

        // =====================================================================
        // Effects
        // =====================================================================
        if let Some(pool) = self.pools.get_mut(&pool_id) {
            pool.total_funds = new_total;
        }
        self.fund_records.insert(
            caller,
            FundRecord {
                amount_funded: new_funded,
            },
        );

        // =====================================================================
        // Interactions
        // =====================================================================
        if let Err(err) = ledger.transfer_from(asset, caller, self.custody, amount) {
            if let Some(pool) = self.pools.get_mut(&pool_id) {
                pool.total_funds = total_before;
            }
            match record_before {
                Some(record) => self.fund_records.insert(caller, record),
                None => self.fund_records.remove(&caller),
            };
            return Err(err.into());
        }

        tracing::info!(
            "Pool {} funded with {} by {} (total {})",
            pool_id,
            amount,
            caller,
            new_total
        );
        Ok(())
    }

    /// Open a stake position against a pool.
    ///
    /// Whitelisted funders cannot stake. Each call creates an independent
    /// position with its own id, maturity, and claim.
    pub fn stake(
        &mut self,
        ledger: &mut dyn AssetLedger,
        caller: Address,
        pool_id: PoolId,
        amount: Amount,
        now: UnixTime,
    ) -> StakingResult<StakeId> {
        // =====================================================================
        // Checks
        // =====================================================================
        let pool = self
            .pools
            .get(&pool_id)
            .ok_or(StakingError::PoolNotFound(pool_id))?;
        if pool.removed {
            return Err(StakingError::PoolRemoved(pool_id));
        }
        if self.access.is_funder(&caller) {
            return Err(StakingError::FundersCannotStake);
        }
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        let asset = pool.asset;
        self.check_deposit(&*ledger, asset, caller, amount)?;

        // =====================================================================
        // Effects
        // =====================================================================
        let stake_id = self.next_stake_id;
        self.stakes.insert(
            stake_id,
            StakePosition {
                id: stake_id,
                staker: caller,
                pool_id,
                amount,
                start_time: now,
                unstake_requested_at: None,
                unstaked: false,
                claimed: false,
                amount_rewarded: 0,
            },
        );
        self.next_stake_id += 1;

        // =====================================================================
        // Interactions
        // =====================================================================
        if let Err(err) = ledger.transfer_from(asset, caller, self.custody, amount) {
            self.stakes.remove(&stake_id);
            self.next_stake_id = stake_id;
            return Err(err.into());
        }

        // =====================================================================
        // Events
        // =====================================================================
        self.events.push(StakingEvent::Staked {
            stake_id,
            staker: caller,
            pool_id,
            amount,
        });

        tracing::info!(
            "Stake {} opened on pool {} by {} for {}",
            stake_id,
            pool_id,
            caller,
            amount
        );
        Ok(stake_id)
    }

    /// Unwind a stake position and return its principal.
    ///
    /// Fixed-term positions unstake in one call once the pool duration has
    /// elapsed. Flexible positions take two: the first records the request
    /// and stops reward accrual, the second returns the principal after the
    /// configured cooldown.
    pub fn unstake(
        &mut self,
        ledger: &mut dyn AssetLedger,
        caller: Address,
        stake_id: StakeId,
        now: UnixTime,
    ) -> StakingResult<UnstakeOutcome> {
        // =====================================================================
        // Checks
        // =====================================================================
        let stake = self
            .stakes
            .get(&stake_id)
            .ok_or(StakingError::StakeNotFound(stake_id))?;
        if stake.staker != caller {
            return Err(StakingError::NotStaker);
        }
        if stake.unstaked {
            return Err(StakingError::AlreadyUnstaked(stake_id));
        }
        let pool = self
            .pools
            .get(&stake.pool_id)
            .ok_or(StakingError::PoolNotFound(stake.pool_id))?;
        let asset = pool.asset;
        let principal = stake.amount;

        if pool.flexible {
            match stake.unstake_requested_at {
                None => {
                    let available_at = now.saturating_add(self.config.unstake_cooldown_secs);

                    // First phase: record the request, funds stay put
                    if let Some(stake) = self.stakes.get_mut(&stake_id) {
                        stake.unstake_requested_at = Some(now);
                    }

                    tracing::info!(
                        "Unstake requested for stake {} (available at {})",
                        stake_id,
                        available_at
                    );
                    return Ok(UnstakeOutcome::Requested { available_at });
                }
                Some(requested_at) => {
                    let available_at =
                        requested_at.saturating_add(self.config.unstake_cooldown_secs);
                    if now < available_at {
                        return Err(StakingError::CooldownActive { available_at, now });
                    }
                }
            }
        } else {
            let matures_at = pool.maturity(stake.start_time);
            if now < matures_at {
                return Err(StakingError::PeriodNotOver { matures_at, now });
            }
        }

        // =====================================================================
        // Effects
        // =====================================================================
        if let Some(stake) = self.stakes.get_mut(&stake_id) {
            stake.unstaked = true;
        }

        // =====================================================================
        // Interactions
        // =====================================================================
        if let Err(err) = ledger.transfer(asset, caller, principal) {
            if let Some(stake) = self.stakes.get_mut(&stake_id) {
                stake.unstaked = false;
            }
            return Err(err.into());
        }

        tracing::info!(
            "Stake {} unstaked, principal {} returned to {}",
            stake_id,
            principal,
            caller
        );
        Ok(UnstakeOutcome::Unstaked)
    }

    /// Disburse the reward of an unstaked position. At most once per stake.
    ///
    /// The reward is fully determined by stored state: full-term APY for
    /// fixed pools, accrual from start to the unstake request for flexible
    /// ones. A pool whose funds cannot cover the reward fails with the
    /// retryable [`StakingError::InsufficientRewardFunds`]; the identical
    /// call succeeds after the pool is refunded.
    pub fn claim_rewards(
        &mut self,
        ledger: &mut dyn AssetLedger,
        caller: Address,
        stake_id: StakeId,
    ) -> StakingResult<Amount> {
        // =====================================================================
        // Checks
        // =====================================================================
        let stake = self
            .stakes
            .get(&stake_id)
            .ok_or(StakingError::StakeNotFound(stake_id))?;
        if stake.staker != caller {
            return Err(StakingError::NotStaker);
        }
        if stake.claimed {
            return Err(StakingError::AlreadyClaimed(stake_id));
        }
        if !stake.unstaked {
            return Err(StakingError::UnstakeRequired(stake_id));
        }
        let pool_id = stake.pool_id;
        let pool = self
            .pools
            .get(&pool_id)
            .ok_or(StakingError::PoolNotFound(pool_id))?;

        let reward = if pool.flexible {
            // Accrual closed at the unstake request
            let elapsed = stake
                .unstake_requested_at
                .unwrap_or(stake.start_time)
                .saturating_sub(stake.start_time);
            rewards::flexible_reward(
                stake.amount,
                pool.apy_numerator,
                pool.apy_denominator,
                elapsed,
            )?
        } else {
            rewards::fixed_term_reward(stake.amount, pool.apy_numerator, pool.apy_denominator)?
        };

        let total_before = pool.total_funds;
        let new_total = match total_before.checked_sub(reward) {
            Some(total) => total,
            None => {
                return Err(StakingError::InsufficientRewardFunds {
                    available: total_before,
                    required: reward,
                })
            }
        };
        let staker = stake.staker;
        let asset = pool.asset;

        // =====================================================================
        // Effects
        // =====================================================================
        if let Some(stake) = self.stakes.get_mut(&stake_id) {
            stake.claimed = true;
            stake.amount_rewarded = reward;
        }
        if let Some(pool) = self.pools.get_mut(&pool_id) {
            pool.total_funds = new_total;
        }

        // =====================================================================
        // Interactions
        // =====================================================================
        if reward > 0 {
            if let Err(err) = ledger.transfer(asset, staker, reward) {
                if let Some(stake) = self.stakes.get_mut(&stake_id) {
                    stake.claimed = false;
                    stake.amount_rewarded = 0;
                }
                if let Some(pool) = self.pools.get_mut(&pool_id) {
                    pool.total_funds = total_before;
                }
                return Err(err.into());
            }
        }

        // =====================================================================
        // Events
        // =====================================================================
        self.events.push(StakingEvent::RewardClaimed {
            stake_id,
            staker,
            amount: reward,
        });

        tracing::info!("Reward claimed: stake {} paid {} to {}", stake_id, reward, staker);
        Ok(reward)
    }

    /// Remove a pool, returning residual funds to its owner.
    ///
    /// Fixed-term pools refuse removal while any stake is open. Flexible
    /// pools settle every open position instead: each is unstaked, its reward
    /// (accrued to its pending request time, or to `now`) is fixed and paid
    /// out together with the principal, provided the pool's funds cover the
    /// projected total.
    ///
    /// Payouts are dispatched one position at a time, in id order, each
    /// recorded before it is sent. If the ledger refuses a payout, only the
    /// failing position is restored: positions already paid stay settled,
    /// the pool stays live, and a later call resumes with the remaining open
    /// positions. The pool is marked removed and the residual returned only
    /// after every payout has cleared.
    ///
    /// # Errors
    ///
    /// - [`StakingError::NotPoolOwner`] if `caller` did not create the pool
    /// - [`StakingError::PoolAlreadyRemoved`] on repeated removal
    /// - [`StakingError::ActiveStakes`] for fixed pools with open stakes
    /// - [`StakingError::RewardsExceedFunds`] when flexible projections
    ///   exceed available funds; funding the pool unblocks the removal
    pub fn remove_pool(
        &mut self,
        ledger: &mut dyn AssetLedger,
        caller: Address,
        pool_id: PoolId,
        now: UnixTime,
    ) -> StakingResult<()> {
        // =====================================================================
        // Checks
        // =====================================================================
        let pool = self
            .pools
            .get(&pool_id)
            .ok_or(StakingError::PoolNotFound(pool_id))?;
        if pool.owner != caller {
            return Err(StakingError::NotPoolOwner);
        }
        if pool.removed {
            return Err(StakingError::PoolAlreadyRemoved(pool_id));
        }
        let asset = pool.asset;

        let mut settlements: Vec<Settlement> = Vec::new();
        let mut projected: Amount = 0;
        if pool.flexible {
            for (id, stake) in &self.stakes {
                if stake.pool_id != pool_id || stake.unstaked {
                    continue;
                }
                let reward = rewards::flexible_reward(
                    stake.amount,
                    pool.apy_numerator,
                    pool.apy_denominator,
                    stake.accrual_secs(now),
                )?;
                let payout = stake
                    .amount
                    .checked_add(reward)
                    .ok_or(StakingError::Overflow)?;
                projected = projected
                    .checked_add(reward)
                    .ok_or(StakingError::Overflow)?;
                settlements.push(Settlement {
                    stake_id: *id,
                    staker: stake.staker,
                    reward,
                    payout,
                });
            }
            if projected > pool.total_funds {
                return Err(StakingError::RewardsExceedFunds {
                    projected,
                    available: pool.total_funds,
                });
            }
        } else {
            let open = self
                .stakes
                .values()
                .filter(|s| s.pool_id == pool_id && s.is_open())
                .count();
            if open > 0 {
                return Err(StakingError::ActiveStakes { pool_id, open });
            }
        }
        let residual = pool
            .total_funds
            .checked_sub(projected)
            .ok_or(StakingError::Overflow)?;

        // =====================================================================
        // Effects + Interactions + Events, one position at a time
        // =====================================================================
        // A dispatched transfer cannot be un-sent, so the atomic unit here is
        // a single settlement: the position turns terminal and its reward
        // leaves the pool's books before its payout moves, and a refusal
        // restores the failing position only. Paid positions stay settled and
        // a later call resumes with the rest.
        for settlement in &settlements {
            if let Some(stake) = self.stakes.get_mut(&settlement.stake_id) {
                stake.unstaked = true;
                stake.claimed = true;
                stake.amount_rewarded = settlement.reward;
            }
            if let Some(pool) = self.pools.get_mut(&pool_id) {
                pool.total_funds = pool.total_funds.saturating_sub(settlement.reward);
            }

            if let Err(err) = ledger.transfer(asset, settlement.staker, settlement.payout) {
                if let Some(stake) = self.stakes.get_mut(&settlement.stake_id) {
                    stake.unstaked = false;
                    stake.claimed = false;
                    stake.amount_rewarded = 0;
                }
                if let Some(pool) = self.pools.get_mut(&pool_id) {
                    pool.total_funds = pool.total_funds.saturating_add(settlement.reward);
                }
                return Err(err.into());
            }

            self.events.push(StakingEvent::RewardClaimed {
                stake_id: settlement.stake_id,
                staker: settlement.staker,
                amount: settlement.reward,
            });
        }

        // =====================================================================
        // Effects
        // =====================================================================
        if let Some(pool) = self.pools.get_mut(&pool_id) {
            pool.removed = true;
            pool.total_funds = 0;
        }

        // =====================================================================
        // Interactions
        // =====================================================================
        if residual > 0 {
            if let Err(err) = ledger.transfer(asset, caller, residual) {
                if let Some(pool) = self.pools.get_mut(&pool_id) {
                    pool.removed = false;
                    pool.total_funds = residual;
                }
                return Err(err.into());
            }
        }

        // =====================================================================
        // Events
        // =====================================================================
        self.events.push(StakingEvent::PoolRemoved { pool_id });

        tracing::info!(
            "Pool {} removed ({} positions settled, residual {} returned to {})",
            pool_id,
            settlements.len(),
            residual,
            caller
        );
        Ok(())
    }

    /// Verify `from` can cover a deposit of `amount` before any state change
    fn check_deposit(
        &self,
        ledger: &dyn AssetLedger,
        asset: AssetId,
        from: Address,
        amount: Amount,
    ) -> StakingResult<()> {
        let have = ledger.balance_of(asset, from);
        if have < amount {
            return Err(StakingError::InsufficientBalance { have, need: amount });
        }
        let approved = ledger.allowance(asset, from, self.custody);
        if approved < amount {
            return Err(StakingError::InsufficientAllowance {
                have: approved,
                need: amount,
            });
        }
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Look up a pool
    pub fn pool(&self, pool_id: PoolId) -> Option<&Pool> {
        self.pools.get(&pool_id)
    }

    /// Look up a stake position
    pub fn stake_position(&self, stake_id: StakeId) -> Option<&StakePosition> {
        self.stakes.get(&stake_id)
    }

    /// Contribution record for a funder account
    pub fn fund_record(&self, account: Address) -> Option<&FundRecord> {
        self.fund_records.get(&account)
    }

    /// Check if an account is a whitelisted funder
    pub fn is_whitelisted(&self, account: Address) -> bool {
        self.access.is_funder(&account)
    }

    /// The administering account
    pub fn owner(&self) -> Address {
        self.access.owner()
    }

    /// The engine's account on the external ledger
    pub fn custody(&self) -> Address {
        self.custody
    }

    /// Engine parameters
    pub fn config(&self) -> &StakingConfig {
        &self.config
    }

    /// Notifications emitted so far
    pub fn events(&self) -> &[StakingEvent] {
        &self.events
    }

    /// Drain the notification log
    pub fn take_events(&mut self) -> Vec<StakingEvent> {
        std::mem::take(&mut self.events)
    }

    /// Summed open principal of `staker` in a pool
    pub fn staked_amount(&self, staker: Address, pool_id: PoolId) -> Amount {
        self.stakes
            .values()
            .filter(|s| s.pool_id == pool_id && s.staker == staker && s.is_open())
            .fold(0, |total, s| total.saturating_add(s.amount))
    }
}
