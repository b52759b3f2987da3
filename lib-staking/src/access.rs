//! Funder Access Registry
//!
//! Splits accounts into two roles: whitelisted funders, who create and fund
//! pools, and everyone else, who may stake. The two roles are mutually
//! exclusive at the operation level and only the registry owner can promote
//! an account to funder.

use crate::errors::{StakingError, StakingResult};
use lib_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Registry of accounts entitled to create and fund pools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRegistry {
    owner: Address,
    funders: BTreeSet<Address>,
}

impl AccessRegistry {
    /// Create a registry administered by `owner`
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            funders: BTreeSet::new(),
        }
    }

    /// The administering account
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Mark `account` as a funder. Owner-only.
    pub fn whitelist(&mut self, caller: &Address, account: Address) -> StakingResult<()> {
        if *caller != self.owner {
            return Err(StakingError::NotOwner);
        }
        if self.funders.contains(&account) {
            return Err(StakingError::AlreadyWhitelisted);
        }
        self.funders.insert(account);
        Ok(())
    }

    /// Check if an account is a whitelisted funder
    pub fn is_funder(&self, account: &Address) -> bool {
        self.funders.contains(account)
    }
}
