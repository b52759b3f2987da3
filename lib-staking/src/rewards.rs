//! Reward Calculation (Pure Functions)
//!
//! Deterministic reward computation for stake positions.
//!
//! # Rules (enforced in code)
//!
//! - No floats - all arithmetic is integer
//! - Checked u128 arithmetic, overflow aborts the operation
//! - Numerator factors multiply first, one truncating division last
//! - Deterministic across all platforms

use crate::errors::{StakingError, StakingResult};
use lib_types::Amount;

/// Seconds in a 365-day year, the accrual base for flexible pools
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

/// Reward for a fixed-term stake at maturity.
///
/// The pool's APY is `apy_numerator / apy_denominator` percent, applied to
/// the full principal once. No proration:
///
/// `reward = amount * apy_numerator / (apy_denominator * 100)`
pub fn fixed_term_reward(
    amount: Amount,
    apy_numerator: u32,
    apy_denominator: u32,
) -> StakingResult<Amount> {
    if apy_denominator == 0 {
        return Err(StakingError::ZeroApyDenominator);
    }

    let numerator = amount
        .checked_mul(apy_numerator as Amount)
        .ok_or(StakingError::Overflow)?;
    let divisor = (apy_denominator as Amount) * 100;

    Ok(numerator / divisor)
}

/// Reward accrued by a flexible stake over `elapsed_secs`.
///
/// Continuous accrual, proportional to elapsed time as a fraction of a
/// 365-day year:
///
/// `reward = amount * apy_numerator * elapsed_secs
///           / (apy_denominator * 100 * SECONDS_PER_YEAR)`
pub fn flexible_reward(
    amount: Amount,
    apy_numerator: u32,
    apy_denominator: u32,
    elapsed_secs: u64,
) -> StakingResult<Amount> {
    if apy_denominator == 0 {
        return Err(StakingError::ZeroApyDenominator);
    }

    let numerator = amount
        .checked_mul(apy_numerator as Amount)
        .and_then(|v| v.checked_mul(elapsed_secs as Amount))
        .ok_or(StakingError::Overflow)?;
    let divisor = (apy_denominator as Amount) * 100 * (SECONDS_PER_YEAR as Amount);

    Ok(numerator / divisor)
}

// =============================================================================
// TESTS
// =============================================================================
