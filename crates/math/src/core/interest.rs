//! Interest accrual model.
//!
//! Two accrual laws coexist on chain and both are reproduced here:
//! - linear interest for the supply-side liquidity index, and
//! - compounded interest via the gas-optimized 3-term binomial expansion for
//!   variable and stable debt.
//!
//! The split is load-bearing. Swapping either form for the other silently
//! diverges from the figures the chain enforces.

use alloy::primitives::U256;

use crate::constants::{RAY, SECONDS_PER_YEAR};
use crate::errors::MathError;
use crate::types::wad_ray::{binomial_approximated_ray_pow, ray_mul, ray_to_wad, wad_to_ray, Ray};

/// Elapsed seconds, saturating so a stale caller clock yields zero growth
/// instead of a panic.
fn seconds_since(current_timestamp: u64, last_update_timestamp: u64) -> u64 {
    current_timestamp.saturating_sub(last_update_timestamp)
}

/// `RAY + rate * dt / SECONDS_PER_YEAR`. Supply-side accrual is linear.
pub fn calculate_linear_interest(
    rate: Ray,
    current_timestamp: u64,
    last_update_timestamp: u64,
) -> Result<Ray, MathError> {
    let time_delta = seconds_since(current_timestamp, last_update_timestamp);
    let accrued = rate
        .raw()
        .checked_mul(U256::from(time_delta))
        .ok_or(MathError::Overflow)?
        / U256::from(SECONDS_PER_YEAR);
    RAY.checked_add(accrued).ok_or(MathError::Overflow).map(Ray)
}

/// Binomial-approximated `(RAY + rate/SECONDS_PER_YEAR)^dt`. Debt-side
/// accrual, bit-for-bit the on-chain formula (per-second rate is a floor
/// division, as in `MathUtils.calculateCompoundedInterest`).
pub fn calculate_compounded_interest(
    rate: Ray,
    current_timestamp: u64,
    last_update_timestamp: u64,
) -> Result<Ray, MathError> {
    let time_delta = seconds_since(current_timestamp, last_update_timestamp);
    let rate_per_second = rate.raw() / U256::from(SECONDS_PER_YEAR);
    binomial_approximated_ray_pow(rate_per_second, time_delta).map(Ray)
}

/// Current supply index. A zero rate returns the stored index unchanged,
/// mirroring the on-chain short-circuit.
pub fn get_reserve_normalized_income(
    rate: Ray,
    index: Ray,
    last_update_timestamp: u64,
    current_timestamp: u64,
) -> Result<Ray, MathError> {
    if rate.is_zero() {
        return Ok(index);
    }
    calculate_linear_interest(rate, current_timestamp, last_update_timestamp)?.ray_mul(index)
}

/// Apply the linearly-grown liquidity index to a scaled aToken balance.
///
/// Identity on a zero balance: no interest accrues on nothing.
pub fn get_linear_balance(
    balance: U256,
    index: Ray,
    rate: Ray,
    last_update_timestamp: u64,
    current_timestamp: u64,
) -> Result<U256, MathError> {
    if balance.is_zero() {
        return Ok(balance);
    }
    let income =
        get_reserve_normalized_income(rate, index, last_update_timestamp, current_timestamp)?;
    Ok(ray_to_wad(ray_mul(wad_to_ray(balance)?, income.raw())?))
}

/// Apply the compounded variable-borrow index to a scaled debt balance.
///
/// Identity on a zero principal.
pub fn get_compounded_balance(
    principal: U256,
    index: Ray,
    rate: Ray,
    last_update_timestamp: u64,
    current_timestamp: u64,
) -> Result<U256, MathError> {
    if principal.is_zero() {
        return Ok(principal);
    }
    let compounded =
        calculate_compounded_interest(rate, current_timestamp, last_update_timestamp)?;
    let cumulated = compounded.ray_mul(index)?;
    Ok(ray_to_wad(ray_mul(wad_to_ray(principal)?, cumulated.raw())?))
}

/// Grow a stable-debt principal at the user's own locked rate. Stable debt
/// carries no index; the principal compounds directly.
///
/// Identity on a zero principal.
pub fn get_compounded_stable_balance(
    principal: U256,
    user_stable_rate: Ray,
    last_update_timestamp: u64,
    current_timestamp: u64,
) -> Result<U256, MathError> {
    if principal.is_zero() {
        return Ok(principal);
    }
    let stable_interest =
        calculate_compounded_interest(user_stable_rate, current_timestamp, last_update_timestamp)?;
    Ok(ray_to_wad(ray_mul(
        wad_to_ray(principal)?,
        stable_interest.raw(),
    )?))
}
