//! Incentive accrual and APR.
//!
//! Reward indices are projected forward off-chain the same way the
//! incentives controller advances them on claim, so displayed unclaimed
//! amounts match what a claim transaction would mint.

use alloy::primitives::U256;
use rust_decimal::Decimal;

use crate::constants::{SECONDS_PER_YEAR, WEI_DECIMALS};
use crate::errors::MathError;
use crate::types::incentive::{
    IncentiveAprRequest, IncentiveSnapshot, ReserveIncentiveEmission, ReserveIncentivesRequest,
    ReserveIncentivesResponse, RewardApr, UserReward, UserRewardAccrual,
};
use crate::types::wad_ray::{normalize, pow10};

/// Reward accrued by one position since its user index was written.
///
/// Zero when the tracked supply is zero (no share of emissions with no
/// supply). The effective "now" clamps to the emission end, and an index
/// already at or past that point is reused unchanged so no phantom growth is
/// manufactured after emissions stop.
pub fn calculate_accrued_incentives(
    snapshot: &IncentiveSnapshot,
    current_timestamp: u64,
) -> Result<U256, MathError> {
    if snapshot.total_supply.is_zero() {
        return Ok(U256::ZERO);
    }

    let effective_now = current_timestamp.min(snapshot.emission_end_timestamp);
    let scale = pow10(snapshot.precision)?;

    let current_index = if snapshot.reserve_index_timestamp >= effective_now
        || snapshot.reserve_index_timestamp >= snapshot.emission_end_timestamp
    {
        snapshot.reserve_index
    } else {
        let time_delta = effective_now - snapshot.reserve_index_timestamp;
        let accrued = snapshot
            .emission_per_second
            .checked_mul(U256::from(time_delta))
            .and_then(|v| v.checked_mul(scale))
            .ok_or(MathError::Overflow)?
            / snapshot.total_supply;
        snapshot
            .reserve_index
            .checked_add(accrued)
            .ok_or(MathError::Overflow)?
    };

    // On chain the user index can never lead the reserve index; treat that
    // as caller misuse rather than minting a negative reward.
    let index_delta = current_index
        .checked_sub(snapshot.user_index)
        .ok_or_else(|| MathError::invalid("user index ahead of reserve index"))?;

    Ok(snapshot
        .principal_user_balance
        .checked_mul(index_delta)
        .ok_or(MathError::Overflow)?
        / scale)
}

/// Yearly emission value over the value of the supply it is spread across.
///
/// `0` whenever the emission side or the supply side of the ratio has no
/// value; those are defined sentinels, not errors.
pub fn calculate_incentive_apr(request: &IncentiveAprRequest) -> Result<Decimal, MathError> {
    let emission_per_second_normalized =
        normalize(request.emission_per_second, WEI_DECIMALS)?
            .checked_mul(normalize(
                request.reward_token_price_in_market_reference_currency,
                0,
            )?)
            .ok_or(MathError::Overflow)?;
    if emission_per_second_normalized.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let emission_per_year = emission_per_second_normalized
        .checked_mul(Decimal::from(SECONDS_PER_YEAR))
        .ok_or(MathError::Overflow)?;

    let total_supply_normalized = normalize(request.total_token_supply, request.decimals)?
        .checked_mul(normalize(request.price_in_market_reference_currency, 0)?)
        .ok_or(MathError::Overflow)?;
    if total_supply_normalized.is_zero() {
        return Ok(Decimal::ZERO);
    }

    emission_per_year
        .checked_div(total_supply_normalized)
        .ok_or(MathError::Overflow)
}

fn side_aprs(
    emissions: &[ReserveIncentiveEmission],
    total_token_supply: U256,
    price_in_market_reference_currency: U256,
    decimals: u32,
    current_timestamp: u64,
) -> Result<Vec<RewardApr>, MathError> {
    emissions
        .iter()
        .map(|emission| {
            let incentive_apr = if emission.emission_end_timestamp <= current_timestamp {
                Decimal::ZERO
            } else {
                calculate_incentive_apr(&IncentiveAprRequest {
                    emission_per_second: emission.emission_per_second,
                    reward_token_price_in_market_reference_currency: emission
                        .reward_token_price_in_market_reference_currency,
                    price_in_market_reference_currency,
                    total_token_supply,
                    decimals,
                })?
            };
            Ok(RewardApr {
                reward_token: emission.reward_token,
                incentive_apr,
            })
        })
        .collect()
}

/// Incentive APRs for the deposit, variable-debt and stable-debt sides of a
/// reserve, each spread over its own total.
pub fn calculate_reserve_incentives(
    request: &ReserveIncentivesRequest,
) -> Result<ReserveIncentivesResponse, MathError> {
    Ok(ReserveIncentivesResponse {
        underlying_asset: request.underlying_asset,
        supply_incentives: side_aprs(
            &request.supply_emissions,
            request.total_liquidity,
            request.price_in_market_reference_currency,
            request.decimals,
            request.current_timestamp,
        )?,
        variable_debt_incentives: side_aprs(
            &request.variable_debt_emissions,
            request.total_variable_debt,
            request.price_in_market_reference_currency,
            request.decimals,
            request.current_timestamp,
        )?,
        stable_debt_incentives: side_aprs(
            &request.stable_debt_emissions,
            request.total_stable_debt,
            request.price_in_market_reference_currency,
            request.decimals,
            request.current_timestamp,
        )?,
    })
}

/// Fold reward accrual over a user's positions into per-reward-token totals.
pub fn calculate_user_incentives(
    accruals: &[UserRewardAccrual],
    current_timestamp: u64,
) -> Result<Vec<UserReward>, MathError> {
    accruals
        .iter()
        .map(|accrual| {
            let mut accrued = U256::ZERO;
            for position in &accrual.positions {
                accrued = accrued
                    .checked_add(calculate_accrued_incentives(position, current_timestamp)?)
                    .ok_or(MathError::Overflow)?;
            }
            Ok(UserReward {
                reward_token: accrual.reward_token,
                accrued,
                claimable: accrual
                    .unclaimed_rewards
                    .checked_add(accrued)
                    .ok_or(MathError::Overflow)?,
            })
        })
        .collect()
}
