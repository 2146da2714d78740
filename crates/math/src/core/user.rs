//! User position aggregation.
//!
//! Per-reserve balances with interest applied, account-wide collateral and
//! borrow totals, blended LTV and liquidation threshold, isolation-mode
//! headroom, health factor, and the normalized display stage.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::constants::LTV_PRECISION;
use crate::core::interest::{
    get_compounded_balance, get_compounded_stable_balance, get_linear_balance,
};
use crate::core::usd::{
    mrc_value_to_usd, native_to_market_reference_currency, native_to_usd,
    normalized_market_reference_price_in_usd, normalized_to_usd, pow10_decimal,
};
use crate::errors::MathError;
use crate::types::reserve::ReserveData;
use crate::types::user::{
    FormatUserSummaryRequest, FormattedUserReserve, FormattedUserSummary, RawUserSummary,
    UserReserveData, UserReserveSummary, UserReserveTotals,
};
use crate::types::wad_ray::normalize;

/// `collateral * threshold / 10^LTV_PRECISION / borrows`.
///
/// Exactly `-1` when there is no debt. The sentinel means "no liquidation
/// risk"; callers must not compare it as a numeric ratio.
pub fn calculate_health_factor_from_balances(
    collateral_balance_market_reference_currency: U256,
    borrow_balance_market_reference_currency: U256,
    current_liquidation_threshold: Decimal,
) -> Result<Decimal, MathError> {
    if borrow_balance_market_reference_currency.is_zero() {
        return Ok(dec!(-1));
    }
    normalize(collateral_balance_market_reference_currency, 0)?
        .checked_mul(current_liquidation_threshold)
        .and_then(|v| v.checked_div(pow10_decimal(LTV_PRECISION).ok()?))
        .and_then(|v| v.checked_div(normalize(borrow_balance_market_reference_currency, 0).ok()?))
        .ok_or(MathError::Overflow)
}

/// `max(0, collateral * ltv / 10^LTV_PRECISION - borrows)`. Never negative;
/// zero whenever the blended LTV is zero.
pub fn calculate_available_borrows_market_reference_currency(
    collateral_balance_market_reference_currency: U256,
    borrow_balance_market_reference_currency: U256,
    current_ltv: Decimal,
) -> Result<Decimal, MathError> {
    if current_ltv.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let capacity = normalize(collateral_balance_market_reference_currency, 0)?
        .checked_mul(current_ltv)
        .and_then(|v| v.checked_div(pow10_decimal(LTV_PRECISION).ok()?))
        .ok_or(MathError::Overflow)?;
    let available = capacity - normalize(borrow_balance_market_reference_currency, 0)?;
    Ok(available.max(Decimal::ZERO))
}

/// Current balances for one user reserve, in native units,
/// market-reference-currency units and USD.
pub fn generate_user_reserve_summary(
    user_reserve: &UserReserveData,
    reserve: &ReserveData,
    market_reference_currency_decimals: u32,
    market_reference_price_in_usd: U256,
    current_timestamp: u64,
) -> Result<UserReserveSummary, MathError> {
    let norm_ref_price = normalized_market_reference_price_in_usd(market_reference_price_in_usd)?;
    let price = reserve.price_in_market_reference_currency;

    let underlying_balance = get_linear_balance(
        user_reserve.scaled_a_token_balance,
        reserve.liquidity_index,
        reserve.liquidity_rate,
        reserve.last_update_timestamp,
        current_timestamp,
    )?;
    let variable_borrows = get_compounded_balance(
        user_reserve.scaled_variable_debt,
        reserve.variable_borrow_index,
        reserve.variable_borrow_rate,
        reserve.last_update_timestamp,
        current_timestamp,
    )?;
    // Stable debt grows at the rate this user locked, not the reserve average.
    let stable_borrows = get_compounded_stable_balance(
        user_reserve.principal_stable_debt,
        user_reserve.stable_borrow_rate,
        user_reserve.stable_borrow_last_update_timestamp,
        current_timestamp,
    )?;
    let total_borrows = variable_borrows
        .checked_add(stable_borrows)
        .ok_or(MathError::Overflow)?;

    let to_mrc = |amount: U256| {
        native_to_market_reference_currency(amount, reserve.decimals, price)
    };
    let to_usd = |amount: U256| {
        native_to_usd(
            amount,
            reserve.decimals,
            price,
            market_reference_currency_decimals,
            norm_ref_price,
        )
    };

    Ok(UserReserveSummary {
        reserve: reserve.clone(),
        user_reserve: user_reserve.clone(),
        underlying_balance,
        underlying_balance_market_reference_currency: to_mrc(underlying_balance)?,
        underlying_balance_usd: to_usd(underlying_balance)?,
        variable_borrows,
        variable_borrows_market_reference_currency: to_mrc(variable_borrows)?,
        variable_borrows_usd: to_usd(variable_borrows)?,
        stable_borrows,
        stable_borrows_market_reference_currency: to_mrc(stable_borrows)?,
        stable_borrows_usd: to_usd(stable_borrows)?,
        total_borrows,
        total_borrows_market_reference_currency: to_mrc(total_borrows)?,
        total_borrows_usd: to_usd(total_borrows)?,
    })
}

/// Fold all of a user's reserves into account-wide totals.
///
/// A reserve counts as collateral only when both the reserve flag and the
/// user's own flag are set. E-mode parameters replace the base parameters
/// when the user's selected category matches the reserve's.
pub fn calculate_user_reserve_totals(
    summaries: &[UserReserveSummary],
    user_emode_category_id: u8,
) -> Result<UserReserveTotals, MathError> {
    let mut total_liquidity = U256::ZERO;
    let mut total_collateral = U256::ZERO;
    let mut total_borrows = U256::ZERO;
    let mut weighted_ltv = U256::ZERO;
    let mut weighted_liquidation_threshold = U256::ZERO;
    let mut is_in_isolation_mode = false;
    let mut isolated_reserve: Option<ReserveData> = None;

    for summary in summaries {
        let reserve = &summary.reserve;
        let balance_mrc = summary.underlying_balance_market_reference_currency;

        total_liquidity = total_liquidity
            .checked_add(balance_mrc)
            .ok_or(MathError::Overflow)?;
        total_borrows = total_borrows
            .checked_add(summary.total_borrows_market_reference_currency)
            .ok_or(MathError::Overflow)?;

        let counts_as_collateral = reserve.usage_as_collateral_enabled
            && summary.user_reserve.usage_as_collateral_enabled_on_user;
        if !counts_as_collateral {
            continue;
        }

        total_collateral = total_collateral
            .checked_add(balance_mrc)
            .ok_or(MathError::Overflow)?;

        if !reserve.debt_ceiling.is_zero() {
            // Only one isolated reserve is tracked; the protocol disallows
            // holding several, so last wins here.
            is_in_isolation_mode = true;
            isolated_reserve = Some(reserve.clone());
        }

        let in_emode = reserve.e_mode_category_id != 0
            && user_emode_category_id == reserve.e_mode_category_id;
        let (ltv, liquidation_threshold) = if in_emode {
            (reserve.e_mode_ltv, reserve.e_mode_liquidation_threshold)
        } else {
            (
                reserve.base_ltv_as_collateral,
                reserve.reserve_liquidation_threshold,
            )
        };

        weighted_ltv = weighted_ltv
            .checked_add(balance_mrc.checked_mul(ltv).ok_or(MathError::Overflow)?)
            .ok_or(MathError::Overflow)?;
        weighted_liquidation_threshold = weighted_liquidation_threshold
            .checked_add(
                balance_mrc
                    .checked_mul(liquidation_threshold)
                    .ok_or(MathError::Overflow)?,
            )
            .ok_or(MathError::Overflow)?;
    }

    let (current_ltv, current_liquidation_threshold) = if total_collateral.is_zero() {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        let collateral = normalize(total_collateral, 0)?;
        (
            normalize(weighted_ltv, 0)?
                .checked_div(collateral)
                .ok_or(MathError::Overflow)?,
            normalize(weighted_liquidation_threshold, 0)?
                .checked_div(collateral)
                .ok_or(MathError::Overflow)?,
        )
    };

    Ok(UserReserveTotals {
        total_liquidity_market_reference_currency: total_liquidity,
        total_collateral_market_reference_currency: total_collateral,
        total_borrows_market_reference_currency: total_borrows,
        current_ltv,
        current_liquidation_threshold,
        is_in_isolation_mode,
        isolated_reserve,
    })
}

/// Remaining isolation-mode debt-ceiling headroom of the isolated reserve,
/// converted into fractional market-reference-currency units. Zero when the
/// reference price is unknown: with no conversion there is no provable
/// headroom.
fn isolation_headroom_market_reference_currency(
    isolated_reserve: &ReserveData,
    market_reference_price_in_usd: U256,
    market_reference_currency_decimals: u32,
) -> Result<Decimal, MathError> {
    let headroom_units = isolated_reserve
        .debt_ceiling
        .checked_sub(isolated_reserve.isolation_mode_total_debt)
        .unwrap_or(U256::ZERO);
    let headroom_usd = normalize(headroom_units, isolated_reserve.debt_ceiling_decimals)?;
    let ref_price = normalized_market_reference_price_in_usd(market_reference_price_in_usd)?;
    if ref_price.is_zero() {
        return Ok(Decimal::ZERO);
    }
    headroom_usd
        .checked_div(ref_price)
        .and_then(|v| v.checked_mul(pow10_decimal(market_reference_currency_decimals).ok()?))
        .ok_or(MathError::Overflow)
}

/// Account-wide aggregate with health factor and borrowing headroom.
pub fn generate_raw_user_summary(
    summaries: &[UserReserveSummary],
    user_emode_category_id: u8,
    market_reference_currency_decimals: u32,
    market_reference_price_in_usd: U256,
) -> Result<RawUserSummary, MathError> {
    let totals = calculate_user_reserve_totals(summaries, user_emode_category_id)?;

    let mut available_borrows = calculate_available_borrows_market_reference_currency(
        totals.total_collateral_market_reference_currency,
        totals.total_borrows_market_reference_currency,
        totals.current_ltv,
    )?;
    if let Some(isolated) = totals.isolated_reserve.as_ref() {
        let headroom = isolation_headroom_market_reference_currency(
            isolated,
            market_reference_price_in_usd,
            market_reference_currency_decimals,
        )?;
        available_borrows = available_borrows.min(headroom);
    }

    let health_factor = calculate_health_factor_from_balances(
        totals.total_collateral_market_reference_currency,
        totals.total_borrows_market_reference_currency,
        totals.current_liquidation_threshold,
    )?;

    let to_usd = |amount: U256| {
        normalized_to_usd(
            amount,
            market_reference_price_in_usd,
            market_reference_currency_decimals,
        )
    };

    let summary = RawUserSummary {
        total_liquidity_usd: to_usd(totals.total_liquidity_market_reference_currency)?,
        total_collateral_usd: to_usd(totals.total_collateral_market_reference_currency)?,
        total_borrows_usd: to_usd(totals.total_borrows_market_reference_currency)?,
        available_borrows_usd: mrc_value_to_usd(
            available_borrows,
            market_reference_price_in_usd,
            market_reference_currency_decimals,
        )?,
        total_liquidity_market_reference_currency: totals
            .total_liquidity_market_reference_currency,
        total_collateral_market_reference_currency: totals
            .total_collateral_market_reference_currency,
        total_borrows_market_reference_currency: totals.total_borrows_market_reference_currency,
        available_borrows_market_reference_currency: available_borrows,
        current_ltv: totals.current_ltv,
        current_liquidation_threshold: totals.current_liquidation_threshold,
        health_factor,
        is_in_isolation_mode: totals.is_in_isolation_mode,
        isolated_reserve: totals.isolated_reserve,
    };

    debug!(
        health_factor = %summary.health_factor,
        collateral = %summary.total_collateral_market_reference_currency,
        borrows = %summary.total_borrows_market_reference_currency,
        isolation = summary.is_in_isolation_mode,
        "user summary computed"
    );

    Ok(summary)
}

/// Full pipeline: per-reserve summaries, raw aggregate, display stage.
pub fn format_user_summary(
    request: &FormatUserSummaryRequest,
) -> Result<FormattedUserSummary, MathError> {
    let summaries = request
        .user_reserves
        .iter()
        .map(|position| {
            generate_user_reserve_summary(
                &position.user_reserve,
                &position.reserve,
                request.market_reference_currency_decimals,
                request.market_reference_price_in_usd,
                request.current_timestamp,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let raw = generate_raw_user_summary(
        &summaries,
        request.user_emode_category_id,
        request.market_reference_currency_decimals,
        request.market_reference_price_in_usd,
    )?;

    let ref_decimals = request.market_reference_currency_decimals;
    let ref_scale = pow10_decimal(ref_decimals)?;
    let ltv_scale = pow10_decimal(LTV_PRECISION)?;

    let user_reserves = summaries
        .iter()
        .map(|summary| {
            let decimals = summary.reserve.decimals;
            Ok(FormattedUserReserve {
                underlying_asset: summary.reserve.underlying_asset,
                usage_as_collateral_enabled_on_user: summary
                    .user_reserve
                    .usage_as_collateral_enabled_on_user,
                underlying_balance: normalize(summary.underlying_balance, decimals)?,
                underlying_balance_market_reference_currency: normalize(
                    summary.underlying_balance_market_reference_currency,
                    ref_decimals,
                )?,
                underlying_balance_usd: summary.underlying_balance_usd,
                variable_borrows: normalize(summary.variable_borrows, decimals)?,
                stable_borrows: normalize(summary.stable_borrows, decimals)?,
                total_borrows: normalize(summary.total_borrows, decimals)?,
                total_borrows_market_reference_currency: normalize(
                    summary.total_borrows_market_reference_currency,
                    ref_decimals,
                )?,
                total_borrows_usd: summary.total_borrows_usd,
            })
        })
        .collect::<Result<Vec<_>, MathError>>()?;

    Ok(FormattedUserSummary {
        user_reserves,
        total_liquidity_market_reference_currency: normalize(
            raw.total_liquidity_market_reference_currency,
            ref_decimals,
        )?,
        total_liquidity_usd: raw.total_liquidity_usd,
        total_collateral_market_reference_currency: normalize(
            raw.total_collateral_market_reference_currency,
            ref_decimals,
        )?,
        total_collateral_usd: raw.total_collateral_usd,
        total_borrows_market_reference_currency: normalize(
            raw.total_borrows_market_reference_currency,
            ref_decimals,
        )?,
        total_borrows_usd: raw.total_borrows_usd,
        available_borrows_market_reference_currency: raw
            .available_borrows_market_reference_currency
            .checked_div(ref_scale)
            .ok_or(MathError::Overflow)?,
        available_borrows_usd: raw.available_borrows_usd,
        current_loan_to_value: raw
            .current_ltv
            .checked_div(ltv_scale)
            .ok_or(MathError::Overflow)?,
        current_liquidation_threshold: raw
            .current_liquidation_threshold
            .checked_div(ltv_scale)
            .ok_or(MathError::Overflow)?,
        health_factor: raw.health_factor,
        is_in_isolation_mode: raw.is_in_isolation_mode,
        isolated_reserve_asset: raw
            .isolated_reserve
            .as_ref()
            .map(|reserve| reserve.underlying_asset),
    })
}
