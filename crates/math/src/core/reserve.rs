//! Reserve debt aggregation and formatting.
//!
//! `calculate_reserve_debt` reproduces the on-chain accrual exactly;
//! `format_reserve` / `format_reserve_usd` turn the raw snapshot into
//! display figures (normalized decimals, APY, utilization, caps, isolation
//! mode, USD values).

use alloy::primitives::U256;
use rust_decimal::Decimal;
use tracing::debug;

use crate::constants::{LTV_PRECISION, RAY, RAY_DECIMALS, SECONDS_PER_YEAR};
use crate::core::interest::calculate_compounded_interest;
use crate::core::usd::{
    native_to_usd, normalized_market_reference_price_in_usd, price_in_usd,
};
use crate::errors::MathError;
use crate::types::reserve::{
    FormatReserveUsdRequest, FormattedReserve, FormattedReserveUsd, ReserveData, ReserveDebt,
};
use crate::types::wad_ray::{normalize, pow10, ray_mul, ray_pow};

/// Current debt and liquidity totals at `current_timestamp`.
///
/// Variable debt applies the blended borrow index and then compounds at the
/// current variable rate since `last_update_timestamp`; stable debt compounds
/// the principal at the average stable rate against its own clock. The two
/// classes are intentionally asymmetric and must not be collapsed into one
/// formula.
pub fn calculate_reserve_debt(
    reserve: &ReserveData,
    current_timestamp: u64,
) -> Result<ReserveDebt, MathError> {
    let compounded_variable = calculate_compounded_interest(
        reserve.variable_borrow_rate,
        current_timestamp,
        reserve.last_update_timestamp,
    )?;
    let total_variable_debt = ray_mul(
        ray_mul(
            reserve.total_scaled_variable_debt,
            reserve.variable_borrow_index.raw(),
        )?,
        compounded_variable.raw(),
    )?;

    let compounded_stable = calculate_compounded_interest(
        reserve.average_stable_rate,
        current_timestamp,
        reserve.stable_debt_last_update_timestamp,
    )?;
    let total_stable_debt = ray_mul(
        reserve.total_principal_stable_debt,
        compounded_stable.raw(),
    )?;

    let total_debt = total_variable_debt
        .checked_add(total_stable_debt)
        .ok_or(MathError::Overflow)?;
    let total_liquidity = total_debt
        .checked_add(reserve.available_liquidity)
        .ok_or(MathError::Overflow)?;

    Ok(ReserveDebt {
        total_variable_debt,
        total_stable_debt,
        total_debt,
        total_liquidity,
    })
}

/// APY for a ray-scaled APR: `(RAY + rate/SECONDS_PER_YEAR)^SECONDS_PER_YEAR - RAY`.
///
/// Uses exact `ray_pow`; this is a display-only yearly compounding estimate,
/// not a contract-matching accrual.
fn apy_from_apr(rate: U256) -> Result<Decimal, MathError> {
    let base = RAY
        .checked_add(rate / U256::from(SECONDS_PER_YEAR))
        .ok_or(MathError::Overflow)?;
    let compounded = ray_pow(base, SECONDS_PER_YEAR)?;
    normalize(compounded - RAY, RAY_DECIMALS)
}

/// Liquidation bonus as a fraction of the seized amount: `(bonus - 10000) / 10000`.
/// Zero when the reserve has no bonus configured.
fn normalize_liquidation_bonus(bonus: U256) -> Result<Decimal, MathError> {
    match bonus.checked_sub(pow10(LTV_PRECISION)?) {
        Some(excess) => normalize(excess, LTV_PRECISION),
        None => Ok(Decimal::ZERO),
    }
}

/// Available liquidity after the borrow-cap clamp.
///
/// The `+1` keeps one unit of headroom because the on-chain cap check is
/// exclusive.
fn clamped_available_liquidity(
    reserve: &ReserveData,
    total_debt: U256,
) -> Result<U256, MathError> {
    if reserve.borrow_cap.is_zero() {
        return Ok(reserve.available_liquidity);
    }
    let cap_units = reserve
        .borrow_cap
        .checked_mul(pow10(reserve.decimals)?)
        .ok_or(MathError::Overflow)?;
    let used = total_debt
        .checked_add(U256::from(1u64))
        .ok_or(MathError::Overflow)?;
    let borrowable = cap_units.checked_sub(used).unwrap_or(U256::ZERO);
    Ok(reserve.available_liquidity.min(borrowable))
}

/// Normalized display stage for one reserve.
pub fn format_reserve(
    reserve: &ReserveData,
    current_timestamp: u64,
) -> Result<FormattedReserve, MathError> {
    let debt = calculate_reserve_debt(reserve, current_timestamp)?;
    let decimals = reserve.decimals;

    let total_debt = normalize(debt.total_debt, decimals)?;
    let total_liquidity = normalize(debt.total_liquidity, decimals)?;

    let borrow_usage_ratio = if debt.total_liquidity.is_zero() {
        Decimal::ZERO
    } else {
        total_debt
            .checked_div(total_liquidity)
            .ok_or(MathError::Overflow)?
    };
    let supply_base = debt
        .total_liquidity
        .checked_add(reserve.unbacked)
        .ok_or(MathError::Overflow)?;
    let supply_usage_ratio = if supply_base.is_zero() {
        Decimal::ZERO
    } else {
        total_debt
            .checked_div(normalize(supply_base, decimals)?)
            .ok_or(MathError::Overflow)?
    };

    let available_liquidity = clamped_available_liquidity(reserve, debt.total_debt)?;

    let is_isolated = !reserve.debt_ceiling.is_zero();
    let (debt_ceiling_usd, isolation_mode_total_debt_usd, available_debt_ceiling_usd) =
        if is_isolated {
            let headroom = reserve
                .debt_ceiling
                .checked_sub(reserve.isolation_mode_total_debt)
                .unwrap_or(U256::ZERO);
            (
                normalize(reserve.debt_ceiling, reserve.debt_ceiling_decimals)?,
                normalize(
                    reserve.isolation_mode_total_debt,
                    reserve.debt_ceiling_decimals,
                )?,
                normalize(headroom, reserve.debt_ceiling_decimals)?,
            )
        } else {
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
        };

    let formatted = FormattedReserve {
        underlying_asset: reserve.underlying_asset,
        symbol: reserve.symbol.clone(),
        decimals,

        total_variable_debt: normalize(debt.total_variable_debt, decimals)?,
        total_stable_debt: normalize(debt.total_stable_debt, decimals)?,
        total_debt,
        total_liquidity,
        available_liquidity: normalize(available_liquidity, decimals)?,
        unborrowed_liquidity: normalize(reserve.available_liquidity, decimals)?,
        total_scaled_variable_debt: normalize(reserve.total_scaled_variable_debt, decimals)?,
        total_principal_stable_debt: normalize(reserve.total_principal_stable_debt, decimals)?,
        unbacked: normalize(reserve.unbacked, decimals)?,

        borrow_usage_ratio,
        supply_usage_ratio,

        supply_apr: normalize(reserve.liquidity_rate.raw(), RAY_DECIMALS)?,
        variable_borrow_apr: normalize(reserve.variable_borrow_rate.raw(), RAY_DECIMALS)?,
        stable_borrow_apr: normalize(reserve.stable_borrow_rate.raw(), RAY_DECIMALS)?,
        supply_apy: apy_from_apr(reserve.liquidity_rate.raw())?,
        variable_borrow_apy: apy_from_apr(reserve.variable_borrow_rate.raw())?,
        stable_borrow_apy: apy_from_apr(reserve.stable_borrow_rate.raw())?,

        base_ltv_as_collateral: normalize(reserve.base_ltv_as_collateral, LTV_PRECISION)?,
        reserve_liquidation_threshold: normalize(
            reserve.reserve_liquidation_threshold,
            LTV_PRECISION,
        )?,
        reserve_liquidation_bonus: normalize_liquidation_bonus(
            reserve.reserve_liquidation_bonus,
        )?,
        e_mode_ltv: normalize(reserve.e_mode_ltv, LTV_PRECISION)?,
        e_mode_liquidation_threshold: normalize(
            reserve.e_mode_liquidation_threshold,
            LTV_PRECISION,
        )?,
        e_mode_liquidation_bonus: normalize_liquidation_bonus(
            reserve.e_mode_liquidation_bonus,
        )?,

        borrow_cap: normalize(reserve.borrow_cap, 0)?,
        supply_cap: normalize(reserve.supply_cap, 0)?,

        is_isolated,
        debt_ceiling_usd,
        isolation_mode_total_debt_usd,
        available_debt_ceiling_usd,
    };

    debug!(
        symbol = %formatted.symbol,
        total_debt = %formatted.total_debt,
        total_liquidity = %formatted.total_liquidity,
        borrow_usage = %formatted.borrow_usage_ratio,
        "reserve formatted"
    );

    Ok(formatted)
}

/// USD display stage. Runs [`format_reserve`] and derives USD figures for
/// every liquidity, debt, cap and price field.
pub fn format_reserve_usd(
    reserve: &ReserveData,
    request: &FormatReserveUsdRequest,
) -> Result<FormattedReserveUsd, MathError> {
    let formatted = format_reserve(reserve, request.current_timestamp)?;
    let debt = calculate_reserve_debt(reserve, request.current_timestamp)?;
    let available_liquidity = clamped_available_liquidity(reserve, debt.total_debt)?;

    let ref_decimals = request.market_reference_currency_decimals;
    let ref_price_usd = request.market_reference_price_in_usd;
    let norm_ref_price = normalized_market_reference_price_in_usd(ref_price_usd)?;
    let price = reserve.price_in_market_reference_currency;

    let to_usd =
        |amount: U256| native_to_usd(amount, reserve.decimals, price, ref_decimals, norm_ref_price);

    let cap_units = |cap: U256| {
        cap.checked_mul(pow10(reserve.decimals)?)
            .ok_or(MathError::Overflow)
    };

    Ok(FormattedReserveUsd {
        total_liquidity_usd: to_usd(debt.total_liquidity)?,
        available_liquidity_usd: to_usd(available_liquidity)?,
        total_debt_usd: to_usd(debt.total_debt)?,
        total_variable_debt_usd: to_usd(debt.total_variable_debt)?,
        total_stable_debt_usd: to_usd(debt.total_stable_debt)?,
        borrow_cap_usd: to_usd(cap_units(reserve.borrow_cap)?)?,
        supply_cap_usd: to_usd(cap_units(reserve.supply_cap)?)?,
        unbacked_usd: to_usd(reserve.unbacked)?,
        price_in_market_reference_currency: normalize(price, ref_decimals)?,
        price_in_usd: price_in_usd(price, ref_price_usd, ref_decimals)?,
        reserve: formatted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WAD;
    use alloy::primitives::Address;
    use crate::types::wad_ray::Ray;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    /// A quiet 18-decimal reserve: index at one, no accrued time, prices set.
    fn base_reserve() -> ReserveData {
        ReserveData {
            underlying_asset: Address::repeat_byte(0x11),
            symbol: "WETH".to_string(),
            decimals: 18,
            base_ltv_as_collateral: U256::from(8000u64),
            reserve_liquidation_threshold: U256::from(8250u64),
            reserve_liquidation_bonus: U256::from(10500u64),
            usage_as_collateral_enabled: true,
            liquidity_index: Ray::ONE,
            variable_borrow_index: Ray::ONE,
            liquidity_rate: Ray::ZERO,
            variable_borrow_rate: Ray::ZERO,
            stable_borrow_rate: Ray::ZERO,
            average_stable_rate: Ray::ZERO,
            total_scaled_variable_debt: U256::from(300u64) * WAD,
            total_principal_stable_debt: U256::from(100u64) * WAD,
            available_liquidity: U256::from(600u64) * WAD,
            unbacked: U256::ZERO,
            last_update_timestamp: 1_000,
            stable_debt_last_update_timestamp: 1_000,
            borrow_cap: U256::ZERO,
            supply_cap: U256::ZERO,
            debt_ceiling: U256::ZERO,
            debt_ceiling_decimals: 2,
            isolation_mode_total_debt: U256::ZERO,
            e_mode_category_id: 0,
            e_mode_ltv: U256::ZERO,
            e_mode_liquidation_threshold: U256::ZERO,
            e_mode_liquidation_bonus: U256::ZERO,
            price_in_market_reference_currency: U256::from(200_000_000_000u64), // 2000 @ 8 dec
        }
    }

    #[test]
    fn test_reserve_debt_zero_elapsed() {
        let reserve = base_reserve();
        let debt = calculate_reserve_debt(&reserve, 1_000).unwrap();
        assert_eq!(debt.total_variable_debt, U256::from(300u64) * WAD);
        assert_eq!(debt.total_stable_debt, U256::from(100u64) * WAD);
        assert_eq!(debt.total_debt, U256::from(400u64) * WAD);
        assert_eq!(debt.total_liquidity, U256::from(1000u64) * WAD);
    }

    #[test]
    fn test_reserve_debt_applies_variable_index() {
        let mut reserve = base_reserve();
        reserve.variable_borrow_index = Ray(RAY * U256::from(2u64));
        let debt = calculate_reserve_debt(&reserve, 1_000).unwrap();
        assert_eq!(debt.total_variable_debt, U256::from(600u64) * WAD);
    }

    #[test]
    fn test_reserve_debt_independent_stable_clock() {
        let mut reserve = base_reserve();
        // Variable side is already up to date; stable side lags a year at 10%.
        reserve.average_stable_rate = Ray(RAY / U256::from(10u64));
        reserve.stable_debt_last_update_timestamp = 0;
        reserve.last_update_timestamp = SECONDS_PER_YEAR;
        let debt = calculate_reserve_debt(&reserve, SECONDS_PER_YEAR).unwrap();
        assert_eq!(debt.total_variable_debt, U256::from(300u64) * WAD);
        // ~10.5% compounded on 100.
        assert!(debt.total_stable_debt > U256::from(110u64) * WAD);
        assert!(debt.total_stable_debt < U256::from(111u64) * WAD);
    }

    #[test]
    fn test_liquidity_invariant_holds() {
        let mut reserve = base_reserve();
        reserve.variable_borrow_rate = Ray(RAY / U256::from(4u64));
        reserve.average_stable_rate = Ray(RAY / U256::from(20u64));
        let debt = calculate_reserve_debt(&reserve, 1_000 + SECONDS_PER_YEAR).unwrap();
        assert_eq!(
            debt.total_liquidity,
            debt.total_debt + reserve.available_liquidity
        );
        assert_eq!(
            debt.total_debt,
            debt.total_variable_debt + debt.total_stable_debt
        );
    }

    #[test]
    fn test_usage_ratios() {
        let reserve = base_reserve();
        let formatted = format_reserve(&reserve, 1_000).unwrap();
        // 400 debt over 1000 liquidity.
        assert_eq!(formatted.borrow_usage_ratio, dec!(0.4));
        assert_eq!(formatted.supply_usage_ratio, dec!(0.4));
    }

    #[test]
    fn test_usage_ratio_zero_liquidity() {
        let mut reserve = base_reserve();
        reserve.total_scaled_variable_debt = U256::ZERO;
        reserve.total_principal_stable_debt = U256::ZERO;
        reserve.available_liquidity = U256::ZERO;
        let formatted = format_reserve(&reserve, 1_000).unwrap();
        assert_eq!(formatted.borrow_usage_ratio, Decimal::ZERO);
        assert_eq!(formatted.supply_usage_ratio, Decimal::ZERO);
    }

    #[test]
    fn test_unbacked_dilutes_supply_ratio() {
        let mut reserve = base_reserve();
        reserve.unbacked = U256::from(1000u64) * WAD;
        let formatted = format_reserve(&reserve, 1_000).unwrap();
        assert_eq!(formatted.borrow_usage_ratio, dec!(0.4));
        assert_eq!(formatted.supply_usage_ratio, dec!(0.2));
    }

    #[test]
    fn test_borrow_cap_clamps_available_liquidity() {
        let mut reserve = base_reserve();
        // Cap of 500 tokens with 400 already borrowed: 500 - (400 + 1 wei).
        reserve.borrow_cap = U256::from(500u64);
        let formatted = format_reserve(&reserve, 1_000).unwrap();
        let expected =
            normalize(U256::from(100u64) * WAD - U256::from(1u64), 18).unwrap();
        assert_eq!(formatted.available_liquidity, expected);
        // The raw pool balance is reported separately, un-clamped.
        assert_eq!(formatted.unborrowed_liquidity, dec!(600));
    }

    #[test]
    fn test_borrow_cap_exhausted_clamps_to_zero() {
        let mut reserve = base_reserve();
        reserve.borrow_cap = U256::from(400u64);
        let formatted = format_reserve(&reserve, 1_000).unwrap();
        assert_eq!(formatted.available_liquidity, Decimal::ZERO);
    }

    #[test]
    fn test_supply_apy_full_rate_year() {
        // liquidityRate = RAY is 100% APR; per-second compounding over a year
        // approaches e - 1.
        let mut reserve = base_reserve();
        reserve.liquidity_rate = Ray::ONE;
        let formatted = format_reserve(&reserve, 1_000).unwrap();
        assert!(formatted.supply_apy > dec!(1.7182));
        assert!(formatted.supply_apy < dec!(1.7183));
        assert_eq!(formatted.supply_apr, dec!(1));
    }

    #[test]
    fn test_zero_rate_zero_apy() {
        let formatted = format_reserve(&base_reserve(), 1_000).unwrap();
        assert_eq!(formatted.supply_apy, Decimal::ZERO);
        assert_eq!(formatted.variable_borrow_apy, Decimal::ZERO);
    }

    #[test]
    fn test_collateral_params_normalized() {
        let formatted = format_reserve(&base_reserve(), 1_000).unwrap();
        assert_eq!(formatted.base_ltv_as_collateral, dec!(0.8));
        assert_eq!(formatted.reserve_liquidation_threshold, dec!(0.825));
        assert_eq!(formatted.reserve_liquidation_bonus, dec!(0.05));
        // Unset e-mode bonus stays zero instead of going negative.
        assert_eq!(formatted.e_mode_liquidation_bonus, Decimal::ZERO);
    }

    #[test]
    fn test_no_debt_ceiling_means_no_isolation_figures() {
        let formatted = format_reserve(&base_reserve(), 1_000).unwrap();
        assert!(!formatted.is_isolated);
        assert_eq!(formatted.debt_ceiling_usd, Decimal::ZERO);
        assert_eq!(formatted.isolation_mode_total_debt_usd, Decimal::ZERO);
        assert_eq!(formatted.available_debt_ceiling_usd, Decimal::ZERO);
    }

    #[test]
    fn test_isolation_figures() {
        let mut reserve = base_reserve();
        reserve.debt_ceiling = U256::from(5_000_000u64); // 50,000.00 USD
        reserve.isolation_mode_total_debt = U256::from(1_250_000u64); // 12,500.00
        let formatted = format_reserve(&reserve, 1_000).unwrap();
        assert!(formatted.is_isolated);
        assert_eq!(formatted.debt_ceiling_usd, dec!(50000));
        assert_eq!(formatted.isolation_mode_total_debt_usd, dec!(12500));
        assert_eq!(formatted.available_debt_ceiling_usd, dec!(37500));
    }

    #[test]
    fn test_format_reserve_usd() {
        let reserve = base_reserve();
        let request = FormatReserveUsdRequest {
            current_timestamp: 1_000,
            market_reference_currency_decimals: 8,
            market_reference_price_in_usd: U256::from(100_000_000u64), // 1 USD
        };
        let usd = format_reserve_usd(&reserve, &request).unwrap();
        // 1000 tokens at 2000 USD each.
        assert_eq!(usd.total_liquidity_usd, dec!(2000000));
        assert_eq!(usd.total_debt_usd, dec!(800000));
        assert_eq!(usd.price_in_usd, dec!(2000));
        assert_eq!(usd.price_in_market_reference_currency, dec!(2000));
        assert_eq!(usd.reserve.total_liquidity, dec!(1000));
    }

    proptest! {
        #[test]
        fn liquidity_invariant_by_construction(
            scaled_variable in 0u128..1_000_000_000,
            principal_stable in 0u128..1_000_000_000,
            available in 0u128..1_000_000_000,
            rate_pct in 0u64..300,
            elapsed in 0u64..(5 * SECONDS_PER_YEAR),
        ) {
            let mut reserve = base_reserve();
            reserve.total_scaled_variable_debt = U256::from(scaled_variable) * WAD;
            reserve.total_principal_stable_debt = U256::from(principal_stable) * WAD;
            reserve.available_liquidity = U256::from(available) * WAD;
            reserve.variable_borrow_rate = Ray(RAY * U256::from(rate_pct) / U256::from(100u64));
            reserve.average_stable_rate = Ray(RAY * U256::from(rate_pct) / U256::from(100u64));
            reserve.last_update_timestamp = 0;
            reserve.stable_debt_last_update_timestamp = 0;

            let debt = calculate_reserve_debt(&reserve, elapsed).unwrap();
            prop_assert_eq!(
                debt.total_liquidity,
                debt.total_debt + reserve.available_liquidity
            );
            prop_assert_eq!(
                debt.total_debt,
                debt.total_variable_debt + debt.total_stable_debt
            );
        }
    }
}
