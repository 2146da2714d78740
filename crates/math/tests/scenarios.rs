//! End-to-end scenarios across the whole pipeline, fed through the same
//! JSON wire format SDK callers use (big integers as base-10 decimal
//! strings).

use aave_math::types::{
    FormatReserveUsdRequest, FormatUserSummaryRequest, ReserveData, UserReserveData,
    UserReservePosition,
};
use aave_math::{format_reserve, format_reserve_usd, format_user_summary};
use alloy::primitives::U256;
use rust_decimal_macros::dec;
use serde_json::json;

const RAY_STR: &str = "1000000000000000000000000000";

fn weth_reserve() -> ReserveData {
    serde_json::from_value(json!({
        "underlying_asset": "0x2170ed0880ac9a755fd29b2688956bd959f933f8",
        "symbol": "WETH",
        "decimals": 18,
        "base_ltv_as_collateral": "8000",
        "reserve_liquidation_threshold": "8250",
        "reserve_liquidation_bonus": "10500",
        "usage_as_collateral_enabled": true,
        "liquidity_index": RAY_STR,
        "variable_borrow_index": RAY_STR,
        "liquidity_rate": "0",
        "variable_borrow_rate": "0",
        "stable_borrow_rate": "0",
        "average_stable_rate": "0",
        "total_scaled_variable_debt": "200000000000000000000",
        "total_principal_stable_debt": "0",
        "available_liquidity": "800000000000000000000",
        "unbacked": "0",
        "last_update_timestamp": 0,
        "stable_debt_last_update_timestamp": 0,
        "borrow_cap": "0",
        "supply_cap": "0",
        "debt_ceiling": "0",
        "debt_ceiling_decimals": 2,
        "isolation_mode_total_debt": "0",
        "e_mode_category_id": 0,
        "e_mode_ltv": "0",
        "e_mode_liquidation_threshold": "0",
        "e_mode_liquidation_bonus": "0",
        "price_in_market_reference_currency": "200000000000"
    }))
    .expect("reserve fixture deserializes")
}

fn user_position(reserve: &ReserveData, supplied_wei: &str) -> UserReservePosition {
    UserReservePosition {
        reserve: reserve.clone(),
        user_reserve: serde_json::from_value::<UserReserveData>(json!({
            "underlying_asset": reserve.underlying_asset,
            "scaled_a_token_balance": supplied_wei,
            "scaled_variable_debt": "0",
            "principal_stable_debt": "0",
            "stable_borrow_rate": "0",
            "stable_borrow_last_update_timestamp": 0,
            "usage_as_collateral_enabled_on_user": true
        }))
        .expect("user reserve fixture deserializes"),
    }
}

/// Scenario 1: a reserve earning 100% APR in ray units, compounded
/// per-second over a year, displays an APY of e - 1.
#[test]
fn full_rate_reserve_apy_approaches_e_minus_one() {
    let mut reserve = weth_reserve();
    reserve.liquidity_rate = RAY_STR.parse().unwrap();
    let formatted = format_reserve(&reserve, 31_536_000).unwrap();

    assert_eq!(formatted.supply_apr, dec!(1));
    assert!(formatted.supply_apy > dec!(1.7182), "apy {}", formatted.supply_apy);
    assert!(formatted.supply_apy < dec!(1.7183), "apy {}", formatted.supply_apy);
}

/// Scenario 2: 100 units supplied at liquidity index RAY with zero elapsed
/// time report an underlying balance of exactly 100.
#[test]
fn supplied_balance_is_exact_at_unit_index() {
    let reserve = weth_reserve();
    let request = FormatUserSummaryRequest {
        user_reserves: vec![user_position(&reserve, "100000000000000000000")],
        user_emode_category_id: 0,
        market_reference_currency_decimals: 8,
        market_reference_price_in_usd: U256::from(100_000_000u64),
        current_timestamp: 0,
    };
    let summary = format_user_summary(&request).unwrap();

    assert_eq!(summary.user_reserves[0].underlying_balance, dec!(100));
    // 100 WETH at 2000 USD each.
    assert_eq!(summary.user_reserves[0].underlying_balance_usd, dec!(200000));
    assert_eq!(summary.total_collateral_usd, dec!(200000));
}

/// Scenario 3: zero borrows across every reserve reports the health-factor
/// sentinel `-1`, regardless of collateral value, and it survives the wire
/// format as the string "-1".
#[test]
fn zero_borrows_reports_sentinel_health_factor() {
    let reserve = weth_reserve();
    let request = FormatUserSummaryRequest {
        user_reserves: vec![
            user_position(&reserve, "100000000000000000000"),
            user_position(&reserve, "5000000000000000000000"),
        ],
        user_emode_category_id: 0,
        market_reference_currency_decimals: 8,
        market_reference_price_in_usd: U256::from(100_000_000u64),
        current_timestamp: 0,
    };
    let summary = format_user_summary(&request).unwrap();

    assert_eq!(summary.health_factor, dec!(-1));
    let wire = serde_json::to_value(&summary).unwrap();
    assert_eq!(wire["health_factor"], json!("-1"));
}

/// Scenario 4: a zero debt ceiling means no isolation, and every
/// isolation-USD field formats as "0".
#[test]
fn zero_debt_ceiling_has_no_isolation_figures() {
    let reserve = weth_reserve();
    let request = FormatReserveUsdRequest {
        current_timestamp: 0,
        market_reference_currency_decimals: 8,
        market_reference_price_in_usd: U256::from(100_000_000u64),
    };
    let formatted = format_reserve_usd(&reserve, &request).unwrap();

    assert!(!formatted.reserve.is_isolated);
    let wire = serde_json::to_value(&formatted).unwrap();
    assert_eq!(wire["reserve"]["debt_ceiling_usd"], json!("0"));
    assert_eq!(wire["reserve"]["isolation_mode_total_debt_usd"], json!("0"));
    assert_eq!(wire["reserve"]["available_debt_ceiling_usd"], json!("0"));
}
