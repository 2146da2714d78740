//! Reserve-level data shapes.
//!
//! A reserve flows through explicit immutable stages: raw on-chain snapshot
//! ([`ReserveData`]) to current debt totals ([`ReserveDebt`]) to normalized
//! display figures ([`FormattedReserve`]) to USD-denominated figures
//! ([`FormattedReserveUsd`]). Each stage is a distinct record computed from
//! the previous one plus a `current_timestamp`; nothing is mutated in place.

use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::wad_ray::{serde_u256, Ray};
use crate::constants::DEBT_CEILING_DECIMALS;

fn default_debt_ceiling_decimals() -> u32 {
    DEBT_CEILING_DECIMALS
}

/// Immutable snapshot of one lending reserve's on-chain fields at a block.
///
/// All big integers travel as base-10 decimal strings on the wire. Rates and
/// indices are ray-scaled; balances are in the token's native units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveData {
    pub underlying_asset: Address,
    pub symbol: String,
    pub decimals: u32,

    // -- Collateral parameters (basis points) -------------------------------
    #[serde(with = "serde_u256")]
    pub base_ltv_as_collateral: U256,
    #[serde(with = "serde_u256")]
    pub reserve_liquidation_threshold: U256,
    #[serde(with = "serde_u256")]
    pub reserve_liquidation_bonus: U256,
    pub usage_as_collateral_enabled: bool,

    // -- Rates and indices (ray) --------------------------------------------
    pub liquidity_index: Ray,
    pub variable_borrow_index: Ray,
    pub liquidity_rate: Ray,
    pub variable_borrow_rate: Ray,
    pub stable_borrow_rate: Ray,
    /// Blended average over all stable borrowers, not a per-user rate.
    pub average_stable_rate: Ray,

    // -- Debt and liquidity (native units) ----------------------------------
    #[serde(with = "serde_u256")]
    pub total_scaled_variable_debt: U256,
    #[serde(with = "serde_u256")]
    pub total_principal_stable_debt: U256,
    #[serde(with = "serde_u256")]
    pub available_liquidity: U256,
    #[serde(with = "serde_u256")]
    pub unbacked: U256,

    // -- Accrual timestamps (Unix seconds) ----------------------------------
    pub last_update_timestamp: u64,
    /// Stable debt accrues against its own clock, independent of
    /// `last_update_timestamp`.
    pub stable_debt_last_update_timestamp: u64,

    // -- Caps (whole tokens) and isolation mode -----------------------------
    #[serde(with = "serde_u256")]
    pub borrow_cap: U256,
    #[serde(with = "serde_u256")]
    pub supply_cap: U256,
    /// Isolation-mode ceiling, `debt_ceiling_decimals` USD decimals. Zero
    /// means the reserve is not isolated.
    #[serde(with = "serde_u256")]
    pub debt_ceiling: U256,
    #[serde(default = "default_debt_ceiling_decimals")]
    pub debt_ceiling_decimals: u32,
    #[serde(with = "serde_u256")]
    pub isolation_mode_total_debt: U256,

    // -- E-mode category parameters -----------------------------------------
    pub e_mode_category_id: u8,
    #[serde(with = "serde_u256")]
    pub e_mode_ltv: U256,
    #[serde(with = "serde_u256")]
    pub e_mode_liquidation_threshold: U256,
    #[serde(with = "serde_u256")]
    pub e_mode_liquidation_bonus: U256,

    // -- Pricing -------------------------------------------------------------
    /// Asset price in market-reference-currency base units.
    #[serde(with = "serde_u256")]
    pub price_in_market_reference_currency: U256,
}

/// Current debt and liquidity totals for a reserve.
///
/// `total_liquidity == total_debt + available_liquidity` and
/// `total_debt == total_variable_debt + total_stable_debt` hold by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReserveDebt {
    pub total_variable_debt: U256,
    pub total_stable_debt: U256,
    pub total_debt: U256,
    pub total_liquidity: U256,
}

/// Inputs for the USD formatting stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatReserveUsdRequest {
    pub current_timestamp: u64,
    pub market_reference_currency_decimals: u32,
    /// Market reference currency price in USD base units (8 decimals).
    #[serde(with = "serde_u256")]
    pub market_reference_price_in_usd: U256,
}

/// Human-readable reserve figures. Every field is a plain decimal value in
/// token units (or a fraction for ratios and rates).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormattedReserve {
    pub underlying_asset: Address,
    pub symbol: String,
    pub decimals: u32,

    // -- Totals --------------------------------------------------------------
    #[serde(with = "rust_decimal::serde::str")]
    pub total_variable_debt: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_stable_debt: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_debt: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_liquidity: Decimal,
    /// Borrowable liquidity after the borrow-cap clamp.
    #[serde(with = "rust_decimal::serde::str")]
    pub available_liquidity: Decimal,
    /// Raw un-clamped liquidity sitting in the reserve.
    #[serde(with = "rust_decimal::serde::str")]
    pub unborrowed_liquidity: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_scaled_variable_debt: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_principal_stable_debt: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub unbacked: Decimal,

    // -- Utilization ---------------------------------------------------------
    #[serde(with = "rust_decimal::serde::str")]
    pub borrow_usage_ratio: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub supply_usage_ratio: Decimal,

    // -- Rates ---------------------------------------------------------------
    #[serde(with = "rust_decimal::serde::str")]
    pub supply_apr: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub variable_borrow_apr: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub stable_borrow_apr: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub supply_apy: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub variable_borrow_apy: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub stable_borrow_apy: Decimal,

    // -- Collateral parameters (fractions) -----------------------------------
    #[serde(with = "rust_decimal::serde::str")]
    pub base_ltv_as_collateral: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub reserve_liquidation_threshold: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub reserve_liquidation_bonus: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub e_mode_ltv: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub e_mode_liquidation_threshold: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub e_mode_liquidation_bonus: Decimal,

    // -- Caps (whole tokens) --------------------------------------------------
    #[serde(with = "rust_decimal::serde::str")]
    pub borrow_cap: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub supply_cap: Decimal,

    // -- Isolation mode -------------------------------------------------------
    pub is_isolated: bool,
    #[serde(with = "rust_decimal::serde::str")]
    pub debt_ceiling_usd: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub isolation_mode_total_debt_usd: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub available_debt_ceiling_usd: Decimal,
}

/// [`FormattedReserve`] plus USD-denominated figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormattedReserveUsd {
    pub reserve: FormattedReserve,

    #[serde(with = "rust_decimal::serde::str")]
    pub total_liquidity_usd: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub available_liquidity_usd: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_debt_usd: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_variable_debt_usd: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_stable_debt_usd: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub borrow_cap_usd: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub supply_cap_usd: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub unbacked_usd: Decimal,
    /// Asset price in market-reference-currency units, normalized.
    #[serde(with = "rust_decimal::serde::str")]
    pub price_in_market_reference_currency: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub price_in_usd: Decimal,
}
