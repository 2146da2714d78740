//! User-position data shapes.
//!
//! Mirrors the reserve pipeline: raw per-reserve position
//! ([`UserReserveData`]) to current balances ([`UserReserveSummary`]) to
//! account-wide totals ([`UserReserveTotals`], [`RawUserSummary`]) to the
//! normalized display stage ([`FormattedUserSummary`]).

use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::reserve::ReserveData;
use super::wad_ray::{serde_u256, Ray};

/// A user's raw position in one reserve, keyed to a [`ReserveData`] by
/// underlying asset address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserReserveData {
    pub underlying_asset: Address,
    /// aToken balance without interest applied; multiply by the current
    /// liquidity index to get the real balance.
    #[serde(with = "serde_u256")]
    pub scaled_a_token_balance: U256,
    #[serde(with = "serde_u256")]
    pub scaled_variable_debt: U256,
    #[serde(with = "serde_u256")]
    pub principal_stable_debt: U256,
    /// The rate this user locked at borrow time, not the reserve average.
    pub stable_borrow_rate: Ray,
    pub stable_borrow_last_update_timestamp: u64,
    pub usage_as_collateral_enabled_on_user: bool,
}

/// A user position paired with the reserve it lives in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserReservePosition {
    pub reserve: ReserveData,
    pub user_reserve: UserReserveData,
}

/// Inputs for the full user-summary pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatUserSummaryRequest {
    pub user_reserves: Vec<UserReservePosition>,
    /// 0 means the user has not opted into any e-mode category.
    pub user_emode_category_id: u8,
    pub market_reference_currency_decimals: u32,
    /// Market reference currency price in USD base units (8 decimals).
    #[serde(with = "serde_u256")]
    pub market_reference_price_in_usd: U256,
    pub current_timestamp: u64,
}

/// One user reserve with interest applied, in native units,
/// market-reference-currency units, and USD.
#[derive(Debug, Clone)]
pub struct UserReserveSummary {
    pub reserve: ReserveData,
    pub user_reserve: UserReserveData,

    pub underlying_balance: U256,
    pub underlying_balance_market_reference_currency: U256,
    pub underlying_balance_usd: Decimal,

    pub variable_borrows: U256,
    pub variable_borrows_market_reference_currency: U256,
    pub variable_borrows_usd: Decimal,

    pub stable_borrows: U256,
    pub stable_borrows_market_reference_currency: U256,
    pub stable_borrows_usd: Decimal,

    pub total_borrows: U256,
    pub total_borrows_market_reference_currency: U256,
    pub total_borrows_usd: Decimal,
}

/// Fold of all of a user's reserves, before health-factor derivation.
///
/// `current_ltv` and `current_liquidation_threshold` are blended
/// collateral-weighted values at basis-point scale.
#[derive(Debug, Clone)]
pub struct UserReserveTotals {
    pub total_liquidity_market_reference_currency: U256,
    pub total_collateral_market_reference_currency: U256,
    pub total_borrows_market_reference_currency: U256,
    pub current_ltv: Decimal,
    pub current_liquidation_threshold: Decimal,
    pub is_in_isolation_mode: bool,
    /// Only one isolated reserve is tracked; the protocol disallows more
    /// than one by design, not this code.
    pub isolated_reserve: Option<ReserveData>,
}

/// Account-wide aggregate with the derived risk figures.
#[derive(Debug, Clone)]
pub struct RawUserSummary {
    pub total_liquidity_market_reference_currency: U256,
    pub total_collateral_market_reference_currency: U256,
    pub total_borrows_market_reference_currency: U256,
    pub total_liquidity_usd: Decimal,
    pub total_collateral_usd: Decimal,
    pub total_borrows_usd: Decimal,
    /// Raw market-reference-currency units, never negative.
    pub available_borrows_market_reference_currency: Decimal,
    pub available_borrows_usd: Decimal,
    /// Blended LTV at basis-point scale.
    pub current_ltv: Decimal,
    pub current_liquidation_threshold: Decimal,
    /// `-1` is a sentinel for "no debt, no liquidation risk", not a ratio.
    pub health_factor: Decimal,
    pub is_in_isolation_mode: bool,
    pub isolated_reserve: Option<ReserveData>,
}

/// Display stage for one user reserve, normalized to token units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormattedUserReserve {
    pub underlying_asset: Address,
    pub usage_as_collateral_enabled_on_user: bool,

    #[serde(with = "rust_decimal::serde::str")]
    pub underlying_balance: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub underlying_balance_market_reference_currency: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub underlying_balance_usd: Decimal,

    #[serde(with = "rust_decimal::serde::str")]
    pub variable_borrows: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub stable_borrows: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_borrows: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_borrows_market_reference_currency: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_borrows_usd: Decimal,
}

/// Display stage for the whole account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormattedUserSummary {
    pub user_reserves: Vec<FormattedUserReserve>,

    #[serde(with = "rust_decimal::serde::str")]
    pub total_liquidity_market_reference_currency: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_liquidity_usd: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_collateral_market_reference_currency: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_collateral_usd: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_borrows_market_reference_currency: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_borrows_usd: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub available_borrows_market_reference_currency: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub available_borrows_usd: Decimal,

    /// Blended ratios as fractions (basis points shifted down).
    #[serde(with = "rust_decimal::serde::str")]
    pub current_loan_to_value: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub current_liquidation_threshold: Decimal,
    /// `-1` sentinel preserved from [`RawUserSummary`].
    #[serde(with = "rust_decimal::serde::str")]
    pub health_factor: Decimal,

    pub is_in_isolation_mode: bool,
    pub isolated_reserve_asset: Option<Address>,
}
