//! Incentive (liquidity-mining) data shapes.

use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::wad_ray::serde_u256;

/// Reserve- and user-level reward state for one emission, frozen at a block.
///
/// Indices are scaled by `10^precision`; balances are in the emitted or
/// tracked token's native units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncentiveSnapshot {
    #[serde(with = "serde_u256")]
    pub principal_user_balance: U256,
    #[serde(with = "serde_u256")]
    pub reserve_index: U256,
    #[serde(with = "serde_u256")]
    pub user_index: U256,
    pub precision: u32,
    pub reserve_index_timestamp: u64,
    #[serde(with = "serde_u256")]
    pub emission_per_second: U256,
    #[serde(with = "serde_u256")]
    pub total_supply: U256,
    pub emission_end_timestamp: u64,
}

/// Inputs for the incentive APR formula.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncentiveAprRequest {
    /// Emission rate in reward-token wei (18 decimals) per second.
    #[serde(with = "serde_u256")]
    pub emission_per_second: U256,
    #[serde(with = "serde_u256")]
    pub reward_token_price_in_market_reference_currency: U256,
    /// Price of the token whose supply backs the emission.
    #[serde(with = "serde_u256")]
    pub price_in_market_reference_currency: U256,
    #[serde(with = "serde_u256")]
    pub total_token_supply: U256,
    pub decimals: u32,
}

/// One reward emission attached to a side of a reserve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveIncentiveEmission {
    pub reward_token: Address,
    #[serde(with = "serde_u256")]
    pub emission_per_second: U256,
    pub emission_end_timestamp: u64,
    #[serde(with = "serde_u256")]
    pub reward_token_price_in_market_reference_currency: U256,
}

/// Reserve totals plus the emissions on each side of the book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveIncentivesRequest {
    pub underlying_asset: Address,
    pub decimals: u32,
    pub current_timestamp: u64,
    #[serde(with = "serde_u256")]
    pub price_in_market_reference_currency: U256,

    #[serde(with = "serde_u256")]
    pub total_liquidity: U256,
    #[serde(with = "serde_u256")]
    pub total_variable_debt: U256,
    #[serde(with = "serde_u256")]
    pub total_stable_debt: U256,

    pub supply_emissions: Vec<ReserveIncentiveEmission>,
    pub variable_debt_emissions: Vec<ReserveIncentiveEmission>,
    pub stable_debt_emissions: Vec<ReserveIncentiveEmission>,
}

/// APR for one reward token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardApr {
    pub reward_token: Address,
    #[serde(with = "rust_decimal::serde::str")]
    pub incentive_apr: Decimal,
}

/// Per-side incentive APRs for one reserve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveIncentivesResponse {
    pub underlying_asset: Address,
    pub supply_incentives: Vec<RewardApr>,
    pub variable_debt_incentives: Vec<RewardApr>,
    pub stable_debt_incentives: Vec<RewardApr>,
}

/// Everything accruing a single reward token for one user: the already
/// tracked unclaimed amount plus every position emitting that token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRewardAccrual {
    pub reward_token: Address,
    #[serde(with = "serde_u256")]
    pub unclaimed_rewards: U256,
    pub positions: Vec<IncentiveSnapshot>,
}

/// Accrued and claimable amounts for one reward token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserReward {
    pub reward_token: Address,
    /// Newly accrued since the user indices were written.
    #[serde(with = "serde_u256")]
    pub accrued: U256,
    /// `unclaimed_rewards + accrued`.
    #[serde(with = "serde_u256")]
    pub claimable: U256,
}
