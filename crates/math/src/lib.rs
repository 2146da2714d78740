//! Off-chain reimplementation of the Aave V3 protocol's accounting math.
//!
//! Reproduces, bit for bit, the fixed-point arithmetic the lending pool
//! contracts run on chain (ray/wad round-half-up operations on 256-bit
//! unsigned integers), so interfaces can display balances, debt, health
//! factors and incentive yields without a divergent figure ever reaching a
//! user. On top of the primitives sit pure transforms: interest accrual,
//! reserve debt/liquidity aggregation, reserve and user formatting, and
//! incentive accrual.
//!
//! Everything here is synchronous, allocation-light and side-effect free.
//! Callers supply fresh on-chain snapshots and a `current_timestamp`; every
//! function returns a new value and mutates nothing, so concurrent use needs
//! no coordination.
//!
//! Raw quantities are [`alloy::primitives::U256`] (exact on-chain integer
//! semantics); normalized display quantities are [`rust_decimal::Decimal`].
//! Native floats never appear: they cannot reproduce on-chain truncation.

pub mod constants;
pub mod core;
pub mod errors;
pub mod types;

pub use crate::core::incentives::{
    calculate_accrued_incentives, calculate_incentive_apr, calculate_reserve_incentives,
    calculate_user_incentives,
};
pub use crate::core::interest::{
    calculate_compounded_interest, calculate_linear_interest, get_compounded_balance,
    get_compounded_stable_balance, get_linear_balance, get_reserve_normalized_income,
};
pub use crate::core::reserve::{calculate_reserve_debt, format_reserve, format_reserve_usd};
pub use crate::core::usd::{native_to_usd, normalized_to_usd};
pub use crate::core::user::{
    calculate_available_borrows_market_reference_currency,
    calculate_health_factor_from_balances, calculate_user_reserve_totals, format_user_summary,
    generate_raw_user_summary, generate_user_reserve_summary,
};
pub use crate::errors::MathError;
pub use crate::types::wad_ray::{
    binomial_approximated_ray_pow, normalize, ray_div, ray_mul, ray_pow, ray_to_wad, wad_to_ray,
    Ray, Wad,
};
