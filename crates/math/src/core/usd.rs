//! Conversions into USD and market-reference-currency display values.
//!
//! All asset prices are quoted in an intermediate market reference currency
//! (USD base units on v3 markets, ETH wei historically); the reference
//! currency itself carries a USD price at `USD_DECIMALS`.

use alloy::primitives::U256;
use rust_decimal::Decimal;

use crate::constants::USD_DECIMALS;
use crate::errors::MathError;
use crate::types::wad_ray::{normalize, pow10};

/// `10^n` as a `Decimal`. Display scales never exceed the decimal range in
/// practice; beyond it the conversion is refused.
pub fn pow10_decimal(n: u32) -> Result<Decimal, MathError> {
    if n > 28 {
        return Err(MathError::Overflow);
    }
    Ok(Decimal::from_i128_with_scale(10i128.pow(n), 0))
}

/// Market reference currency price in USD, as a plain decimal.
pub fn normalized_market_reference_price_in_usd(
    market_reference_price_in_usd: U256,
) -> Result<Decimal, MathError> {
    normalize(market_reference_price_in_usd, USD_DECIMALS)
}

/// `amount * price * ref_price_usd / 10^(currency_decimals + ref_decimals)`.
///
/// The integer product is exact; only the final shift into display space
/// rounds.
pub fn native_to_usd(
    amount: U256,
    currency_decimals: u32,
    price_in_market_reference_currency: U256,
    market_reference_currency_decimals: u32,
    normalized_market_reference_price_in_usd: Decimal,
) -> Result<Decimal, MathError> {
    let value_mrc = amount
        .checked_mul(price_in_market_reference_currency)
        .ok_or(MathError::Overflow)?;
    normalize(
        value_mrc,
        currency_decimals + market_reference_currency_decimals,
    )?
    .checked_mul(normalized_market_reference_price_in_usd)
    .ok_or(MathError::Overflow)
}

/// USD value of a raw market-reference-currency integer amount.
pub fn normalized_to_usd(
    amount_market_reference_currency: U256,
    market_reference_price_in_usd: U256,
    market_reference_currency_decimals: u32,
) -> Result<Decimal, MathError> {
    let product = amount_market_reference_currency
        .checked_mul(market_reference_price_in_usd)
        .ok_or(MathError::Overflow)?;
    normalize(product, market_reference_currency_decimals + USD_DECIMALS)
}

/// USD value of an already-fractional market-reference-currency amount.
pub fn mrc_value_to_usd(
    amount_market_reference_currency: Decimal,
    market_reference_price_in_usd: U256,
    market_reference_currency_decimals: u32,
) -> Result<Decimal, MathError> {
    let scale = pow10_decimal(market_reference_currency_decimals)?;
    let normalized_amount = amount_market_reference_currency
        .checked_div(scale)
        .ok_or(MathError::Overflow)?;
    normalized_amount
        .checked_mul(normalized_market_reference_price_in_usd(
            market_reference_price_in_usd,
        )?)
        .ok_or(MathError::Overflow)
}

/// Asset price in USD: `price_mrc * ref_price_usd`, normalized.
pub fn price_in_usd(
    price_in_market_reference_currency: U256,
    market_reference_price_in_usd: U256,
    market_reference_currency_decimals: u32,
) -> Result<Decimal, MathError> {
    let product = price_in_market_reference_currency
        .checked_mul(market_reference_price_in_usd)
        .ok_or(MathError::Overflow)?;
    normalize(product, market_reference_currency_decimals + USD_DECIMALS)
}

/// Amount in market-reference-currency base units: `amount * price / 10^decimals`,
/// floored exactly as the on-chain aggregation floors it.
pub fn native_to_market_reference_currency(
    amount: U256,
    currency_decimals: u32,
    price_in_market_reference_currency: U256,
) -> Result<U256, MathError> {
    let product = amount
        .checked_mul(price_in_market_reference_currency)
        .ok_or(MathError::Overflow)?;
    Ok(product / pow10(currency_decimals)?)
}
