//! Newtype wrappers and arithmetic for on-chain fixed-point values.
//!
//! Prevents accidental mixing of WAD-scaled (18 decimals) and RAY-scaled
//! (27 decimals) values at the type level, and reproduces the exact
//! round-half-up integer arithmetic of the protocol's Solidity `WadRayMath`
//! library. Products are widened to 512 bits before dividing so the only
//! observable behavior is the on-chain rounding, never wrap-around.

use alloy::primitives::{U256, U512};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{HALF_RAY, RAY, RAY_DECIMALS, WAD, WAD_RAY_RATIO, WEI_DECIMALS};
use crate::errors::MathError;

// ---------------------------------------------------------------------------
// 512-bit widening helpers
// ---------------------------------------------------------------------------

fn widen(a: U256) -> U512 {
    let l = a.as_limbs();
    U512::from_limbs([l[0], l[1], l[2], l[3], 0, 0, 0, 0])
}

fn narrow(a: U512) -> Result<U256, MathError> {
    let l = a.as_limbs();
    if l[4] | l[5] | l[6] | l[7] != 0 {
        return Err(MathError::Overflow);
    }
    Ok(U256::from_limbs([l[0], l[1], l[2], l[3]]))
}

// ---------------------------------------------------------------------------
// Core ray operations
// ---------------------------------------------------------------------------

/// `(a * b + RAY/2) / RAY`, multiply-then-round-half-up at ray scale.
///
/// Matches `WadRayMath.rayMul` exactly, including the rounding direction.
/// Also used to apply a ray-scaled index to a plain token amount, in which
/// case the result keeps the amount's unit.
pub fn ray_mul(a: U256, b: U256) -> Result<U256, MathError> {
    let product = widen(a) * widen(b);
    narrow((product + widen(HALF_RAY)) / widen(RAY))
}

/// `(a * RAY + b/2) / b`, divide-then-round-half-up at ray scale.
pub fn ray_div(a: U256, b: U256) -> Result<U256, MathError> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let half_b = widen(b) / widen(U256::from(2u64));
    narrow((widen(a) * widen(RAY) + half_b) / widen(b))
}

/// Lift a wad-scaled value into ray scale (exact, `* 1e9`).
pub fn wad_to_ray(a: U256) -> Result<U256, MathError> {
    a.checked_mul(WAD_RAY_RATIO).ok_or(MathError::Overflow)
}

/// Drop a ray-scaled value to wad scale, rounding half-up at the 1e9 ratio.
pub fn ray_to_wad(a: U256) -> U256 {
    let half_ratio = WAD_RAY_RATIO / U256::from(2u64);
    // a + half_ratio cannot overflow 256 bits by more than the carry; widen.
    narrow((widen(a) + widen(half_ratio)) / widen(WAD_RAY_RATIO))
        .expect("quotient is smaller than the operand")
}

/// Exact ray-space exponentiation by repeated squaring.
///
/// Display-only call sites (APY from APR). Debt accrual must go through
/// [`binomial_approximated_ray_pow`] instead to match on-chain figures.
pub fn ray_pow(a: U256, n: u64) -> Result<U256, MathError> {
    let mut x = a;
    let mut n = n;
    let mut z = if n % 2 != 0 { x } else { RAY };
    n /= 2;
    while n != 0 {
        x = ray_mul(x, x)?;
        if n % 2 != 0 {
            z = ray_mul(z, x)?;
        }
        n /= 2;
    }
    Ok(z)
}

/// Second-order binomial expansion of `(RAY + a)^n`:
///
/// `RAY + n*a + n(n-1)*a^2/2 + n(n-1)(n-2)*a^3/6`
///
/// Deliberately approximate. This is the gas-optimized formula the variable
/// and stable debt contracts use on chain, so every debt-accrual path must
/// call this and not [`ray_pow`], or off-chain figures drift from what the
/// chain enforces.
pub fn binomial_approximated_ray_pow(a: U256, n: u64) -> Result<U256, MathError> {
    if n == 0 {
        return Ok(RAY);
    }
    let exp = U256::from(n);
    let exp_minus_one = U256::from(n - 1);
    let exp_minus_two = U256::from(n.saturating_sub(2));

    let base_power_two = ray_mul(a, a)?;
    let base_power_three = ray_mul(base_power_two, a)?;

    let first_term = exp.checked_mul(a).ok_or(MathError::Overflow)?;
    let second_term = narrow(widen(exp) * widen(exp_minus_one) * widen(base_power_two))?
        / U256::from(2u64);
    let third_term = narrow(
        widen(exp) * widen(exp_minus_one) * widen(exp_minus_two) * widen(base_power_three),
    )? / U256::from(6u64);

    RAY.checked_add(first_term)
        .and_then(|v| v.checked_add(second_term))
        .and_then(|v| v.checked_add(third_term))
        .ok_or(MathError::Overflow)
}

// ---------------------------------------------------------------------------
// Parsing and display-space conversion
// ---------------------------------------------------------------------------

/// Parse a base-10 unsigned integer string into a `U256`.
///
/// Negative or otherwise malformed input fails fast with
/// [`MathError::InvalidOperand`]; the ray/wad operations never see a signed
/// quantity.
pub fn parse_units(s: &str) -> Result<U256, MathError> {
    if s.is_empty() {
        return Err(MathError::invalid("empty numeric string"));
    }
    if s.starts_with('-') {
        return Err(MathError::invalid(format!("negative value: {s}")));
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MathError::invalid(format!("not a base-10 integer: {s}")));
    }
    U256::from_str_radix(s, 10).map_err(|_| MathError::Overflow)
}

/// `10^n` as a `U256`.
pub fn pow10(n: u32) -> Result<U256, MathError> {
    U256::from(10u64)
        .checked_pow(U256::from(n))
        .ok_or(MathError::Overflow)
}

/// Exact decimal-string rendering of `a / 10^decimals`.
///
/// Pure string manipulation, so it works for any 256-bit magnitude. Trailing
/// fractional zeros are trimmed.
pub fn format_units(a: U256, decimals: u32) -> String {
    let digits = a.to_string();
    if decimals == 0 {
        return digits;
    }
    let decimals = decimals as usize;
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    }
}

/// Shift a raw integer down by `10^decimals` into display space.
///
/// Returns [`MathError::Overflow`] when the value does not fit a `Decimal`
/// rather than silently truncating the integer part.
pub fn normalize(a: U256, decimals: u32) -> Result<Decimal, MathError> {
    Decimal::from_str(&format_units(a, decimals)).map_err(|_| MathError::Overflow)
}

// ---------------------------------------------------------------------------
// Serde adapter: U256 as base-10 decimal strings
// ---------------------------------------------------------------------------

/// Field adapter for SDK inputs, used as
/// `#[serde(with = "crate::types::wad_ray::serde_u256")]`. Values travel as
/// base-10 decimal strings, never as floats or hex.
pub mod serde_u256 {
    use super::{parse_units, U256};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_units(&s).map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// WAD (1e18) newtype
// ---------------------------------------------------------------------------

/// WAD-scaled value (18 decimals). Used for health factors and wei amounts.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Wad(pub U256);

impl Wad {
    pub const ONE: Wad = Wad(WAD);
    pub const ZERO: Wad = Wad(U256::ZERO);

    /// Create from a `U256` that is already WAD-scaled.
    pub fn from_raw(val: U256) -> Self {
        Self(val)
    }

    /// Inner `U256`.
    pub fn raw(self) -> U256 {
        self.0
    }

    /// Lift into ray scale.
    pub fn to_ray(self) -> Result<Ray, MathError> {
        wad_to_ray(self.0).map(Ray)
    }

    /// Off-chain `Decimal` view.
    pub fn to_decimal(self) -> Result<Decimal, MathError> {
        normalize(self.0, WEI_DECIMALS)
    }
}

impl fmt::Debug for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wad({})", format_units(self.0, WEI_DECIMALS))
    }
}

impl fmt::Display for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_units(self.0, WEI_DECIMALS))
    }
}

impl From<U256> for Wad {
    fn from(val: U256) -> Self {
        Self(val)
    }
}

// ---------------------------------------------------------------------------
// RAY (1e27) newtype
// ---------------------------------------------------------------------------

/// RAY-scaled value (27 decimals). Used for interest rates and indices.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ray(pub U256);

impl Ray {
    pub const ONE: Ray = Ray(RAY);
    pub const ZERO: Ray = Ray(U256::ZERO);

    /// Create from a `U256` that is already RAY-scaled.
    pub fn from_raw(val: U256) -> Self {
        Self(val)
    }

    /// Inner `U256`.
    pub fn raw(self) -> U256 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn ray_mul(self, rhs: Ray) -> Result<Ray, MathError> {
        ray_mul(self.0, rhs.0).map(Ray)
    }

    pub fn ray_div(self, rhs: Ray) -> Result<Ray, MathError> {
        ray_div(self.0, rhs.0).map(Ray)
    }

    pub fn ray_pow(self, n: u64) -> Result<Ray, MathError> {
        ray_pow(self.0, n).map(Ray)
    }

    /// Drop to wad scale, rounding half-up.
    pub fn to_wad(self) -> Wad {
        Wad(ray_to_wad(self.0))
    }

    /// Off-chain `Decimal` view.
    pub fn to_decimal(self) -> Result<Decimal, MathError> {
        normalize(self.0, RAY_DECIMALS)
    }
}

impl fmt::Debug for Ray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ray({})", format_units(self.0, RAY_DECIMALS))
    }
}

impl fmt::Display for Ray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_units(self.0, RAY_DECIMALS))
    }
}

impl From<U256> for Ray {
    fn from(val: U256) -> Self {
        Self(val)
    }
}

impl FromStr for Ray {
    type Err = MathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_units(s).map(Ray)
    }
}

impl Serialize for Ray {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Ray {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
