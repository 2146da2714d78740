use alloy::primitives::{uint, U256};

// ---------------------------------------------------------------------------
// Fixed-point scales
// ---------------------------------------------------------------------------

/// RAY: 1e27. Scale for interest rates and indices.
pub const RAY: U256 = uint!(1_000_000_000_000_000_000_000_000_000_U256);

/// Half a RAY, added before dividing to round half-up like `WadRayMath.rayMul`.
pub const HALF_RAY: U256 = uint!(500_000_000_000_000_000_000_000_000_U256);

/// WAD: 1e18. Standard EVM fixed-point scale for amounts and health factors.
pub const WAD: U256 = uint!(1_000_000_000_000_000_000_U256);

/// Half a WAD.
pub const HALF_WAD: U256 = uint!(500_000_000_000_000_000_U256);

/// Ratio between the two scales: RAY / WAD = 1e9.
pub const WAD_RAY_RATIO: U256 = uint!(1_000_000_000_U256);

// ---------------------------------------------------------------------------
// Protocol constants
// ---------------------------------------------------------------------------

/// Seconds in a non-leap year. Baked into the on-chain rate contracts.
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Chainlink price feed scale / Aave base currency unit (1e8).
pub const USD_DECIMALS: u32 = 8;

/// Decimals of the native wei unit.
pub const WEI_DECIMALS: u32 = 18;

/// Decimals of the ray unit.
pub const RAY_DECIMALS: u32 = 27;

/// LTV and liquidation threshold are stored as basis points (4 decimals).
pub const LTV_PRECISION: u32 = 4;

/// Isolation-mode debt ceilings are stored in USD with 2 decimals.
pub const DEBT_CEILING_DECIMALS: u32 = 2;
