use thiserror::Error;

/// Typed error hierarchy for the math engine.
///
/// Every failure here is a programming error in the caller (malformed numeric
/// string, division by zero through the low-level primitives, a product that
/// would not fit 256 bits). The known zero-denominator points in the
/// formatters return defined sentinels instead of surfacing these variants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid operand: {reason}")]
    InvalidOperand { reason: String },

    /// A value exceeded 256 bits (the on-chain equivalent reverts) or fell
    /// outside the display decimal range.
    #[error("arithmetic overflow")]
    Overflow,
}

impl MathError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidOperand {
            reason: reason.into(),
        }
    }
}
