//! Arithmetic regimes.
//!
//! Every top-level computation runs in one of two modes: [`Standard`]
//! (native `f64`) or [`High`] (arbitrary-precision decimal with a fixed
//! working precision). The engine's internals are generic over
//! [`Scalar`], so one mode is chosen when a computation starts and the
//! type system rules out mixing representations mid-expression.
//!
//! Results cross back to callers as [`Num`], a tagged value whose
//! arithmetic is *checked*: combining a `Std` with a `High` operand is
//! [`StatsError::MixedPrecision`], never a silent coercion.
//!
//! [`Standard`]: PrecisionMode::Standard
//! [`High`]: PrecisionMode::High

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive, Zero};
use serde::Serialize;

use crate::error::StatsError;

/// Significant digits kept by high-precision division and square root
/// (addition, subtraction and multiplication are exact in decimal).
pub const WORKING_PRECISION: u64 = 60;

/// Which arithmetic representation a computation runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrecisionMode {
    /// Native double-precision floating point.
    Standard,
    /// Arbitrary-precision decimal at [`WORKING_PRECISION`] digits.
    /// Much slower; used where `f64` loses required accuracy (e.g. the
    /// harder NIST ANOVA reference datasets).
    High,
}

// ---------------------------------------------------------------------------
// Scalar: the compile-time face of a precision mode
// ---------------------------------------------------------------------------

/// One arithmetic representation. Implemented by `f64` (standard) and
/// [`HighPrec`] (decimal). Generic kernels take a single `S: Scalar`,
/// so an expression can never combine values from different modes.
pub trait Scalar:
    Sized
    + Clone
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + fmt::Debug
    + fmt::Display
{
    /// The mode this representation belongs to.
    const MODE: PrecisionMode;

    /// Converts a float entering the computation. Inputs are validated
    /// finite at the public boundary before conversion.
    fn from_f64(v: f64) -> Self;

    /// Converts a count (n, df).
    fn from_usize(n: usize) -> Self;

    /// Converts back out, possibly losing precision.
    fn to_f64(&self) -> f64;

    fn abs(&self) -> Self;

    /// Square root; `Domain` error for negative arguments.
    fn sqrt(&self) -> Result<Self, StatsError>;

    /// Natural log. In high-precision mode this evaluates through `f64`
    /// and converts back: only the additive/multiplicative accumulation
    /// is carried at full precision, matching the reference behaviour
    /// of the algorithms in [`crate::special`].
    fn ln(&self) -> Self;

    /// Exponential; same `f64` evaluation caveat as [`Scalar::ln`].
    fn exp(&self) -> Self;

    fn is_zero(&self) -> bool;

    /// Wraps the value for the mode-agnostic result records.
    fn into_num(self) -> Num;
}

impl Scalar for f64 {
    const MODE: PrecisionMode = PrecisionMode::Standard;

    fn from_f64(v: f64) -> Self {
        v
    }

    fn from_usize(n: usize) -> Self {
        n as f64
    }

    fn to_f64(&self) -> f64 {
        *self
    }

    fn abs(&self) -> Self {
        f64::abs(*self)
    }

    fn sqrt(&self) -> Result<Self, StatsError> {
        if *self < 0.0 {
            return Err(StatsError::Domain {
                what: "square root argument",
                value: *self,
            });
        }
        Ok(f64::sqrt(*self))
    }

    fn ln(&self) -> Self {
        f64::ln(*self)
    }

    fn exp(&self) -> Self {
        f64::exp(*self)
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    fn into_num(self) -> Num {
        Num::Std(self)
    }
}

// ---------------------------------------------------------------------------
// HighPrec
// ---------------------------------------------------------------------------

/// Arbitrary-precision decimal scalar. A thin wrapper over
/// [`BigDecimal`] that pins division and square root to
/// [`WORKING_PRECISION`] significant digits.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub struct HighPrec(BigDecimal);

impl HighPrec {
    /// The wrapped decimal value.
    pub fn into_inner(self) -> BigDecimal {
        self.0
    }
}

impl fmt::Display for HighPrec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Add for HighPrec {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        HighPrec(self.0 + rhs.0)
    }
}

impl Sub for HighPrec {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        HighPrec(self.0 - rhs.0)
    }
}

impl Mul for HighPrec {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        HighPrec(self.0 * rhs.0)
    }
}

impl Div for HighPrec {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        HighPrec((self.0 / rhs.0).with_prec(WORKING_PRECISION))
    }
}

impl Neg for HighPrec {
    type Output = Self;
    fn neg(self) -> Self {
        HighPrec(-self.0)
    }
}

impl Scalar for HighPrec {
    const MODE: PrecisionMode = PrecisionMode::High;

    fn from_f64(v: f64) -> Self {
        // NaN/infinity cannot reach here: public entry points reject
        // non-finite sample values before any conversion.
        HighPrec(BigDecimal::from_f64(v).unwrap_or_else(BigDecimal::zero))
    }

    fn from_usize(n: usize) -> Self {
        HighPrec(BigDecimal::from(n as u64))
    }

    fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }

    fn abs(&self) -> Self {
        HighPrec(self.0.abs())
    }

    fn sqrt(&self) -> Result<Self, StatsError> {
        match self.0.sqrt() {
            Some(root) => Ok(HighPrec(root.with_prec(WORKING_PRECISION))),
            None => Err(StatsError::Domain {
                what: "square root argument",
                value: self.to_f64(),
            }),
        }
    }

    fn ln(&self) -> Self {
        Self::from_f64(self.to_f64().ln())
    }

    fn exp(&self) -> Self {
        Self::from_f64(self.to_f64().exp())
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    fn into_num(self) -> Num {
        Num::High(self.0)
    }
}

// ---------------------------------------------------------------------------
// Num: the dynamic boundary value
// ---------------------------------------------------------------------------

/// A result value tagged with the mode that produced it.
///
/// Consumers that keep computing with returned values must go through
/// the checked operations here; an operation over mixed modes fails
/// with [`StatsError::MixedPrecision`] naming both operands rather than
/// producing a silently-wrong number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Num {
    /// A standard-precision value.
    Std(f64),
    /// A high-precision decimal value.
    High(BigDecimal),
}

impl Num {
    /// The mode this value was computed in.
    pub fn mode(&self) -> PrecisionMode {
        match self {
            Num::Std(_) => PrecisionMode::Standard,
            Num::High(_) => PrecisionMode::High,
        }
    }

    /// Explicit, lossy conversion out of high precision.
    pub fn to_f64(&self) -> f64 {
        match self {
            Num::Std(v) => *v,
            Num::High(d) => d.to_f64().unwrap_or(f64::NAN),
        }
    }

    pub fn checked_add(&self, rhs: &Num) -> Result<Num, StatsError> {
        match (self, rhs) {
            (Num::Std(a), Num::Std(b)) => Ok(Num::Std(a + b)),
            (Num::High(a), Num::High(b)) => Ok(Num::High(a + b)),
            _ => Err(self.mix_error(rhs)),
        }
    }

    pub fn checked_sub(&self, rhs: &Num) -> Result<Num, StatsError> {
        match (self, rhs) {
            (Num::Std(a), Num::Std(b)) => Ok(Num::Std(a - b)),
            (Num::High(a), Num::High(b)) => Ok(Num::High(a - b)),
            _ => Err(self.mix_error(rhs)),
        }
    }

    pub fn checked_mul(&self, rhs: &Num) -> Result<Num, StatsError> {
        match (self, rhs) {
            (Num::Std(a), Num::Std(b)) => Ok(Num::Std(a * b)),
            (Num::High(a), Num::High(b)) => Ok(Num::High(a * b)),
            _ => Err(self.mix_error(rhs)),
        }
    }

    pub fn checked_div(&self, rhs: &Num) -> Result<Num, StatsError> {
        match (self, rhs) {
            (Num::Std(a), Num::Std(b)) => {
                if *b == 0.0 {
                    return Err(StatsError::Domain {
                        what: "divisor",
                        value: 0.0,
                    });
                }
                Ok(Num::Std(a / b))
            }
            (Num::High(a), Num::High(b)) => {
                if b.is_zero() {
                    return Err(StatsError::Domain {
                        what: "divisor",
                        value: 0.0,
                    });
                }
                Ok(Num::High((a / b).with_prec(WORKING_PRECISION)))
            }
            _ => Err(self.mix_error(rhs)),
        }
    }

    /// Checked comparison; ordering across modes is refused like any
    /// other mixed operation.
    pub fn checked_cmp(&self, rhs: &Num) -> Result<Ordering, StatsError> {
        match (self, rhs) {
            (Num::Std(a), Num::Std(b)) => a.partial_cmp(b).ok_or(StatsError::Domain {
                what: "comparison operand",
                value: f64::NAN,
            }),
            (Num::High(a), Num::High(b)) => Ok(a.cmp(b)),
            _ => Err(self.mix_error(rhs)),
        }
    }

    fn mix_error(&self, rhs: &Num) -> StatsError {
        StatsError::MixedPrecision {
            lhs: self.to_string(),
            rhs: rhs.to_string(),
        }
    }
}

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Num::Std(v) => v.fmt(f),
            Num::High(d) => d.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Scalar round trips
    // -----------------------------------------------------------------------

    #[test]
    fn high_prec_round_trip() {
        let x = HighPrec::from_f64(2.5);
        assert_eq!(x.to_f64(), 2.5);
        assert_eq!(HighPrec::from_usize(14).to_f64(), 14.0);
    }

    #[test]
    fn high_prec_division_is_bounded_precision() {
        let third = HighPrec::from_f64(1.0) / HighPrec::from_f64(3.0);
        let back = third.to_f64();
        assert!((back - 1.0 / 3.0).abs() < 1e-15, "1/3 = {back}");
    }

    #[test]
    fn sqrt_rejects_negative_in_both_modes() {
        assert!(Scalar::sqrt(&-1.0f64).is_err());
        assert!(HighPrec::from_f64(-1.0).sqrt().is_err());
        let two = HighPrec::from_f64(2.0).sqrt().expect("sqrt(2)");
        assert!((two.to_f64() - std::f64::consts::SQRT_2).abs() < 1e-15);
    }

    // -----------------------------------------------------------------------
    // Num checked arithmetic
    // -----------------------------------------------------------------------

    #[test]
    fn num_same_mode_ops() {
        let a = Num::Std(3.0);
        let b = Num::Std(1.5);
        assert_eq!(a.checked_add(&b).expect("add"), Num::Std(4.5));
        assert_eq!(a.checked_div(&b).expect("div"), Num::Std(2.0));

        let ha = HighPrec::from_f64(3.0).into_num();
        let hb = HighPrec::from_f64(1.5).into_num();
        assert_eq!(ha.checked_sub(&hb).expect("sub").to_f64(), 1.5);
    }

    #[test]
    fn num_mixed_ops_rejected() {
        let std = Num::Std(1.0);
        let high = HighPrec::from_f64(1.0).into_num();
        for res in [
            std.checked_add(&high),
            std.checked_sub(&high),
            high.checked_mul(&std),
            high.checked_div(&std),
        ] {
            assert!(
                matches!(res, Err(StatsError::MixedPrecision { .. })),
                "expected mixed-precision rejection, got {res:?}"
            );
        }
        assert!(std.checked_cmp(&high).is_err());
    }

    #[test]
    fn num_division_by_zero_rejected() {
        let res = Num::Std(1.0).checked_div(&Num::Std(0.0));
        assert!(matches!(res, Err(StatsError::Domain { .. })));
        let hz = HighPrec::from_f64(0.0).into_num();
        let res = HighPrec::from_f64(1.0).into_num().checked_div(&hz);
        assert!(matches!(res, Err(StatsError::Domain { .. })));
    }
}
