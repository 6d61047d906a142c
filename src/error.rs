//! Error taxonomy.
//!
//! Every fallible function in this crate returns exactly one of these
//! kinds. The failures are deterministic functions of the input — there
//! is nothing transient to retry — so each error is raised at the point
//! of detection and carries enough context (sizes, offending values)
//! for a caller to build a specific message.

use thiserror::Error;

/// One typed error per failure kind; no statistical function returns a
/// silent NaN or partial result in place of one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// Fewer observations than the statistic requires (e.g. n < 2 for
    /// variance, n < 3 per group for the O'Brien transform).
    #[error("need at least {needed} values, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// A required denominator (variance, pooled SD, tie-correction
    /// factor) is zero; the statistic is undefined for this data.
    #[error("inadequate variability: a required denominator is zero")]
    InadequateVariability,

    /// Paired sequences of different lengths.
    #[error("unequal sample lengths: {len_a} vs {len_b}")]
    MismatchedLength { len_a: usize, len_b: usize },

    /// A contingency-table dimension below the configured minimum.
    #[error("too few categories in {dim}: {got} (minimum {min})")]
    TooFewCategories {
        dim: &'static str,
        got: usize,
        min: usize,
    },

    /// A contingency-table dimension (or the cell count) above the
    /// configured maximum.
    #[error("too many categories in {dim}: {got} (maximum {max})")]
    TooManyCategories {
        dim: &'static str,
        got: usize,
        max: usize,
    },

    /// An argument outside its mathematical domain, e.g. the `x` of the
    /// incomplete beta function outside [0, 1], or a non-finite sample
    /// value.
    #[error("{what} outside its valid domain: {value}")]
    Domain { what: &'static str, value: f64 },

    /// An arithmetic operation mixed a standard-precision and a
    /// high-precision value. Never coerced silently.
    #[error("cannot mix standard and high-precision operands: {lhs} vs {rhs}")]
    MixedPrecision { lhs: String, rhs: String },

    /// The O'Brien transform failed its internal consistency check (the
    /// transformed group means must reproduce the original variances
    /// within tolerance).
    #[error("transform failed to converge (residual {diff})")]
    TransformConvergence { diff: f64 },
}
