//! Correlation analysis.
//!
//! Pearson product-moment and Spearman rank-order correlation
//! coefficients with two-tailed p-values, plus the Spearman worked
//! example used for pedagogical display.
//!
//! # Examples
//!
//! ```
//! use veristat::correlation::pearson;
//!
//! let x = [1.0, 2.0, 3.0, 4.0];
//! let y = [2.0, 4.0, 6.0, 8.0];
//! let r = pearson(&x, &y).unwrap();
//! assert!((r.r - 1.0).abs() < 1e-12);
//! assert_eq!(r.df, 2);
//! ```

use serde::Serialize;

use crate::descriptive::ensure_finite;
use crate::error::StatsError;
use crate::ranking::rank;
use crate::special::t_two_tail;

/// Guards the t transform's denominator when |r| reaches 1 exactly, so
/// a perfect correlation yields a vanishing p rather than a division
/// by zero.
const TINY: f64 = 1.0e-30;

/// Result of a correlation test.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CorrelationResult {
    /// Correlation coefficient, in [−1, 1].
    pub r: f64,
    /// Two-tailed p-value.
    pub p: f64,
    /// n − 2.
    pub df: usize,
}

/// Pearson product-moment correlation (Heiman, Basic Statistics for
/// the Behavioral Sciences, p.195).
///
/// # Algorithm
///
/// r = (n·Σxy − Σx·Σy) / √((n·Σx² − (Σx)²)(n·Σy² − (Σy)²)), then
/// t = r·√(df/((1−r)(1+r))) against the t distribution with df = n−2.
///
/// # Returns
///
/// `MismatchedLength` for unpaired inputs; `InadequateVariability`
/// when either dimension has zero spread.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<CorrelationResult, StatsError> {
    if x.len() != y.len() {
        return Err(StatsError::MismatchedLength {
            len_a: x.len(),
            len_b: y.len(),
        });
    }
    ensure_finite(x)?;
    ensure_finite(y)?;
    let n = x.len();
    if n < 3 {
        return Err(StatsError::InsufficientData { needed: 3, got: n });
    }
    let nf = n as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(&a, &b)| a * b).sum();
    let sum_x_sq: f64 = x.iter().map(|&a| a * a).sum();
    let sum_y_sq: f64 = y.iter().map(|&b| b * b).sum();
    let r_num = nf * sum_xy - sum_x * sum_y;
    let r_den = ((nf * sum_x_sq - sum_x * sum_x) * (nf * sum_y_sq - sum_y * sum_y)).sqrt();
    if r_den == 0.0 {
        return Err(StatsError::InadequateVariability);
    }
    let r = r_num / r_den;
    let df = n - 2;
    let t = r * (df as f64 / ((1.0 - r + TINY) * (1.0 + r + TINY))).sqrt();
    let p = t_two_tail(t, df as f64)?;
    Ok(CorrelationResult { r, p, df })
}

/// Spearman rank-order correlation (Heiman, Basic Statistics for the
/// Behavioral Sciences, p.192).
///
/// # Algorithm
///
/// Both dimensions are rank-transformed (average ranks for ties), then
/// ρ = 1 − 6ΣD²/(n³−n) over the per-pair rank differences D. The
/// p-value uses the t transform of ρ with df = n−2 (Numerical Recipes
/// p.510 — close to exact tables, not identical).
///
/// # Returns
///
/// `MismatchedLength` for unpaired inputs.
pub fn spearman(x: &[f64], y: &[f64]) -> Result<CorrelationResult, StatsError> {
    if x.len() != y.len() {
        return Err(StatsError::MismatchedLength {
            len_a: x.len(),
            len_b: y.len(),
        });
    }
    ensure_finite(x)?;
    ensure_finite(y)?;
    let n = x.len();
    if n < 3 {
        return Err(StatsError::InsufficientData { needed: 3, got: n });
    }
    let nf = n as f64;
    let rank_x = rank(x);
    let rank_y = rank(y);
    let d_sq: f64 = rank_x
        .iter()
        .zip(&rank_y)
        .map(|(&rx, &ry)| (rx - ry) * (rx - ry))
        .sum();
    let rho = 1.0 - 6.0 * d_sq / (nf * (nf * nf - 1.0));
    let df = n - 2;
    let t = rho * (df as f64 / ((rho + 1.0 + TINY) * (1.0 - rho + TINY))).sqrt();
    let p = t_two_tail(t, df as f64)?;
    Ok(CorrelationResult { r: rho, p, df })
}

/// One pair in a Spearman worked example.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SpearmanRow {
    pub x: f64,
    pub y: f64,
    pub rank_x: f64,
    pub rank_y: f64,
    /// rank_x − rank_y.
    pub diff: f64,
    pub diff_squared: f64,
}

/// Step-by-step working for a Spearman correlation.
#[derive(Debug, Clone, Serialize)]
pub struct SpearmanDetails {
    /// Per-pair rows in input order.
    pub rows: Vec<SpearmanRow>,
    pub n: usize,
    pub n_cubed_minus_n: f64,
    pub total_d_squared: f64,
    /// 6ΣD²/(n³−n), the subtracted term.
    pub pre_rho: f64,
    pub rho: f64,
}

/// Worked example for [`spearman`]. Produces the same ρ as the test
/// proper; emitting it never changes the core result.
pub fn spearman_details(x: &[f64], y: &[f64]) -> Result<SpearmanDetails, StatsError> {
    if x.len() != y.len() {
        return Err(StatsError::MismatchedLength {
            len_a: x.len(),
            len_b: y.len(),
        });
    }
    ensure_finite(x)?;
    ensure_finite(y)?;
    let n = x.len();
    if n < 3 {
        return Err(StatsError::InsufficientData { needed: 3, got: n });
    }
    let rank_x = rank(x);
    let rank_y = rank(y);
    let mut rows = Vec::with_capacity(n);
    let mut total_d_squared = 0.0;
    for i in 0..n {
        let diff = rank_x[i] - rank_y[i];
        let diff_squared = diff * diff;
        total_d_squared += diff_squared;
        rows.push(SpearmanRow {
            x: x[i],
            y: y[i],
            rank_x: rank_x[i],
            rank_y: rank_y[i],
            diff,
            diff_squared,
        });
    }
    let nf = n as f64;
    let n_cubed_minus_n = nf * nf * nf - nf;
    let pre_rho = total_d_squared * 6.0 / n_cubed_minus_n;
    Ok(SpearmanDetails {
        rows,
        n,
        n_cubed_minus_n,
        total_d_squared,
        pre_rho,
        rho: 1.0 - pre_rho,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Pearson
    // -----------------------------------------------------------------------

    #[test]
    fn pearson_perfect_linear() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        let r = pearson(&x, &y).expect("pearson");
        assert!((r.r - 1.0).abs() < 1e-12, "r = {}", r.r);
        assert_eq!(r.df, 2);
        assert!(r.p < 1e-10, "p = {}", r.p);
    }

    #[test]
    fn pearson_strong_negative() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [12.0, 10.0, 8.5, 6.0, 4.5, 2.0];
        let r = pearson(&x, &y).expect("pearson");
        assert!(r.r < -0.99, "r = {}", r.r);
        assert!(r.p < 0.001, "p = {}", r.p);
    }

    #[test]
    fn pearson_uncorrelated() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let y = [5.0, 2.0, 8.0, 1.0, 7.0, 3.0, 6.0, 4.0];
        let r = pearson(&x, &y).expect("pearson");
        assert!(r.r.abs() < 0.5, "r = {}", r.r);
        assert!(r.p > 0.1, "p = {}", r.p);
    }

    #[test]
    fn pearson_r_stays_in_range() {
        let cases: [(&[f64], &[f64]); 3] = [
            (&[1.0, 2.0, 3.0, 4.0], &[1.1, 1.9, 3.2, 3.8]),
            (&[0.0, 1.0, 0.0, 1.0, 0.5], &[1.0, 0.0, 1.0, 0.0, 0.5]),
            (&[3.0, 1.0, 4.0, 1.0, 5.0], &[2.0, 7.0, 1.0, 8.0, 2.0]),
        ];
        for (x, y) in cases {
            let r = pearson(x, y).expect("pearson");
            assert!((-1.0..=1.0).contains(&r.r), "r = {}", r.r);
        }
    }

    #[test]
    fn pearson_zero_spread_rejected() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [5.0, 5.0, 5.0, 5.0];
        assert!(matches!(
            pearson(&x, &y),
            Err(StatsError::InadequateVariability)
        ));
    }

    #[test]
    fn pearson_unpaired_rejected() {
        assert!(matches!(
            pearson(&[1.0, 2.0, 3.0], &[1.0, 2.0]),
            Err(StatsError::MismatchedLength { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Spearman
    // -----------------------------------------------------------------------

    #[test]
    fn spearman_perfect_monotone_nonlinear() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [1.0, 4.0, 9.0, 16.0, 25.0];
        let r = spearman(&x, &y).expect("spearman");
        assert_eq!(r.r, 1.0);
        assert!(r.p < 1e-6, "p = {}", r.p);
    }

    #[test]
    fn spearman_perfect_inverse() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [10.0, 8.0, 6.0, 4.0, 2.0];
        let r = spearman(&x, &y).expect("spearman");
        assert_eq!(r.r, -1.0);
    }

    #[test]
    fn spearman_handles_ties_via_average_ranks() {
        let x = [1.0, 2.0, 2.0, 4.0, 5.0];
        let y = [2.0, 3.0, 3.0, 6.0, 9.0];
        let r = spearman(&x, &y).expect("spearman");
        assert!((r.r - 1.0).abs() < 1e-12, "r = {}", r.r);
    }

    // -----------------------------------------------------------------------
    // Spearman worked example
    // -----------------------------------------------------------------------

    #[test]
    fn spearman_details_match_test_statistic() {
        let x = [2.0, 5.0, 3.0, 8.0, 7.0, 1.0];
        let y = [4.0, 9.0, 5.0, 14.0, 10.0, 2.0];
        let r = spearman(&x, &y).expect("spearman");
        let d = spearman_details(&x, &y).expect("details");
        assert!((d.rho - r.r).abs() < 1e-12);
        assert_eq!(d.n, 6);
        assert_eq!(d.n_cubed_minus_n, 210.0);
        let sum_from_rows: f64 = d.rows.iter().map(|row| row.diff_squared).sum();
        assert_eq!(sum_from_rows, d.total_d_squared);
    }
}
