//! Descriptive statistics.
//!
//! Means, variances (sample and population denominators), standard
//! deviations, 95% confidence intervals, medians, quartiles, modes and
//! frequency tables — plus the [`SummaryStats`] rows the hypothesis
//! tests attach to their results.
//!
//! The moment-based functions are generic over [`Scalar`], so the same
//! code runs in standard or high-precision arithmetic.
//!
//! # Examples
//!
//! ```
//! use veristat::descriptive::{mean, stdev};
//!
//! let data = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let m: f64 = mean(&data).unwrap();
//! let s: f64 = stdev(&data).unwrap();
//! assert_eq!(m, 3.0);
//! assert!((s - 1.5811388).abs() < 1e-6);
//! ```

use std::cmp::Ordering;

use serde::Serialize;

use crate::error::StatsError;
use crate::precision::{Num, Scalar};

/// Rejects non-finite observations before they enter any arithmetic.
pub(crate) fn ensure_finite(vals: &[f64]) -> Result<(), StatsError> {
    match vals.iter().find(|v| !v.is_finite()) {
        Some(bad) => Err(StatsError::Domain {
            what: "sample value",
            value: *bad,
        }),
        None => Ok(()),
    }
}

fn sorted_copy(vals: &[f64]) -> Vec<f64> {
    let mut sorted = vals.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

pub(crate) fn min_max(vals: &[f64]) -> Result<(f64, f64), StatsError> {
    ensure_finite(vals)?;
    let first = *vals.first().ok_or(StatsError::InsufficientData {
        needed: 1,
        got: 0,
    })?;
    let (mut lo, mut hi) = (first, first);
    for &v in &vals[1..] {
        if v < lo {
            lo = v;
        }
        if v > hi {
            hi = v;
        }
    }
    Ok((lo, hi))
}

// ---------------------------------------------------------------------------
// Moments
// ---------------------------------------------------------------------------

/// Arithmetic mean, in the arithmetic of `S`.
///
/// # Returns
///
/// `InsufficientData` for an empty sample; `Domain` for non-finite
/// values.
pub fn mean<S: Scalar>(vals: &[f64]) -> Result<S, StatsError> {
    ensure_finite(vals)?;
    if vals.is_empty() {
        return Err(StatsError::InsufficientData { needed: 1, got: 0 });
    }
    let mut total = S::from_f64(0.0);
    for &v in vals {
        total = total + S::from_f64(v);
    }
    Ok(total / S::from_usize(vals.len()))
}

/// Variance with the N−1 denominator (estimating population variance).
///
/// # Returns
///
/// `InsufficientData` for fewer than 2 observations.
pub fn variance<S: Scalar>(vals: &[f64]) -> Result<S, StatsError> {
    ensure_finite(vals)?;
    let n = vals.len();
    if n < 2 {
        return Err(StatsError::InsufficientData { needed: 2, got: n });
    }
    let mn: S = mean(vals)?;
    let mut sum_sq = S::from_f64(0.0);
    for &v in vals {
        let dev = S::from_f64(v) - mn.clone();
        sum_sq = sum_sq + dev.clone() * dev;
    }
    Ok(sum_sq / S::from_usize(n - 1))
}

/// Variance with the N denominator (describing this sample only).
pub fn sample_variance<S: Scalar>(vals: &[f64]) -> Result<S, StatsError> {
    ensure_finite(vals)?;
    let n = vals.len();
    if n < 2 {
        return Err(StatsError::InsufficientData { needed: 2, got: n });
    }
    let mn: S = mean(vals)?;
    let mut sum_sq = S::from_f64(0.0);
    for &v in vals {
        let dev = S::from_f64(v) - mn.clone();
        sum_sq = sum_sq + dev.clone() * dev;
    }
    Ok(sum_sq / S::from_usize(n))
}

/// Standard deviation with the N−1 denominator.
pub fn stdev<S: Scalar>(vals: &[f64]) -> Result<S, StatsError> {
    variance::<S>(vals)?.sqrt()
}

/// Standard deviation with the N denominator.
pub fn sample_stdev<S: Scalar>(vals: &[f64]) -> Result<S, StatsError> {
    sample_variance::<S>(vals)?.sqrt()
}

/// Standard error of the mean: sd / √n.
pub fn standard_error<S: Scalar>(n: usize, sd: S) -> Result<S, StatsError> {
    if n == 0 {
        return Err(StatsError::InsufficientData { needed: 1, got: 0 });
    }
    Ok(sd / S::from_usize(n).sqrt()?)
}

// ---------------------------------------------------------------------------
// 95% confidence interval
// ---------------------------------------------------------------------------

/// 95% confidence interval of the mean, derived from the sample.
pub fn ci95<S: Scalar>(sample: &[f64]) -> Result<(S, S), StatsError> {
    let mn: S = mean(sample)?;
    let sd: S = stdev(sample)?;
    ci95_from_parts(mn, sd, sample.len())
}

/// 95% confidence interval from precomputed mean, sd and n:
/// mean ± 1.96·sd/√n.
///
/// For n < 30 an advisory is traced (not an error): the 1.96
/// population-sd multiplier may be unreliable at that size.
pub fn ci95_from_parts<S: Scalar>(mn: S, sd: S, n: usize) -> Result<(S, S), StatsError> {
    if n == 0 {
        return Err(StatsError::InsufficientData { needed: 1, got: 0 });
    }
    if n < 30 {
        tracing::debug!(
            n,
            "using sample sd in place of population sd with n < 30; interval may be unreliable"
        );
    }
    let se = standard_error(n, sd)?;
    let diff = S::from_f64(1.96) * se;
    Ok((mn.clone() - diff.clone(), mn + diff))
}

// ---------------------------------------------------------------------------
// Order statistics
// ---------------------------------------------------------------------------

/// Median of the sample (sorts a copy; the input is left untouched).
pub fn median(vals: &[f64]) -> Result<f64, StatsError> {
    ensure_finite(vals)?;
    if vals.is_empty() {
        return Err(StatsError::InsufficientData { needed: 1, got: 0 });
    }
    let sorted = sorted_copy(vals);
    let n = sorted.len();
    if n % 2 == 1 {
        Ok(sorted[n / 2])
    } else {
        Ok((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

/// Lower and upper quartiles by the median-of-halves depth rule
/// `(floor(n/2) + 1) / 2`, averaging adjacent order statistics when the
/// depth is not an integer (Wild & Seber).
///
/// Order-independent: sorts a copy.
pub fn quartiles(vals: &[f64]) -> Result<(f64, f64), StatsError> {
    ensure_finite(vals)?;
    let n = vals.len();
    if n < 2 {
        return Err(StatsError::InsufficientData { needed: 2, got: n });
    }
    let sorted = sorted_copy(vals);
    let depth = ((n / 2) as f64 + 1.0) / 2.0;
    let ldepth = depth as usize;
    if depth.fract() == 0.0 {
        Ok((sorted[ldepth - 1], sorted[n - ldepth]))
    } else {
        let udepth = ldepth + 1;
        let lq = (sorted[ldepth - 1] + sorted[udepth - 1]) / 2.0;
        let uq = (sorted[n - ldepth] + sorted[n - udepth]) / 2.0;
        Ok((lq, uq))
    }
}

/// All values tied for the highest frequency, plus that frequency.
/// Modal values come back in ascending order.
pub fn mode(vals: &[f64]) -> Result<(usize, Vec<f64>), StatsError> {
    let freqs = frequency_table(vals)?;
    let max_freq = freqs
        .iter()
        .map(|&(_, count)| count)
        .max()
        .ok_or(StatsError::InsufficientData { needed: 1, got: 0 })?;
    let modes = freqs
        .iter()
        .filter(|&&(_, count)| count == max_freq)
        .map(|&(v, _)| v)
        .collect();
    Ok((max_freq, modes))
}

/// Sorted (value, count) pairs. Useful for line plots of discrete data.
pub fn frequency_table(vals: &[f64]) -> Result<Vec<(f64, usize)>, StatsError> {
    ensure_finite(vals)?;
    let sorted = sorted_copy(vals);
    let mut freqs: Vec<(f64, usize)> = Vec::new();
    for v in sorted {
        match freqs.last_mut() {
            Some((prev, count)) if *prev == v => *count += 1,
            _ => freqs.push((v, 1)),
        }
    }
    Ok(freqs)
}

// ---------------------------------------------------------------------------
// Summary rows
// ---------------------------------------------------------------------------

/// Per-group summary row attached to test results and available on its
/// own for plain group descriptions.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryStats {
    pub label: String,
    pub n: usize,
    /// Mean in the mode the computation ran in; absent on rank-only rows.
    pub mean: Option<Num>,
    /// Standard deviation (N−1); absent on rank-only rows.
    pub sd: Option<Num>,
    pub min: f64,
    pub max: f64,
    pub median: Option<f64>,
    /// Mean rank within the pooled ranking (rank-based tests only).
    pub avg_rank: Option<f64>,
    pub ci95: Option<(Num, Num)>,
}

impl SummaryStats {
    /// Row for a quantitative test (t-tests, ANOVA): mean, sd, CI95,
    /// min, max in the arithmetic of `S`.
    pub fn quantitative<S: Scalar>(label: &str, sample: &[f64]) -> Result<Self, StatsError> {
        let (min, max) = min_max(sample)?;
        let mn: S = mean(sample)?;
        let sd: S = stdev(sample)?;
        let (lower, upper) = ci95_from_parts(mn.clone(), sd.clone(), sample.len())?;
        Ok(SummaryStats {
            label: label.to_owned(),
            n: sample.len(),
            mean: Some(mn.into_num()),
            sd: Some(sd.into_num()),
            min,
            max,
            median: None,
            avg_rank: None,
            ci95: Some((lower.into_num(), upper.into_num())),
        })
    }

    /// Row for a rank-based test: n, median, min, max.
    pub fn ordinal(label: &str, sample: &[f64]) -> Result<Self, StatsError> {
        let (min, max) = min_max(sample)?;
        Ok(SummaryStats {
            label: label.to_owned(),
            n: sample.len(),
            mean: None,
            sd: None,
            min,
            max,
            median: Some(median(sample)?),
            avg_rank: None,
            ci95: None,
        })
    }
}

/// One summary row per sample: label, n, median, min, max — plus mean
/// and sd when `quantitative` is set.
pub fn summaries(
    samples: &[&[f64]],
    labels: &[&str],
    quantitative: bool,
) -> Result<Vec<SummaryStats>, StatsError> {
    if samples.len() != labels.len() {
        return Err(StatsError::MismatchedLength {
            len_a: samples.len(),
            len_b: labels.len(),
        });
    }
    let mut rows = Vec::with_capacity(samples.len());
    for (sample, label) in samples.iter().zip(labels) {
        let mut row = SummaryStats::ordinal(label, sample)?;
        if quantitative {
            row.mean = Some(mean::<f64>(sample)?.into_num());
            row.sd = Some(stdev::<f64>(sample)?.into_num());
        }
        rows.push(row);
    }
    Ok(rows)
}
