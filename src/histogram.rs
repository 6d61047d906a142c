//! Histogram binning.
//!
//! Heuristic selection of "nice" bin widths and counts from a data
//! range, the bin-counting routine the charts are drawn from, and
//! repair of sawtooth artifacts caused by banded source data.
//!
//! # Examples
//!
//! ```
//! use veristat::histogram::choose_bins;
//!
//! let spec = choose_bins(0.0, 100.0, 50);
//! assert_eq!(spec.n_bins, 20);
//! assert_eq!(spec.bin_width, 5.0);
//! ```

use serde::Serialize;

use crate::descriptive::{ensure_finite, min_max};
use crate::error::StatsError;

/// Bin layout for a histogram, derived from a data range alone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BinSpec {
    pub n_bins: usize,
    pub lower_limit: f64,
    pub upper_limit: f64,
    pub bin_width: f64,
}

/// Picks a human-friendly bin layout for the range [`min_val`,
/// `max_val`].
///
/// # Algorithm
///
/// Targets 20 bins. The raw width is normalised into (1, 10], rounded
/// up to 5 or 10, and denormalised; if that leaves fewer bins than the
/// minimum (10, or `n_distinct` down to a floor of 4 when few distinct
/// values exist), the normalised width is halved and retried with 2
/// also allowed. The lower limit is then aligned down to a multiple of
/// the bin width and the upper limit extended to cover the data —
/// unless the original limits fit exactly, in which case they are kept
/// as meaningful.
pub fn choose_bins(min_val: f64, max_val: f64, n_distinct: usize) -> BinSpec {
    let (min_val, max_val) = if min_val > max_val {
        (max_val, min_val)
    } else {
        (min_val, max_val)
    };
    let mut data_range = max_val - min_val;
    if data_range == 0.0 {
        data_range = 1.0;
    }
    const TARGET_N_BINS: f64 = 20.0;
    let min_n_bins = if n_distinct >= 10 {
        10
    } else if n_distinct <= 4 {
        4
    } else {
        n_distinct
    };
    let init_bin_width = data_range / TARGET_N_BINS;
    let mut norm_bin_width = init_bin_width;
    while norm_bin_width <= 1.0 {
        norm_bin_width *= 10.0;
    }
    while norm_bin_width > 10.0 {
        norm_bin_width /= 10.0;
    }
    let denorm_ratio = init_bin_width / norm_bin_width;
    let better_norm = if norm_bin_width <= 5.0 { 5.0 } else { 10.0 };
    let mut bin_width = better_norm * denorm_ratio;
    let mut n_bins = (data_range / bin_width).ceil() as usize;
    if n_bins < min_n_bins {
        // halve and retry, this time with 2 as an allowed multiplier
        norm_bin_width /= 2.0;
        let better_norm = if norm_bin_width <= 2.0 {
            2.0
        } else if norm_bin_width <= 5.0 {
            5.0
        } else {
            10.0
        };
        bin_width = better_norm * denorm_ratio;
        n_bins = (data_range / bin_width).ceil() as usize;
    }
    let mut lower_limit = min_val;
    let mut upper_limit = max_val;
    if bin_width * n_bins as f64 != data_range {
        let existing_multiple = lower_limit / bin_width;
        lower_limit = existing_multiple.floor() * bin_width;
        upper_limit = lower_limit + n_bins as f64 * bin_width;
    }
    if max_val > upper_limit {
        upper_limit += bin_width;
        n_bins += 1;
    }
    BinSpec {
        n_bins,
        lower_limit,
        upper_limit,
        bin_width,
    }
}

/// A counted histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// Count per bin, lowest bin first.
    pub bins: Vec<usize>,
    /// Lower real limit of the first bin.
    pub lower_real_limit: f64,
    pub bin_width: f64,
    /// Values falling outside the binned range.
    pub extra_points: usize,
}

/// Bins `values` into `n_bins` equal-width buckets.
///
/// With `limits` given, bins span exactly that range; otherwise limits
/// are derived so every value is covered (lower limit half a bin below
/// the minimum). With `top_inclusive`, a value equal to the exact
/// upper limit lands in the topmost bin — a deliberate deviation from
/// half-open binning so that "nice" bin labels like "10 to <20" stay
/// consistent with the counts the chart shows.
///
/// Always: `sum(bins) + extra_points == values.len()`.
pub fn histogram(
    values: &[f64],
    n_bins: usize,
    limits: Option<(f64, f64)>,
    top_inclusive: bool,
) -> Result<Histogram, StatsError> {
    ensure_finite(values)?;
    if n_bins == 0 {
        return Err(StatsError::Domain {
            what: "bin count",
            value: 0.0,
        });
    }
    let (lower, upper, width) = match limits {
        Some((lo, hi)) => (lo, hi, (hi - lo) / n_bins as f64),
        None => {
            let (min, max) = min_max(values)?;
            let est_width = (max - min) / n_bins as f64 + 1e-6;
            let width = (max - min + est_width) / n_bins as f64;
            (min - width / 2.0, 1.000001 * max, width)
        }
    };
    if width <= 0.0 {
        return Err(StatsError::Domain {
            what: "bin width",
            value: width,
        });
    }
    let mut bins = vec![0usize; n_bins];
    let mut extra_points = 0;
    for &v in values {
        if v < lower {
            extra_points += 1;
        } else if top_inclusive && v == upper {
            bins[n_bins - 1] += 1;
        } else {
            let idx = ((v - lower) / width) as usize;
            if idx < n_bins {
                bins[idx] += 1;
            } else {
                extra_points += 1;
            }
        }
    }
    Ok(Histogram {
        bins,
        lower_real_limit: lower,
        bin_width: width,
        extra_points,
    })
}

/// Whether every bin outside the arithmetic progression
/// `start_idx, start_idx + period, …` is empty — the sawtooth pattern
/// left by banded source data (e.g. everything recorded to the
/// nearest 5).
pub fn saw_toothing(bins: &[usize], period: usize, start_idx: usize) -> bool {
    if period == 0 {
        return false;
    }
    let total: usize = bins.iter().sum();
    let period_sum: usize = bins.iter().skip(start_idx).step_by(period).sum();
    total - period_sum == 0
}

/// Shrinks the bin count until periodic empty bins (period 5 or 2)
/// disappear or only 5 bins remain, re-binning `values` each step.
pub fn fix_sawtoothing(values: &[f64], hist: Histogram) -> Result<Histogram, StatsError> {
    let mut hist = hist;
    while hist.bins.len() > 5 {
        let shrink_factor = if saw_toothing(&hist.bins, 5, 0) {
            5.0
        } else if saw_toothing(&hist.bins, 2, 0) {
            2.0
        } else if saw_toothing(&hist.bins, 2, 1) {
            2.0
        } else {
            break;
        };
        let n_bins = (hist.bins.len() as f64 / shrink_factor).ceil() as usize;
        tracing::debug!(n_bins, "shrinking histogram to remove sawtoothing");
        hist = histogram(values, n_bins, None, true)?;
    }
    Ok(hist)
}

/// Score at the given percentile (0–1, or 0–100) of the distribution,
/// interpolated within the crossing bin of a 10-bin histogram. Uses
/// half-open binning (the classic form), unlike the chart histograms.
pub fn percentile_score(values: &[f64], percent: f64) -> Result<f64, StatsError> {
    let percent = if percent > 1.0 { percent / 100.0 } else { percent };
    if percent <= 0.0 || percent > 1.0 {
        return Err(StatsError::Domain {
            what: "percentile",
            value: percent,
        });
    }
    let hist = histogram(values, 10, None, false)?;
    let target_cf = percent * values.len() as f64;
    let mut cum = 0.0;
    for (i, &count) in hist.bins.iter().enumerate() {
        let prev_cum = cum;
        cum += count as f64;
        if cum >= target_cf {
            let within = (target_cf - prev_cum) / count as f64;
            return Ok(hist.lower_real_limit + hist.bin_width * (i as f64 + within));
        }
    }
    // extra_points is zero under derived limits, so the crossing always
    // exists; keep a defined answer regardless
    Ok(hist.lower_real_limit + hist.bin_width * hist.bins.len() as f64)
}
