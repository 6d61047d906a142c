//! Hypothesis testing.
//!
//! Parametric and non-parametric tests: independent and paired t-tests,
//! one-way ANOVA (standard or high-precision arithmetic), Mann-Whitney
//! U, Wilcoxon signed-rank, Kruskal-Wallis H, Pearson's chi-square test
//! of association, skew/kurtosis normality diagnostics, and the O'Brien
//! homogeneity-of-variance check.
//!
//! Every test is a single-shot pure function from samples (plus labels
//! and options) to a named result record or a typed
//! [`StatsError`] — no partial results, no hidden state between calls.
//!
//! # Examples
//!
//! ```
//! use veristat::testing::t_test_ind;
//!
//! let a = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
//! let b = [1.0, 2.0, 4.0, 5.0, 5.0, 6.0, 7.0, 8.0];
//! let r = t_test_ind(&a, &b, "group a", "group b").unwrap();
//! assert_eq!(r.df, 14);
//! assert!(r.p > 0.05); // means barely differ
//! ```

use serde::Serialize;

use crate::descriptive::{ensure_finite, mean, variance, SummaryStats};
use crate::error::StatsError;
use crate::precision::{HighPrec, Num, PrecisionMode, Scalar};
use crate::ranking::{rank, tie_correction};
use crate::special::{chi_square_tail, f_tail, standard_normal_cdf, t_two_tail};

// ---------------------------------------------------------------------------
// t-tests
// ---------------------------------------------------------------------------

/// Result of an independent-samples t-test.
#[derive(Debug, Clone, Serialize)]
pub struct TTestResult {
    /// t statistic.
    pub t: f64,
    /// Two-tailed p-value.
    pub p: f64,
    /// Pooled degrees of freedom, n_a + n_b − 2.
    pub df: usize,
    pub group_a: SummaryStats,
    pub group_b: SummaryStats,
}

/// Independent-samples t-test on two groups of scores.
///
/// # Algorithm
///
/// Pooled-variance form (Numerical Recipes p.483):
/// t = (x̄_a − x̄_b) / √(s²_pooled (1/n_a + 1/n_b)), df = n_a + n_b − 2,
/// two-tailed p via the incomplete beta function.
///
/// # Returns
///
/// `InsufficientData` if either group has fewer than 2 values;
/// `InadequateVariability` if the pooled denominator is zero.
pub fn t_test_ind(
    sample_a: &[f64],
    sample_b: &[f64],
    label_a: &str,
    label_b: &str,
) -> Result<TTestResult, StatsError> {
    let mean_a: f64 = mean(sample_a)?;
    let mean_b: f64 = mean(sample_b)?;
    let var_a: f64 = variance(sample_a)?;
    let var_b: f64 = variance(sample_b)?;
    let n_a = sample_a.len();
    let n_b = sample_b.len();
    let df = n_a + n_b - 2;
    let pooled_var = ((n_a - 1) as f64 * var_a + (n_b - 1) as f64 * var_b) / df as f64;
    let denom = (pooled_var * (1.0 / n_a as f64 + 1.0 / n_b as f64)).sqrt();
    if denom == 0.0 {
        return Err(StatsError::InadequateVariability);
    }
    let t = (mean_a - mean_b) / denom;
    let p = t_two_tail(t, df as f64)?;
    Ok(TTestResult {
        t,
        p,
        df,
        group_a: SummaryStats::quantitative::<f64>(label_a, sample_a)?,
        group_b: SummaryStats::quantitative::<f64>(label_b, sample_b)?,
    })
}

/// Result of a paired-samples t-test.
#[derive(Debug, Clone, Serialize)]
pub struct PairedTTestResult {
    pub t: f64,
    /// Two-tailed p-value.
    pub p: f64,
    /// n − 1 for n pairs.
    pub df: usize,
    pub group_a: SummaryStats,
    pub group_b: SummaryStats,
    /// Per-pair differences (b − a), in input order. Consumed by
    /// presentation layers plotting the distribution of differences.
    pub diffs: Vec<f64>,
}

/// Paired-samples t-test on two related sets of scores.
///
/// # Algorithm
///
/// Covariance-based standard error of the mean difference
/// (Numerical Recipes p.483): sd = √((s²_a + s²_b − 2·cov)/n),
/// t = (x̄_a − x̄_b)/sd, df = n − 1.
///
/// # Returns
///
/// `MismatchedLength` for unequal-length samples;
/// `InadequateVariability` when the difference variance is zero.
pub fn t_test_paired(
    sample_a: &[f64],
    sample_b: &[f64],
    label_a: &str,
    label_b: &str,
) -> Result<PairedTTestResult, StatsError> {
    if sample_a.len() != sample_b.len() {
        return Err(StatsError::MismatchedLength {
            len_a: sample_a.len(),
            len_b: sample_b.len(),
        });
    }
    let mean_a: f64 = mean(sample_a)?;
    let mean_b: f64 = mean(sample_b)?;
    let var_a: f64 = variance(sample_a)?;
    let var_b: f64 = variance(sample_b)?;
    let n = sample_a.len();
    let mut cov = 0.0;
    let mut diffs = Vec::with_capacity(n);
    for (&a, &b) in sample_a.iter().zip(sample_b) {
        diffs.push(b - a);
        cov += (a - mean_a) * (b - mean_b);
    }
    let df = n - 1;
    cov /= df as f64;
    let sd = ((var_a + var_b - 2.0 * cov) / n as f64).sqrt();
    if sd == 0.0 {
        return Err(StatsError::InadequateVariability);
    }
    let t = (mean_a - mean_b) / sd;
    let p = t_two_tail(t, df as f64)?;
    Ok(PairedTTestResult {
        t,
        p,
        df,
        group_a: SummaryStats::quantitative::<f64>(label_a, sample_a)?,
        group_b: SummaryStats::quantitative::<f64>(label_b, sample_b)?,
        diffs,
    })
}

// ---------------------------------------------------------------------------
// One-way ANOVA
// ---------------------------------------------------------------------------

/// Result of a one-way ANOVA. Numeric fields carry the arithmetic mode
/// the test ran in.
#[derive(Debug, Clone, Serialize)]
pub struct AnovaResult {
    /// F statistic, MS_between / MS_within.
    pub f: Num,
    /// One-tailed p-value from the F distribution.
    pub p: Num,
    pub ss_between: Num,
    pub df_between: usize,
    pub ms_between: Num,
    pub ss_within: Num,
    pub df_within: usize,
    pub ms_within: Num,
    /// One summary row per group, in input order.
    pub groups: Vec<SummaryStats>,
}

/// One-way analysis of variance across two or more groups.
///
/// # Algorithm
///
/// NIST-style sum-of-squares decomposition: SS_total = SS_between +
/// SS_within, F = MS_between / MS_within, p from the F upper tail.
///
/// In [`PrecisionMode::High`] every value is multiplied by 10 before
/// summation and the sums of squares deflated by 100 afterwards; with
/// decimal accumulation this recovers the digits double precision
/// loses on the harder NIST reference datasets.
///
/// # Returns
///
/// `InadequateVariability` when MS_within is zero; `MismatchedLength`
/// when labels don't pair with samples.
pub fn anova(
    samples: &[&[f64]],
    labels: &[&str],
    mode: PrecisionMode,
) -> Result<AnovaResult, StatsError> {
    match mode {
        PrecisionMode::Standard => anova_in::<f64>(samples, labels),
        PrecisionMode::High => anova_in::<HighPrec>(samples, labels),
    }
}

fn anova_in<S: Scalar>(samples: &[&[f64]], labels: &[&str]) -> Result<AnovaResult, StatsError> {
    if samples.len() != labels.len() {
        return Err(StatsError::MismatchedLength {
            len_a: samples.len(),
            len_b: labels.len(),
        });
    }
    let k = samples.len();
    if k < 2 {
        return Err(StatsError::InsufficientData { needed: 2, got: k });
    }
    let mut groups = Vec::with_capacity(k);
    for (sample, label) in samples.iter().zip(labels) {
        groups.push(SummaryStats::quantitative::<S>(label, sample)?);
    }

    // High mode inflates by 10 so one decimal place becomes integral,
    // cutting representation error out of the accumulated sums; the
    // sums of squares are deflated by 100 below.
    let inflated = S::MODE == PrecisionMode::High;
    let work: Vec<Vec<f64>> = if inflated {
        samples
            .iter()
            .map(|s| s.iter().map(|&x| x * 10.0).collect())
            .collect()
    } else {
        samples.iter().map(|s| s.to_vec()).collect()
    };
    let group_means: Vec<S> = work
        .iter()
        .map(|s| mean::<S>(s))
        .collect::<Result<_, _>>()?;
    let n_total: usize = work.iter().map(|s| s.len()).sum();
    let df_within = n_total - k;
    let df_between = k - 1;

    let deflate = S::from_f64(100.0);
    let mut ss_within = S::from_f64(0.0);
    for (sample, group_mean) in work.iter().zip(&group_means) {
        let mut sum_sq = S::from_f64(0.0);
        for &v in sample {
            let dev = S::from_f64(v) - group_mean.clone();
            sum_sq = sum_sq + dev.clone() * dev;
        }
        ss_within = ss_within + sum_sq;
    }
    if inflated {
        ss_within = ss_within / deflate.clone();
    }

    let mut grand_sum = S::from_f64(0.0);
    for sample in &work {
        for &v in sample {
            grand_sum = grand_sum + S::from_f64(v);
        }
    }
    let grand_mean = grand_sum / S::from_usize(n_total);
    let mut ss_between = S::from_f64(0.0);
    for (sample, group_mean) in work.iter().zip(&group_means) {
        let dev = group_mean.clone() - grand_mean.clone();
        ss_between = ss_between + S::from_usize(sample.len()) * dev.clone() * dev;
    }
    if inflated {
        ss_between = ss_between / deflate;
    }

    let ms_within = ss_within.clone() / S::from_usize(df_within);
    if ms_within.is_zero() {
        return Err(StatsError::InadequateVariability);
    }
    let ms_between = ss_between.clone() / S::from_usize(df_between);
    let f = ms_between.clone() / ms_within.clone();
    let p = f_tail(df_between, df_within, f.clone())?;

    Ok(AnovaResult {
        f: f.into_num(),
        p: p.into_num(),
        ss_between: ss_between.into_num(),
        df_between,
        ms_between: ms_between.into_num(),
        ss_within: ss_within.into_num(),
        df_within,
        ms_within: ms_within.into_num(),
        groups,
    })
}

// ---------------------------------------------------------------------------
// Non-parametric tests
// ---------------------------------------------------------------------------

/// Result of a Mann-Whitney U test.
#[derive(Debug, Clone, Serialize)]
pub struct MannWhitneyResult {
    /// The smaller of U_a and U_b.
    pub u: f64,
    /// One-tailed p-value from the normal approximation.
    pub p: f64,
    /// z-score of the larger U.
    pub z: f64,
    pub group_a: SummaryStats,
    pub group_b: SummaryStats,
}

/// Mann-Whitney U test on two independent samples.
///
/// # Algorithm
///
/// Ranks the pooled samples (average ranks for ties), then
/// U_a = n_a·n_b + n_a(n_a+1)/2 − ΣR_a and U_b = n_a·n_b − U_a. The
/// reported statistic is min(U_a, U_b); the normal approximation uses
/// the tie-corrected standard deviation.
///
/// # Returns
///
/// `InadequateVariability` when every pooled value is identical (the
/// tie-correction factor is zero).
pub fn mann_whitney_u(
    sample_a: &[f64],
    sample_b: &[f64],
    label_a: &str,
    label_b: &str,
) -> Result<MannWhitneyResult, StatsError> {
    ensure_finite(sample_a)?;
    ensure_finite(sample_b)?;
    let n_a = sample_a.len();
    let n_b = sample_b.len();
    if n_a < 2 || n_b < 2 {
        return Err(StatsError::InsufficientData {
            needed: 2,
            got: n_a.min(n_b),
        });
    }
    let pooled: Vec<f64> = sample_a.iter().chain(sample_b).copied().collect();
    let ranked = rank(&pooled);
    let rank_a = &ranked[..n_a];
    let rank_b = &ranked[n_a..];
    let n_af = n_a as f64;
    let n_bf = n_b as f64;
    let u_a = n_af * n_bf + n_af * (n_af + 1.0) / 2.0 - rank_a.iter().sum::<f64>();
    let u_b = n_af * n_bf - u_a;
    let big_u = u_a.max(u_b);
    let small_u = u_a.min(u_b);
    let t = tie_correction(&ranked).sqrt();
    if t == 0.0 {
        return Err(StatsError::InadequateVariability);
    }
    let sd = (t * n_af * n_bf * (n_af + n_bf + 1.0) / 12.0).sqrt();
    let z = ((big_u - n_af * n_bf / 2.0) / sd).abs();
    let p = 1.0 - standard_normal_cdf(z);

    let mut group_a = SummaryStats::ordinal(label_a, sample_a)?;
    group_a.avg_rank = Some(rank_a.iter().sum::<f64>() / n_af);
    let mut group_b = SummaryStats::ordinal(label_b, sample_b)?;
    group_b.avg_rank = Some(rank_b.iter().sum::<f64>() / n_bf);

    Ok(MannWhitneyResult {
        u: small_u,
        p,
        z,
        group_a,
        group_b,
    })
}

/// One pooled observation in a Mann-Whitney worked example.
#[derive(Debug, Clone, Serialize)]
pub struct RankedValue {
    /// 1 or 2 — which (reordered) sample the value came from.
    pub sample: usize,
    pub value: f64,
    pub rank: f64,
    /// 1-based position in the value-sorted pooled list.
    pub counter: usize,
}

/// Step-by-step working for a Mann-Whitney U test, for pedagogical
/// display. Sample 1 is whichever input sample is shorter (less
/// summing by hand); the result is unaffected.
#[derive(Debug, Clone, Serialize)]
pub struct MannWhitneyDetails {
    pub label_1: String,
    pub label_2: String,
    pub n_1: usize,
    pub n_2: usize,
    /// Every pooled value with its rank, sorted by value.
    pub value_details: Vec<RankedValue>,
    /// Ranks belonging to sample 1, in value order.
    pub ranks_1: Vec<f64>,
    pub sum_rank_1: f64,
    pub u_1: f64,
    pub u_2: f64,
    /// min(u_1, u_2) — the reported statistic.
    pub u: f64,
}

/// Worked example for [`mann_whitney_u`]. Produces the same U as the
/// test proper; emitting it never changes the core result.
pub fn mann_whitney_details(
    sample_a: &[f64],
    sample_b: &[f64],
    label_a: &str,
    label_b: &str,
) -> Result<MannWhitneyDetails, StatsError> {
    ensure_finite(sample_a)?;
    ensure_finite(sample_b)?;
    let (sample_1, sample_2, label_1, label_2) = if sample_b.len() < sample_a.len() {
        (sample_b, sample_a, label_b, label_a)
    } else {
        (sample_a, sample_b, label_a, label_b)
    };
    let n_1 = sample_1.len();
    let n_2 = sample_2.len();
    let pooled: Vec<f64> = sample_1.iter().chain(sample_2).copied().collect();
    let ranked = rank(&pooled);
    let mut value_details: Vec<RankedValue> = pooled
        .iter()
        .zip(&ranked)
        .enumerate()
        .map(|(i, (&value, &rank))| RankedValue {
            sample: if i < n_1 { 1 } else { 2 },
            value,
            rank,
            counter: 0,
        })
        .collect();
    value_details
        .sort_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(std::cmp::Ordering::Equal));
    for (counter, det) in value_details.iter_mut().enumerate() {
        det.counter = counter + 1;
    }
    let ranks_1: Vec<f64> = value_details
        .iter()
        .filter(|d| d.sample == 1)
        .map(|d| d.rank)
        .collect();
    let sum_rank_1: f64 = ranks_1.iter().sum();
    let n_1f = n_1 as f64;
    let n_2f = n_2 as f64;
    let u_1 = n_1f * n_2f + n_1f * (n_1f + 1.0) / 2.0 - sum_rank_1;
    let u_2 = n_1f * n_2f - u_1;
    Ok(MannWhitneyDetails {
        label_1: label_1.to_owned(),
        label_2: label_2.to_owned(),
        n_1,
        n_2,
        value_details,
        ranks_1,
        sum_rank_1,
        u_1,
        u_2,
        u: u_1.min(u_2),
    })
}

/// Result of a Wilcoxon signed-rank test.
#[derive(Debug, Clone, Serialize)]
pub struct WilcoxonResult {
    /// T — the smaller of the positive- and negative-rank sums.
    pub t: f64,
    /// Two-tailed p-value from the normal approximation.
    pub p: f64,
    /// z-score of T.
    pub z: f64,
    /// Pairs with a non-zero difference (the n the approximation uses).
    pub n_nonzero: usize,
    pub group_a: SummaryStats,
    pub group_b: SummaryStats,
}

/// Wilcoxon signed-rank test on two related samples.
///
/// # Algorithm
///
/// Per-pair differences with zeros dropped; |d| ranked with average
/// ranks; T = min(sum of positive ranks, sum of negative ranks);
/// z = |T − n(n+1)/4| / √(n(n+1)(2n+1)/24).
///
/// # Returns
///
/// `MismatchedLength` for unequal lengths; `InadequateVariability`
/// when every pair is identical (no non-zero differences).
pub fn wilcoxon_signed_rank(
    sample_a: &[f64],
    sample_b: &[f64],
    label_a: &str,
    label_b: &str,
) -> Result<WilcoxonResult, StatsError> {
    if sample_a.len() != sample_b.len() {
        return Err(StatsError::MismatchedLength {
            len_a: sample_a.len(),
            len_b: sample_b.len(),
        });
    }
    ensure_finite(sample_a)?;
    ensure_finite(sample_b)?;
    let diffs: Vec<f64> = sample_a
        .iter()
        .zip(sample_b)
        .map(|(&a, &b)| a - b)
        .filter(|&d| d != 0.0)
        .collect();
    let count = diffs.len();
    if count == 0 {
        return Err(StatsError::InadequateVariability);
    }
    let abs_diffs: Vec<f64> = diffs.iter().map(|d| d.abs()).collect();
    let abs_ranked = rank(&abs_diffs);
    let mut r_plus = 0.0;
    let mut r_minus = 0.0;
    for (d, r) in diffs.iter().zip(&abs_ranked) {
        if *d < 0.0 {
            r_minus += r;
        } else {
            r_plus += r;
        }
    }
    let wt = r_plus.min(r_minus);
    let count_f = count as f64;
    let mn = count_f * (count_f + 1.0) * 0.25;
    let se = (count_f * (count_f + 1.0) * (2.0 * count_f + 1.0) / 24.0).sqrt();
    let z = (wt - mn).abs() / se;
    let p = 2.0 * (1.0 - standard_normal_cdf(z));
    Ok(WilcoxonResult {
        t: wt,
        p,
        z,
        n_nonzero: count,
        group_a: SummaryStats::ordinal(label_a, sample_a)?,
        group_b: SummaryStats::ordinal(label_b, sample_b)?,
    })
}

/// One pair in a Wilcoxon worked example.
#[derive(Debug, Clone, Serialize)]
pub struct PairDiff {
    pub a: f64,
    pub b: f64,
    pub diff: f64,
}

/// One ranked non-zero difference in a Wilcoxon worked example.
#[derive(Debug, Clone, Serialize)]
pub struct RankedDiff {
    pub diff: f64,
    pub abs_diff: f64,
    pub rank: f64,
    /// 1-based position ordered by |diff| (then signed diff).
    pub counter: usize,
}

/// Step-by-step working for a Wilcoxon signed-rank test.
#[derive(Debug, Clone, Serialize)]
pub struct WilcoxonDetails {
    /// Every pair and its difference, in input order.
    pub pair_diffs: Vec<PairDiff>,
    /// Non-zero differences with their |d| ranks.
    pub ranked_diffs: Vec<RankedDiff>,
    pub plus_ranks: Vec<f64>,
    pub minus_ranks: Vec<f64>,
    pub sum_plus_ranks: f64,
    pub sum_minus_ranks: f64,
    /// min of the two rank sums.
    pub t: f64,
    /// Number of non-zero-difference pairs.
    pub n: usize,
}

/// Worked example for [`wilcoxon_signed_rank`]. Zero differences are
/// listed in `pair_diffs` but excluded from ranking, as in the test
/// proper.
pub fn wilcoxon_details(sample_a: &[f64], sample_b: &[f64]) -> Result<WilcoxonDetails, StatsError> {
    if sample_a.len() != sample_b.len() {
        return Err(StatsError::MismatchedLength {
            len_a: sample_a.len(),
            len_b: sample_b.len(),
        });
    }
    ensure_finite(sample_a)?;
    ensure_finite(sample_b)?;
    let pair_diffs: Vec<PairDiff> = sample_a
        .iter()
        .zip(sample_b)
        .map(|(&a, &b)| PairDiff { a, b, diff: a - b })
        .collect();
    let diffs: Vec<f64> = pair_diffs
        .iter()
        .map(|p| p.diff)
        .filter(|&d| d != 0.0)
        .collect();
    let abs_diffs: Vec<f64> = diffs.iter().map(|d| d.abs()).collect();
    let ranks = rank(&abs_diffs);
    let mut ranked_diffs: Vec<RankedDiff> = diffs
        .iter()
        .zip(&ranks)
        .map(|(&diff, &rank)| RankedDiff {
            diff,
            abs_diff: diff.abs(),
            rank,
            counter: 0,
        })
        .collect();
    ranked_diffs.sort_by(|x, y| {
        (x.abs_diff, x.diff)
            .partial_cmp(&(y.abs_diff, y.diff))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (counter, det) in ranked_diffs.iter_mut().enumerate() {
        det.counter = counter + 1;
    }
    let plus_ranks: Vec<f64> = ranked_diffs
        .iter()
        .filter(|d| d.diff > 0.0)
        .map(|d| d.rank)
        .collect();
    let minus_ranks: Vec<f64> = ranked_diffs
        .iter()
        .filter(|d| d.diff < 0.0)
        .map(|d| d.rank)
        .collect();
    let sum_plus_ranks: f64 = plus_ranks.iter().sum();
    let sum_minus_ranks: f64 = minus_ranks.iter().sum();
    Ok(WilcoxonDetails {
        n: plus_ranks.len() + minus_ranks.len(),
        t: sum_plus_ranks.min(sum_minus_ranks),
        pair_diffs,
        ranked_diffs,
        plus_ranks,
        minus_ranks,
        sum_plus_ranks,
        sum_minus_ranks,
    })
}

/// Result of a Kruskal-Wallis H test.
#[derive(Debug, Clone, Serialize)]
pub struct KruskalWallisResult {
    /// Tie-corrected H statistic.
    pub h: f64,
    /// p-value against chi-square with k − 1 df.
    pub p: f64,
    pub df: usize,
    /// One median-based summary row per group.
    pub groups: Vec<SummaryStats>,
}

/// Kruskal-Wallis H test — the non-parametric one-way ANOVA over ranks.
///
/// # Algorithm
///
/// H = 12/(N(N+1)) · Σ R_i²/n_i − 3(N+1) over the pooled ranking,
/// divided by the tie-correction factor; H ~ χ²(k−1) under H₀.
///
/// # Returns
///
/// `InadequateVariability` when every pooled value is identical.
pub fn kruskal_wallis(
    samples: &[&[f64]],
    labels: &[&str],
) -> Result<KruskalWallisResult, StatsError> {
    if samples.len() != labels.len() {
        return Err(StatsError::MismatchedLength {
            len_a: samples.len(),
            len_b: labels.len(),
        });
    }
    let k = samples.len();
    if k < 2 {
        return Err(StatsError::InsufficientData { needed: 2, got: k });
    }
    let mut groups = Vec::with_capacity(k);
    for (sample, label) in samples.iter().zip(labels) {
        if sample.len() < 2 {
            return Err(StatsError::InsufficientData {
                needed: 2,
                got: sample.len(),
            });
        }
        groups.push(SummaryStats::ordinal(label, sample)?);
    }
    let pooled: Vec<f64> = samples.iter().flat_map(|s| s.iter()).copied().collect();
    let ranked = rank(&pooled);
    let t = tie_correction(&ranked);
    let nf = pooled.len() as f64;
    let mut rank_sq_sum = 0.0;
    let mut offset = 0;
    for sample in samples {
        let n_i = sample.len();
        let rank_sum: f64 = ranked[offset..offset + n_i].iter().sum();
        rank_sq_sum += rank_sum * rank_sum / n_i as f64;
        offset += n_i;
    }
    let mut h = 12.0 / (nf * (nf + 1.0)) * rank_sq_sum - 3.0 * (nf + 1.0);
    if t == 0.0 {
        return Err(StatsError::InadequateVariability);
    }
    h /= t;
    let df = k - 1;
    let p = chi_square_tail(h, df as u64);
    Ok(KruskalWallisResult { h, p, df, groups })
}

// ---------------------------------------------------------------------------
// Pearson's chi-square test of association
// ---------------------------------------------------------------------------

/// Configured bounds on contingency-table dimensions. Injected rather
/// than read from globals; [`ChiSquareLimits::default`] mirrors the
/// desktop application's settings.
#[derive(Debug, Clone, Serialize)]
pub struct ChiSquareLimits {
    pub min_dims: usize,
    pub max_dims: usize,
    pub max_cells: usize,
}

impl Default for ChiSquareLimits {
    fn default() -> Self {
        ChiSquareLimits {
            min_dims: 2,
            max_dims: 30,
            max_cells: 200,
        }
    }
}

/// Result of Pearson's chi-square test of association.
#[derive(Debug, Clone, Serialize)]
pub struct ChiSquareResult {
    pub chi2: f64,
    /// One-tailed p-value.
    pub p: f64,
    /// (rows − 1)(cols − 1).
    pub df: usize,
    /// Observed cell counts, columns-within-rows.
    pub observed: Vec<f64>,
    /// Expected cell counts under independence, same layout.
    pub expected: Vec<f64>,
    /// Smallest expected count — a test-validity diagnostic.
    pub min_expected: f64,
    /// Percentage of cells with expected count below 5 — the classic
    /// validity warning threshold. A diagnostic, not a failure.
    pub pct_cells_lt_5: f64,
    /// Distinct row-variable values, sorted.
    pub row_values: Vec<String>,
    /// Distinct column-variable values, sorted.
    pub col_values: Vec<String>,
}

fn distinct_sorted(values: &[&str]) -> Vec<String> {
    let mut distinct: Vec<String> = Vec::new();
    for v in values {
        if !distinct.iter().any(|d| d == v) {
            distinct.push((*v).to_owned());
        }
    }
    distinct.sort();
    distinct
}

fn check_dims(dim: &'static str, got: usize, limits: &ChiSquareLimits) -> Result<(), StatsError> {
    if got < limits.min_dims {
        return Err(StatsError::TooFewCategories {
            dim,
            got,
            min: limits.min_dims,
        });
    }
    if got > limits.max_dims {
        return Err(StatsError::TooManyCategories {
            dim,
            got,
            max: limits.max_dims,
        });
    }
    Ok(())
}

/// Pearson's chi-square test of association between two categorical
/// fields, supplied as paired per-observation values.
///
/// # Algorithm
///
/// Builds the r×c observed table (columns within rows), expected cell
/// counts as row·col marginal products over the grand total,
/// df = (r−1)(c−1), then the one-way chi-square of observed against
/// expected.
///
/// # Returns
///
/// `TooFewCategories`/`TooManyCategories` when a dimension or the cell
/// count falls outside `limits`; `MismatchedLength` for unpaired
/// inputs. Low expected counts are reported as diagnostics, not
/// failures.
pub fn chi_square(
    values_a: &[&str],
    values_b: &[&str],
    limits: &ChiSquareLimits,
) -> Result<ChiSquareResult, StatsError> {
    if values_a.len() != values_b.len() {
        return Err(StatsError::MismatchedLength {
            len_a: values_a.len(),
            len_b: values_b.len(),
        });
    }
    if values_a.is_empty() {
        return Err(StatsError::InsufficientData { needed: 1, got: 0 });
    }
    let row_values = distinct_sorted(values_a);
    let col_values = distinct_sorted(values_b);
    check_dims("row variable", row_values.len(), limits)?;
    check_dims("column variable", col_values.len(), limits)?;
    let n_rows = row_values.len();
    let n_cols = col_values.len();
    if n_rows * n_cols > limits.max_cells {
        return Err(StatsError::TooManyCategories {
            dim: "cells",
            got: n_rows * n_cols,
            max: limits.max_cells,
        });
    }

    let mut observed = vec![0.0; n_rows * n_cols];
    for (a, b) in values_a.iter().zip(values_b) {
        // positions exist: the distinct lists were built from these values
        let row = row_values.iter().position(|v| v == a).unwrap_or(0);
        let col = col_values.iter().position(|v| v == b).unwrap_or(0);
        observed[row * n_cols + col] += 1.0;
    }
    let grand_total: f64 = observed.iter().sum();
    let mut row_totals = vec![0.0; n_rows];
    let mut col_totals = vec![0.0; n_cols];
    for row in 0..n_rows {
        for col in 0..n_cols {
            row_totals[row] += observed[row * n_cols + col];
            col_totals[col] += observed[row * n_cols + col];
        }
    }
    let mut expected = vec![0.0; n_rows * n_cols];
    for row in 0..n_rows {
        for col in 0..n_cols {
            expected[row * n_cols + col] = row_totals[row] * col_totals[col] / grand_total;
        }
    }
    let df = (n_rows - 1) * (n_cols - 1);
    let min_expected = expected.iter().copied().fold(f64::INFINITY, f64::min);
    let cells_lt_5 = expected.iter().filter(|&&e| e < 5.0).count();
    let pct_cells_lt_5 = 100.0 * cells_lt_5 as f64 / expected.len() as f64;
    let (chi2, p) = chi_square_from_table(&observed, Some(&expected), Some(df))?;
    Ok(ChiSquareResult {
        chi2,
        p,
        df,
        observed,
        expected,
        min_expected,
        pct_cells_lt_5,
        row_values,
        col_values,
    })
}

/// One-way chi-square of observed against expected frequencies.
///
/// With no expected counts the total is assumed evenly distributed.
/// With no df, k − 1 is used — pass the table df (r−1)(c−1) when the
/// frequencies came from a crosstab.
pub fn chi_square_from_table(
    observed: &[f64],
    expected: Option<&[f64]>,
    df: Option<usize>,
) -> Result<(f64, f64), StatsError> {
    let k = observed.len();
    if k < 2 {
        return Err(StatsError::InsufficientData { needed: 2, got: k });
    }
    ensure_finite(observed)?;
    let even_split;
    let expected = match expected {
        Some(e) => {
            if e.len() != k {
                return Err(StatsError::MismatchedLength {
                    len_a: k,
                    len_b: e.len(),
                });
            }
            ensure_finite(e)?;
            e
        }
        None => {
            even_split = vec![observed.iter().sum::<f64>() / k as f64; k];
            even_split.as_slice()
        }
    };
    let mut chi2 = 0.0;
    for (&o, &e) in observed.iter().zip(expected) {
        if e <= 0.0 {
            return Err(StatsError::Domain {
                what: "expected frequency",
                value: e,
            });
        }
        chi2 += (o - e) * (o - e) / e;
    }
    let df = df.unwrap_or(k - 1);
    Ok((chi2, chi_square_tail(chi2, df as u64)))
}

/// One cell in a chi-square worked example.
#[derive(Debug, Clone, Serialize)]
pub struct ChiSquareCell {
    /// 1-based row number.
    pub row: usize,
    /// 1-based column number.
    pub col: usize,
    pub observed: f64,
    pub row_total: f64,
    pub col_total: f64,
    pub expected: f64,
    /// |observed − expected|.
    pub diff: f64,
    pub diff_squared: f64,
    /// diff² / expected — this cell's contribution to χ².
    pub chi_contribution: f64,
}

/// Step-by-step working for a chi-square test.
#[derive(Debug, Clone, Serialize)]
pub struct ChiSquareDetails {
    pub grand_total: f64,
    pub row_totals: Vec<f64>,
    pub col_totals: Vec<f64>,
    pub cells: Vec<ChiSquareCell>,
    pub chi2: f64,
    pub df: usize,
}

/// Worked example derived from a computed [`ChiSquareResult`].
pub fn chi_square_details(result: &ChiSquareResult) -> ChiSquareDetails {
    let n_rows = result.row_values.len();
    let n_cols = result.col_values.len();
    let grand_total: f64 = result.observed.iter().sum();
    let mut row_totals = vec![0.0; n_rows];
    let mut col_totals = vec![0.0; n_cols];
    for row in 0..n_rows {
        for col in 0..n_cols {
            row_totals[row] += result.observed[row * n_cols + col];
            col_totals[col] += result.observed[row * n_cols + col];
        }
    }
    let mut cells = Vec::with_capacity(n_rows * n_cols);
    let mut chi2 = 0.0;
    for row in 0..n_rows {
        for col in 0..n_cols {
            let observed = result.observed[row * n_cols + col];
            let expected = row_totals[row] * col_totals[col] / grand_total;
            let diff = (observed - expected).abs();
            let diff_squared = diff * diff;
            let chi_contribution = diff_squared / expected;
            chi2 += chi_contribution;
            cells.push(ChiSquareCell {
                row: row + 1,
                col: col + 1,
                observed,
                row_total: row_totals[row],
                col_total: col_totals[col],
                expected,
                diff,
                diff_squared,
                chi_contribution,
            });
        }
    }
    ChiSquareDetails {
        grand_total,
        row_totals,
        col_totals,
        cells,
        chi2,
        df: result.df,
    }
}

// ---------------------------------------------------------------------------
// Normality diagnostics
// ---------------------------------------------------------------------------

/// Offset making normal kurtosis score zero (Fisher's definition).
const FISHER_KURTOSIS_ADJUSTMENT: f64 = 3.0;

fn moment(vals: &[f64], k: i32) -> f64 {
    if k == 1 {
        return 0.0;
    }
    let n = vals.len() as f64;
    let mn = vals.iter().sum::<f64>() / n;
    vals.iter().map(|&v| (v - mn).powi(k)).sum::<f64>() / n
}

/// Skewness of the sample (normal ⇒ 0; positive means a heavier right
/// tail). Zero when every value is equal.
pub fn skew(vals: &[f64]) -> Result<f64, StatsError> {
    ensure_finite(vals)?;
    if vals.len() < 2 {
        return Err(StatsError::InsufficientData {
            needed: 2,
            got: vals.len(),
        });
    }
    let denom = moment(vals, 2).powf(1.5);
    if denom == 0.0 {
        return Ok(0.0);
    }
    Ok(moment(vals, 3) / denom)
}

/// Fisher-adjusted kurtosis (normal ⇒ 0; positive means heavier
/// tails). The adjustment subtracts 3 from the raw μ₄/σ⁴ ratio.
pub fn kurtosis(vals: &[f64]) -> Result<f64, StatsError> {
    ensure_finite(vals)?;
    if vals.len() < 2 {
        return Err(StatsError::InsufficientData {
            needed: 2,
            got: vals.len(),
        });
    }
    let denom = moment(vals, 2).powi(2);
    let ratio = if denom == 0.0 {
        0.0
    } else {
        moment(vals, 4) / denom
    };
    Ok(ratio - FISHER_KURTOSIS_ADJUSTMENT)
}

/// Result of the skewness normality sub-test.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SkewTestResult {
    pub z: f64,
    pub p: f64,
    pub skew: f64,
}

/// Tests whether sample skewness differs from a normal distribution's
/// (D'Agostino's transformation to an approximate z-score).
///
/// # Returns
///
/// `InsufficientData` below n = 8, where the transformation's moment
/// expressions degenerate.
pub fn skew_test(vals: &[f64]) -> Result<SkewTestResult, StatsError> {
    ensure_finite(vals)?;
    let n = vals.len();
    if n < 8 {
        return Err(StatsError::InsufficientData { needed: 8, got: n });
    }
    let b2 = skew(vals)?;
    let nf = n as f64;
    let y = b2 * (((nf + 1.0) * (nf + 3.0)) / (6.0 * (nf - 2.0))).sqrt();
    let beta2 = (3.0 * (nf * nf + 27.0 * nf - 70.0) * (nf + 1.0) * (nf + 3.0))
        / ((nf - 2.0) * (nf + 5.0) * (nf + 7.0) * (nf + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / w2.sqrt().ln().sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    let y = if y == 0.0 { 1.0 } else { y };
    let z = delta * (y / alpha + ((y / alpha).powi(2) + 1.0).sqrt()).ln();
    let p = (1.0 - standard_normal_cdf(z)) * 2.0;
    Ok(SkewTestResult { z, p, skew: b2 })
}

/// Result of the kurtosis normality sub-test.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct KurtosisTestResult {
    pub z: f64,
    pub p: f64,
    /// Fisher-adjusted kurtosis.
    pub kurtosis: f64,
}

/// Tests whether sample kurtosis matches a normal distribution's
/// (Anscombe-Glynn transformation).
///
/// # Returns
///
/// `InsufficientData` below n = 20 — the approximation is only valid
/// from there.
pub fn kurtosis_test(vals: &[f64]) -> Result<KurtosisTestResult, StatsError> {
    ensure_finite(vals)?;
    let n = vals.len();
    if n < 20 {
        return Err(StatsError::InsufficientData { needed: 20, got: n });
    }
    let kurt = kurtosis(vals)?;
    let b2 = kurt + FISHER_KURTOSIS_ADJUSTMENT;
    let nf = n as f64;
    let expectation = 3.0 * (nf - 1.0) / (nf + 1.0);
    let var_b2 =
        24.0 * nf * (nf - 2.0) * (nf - 3.0) / ((nf + 1.0) * (nf + 1.0) * (nf + 3.0) * (nf + 5.0));
    let x = (b2 - expectation) / var_b2.sqrt();
    let sqrt_beta1 = 6.0 * (nf * nf - 5.0 * nf + 2.0) / ((nf + 7.0) * (nf + 9.0))
        * ((6.0 * (nf + 3.0) * (nf + 5.0)) / (nf * (nf - 2.0) * (nf - 3.0))).sqrt();
    let a =
        6.0 + 8.0 / sqrt_beta1 * (2.0 / sqrt_beta1 + (1.0 + 4.0 / (sqrt_beta1 * sqrt_beta1)).sqrt());
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + x * (2.0 / (a - 4.0)).sqrt();
    let denom = if denom < 0.0 { 99.0 } else { denom };
    let term2 = if denom == 0.0 {
        term1
    } else {
        ((1.0 - 2.0 / a) / denom).powf(1.0 / 3.0)
    };
    let z = if denom == 99.0 {
        0.0
    } else {
        (term1 - term2) / (2.0 / (9.0 * a)).sqrt()
    };
    let p = (1.0 - standard_normal_cdf(z)) * 2.0;
    Ok(KurtosisTestResult {
        z,
        p,
        kurtosis: kurt,
    })
}

/// Result of the omnibus normality test. Components that could not be
/// computed (e.g. kurtosis below n = 20) come back as `None` without
/// failing the call.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NormalityResult {
    /// Omnibus statistic z²_skew + z²_kurtosis.
    pub k2: Option<f64>,
    /// p-value of k² against χ² with 2 df.
    pub p: Option<f64>,
    pub skew: Option<f64>,
    pub z_skew: Option<f64>,
    pub kurtosis: Option<f64>,
    pub z_kurtosis: Option<f64>,
}

/// D'Agostino-Pearson omnibus normality test, combining the skew and
/// kurtosis sub-tests. Either sub-test may fail independently; its
/// fields are then absent and the rest still reported.
pub fn normal_test(vals: &[f64]) -> Result<NormalityResult, StatsError> {
    ensure_finite(vals)?;
    let skew_part = skew_test(vals).ok();
    let kurt_part = kurtosis_test(vals).ok();
    let (k2, p) = match (&skew_part, &kurt_part) {
        (Some(s), Some(k)) => {
            let k2 = s.z * s.z + k.z * k.z;
            (Some(k2), Some(chi_square_tail(k2, 2)))
        }
        _ => (None, None),
    };
    Ok(NormalityResult {
        k2,
        p,
        skew: skew_part.map(|s| s.skew),
        z_skew: skew_part.map(|s| s.z),
        kurtosis: kurt_part.map(|k| k.kurtosis),
        z_kurtosis: kurt_part.map(|k| k.z),
    })
}

// ---------------------------------------------------------------------------
// Homogeneity of variance
// ---------------------------------------------------------------------------

/// Convergence tolerance for the O'Brien transform's consistency
/// check. 1e-10 rejects perfectly good samples once values reach the
/// hundreds; 1e-7 does not.
const OBRIEN_TINY: f64 = 1e-7;

/// O'Brien's transform: maps each group so that running a standard
/// ANOVA on the transformed values tests equality of *variances*
/// (Maxwell & Delaney p.112).
///
/// # Algorithm
///
/// x ↦ ((n−1.5)·n·(x−x̄)² − 0.5·s²·(n−1)) / ((n−1)(n−2)) per group,
/// then a consistency check: each transformed group's mean must
/// reproduce the group's original variance within tolerance.
///
/// # Returns
///
/// `InsufficientData` for any group with fewer than 3 values;
/// `TransformConvergence` if the consistency check fails.
pub fn obrien_transform(samples: &[&[f64]]) -> Result<Vec<Vec<f64>>, StatsError> {
    let mut transformed = Vec::with_capacity(samples.len());
    for sample in samples {
        ensure_finite(sample)?;
        let n = sample.len();
        if n < 3 {
            return Err(StatsError::InsufficientData { needed: 3, got: n });
        }
        let nf = n as f64;
        let var: f64 = variance(sample)?;
        let mn: f64 = mean(sample)?;
        let group: Vec<f64> = sample
            .iter()
            .map(|&x| {
                let t1 = (nf - 1.5) * nf * (x - mn) * (x - mn);
                let t2 = 0.5 * var * (nf - 1.0);
                let t3 = (nf - 1.0) * (nf - 2.0);
                (t1 - t2) / t3
            })
            .collect();
        let trans_mean: f64 = mean(&group)?;
        let diff = var - trans_mean;
        if diff > OBRIEN_TINY {
            return Err(StatsError::TransformConvergence { diff });
        }
        transformed.push(group);
    }
    Ok(transformed)
}

/// Declares group variances "similar" when a standard one-way ANOVA
/// over the O'Brien-transformed values yields p ≥ `threshold`.
/// Returns the verdict and that p-value.
pub fn sim_variance(samples: &[&[f64]], threshold: f64) -> Result<(bool, f64), StatsError> {
    let transformed = obrien_transform(samples)?;
    let refs: Vec<&[f64]> = transformed.iter().map(Vec::as_slice).collect();
    let labels: Vec<String> = (1..=refs.len()).map(|i| format!("group {i}")).collect();
    let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
    let result = anova(&refs, &label_refs, PrecisionMode::Standard)?;
    let p = result.p.to_f64();
    Ok((p >= threshold, p))
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Independent t-test
    // -----------------------------------------------------------------------

    #[test]
    fn t_test_ind_textbook_example() {
        // classic equal-variances example: near-equal means
        let a = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let b = [1.0, 2.0, 4.0, 5.0, 5.0, 6.0, 7.0, 8.0];
        let r = t_test_ind(&a, &b, "a", "b").expect("t-test");
        assert_eq!(r.df, 14);
        assert!(r.t.abs() < 0.3, "t = {}", r.t);
        assert!(r.p > 0.5, "p = {}", r.p);
        assert_eq!(r.group_a.n, 8);
        assert_eq!(r.group_a.mean.as_ref().expect("mean").to_f64(), 5.0);
    }

    #[test]
    fn t_test_ind_clearly_different_means() {
        let a = [1.0, 2.0, 3.0, 2.0, 1.5, 2.5];
        let b = [10.0, 11.0, 12.0, 10.5, 11.5, 10.5];
        let r = t_test_ind(&a, &b, "a", "b").expect("t-test");
        assert!(r.p < 0.001, "p = {}", r.p);
        assert!(r.t < 0.0);
    }

    #[test]
    fn t_test_ind_zero_variance_rejected() {
        let a = [5.0, 5.0, 5.0];
        let b = [5.0, 5.0, 5.0];
        assert!(matches!(
            t_test_ind(&a, &b, "a", "b"),
            Err(StatsError::InadequateVariability)
        ));
    }

    #[test]
    fn t_test_ind_needs_two_per_group() {
        assert!(t_test_ind(&[1.0], &[2.0, 3.0], "a", "b").is_err());
    }

    #[test]
    fn t_test_ind_is_deterministic() {
        let a = [2.0, 4.0, 4.5, 7.0];
        let b = [1.0, 3.0, 5.0, 6.0];
        let r1 = t_test_ind(&a, &b, "a", "b").expect("first");
        let r2 = t_test_ind(&a, &b, "a", "b").expect("second");
        assert_eq!(r1.t.to_bits(), r2.t.to_bits());
        assert_eq!(r1.p.to_bits(), r2.p.to_bits());
    }

    // -----------------------------------------------------------------------
    // Paired t-test
    // -----------------------------------------------------------------------

    #[test]
    fn t_test_paired_detects_shift() {
        let before = [5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let after = [6.2, 7.1, 8.3, 9.0, 10.4, 11.1, 12.2, 13.3];
        let r = t_test_paired(&before, &after, "before", "after").expect("paired");
        assert_eq!(r.df, 7);
        assert!(r.p < 0.001, "p = {}", r.p);
        assert!(r.t < 0.0); // after > before
        assert_eq!(r.diffs.len(), 8);
        assert!((r.diffs[0] - 1.2).abs() < 1e-12);
    }

    #[test]
    fn t_test_paired_length_mismatch() {
        let res = t_test_paired(&[1.0, 2.0], &[3.0], "a", "b");
        assert!(matches!(
            res,
            Err(StatsError::MismatchedLength { len_a: 2, len_b: 1 })
        ));
    }

    #[test]
    fn t_test_paired_identical_pairs_rejected() {
        let a = [4.0, 5.0, 6.0];
        assert!(matches!(
            t_test_paired(&a, &a, "a", "a"),
            Err(StatsError::InadequateVariability)
        ));
    }

    // -----------------------------------------------------------------------
    // ANOVA
    // -----------------------------------------------------------------------

    #[test]
    fn anova_separated_groups() {
        let g1: &[f64] = &[1.0, 2.0, 3.0, 2.0, 1.5];
        let g2: &[f64] = &[5.0, 6.0, 7.0, 6.0, 5.5];
        let g3: &[f64] = &[10.0, 11.0, 12.0, 11.0, 10.5];
        let r = anova(&[g1, g2, g3], &["a", "b", "c"], PrecisionMode::Standard).expect("anova");
        assert_eq!(r.df_between, 2);
        assert_eq!(r.df_within, 12);
        assert!(r.p.to_f64() < 0.001, "p = {}", r.p.to_f64());
        assert!(r.f.to_f64() > 10.0);
    }

    #[test]
    fn anova_ss_decomposition() {
        let g1: &[f64] = &[1.0, 2.0, 3.0, 2.0, 1.5];
        let g2: &[f64] = &[5.0, 6.0, 7.0, 6.0, 5.5];
        let r = anova(&[g1, g2], &["a", "b"], PrecisionMode::Standard).expect("anova");
        let pooled: Vec<f64> = g1.iter().chain(g2).copied().collect();
        let grand = pooled.iter().sum::<f64>() / pooled.len() as f64;
        let ss_total: f64 = pooled.iter().map(|&x| (x - grand) * (x - grand)).sum();
        let got = r.ss_between.to_f64() + r.ss_within.to_f64();
        assert!(
            (ss_total - got).abs() < 1e-10,
            "SS decomposition: {ss_total} vs {got}"
        );
    }

    #[test]
    fn anova_high_precision_matches_standard() {
        let g1: &[f64] = &[4.1, 5.2, 6.3, 5.5, 4.9];
        let g2: &[f64] = &[5.8, 6.9, 7.1, 6.4, 7.3];
        let g3: &[f64] = &[3.2, 4.4, 3.9, 4.8, 4.1];
        let std = anova(&[g1, g2, g3], &["a", "b", "c"], PrecisionMode::Standard).expect("std");
        let high = anova(&[g1, g2, g3], &["a", "b", "c"], PrecisionMode::High).expect("high");
        assert!(
            (std.f.to_f64() - high.f.to_f64()).abs() < 1e-9,
            "F: {} vs {}",
            std.f.to_f64(),
            high.f.to_f64()
        );
        // p agreement is bounded by the continued fraction's relative
        // tolerance, not machine epsilon
        assert!((std.p.to_f64() - high.p.to_f64()).abs() < 1e-6);
        // high-mode results really are decimal-tagged
        assert!(matches!(high.f, Num::High(_)));
        assert!(matches!(std.f, Num::Std(_)));
    }

    #[test]
    fn anova_high_precision_repeat_calls_identical() {
        let g1: &[f64] = &[1.234567, 2.345678, 3.456789];
        let g2: &[f64] = &[4.567891, 5.678912, 6.789123];
        let first = anova(&[g1, g2], &["a", "b"], PrecisionMode::High).expect("first");
        let second = anova(&[g1, g2], &["a", "b"], PrecisionMode::High).expect("second");
        assert_eq!(first.f, second.f);
        assert_eq!(first.p, second.p);
    }

    #[test]
    fn anova_no_within_variance_rejected() {
        let g1: &[f64] = &[1.0, 1.0, 1.0];
        let g2: &[f64] = &[2.0, 2.0, 2.0];
        assert!(matches!(
            anova(&[g1, g2], &["a", "b"], PrecisionMode::Standard),
            Err(StatsError::InadequateVariability)
        ));
    }

    #[test]
    fn anova_label_count_must_match() {
        let g1: &[f64] = &[1.0, 2.0];
        let g2: &[f64] = &[3.0, 4.0];
        assert!(matches!(
            anova(&[g1, g2], &["only one"], PrecisionMode::Standard),
            Err(StatsError::MismatchedLength { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Mann-Whitney U
    // -----------------------------------------------------------------------

    #[test]
    fn mann_whitney_complete_separation() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        let r = mann_whitney_u(&a, &b, "a", "b").expect("mw");
        assert_eq!(r.u, 0.0);
        assert!(r.p < 0.05, "p = {}", r.p);
        assert_eq!(r.group_a.avg_rank, Some(2.0));
        assert_eq!(r.group_b.avg_rank, Some(5.0));
    }

    #[test]
    fn mann_whitney_overlapping_groups_not_significant() {
        let a = [5.0, 7.0, 6.0, 8.0, 6.5];
        let b = [6.0, 7.5, 5.5, 8.5, 7.0];
        let r = mann_whitney_u(&a, &b, "a", "b").expect("mw");
        assert!(r.p > 0.1, "p = {}", r.p);
    }

    #[test]
    fn mann_whitney_all_identical_rejected() {
        let a = [3.0, 3.0, 3.0];
        let b = [3.0, 3.0, 3.0];
        assert!(matches!(
            mann_whitney_u(&a, &b, "a", "b"),
            Err(StatsError::InadequateVariability)
        ));
    }

    #[test]
    fn mann_whitney_details_match_test_statistic() {
        let a = [12.0, 7.0, 3.0, 9.0];
        let b = [5.0, 8.0, 2.0, 11.0, 6.0];
        let r = mann_whitney_u(&a, &b, "a", "b").expect("mw");
        let d = mann_whitney_details(&a, &b, "a", "b").expect("details");
        assert_eq!(d.u, r.u);
        // sample 1 is the shorter input
        assert_eq!(d.label_1, "a");
        assert_eq!(d.n_1, 4);
        assert_eq!(d.value_details.len(), 9);
        let counters: Vec<usize> = d.value_details.iter().map(|v| v.counter).collect();
        assert_eq!(counters, (1..=9).collect::<Vec<_>>());
    }

    // -----------------------------------------------------------------------
    // Wilcoxon signed-rank
    // -----------------------------------------------------------------------

    #[test]
    fn wilcoxon_reference_example() {
        let a = [
            125.0, 115.0, 130.0, 140.0, 140.0, 115.0, 140.0, 125.0, 140.0, 135.0,
        ];
        let b = [
            110.0, 122.0, 125.0, 120.0, 140.0, 124.0, 123.0, 137.0, 135.0, 145.0,
        ];
        let r = wilcoxon_signed_rank(&a, &b, "a", "b").expect("wilcoxon");
        // one zero difference dropped; negative rank sum is smaller
        assert_eq!(r.n_nonzero, 9);
        assert_eq!(r.t, 18.0);
        assert!(r.p > 0.05, "p = {}", r.p);
    }

    #[test]
    fn wilcoxon_requires_paired_lengths() {
        assert!(matches!(
            wilcoxon_signed_rank(&[1.0, 2.0], &[1.0], "a", "b"),
            Err(StatsError::MismatchedLength { .. })
        ));
    }

    #[test]
    fn wilcoxon_identical_samples_rejected() {
        let a = [2.0, 4.0, 6.0];
        assert!(matches!(
            wilcoxon_signed_rank(&a, &a, "a", "a"),
            Err(StatsError::InadequateVariability)
        ));
    }

    #[test]
    fn wilcoxon_details_consistent_with_test() {
        let a = [5.0, 6.0, 7.0, 8.0, 9.0, 4.0];
        let b = [6.0, 7.5, 8.0, 9.5, 11.0, 4.0];
        let r = wilcoxon_signed_rank(&a, &b, "a", "b").expect("test");
        let d = wilcoxon_details(&a, &b).expect("details");
        assert_eq!(d.t, r.t);
        assert_eq!(d.n, r.n_nonzero);
        assert_eq!(d.pair_diffs.len(), 6);
        assert_eq!(d.ranked_diffs.len(), 5); // zero diff excluded
        let total: f64 = d.sum_plus_ranks + d.sum_minus_ranks;
        assert_eq!(total, 15.0); // 5·6/2
    }

    // -----------------------------------------------------------------------
    // Kruskal-Wallis
    // -----------------------------------------------------------------------

    #[test]
    fn kruskal_wallis_separated_groups() {
        let g1: &[f64] = &[1.0, 2.0, 3.0, 4.0, 5.0];
        let g2: &[f64] = &[6.0, 7.0, 8.0, 9.0, 10.0];
        let g3: &[f64] = &[11.0, 12.0, 13.0, 14.0, 15.0];
        let r = kruskal_wallis(&[g1, g2, g3], &["a", "b", "c"]).expect("kw");
        assert_eq!(r.df, 2);
        assert!((r.h - 12.5).abs() < 1e-9, "h = {}", r.h);
        assert!(r.p < 0.01, "p = {}", r.p);
        assert_eq!(r.groups[0].median, Some(3.0));
    }

    #[test]
    fn kruskal_wallis_all_identical_rejected() {
        let g: &[f64] = &[4.0, 4.0, 4.0];
        assert!(matches!(
            kruskal_wallis(&[g, g, g], &["a", "b", "c"]),
            Err(StatsError::InadequateVariability)
        ));
    }

    // -----------------------------------------------------------------------
    // Chi-square
    // -----------------------------------------------------------------------

    fn repeated_pairs(
        spec: &[(&'static str, &'static str, usize)],
    ) -> (Vec<&'static str>, Vec<&'static str>) {
        let mut a = Vec::new();
        let mut b = Vec::new();
        for &(va, vb, count) in spec {
            for _ in 0..count {
                a.push(va);
                b.push(vb);
            }
        }
        (a, b)
    }

    #[test]
    fn chi_square_strong_association() {
        let (a, b) = repeated_pairs(&[
            ("smoker", "ill", 30),
            ("smoker", "well", 10),
            ("nonsmoker", "ill", 10),
            ("nonsmoker", "well", 50),
        ]);
        let r = chi_square(&a, &b, &ChiSquareLimits::default()).expect("chi2");
        assert_eq!(r.df, 1);
        assert!((r.chi2 - 34.028).abs() < 0.01, "chi2 = {}", r.chi2);
        assert!(r.p < 0.001, "p = {}", r.p);
        // expected totals match observed totals
        let obs_total: f64 = r.observed.iter().sum();
        let exp_total: f64 = r.expected.iter().sum();
        assert!(
            ((obs_total - exp_total) / obs_total).abs() < 1e-6,
            "{obs_total} vs {exp_total}"
        );
        assert_eq!(r.row_values, vec!["nonsmoker", "smoker"]);
        assert!((r.min_expected - 16.0).abs() < 1e-9);
        assert_eq!(r.pct_cells_lt_5, 0.0);
    }

    #[test]
    fn chi_square_no_association() {
        let (a, b) = repeated_pairs(&[
            ("x", "p", 25),
            ("x", "q", 25),
            ("y", "p", 25),
            ("y", "q", 25),
        ]);
        let r = chi_square(&a, &b, &ChiSquareLimits::default()).expect("chi2");
        assert!(r.chi2.abs() < 1e-12);
        assert!(r.p > 0.99);
    }

    #[test]
    fn chi_square_dimension_limits() {
        let (a, b) = repeated_pairs(&[("only", "p", 5), ("only", "q", 5)]);
        assert!(matches!(
            chi_square(&a, &b, &ChiSquareLimits::default()),
            Err(StatsError::TooFewCategories {
                dim: "row variable",
                ..
            })
        ));

        let tight = ChiSquareLimits {
            min_dims: 2,
            max_dims: 2,
            max_cells: 200,
        };
        let (a, b) = repeated_pairs(&[
            ("r1", "c1", 2),
            ("r2", "c1", 2),
            ("r3", "c1", 2),
            ("r1", "c2", 2),
        ]);
        assert!(matches!(
            chi_square(&a, &b, &tight),
            Err(StatsError::TooManyCategories {
                dim: "row variable",
                ..
            })
        ));
    }

    #[test]
    fn chi_square_from_table_even_split_default() {
        let (chi2, p) = chi_square_from_table(&[25.0, 25.0, 25.0, 25.0], None, None).expect("gof");
        assert_eq!(chi2, 0.0);
        assert!((p - 1.0).abs() < 0.01);
        let (chi2, p) =
            chi_square_from_table(&[90.0, 10.0], Some(&[50.0, 50.0]), None).expect("gof");
        assert_eq!(chi2, 64.0);
        assert!(p < 0.001);
    }

    #[test]
    fn chi_square_from_table_rejects_zero_expected() {
        let res = chi_square_from_table(&[10.0, 20.0], Some(&[10.0, 0.0]), None);
        assert!(matches!(res, Err(StatsError::Domain { .. })));
    }

    #[test]
    fn chi_square_details_reproduce_statistic() {
        let (a, b) = repeated_pairs(&[
            ("smoker", "ill", 30),
            ("smoker", "well", 10),
            ("nonsmoker", "ill", 10),
            ("nonsmoker", "well", 50),
        ]);
        let r = chi_square(&a, &b, &ChiSquareLimits::default()).expect("chi2");
        let d = chi_square_details(&r);
        assert_eq!(d.grand_total, 100.0);
        assert_eq!(d.cells.len(), 4);
        assert!((d.chi2 - r.chi2).abs() < 1e-9);
        let contribution_sum: f64 = d.cells.iter().map(|c| c.chi_contribution).sum();
        assert!((contribution_sum - r.chi2).abs() < 1e-9);
    }

    // -----------------------------------------------------------------------
    // Normality diagnostics
    // -----------------------------------------------------------------------

    #[test]
    fn skew_symmetric_data_is_zero() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(skew(&data).expect("skew").abs() < 1e-12);
    }

    #[test]
    fn skew_right_tailed_is_positive() {
        let data = [1.0, 1.0, 1.0, 2.0, 2.0, 10.0];
        assert!(skew(&data).expect("skew") > 0.5);
    }

    #[test]
    fn kurtosis_uniformish_is_negative() {
        // flat distributions have negative Fisher kurtosis (~-1.2 for uniform)
        let data: Vec<f64> = (1..=30).map(|i| i as f64).collect();
        let k = kurtosis(&data).expect("kurtosis");
        assert!(k < -0.5, "kurtosis = {k}");
    }

    #[test]
    fn skew_test_needs_eight_values() {
        assert!(matches!(
            skew_test(&[1.0, 2.0, 3.0]),
            Err(StatsError::InsufficientData { needed: 8, .. })
        ));
    }

    #[test]
    fn kurtosis_test_needs_twenty_values() {
        let data: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        assert!(matches!(
            kurtosis_test(&data),
            Err(StatsError::InsufficientData { needed: 20, .. })
        ));
    }

    #[test]
    fn normal_test_partial_results_below_twenty() {
        // 10 values: skew sub-test runs, kurtosis sub-test cannot
        let data: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let r = normal_test(&data).expect("normal test");
        assert!(r.z_skew.is_some());
        assert!(r.z_kurtosis.is_none());
        assert!(r.k2.is_none());
        assert!(r.p.is_none());
    }

    #[test]
    fn normal_test_full_results_on_larger_sample() {
        // symmetric spread of 25 values
        let data: Vec<f64> = (0..25).map(|i| (i % 5) as f64).collect();
        let r = normal_test(&data).expect("normal test");
        assert!(r.k2.is_some());
        let p = r.p.expect("p");
        assert!((0.0..=1.0).contains(&p), "p = {p}");
    }

    // -----------------------------------------------------------------------
    // O'Brien homogeneity of variance
    // -----------------------------------------------------------------------

    #[test]
    fn obrien_transformed_means_match_variances() {
        let a: &[f64] = &[12.0, 15.0, 11.0, 18.0, 14.0, 16.0];
        let b: &[f64] = &[22.0, 25.0, 21.0, 28.0, 24.0, 26.0];
        let transformed = obrien_transform(&[a, b]).expect("transform");
        for (sample, group) in [a, b].iter().zip(&transformed) {
            let var: f64 = variance(sample).expect("variance");
            let mn: f64 = mean(group).expect("mean");
            assert!((var - mn).abs() < 1e-7, "{var} vs {mn}");
        }
    }

    #[test]
    fn obrien_needs_three_per_group() {
        let a: &[f64] = &[1.0, 2.0];
        let b: &[f64] = &[26.0, 12.0];
        assert!(matches!(
            obrien_transform(&[a, b]),
            Err(StatsError::InsufficientData { needed: 3, .. })
        ));
    }

    #[test]
    fn sim_variance_same_spread_is_similar() {
        let a: &[f64] = &[10.0, 12.0, 14.0, 16.0, 18.0, 20.0];
        let b: &[f64] = &[30.0, 32.0, 34.0, 36.0, 38.0, 40.0];
        let (similar, p) = sim_variance(&[a, b], 0.05).expect("sim");
        assert!(similar, "p = {p}");
        assert!(p > 0.05);
    }

    #[test]
    fn sim_variance_very_different_spread_is_not() {
        let a: &[f64] = &[10.0, 10.1, 9.9, 10.05, 9.95, 10.02, 9.98, 10.01];
        let b: &[f64] = &[0.0, 50.0, 100.0, 25.0, 75.0, 10.0, 90.0, 40.0];
        let (similar, p) = sim_variance(&[a, b], 0.05).expect("sim");
        assert!(!similar, "p = {p}");
    }
}
