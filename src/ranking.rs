//! Rank and tie utilities.
//!
//! The shared machinery of the rank-based tests: a shell sort that
//! keeps a back-mapping to original positions, average-rank assignment
//! for tied values, and the tie-correction factor used by Mann-Whitney
//! and Kruskal-Wallis.
//!
//! # Examples
//!
//! ```
//! use veristat::ranking::rank;
//!
//! // tied 2.0s share the mean of ranks 2 and 3
//! assert_eq!(rank(&[1.0, 2.0, 2.0, 5.0]), vec![1.0, 2.5, 2.5, 4.0]);
//! ```

/// Above this many values, ranking is slow enough that an interactive
/// caller may want to confirm before proceeding. The engine itself only
/// traces and carries on — the prompt policy belongs to the caller.
pub const LARGE_SAMPLE_THRESHOLD: usize = 10_000;

/// Whether a sample is large enough that callers may want to warn the
/// user before a ranking-based operation.
pub fn is_large_sample(n: usize) -> bool {
    n > LARGE_SAMPLE_THRESHOLD
}

/// Shell sort returning the sorted values and the index vector mapping
/// sorted positions back to original ones: `sorted[i] == vals[index[i]]`.
pub fn shell_sort(vals: &[f64]) -> (Vec<f64>, Vec<usize>) {
    let n = vals.len();
    let mut svec = vals.to_vec();
    let mut ivec: Vec<usize> = (0..n).collect();
    let mut gap = n / 2;
    while gap > 0 {
        for i in gap..n {
            let mut j = i;
            while j >= gap && svec[j - gap] > svec[j] {
                svec.swap(j - gap, j);
                ivec.swap(j - gap, j);
                j -= gap;
            }
        }
        gap /= 2;
    }
    (svec, ivec)
}

/// Ranks the data, assigning each value the average of the rank
/// positions occupied by all values equal to it. Ranks are 1-based, so
/// for a sample of size n they always sum to n(n+1)/2.
pub fn rank(vals: &[f64]) -> Vec<f64> {
    let n = vals.len();
    if is_large_sample(n) {
        tracing::debug!(n, "ranking a large sample; this is O(n log n) at best");
    }
    let (svec, ivec) = shell_sort(vals);
    let mut ranks = vec![0.0; n];
    let mut sum_ranks = 0usize;
    let mut dup_count = 0usize;
    for i in 0..n {
        sum_ranks += i;
        dup_count += 1;
        if i == n - 1 || svec[i] != svec[i + 1] {
            let avg_rank = sum_ranks as f64 / dup_count as f64 + 1.0;
            for j in (i + 1 - dup_count)..=i {
                ranks[ivec[j]] = avg_rank;
            }
            sum_ranks = 0;
            dup_count = 0;
        }
    }
    ranks
}

/// Tie-correction factor `1 − Σ(t³−t)/(n³−n)` over groups of tied
/// ranks of size t (Siegel 1956).
///
/// Exactly 1.0 when no ties exist; 0.0 only when every value is tied —
/// callers must treat that degenerate case as inadequate variability
/// before dividing by this factor.
pub fn tie_correction(rank_vals: &[f64]) -> f64 {
    let n = rank_vals.len();
    if n < 2 {
        return 1.0;
    }
    let (sorted, _) = shell_sort(rank_vals);
    let mut t = 0.0;
    let mut i = 0;
    while i < n - 1 {
        if sorted[i] == sorted[i + 1] {
            let mut n_ties = 1.0f64;
            while i < n - 1 && sorted[i] == sorted[i + 1] {
                n_ties += 1.0;
                i += 1;
            }
            t += n_ties.powi(3) - n_ties;
        }
        i += 1;
    }
    let nf = n as f64;
    1.0 - t / (nf.powi(3) - nf)
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Shell sort
    // -----------------------------------------------------------------------

    #[test]
    fn shell_sort_orders_and_back_maps() {
        let vals = [3.0, 1.0, 4.0, 1.5, 2.0];
        let (sorted, index) = shell_sort(&vals);
        assert_eq!(sorted, vec![1.0, 1.5, 2.0, 3.0, 4.0]);
        for (i, &orig) in index.iter().enumerate() {
            assert_eq!(sorted[i], vals[orig]);
        }
    }

    #[test]
    fn shell_sort_empty_and_single() {
        assert_eq!(shell_sort(&[]).0, Vec::<f64>::new());
        assert_eq!(shell_sort(&[7.0]).0, vec![7.0]);
    }

    // -----------------------------------------------------------------------
    // Ranking
    // -----------------------------------------------------------------------

    #[test]
    fn rank_distinct_values() {
        assert_eq!(rank(&[30.0, 10.0, 20.0]), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn rank_averages_ties() {
        // two 2.0s occupy rank positions 2 and 3
        assert_eq!(rank(&[1.0, 2.0, 2.0, 5.0]), vec![1.0, 2.5, 2.5, 4.0]);
    }

    #[test]
    fn rank_sums_are_invariant() {
        // sum of ranks is n(n+1)/2 regardless of ties
        let samples: [&[f64]; 3] = [
            &[1.0, 2.0, 3.0, 4.0, 5.0],
            &[7.0, 7.0, 7.0, 7.0],
            &[2.0, 2.0, 9.0, 1.0, 2.0, 9.0],
        ];
        for sample in samples {
            let n = sample.len() as f64;
            let total: f64 = rank(sample).iter().sum();
            assert_eq!(total, n * (n + 1.0) / 2.0, "sample {sample:?}");
        }
    }

    #[test]
    fn rank_all_tied_gets_mean_rank() {
        let ranks = rank(&[4.0; 5]);
        assert!(ranks.iter().all(|&r| r == 3.0), "ranks = {ranks:?}");
    }

    // -----------------------------------------------------------------------
    // Tie correction
    // -----------------------------------------------------------------------

    #[test]
    fn tie_correction_is_one_without_ties() {
        assert_eq!(tie_correction(&rank(&[3.0, 1.0, 4.0, 2.0])), 1.0);
    }

    #[test]
    fn tie_correction_all_tied_is_zero() {
        assert_eq!(tie_correction(&rank(&[5.0; 6])), 0.0);
    }

    #[test]
    fn tie_correction_partial_ties() {
        // one group of 2 ties among n = 4: 1 - (8-2)/(64-4) = 0.9
        let ranks = rank(&[1.0, 2.0, 2.0, 3.0]);
        assert!((tie_correction(&ranks) - 0.9).abs() < 1e-12);
    }
}
