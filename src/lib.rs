//! # veristat
//!
//! The statistical computation engine behind a desktop statistics
//! application: classical hypothesis tests, descriptive statistics,
//! rank-based nonparametric methods, and the numerically delicate
//! special functions (incomplete beta, log-gamma, normal and
//! chi-square tails) their p-values are built from.
//!
//! This crate is a pure computation library — no persistence, no I/O,
//! no UI. Callers hand in plain numeric sequences with labels and get
//! back one immutable result record or one typed error per call.
//!
//! ## Modules
//!
//! - [`testing`] — Hypothesis tests (t-tests, ANOVA, Mann-Whitney,
//!   Wilcoxon, Kruskal-Wallis, chi-square, normality, O'Brien)
//! - [`correlation`] — Pearson and Spearman correlation
//! - [`descriptive`] — Means, variances, CIs, quartiles, modes,
//!   frequency tables, summary rows
//! - [`ranking`] — Shell sort, average-rank assignment, tie correction
//! - [`special`] — Log-gamma, incomplete beta, normal/chi-square/F
//!   tail probabilities
//! - [`histogram`] — "Nice" bin selection, bin counting, sawtooth
//!   repair
//! - [`precision`] — Standard vs. high-precision arithmetic modes
//! - [`error`] — The typed error taxonomy
//!
//! ## Design
//!
//! - **Two arithmetic regimes**: every moment-based kernel is generic
//!   over [`precision::Scalar`], so a call runs end-to-end in `f64` or
//!   end-to-end in 60-digit decimal — never a mix. The dynamic
//!   [`precision::Num`] boundary value refuses cross-mode arithmetic
//!   with a typed error.
//! - **Pure and reentrant**: no shared mutable state, no caches;
//!   identical inputs give identical results on every call.
//! - **Typed failures only**: a test either returns a fully-populated
//!   record or one [`error::StatsError`] kind — never a silent NaN.

pub mod correlation;
pub mod descriptive;
pub mod error;
pub mod histogram;
pub mod precision;
pub mod ranking;
pub mod special;
pub mod testing;
