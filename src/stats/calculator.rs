//! Statistics Calculator Module
//! Descriptive statistics, binning, grouped means and correlation for chart data.

use chrono::{Datelike, NaiveDate};
use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::{BTreeMap, HashMap};

/// Whisker reach as a multiple of the interquartile range.
pub const WHISKER_IQR: f64 = 1.5;

/// Descriptive statistics for a set of values.
#[derive(Debug, Clone, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for DescriptiveStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// One equal-width histogram bin, `[start, end)` except the last which is closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Five-number summary plus outliers for a boxplot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// Handles statistical calculations over extracted column values.
pub struct StatsCalculator;

impl StatsCalculator {
    fn sorted(values: &[f64]) -> Vec<f64> {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        sorted
    }

    /// Arithmetic mean, NaN for empty input.
    pub fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return f64::NAN;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// Median, NaN for empty input.
    pub fn median(values: &[f64]) -> f64 {
        Self::percentile(&Self::sorted(values), 50.0)
    }

    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> DescriptiveStats {
        let n = values.len();
        if n == 0 {
            return DescriptiveStats::default();
        }

        let sorted = Self::sorted(values);
        let mean = Self::mean(values);
        let std = if n > 1 { values.iter().std_dev() } else { 0.0 };

        DescriptiveStats {
            count: n,
            mean,
            median: Self::percentile(&sorted, 50.0),
            std,
            min: sorted[0],
            max: sorted[n - 1],
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Split `[min, max]` of the values into `bins` equal-width bins.
    ///
    /// Empty input gives no bins; when every value is equal a single bin holds them all.
    pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bins == 0 {
            return Vec::new();
        }

        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if max == min {
            return vec![HistogramBin {
                start: min,
                end: max,
                count: finite.len(),
            }];
        }

        let width = (max - min) / bins as f64;
        let mut counts = vec![0usize; bins];
        for v in &finite {
            let idx = (((v - min) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                start: min + i as f64 * width,
                end: if i + 1 == bins {
                    max
                } else {
                    min + (i + 1) as f64 * width
                },
                count,
            })
            .collect()
    }

    /// Mean of `values` per key, sorted descending by mean (ties by key ascending).
    pub fn grouped_mean_desc(keys: &[String], values: &[f64]) -> Vec<(String, f64)> {
        let mut groups: HashMap<&str, (f64, usize)> = HashMap::new();
        for (key, &v) in keys.iter().zip(values) {
            let entry = groups.entry(key.as_str()).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }

        let mut means: Vec<(String, f64)> = groups
            .into_iter()
            .map(|(key, (sum, count))| (key.to_string(), sum / count as f64))
            .collect();

        means.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        means
    }

    /// Mean of `values` per calendar month in chronological order.
    ///
    /// Each month is keyed by its first day. Rows without a date are skipped.
    pub fn monthly_mean(dates: &[Option<NaiveDate>], values: &[f64]) -> Vec<(NaiveDate, f64)> {
        let mut months: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        for (date, &v) in dates.iter().zip(values) {
            let Some(date) = date else {
                continue;
            };
            let Some(month) = date.with_day(1) else {
                continue;
            };
            let entry = months.entry(month).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }

        months
            .into_iter()
            .map(|(month, (sum, count))| (month, sum / count as f64))
            .collect()
    }

    /// Pearson correlation coefficient; NaN with fewer than two pairs or zero variance.
    pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
        let n = x.len().min(y.len());
        if n < 2 {
            return f64::NAN;
        }
        let (x, y) = (&x[..n], &y[..n]);

        let sx = x.iter().std_dev();
        let sy = y.iter().std_dev();
        if sx == 0.0 || sy == 0.0 || !sx.is_finite() || !sy.is_finite() {
            return f64::NAN;
        }

        let r = x.iter().covariance(y.iter()) / (sx * sy);
        r.clamp(-1.0, 1.0)
    }

    /// Pairwise Pearson correlation of the given columns, computed in parallel.
    ///
    /// Each pair is computed once and mirrored, so the matrix is exactly
    /// symmetric. The diagonal is 1 for every column with non-zero variance.
    pub fn correlation_matrix(columns: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let n = columns.len();
        let pairs: Vec<(usize, usize, f64)> = (0..n)
            .into_par_iter()
            .flat_map_iter(|i| (i..n).map(move |j| (i, j)))
            .map(|(i, j)| {
                let r = Self::pearson(&columns[i], &columns[j]);
                if i == j && !r.is_nan() {
                    (i, j, 1.0)
                } else {
                    (i, j, r)
                }
            })
            .collect();

        let mut matrix = vec![vec![f64::NAN; n]; n];
        for (i, j, r) in pairs {
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
        matrix
    }

    /// Boxplot summary with linear quartiles and 1.5 IQR whiskers.
    pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }

        let sorted = Self::sorted(&finite);
        let q1 = Self::percentile(&sorted, 25.0);
        let median = Self::percentile(&sorted, 50.0);
        let q3 = Self::percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        let low_fence = q1 - WHISKER_IQR * iqr;
        let high_fence = q3 + WHISKER_IQR * iqr;

        let lower_whisker = sorted
            .iter()
            .copied()
            .find(|&v| v >= low_fence)
            .unwrap_or(q1);
        let upper_whisker = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_fence)
            .unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < low_fence || v > high_fence)
            .collect();

        Some(BoxSummary {
            count: sorted.len(),
            min: sorted[0],
            q1,
            median,
            q3,
            max: sorted[sorted.len() - 1],
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }
}
