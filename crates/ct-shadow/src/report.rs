//! How far realized destinations are from the scaled size targets.

use ct_core::DcPurpose;
use log::info;
use serde::{Deserialize, Serialize};

use crate::{LocationTally, ShadowPriceTable};

/// Upper bounds of the size ranges; each range excludes its lower bound.
pub const SIZE_LIMITS: [f64; 4] = [10.0, 100.0, 1000.0, f64::INFINITY];

/// Upper bounds (exclusive) of the relative difference buckets.
pub const DELTA_LIMITS: [f64; 6] = [0.05, 0.10, 0.25, 0.50, 1.0, f64::INFINITY];

/// Column 0 counts alternatives with size but no realized destination;
/// columns `1..` follow [`DELTA_LIMITS`].
pub type Frequencies = [u64; DELTA_LIMITS.len() + 1];

/// Counts for alternatives whose scaled size falls in one range.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeReport {
    /// Exclusive lower bound.
    pub lower:        f64,
    /// Inclusive upper bound.
    pub upper:        f64,
    pub purposes:     Vec<(DcPurpose, Frequencies)>,
    pub observations: u64,
    sse:              f64,
    sum_observed:     f64,
}

impl RangeReport {
    pub fn totals(&self) -> Frequencies {
        let mut out = [0; DELTA_LIMITS.len() + 1];
        for (_, f) in &self.purposes {
            for (o, v) in out.iter_mut().zip(f) {
                *o += v;
            }
        }
        out
    }

    /// Alternatives with a positive target but nothing realized.
    pub fn zero_destinations(&self) -> u64 {
        self.totals()[0]
    }

    /// Percent root mean square error, `None` with fewer than two
    /// observations.
    pub fn percent_rmse(&self) -> Option<f64> {
        if self.observations < 2 {
            return None;
        }
        let n = self.observations as f64;
        Some(100.0 * (self.sse / (n - 1.0)).sqrt() / (self.sum_observed / n))
    }

    pub fn mean_size(&self) -> Option<f64> {
        (self.observations > 0).then(|| self.sum_observed / self.observations as f64)
    }
}

/// Largest gaps between realized destinations and scaled sizes for one
/// purpose.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurposeDiff {
    pub purpose:      DcPurpose,
    /// `max |modeled - scaled|` over every alternative.
    pub max_abs_diff: f64,
    /// `max |modeled - scaled| / scaled` over alternatives with a positive
    /// target; zero when there are none.
    pub max_rel_diff: f64,
}

impl PurposeDiff {
    /// One entry per mandatory purpose of `table`, in table order.
    pub fn compute_all(table: &ShadowPriceTable, modeled: &LocationTally) -> Vec<Self> {
        table
            .purposes()
            .iter()
            .map(|p| {
                let mut diff = Self { purpose: p.purpose, max_abs_diff: 0.0, max_rel_diff: 0.0 };
                for (alt, &target) in p.scaled.iter().enumerate() {
                    let abs = (modeled.get(p.purpose, alt) - target).abs();
                    diff.max_abs_diff = diff.max_abs_diff.max(abs);
                    if target > 0.0 {
                        diff.max_rel_diff = diff.max_rel_diff.max(abs / target);
                    }
                }
                diff
            })
            .collect()
    }
}

/// One report per shadow pricing iteration.
#[derive(Clone, Debug, PartialEq)]
pub struct MaxDiffReport {
    pub iteration: u32,
    pub ranges:    Vec<RangeReport>,
    pub purposes:  Vec<PurposeDiff>,
}

impl MaxDiffReport {
    /// Compare `modeled` against the scaled sizes of every mandatory
    /// purpose, balanced or not.
    pub fn compute(iteration: u32, table: &ShadowPriceTable, modeled: &LocationTally) -> Self {
        let mut ranges = Vec::with_capacity(SIZE_LIMITS.len());
        let mut lower = 0.0;
        for &upper in &SIZE_LIMITS {
            let mut range = RangeReport {
                lower,
                upper,
                purposes: Vec::with_capacity(table.purposes().len()),
                observations: 0,
                sse: 0.0,
                sum_observed: 0.0,
            };
            for p in table.purposes() {
                let mut freq: Frequencies = [0; DELTA_LIMITS.len() + 1];
                for (alt, &target) in p.scaled.iter().enumerate() {
                    if !(target > lower && target <= upper) {
                        continue;
                    }
                    let m = modeled.get(p.purpose, alt);
                    if m == 0.0 {
                        freq[0] += 1;
                        range.sse += target * target;
                    } else {
                        let rel = (target - m).abs() / target;
                        if let Some(bucket) = DELTA_LIMITS.iter().position(|&d| rel < d) {
                            freq[bucket + 1] += 1;
                        }
                        range.sse += rel * rel;
                    }
                    range.sum_observed += target;
                    range.observations += 1;
                }
                range.purposes.push((p.purpose, freq));
            }
            ranges.push(range);
            lower = upper;
        }
        Self { iteration, ranges, purposes: PurposeDiff::compute_all(table, modeled) }
    }

    pub fn log(&self) {
        info!("shadow price iteration {}", self.iteration);
        for range in &self.ranges {
            let bound = if range.upper.is_finite() { format!("{:.1}", range.upper) } else { "+Inf".into() };
            info!("chosen locations with non-zero size <= {bound} by relative error");
            info!(
                "{:<24} {:>15} {:>15} {:>15} {:>15} {:>15} {:>15} {:>15} {:>8}",
                "purpose", "0 DCs", "< 5%", "< 10%", "< 25%", "< 50%", "< 100%", "100% +", "Total"
            );
            for (purpose, freq) in &range.purposes {
                info!("{}", row(purpose.label(), freq));
            }
            info!("{}", row("Total", &range.totals()));
            match (range.percent_rmse(), range.mean_size()) {
                (Some(rmse), Some(mean)) => info!(
                    "%RMSE = {rmse:.1}, with mean {mean:.1}, for {} observations",
                    range.observations
                ),
                _ => info!("%RMSE = N/A, no observations"),
            }
        }
        info!("{:<24} {:>15} {:>15}", "purpose", "max abs diff", "max rel diff");
        for d in &self.purposes {
            info!("{:<24} {:>15.2} {:>15.4}", d.purpose.label(), d.max_abs_diff, d.max_rel_diff);
        }
    }
}

fn row(label: &str, freq: &Frequencies) -> String {
    let total: u64 = freq.iter().sum();
    let mut out = format!("{label:<24}");
    for &f in freq {
        let pct = if total > 0 { 100.0 * f as f64 / total as f64 } else { 0.0 };
        out.push_str(&format!(" {f:>6} ({pct:>5.1}%)"));
    }
    out.push_str(&format!(" {total:>8}"));
    out
}
