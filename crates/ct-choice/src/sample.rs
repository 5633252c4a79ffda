//! Sample of alternatives for destination choice.
//!
//! Stage one evaluates a cheap model over every destination, caches its
//! probabilities per `(origin zone, purpose)`, and draws a fixed number of
//! alternatives with replacement from the household stream.  Stage two
//! evaluates the full model over the unique sampled alternatives only, each
//! carrying the correction `ln(frequency / probability)`.

use ct_core::{DcPurpose, RandomStream, ZoneId};
use rustc_hash::FxHashMap;

/// Stage-one probabilities plus their running sum.
#[derive(Clone, Debug, PartialEq)]
pub struct SoaProbabilities {
    probabilities: Vec<f64>,
    cumulative:    Vec<f64>,
}

impl SoaProbabilities {
    pub fn new(probabilities: Vec<f64>) -> Self {
        let cumulative = probabilities
            .iter()
            .scan(0.0, |acc, &p| {
                *acc += p;
                Some(*acc)
            })
            .collect();
        Self { probabilities, cumulative }
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.last().is_none_or(|&total| total <= 0.0)
    }

    /// Alternative selected by a uniform draw `rn`.  Zero-probability
    /// alternatives can never be selected.
    pub fn select(&self, rn: f64) -> Option<usize> {
        let total = *self.cumulative.last()?;
        if total <= 0.0 {
            return None;
        }
        let target = rn * total;
        let i = self.cumulative.partition_point(|&c| c <= target);
        if i < self.cumulative.len() {
            return Some(i);
        }
        // rn * total rounded up to the last partial sum
        self.probabilities.iter().rposition(|&p| p > 0.0)
    }

    /// Draw `size` alternatives with replacement, one stream draw each.
    pub fn draw(&self, size: usize, rng: &mut RandomStream) -> DestinationSample {
        let mut freq: FxHashMap<usize, u32> = FxHashMap::default();
        for _ in 0..size {
            if let Some(alt) = self.select(rng.draw()) {
                *freq.entry(alt).or_insert(0) += 1;
            }
        }
        let mut entries: Vec<(usize, u32)> = freq.into_iter().collect();
        entries.sort_unstable_by_key(|&(alt, _)| alt);

        let corrections = entries
            .iter()
            .map(|&(alt, f)| (f as f64 / self.probabilities[alt]).ln())
            .collect();
        let (alternatives, frequencies) = entries.into_iter().unzip();
        DestinationSample { alternatives, frequencies, corrections }
    }
}

/// Unique sampled alternatives in ascending order, their draw frequencies
/// and sampling corrections.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DestinationSample {
    pub alternatives: Vec<usize>,
    pub frequencies:  Vec<u32>,
    pub corrections:  Vec<f64>,
}

impl DestinationSample {
    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    /// Sample mask over the full alternative set.
    pub fn mask(&self, num_alternatives: usize) -> Vec<bool> {
        let mut mask = vec![false; num_alternatives];
        for &alt in &self.alternatives {
            if let Some(m) = mask.get_mut(alt) {
                *m = true;
            }
        }
        mask
    }

    /// `ln(size) + correction` for each sampled alternative, zero elsewhere.
    pub fn alt_terms(&self, sizes: &[f64]) -> Vec<f64> {
        let mut terms = vec![0.0; sizes.len()];
        for (&alt, &corr) in self.alternatives.iter().zip(&self.corrections) {
            if let (Some(t), Some(&s)) = (terms.get_mut(alt), sizes.get(alt)) {
                *t = s.ln() + corr;
            }
        }
        terms
    }
}

/// Stage-one term for every alternative: `ln(size)` where the size term is
/// positive, zero elsewhere (those alternatives are unavailable anyway).
pub fn log_size_terms(sizes: &[f64]) -> Vec<f64> {
    sizes.iter().map(|&s| if s > 0.0 { s.ln() } else { 0.0 }).collect()
}

// ── SoaCache ──────────────────────────────────────────────────────────────────

/// Per-worker cache of stage-one probabilities.  Cleared whenever the size
/// terms change.
#[derive(Debug, Default)]
pub struct SoaCache {
    tables:   FxHashMap<(ZoneId, DcPurpose), SoaProbabilities>,
    computed: u64,
}

impl SoaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, origin: ZoneId, purpose: DcPurpose) -> Option<&SoaProbabilities> {
        self.tables.get(&(origin, purpose))
    }

    pub fn insert(&mut self, origin: ZoneId, purpose: DcPurpose, probabilities: SoaProbabilities) {
        self.computed += 1;
        self.tables.insert((origin, purpose), probabilities);
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Tables computed since the worker started, across clears.
    pub fn computed(&self) -> u64 {
        self.computed
    }

    pub fn clear(&mut self) {
        self.tables.clear();
    }
}
