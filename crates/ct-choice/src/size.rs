//! Destination size terms, one value per purpose and alternative.

use ct_core::DcPurpose;

/// Flat `[purpose][alternative]` table.  Read-only while a pass runs; the
/// shadow-price solver replaces the mandatory rows between passes.
#[derive(Clone, Debug, PartialEq)]
pub struct SizeTerms {
    num_alternatives: usize,
    values:           Vec<f64>,
}

impl SizeTerms {
    /// All zeros.
    pub fn new(num_alternatives: usize) -> Self {
        Self {
            num_alternatives,
            values: vec![0.0; num_alternatives * DcPurpose::COUNT],
        }
    }

    pub fn num_alternatives(&self) -> usize {
        self.num_alternatives
    }

    pub fn get(&self, purpose: DcPurpose, alt: usize) -> f64 {
        self.purpose(purpose).get(alt).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, purpose: DcPurpose, alt: usize, value: f64) {
        if let Some(v) = self.purpose_mut(purpose).get_mut(alt) {
            *v = value;
        }
    }

    pub fn purpose(&self, purpose: DcPurpose) -> &[f64] {
        let start = purpose.index() * self.num_alternatives;
        &self.values[start..start + self.num_alternatives]
    }

    pub fn purpose_mut(&mut self, purpose: DcPurpose) -> &mut [f64] {
        let start = purpose.index() * self.num_alternatives;
        &mut self.values[start..start + self.num_alternatives]
    }

    /// An alternative is available wherever its size term is positive.
    pub fn availability(&self, purpose: DcPurpose) -> Vec<bool> {
        self.purpose(purpose).iter().map(|&s| s > 0.0).collect()
    }

    /// Per-zone sums over the sub-zones; alternatives are laid out zone by
    /// zone with `num_subzones` entries each.
    pub fn zone_totals(&self, purpose: DcPurpose, num_subzones: usize) -> Vec<f64> {
        self.purpose(purpose).chunks(num_subzones.max(1)).map(|c| c.iter().sum()).collect()
    }

    pub fn total(&self, purpose: DcPurpose) -> f64 {
        self.purpose(purpose).iter().sum()
    }
}
