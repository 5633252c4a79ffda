//! Scaled size terms and shadow prices for the mandatory purposes.

use ct_choice::SizeTerms;
use ct_core::DcPurpose;
use log::info;
use serde::{Deserialize, Serialize};

use crate::{LocationTally, ShadowConfig};

/// Shadow pricing state of one mandatory purpose, one entry per
/// destination alternative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurposePrices {
    pub purpose:  DcPurpose,
    /// Whether prices move for this purpose.
    pub balanced: bool,
    /// Workers or students by home alternative.
    pub origins:  Vec<f64>,
    /// Size terms as given, before scaling.
    pub original: Vec<f64>,
    /// Size terms scaled to total the purpose's origins.  The target the
    /// realized destinations are pushed toward.
    pub scaled:   Vec<f64>,
    /// Size terms used by the previous iteration.
    pub previous: Vec<f64>,
    pub prices:   Vec<f64>,
}

impl PurposePrices {
    /// Size term used by the next pass: `scaled * price`, never negative.
    pub fn size(&self, alt: usize) -> f64 {
        (self.scaled[alt] * self.prices[alt]).max(0.0)
    }

    pub fn total_origins(&self) -> f64 {
        self.origins.iter().sum()
    }
}

/// Scaled size terms and prices for the seven mandatory purposes.
///
/// ```text
/// scaled  = size · Σorigins / Σsize          (0 when Σsize = 0)
/// price  *= scaled / modeled                 (only where modeled > 0)
/// size    = max(scaled · price, 0)
/// ```
///
/// Prices start at 1, so the first pass runs on the scaled sizes.
#[derive(Clone, Debug, PartialEq)]
pub struct ShadowPriceTable {
    num_alternatives: usize,
    purposes:         Vec<PurposePrices>,
}

impl ShadowPriceTable {
    /// Scale `sizes` to the origin totals.  Grade school is balanced only
    /// when configured.
    pub fn balance(sizes: &SizeTerms, origins: &LocationTally, config: &ShadowConfig) -> Self {
        let n = sizes.num_alternatives();
        let purposes = DcPurpose::MANDATORY
            .iter()
            .map(|&purpose| {
                let original = sizes.purpose(purpose).to_vec();
                let origins = origins.row(purpose, n);
                let total_origins: f64 = origins.iter().sum();
                let total_size: f64 = original.iter().sum();
                let scaled: Vec<f64> = original
                    .iter()
                    .map(|&s| if total_size > 0.0 { s * total_origins / total_size } else { 0.0 })
                    .collect();
                info!("{purpose}: {total_origins} origins, size {total_size:.2} scaled to {:.2}", scaled.iter().sum::<f64>());
                PurposePrices {
                    purpose,
                    balanced: purpose != DcPurpose::SchoolGrade || config.balance_grade_school,
                    origins,
                    original,
                    previous: scaled.clone(),
                    scaled,
                    prices: vec![1.0; n],
                }
            })
            .collect();
        Self { num_alternatives: n, purposes }
    }

    pub fn num_alternatives(&self) -> usize {
        self.num_alternatives
    }

    pub fn purposes(&self) -> &[PurposePrices] {
        &self.purposes
    }

    pub fn purpose(&self, purpose: DcPurpose) -> Option<&PurposePrices> {
        self.purposes.iter().find(|p| p.purpose == purpose)
    }

    pub(crate) fn purpose_mut(&mut self, purpose: DcPurpose) -> Option<&mut PurposePrices> {
        self.purposes.iter_mut().find(|p| p.purpose == purpose)
    }

    pub fn price(&self, purpose: DcPurpose, alt: usize) -> f64 {
        self.purpose(purpose).and_then(|p| p.prices.get(alt)).copied().unwrap_or(1.0)
    }

    /// Write the priced sizes into the mandatory rows of `sizes`.  Other
    /// purposes are left alone.
    pub fn apply(&self, sizes: &mut SizeTerms) {
        for p in &self.purposes {
            let row = sizes.purpose_mut(p.purpose);
            for (alt, slot) in row.iter_mut().enumerate().take(self.num_alternatives) {
                *slot = p.size(alt);
            }
        }
    }

    /// Move the prices of balanced purposes toward the scaled targets.
    /// Alternatives nobody chose keep their price.
    pub fn update_prices(&mut self, modeled: &LocationTally) {
        for p in self.purposes.iter_mut().filter(|p| p.balanced) {
            for alt in 0..self.num_alternatives {
                let m = modeled.get(p.purpose, alt);
                if m > 0.0 {
                    p.prices[alt] *= p.scaled[alt] / m;
                }
            }
        }
    }

    /// Remember the sizes just written out as the previous iteration's.
    pub fn roll_previous(&mut self) {
        for p in &mut self.purposes {
            p.previous = (0..self.num_alternatives).map(|alt| p.size(alt)).collect();
        }
    }

    /// Take scaled sizes and prices from a saved table, as they stood after
    /// its iteration.  Origins and original sizes stay those of this run.
    pub(crate) fn restore(&mut self, saved: &[PurposePrices]) {
        for s in saved {
            if let Some(p) = self.purpose_mut(s.purpose) {
                p.scaled = s.scaled.clone();
                p.prices = s.prices.clone();
            }
        }
        self.roll_previous();
    }
}
