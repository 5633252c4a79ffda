//! Counting usual locations per (purpose, alternative).

use ct_choice::ZoneSystem;
use ct_core::DcPurpose;
use ct_household::{Household, Location};
use rustc_hash::FxHashMap;

/// Person counts keyed by mandatory purpose and destination alternative.
///
/// Tallies are built per packet right after the packet runs and merged by
/// addition afterwards, so the merged result does not depend on which
/// worker ran what or in which order packets finished.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocationTally {
    counts: FxHashMap<(DcPurpose, usize), f64>,
}

impl LocationTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Workers and students by purpose and home alternative.
    pub fn origins(households: &[Household], zones: &ZoneSystem) -> Self {
        let mut tally = Self::new();
        for hh in households {
            let home = zones.alternative(Location::new(hh.home_zone, hh.home_subzone));
            for person in &hh.persons {
                let Some(purpose) = DcPurpose::usual_location(person.person_type, hh.income) else { continue };
                if let Some(alt) = home {
                    tally.add(purpose, alt, 1.0);
                }
            }
        }
        tally
    }

    /// Chosen usual locations by purpose and destination alternative.
    /// Persons without a location are not counted.
    pub fn destinations(households: &[Household], zones: &ZoneSystem) -> Self {
        let mut tally = Self::new();
        for hh in households {
            for person in &hh.persons {
                let Some(purpose) = DcPurpose::usual_location(person.person_type, hh.income) else { continue };
                let location = if purpose.is_work() { person.work_location } else { person.school_location };
                if let Some(alt) = location.and_then(|l| zones.alternative(l)) {
                    tally.add(purpose, alt, 1.0);
                }
            }
        }
        tally
    }

    pub fn add(&mut self, purpose: DcPurpose, alt: usize, count: f64) {
        *self.counts.entry((purpose, alt)).or_insert(0.0) += count;
    }

    pub fn get(&self, purpose: DcPurpose, alt: usize) -> f64 {
        self.counts.get(&(purpose, alt)).copied().unwrap_or(0.0)
    }

    pub fn total(&self, purpose: DcPurpose) -> f64 {
        self.counts.iter().filter(|((p, _), _)| *p == purpose).map(|(_, c)| c).sum()
    }

    /// Dense `[alternative]` row for one purpose.
    pub fn row(&self, purpose: DcPurpose, num_alternatives: usize) -> Vec<f64> {
        let mut row = vec![0.0; num_alternatives];
        for (&(p, alt), &count) in &self.counts {
            if p == purpose {
                if let Some(slot) = row.get_mut(alt) {
                    *slot = count;
                }
            }
        }
        row
    }

    pub fn merge(&mut self, other: &LocationTally) {
        for (&key, &count) in &other.counts {
            *self.counts.entry(key).or_insert(0.0) += count;
        }
    }

    /// Merge a sequence of per-packet tallies.
    pub fn merged<'a>(tallies: impl IntoIterator<Item = &'a LocationTally>) -> Self {
        let mut out = Self::new();
        for t in tallies {
            out.merge(t);
        }
        out
    }
}
