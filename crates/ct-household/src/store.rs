//! `HouseholdStore`: the whole synthetic population in one `Vec`.
//!
//! Packets are index ranges into this store.  The parallel executors need a
//! `&mut` slice per packet at the same time; [`HouseholdStore::split_mut`]
//! hands those out with `split_at_mut`, so each household is reachable from
//! exactly one slice and no two workers can ever touch the same household.

use std::ops::Range;

use ct_core::HouseholdId;

use crate::{Household, HouseholdError, HouseholdResult};

#[derive(Clone, Debug, Default)]
pub struct HouseholdStore {
    households: Vec<Household>,
}

impl HouseholdStore {
    pub fn new(households: Vec<Household>) -> Self {
        Self { households }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.households.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.households.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Household> {
        self.households.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Household> {
        self.households.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Household> {
        self.households.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Household> {
        self.households.iter_mut()
    }

    pub fn as_slice(&self) -> &[Household] {
        &self.households
    }

    pub fn as_mut_slice(&mut self) -> &mut [Household] {
        &mut self.households
    }

    /// Store position of the household with `id` (linear scan).
    pub fn position(&self, id: HouseholdId) -> Option<usize> {
        self.households.iter().position(|h| h.id == id)
    }

    /// Total persons across all households.
    pub fn person_count(&self) -> usize {
        self.households.iter().map(Household::size).sum()
    }

    /// Disjoint mutable slices, one per range.
    ///
    /// # Errors
    /// [`HouseholdError::BadRanges`] unless `ranges` are ascending,
    /// non-overlapping and inside the store.  Gaps are allowed.
    pub fn split_mut(&mut self, ranges: &[Range<usize>]) -> HouseholdResult<Vec<&mut [Household]>> {
        let len = self.households.len();
        let mut out = Vec::with_capacity(ranges.len());
        let mut rest: &mut [Household] = &mut self.households;
        let mut consumed = 0;

        for r in ranges {
            if r.start < consumed || r.start > r.end || r.end > len {
                return Err(HouseholdError::BadRanges {
                    len,
                    detail: format!("{r:?} after offset {consumed}"),
                });
            }
            let (_, tail) = std::mem::take(&mut rest).split_at_mut(r.start - consumed);
            let (chunk, tail) = tail.split_at_mut(r.end - r.start);
            out.push(chunk);
            rest = tail;
            consumed = r.end;
        }
        Ok(out)
    }
}

impl FromIterator<Household> for HouseholdStore {
    fn from_iter<I: IntoIterator<Item = Household>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
