//! The utility-expression engine seam.
//!
//! The equations themselves live outside this workspace.  A sub-model only
//! needs utilities for a set of alternatives; how they are computed from the
//! decision-making unit is the engine's business.

use std::fmt;

use ct_core::Stage;
use rustc_hash::FxHashMap;

use crate::Dmu;

/// One page of equations: the stage it belongs to plus a segment number
/// within that stage (purpose, person type, household size, …).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ModelPage {
    pub stage: Stage,
    pub page:  u16,
}

impl ModelPage {
    #[inline]
    pub const fn new(stage: Stage, page: u16) -> Self {
        Self { stage, page }
    }
}

impl fmt::Display for ModelPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.stage, self.page)
    }
}

/// Computes alternative utilities for one decision.
///
/// `availability` has one entry per alternative and fixes the length of the
/// returned vector.  `sample`, when present, restricts the evaluation to the
/// alternatives drawn by a sample-of-alternatives step; utilities of
/// unavailable or unsampled alternatives are ignored by the caller.
///
/// An engine instance belongs to exactly one worker and may keep caches,
/// hence `&mut self`.  It must be `Send` so a worker thread can own it.
pub trait UtilityEngine: Send {
    fn compute_utilities(
        &mut self,
        page:         ModelPage,
        dmu:          &Dmu<'_>,
        availability: &[bool],
        sample:       Option<&[bool]>,
    ) -> Vec<f64>;

    /// Inputs derived from size terms changed (a new shadow-price
    /// iteration).  Drop anything cached from them.
    ///
    /// Default: nothing cached, nothing to do.
    fn reset(&mut self) {}
}

// ── TableEngine ───────────────────────────────────────────────────────────────

/// A table-driven engine: utility = per-page constant for the alternative
/// plus the DMU's additive per-alternative term.
///
/// Pages without a table give every alternative a constant of zero, so an
/// empty `TableEngine` chooses uniformly among available alternatives (or in
/// proportion to size in destination choice).  Used by tests and the demo
/// binary in place of a real equation engine.
#[derive(Clone, Debug, Default)]
pub struct TableEngine {
    tables: FxHashMap<ModelPage, Vec<f64>>,
    calls:  u64,
    resets: u64,
}

impl TableEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: ModelPage, constants: Vec<f64>) -> Self {
        self.set_page(page, constants);
        self
    }

    pub fn set_page(&mut self, page: ModelPage, constants: Vec<f64>) {
        self.tables.insert(page, constants);
    }

    /// Number of `compute_utilities` calls so far.
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Number of `reset` calls so far.
    pub fn resets(&self) -> u64 {
        self.resets
    }
}

impl UtilityEngine for TableEngine {
    fn compute_utilities(
        &mut self,
        page:         ModelPage,
        dmu:          &Dmu<'_>,
        availability: &[bool],
        _sample:      Option<&[bool]>,
    ) -> Vec<f64> {
        self.calls += 1;
        let table = self.tables.get(&page);
        (0..availability.len())
            .map(|alt| {
                let constant = table.and_then(|t| t.get(alt)).copied().unwrap_or(0.0);
                constant + dmu.alt_terms.get(alt).copied().unwrap_or(0.0)
            })
            .collect()
    }

    fn reset(&mut self) {
        self.resets += 1;
    }
}
