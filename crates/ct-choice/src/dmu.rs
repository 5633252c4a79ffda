//! Decision-making unit: everything an engine may read for one decision.

use ct_core::ZoneId;
use ct_household::{Household, Person, Tour};

/// Where a tour sits among the tours a person schedules in one model.
///
/// A lone tour is neither first nor subsequent.  With several tours the
/// first one scheduled is `first_tour`, every later one is
/// `subsequent_tour` and sees the end hour of the tour scheduled before it.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TourContext {
    pub first_tour:         bool,
    pub subsequent_tour:    bool,
    pub tour_number:        u8,
    pub preceding_end_hour: Option<u8>,
}

impl Default for TourContext {
    fn default() -> Self {
        Self {
            first_tour:         false,
            subsequent_tour:    false,
            tour_number:        1,
            preceding_end_hour: None,
        }
    }
}

impl TourContext {
    /// Context for the tour at `position` (0-based) of `count` tours,
    /// following a tour that ended at `preceding_end_hour`.
    pub fn sequence(position: usize, count: usize, preceding_end_hour: Option<u8>) -> Self {
        if count <= 1 {
            return Self::default();
        }
        Self {
            first_tour:         position == 0,
            subsequent_tour:    position > 0,
            tour_number:        position as u8 + 1,
            preceding_end_hour: if position > 0 { preceding_end_hour } else { None },
        }
    }
}

#[derive(Clone, Debug)]
pub struct Dmu<'a> {
    pub household:   &'a Household,
    pub person:      Option<&'a Person>,
    pub tour:        Option<&'a Tour>,
    pub origin:      ZoneId,
    pub destination: ZoneId,
    pub context:     TourContext,
    /// Additive per-alternative terms supplied by the sub-model; in
    /// destination choice the log size term plus the sampling correction.
    pub alt_terms:   &'a [f64],
}

impl<'a> Dmu<'a> {
    /// Household-level unit, origin at home.
    pub fn household(household: &'a Household) -> Self {
        Self {
            household,
            person:      None,
            tour:        None,
            origin:      household.home_zone,
            destination: ZoneId::INVALID,
            context:     TourContext::default(),
            alt_terms:   &[],
        }
    }

    pub fn with_person(mut self, person: &'a Person) -> Self {
        self.person = Some(person);
        self
    }

    /// Also takes the tour's origin and destination.
    pub fn with_tour(mut self, tour: &'a Tour) -> Self {
        self.tour = Some(tour);
        self.origin = tour.origin;
        self.destination = tour.destination_zone().unwrap_or(ZoneId::INVALID);
        self
    }

    pub fn with_origin(mut self, origin: ZoneId) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_context(mut self, context: TourContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_alt_terms(mut self, alt_terms: &'a [f64]) -> Self {
        self.alt_terms = alt_terms;
        self
    }
}
