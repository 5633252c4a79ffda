//! Household members.

use ct_core::{HouseholdId, PersonId, PersonType, TourPurpose};

use crate::tour::{Location, Tour};
use crate::window::{ResidualWindows, TimeWindow};

/// Coordinated daily activity pattern.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ActivityPattern {
    Mandatory,
    NonMandatory,
    Home,
}

impl ActivityPattern {
    pub const ALL: [ActivityPattern; 3] = [
        ActivityPattern::Mandatory,
        ActivityPattern::NonMandatory,
        ActivityPattern::Home,
    ];

    pub fn code(self) -> char {
        match self {
            ActivityPattern::Mandatory    => 'M',
            ActivityPattern::NonMandatory => 'N',
            ActivityPattern::Home         => 'H',
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Person {
    pub id:                  PersonId,
    /// Owning household.  Persons never hold the household itself.
    pub household:           HouseholdId,
    /// 1-based position within the household.
    pub num:                 u8,
    pub person_type:         PersonType,
    pub age:                 u8,
    pub employment_category: u8,
    pub student_category:    u8,
    pub window:              TimeWindow,

    pub work_location:       Option<Location>,
    pub school_location:     Option<Location>,
    pub free_parking:        Option<u8>,
    pub activity_pattern:    Option<ActivityPattern>,

    pub work_tours:          Vec<Tour>,
    pub school_tours:        Vec<Tour>,
    pub non_mandatory_tours: Vec<Tour>,
    pub at_work_subtours:    Vec<Tour>,

    /// Set by [`Household::update_time_windows`][crate::Household::update_time_windows].
    pub max_adult_overlaps:  u8,
    pub max_child_overlaps:  u8,
    pub residual:            ResidualWindows,
}

impl Person {
    pub fn new(id: PersonId, household: HouseholdId, num: u8, person_type: PersonType, age: u8) -> Self {
        Self {
            id,
            household,
            num,
            person_type,
            age,
            employment_category: 0,
            student_category:    0,
            window:              TimeWindow::new(),
            work_location:       None,
            school_location:     None,
            free_parking:        None,
            activity_pattern:    None,
            work_tours:          Vec::new(),
            school_tours:        Vec::new(),
            non_mandatory_tours: Vec::new(),
            at_work_subtours:    Vec::new(),
            max_adult_overlaps:  0,
            max_child_overlaps:  0,
            residual:            ResidualWindows::default(),
        }
    }

    /// Location a mandatory tour of `purpose` heads to.
    pub fn usual_location(&self, purpose: TourPurpose) -> Option<Location> {
        match purpose {
            TourPurpose::Work => self.work_location,
            TourPurpose::University | TourPurpose::School => self.school_location,
            _ => None,
        }
    }

    pub fn mandatory_tours(&self) -> impl Iterator<Item = &Tour> {
        self.work_tours.iter().chain(&self.school_tours)
    }

    /// Work tours first for workers, school tours first for everyone else.
    /// Time of day is chosen in this order.
    pub fn schedules_work_first(&self) -> bool {
        self.person_type.is_worker()
    }

    /// Re-apply the windows of every scheduled work and school tour.
    pub fn claim_mandatory_windows(&mut self) {
        let hours: Vec<(u8, u8)> = self.mandatory_tours().filter_map(|t| t.hours).collect();
        for (s, e) in hours {
            self.window.claim(s, e);
        }
    }

    pub fn all_tours(&self) -> impl Iterator<Item = &Tour> {
        self.work_tours
            .iter()
            .chain(&self.school_tours)
            .chain(&self.non_mandatory_tours)
            .chain(&self.at_work_subtours)
    }

    pub fn all_tours_mut(&mut self) -> impl Iterator<Item = &mut Tour> {
        self.work_tours
            .iter_mut()
            .chain(&mut self.school_tours)
            .chain(&mut self.non_mandatory_tours)
            .chain(&mut self.at_work_subtours)
    }
}
