//! The household: the unit every sub-model and every packet works on.

use ct_core::{
    Checkpoints, HouseholdId, RandomStream, RandomStreamManager, Stage, TodAlternatives, TourCategory,
    ZoneId,
};

use crate::person::Person;
use crate::tour::Tour;
use crate::{HouseholdError, HouseholdResult};

/// Address of one tour inside a household: `(person index, tour index)` for
/// individual tours, the joint tour index for joint tours.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TourKey {
    Work(usize, usize),
    School(usize, usize),
    NonMandatory(usize, usize),
    AtWork(usize, usize),
    Joint(usize),
}

impl TourKey {
    /// Index of the owning person, `None` for joint tours.
    pub fn person_index(self) -> Option<usize> {
        match self {
            TourKey::Work(p, _)
            | TourKey::School(p, _)
            | TourKey::NonMandatory(p, _)
            | TourKey::AtWork(p, _) => Some(p),
            TourKey::Joint(_) => None,
        }
    }
}

/// Household-level time-window summary used by the joint tour models.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct WindowSummary {
    pub max_adult_overlaps: u8,
    pub max_child_overlaps: u8,
    pub max_mixed_overlaps: u8,
    pub max_adult_window:   u8,
    pub max_child_window:   u8,
}

#[derive(Clone, Debug)]
pub struct Household {
    pub id:           HouseholdId,
    pub home_zone:    ZoneId,
    pub home_subzone: u8,
    pub income:       i32,
    pub persons:      Vec<Person>,
    pub joint_tours:  Vec<Tour>,
    pub autos:        Option<u8>,
    /// Log every choice made for this household.
    pub debug:        bool,
    pub rng:          RandomStream,
    pub checkpoints:  Checkpoints,
    pub windows:      WindowSummary,
}

impl Household {
    pub fn new(
        id:           HouseholdId,
        home_zone:    ZoneId,
        home_subzone: u8,
        income:       i32,
        streams:      &RandomStreamManager,
    ) -> Self {
        Self {
            id,
            home_zone,
            home_subzone,
            income,
            persons:     Vec::new(),
            joint_tours: Vec::new(),
            autos:       None,
            debug:       false,
            rng:         streams.stream_for(id),
            checkpoints: Checkpoints::default(),
            windows:     WindowSummary::default(),
        }
    }

    /// Append a person.  Person numbers must run 1, 2, 3, … in order.
    pub fn add_person(&mut self, person: Person) -> HouseholdResult<()> {
        let expected = self.persons.len() + 1;
        if person.household != self.id || person.num as usize != expected {
            return Err(HouseholdError::Inconsistent {
                household: self.id,
                detail:    format!(
                    "person {} (num {}, household {}) added as member {expected}",
                    person.id, person.num, person.household
                ),
            });
        }
        self.persons.push(person);
        Ok(())
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.persons.len()
    }

    /// Person by 1-based person number.
    pub fn person(&self, num: u8) -> Option<&Person> {
        self.persons.get((num as usize).checked_sub(1)?)
    }

    pub fn person_mut(&mut self, num: u8) -> Option<&mut Person> {
        self.persons.get_mut((num as usize).checked_sub(1)?)
    }

    pub fn has_children(&self) -> bool {
        self.persons.iter().any(|p| p.person_type.is_child())
    }

    pub fn num_workers(&self) -> usize {
        self.persons.iter().filter(|p| p.person_type.is_worker()).count()
    }

    /// Record the stream position reached after `stage`.
    #[inline]
    pub fn record_checkpoint(&mut self, stage: Stage) {
        self.checkpoints.set(stage, self.rng.count());
    }

    // ── Tours ─────────────────────────────────────────────────────────────

    /// Keys of every tour in `category`, person by person.  Mandatory keys
    /// list each person's tours in scheduling order (work first for workers).
    pub fn tour_keys(&self, category: TourCategory) -> Vec<TourKey> {
        let mut keys = Vec::new();
        if category == TourCategory::Joint {
            keys.extend((0..self.joint_tours.len()).map(TourKey::Joint));
            return keys;
        }
        for (p, person) in self.persons.iter().enumerate() {
            match category {
                TourCategory::Mandatory => {
                    let work = (0..person.work_tours.len()).map(|t| TourKey::Work(p, t));
                    let school = (0..person.school_tours.len()).map(|t| TourKey::School(p, t));
                    if person.schedules_work_first() {
                        keys.extend(work.chain(school));
                    } else {
                        keys.extend(school.chain(work));
                    }
                }
                TourCategory::IndividualNonMandatory => {
                    keys.extend((0..person.non_mandatory_tours.len()).map(|t| TourKey::NonMandatory(p, t)));
                }
                TourCategory::AtWork => {
                    keys.extend((0..person.at_work_subtours.len()).map(|t| TourKey::AtWork(p, t)));
                }
                TourCategory::Joint => {}
            }
        }
        keys
    }

    pub fn tour(&self, key: TourKey) -> Option<&Tour> {
        match key {
            TourKey::Work(p, t)         => self.persons.get(p)?.work_tours.get(t),
            TourKey::School(p, t)       => self.persons.get(p)?.school_tours.get(t),
            TourKey::NonMandatory(p, t) => self.persons.get(p)?.non_mandatory_tours.get(t),
            TourKey::AtWork(p, t)       => self.persons.get(p)?.at_work_subtours.get(t),
            TourKey::Joint(t)           => self.joint_tours.get(t),
        }
    }

    pub fn tour_mut(&mut self, key: TourKey) -> Option<&mut Tour> {
        match key {
            TourKey::Work(p, t)         => self.persons.get_mut(p)?.work_tours.get_mut(t),
            TourKey::School(p, t)       => self.persons.get_mut(p)?.school_tours.get_mut(t),
            TourKey::NonMandatory(p, t) => self.persons.get_mut(p)?.non_mandatory_tours.get_mut(t),
            TourKey::AtWork(p, t)       => self.persons.get_mut(p)?.at_work_subtours.get_mut(t),
            TourKey::Joint(t)           => self.joint_tours.get_mut(t),
        }
    }

    // ── Time windows ──────────────────────────────────────────────────────

    /// Free every person's whole day.
    pub fn initialize_windows(&mut self) {
        for p in &mut self.persons {
            p.window.reset_all();
        }
    }

    /// Claim a scheduled joint tour's hours on each participant.
    pub fn claim_joint_windows(&mut self) {
        for tour in &self.joint_tours {
            let Some((s, e)) = tour.hours else { continue };
            for &num in &tour.participants {
                if let Some(p) = self.persons.get_mut((num as usize).wrapping_sub(1)) {
                    p.window.claim(s, e);
                }
            }
        }
    }

    /// Clear every window and claim again the hours of all scheduled
    /// mandatory, joint and non-mandatory tours, in that order.
    pub fn rebuild_windows(&mut self) {
        self.initialize_windows();
        for p in &mut self.persons {
            p.claim_mandatory_windows();
        }
        self.claim_joint_windows();
        for p in &mut self.persons {
            let hours: Vec<(u8, u8)> = p.non_mandatory_tours.iter().filter_map(|t| t.hours).collect();
            for (s, e) in hours {
                p.window.claim(s, e);
            }
        }
        self.update_time_windows();
    }

    /// Recompute overlaps between members and each member's residual windows.
    pub fn update_time_windows(&mut self) {
        let mut summary = WindowSummary::default();
        let n = self.persons.len();
        let mut adult_overlaps = vec![0u8; n];
        let mut child_overlaps = vec![0u8; n];

        for p in 0..n {
            let p_adult = self.persons[p].person_type.is_adult();
            let avail = self.persons[p].window.available_hours() as u8;
            if p_adult {
                summary.max_adult_window = summary.max_adult_window.max(avail);
            } else {
                summary.max_child_window = summary.max_child_window.max(avail);
            }

            for q in (0..n).filter(|&q| q != p) {
                let q_adult = self.persons[q].person_type.is_adult();
                let overlaps = self.persons[p].window.overlap_hours(&self.persons[q].window) as u8;
                match (p_adult, q_adult) {
                    (true, true) => {
                        summary.max_adult_overlaps = summary.max_adult_overlaps.max(overlaps);
                        adult_overlaps[p] = adult_overlaps[p].max(overlaps);
                    }
                    (false, false) => {
                        summary.max_child_overlaps = summary.max_child_overlaps.max(overlaps);
                        child_overlaps[p] = child_overlaps[p].max(overlaps);
                    }
                    _ => summary.max_mixed_overlaps = summary.max_mixed_overlaps.max(overlaps),
                }
            }
        }

        for (i, person) in self.persons.iter_mut().enumerate() {
            person.max_adult_overlaps = adult_overlaps[i];
            person.max_child_overlaps = child_overlaps[i];
        }
        self.windows = summary;
        self.compute_residual_windows();
    }

    fn compute_residual_windows(&mut self) {
        for i in 0..self.persons.len() {
            let num = self.persons[i].num;
            let joint = self
                .joint_tours
                .iter()
                .filter(|t| t.has_participant(num))
                .filter_map(|t| t.hours);
            let person = &self.persons[i];
            let hours: Vec<(u8, u8)> = person
                .mandatory_tours()
                .filter_map(|t| t.hours)
                .chain(joint)
                .collect();
            let residual = crate::window::ResidualWindows::compute(&person.window, hours);
            self.persons[i].residual = residual;
        }
    }

    /// Alternatives open to every participant of joint tour `tour`.
    pub fn joint_availability(&self, tour: &Tour, alts: &TodAlternatives) -> Vec<bool> {
        let mut avail = vec![true; alts.len()];
        for &num in &tour.participants {
            let Some(p) = self.person(num) else { continue };
            for (a, ok) in p.window.availability(alts).into_iter().zip(avail.iter_mut()) {
                *ok &= a;
            }
        }
        avail
    }
}
