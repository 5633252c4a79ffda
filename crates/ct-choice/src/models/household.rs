//! Household- and person-level long-term choices: auto ownership, free
//! parking at work and the coordinated daily activity pattern.

use ct_core::{PersonType, Stage};
use ct_household::{ActivityPattern, Household};

use crate::model::{Decider, choose};
use crate::{ChoiceContext, ChoiceResult, ChoiceSubModel, ModelPage};

// ── Auto ownership ────────────────────────────────────────────────────────────

/// Alternatives are 0, 1, 2, 3 and 4+ autos.
pub const AUTO_ALTERNATIVES: usize = 5;

pub struct AutoOwnership;

impl ChoiceSubModel for AutoOwnership {
    fn stage(&self) -> Stage {
        Stage::Ao
    }

    fn reset(&self, household: &mut Household) {
        household.autos = None;
    }

    fn apply(&self, household: &mut Household, cx: &mut ChoiceContext<'_>) -> ChoiceResult<()> {
        let page = ModelPage::new(Stage::Ao, 1);
        let alt = choose(household, cx, page, Decider::Household, &[true; AUTO_ALTERNATIVES])?;
        household.autos = Some(alt as u8);
        Ok(())
    }
}

// ── Free parking ──────────────────────────────────────────────────────────────

/// Choice values stored on the person.
pub const FREE_PARKING: u8 = 1;
pub const PAYS_TO_PARK: u8 = 2;

/// Whether a worker parks for free at a usual work location in a priced
/// parking zone.  Workers elsewhere make no choice.
pub struct FreeParking;

impl ChoiceSubModel for FreeParking {
    fn stage(&self) -> Stage {
        Stage::Fp
    }

    fn reset(&self, household: &mut Household) {
        for p in &mut household.persons {
            p.free_parking = None;
        }
    }

    fn apply(&self, household: &mut Household, cx: &mut ChoiceContext<'_>) -> ChoiceResult<()> {
        let page = ModelPage::new(Stage::Fp, 1);
        for p in 0..household.persons.len() {
            let person = &household.persons[p];
            let Some(work) = person.work_location else { continue };
            if !person.person_type.is_worker() || !cx.inputs.zones.is_parking_zone(work.zone) {
                continue;
            }
            let alt = choose(household, cx, page, Decider::Person(p), &[true; 2])?;
            household.persons[p].free_parking = Some(if alt == 0 { FREE_PARKING } else { PAYS_TO_PARK });
        }
        Ok(())
    }
}

// ── Coordinated daily activity pattern ───────────────────────────────────────

/// Members chosen jointly; anyone beyond gets an individual choice.
pub const CDAP_MAX_JOINT: usize = 5;

/// Page used for members beyond [`CDAP_MAX_JOINT`].
pub const CDAP_EXTRA_PERSON_PAGE: u16 = 0;

/// One joint choice over every pattern combination of the first
/// [`CDAP_MAX_JOINT`] members (page = number of members), then one
/// individual choice per remaining member.
///
/// Combination `a` gives member `j` (0-based, of `k`) the pattern
/// `ActivityPattern::ALL[(a / 3^(k-1-j)) % 3]`.
pub struct DailyActivityPattern;

fn pattern_allowed(person_type: PersonType, pattern: ActivityPattern) -> bool {
    pattern != ActivityPattern::Mandatory
        || !matches!(person_type, PersonType::NonWorker | PersonType::Retired)
}

/// Pattern of member `j` of `k` under combination `alt`.
pub fn combination_pattern(alt: usize, j: usize, k: usize) -> ActivityPattern {
    let place = 3usize.pow((k - 1 - j) as u32);
    ActivityPattern::ALL[(alt / place) % 3]
}

impl ChoiceSubModel for DailyActivityPattern {
    fn stage(&self) -> Stage {
        Stage::Cdap
    }

    fn reset(&self, household: &mut Household) {
        for p in &mut household.persons {
            p.activity_pattern = None;
        }
    }

    fn apply(&self, household: &mut Household, cx: &mut ChoiceContext<'_>) -> ChoiceResult<()> {
        let k = household.persons.len().min(CDAP_MAX_JOINT);
        if k == 0 {
            return Ok(());
        }

        let combinations = 3usize.pow(k as u32);
        let availability: Vec<bool> = (0..combinations)
            .map(|alt| {
                (0..k).all(|j| {
                    pattern_allowed(household.persons[j].person_type, combination_pattern(alt, j, k))
                })
            })
            .collect();
        let page = ModelPage::new(Stage::Cdap, k as u16);
        let alt = choose(household, cx, page, Decider::Household, &availability)?;
        for j in 0..k {
            household.persons[j].activity_pattern = Some(combination_pattern(alt, j, k));
        }

        let page = ModelPage::new(Stage::Cdap, CDAP_EXTRA_PERSON_PAGE);
        for p in k..household.persons.len() {
            let ptype = household.persons[p].person_type;
            let availability = ActivityPattern::ALL.map(|pattern| pattern_allowed(ptype, pattern));
            let alt = choose(household, cx, page, Decider::Person(p), &availability)?;
            household.persons[p].activity_pattern = Some(ActivityPattern::ALL[alt]);
        }
        Ok(())
    }
}
