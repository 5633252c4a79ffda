//! Tour frequency models: how many tours of which purpose get generated.
//! Tours are created here with their origin (and, for mandatory tours, the
//! usual location as destination); later stages fill in the rest.

use ct_core::{PersonType, Stage, TourCategory, TourPurpose};
use ct_household::{ActivityPattern, Household, JointComposition, Person, Tour, TourKey};
use log::debug;

use crate::model::{Decider, choose};
use crate::{ChoiceContext, ChoiceError, ChoiceResult, ChoiceSubModel, JointIneligible, ModelPage};

// ── Individual mandatory ──────────────────────────────────────────────────────

/// `(work tours, school tours)` per alternative.
pub const MANDATORY_ALTERNATIVES: [(u8, u8); 5] = [(1, 0), (2, 0), (0, 1), (0, 2), (1, 1)];

/// Applies to everyone with a mandatory daily pattern.
pub struct MandatoryTourFrequency;

fn works(person: &Person) -> bool {
    person.person_type.is_worker() || matches!(person.employment_category, 1 | 2)
}

fn studies(person: &Person) -> bool {
    person.person_type.is_student() || matches!(person.student_category, 1 | 2)
}

fn school_purpose(person: &Person) -> TourPurpose {
    match person.person_type {
        PersonType::University => TourPurpose::University,
        t if !t.is_student() && person.student_category == 2 => TourPurpose::University,
        _ => TourPurpose::School,
    }
}

impl ChoiceSubModel for MandatoryTourFrequency {
    fn stage(&self) -> Stage {
        Stage::Imtf
    }

    fn reset(&self, household: &mut Household) {
        for p in &mut household.persons {
            p.work_tours.clear();
            p.school_tours.clear();
        }
    }

    fn apply(&self, household: &mut Household, cx: &mut ChoiceContext<'_>) -> ChoiceResult<()> {
        let page = ModelPage::new(Stage::Imtf, 1);
        let home = household.home_zone;
        for p in 0..household.persons.len() {
            let person = &household.persons[p];
            if person.activity_pattern != Some(ActivityPattern::Mandatory) {
                continue;
            }
            let (w, s) = (works(person), studies(person));
            let availability = MANDATORY_ALTERNATIVES.map(|(nw, ns)| (nw == 0 || w) && (ns == 0 || s));
            if !availability.contains(&true) {
                debug!("{}: person {} has a mandatory pattern but neither works nor studies", household.id, person.num);
                continue;
            }

            let alt = choose(household, cx, page, Decider::Person(p), &availability)?;
            let (n_work, n_school) = MANDATORY_ALTERNATIVES[alt];
            let person = &mut household.persons[p];
            let school = school_purpose(person);
            for i in 0..n_work {
                let mut tour = Tour::new(i as u16, TourCategory::Mandatory, TourPurpose::Work, person.num, home);
                tour.destination = person.usual_location(TourPurpose::Work);
                person.work_tours.push(tour);
            }
            for i in 0..n_school {
                let mut tour = Tour::new(i as u16, TourCategory::Mandatory, school, person.num, home);
                tour.destination = person.usual_location(school);
                person.school_tours.push(tour);
            }
        }
        Ok(())
    }
}

// ── Joint ─────────────────────────────────────────────────────────────────────

/// Participation draws allowed per joint tour before giving up.
pub const MAX_PARTY_DRAWS: u32 = 1000;

/// Joint tour purpose lists, one per alternative: none, each single purpose,
/// then every unordered pair of purposes.
pub fn joint_tour_alternatives() -> Vec<Vec<TourPurpose>> {
    let purposes = TourPurpose::JOINT;
    let mut alts = vec![Vec::new()];
    alts.extend(purposes.iter().map(|&p| vec![p]));
    for i in 0..purposes.len() {
        for j in i..purposes.len() {
            alts.push(vec![purposes[i], purposes[j]]);
        }
    }
    alts
}

/// Frequency, then party composition, then person-by-person participation
/// for each generated tour.  Participation is drawn again until the party
/// is consistent with the composition.
pub struct JointTourFrequency;

fn leaves_home(person: &Person) -> bool {
    matches!(
        person.activity_pattern,
        Some(ActivityPattern::Mandatory | ActivityPattern::NonMandatory)
    )
}

fn eligibility(household: &Household) -> Result<(), JointIneligible> {
    if household.size() == 1 {
        return Err(JointIneligible::OnePerson);
    }
    let out: Vec<&Person> = household.persons.iter().filter(|p| leaves_home(p)).collect();
    if out.len() < 2 {
        return Err(JointIneligible::FewerThanTwoLeaveHome);
    }
    if out.iter().all(|p| p.person_type == PersonType::Preschool) {
        return Err(JointIneligible::OnlyPreschoolersLeaveHome);
    }
    Ok(())
}

fn party_is_valid(household: &Household, party: &[u8], composition: JointComposition) -> bool {
    if party.len() < 2 {
        return false;
    }
    let adults = party
        .iter()
        .filter(|&&n| household.person(n).is_some_and(|p| p.person_type.is_adult()))
        .count();
    let children = party.len() - adults;
    match composition {
        JointComposition::Adults   => children == 0,
        JointComposition::Children => adults == 0,
        JointComposition::Mixed    => adults > 0 && children > 0,
    }
}

impl JointTourFrequency {
    const COMPOSITIONS: [JointComposition; 3] =
        [JointComposition::Adults, JointComposition::Children, JointComposition::Mixed];

    fn choose_party(
        household:   &mut Household,
        cx:          &mut ChoiceContext<'_>,
        composition: JointComposition,
    ) -> ChoiceResult<Vec<u8>> {
        let page = ModelPage::new(Stage::Jtf, 3);
        let eligible: Vec<usize> = (0..household.persons.len())
            .filter(|&p| {
                let person = &household.persons[p];
                leaves_home(person)
                    && match composition {
                        JointComposition::Adults   => person.person_type.is_adult(),
                        JointComposition::Children => person.person_type.is_child(),
                        JointComposition::Mixed    => true,
                    }
            })
            .collect();

        for _ in 0..MAX_PARTY_DRAWS {
            let mut party = Vec::new();
            for &p in &eligible {
                if choose(household, cx, page, Decider::Person(p), &[true; 2])? == 0 {
                    party.push(household.persons[p].num);
                }
            }
            if party_is_valid(household, &party, composition) {
                return Ok(party);
            }
            cx.diagnostics.party_redraws += 1;
        }
        Err(ChoiceError::NoAlternatives { stage: Stage::Jtf, household: household.id })
    }
}

impl ChoiceSubModel for JointTourFrequency {
    fn stage(&self) -> Stage {
        Stage::Jtf
    }

    fn reset(&self, household: &mut Household) {
        household.joint_tours.clear();
    }

    fn apply(&self, household: &mut Household, cx: &mut ChoiceContext<'_>) -> ChoiceResult<()> {
        if let Err(reason) = eligibility(household) {
            cx.diagnostics.joint_ineligible(reason);
            return Ok(());
        }
        household.update_time_windows();

        let alternatives = joint_tour_alternatives();
        let page = ModelPage::new(Stage::Jtf, 1);
        let alt = choose(household, cx, page, Decider::Household, &vec![true; alternatives.len()])?;

        let home = household.home_zone;
        for (i, &purpose) in alternatives[alt].iter().enumerate() {
            let out = household.persons.iter().filter(|p| leaves_home(p));
            let (adults, children) = out.fold((0, 0), |(a, c), p| {
                if p.person_type.is_adult() { (a + 1, c) } else { (a, c + 1) }
            });
            let availability = [adults >= 2, children >= 2, adults >= 1 && children >= 1];

            let index = household.joint_tours.len();
            household.joint_tours.push(Tour::new(i as u16, TourCategory::Joint, purpose, 0, home));
            let page = ModelPage::new(Stage::Jtf, 2);
            let comp = choose(household, cx, page, Decider::Tour(TourKey::Joint(index)), &availability)?;
            let composition = Self::COMPOSITIONS[comp];

            let party = Self::choose_party(household, cx, composition)?;
            let tour = &mut household.joint_tours[index];
            tour.person_num = party[0];
            tour.participants = party;
            tour.composition = Some(composition);
        }
        Ok(())
    }
}

// ── Individual non-mandatory ──────────────────────────────────────────────────

/// Most tours per purpose, in [`TourPurpose::NON_MANDATORY`] order.
pub const NON_MANDATORY_MAX: [u8; 6] = [2, 2, 1, 1, 1, 1];

/// Every combination of per-purpose tour counts.  The first purpose varies
/// slowest; alternative 0 is "no tours".
pub fn non_mandatory_alternatives() -> Vec<[u8; 6]> {
    let mut alts = vec![[0u8; 6]];
    for (i, &max) in NON_MANDATORY_MAX.iter().enumerate() {
        alts = alts
            .into_iter()
            .flat_map(|counts| {
                (0..=max).map(move |n| {
                    let mut c = counts;
                    c[i] = n;
                    c
                })
            })
            .collect();
    }
    alts
}

/// One choice per person who leaves home, on the page of their person type.
pub struct NonMandatoryTourFrequency;

impl ChoiceSubModel for NonMandatoryTourFrequency {
    fn stage(&self) -> Stage {
        Stage::Inmtf
    }

    fn reset(&self, household: &mut Household) {
        for p in &mut household.persons {
            p.non_mandatory_tours.clear();
        }
    }

    fn apply(&self, household: &mut Household, cx: &mut ChoiceContext<'_>) -> ChoiceResult<()> {
        household.update_time_windows();
        let alternatives = non_mandatory_alternatives();
        let availability = vec![true; alternatives.len()];
        let home = household.home_zone;

        for p in 0..household.persons.len() {
            if !leaves_home(&household.persons[p]) {
                continue;
            }
            let page = ModelPage::new(Stage::Inmtf, household.persons[p].person_type.code() as u16);
            let alt = choose(household, cx, page, Decider::Person(p), &availability)?;

            let person = &mut household.persons[p];
            for (&purpose, &count) in TourPurpose::NON_MANDATORY.iter().zip(&alternatives[alt]) {
                for _ in 0..count {
                    let id = person.non_mandatory_tours.len() as u16;
                    let tour = Tour::new(id, TourCategory::IndividualNonMandatory, purpose, person.num, home);
                    person.non_mandatory_tours.push(tour);
                }
            }
        }
        Ok(())
    }
}

// ── At-work subtours ──────────────────────────────────────────────────────────

pub const AT_WORK_ALTERNATIVES: [&[TourPurpose]; 6] = [
    &[],
    &[TourPurpose::AtWorkEat],
    &[TourPurpose::AtWorkBusiness],
    &[TourPurpose::AtWorkMaint],
    &[TourPurpose::AtWorkBusiness, TourPurpose::AtWorkBusiness],
    &[TourPurpose::AtWorkEat, TourPurpose::AtWorkBusiness],
];

/// One choice per located work tour.  Subtours start at the work location.
pub struct AtWorkSubtourFrequency;

impl ChoiceSubModel for AtWorkSubtourFrequency {
    fn stage(&self) -> Stage {
        Stage::Awf
    }

    fn reset(&self, household: &mut Household) {
        for p in &mut household.persons {
            p.at_work_subtours.clear();
        }
    }

    fn apply(&self, household: &mut Household, cx: &mut ChoiceContext<'_>) -> ChoiceResult<()> {
        let page = ModelPage::new(Stage::Awf, 1);
        for p in 0..household.persons.len() {
            for w in 0..household.persons[p].work_tours.len() {
                let Some(work_zone) = household.persons[p].work_tours[w].destination_zone() else {
                    continue;
                };
                let key = TourKey::Work(p, w);
                let alt = choose(household, cx, page, Decider::Tour(key), &vec![true; AT_WORK_ALTERNATIVES.len()])?;

                let person = &mut household.persons[p];
                for &purpose in AT_WORK_ALTERNATIVES[alt] {
                    let id = person.at_work_subtours.len() as u16;
                    let mut sub = Tour::new(id, TourCategory::AtWork, purpose, person.num, work_zone);
                    sub.parent_tour = Some(w as u16);
                    person.at_work_subtours.push(sub);
                }
            }
        }
        Ok(())
    }
}
