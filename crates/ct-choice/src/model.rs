//! The `ChoiceSubModel` trait and the helpers every sub-model shares.

use ct_core::{Stage, TourPurpose};
use ct_household::{Household, TourKey};
use log::debug;

use crate::{ChoiceContext, ChoiceError, ChoiceResult, Dmu, LogitChoice, ModelPage};

/// One step of the household pipeline.
///
/// A sub-model holds configuration only.  Everything it reads or writes
/// for a household goes through the `&mut Household` it is handed and the
/// worker's [`ChoiceContext`], so one instance is shared by every worker.
///
/// # Random draws
///
/// Each Monte Carlo choice takes exactly one draw from
/// `household.rng`, in a fixed order that depends only on the household's
/// own data.  That is what makes a household's results independent of the
/// worker it ran on.
pub trait ChoiceSubModel: Send + Sync + 'static {
    fn stage(&self) -> Stage;

    /// Remove every result this model writes, so the household can be run
    /// again from this stage.
    fn reset(&self, household: &mut Household);

    fn apply(&self, household: &mut Household, cx: &mut ChoiceContext<'_>) -> ChoiceResult<()>;
}

/// Who a decision is made for; used to build the DMU against a freshly
/// borrowed household.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum Decider {
    Household,
    Person(usize),
    Tour(TourKey),
}

pub(crate) fn dmu_for(household: &Household, decider: Decider) -> Dmu<'_> {
    let dmu = Dmu::household(household);
    match decider {
        Decider::Household => dmu,
        Decider::Person(p) => match household.persons.get(p) {
            Some(person) => dmu.with_person(person),
            None => dmu,
        },
        Decider::Tour(key) => {
            let Some(tour) = household.tour(key) else { return dmu };
            let person = match key.person_index() {
                Some(p) => household.persons.get(p),
                None => household.person(tour.person_num),
            };
            match person {
                Some(person) => dmu.with_person(person).with_tour(tour),
                None => dmu.with_tour(tour),
            }
        }
    }
}

/// Page number for a purpose-segmented model.
#[inline]
pub(crate) fn purpose_page(purpose: TourPurpose) -> u16 {
    purpose as u16 + 1
}

/// Run the engine and turn its utilities into probabilities over the
/// available (and, if given, sampled) alternatives.
pub(crate) fn evaluate(
    cx:           &mut ChoiceContext<'_>,
    page:         ModelPage,
    dmu:          &Dmu<'_>,
    availability: &[bool],
    sample:       Option<&[bool]>,
) -> ChoiceResult<LogitChoice> {
    let utilities = cx.engine.compute_utilities(page, dmu, availability, sample);
    if utilities.len() != availability.len() {
        return Err(ChoiceError::AlternativeCount {
            page,
            expected: availability.len(),
            got:      utilities.len(),
        });
    }
    let choice = match sample {
        Some(sample) => {
            let mask: Vec<bool> = availability.iter().zip(sample).map(|(&a, &s)| a && s).collect();
            LogitChoice::from_utilities(&utilities, &mask)
        }
        None => LogitChoice::from_utilities(&utilities, availability),
    };
    Ok(choice)
}

/// Take one draw from the household stream and pick an alternative.
pub(crate) fn draw(household: &mut Household, choice: &LogitChoice, page: ModelPage) -> ChoiceResult<usize> {
    let rn = household.rng.draw();
    let alt = choice.choose(rn).ok_or(ChoiceError::NoAlternatives {
        stage:     page.stage,
        household: household.id,
    })?;
    trace_choice(household, page, alt, rn);
    Ok(alt)
}

pub(crate) fn trace_choice(household: &Household, page: ModelPage, alt: usize, rn: f64) {
    if household.debug {
        debug!(
            "{}: page {page} chose alternative {} with rn={rn:.8}, draw count {}",
            household.id,
            alt + 1,
            household.rng.count()
        );
    }
}

/// Evaluate and draw in one go for decisions without sampling.
pub(crate) fn choose(
    household:    &mut Household,
    cx:           &mut ChoiceContext<'_>,
    page:         ModelPage,
    decider:      Decider,
    availability: &[bool],
) -> ChoiceResult<usize> {
    let choice = evaluate(cx, page, &dmu_for(household, decider), availability, None)?;
    draw(household, &choice, page)
}
