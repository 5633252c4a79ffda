//! Destination choice: usual work / school location and tour destinations.
//!
//! Both use the two-stage procedure in [`crate::sample`]: a sample of
//! alternatives drawn from cached stage-one probabilities (with `ln(size)`
//! as the per-alternative term, so the current size terms bias the
//! sample), then the full model over the sampled alternatives with
//! `ln(size) + correction`.

use ct_core::{DcPurpose, Stage, TourCategory, ZoneId};
use ct_household::{Household, Location};

use crate::model::{Decider, dmu_for, draw, evaluate};
use crate::sample::{SoaProbabilities, log_size_terms};
use crate::{ChoiceContext, ChoiceResult, ChoiceSubModel, ModelPage};

/// Sample, then choose.  `None` (counted in the diagnostics) when no
/// destination has a positive size term for `purpose`.
pub(crate) fn choose_destination(
    household: &mut Household,
    cx:        &mut ChoiceContext<'_>,
    stage:     Stage,
    purpose:   DcPurpose,
    origin:    ZoneId,
    decider:   Decider,
) -> ChoiceResult<Option<Location>> {
    let inputs = cx.inputs;
    let sizes = inputs.sizes.purpose(purpose);
    let availability = inputs.sizes.availability(purpose);
    if !availability.contains(&true) {
        cx.diagnostics.no_destination += 1;
        return Ok(None);
    }

    if cx.soa.get(origin, purpose).is_none() {
        let page = ModelPage::new(stage, purpose.soa_page());
        let terms = log_size_terms(sizes);
        let dmu = dmu_for(household, decider).with_origin(origin).with_alt_terms(&terms);
        let choice = evaluate(cx, page, &dmu, &availability, None)?;
        cx.soa.insert(origin, purpose, SoaProbabilities::new(choice.probabilities().to_vec()));
        cx.diagnostics.soa_tables += 1;
    }
    let sample = match cx.soa.get(origin, purpose) {
        Some(probs) if !probs.is_empty() => probs.draw(inputs.settings.sample_size, &mut household.rng),
        _ => {
            cx.diagnostics.no_destination += 1;
            return Ok(None);
        }
    };
    if sample.is_empty() {
        cx.diagnostics.no_destination += 1;
        return Ok(None);
    }

    let page = ModelPage::new(stage, purpose.dc_page());
    let terms = sample.alt_terms(sizes);
    let mask = sample.mask(availability.len());
    let dmu = dmu_for(household, decider).with_origin(origin).with_alt_terms(&terms);
    let choice = evaluate(cx, page, &dmu, &availability, Some(&mask))?;
    let alt = draw(household, &choice, page)?;
    Ok(inputs.zones.location(alt))
}

// ── Usual work and school location ───────────────────────────────────────────

/// Every worker and student chooses a usual location from home, segmented
/// by [`DcPurpose::usual_location`].  This is the model shadow pricing
/// balances.
pub struct UsualLocationChoice;

impl ChoiceSubModel for UsualLocationChoice {
    fn stage(&self) -> Stage {
        Stage::Uwsl
    }

    fn reset(&self, household: &mut Household) {
        for p in &mut household.persons {
            p.work_location = None;
            p.school_location = None;
        }
    }

    fn apply(&self, household: &mut Household, cx: &mut ChoiceContext<'_>) -> ChoiceResult<()> {
        let home = household.home_zone;
        for p in 0..household.persons.len() {
            let ptype = household.persons[p].person_type;
            let Some(purpose) = DcPurpose::usual_location(ptype, household.income) else { continue };
            let location = choose_destination(household, cx, Stage::Uwsl, purpose, home, Decider::Person(p))?;
            let person = &mut household.persons[p];
            if purpose.is_work() {
                person.work_location = location;
            } else {
                person.school_location = location;
            }
        }
        Ok(())
    }
}

// ── Tour destinations ─────────────────────────────────────────────────────────

/// Destination of every tour in one category, from the tour's own origin.
/// Mandatory tours are never located here; they go to the usual location.
pub struct TourLocationChoice {
    stage:    Stage,
    category: TourCategory,
}

impl TourLocationChoice {
    pub fn joint() -> Self {
        Self { stage: Stage::Jtl, category: TourCategory::Joint }
    }

    pub fn non_mandatory() -> Self {
        Self { stage: Stage::Inmtl, category: TourCategory::IndividualNonMandatory }
    }

    pub fn at_work() -> Self {
        Self { stage: Stage::Awl, category: TourCategory::AtWork }
    }
}

impl ChoiceSubModel for TourLocationChoice {
    fn stage(&self) -> Stage {
        self.stage
    }

    fn reset(&self, household: &mut Household) {
        for key in household.tour_keys(self.category) {
            if let Some(t) = household.tour_mut(key) {
                t.destination = None;
            }
        }
    }

    fn apply(&self, household: &mut Household, cx: &mut ChoiceContext<'_>) -> ChoiceResult<()> {
        let has_kids = household.has_children();
        for key in household.tour_keys(self.category) {
            let Some(tour) = household.tour(key) else { continue };
            let Some(purpose) = DcPurpose::for_tour(tour.purpose, has_kids) else { continue };
            let origin = tour.origin;
            let location = choose_destination(household, cx, self.stage, purpose, origin, Decider::Tour(key))?;
            if let Some(t) = household.tour_mut(key) {
                t.destination = location;
            }
        }
        Ok(())
    }
}
