//! Tour mode choice, one instance per tour category.

use ct_core::{Stage, TourCategory};
use ct_household::Household;

use crate::model::{Decider, choose, purpose_page};
use crate::{ChoiceContext, ChoiceResult, ChoiceSubModel, ModelPage};

/// Chooses a mode (1-based) for every located and scheduled tour of its
/// category, on the page of the tour purpose.
pub struct TourModeChoice {
    stage:    Stage,
    category: TourCategory,
}

impl TourModeChoice {
    pub fn new(category: TourCategory) -> Self {
        let stage = match category {
            TourCategory::Mandatory              => Stage::Immc,
            TourCategory::Joint                  => Stage::Jmc,
            TourCategory::IndividualNonMandatory => Stage::Inmmc,
            TourCategory::AtWork                 => Stage::Awmc,
        };
        Self { stage, category }
    }
}

impl ChoiceSubModel for TourModeChoice {
    fn stage(&self) -> Stage {
        self.stage
    }

    fn reset(&self, household: &mut Household) {
        for key in household.tour_keys(self.category) {
            if let Some(t) = household.tour_mut(key) {
                t.mode = None;
            }
        }
    }

    fn apply(&self, household: &mut Household, cx: &mut ChoiceContext<'_>) -> ChoiceResult<()> {
        let availability = vec![true; cx.inputs.settings.tour_modes];
        for key in household.tour_keys(self.category) {
            let Some(tour) = household.tour(key) else { continue };
            if tour.destination.is_none() || tour.hours.is_none() {
                continue;
            }
            let page = ModelPage::new(self.stage, purpose_page(tour.purpose));
            let alt = choose(household, cx, page, Decider::Tour(key), &availability)?;
            if let Some(t) = household.tour_mut(key) {
                t.mode = Some(alt as u8 + 1);
            }
        }
        Ok(())
    }
}
