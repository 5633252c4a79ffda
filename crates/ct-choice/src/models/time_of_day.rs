//! Departure time and duration choice for each tour category.
//!
//! Every model offers the same `(start hour, end hour)` alternatives,
//! masks them with the relevant time windows, and claims the chosen hours.
//! When no alternative is open all four apply the same fallback: the first
//! and last alternatives are forced open and the draw is still made.  Only
//! the mandatory model counts how often that happens.

use ct_core::{Stage, TourCategory, TourPurpose};
use ct_household::{Household, TimeWindow, TourKey};
use log::debug;
use rustc_hash::FxHashMap;

use crate::model::{Decider, dmu_for, evaluate, purpose_page, trace_choice};
use crate::{ChoiceContext, ChoiceError, ChoiceResult, ChoiceSubModel, ModelPage, TourContext};

/// Open the first and last alternative if nothing is available.  Returns
/// `true` when it had to.
pub fn no_window_fallback(availability: &mut [bool]) -> bool {
    if availability.is_empty() || availability.contains(&true) {
        return false;
    }
    let last = availability.len() - 1;
    availability[0] = true;
    availability[last] = true;
    true
}

/// Evaluate, draw and return the chosen hours.  A draw is taken even if the
/// logit has nothing available, in which case it picks between the first
/// and last alternative.
fn choose_hours(
    household:    &mut Household,
    cx:           &mut ChoiceContext<'_>,
    page:         ModelPage,
    decider:      Decider,
    context:      TourContext,
    availability: &[bool],
) -> ChoiceResult<(u8, u8)> {
    let inputs = cx.inputs;
    if inputs.tod.is_empty() {
        return Err(ChoiceError::NoAlternatives { stage: page.stage, household: household.id });
    }
    let dmu = dmu_for(household, decider).with_context(context);
    let choice = evaluate(cx, page, &dmu, availability, None)?;

    let rn = household.rng.draw();
    let alt = choice
        .choose(rn)
        .unwrap_or(if rn < 0.5 { 0 } else { inputs.tod.len() - 1 });
    trace_choice(household, page, alt, rn);
    inputs
        .tod
        .get(alt)
        .ok_or(ChoiceError::NoAlternatives { stage: page.stage, household: household.id })
}

fn clear_hours(household: &mut Household, category: TourCategory) {
    for key in household.tour_keys(category) {
        if let Some(t) = household.tour_mut(key) {
            t.hours = None;
        }
    }
}

// ── Mandatory ─────────────────────────────────────────────────────────────────

/// Work tours on page 1, university on 2, school on 3.
///
/// A person's tours are scheduled in the order of
/// [`Household::tour_keys`]; the position in that order sets the tour
/// context.  Tours without a destination are skipped and counted.
pub struct MandatoryTourTimeOfDay;

impl ChoiceSubModel for MandatoryTourTimeOfDay {
    fn stage(&self) -> Stage {
        Stage::Imtod
    }

    fn reset(&self, household: &mut Household) {
        clear_hours(household, TourCategory::Mandatory);
    }

    fn apply(&self, household: &mut Household, cx: &mut ChoiceContext<'_>) -> ChoiceResult<()> {
        let keys = household.tour_keys(TourCategory::Mandatory);
        for p in 0..household.persons.len() {
            let mine: Vec<TourKey> = keys.iter().copied().filter(|k| k.person_index() == Some(p)).collect();
            let mut preceding_end = None;

            for (position, &key) in mine.iter().enumerate() {
                let Some(tour) = household.tour(key) else { continue };
                if tour.destination.is_none() {
                    cx.diagnostics.no_usual_location += 1;
                    continue;
                }
                let purpose = tour.purpose;
                let page = ModelPage::new(Stage::Imtod, match purpose {
                    TourPurpose::Work       => 1,
                    TourPurpose::University => 2,
                    _                       => 3,
                });

                let mut availability = household.persons[p].window.availability(&cx.inputs.tod);
                if no_window_fallback(&mut availability) {
                    if purpose == TourPurpose::Work {
                        cx.diagnostics.no_work_window += 1;
                    } else {
                        cx.diagnostics.no_school_window += 1;
                    }
                    debug!("{}: no window for {} tour of person {}", household.id, purpose.label(), p + 1);
                }

                let context = TourContext::sequence(position, mine.len(), preceding_end);
                let (start, end) = choose_hours(household, cx, page, Decider::Tour(key), context, &availability)?;
                household.persons[p].window.claim(start, end);
                if let Some(t) = household.tour_mut(key) {
                    t.hours = Some((start, end));
                }
                household.update_time_windows();
                preceding_end = Some(end);
            }
        }
        Ok(())
    }
}

// ── Joint ─────────────────────────────────────────────────────────────────────

/// Availability is the intersection of every participant's window; the
/// chosen hours are claimed on all of them.  Page by purpose.
pub struct JointTourTimeOfDay;

impl ChoiceSubModel for JointTourTimeOfDay {
    fn stage(&self) -> Stage {
        Stage::Jtod
    }

    fn reset(&self, household: &mut Household) {
        clear_hours(household, TourCategory::Joint);
    }

    fn apply(&self, household: &mut Household, cx: &mut ChoiceContext<'_>) -> ChoiceResult<()> {
        let count = household.joint_tours.len();
        let mut preceding_end = None;
        for i in 0..count {
            let tour = &household.joint_tours[i];
            let page = ModelPage::new(Stage::Jtod, purpose_page(tour.purpose));
            let mut availability = household.joint_availability(tour, &cx.inputs.tod);
            if no_window_fallback(&mut availability) {
                debug!("{}: no common window for joint tour {i}", household.id);
            }

            let context = TourContext::sequence(i, count, preceding_end);
            let key = TourKey::Joint(i);
            let (start, end) = choose_hours(household, cx, page, Decider::Tour(key), context, &availability)?;
            let tour = &mut household.joint_tours[i];
            tour.hours = Some((start, end));
            let participants = tour.participants.clone();
            for num in participants {
                if let Some(p) = household.person_mut(num) {
                    p.window.claim(start, end);
                }
            }
            household.update_time_windows();
            preceding_end = Some(end);
        }
        Ok(())
    }
}

// ── Individual non-mandatory ──────────────────────────────────────────────────

/// Tours of one person in creation order against that person's window.
pub struct NonMandatoryTourTimeOfDay;

impl ChoiceSubModel for NonMandatoryTourTimeOfDay {
    fn stage(&self) -> Stage {
        Stage::Inmtod
    }

    fn reset(&self, household: &mut Household) {
        clear_hours(household, TourCategory::IndividualNonMandatory);
    }

    fn apply(&self, household: &mut Household, cx: &mut ChoiceContext<'_>) -> ChoiceResult<()> {
        for p in 0..household.persons.len() {
            let count = household.persons[p].non_mandatory_tours.len();
            let mut preceding_end = None;
            for t in 0..count {
                let purpose = household.persons[p].non_mandatory_tours[t].purpose;
                let page = ModelPage::new(Stage::Inmtod, purpose_page(purpose));
                let mut availability = household.persons[p].window.availability(&cx.inputs.tod);
                if no_window_fallback(&mut availability) {
                    debug!("{}: no window for {} tour of person {}", household.id, purpose.label(), p + 1);
                }

                let context = TourContext::sequence(t, count, preceding_end);
                let key = TourKey::NonMandatory(p, t);
                let (start, end) = choose_hours(household, cx, page, Decider::Tour(key), context, &availability)?;
                let person = &mut household.persons[p];
                person.window.claim(start, end);
                person.non_mandatory_tours[t].hours = Some((start, end));
                household.update_time_windows();
                preceding_end = Some(end);
            }
        }
        Ok(())
    }
}

// ── At-work subtours ──────────────────────────────────────────────────────────

/// Subtours are scheduled inside their parent work tour.  Each work tour
/// gets a scratch window with only its own hours open; chosen subtours are
/// claimed on that window, so two subtours of one work tour never overlap
/// and a later subtour sees where the earlier one ended.  The person's own
/// window is left alone since the work tour already holds those hours.
pub struct AtWorkSubtourTimeOfDay;

impl ChoiceSubModel for AtWorkSubtourTimeOfDay {
    fn stage(&self) -> Stage {
        Stage::Awtod
    }

    fn reset(&self, household: &mut Household) {
        clear_hours(household, TourCategory::AtWork);
    }

    fn apply(&self, household: &mut Household, cx: &mut ChoiceContext<'_>) -> ChoiceResult<()> {
        let page = ModelPage::new(Stage::Awtod, 1);
        let inputs = cx.inputs;
        let tod = &inputs.tod;
        for p in 0..household.persons.len() {
            let count = household.persons[p].at_work_subtours.len();
            // parent work tour -> (scratch window, end of its last subtour)
            let mut windows: FxHashMap<u16, (TimeWindow, Option<u8>)> = FxHashMap::default();

            for t in 0..count {
                let person = &household.persons[p];
                let parent = person.at_work_subtours[t].parent_tour;
                let parent_hours = parent
                    .and_then(|w| person.work_tours.get(w as usize))
                    .and_then(|w| w.hours);
                let mut availability = match (parent, parent_hours) {
                    (Some(w), Some((ws, we))) => windows
                        .entry(w)
                        .or_insert_with(|| (TimeWindow::within(ws, we), None))
                        .0
                        .availability(tod),
                    _ => vec![false; tod.len()],
                };
                if no_window_fallback(&mut availability) {
                    debug!("{}: no window inside the work tour for subtour {t} of person {}", household.id, p + 1);
                }

                let preceding_end = parent.and_then(|w| windows.get(&w)).and_then(|&(_, end)| end);
                let context = TourContext::sequence(t, count, preceding_end);
                let key = TourKey::AtWork(p, t);
                let (start, end) = choose_hours(household, cx, page, Decider::Tour(key), context, &availability)?;
                if let Some((window, last_end)) = parent.and_then(|w| windows.get_mut(&w)) {
                    window.claim(start, end);
                    *last_end = Some(end);
                }
                household.persons[p].at_work_subtours[t].hours = Some((start, end));
            }
        }
        Ok(())
    }
}
