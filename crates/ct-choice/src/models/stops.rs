//! Intermediate stops: how many on each half tour, then where each one is,
//! the trip mode to reach it and, for auto trips into priced zones, where
//! to park.

use ct_core::{DcPurpose, Stage, TourCategory, TourPurpose, ZoneId};
use ct_household::{Household, Stop, TourKey};

use crate::model::{Decider, choose, dmu_for, draw, evaluate, purpose_page};
use crate::sample::log_size_terms;
use crate::{ChoiceContext, ChoiceError, ChoiceResult, ChoiceSubModel, ModelPage};

/// Tour categories in the order stops are modeled.
const CATEGORIES: [TourCategory; 4] = [
    TourCategory::Mandatory,
    TourCategory::Joint,
    TourCategory::IndividualNonMandatory,
    TourCategory::AtWork,
];

fn all_tour_keys(household: &Household) -> Vec<TourKey> {
    CATEGORIES.iter().flat_map(|&c| household.tour_keys(c)).collect()
}

// ── Stop frequency ────────────────────────────────────────────────────────────

/// Alternative `a` gives `a / (max + 1)` outbound and `a % (max + 1)`
/// inbound stops, `max` being [`ChoiceSettings::max_stops`][crate::ChoiceSettings].
/// Only tours that have a mode get stops.
pub struct StopFrequency;

impl ChoiceSubModel for StopFrequency {
    fn stage(&self) -> Stage {
        Stage::Stf
    }

    fn reset(&self, household: &mut Household) {
        for key in all_tour_keys(household) {
            if let Some(t) = household.tour_mut(key) {
                t.clear_stops();
            }
        }
    }

    fn apply(&self, household: &mut Household, cx: &mut ChoiceContext<'_>) -> ChoiceResult<()> {
        let per_direction = cx.inputs.settings.max_stops + 1;
        let availability = vec![true; per_direction * per_direction];
        for key in all_tour_keys(household) {
            let Some(tour) = household.tour(key) else { continue };
            let (Some(_), Some((start, end)), Some(dest)) = (tour.mode, tour.hours, tour.destination_zone()) else {
                continue;
            };
            let page = ModelPage::new(Stage::Stf, purpose_page(tour.purpose));
            let alt = choose(household, cx, page, Decider::Tour(key), &availability)?;

            let Some(tour) = household.tour_mut(key) else { continue };
            let (outbound, inbound) = (alt / per_direction, alt % per_direction);
            let (purpose, origin) = (tour.purpose, tour.origin);
            tour.outbound = (0..outbound).map(|_| Stop::new(purpose, false, origin, start)).collect();
            tour.inbound = (0..inbound).map(|_| Stop::new(purpose, true, dest, end)).collect();
        }
        Ok(())
    }
}

// ── Stop location, trip mode and parking ──────────────────────────────────────

/// Per stop, in half-tour order: destination zone (page 1), trip mode
/// (page 2) and, when the mode is an auto mode and the stop zone prices
/// parking, a parking zone (page 3).  Each stop's origin is the previous
/// stop, or the tour origin / destination at the start of a half tour.
///
/// Stop destinations are limited to zones with a positive size term for
/// the stop's segment and carry `ln(zone size)` as their alternative term.
/// A size table with nothing in it leaves every zone open.
pub struct StopLocation;

/// Size segment for stops on a tour of `purpose`.  Stops on mandatory
/// tours use the other-maintenance segment.
fn stop_segment(purpose: TourPurpose, household_has_kids: bool) -> DcPurpose {
    DcPurpose::for_tour(purpose, household_has_kids).unwrap_or(DcPurpose::OthMaint)
}

impl StopLocation {
    /// Zone availability and alternative terms for one stop segment.
    fn zone_terms(cx: &ChoiceContext<'_>, segment: DcPurpose) -> (Vec<bool>, Vec<f64>) {
        let zones = &cx.inputs.zones;
        let num_zones = zones.num_zones() as usize;
        let sizes = cx.inputs.sizes.zone_totals(segment, zones.num_subzones() as usize);
        if sizes.len() != num_zones || !sizes.iter().any(|&s| s > 0.0) {
            return (vec![true; num_zones], vec![0.0; num_zones]);
        }
        (sizes.iter().map(|&s| s > 0.0).collect(), log_size_terms(&sizes))
    }

    fn locate_half(
        household: &mut Household,
        cx:        &mut ChoiceContext<'_>,
        key:       TourKey,
        inbound:   bool,
        start:     ZoneId,
    ) -> ChoiceResult<()> {
        let inputs = cx.inputs;
        let Some(purpose) = household.tour(key).map(|t| t.purpose) else { return Ok(()) };
        let segment = stop_segment(purpose, household.has_children());
        let (zone_availability, zone_terms) = Self::zone_terms(cx, segment);
        let zone_page = ModelPage::new(Stage::Stl, 1);
        let mode_availability = vec![true; inputs.settings.trip_modes];
        let parking = inputs.zones.parking_zones();
        let parking_availability = vec![true; parking.len()];

        let count = household
            .tour(key)
            .map_or(0, |t| if inbound { t.inbound.len() } else { t.outbound.len() });
        let mut origin = start;
        for i in 0..count {
            let dmu = dmu_for(household, Decider::Tour(key)).with_origin(origin).with_alt_terms(&zone_terms);
            let choice = evaluate(cx, zone_page, &dmu, &zone_availability, None)?;
            let zone = ZoneId(draw(household, &choice, zone_page)? as u32 + 1);
            let mode = choose(household, cx, ModelPage::new(Stage::Stl, 2), Decider::Tour(key), &mode_availability)? + 1;
            let parking_zone = if mode <= inputs.settings.auto_modes && inputs.zones.is_parking_zone(zone) {
                let alt = choose(household, cx, ModelPage::new(Stage::Stl, 3), Decider::Tour(key), &parking_availability)?;
                Some(parking[alt])
            } else {
                None
            };

            let Some(tour) = household.tour_mut(key) else { break };
            let stop = if inbound { &mut tour.inbound[i] } else { &mut tour.outbound[i] };
            stop.origin = origin;
            stop.destination = Some(zone);
            stop.trip_mode = Some(mode as u8);
            stop.parking_zone = parking_zone;
            origin = zone;
        }
        Ok(())
    }
}

impl ChoiceSubModel for StopLocation {
    fn stage(&self) -> Stage {
        Stage::Stl
    }

    fn reset(&self, household: &mut Household) {
        for key in all_tour_keys(household) {
            let Some(tour) = household.tour_mut(key) else { continue };
            for stop in tour.outbound.iter_mut().chain(tour.inbound.iter_mut()) {
                stop.destination = None;
                stop.trip_mode = None;
                stop.parking_zone = None;
            }
        }
    }

    fn apply(&self, household: &mut Household, cx: &mut ChoiceContext<'_>) -> ChoiceResult<()> {
        for key in all_tour_keys(household) {
            let Some(tour) = household.tour(key) else { continue };
            if tour.stops().next().is_none() {
                continue;
            }
            let Some(dest) = tour.destination_zone() else {
                return Err(ChoiceError::MissingLocation {
                    stage:     Stage::Stl,
                    household: household.id,
                    person:    tour.person_num,
                    what:      "tour destination for its stops",
                });
            };
            let origin = tour.origin;
            Self::locate_half(household, cx, key, false, origin)?;
            Self::locate_half(household, cx, key, true, dest)?;
        }
        Ok(())
    }
}
