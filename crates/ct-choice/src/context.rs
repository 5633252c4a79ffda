//! What a sub-model can reach while it runs for one household.

use ct_core::{CoreResult, PropertyMap, TodAlternatives};

use crate::{Diagnostics, SizeTerms, SoaCache, UtilityEngine, ZoneSystem};

/// Alternative counts and sampling settings shared by all sub-models.
#[derive(Clone, Debug, PartialEq)]
pub struct ChoiceSettings {
    /// Draws per sample of alternatives.
    pub sample_size:      usize,
    pub tour_modes:       usize,
    pub trip_modes:       usize,
    /// Trip modes `1..=auto_modes` drive and may need to park.
    pub auto_modes:       usize,
    /// Most stops chosen on one half tour.
    pub max_stops:        usize,
}

impl Default for ChoiceSettings {
    fn default() -> Self {
        Self {
            sample_size: 30,
            tour_modes:  9,
            trip_modes:  9,
            auto_modes:  6,
            max_stops:   3,
        }
    }
}

impl ChoiceSettings {
    pub const SAMPLE_SIZE_KEY: &'static str = "UsualWorkAndSchoolLocationChoice.SampleOfAlternatives.SampleSize";
    pub const TOUR_MODES_KEY:  &'static str = "ModeChoice.NumberOfTourModes";
    pub const TRIP_MODES_KEY:  &'static str = "ModeChoice.NumberOfTripModes";
    pub const AUTO_MODES_KEY:  &'static str = "ModeChoice.NumberOfAutoModes";
    pub const MAX_STOPS_KEY:   &'static str = "StopFrequency.MaxStopsPerDirection";

    pub fn from_properties(props: &PropertyMap) -> CoreResult<Self> {
        let d = Self::default();
        Ok(Self {
            sample_size: props.get_usize(Self::SAMPLE_SIZE_KEY, d.sample_size)?,
            tour_modes:  props.get_usize(Self::TOUR_MODES_KEY, d.tour_modes)?,
            trip_modes:  props.get_usize(Self::TRIP_MODES_KEY, d.trip_modes)?,
            auto_modes:  props.get_usize(Self::AUTO_MODES_KEY, d.auto_modes)?,
            max_stops:   props.get_usize(Self::MAX_STOPS_KEY, d.max_stops)?,
        })
    }
}

/// Read-only data shared by every worker during a pass.
///
/// `iteration` identifies the current size terms.  Workers compare it with
/// the iteration they last saw and reset their engine and sample cache when
/// it moves.
#[derive(Clone, Debug)]
pub struct ModelInputs {
    pub zones:     ZoneSystem,
    pub sizes:     SizeTerms,
    pub tod:       TodAlternatives,
    pub settings:  ChoiceSettings,
    pub iteration: u32,
}

impl ModelInputs {
    /// Standard 190 time-of-day alternatives, zero size terms.
    pub fn new(zones: ZoneSystem, settings: ChoiceSettings) -> Self {
        let sizes = SizeTerms::new(zones.num_alternatives());
        Self {
            zones,
            sizes,
            tod: TodAlternatives::standard(),
            settings,
            iteration: 0,
        }
    }

    pub fn with_sizes(mut self, sizes: SizeTerms) -> Self {
        self.sizes = sizes;
        self
    }
}

/// Per-household view handed to [`ChoiceSubModel::apply`][crate::ChoiceSubModel::apply]:
/// shared inputs plus the calling worker's own engine, cache and counters.
pub struct ChoiceContext<'a> {
    pub inputs:      &'a ModelInputs,
    pub engine:      &'a mut dyn UtilityEngine,
    pub soa:         &'a mut SoaCache,
    pub diagnostics: &'a mut Diagnostics,
}

impl<'a> ChoiceContext<'a> {
    pub fn new(
        inputs:      &'a ModelInputs,
        engine:      &'a mut dyn UtilityEngine,
        soa:         &'a mut SoaCache,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self { inputs, engine, soa, diagnostics }
    }
}
