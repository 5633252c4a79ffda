//! Concrete sub-models, one per [`Stage`].
//!
//! | Module          | Stages                         |
//! |-----------------|--------------------------------|
//! | [`household`]   | ao, fp, cdap                   |
//! | [`frequency`]   | imtf, jtf, inmtf, awf          |
//! | [`location`]    | uwsl, jtl, inmtl, awl          |
//! | [`time_of_day`] | imtod, jtod, inmtod, awtod     |
//! | [`mode`]        | immc, jmc, inmmc, awmc         |
//! | [`stops`]       | stf, stl                       |

pub mod frequency;
pub mod household;
pub mod location;
pub mod mode;
pub mod stops;
pub mod time_of_day;

use ct_core::{Stage, TourCategory};

use crate::ChoiceSubModel;
use frequency::{AtWorkSubtourFrequency, JointTourFrequency, MandatoryTourFrequency, NonMandatoryTourFrequency};
use household::{AutoOwnership, DailyActivityPattern, FreeParking};
use location::{TourLocationChoice, UsualLocationChoice};
use mode::TourModeChoice;
use stops::{StopFrequency, StopLocation};
use time_of_day::{
    AtWorkSubtourTimeOfDay, JointTourTimeOfDay, MandatoryTourTimeOfDay, NonMandatoryTourTimeOfDay,
};

/// The standard sub-model for `stage`.
pub fn sub_model(stage: Stage) -> Box<dyn ChoiceSubModel> {
    match stage {
        Stage::Uwsl   => Box::new(UsualLocationChoice),
        Stage::Ao     => Box::new(AutoOwnership),
        Stage::Fp     => Box::new(FreeParking),
        Stage::Cdap   => Box::new(DailyActivityPattern),
        Stage::Imtf   => Box::new(MandatoryTourFrequency),
        Stage::Imtod  => Box::new(MandatoryTourTimeOfDay),
        Stage::Immc   => Box::new(TourModeChoice::new(TourCategory::Mandatory)),
        Stage::Jtf    => Box::new(JointTourFrequency),
        Stage::Jtl    => Box::new(TourLocationChoice::joint()),
        Stage::Jtod   => Box::new(JointTourTimeOfDay),
        Stage::Jmc    => Box::new(TourModeChoice::new(TourCategory::Joint)),
        Stage::Inmtf  => Box::new(NonMandatoryTourFrequency),
        Stage::Inmtl  => Box::new(TourLocationChoice::non_mandatory()),
        Stage::Inmtod => Box::new(NonMandatoryTourTimeOfDay),
        Stage::Inmmc  => Box::new(TourModeChoice::new(TourCategory::IndividualNonMandatory)),
        Stage::Awf    => Box::new(AtWorkSubtourFrequency),
        Stage::Awl    => Box::new(TourLocationChoice::at_work()),
        Stage::Awtod  => Box::new(AtWorkSubtourTimeOfDay),
        Stage::Awmc   => Box::new(TourModeChoice::new(TourCategory::AtWork)),
        Stage::Stf    => Box::new(StopFrequency),
        Stage::Stl    => Box::new(StopLocation),
    }
}
