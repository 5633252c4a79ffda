//! Shadow pricing settings.

use std::path::PathBuf;

use ct_core::{CoreError, PropertyMap};
use serde::{Deserialize, Serialize};

use crate::ShadowResult;

/// Shadow pricing configuration.
///
/// | Field                  | Default | Property suffix      |
/// |------------------------|---------|----------------------|
/// | `max_iterations`       | 1       | `MaximumIterations`  |
/// | `balance_grade_school` | false   | `GradeSchool`        |
/// | `output_file`          | none    | `OutputFile`         |
/// | `input_file`           | none    | `InputFile`          |
///
/// Every key starts with `UsualWorkAndSchoolLocationChoice.ShadowPricing.`.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Location passes to run, counted from the first iteration of this run.
    pub max_iterations:       u32,
    /// Grade school size terms are left unpriced unless this is set.
    pub balance_grade_school: bool,
    /// Base path of the per-iteration tables; `shadow.csv` is written as
    /// `shadow_0.csv`, `shadow_1.csv`, ... with a JSON twin for each.
    pub output_file:          Option<PathBuf>,
    /// A table written by an earlier run.  Its prices are restored and the
    /// iteration count continues after the one in its name.
    pub input_file:           Option<PathBuf>,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            max_iterations:       1,
            balance_grade_school: false,
            output_file:          None,
            input_file:           None,
        }
    }
}

impl ShadowConfig {
    pub const MAX_ITERATIONS_KEY: &'static str = "UsualWorkAndSchoolLocationChoice.ShadowPricing.MaximumIterations";
    pub const GRADE_SCHOOL_KEY:   &'static str = "UsualWorkAndSchoolLocationChoice.ShadowPricing.GradeSchool";
    pub const OUTPUT_FILE_KEY:    &'static str = "UsualWorkAndSchoolLocationChoice.ShadowPricing.OutputFile";
    pub const INPUT_FILE_KEY:     &'static str = "UsualWorkAndSchoolLocationChoice.ShadowPricing.InputFile";

    pub fn from_properties(props: &PropertyMap) -> ShadowResult<Self> {
        let d = Self::default();
        let iterations = props.get_u64(Self::MAX_ITERATIONS_KEY, d.max_iterations.into())?;
        let max_iterations = u32::try_from(iterations).map_err(|_| CoreError::BadProperty {
            key:      Self::MAX_ITERATIONS_KEY.into(),
            value:    iterations.to_string(),
            expected: "an iteration count",
        })?;
        Ok(Self {
            max_iterations,
            balance_grade_school: props.get_bool(Self::GRADE_SCHOOL_KEY, d.balance_grade_school)?,
            output_file:          path(props, Self::OUTPUT_FILE_KEY),
            input_file:           path(props, Self::INPUT_FILE_KEY),
        })
    }
}

fn path(props: &PropertyMap, key: &str) -> Option<PathBuf> {
    props.get(key).map(str::trim).filter(|s| !s.is_empty()).map(PathBuf::from)
}
