//! Restart points.

use std::fmt;
use std::str::FromStr;

use ct_core::{PropertyMap, Stage};

use crate::{PipelineError, PipelineResult};

/// Property naming the stage to restart from.
pub const RESTART_KEY: &str = "Restart.From";

/// Stages a run may be restarted from.
pub const RESTART_STAGES: [Stage; 10] = [
    Stage::Ao,
    Stage::Imtf,
    Stage::Immc,
    Stage::Jtf,
    Stage::Jmc,
    Stage::Inmtf,
    Stage::Inmmc,
    Stage::Awf,
    Stage::Awmc,
    Stage::Stf,
];

/// Where a household pipeline starts.  `None` is a fresh run.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct RestartPoint(Option<Stage>);

impl RestartPoint {
    pub const NONE: RestartPoint = RestartPoint(None);

    /// Restart at `stage`, which must be one of [`RESTART_STAGES`].
    pub fn at(stage: Stage) -> PipelineResult<Self> {
        if RESTART_STAGES.contains(&stage) {
            Ok(Self(Some(stage)))
        } else {
            Err(PipelineError::BadRestartPoint(stage.abbrev().to_string()))
        }
    }

    pub fn from_properties(props: &PropertyMap) -> PipelineResult<Self> {
        props.get(RESTART_KEY).unwrap_or("").parse()
    }

    pub fn stage(self) -> Option<Stage> {
        self.0
    }

    pub fn is_none(self) -> bool {
        self.0.is_none()
    }
}

impl FromStr for RestartPoint {
    type Err = PipelineError;

    /// `""` and `"none"` (any case) mean no restart.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("none") {
            return Ok(Self::NONE);
        }
        match Stage::from_abbrev(s) {
            Some(stage) if RESTART_STAGES.contains(&stage) => Ok(Self(Some(stage))),
            _ => Err(PipelineError::BadRestartPoint(s.to_string())),
        }
    }
}

impl fmt::Display for RestartPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(stage) => f.write_str(stage.abbrev()),
            None => f.write_str("none"),
        }
    }
}
