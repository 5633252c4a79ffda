//! Which sub-models run.

use ct_core::{PropertyMap, Stage};
use log::info;

use crate::{PipelineError, PipelineResult};

/// One switch per [`Stage`], read from the `RunModel.*` properties.
///
/// Every flag defaults to off.  [`validate`][Self::validate] rejects a set
/// where an enabled stage depends on a disabled one.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct RunFlags {
    enabled: [bool; Stage::COUNT],
}

impl RunFlags {
    /// Nothing enabled.
    pub fn none() -> Self {
        Self::default()
    }

    /// Every stage enabled, usual location included.
    pub fn all() -> Self {
        Self { enabled: [true; Stage::COUNT] }
    }

    pub fn only(stages: &[Stage]) -> Self {
        let mut flags = Self::none();
        for &s in stages {
            flags.enabled[s.index()] = true;
        }
        flags
    }

    pub fn from_properties(props: &PropertyMap) -> PipelineResult<Self> {
        let mut flags = Self::none();
        for stage in Stage::ALL {
            flags.enabled[stage.index()] = props.get_bool(stage.run_flag_key(), false)?;
        }
        info!(
            "enabled stages: {}",
            flags.enabled_stages().map(Stage::abbrev).collect::<Vec<_>>().join(", ")
        );
        Ok(flags)
    }

    pub fn with(mut self, stage: Stage, enabled: bool) -> Self {
        self.enabled[stage.index()] = enabled;
        self
    }

    #[inline]
    pub fn is_enabled(&self, stage: Stage) -> bool {
        self.enabled[stage.index()]
    }

    /// Enabled stages in pipeline order.
    pub fn enabled_stages(&self) -> impl Iterator<Item = Stage> + '_ {
        Stage::ALL.into_iter().filter(|&s| self.is_enabled(s))
    }

    /// The first enabled stage whose prerequisite is disabled is an error.
    pub fn validate(&self) -> PipelineResult<()> {
        for stage in self.enabled_stages() {
            if let Some(&requires) = stage.prerequisites().iter().find(|&&r| !self.is_enabled(r)) {
                return Err(PipelineError::MissingPrerequisite { stage, requires });
            }
        }
        Ok(())
    }
}
