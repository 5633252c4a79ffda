//! The per-household pipeline.

use std::time::Instant;

use ct_choice::{ChoiceContext, ChoiceSubModel, sub_model};
use ct_core::{PropertyMap, Stage};
use ct_household::Household;
use log::debug;

use crate::{PipelineError, PipelineObserver, PipelineResult, RestartPoint, RunFlags};

/// Runs the enabled sub-models for one household at a time, in pipeline
/// order, recording a checkpoint after each stage.
///
/// The orchestrator is immutable once built and is shared by every worker.
///
/// # Restart
///
/// With a restart point `P`, `apply` first puts the household back into the
/// state it had just before `P` ran:
///
/// 1. every stage this pipeline runs (the enabled stages from `P` onward)
///    clears its own results,
/// 2. person windows are rebuilt from the tours that are left,
/// 3. the random stream is moved to the latest checkpoint recorded before
///    `P`, and the checkpoints from `P` onward are zeroed,
///
/// and then runs from `P`.  The outcome is the same as an uninterrupted run.
pub struct PipelineOrchestrator {
    models:  Vec<Box<dyn ChoiceSubModel>>,
    restart: Option<Stage>,
}

impl PipelineOrchestrator {
    /// Pipeline for the `RunModel.*` flags and `Restart.From` in `props`.
    pub fn from_properties(props: &PropertyMap) -> PipelineResult<Self> {
        PipelineBuilder::new(RunFlags::from_properties(props)?)
            .restart(RestartPoint::from_properties(props)?)
            .build()
    }

    /// The usual work and school location model on its own.  Each
    /// application starts the household over from a zero draw count.
    pub fn usual_location() -> Self {
        Self {
            models:  vec![sub_model(Stage::Uwsl)],
            restart: Some(Stage::Uwsl),
        }
    }

    /// Stages this pipeline runs, in order.
    pub fn stages(&self) -> Vec<Stage> {
        self.models.iter().map(|m| m.stage()).collect()
    }

    pub fn restart(&self) -> Option<Stage> {
        self.restart
    }

    /// Run every stage for `household`.
    pub fn apply(
        &self,
        household: &mut Household,
        cx:        &mut ChoiceContext<'_>,
        observer:  &mut dyn PipelineObserver,
    ) -> PipelineResult<()> {
        if let Some(point) = self.restart {
            self.prepare_restart(household, point)?;
        }

        for model in &self.models {
            let stage = model.stage();
            let started = Instant::now();
            model
                .apply(household, cx)
                .map_err(|source| PipelineError::Stage { household: household.id, stage, source })?;
            household.record_checkpoint(stage);
            observer.on_stage_end(stage, household, started.elapsed());
        }
        observer.on_household_end(household);
        Ok(())
    }

    fn prepare_restart(&self, household: &mut Household, point: Stage) -> PipelineResult<()> {
        for model in &self.models {
            model.reset(household);
        }
        household.rebuild_windows();

        let resume = household.checkpoints.resume_count(point);
        if resume <= household.rng.count() {
            household.rng.rewind_to(resume)?;
        } else {
            // fresh stream in a new process: replay forward
            household.rng.restore_to(resume);
        }
        household.checkpoints.clear_from(point);
        if household.debug {
            debug!("{}: restarting at {point} from draw count {resume}", household.id);
        }
        Ok(())
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Fluent builder for [`PipelineOrchestrator`].
///
/// | Method        | Default                            |
/// |---------------|------------------------------------|
/// | `.restart(p)` | [`RestartPoint::NONE`]             |
/// | `.model(m)`   | [`ct_choice::sub_model`] per stage |
///
/// `build` validates the flags; a disabled prerequisite is fatal.
pub struct PipelineBuilder {
    flags:     RunFlags,
    restart:   RestartPoint,
    overrides: Vec<Box<dyn ChoiceSubModel>>,
}

impl PipelineBuilder {
    pub fn new(flags: RunFlags) -> Self {
        Self { flags, restart: RestartPoint::NONE, overrides: Vec::new() }
    }

    pub fn restart(mut self, restart: RestartPoint) -> Self {
        self.restart = restart;
        self
    }

    /// Use `model` instead of the standard sub-model for its stage.
    pub fn model(mut self, model: Box<dyn ChoiceSubModel>) -> Self {
        self.overrides.retain(|m| m.stage() != model.stage());
        self.overrides.push(model);
        self
    }

    pub fn build(mut self) -> PipelineResult<PipelineOrchestrator> {
        self.flags.validate()?;
        if self.overrides.iter().any(|m| m.stage() == Stage::Uwsl) {
            return Err(PipelineError::Config(
                "usual location choice runs in the shadow-pricing loop, not the household pipeline".into(),
            ));
        }

        let first = self.restart.stage();
        let mut models = Vec::new();
        for &stage in Stage::household_stages() {
            if !self.flags.is_enabled(stage) || first.is_some_and(|p| stage < p) {
                continue;
            }
            let model = match self.overrides.iter().position(|m| m.stage() == stage) {
                Some(i) => self.overrides.swap_remove(i),
                None => sub_model(stage),
            };
            models.push(model);
        }
        debug!(
            "pipeline: {} stages, restart {}",
            models.len(),
            self.restart
        );
        Ok(PipelineOrchestrator { models, restart: first })
    }
}
