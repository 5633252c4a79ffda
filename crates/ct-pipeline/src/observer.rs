//! Pipeline observers and per-stage timing.

use std::time::Duration;

use ct_core::Stage;
use ct_household::Household;
use log::info;

/// Callbacks invoked by
/// [`PipelineOrchestrator::apply`][crate::PipelineOrchestrator::apply].
///
/// All methods have default no-op implementations.  An observer belongs to
/// one worker, so implementations need no synchronisation.
pub trait PipelineObserver {
    /// Called after `stage` finished for `household`.
    fn on_stage_end(&mut self, _stage: Stage, _household: &Household, _elapsed: Duration) {}

    /// Called once every enabled stage has run.
    fn on_household_end(&mut self, _household: &Household) {}
}

/// A [`PipelineObserver`] that does nothing.
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

// ── StageTimings ──────────────────────────────────────────────────────────────

/// Wall time spent per stage and households completed.  Kept per worker
/// and merged by addition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StageTimings {
    elapsed:    [Duration; Stage::COUNT],
    households: u64,
}

impl StageTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self, stage: Stage) -> Duration {
        self.elapsed[stage.index()]
    }

    pub fn households(&self) -> u64 {
        self.households
    }

    pub fn total(&self) -> Duration {
        self.elapsed.iter().sum()
    }

    pub fn merge(&mut self, other: &StageTimings) {
        for (a, b) in self.elapsed.iter_mut().zip(other.elapsed) {
            *a += b;
        }
        self.households += other.households;
    }

    /// One line per stage that took any time.
    pub fn log_summary(&self, label: &str) {
        info!("{label}: {} households in {:.3}s", self.households, self.total().as_secs_f64());
        for stage in Stage::ALL {
            let t = self.elapsed(stage);
            if !t.is_zero() {
                info!("{label}:   {:<7} {:>10.3}s  {}", stage.abbrev(), t.as_secs_f64(), stage.description());
            }
        }
    }
}

impl PipelineObserver for StageTimings {
    fn on_stage_end(&mut self, stage: Stage, _household: &Household, elapsed: Duration) {
        self.elapsed[stage.index()] += elapsed;
    }

    fn on_household_end(&mut self, _household: &Household) {
        self.households += 1;
    }
}
