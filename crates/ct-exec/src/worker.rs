//! Per-worker state and per-pass reports.

use std::sync::Arc;

use ct_choice::{ChoiceContext, Diagnostics, ModelInputs, SoaCache, UtilityEngine};
use ct_household::Household;
use ct_pipeline::{PipelineOrchestrator, StageTimings};
use log::{debug, error};

use crate::{ExecError, ExecResult, Packet};

/// Builds one utility engine per worker.
///
/// Implemented for any `Fn(usize) -> Box<dyn UtilityEngine>` closure; the
/// argument is the worker id.
pub trait EngineFactory: Send + Sync {
    fn create(&self, worker: usize) -> Box<dyn UtilityEngine>;
}

impl<F> EngineFactory for F
where
    F: Fn(usize) -> Box<dyn UtilityEngine> + Send + Sync,
{
    fn create(&self, worker: usize) -> Box<dyn UtilityEngine> {
        self(worker)
    }
}

pub type SharedEngineFactory = Arc<dyn EngineFactory>;

/// Everything one pass hands to the workers.
#[derive(Copy, Clone)]
pub struct PassJob<'a> {
    pub pipeline: &'a PipelineOrchestrator,
    pub inputs:   &'a ModelInputs,
}

impl<'a> PassJob<'a> {
    pub fn new(pipeline: &'a PipelineOrchestrator, inputs: &'a ModelInputs) -> Self {
        Self { pipeline, inputs }
    }
}

// ── PassReport ────────────────────────────────────────────────────────────────

/// What a pass (or one packet of it) produced besides the households.
/// Merging is addition, so the totals do not depend on packet order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PassReport {
    pub packets:     usize,
    pub diagnostics: Diagnostics,
    pub timings:     StageTimings,
}

impl PassReport {
    pub fn households(&self) -> u64 {
        self.timings.households()
    }

    pub fn merge(&mut self, other: &PassReport) {
        self.packets += other.packets;
        self.diagnostics.merge(&other.diagnostics);
        self.timings.merge(&other.timings);
    }

    pub fn log_summary(&self, label: &str) {
        self.timings.log_summary(label);
        self.diagnostics.log_summary(label);
    }
}

// ── WorkerContext ─────────────────────────────────────────────────────────────

/// The collaborators one worker reuses across packets: its utility engine,
/// its sample-of-alternatives cache and its counters.
///
/// When the pass inputs carry a new iteration number the engine is reset
/// and the cache dropped; neither is rebuilt.
pub struct WorkerContext {
    id:          usize,
    engine:      Box<dyn UtilityEngine>,
    soa:         SoaCache,
    diagnostics: Diagnostics,
    timings:     StageTimings,
    iteration:   Option<u32>,
    packets:     usize,
}

impl WorkerContext {
    pub fn new(id: usize, engine: Box<dyn UtilityEngine>) -> Self {
        debug!("worker {id}: created");
        Self {
            id,
            engine,
            soa:         SoaCache::new(),
            diagnostics: Diagnostics::default(),
            timings:     StageTimings::new(),
            iteration:   None,
            packets:     0,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    fn prepare(&mut self, inputs: &ModelInputs) {
        if self.iteration == Some(inputs.iteration) {
            return;
        }
        if self.iteration.is_some() {
            debug!("worker {}: iteration {} → resetting engine", self.id, inputs.iteration);
            self.engine.reset();
            self.soa.clear();
        }
        self.iteration = Some(inputs.iteration);
    }

    /// Run the pipeline over one packet, then summarize it.
    ///
    /// # Errors
    /// The first failing household stops the packet and is reported with
    /// its id, store index and the packet range.
    pub fn run_packet<T, S>(
        &mut self,
        job:        &PassJob<'_>,
        packet:     Packet,
        households: &mut [Household],
        summarize:  &S,
    ) -> ExecResult<T>
    where
        S: Fn(&[Household]) -> T,
    {
        self.prepare(job.inputs);
        let mut cx = ChoiceContext::new(job.inputs, self.engine.as_mut(), &mut self.soa, &mut self.diagnostics);
        for (offset, household) in households.iter_mut().enumerate() {
            if let Err(source) = job.pipeline.apply(household, &mut cx, &mut self.timings) {
                let index = packet.start + offset;
                error!(
                    "worker {}: household {} (index {index}) in packet {packet} failed: {source}",
                    self.id, household.id
                );
                return Err(ExecError::PacketFailed { packet, household: household.id, index, source });
            }
        }
        self.packets += 1;
        debug!("worker {}: packet {packet} done ({} so far)", self.id, self.packets);
        Ok(summarize(households))
    }

    /// Counters gathered since the last call.
    pub fn take_report(&mut self) -> PassReport {
        let packets = std::mem::take(&mut self.packets);
        PassReport {
            packets,
            diagnostics: std::mem::take(&mut self.diagnostics),
            timings:     std::mem::take(&mut self.timings),
        }
    }
}
