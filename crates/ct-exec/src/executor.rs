//! The executor seam shared by both strategies.

use ct_household::{Household, HouseholdStore};
use log::info;

use crate::{
    DistributedExecutor, ExecConfig, ExecResult, LocalExecutor, PartitionPlan, PassJob, PassReport,
    SharedEngineFactory, Strategy,
};

/// Per-packet summaries, in plan order, plus the merged report.
#[derive(Clone, Debug)]
pub struct PassOutput<T> {
    pub report:  PassReport,
    pub packets: Vec<T>,
}

/// Runs a pass: every packet of the plan through the pipeline.
///
/// `summarize` is applied to each packet's households right after they
/// finish, on the worker that ran them.  Both strategies leave the store and
/// the summaries in the same state for the same plan.
pub trait Executor {
    fn strategy(&self) -> Strategy;

    fn run_pass<T, S>(
        &mut self,
        job:       &PassJob<'_>,
        plan:      &PartitionPlan,
        store:     &mut HouseholdStore,
        summarize: S,
    ) -> ExecResult<PassOutput<T>>
    where
        T: Send,
        S: Fn(&[Household]) -> T + Sync;

    /// A pass without per-packet summaries.
    fn run(&mut self, job: &PassJob<'_>, plan: &PartitionPlan, store: &mut HouseholdStore) -> ExecResult<PassReport> {
        self.run_pass(job, plan, store, |_: &[Household]| ()).map(|out| out.report)
    }
}

/// Gather per-packet results in plan order.  The first failed packet, by
/// plan order, decides the error.
pub(crate) fn collect_packets<T>(
    results: Vec<ExecResult<Option<(T, PassReport)>>>,
) -> ExecResult<PassOutput<T>> {
    let mut report = PassReport::default();
    let mut packets = Vec::with_capacity(results.len());
    for result in results {
        if let Some((summary, packet_report)) = result? {
            report.merge(&packet_report);
            packets.push(summary);
        }
    }
    Ok(PassOutput { report, packets })
}

// ── AnyExecutor ───────────────────────────────────────────────────────────────

/// Either strategy, chosen at run time from [`ExecConfig::strategy`].
pub enum AnyExecutor {
    Local(LocalExecutor),
    Distributed(DistributedExecutor),
}

impl AnyExecutor {
    pub fn from_config(config: &ExecConfig, factory: SharedEngineFactory) -> ExecResult<Self> {
        let workers = config.worker_count();
        info!("{:?} executor with {workers} workers", config.strategy);
        Ok(match config.strategy {
            Strategy::Local => AnyExecutor::Local(LocalExecutor::new(workers, factory)?),
            Strategy::Distributed => AnyExecutor::Distributed(DistributedExecutor::new(workers, factory)?),
        })
    }
}

impl Executor for AnyExecutor {
    fn strategy(&self) -> Strategy {
        match self {
            AnyExecutor::Local(e) => e.strategy(),
            AnyExecutor::Distributed(e) => e.strategy(),
        }
    }

    fn run_pass<T, S>(
        &mut self,
        job:       &PassJob<'_>,
        plan:      &PartitionPlan,
        store:     &mut HouseholdStore,
        summarize: S,
    ) -> ExecResult<PassOutput<T>>
    where
        T: Send,
        S: Fn(&[Household]) -> T + Sync,
    {
        match self {
            AnyExecutor::Local(e) => e.run_pass(job, plan, store, summarize),
            AnyExecutor::Distributed(e) => e.run_pass(job, plan, store, summarize),
        }
    }
}
