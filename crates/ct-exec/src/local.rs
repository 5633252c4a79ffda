//! In-process execution on a thread pool.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
#[cfg(feature = "parallel")]
use std::sync::atomic::AtomicBool;

use ct_household::{Household, HouseholdStore};
use log::info;

use crate::executor::collect_packets;
use crate::{
    ExecError, ExecResult, Executor, Packet, PartitionPlan, PassJob, PassOutput, PassReport, SharedEngineFactory,
    Strategy, WorkerContext,
};

/// Runs packets on a local thread pool, working on the store in place.
///
/// Worker contexts live in a pool: a packet checks one out, creating it on
/// first demand, and hands it back when done.  At most one context per
/// thread is ever created and they survive across passes.
///
/// Without the `parallel` feature packets run in order on the calling
/// thread with a single context.
pub struct LocalExecutor {
    factory:  SharedEngineFactory,
    contexts: Mutex<Vec<WorkerContext>>,
    created:  AtomicUsize,
    threads:  usize,
    #[cfg(feature = "parallel")]
    pool:     rayon::ThreadPool,
}

impl LocalExecutor {
    pub fn new(threads: usize, factory: SharedEngineFactory) -> ExecResult<Self> {
        let threads = threads.max(1);
        #[cfg(feature = "parallel")]
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("ct-worker-{i}"))
            .build()
            .map_err(|e| ExecError::Config(format!("cannot build thread pool: {e}")))?;
        Ok(Self {
            factory,
            contexts: Mutex::new(Vec::new()),
            created:  AtomicUsize::new(0),
            threads,
            #[cfg(feature = "parallel")]
            pool,
        })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Worker contexts created so far.
    pub fn workers_created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    fn checkout(&self) -> ExecResult<WorkerContext> {
        let idle = self.contexts.lock().map_err(|_| poisoned())?.pop();
        if let Some(worker) = idle {
            return Ok(worker);
        }
        let id = self.created.fetch_add(1, Ordering::Relaxed);
        Ok(WorkerContext::new(id, self.factory.create(id)))
    }

    fn checkin(&self, worker: WorkerContext) -> ExecResult<()> {
        self.contexts.lock().map_err(|_| poisoned())?.push(worker);
        Ok(())
    }

    fn run_one<T, S>(
        &self,
        job:        &PassJob<'_>,
        packet:     Packet,
        households: &mut [Household],
        summarize:  &S,
    ) -> ExecResult<(T, PassReport)>
    where
        S: Fn(&[Household]) -> T,
    {
        let mut worker = self.checkout()?;
        let outcome = worker.run_packet(job, packet, households, summarize);
        let report = worker.take_report();
        self.checkin(worker)?;
        outcome.map(|summary| (summary, report))
    }
}

fn poisoned() -> ExecError {
    ExecError::Worker("worker context pool poisoned by a panicking worker".into())
}

impl Executor for LocalExecutor {
    fn strategy(&self) -> Strategy {
        Strategy::Local
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
        info!("local pass: {} packets, {} households", plan.len(), plan.households());
        let slices = store.split_mut(&plan.ranges())?;
        let packets = plan.packets();

        #[cfg(not(feature = "parallel"))]
        let results = {
            let mut results = Vec::with_capacity(packets.len());
            for (&packet, households) in packets.iter().zip(slices) {
                let result = self.run_one(job, packet, households, &summarize);
                let failed = result.is_err();
                results.push(result.map(Some));
                if failed {
                    break;
                }
            }
            results
        };

        #[cfg(feature = "parallel")]
        let results = {
            use rayon::prelude::*;

            let this = &*self;
            let failed = AtomicBool::new(false);
            let summarize = &summarize;
            this.pool.install(|| {
                packets
                    .par_iter()
                    .zip(slices.into_par_iter())
                    .map(|(&packet, households)| {
                        // a failure elsewhere aborts the run
                        if failed.load(Ordering::Relaxed) {
                            return Ok(None);
                        }
                        let result = this.run_one(job, packet, households, summarize);
                        if result.is_err() {
                            failed.store(true, Ordering::Relaxed);
                        }
                        result.map(Some)
                    })
                    .collect::<Vec<_>>()
            })
        };

        collect_packets(results)
    }
}
