//! Task-queue execution: packets travel to workers as messages.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, mpsc};
use std::thread;

use ct_household::{Household, HouseholdStore};
use log::{debug, info};

use crate::executor::collect_packets;
use crate::{
    ExecError, ExecResult, Executor, Packet, PartitionPlan, PassJob, PassOutput, PassReport, SharedEngineFactory,
    Strategy, WorkerContext,
};

/// One unit of work: a packet and a copy of its households.
struct PacketTask {
    seq:        usize,
    packet:     Packet,
    households: Vec<Household>,
}

/// What comes back: the households as the worker left them, and the outcome.
struct PacketReply<T> {
    seq:        usize,
    packet:     Packet,
    households: Vec<Household>,
    outcome:    ExecResult<Option<(T, PassReport)>>,
}

/// Runs packets on a fixed set of worker threads fed from a task queue.
///
/// Nothing is shared with a worker except through messages and the
/// read-only [`PassJob`]: each task carries its households, each reply
/// carries them back and the coordinator writes them into the store.  A
/// worker builds its [`WorkerContext`] when it receives its first task and
/// keeps it across passes.
pub struct DistributedExecutor {
    factory: SharedEngineFactory,
    slots:   Vec<Option<WorkerContext>>,
}

impl DistributedExecutor {
    pub fn new(workers: usize, factory: SharedEngineFactory) -> ExecResult<Self> {
        if workers == 0 {
            return Err(ExecError::Config("distributed executor needs at least one worker".into()));
        }
        Ok(Self { factory, slots: (0..workers).map(|_| None).collect() })
    }

    pub fn workers(&self) -> usize {
        self.slots.len()
    }

    /// Worker contexts created so far.
    pub fn workers_created(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

impl Executor for DistributedExecutor {
    fn strategy(&self) -> Strategy {
        Strategy::Distributed
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
        info!("distributed pass: {} packets over {} workers", plan.len(), self.slots.len());
        // validates the ranges against the store
        store.split_mut(&plan.ranges())?;

        let (task_tx, task_rx) = mpsc::channel::<PacketTask>();
        for (seq, &packet) in plan.packets().iter().enumerate() {
            let households = store.as_slice()[packet.range()].to_vec();
            task_tx
                .send(PacketTask { seq, packet, households })
                .map_err(|_| ExecError::Worker("task queue closed".into()))?;
        }
        drop(task_tx);

        let task_rx = Mutex::new(task_rx);
        let (reply_tx, reply_rx) = mpsc::channel::<PacketReply<T>>();
        let failed = AtomicBool::new(false);
        let factory = &self.factory;
        let summarize = &summarize;

        thread::scope(|scope| {
            for (id, slot) in self.slots.iter_mut().enumerate() {
                let task_rx = &task_rx;
                let reply_tx = reply_tx.clone();
                let failed = &failed;
                scope.spawn(move || {
                    loop {
                        let task = match task_rx.lock() {
                            Ok(rx) => rx.recv(),
                            Err(_) => break,
                        };
                        // queue drained
                        let Ok(mut task) = task else { break };

                        let outcome = if failed.load(Ordering::Relaxed) {
                            Ok(None)
                        } else {
                            let worker = slot.get_or_insert_with(|| WorkerContext::new(id, factory.create(id)));
                            let result = worker.run_packet(job, task.packet, &mut task.households, summarize);
                            let report = worker.take_report();
                            if result.is_err() {
                                failed.store(true, Ordering::Relaxed);
                            }
                            result.map(|summary| Some((summary, report)))
                        };
                        let reply = PacketReply {
                            seq:        task.seq,
                            packet:     task.packet,
                            households: task.households,
                            outcome,
                        };
                        if reply_tx.send(reply).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(reply_tx);

        let mut replies: Vec<PacketReply<T>> = reply_rx.iter().collect();
        if replies.len() != plan.len() {
            return Err(ExecError::Worker(format!(
                "{} of {} packets came back",
                replies.len(),
                plan.len()
            )));
        }
        replies.sort_unstable_by_key(|r| r.seq);

        let mut results = Vec::with_capacity(replies.len());
        for reply in replies {
            if matches!(reply.outcome, Ok(Some(_))) {
                let target = &mut store.as_mut_slice()[reply.packet.range()];
                for (dst, src) in target.iter_mut().zip(reply.households) {
                    *dst = src;
                }
                debug!("packet {} written back", reply.packet);
            }
            results.push(reply.outcome);
        }
        collect_packets(results)
    }
}
