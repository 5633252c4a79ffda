//! Unit tests for ct-exec.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ct_choice::{ChoiceSettings, Dmu, ModelInputs, ModelPage, SizeTerms, TableEngine, UtilityEngine, ZoneSystem};
use ct_core::{DcPurpose, HouseholdId, PersonId, PersonType, RandomStreamManager, ZoneId};
use ct_household::{Household, HouseholdStore, Person};
use ct_pipeline::{PipelineBuilder, PipelineOrchestrator, RunFlags};

use crate::{SharedEngineFactory, partition};

// ── Helpers ───────────────────────────────────────────────────────────────────

const SEED: u64 = 2024;

fn inputs() -> ModelInputs {
    let zones = ZoneSystem::new(5, 1);
    let mut sizes = SizeTerms::new(zones.num_alternatives());
    for p in DcPurpose::ALL {
        for alt in 0..zones.num_alternatives() {
            sizes.set(p, alt, 2.0 + alt as f64);
        }
    }
    ModelInputs::new(zones, ChoiceSettings::default()).with_sizes(sizes)
}

fn store(n: u32) -> HouseholdStore {
    let streams = RandomStreamManager::new(SEED);
    let households = (0..n)
        .map(|i| {
            let id = HouseholdId(100 + i);
            let mut hh = Household::new(id, ZoneId(1 + i % 5), 1, 20_000 + 7_000 * i as i32, &streams);
            let types = [PersonType::FullTimeWorker, PersonType::University, PersonType::NonDrivingStudent];
            for (k, &t) in types.iter().take(1 + (i as usize % 3)).enumerate() {
                let num = k as u8 + 1;
                hh.add_person(Person::new(PersonId(id.0 * 10 + num as u32), id, num, t, 20 + k as u8))
                    .unwrap();
            }
            hh
        })
        .collect();
    HouseholdStore::new(households)
}

/// Engine that counts creations and resets across every worker.
struct Counting {
    inner:  TableEngine,
    resets: Arc<AtomicUsize>,
}

impl UtilityEngine for Counting {
    fn compute_utilities(
        &mut self,
        page:         ModelPage,
        dmu:          &Dmu<'_>,
        availability: &[bool],
        sample:       Option<&[bool]>,
    ) -> Vec<f64> {
        self.inner.compute_utilities(page, dmu, availability, sample)
    }

    fn reset(&mut self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
    }
}

fn counting_factory(created: &Arc<AtomicUsize>, resets: &Arc<AtomicUsize>) -> SharedEngineFactory {
    let created = Arc::clone(created);
    let resets = Arc::clone(resets);
    Arc::new(move |_worker: usize| -> Box<dyn UtilityEngine> {
        created.fetch_add(1, Ordering::Relaxed);
        Box::new(Counting { inner: TableEngine::new(), resets: Arc::clone(&resets) })
    })
}

fn table_factory() -> SharedEngineFactory {
    Arc::new(|_worker: usize| -> Box<dyn UtilityEngine> { Box::new(TableEngine::new()) })
}

fn household_pipeline() -> PipelineOrchestrator {
    PipelineBuilder::new(RunFlags::all()).build().unwrap()
}

fn assert_same_store(a: &HouseholdStore, b: &HouseholdStore) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b.iter()) {
        assert_eq!(x.id, y.id);
        assert_eq!(x.autos, y.autos);
        assert_eq!(x.persons, y.persons);
        assert_eq!(x.joint_tours, y.joint_tours);
        assert_eq!(x.rng.count(), y.rng.count());
        assert_eq!(x.checkpoints, y.checkpoints);
    }
}

// ── Partitioning ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod partitioning {
    use ct_core::{HouseholdId, PropertyMap};

    use super::*;
    use crate::{ExecConfig, ExecError, Packet, PartitionPlan};

    #[test]
    fn last_packet_absorbs_a_short_remainder() {
        assert_eq!(partition(20, 7), vec![Packet::new(0, 7), Packet::new(7, 14), Packet::new(14, 20)]);
        assert_eq!(partition(15, 7), vec![Packet::new(0, 7), Packet::new(7, 15)]);
        assert_eq!(partition(14, 7), vec![Packet::new(0, 7), Packet::new(7, 14)]);
    }

    #[test]
    fn degenerate_sizes() {
        assert_eq!(partition(9, 0), vec![Packet::new(0, 9)]);
        assert!(partition(0, 5).is_empty());
        assert_eq!(partition(3, 10), vec![Packet::new(0, 3)]);
    }

    #[test]
    fn packets_cover_the_store_without_overlap() {
        for total in 1..60 {
            for size in 1..12 {
                let packets = partition(total, size);
                assert_eq!(packets[0].start, 0);
                assert_eq!(packets.last().unwrap().end, total);
                for w in packets.windows(2) {
                    assert_eq!(w[0].end, w[1].start);
                }
                assert!(packets.iter().all(|p| !p.is_empty()));
            }
        }
    }

    #[test]
    fn initialization_packets_go_first() {
        let store = store(30);
        let config = ExecConfig { packet_size: 10, init_packets: 2, init_packet_size: 3, ..ExecConfig::default() };
        let plan = PartitionPlan::new(&store, &config).unwrap();
        assert_eq!(plan.initialization_packets(), 2);
        assert_eq!(&plan.packets()[..2], &[Packet::new(0, 3), Packet::new(3, 6)]);
        assert_eq!(plan.packets()[2], Packet::new(6, 16));
        assert_eq!(plan.households(), 30);
    }

    #[test]
    fn initialization_skipped_when_it_covers_the_store() {
        let store = store(6);
        let config = ExecConfig { packet_size: 4, init_packets: 2, init_packet_size: 3, ..ExecConfig::default() };
        let plan = PartitionPlan::new(&store, &config).unwrap();
        assert_eq!(plan.initialization_packets(), 0);
        assert_eq!(plan.packets(), &[Packet::new(0, 6)]);
    }

    #[test]
    fn single_household_plan() {
        let store = store(10);
        let config = ExecConfig { only_household: Some(HouseholdId(104)), ..ExecConfig::default() };
        let plan = PartitionPlan::new(&store, &config).unwrap();
        assert_eq!(plan.packets(), &[Packet::new(4, 5)]);

        let missing = ExecConfig { only_household: Some(HouseholdId(7)), ..ExecConfig::default() };
        assert!(matches!(PartitionPlan::new(&store, &missing), Err(ExecError::Config(_))));
    }

    #[test]
    fn config_from_properties() {
        let props = PropertyMap::new()
            .with(ExecConfig::STRATEGY_KEY, "Distributed")
            .with(ExecConfig::PACKET_SIZE_KEY, 250)
            .with(ExecConfig::NUM_THREADS_KEY, 3)
            .with(ExecConfig::ONLY_HOUSEHOLD_KEY, -1);
        let config = ExecConfig::from_properties(&props).unwrap();
        assert_eq!(config.strategy, crate::Strategy::Distributed);
        assert_eq!(config.packet_size, 250);
        assert_eq!(config.worker_count(), 3);
        assert_eq!(config.only_household, None);

        let one = PropertyMap::new().with(ExecConfig::ONLY_HOUSEHOLD_KEY, 42);
        assert_eq!(ExecConfig::from_properties(&one).unwrap().only_household, Some(HouseholdId(42)));

        let bad = PropertyMap::new().with(ExecConfig::STRATEGY_KEY, "cluster");
        assert!(ExecConfig::from_properties(&bad).is_err());
    }

    #[test]
    fn defaults() {
        let config = ExecConfig::from_properties(&PropertyMap::new()).unwrap();
        assert_eq!(config, ExecConfig::default());
        assert!(config.worker_count() >= 1);
    }
}

// ── Executors ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod executors {
    use ct_choice::{ChoiceContext, ChoiceError, ChoiceResult, ChoiceSubModel};
    use ct_core::Stage;

    use super::*;
    use crate::{
        AnyExecutor, DistributedExecutor, ExecConfig, ExecError, Executor, LocalExecutor, Packet, PartitionPlan,
        PassJob, Strategy,
    };

    fn run_all<E: Executor>(executor: &mut E, store: &mut HouseholdStore, packet_size: usize) -> Vec<usize> {
        let inputs = inputs();
        let config = ExecConfig { packet_size, ..ExecConfig::default() };
        let plan = PartitionPlan::new(store, &config).unwrap();
        let locations = PipelineOrchestrator::usual_location();
        executor.run(&PassJob::new(&locations, &inputs), &plan, store).unwrap();
        let pipeline = household_pipeline();
        let out = executor
            .run_pass(&PassJob::new(&pipeline, &inputs), &plan, store, |hhs: &[Household]| {
                hhs.iter().map(|h| h.persons.len()).sum::<usize>()
            })
            .unwrap();
        assert_eq!(out.report.packets, plan.len());
        assert_eq!(out.report.households(), store.len() as u64);
        out.packets
    }

    #[test]
    fn strategies_agree() {
        let mut a = store(23);
        let mut b = store(23);
        let mut c = store(23);
        let sums_a = run_all(&mut LocalExecutor::new(4, table_factory()).unwrap(), &mut a, 5);
        let sums_b = run_all(&mut DistributedExecutor::new(3, table_factory()).unwrap(), &mut b, 5);
        let sums_c = run_all(&mut LocalExecutor::new(1, table_factory()).unwrap(), &mut c, 0);
        assert_same_store(&a, &b);
        assert_same_store(&a, &c);
        assert_eq!(sums_a, sums_b);
        assert_eq!(sums_a.iter().sum::<usize>(), sums_c.iter().sum::<usize>());
        assert!(a.iter().all(|h| h.rng.count() > 0));
    }

    #[test]
    fn contexts_are_reused_and_reset_between_iterations() {
        let created = Arc::new(AtomicUsize::new(0));
        let resets = Arc::new(AtomicUsize::new(0));
        let mut executor = LocalExecutor::new(2, counting_factory(&created, &resets)).unwrap();
        let mut store = store(12);
        let plan = PartitionPlan::from_packets(partition(12, 2));
        let locations = PipelineOrchestrator::usual_location();

        let mut inputs = inputs();
        for iteration in 0..3 {
            inputs.iteration = iteration;
            executor.run(&PassJob::new(&locations, &inputs), &plan, &mut store).unwrap();
        }
        let made = created.load(Ordering::Relaxed);
        assert!(made >= 1 && made <= executor.threads());
        assert_eq!(made, executor.workers_created());
        // every context that saw iteration 0 is reset for 1 and 2
        assert!(resets.load(Ordering::Relaxed) >= 2);
        assert!(resets.load(Ordering::Relaxed) <= 2 * made);
    }

    #[test]
    fn distributed_workers_keep_their_context() {
        let created = Arc::new(AtomicUsize::new(0));
        let resets = Arc::new(AtomicUsize::new(0));
        let mut executor = DistributedExecutor::new(3, counting_factory(&created, &resets)).unwrap();
        let mut store = store(9);
        let plan = PartitionPlan::from_packets(partition(9, 1));
        let locations = PipelineOrchestrator::usual_location();
        let inputs = inputs();
        executor.run(&PassJob::new(&locations, &inputs), &plan, &mut store).unwrap();
        executor.run(&PassJob::new(&locations, &inputs), &plan, &mut store).unwrap();
        assert!(created.load(Ordering::Relaxed) <= 3);
        assert_eq!(created.load(Ordering::Relaxed), executor.workers_created());
        assert_eq!(resets.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn any_executor_follows_the_config() {
        let config = ExecConfig { strategy: Strategy::Distributed, num_threads: 2, ..ExecConfig::default() };
        let executor = AnyExecutor::from_config(&config, table_factory()).unwrap();
        assert_eq!(executor.strategy(), Strategy::Distributed);
        assert!(DistributedExecutor::new(0, table_factory()).is_err());
    }

    #[test]
    fn single_household_run_touches_nothing_else() {
        let mut store = store(8);
        let config = ExecConfig { only_household: Some(HouseholdId(103)), ..ExecConfig::default() };
        let plan = PartitionPlan::new(&store, &config).unwrap();
        let inputs = inputs();
        let pipeline = PipelineBuilder::new(RunFlags::only(&[Stage::Ao])).build().unwrap();
        let mut executor = LocalExecutor::new(2, table_factory()).unwrap();
        executor.run(&PassJob::new(&pipeline, &inputs), &plan, &mut store).unwrap();
        for (i, hh) in store.iter().enumerate() {
            assert_eq!(hh.rng.count() > 0, i == 3, "household {}", hh.id);
        }
    }

    /// Fails on one household id.
    struct FailOn(HouseholdId);

    impl ChoiceSubModel for FailOn {
        fn stage(&self) -> Stage {
            Stage::Fp
        }

        fn reset(&self, _: &mut Household) {}

        fn apply(&self, household: &mut Household, _: &mut ChoiceContext<'_>) -> ChoiceResult<()> {
            if household.id == self.0 {
                return Err(ChoiceError::NoAlternatives { stage: Stage::Fp, household: household.id });
            }
            Ok(())
        }
    }

    fn failing_run<E: Executor>(executor: &mut E) -> ExecError {
        let mut store = store(10);
        let plan = PartitionPlan::from_packets(partition(10, 3));
        let inputs = inputs();
        let pipeline = PipelineBuilder::new(RunFlags::only(&[Stage::Ao, Stage::Fp]))
            .model(Box::new(FailOn(HouseholdId(107))))
            .build()
            .unwrap();
        executor.run(&PassJob::new(&pipeline, &inputs), &plan, &mut store).unwrap_err()
    }

    #[test]
    fn failed_household_stops_the_run() {
        for err in [
            failing_run(&mut LocalExecutor::new(3, table_factory()).unwrap()),
            failing_run(&mut DistributedExecutor::new(3, table_factory()).unwrap()),
        ] {
            match err {
                ExecError::PacketFailed { packet, household, index, .. } => {
                    assert_eq!(packet, Packet::new(6, 10));
                    assert_eq!(household, HouseholdId(107));
                    assert_eq!(index, 7);
                }
                other => panic!("expected PacketFailed, got {other:?}"),
            }
        }
    }

    #[test]
    fn plan_outside_the_store_is_rejected() {
        let mut store = store(4);
        let plan = PartitionPlan::from_packets(vec![Packet::new(0, 6)]);
        let inputs = inputs();
        let pipeline = household_pipeline();
        let mut executor = DistributedExecutor::new(1, table_factory()).unwrap();
        assert!(matches!(
            executor.run(&PassJob::new(&pipeline, &inputs), &plan, &mut store),
            Err(ExecError::Household(_))
        ));
    }
}
