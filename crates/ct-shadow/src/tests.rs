//! Unit tests for ct-shadow.

use std::sync::Arc;

use ct_choice::{ChoiceSettings, ModelInputs, SizeTerms, TableEngine, UtilityEngine, ZoneSystem};
use ct_core::{DcPurpose, HouseholdId, PersonId, PersonType, RandomStreamManager, ZoneId};
use ct_exec::SharedEngineFactory;
use ct_household::{Household, HouseholdStore, Person};

use crate::{LocationTally, ShadowConfig};

// ── Helpers ───────────────────────────────────────────────────────────────────

const SEED: u64 = 4242;
const WORK: DcPurpose = DcPurpose::WorkMed;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn sizes(work: &[f64]) -> SizeTerms {
    let mut sizes = SizeTerms::new(work.len());
    for p in DcPurpose::ALL {
        for (alt, &v) in work.iter().enumerate() {
            sizes.set(p, alt, v);
        }
    }
    sizes
}

/// `n` one-worker households spread over four zones.
fn store(n: u32) -> HouseholdStore {
    let streams = RandomStreamManager::new(SEED);
    (0..n)
        .map(|i| {
            let id = HouseholdId(500 + i);
            let mut hh = Household::new(id, ZoneId(1 + i % 4), 0, 45_000, &streams);
            hh.add_person(Person::new(PersonId(id.0 * 10 + 1), id, 1, PersonType::FullTimeWorker, 40))
                .unwrap();
            if i % 3 == 0 {
                hh.add_person(Person::new(PersonId(id.0 * 10 + 2), id, 2, PersonType::NonDrivingStudent, 9))
                    .unwrap();
            }
            hh
        })
        .collect()
}

fn inputs() -> ModelInputs {
    ModelInputs::new(ZoneSystem::new(4, 1), ChoiceSettings::default()).with_sizes(sizes(&[1.0, 3.0, 0.0, 4.0]))
}

fn factory() -> SharedEngineFactory {
    Arc::new(|_: usize| -> Box<dyn UtilityEngine> { Box::new(TableEngine::new()) })
}

fn tally(purpose: DcPurpose, counts: &[f64]) -> LocationTally {
    let mut t = LocationTally::new();
    for (alt, &c) in counts.iter().enumerate() {
        if c != 0.0 {
            t.add(purpose, alt, c);
        }
    }
    t
}

// ── Tallies ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tallies {
    use ct_household::Location;

    use super::*;

    #[test]
    fn origins_by_home_alternative() {
        let store = store(8);
        let zones = ZoneSystem::new(4, 1);
        let t = LocationTally::origins(store.as_slice(), &zones);
        assert!(close(t.total(WORK), 8.0));
        assert!(close(t.get(WORK, 0), 2.0));
        // households 500, 503, 506 have a grade schooler
        assert!(close(t.total(DcPurpose::SchoolGrade), 3.0));
        assert!(close(t.get(DcPurpose::SchoolGrade, 0), 1.0));
    }

    #[test]
    fn destinations_skip_people_without_a_location() {
        let mut store = store(3);
        let zones = ZoneSystem::new(4, 1);
        store.as_mut_slice()[0].persons[0].work_location = Some(Location::new(ZoneId(4), 0));
        store.as_mut_slice()[1].persons[0].work_location = Some(Location::new(ZoneId(4), 0));
        let t = LocationTally::destinations(store.as_slice(), &zones);
        assert!(close(t.get(WORK, 3), 2.0));
        assert!(close(t.total(WORK), 2.0));
        assert!(close(t.total(DcPurpose::SchoolGrade), 0.0));
    }

    #[test]
    fn merge_does_not_depend_on_order() {
        let a = tally(WORK, &[1.0, 0.0, 2.0]);
        let b = tally(WORK, &[0.0, 5.0, 1.0]);
        let c = tally(DcPurpose::University, &[3.0]);
        let abc = LocationTally::merged([&a, &b, &c]);
        let cba = LocationTally::merged([&c, &b, &a]);
        assert_eq!(abc, cba);
        assert_eq!(abc.row(WORK, 3), vec![1.0, 5.0, 3.0]);
    }
}

// ── Price table ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod table {
    use super::*;
    use crate::ShadowPriceTable;

    #[test]
    fn sizes_scale_to_origins() {
        let origins = tally(WORK, &[10.0, 6.0]);
        let table = ShadowPriceTable::balance(&sizes(&[1.0, 3.0, 0.0, 4.0]), &origins, &ShadowConfig::default());
        let work = table.purpose(WORK).unwrap();
        assert_eq!(work.scaled, vec![2.0, 6.0, 0.0, 8.0]);
        assert_eq!(work.prices, vec![1.0; 4]);
        // no origins, nothing to scale to
        assert_eq!(table.purpose(DcPurpose::WorkLow).unwrap().scaled, vec![0.0; 4]);
    }

    #[test]
    fn zero_total_size_scales_to_zero() {
        let origins = tally(WORK, &[4.0]);
        let table = ShadowPriceTable::balance(&sizes(&[0.0, 0.0]), &origins, &ShadowConfig::default());
        assert_eq!(table.purpose(WORK).unwrap().scaled, vec![0.0, 0.0]);
    }

    #[test]
    fn prices_move_only_where_chosen() {
        let origins = tally(WORK, &[16.0]);
        let mut table = ShadowPriceTable::balance(&sizes(&[1.0, 3.0, 0.0, 4.0]), &origins, &ShadowConfig::default());
        table.update_prices(&tally(WORK, &[4.0, 0.0, 0.0, 16.0]));
        assert!(close(table.price(WORK, 0), 0.5));
        assert!(close(table.price(WORK, 1), 1.0));
        assert!(close(table.price(WORK, 3), 0.5));

        let mut inputs = inputs();
        table.apply(&mut inputs.sizes);
        assert_eq!(inputs.sizes.purpose(WORK), &[1.0, 6.0, 0.0, 4.0]);
        // non-mandatory rows untouched
        assert_eq!(inputs.sizes.purpose(DcPurpose::Shopping), &[1.0, 3.0, 0.0, 4.0]);
    }

    #[test]
    fn grade_school_is_unpriced_by_default() {
        let origins = tally(DcPurpose::SchoolGrade, &[2.0, 2.0]);
        let modeled = tally(DcPurpose::SchoolGrade, &[4.0, 0.0]);
        let mut off = ShadowPriceTable::balance(&sizes(&[1.0, 1.0]), &origins, &ShadowConfig::default());
        off.update_prices(&modeled);
        assert!(close(off.price(DcPurpose::SchoolGrade, 0), 1.0));

        let config = ShadowConfig { balance_grade_school: true, ..ShadowConfig::default() };
        let mut on = ShadowPriceTable::balance(&sizes(&[1.0, 1.0]), &origins, &config);
        on.update_prices(&modeled);
        assert!(close(on.price(DcPurpose::SchoolGrade, 0), 0.5));
    }

    #[test]
    fn negative_sizes_clamp_to_zero() {
        let origins = tally(WORK, &[4.0]);
        let table = ShadowPriceTable::balance(&sizes(&[-1.0, 5.0]), &origins, &ShadowConfig::default());
        let work = table.purpose(WORK).unwrap();
        assert!(work.scaled[0] < 0.0);
        assert_eq!(work.size(0), 0.0);
        assert!(close(work.size(1), 5.0));
    }
}

// ── Max-difference report ─────────────────────────────────────────────────────

#[cfg(test)]
mod report {
    use super::*;
    use crate::{MaxDiffReport, ShadowPriceTable};

    #[test]
    fn buckets_and_rmse() {
        let origins = tally(WORK, &[16.0]);
        let table = ShadowPriceTable::balance(&sizes(&[1.0, 3.0, 0.0, 4.0]), &origins, &ShadowConfig::default());
        // scaled work sizes are [2, 6, 0, 8]
        let report = MaxDiffReport::compute(3, &table, &tally(WORK, &[2.0, 0.0, 0.0, 12.0]));
        assert_eq!(report.iteration, 3);
        assert_eq!(report.ranges.len(), 4);

        let small = &report.ranges[0];
        let (_, work) = small.purposes.iter().find(|(p, _)| *p == WORK).unwrap();
        // exact, never chosen, 50% off
        assert_eq!(work, &[1, 1, 0, 0, 0, 1, 0]);
        assert_eq!(small.observations, 3);
        assert_eq!(small.zero_destinations(), 1);
        let expected = 100.0 * (36.25f64 / 2.0).sqrt() / (16.0 / 3.0);
        assert!(close(small.percent_rmse().unwrap(), expected));

        assert!(report.ranges[1..].iter().all(|r| r.observations == 0 && r.percent_rmse().is_none()));
        report.log();
    }

    #[test]
    fn largest_gaps_per_purpose() {
        let origins = tally(WORK, &[16.0]);
        let table = ShadowPriceTable::balance(&sizes(&[1.0, 3.0, 0.0, 4.0]), &origins, &ShadowConfig::default());
        // scaled [2, 6, 0, 8] against modeled [2, 0, 1, 12]
        let report = MaxDiffReport::compute(1, &table, &tally(WORK, &[2.0, 0.0, 1.0, 12.0]));
        assert_eq!(report.purposes.len(), table.purposes().len());

        let work = report.purposes.iter().find(|d| d.purpose == WORK).unwrap();
        // |0 - 6| beats |12 - 8| and the unsized alternative
        assert!(close(work.max_abs_diff, 6.0));
        // the unsized alternative has no relative difference
        assert!(close(work.max_rel_diff, 1.0));

        let mut others = report.purposes.iter().filter(|d| d.purpose != WORK);
        assert!(others.all(|d| d.max_abs_diff == 0.0 && d.max_rel_diff == 0.0));
        report.log();
    }
}

// ── Persistence ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod persist {
    use std::path::Path;

    use super::*;
    use crate::persist::{restore, write_iteration};
    use crate::{ShadowError, ShadowPriceTable, ShadowSnapshot, iteration_from_path, iteration_path};

    fn priced_table() -> (ShadowPriceTable, LocationTally) {
        let origins = tally(WORK, &[16.0]);
        let mut table = ShadowPriceTable::balance(&sizes(&[1.0, 3.0, 0.0, 4.0]), &origins, &ShadowConfig::default());
        let modeled = tally(WORK, &[4.0, 2.0, 0.0, 16.0]);
        table.update_prices(&modeled);
        (table, modeled)
    }

    #[test]
    fn file_names_carry_the_iteration() {
        let p = iteration_path(Path::new("out/shadow.csv"), 4, "csv");
        assert_eq!(p, Path::new("out/shadow_4.csv"));
        assert_eq!(iteration_from_path(&p).unwrap(), 4);
        assert_eq!(iteration_from_path(Path::new("a_b_12.json")).unwrap(), 12);
        assert!(iteration_from_path(Path::new("shadow.csv")).is_err());
    }

    #[test]
    fn csv_and_json_restore_the_prices() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("shadow.csv");
        let (mut table, modeled) = priced_table();
        let zones = ZoneSystem::new(4, 1);
        let csv_path = write_iteration(&base, 2, &table, &zones, &modeled).unwrap();
        // what the solver does after writing
        table.roll_previous();
        assert_eq!(csv_path, dir.path().join("shadow_2.csv"));

        let text = std::fs::read_to_string(&csv_path).unwrap();
        let header = text.lines().next().unwrap();
        assert!(header.starts_with("alt,zone,subzone,work_low_origins"));
        assert!(header.contains("work_med_shadowPrices"));
        assert_eq!(text.lines().count(), 5);

        for path in [csv_path, dir.path().join("shadow_2.json")] {
            let origins = tally(WORK, &[16.0]);
            let mut fresh = ShadowPriceTable::balance(&sizes(&[1.0, 3.0, 0.0, 4.0]), &origins, &ShadowConfig::default());
            assert_eq!(restore(&path, &mut fresh).unwrap(), 2);
            assert_eq!(fresh, table, "{}", path.display());
        }
    }

    #[test]
    fn snapshot_carries_the_largest_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("shadow.csv");
        let (table, modeled) = priced_table();
        write_iteration(&base, 1, &table, &ZoneSystem::new(4, 1), &modeled).unwrap();

        let text = std::fs::read_to_string(dir.path().join("shadow_1.json")).unwrap();
        let snapshot: ShadowSnapshot = serde_json::from_str(&text).unwrap();
        let work = snapshot.max_diffs.iter().find(|d| d.purpose == WORK).unwrap();
        // scaled [2, 6, 0, 8] against modeled [4, 2, 0, 16]
        assert!(close(work.max_abs_diff, 8.0));
        assert!(close(work.max_rel_diff, 1.0));
        assert!(text.contains("max_rel_diff"));
    }

    #[test]
    fn mismatched_table_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("shadow.csv");
        let (table, modeled) = priced_table();
        write_iteration(&base, 0, &table, &ZoneSystem::new(4, 1), &modeled).unwrap();

        let origins = tally(WORK, &[16.0]);
        let mut bigger = ShadowPriceTable::balance(&sizes(&[1.0; 6]), &origins, &ShadowConfig::default());
        for file in ["shadow_0.csv", "shadow_0.json"] {
            let err = restore(&dir.path().join(file), &mut bigger).unwrap_err();
            assert!(matches!(err, ShadowError::Snapshot { .. }), "{file}: {err}");
        }
    }
}

// ── Solver ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod solver {
    use ct_core::PropertyMap;
    use ct_exec::{DistributedExecutor, ExecConfig, LocalExecutor, PartitionPlan};

    use super::*;
    use crate::ShadowPriceSolver;

    fn plan(store: &HouseholdStore) -> PartitionPlan {
        PartitionPlan::new(store, &ExecConfig { packet_size: 7, ..ExecConfig::default() }).unwrap()
    }

    #[test]
    fn config_from_properties() {
        let props = PropertyMap::new()
            .with(ShadowConfig::MAX_ITERATIONS_KEY, 4)
            .with(ShadowConfig::GRADE_SCHOOL_KEY, "true")
            .with(ShadowConfig::OUTPUT_FILE_KEY, "out/shadow.csv");
        let config = ShadowConfig::from_properties(&props).unwrap();
        assert_eq!(config.max_iterations, 4);
        assert!(config.balance_grade_school);
        assert_eq!(config.output_file.as_deref(), Some(std::path::Path::new("out/shadow.csv")));
        assert_eq!(config.input_file, None);
        assert_eq!(ShadowConfig::from_properties(&PropertyMap::new()).unwrap(), ShadowConfig::default());
    }

    #[test]
    fn iterations_write_files_and_resume() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("shadow.csv");
        let config = ShadowConfig { max_iterations: 2, output_file: Some(base.clone()), ..ShadowConfig::default() };

        let mut store = store(30);
        let mut inputs = inputs();
        let mut solver = ShadowPriceSolver::new(config.clone(), &store, &inputs).unwrap();
        let mut executor = LocalExecutor::new(3, factory()).unwrap();
        let outcomes = solver.run(&mut executor, &plan(&store), &mut store, &mut inputs).unwrap();

        assert_eq!(outcomes.iter().map(|o| o.iteration).collect::<Vec<_>>(), vec![0, 1]);
        for o in &outcomes {
            // every worker found a location; alternative 2 has no size
            assert!(close(o.modeled.total(WORK), 30.0));
            assert!(close(o.modeled.get(WORK, 2), 0.0));
            assert_eq!(o.pass.households(), 30);
        }
        assert_eq!(inputs.iteration, 1);
        assert!(dir.path().join("shadow_0.csv").exists());
        assert!(dir.path().join("shadow_1.json").exists());
        // households keep the last pass's locations, drawn from a fresh stream
        assert!(store.iter().all(|h| h.persons[0].work_location.is_some()));

        let resumed_config = ShadowConfig { input_file: Some(dir.path().join("shadow_1.csv")), ..config };
        let resumed = ShadowPriceSolver::new(resumed_config, &store, &inputs).unwrap();
        assert_eq!(resumed.next_iteration(), 2);
        assert_eq!(resumed.table(), solver.table());
    }

    #[test]
    fn strategies_give_the_same_prices() {
        let run = |distributed: bool| {
            let mut store = store(25);
            let mut inputs = inputs();
            let config = ShadowConfig { max_iterations: 2, ..ShadowConfig::default() };
            let mut solver = ShadowPriceSolver::new(config, &store, &inputs).unwrap();
            let plan = plan(&store);
            let outcomes = if distributed {
                solver.run(&mut DistributedExecutor::new(2, factory()).unwrap(), &plan, &mut store, &mut inputs)
            } else {
                solver.run(&mut LocalExecutor::new(4, factory()).unwrap(), &plan, &mut store, &mut inputs)
            }
            .unwrap();
            (solver.table().clone(), outcomes.into_iter().map(|o| o.modeled).collect::<Vec<_>>(), inputs.sizes)
        };
        assert_eq!(run(false), run(true));
    }
}
