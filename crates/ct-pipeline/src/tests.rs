//! Unit tests for ct-pipeline.

use ct_choice::{
    ChoiceContext, ChoiceSettings, Diagnostics, ModelInputs, SizeTerms, SoaCache, TableEngine, ZoneSystem,
};
use ct_core::{DcPurpose, HouseholdId, PersonId, PersonType, RandomStreamManager, Stage, ZoneId};
use ct_household::{Household, Person};

use crate::{NoopObserver, PipelineObserver, PipelineOrchestrator};

// ── Helpers ───────────────────────────────────────────────────────────────────

const SEED: u64 = 77;

fn inputs() -> ModelInputs {
    let zones = ZoneSystem::new(6, 2).with_parking_zones([ZoneId(2)]);
    let mut sizes = SizeTerms::new(zones.num_alternatives());
    for p in DcPurpose::ALL {
        for alt in 0..zones.num_alternatives() {
            sizes.set(p, alt, 5.0 + alt as f64);
        }
    }
    ModelInputs::new(zones, ChoiceSettings::default()).with_sizes(sizes)
}

fn household(id: u32, types: &[PersonType]) -> Household {
    let streams = RandomStreamManager::new(SEED);
    let hh_id = HouseholdId(id);
    let mut hh = Household::new(hh_id, ZoneId(3), 1, 72_000, &streams);
    for (i, &t) in types.iter().enumerate() {
        let num = i as u8 + 1;
        hh.add_person(Person::new(PersonId(id * 10 + num as u32), hh_id, num, t, 30)).unwrap();
    }
    hh
}

fn family(id: u32) -> Household {
    household(id, &[
        PersonType::FullTimeWorker,
        PersonType::PartTimeWorker,
        PersonType::University,
        PersonType::NonDrivingStudent,
    ])
}

fn run(
    pipeline: &PipelineOrchestrator,
    hh:       &mut Household,
    inputs:   &ModelInputs,
    observer: &mut dyn PipelineObserver,
) {
    let mut engine = TableEngine::new();
    let mut soa = SoaCache::new();
    let mut diagnostics = Diagnostics::default();
    let mut cx = ChoiceContext::new(inputs, &mut engine, &mut soa, &mut diagnostics);
    pipeline.apply(hh, &mut cx, observer).unwrap();
}

/// Locations, then every household stage.
fn full_run(id: u32) -> Household {
    let inputs = inputs();
    let mut hh = family(id);
    run(&PipelineOrchestrator::usual_location(), &mut hh, &inputs, &mut NoopObserver);
    let pipeline = crate::PipelineBuilder::new(crate::RunFlags::all()).build().unwrap();
    run(&pipeline, &mut hh, &inputs, &mut NoopObserver);
    hh
}

fn assert_same(a: &Household, b: &Household) {
    assert_eq!(a.autos, b.autos);
    assert_eq!(a.persons, b.persons);
    assert_eq!(a.joint_tours, b.joint_tours);
    assert_eq!(a.rng.count(), b.rng.count());
    assert_eq!(a.checkpoints, b.checkpoints);
}

// ── Run flags ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod flags {
    use ct_core::{PropertyMap, Stage};

    use crate::{PipelineError, RunFlags};

    #[test]
    fn flags_default_off() {
        let props = PropertyMap::new()
            .with(Stage::Ao.run_flag_key(), "true")
            .with(Stage::Cdap.run_flag_key(), "false");
        let flags = RunFlags::from_properties(&props).unwrap();
        assert!(flags.is_enabled(Stage::Ao));
        assert!(!flags.is_enabled(Stage::Cdap));
        assert_eq!(flags.enabled_stages().collect::<Vec<_>>(), vec![Stage::Ao]);
    }

    #[test]
    fn missing_prerequisite_is_fatal() {
        let flags = RunFlags::only(&[Stage::Jtf, Stage::Jtod]);
        match flags.validate() {
            Err(PipelineError::MissingPrerequisite { stage, requires }) => {
                assert_eq!(stage, Stage::Jtod);
                assert_eq!(requires, Stage::Jtl);
            }
            other => panic!("expected MissingPrerequisite, got {other:?}"),
        }
        assert!(RunFlags::only(&[Stage::Jtf, Stage::Jtl, Stage::Jtod]).validate().is_ok());
        assert!(RunFlags::all().validate().is_ok());
        assert!(RunFlags::all().with(Stage::Awf, false).validate().is_err());
    }

    #[test]
    fn bad_boolean_is_an_error() {
        let props = PropertyMap::new().with(Stage::Ao.run_flag_key(), "maybe");
        assert!(RunFlags::from_properties(&props).is_err());
    }
}

// ── Restart points ────────────────────────────────────────────────────────────

#[cfg(test)]
mod restart {
    use ct_core::{PropertyMap, Stage};

    use crate::{RESTART_KEY, RestartPoint};

    #[test]
    fn parses_known_points() {
        assert_eq!("".parse::<RestartPoint>().unwrap(), RestartPoint::NONE);
        assert_eq!("None".parse::<RestartPoint>().unwrap(), RestartPoint::NONE);
        assert_eq!("IMMC".parse::<RestartPoint>().unwrap().stage(), Some(Stage::Immc));
        assert_eq!(" stf ".parse::<RestartPoint>().unwrap().stage(), Some(Stage::Stf));
        assert_eq!(RestartPoint::at(Stage::Awf).unwrap().to_string(), "awf");
    }

    #[test]
    fn rejects_other_stages_and_garbage() {
        for s in ["jtl", "stl", "uwsl", "cdap", "tuesday"] {
            assert!(s.parse::<RestartPoint>().is_err(), "{s}");
        }
        assert!(RestartPoint::at(Stage::Imtod).is_err());
    }

    #[test]
    fn read_from_properties() {
        let props = PropertyMap::new().with(RESTART_KEY, "jmc");
        assert_eq!(RestartPoint::from_properties(&props).unwrap().stage(), Some(Stage::Jmc));
        assert!(RestartPoint::from_properties(&PropertyMap::new()).unwrap().is_none());
    }
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod orchestrator {
    use std::time::Duration;

    use ct_choice::{ChoiceContext, ChoiceError, ChoiceResult, ChoiceSubModel};
    use ct_core::{PersonType, RandomStreamManager};

    use super::*;
    use crate::{PipelineBuilder, PipelineError, RESTART_STAGES, RestartPoint, RunFlags, StageTimings};

    #[test]
    fn single_worker_auto_ownership_only() {
        let inputs = inputs();
        let pipeline = PipelineBuilder::new(RunFlags::only(&[Stage::Ao])).build().unwrap();
        assert_eq!(pipeline.stages(), vec![Stage::Ao]);

        let mut a = household(1001, &[PersonType::FullTimeWorker]);
        let mut b = household(1001, &[PersonType::FullTimeWorker]);
        run(&pipeline, &mut a, &inputs, &mut NoopObserver);
        run(&pipeline, &mut b, &inputs, &mut NoopObserver);
        assert_eq!(a.rng.count(), 1);
        assert_eq!(a.checkpoints.get(Stage::Ao), 1);
        assert!(a.autos.is_some());
        assert_eq!(a.autos, b.autos);
    }

    #[test]
    fn full_pipeline_is_deterministic() {
        let a = full_run(42);
        let b = full_run(42);
        assert_same(&a, &b);
        assert!(a.persons.iter().all(|p| p.activity_pattern.is_some()));

        let counts: Vec<u64> = Stage::ALL.iter().map(|&s| a.checkpoints.get(s)).collect();
        assert!(counts.windows(2).all(|w| w[0] <= w[1]), "{counts:?}");
        assert_eq!(a.checkpoints.get(Stage::Stl), a.rng.count());
    }

    #[test]
    fn scheduled_tours_never_share_interior_hours() {
        for id in 1..30 {
            let hh = full_run(id);
            for p in &hh.persons {
                let mut hours: Vec<(u8, u8)> = p
                    .work_tours
                    .iter()
                    .chain(&p.school_tours)
                    .chain(&p.non_mandatory_tours)
                    .chain(hh.joint_tours.iter().filter(|t| t.has_participant(p.num)))
                    .filter_map(|t| t.hours)
                    .collect();
                hours.sort_unstable();
                for w in hours.windows(2) {
                    assert!(w[0].1 <= w[1].0 || w[0].0 == w[0].1, "household {id}: {hours:?}");
                }
            }
        }
    }

    #[test]
    fn restart_matches_uninterrupted_run() {
        let inputs = inputs();
        for &point in &RESTART_STAGES {
            for id in [5, 6, 7] {
                let full = full_run(id);
                let mut again = full.clone();
                let pipeline = PipelineBuilder::new(RunFlags::all())
                    .restart(RestartPoint::at(point).unwrap())
                    .build()
                    .unwrap();
                assert_eq!(pipeline.stages().first(), Some(&point));
                run(&pipeline, &mut again, &inputs, &mut NoopObserver);
                assert_same(&full, &again);
            }
        }
    }

    #[test]
    fn restart_with_fresh_stream_replays_forward() {
        let inputs = inputs();
        let full = full_run(9);
        let mut resumed = full.clone();
        resumed.rng = RandomStreamManager::new(SEED).stream_for(resumed.id);
        assert_eq!(resumed.rng.count(), 0);

        let pipeline = PipelineBuilder::new(RunFlags::all())
            .restart(RestartPoint::at(Stage::Inmtf).unwrap())
            .build()
            .unwrap();
        run(&pipeline, &mut resumed, &inputs, &mut NoopObserver);
        assert_same(&full, &resumed);
    }

    #[test]
    fn usual_location_reruns_from_zero() {
        let inputs = inputs();
        let pipeline = PipelineOrchestrator::usual_location();
        let mut hh = family(11);
        run(&pipeline, &mut hh, &inputs, &mut NoopObserver);
        let first = hh.persons.clone();
        let count = hh.rng.count();
        assert!(count > 0);
        assert_eq!(hh.checkpoints.get(Stage::Uwsl), count);

        run(&pipeline, &mut hh, &inputs, &mut NoopObserver);
        assert_eq!(hh.persons, first);
        assert_eq!(hh.rng.count(), count);
    }

    #[test]
    fn timings_follow_the_enabled_stages() {
        let inputs = inputs();
        let pipeline = PipelineBuilder::new(RunFlags::only(&[Stage::Ao, Stage::Cdap])).build().unwrap();
        let mut timings = StageTimings::new();
        for id in 0..3 {
            run(&pipeline, &mut household(id, &[PersonType::Retired]), &inputs, &mut timings);
        }
        assert_eq!(timings.households(), 3);
        assert_eq!(timings.elapsed(Stage::Imtf), Duration::ZERO);

        let mut merged = StageTimings::new();
        merged.merge(&timings);
        merged.merge(&timings);
        assert_eq!(merged.households(), 6);
    }

    struct Failing;

    impl ChoiceSubModel for Failing {
        fn stage(&self) -> Stage {
            Stage::Fp
        }

        fn reset(&self, _: &mut Household) {}

        fn apply(&self, household: &mut Household, _: &mut ChoiceContext<'_>) -> ChoiceResult<()> {
            Err(ChoiceError::NoAlternatives { stage: Stage::Fp, household: household.id })
        }
    }

    #[test]
    fn stage_failure_names_household_and_stage() {
        let inputs = inputs();
        let pipeline = PipelineBuilder::new(RunFlags::only(&[Stage::Ao, Stage::Fp]))
            .model(Box::new(Failing))
            .build()
            .unwrap();
        let mut hh = household(88, &[PersonType::FullTimeWorker]);
        let mut engine = TableEngine::new();
        let mut soa = SoaCache::new();
        let mut diagnostics = Diagnostics::default();
        let mut cx = ChoiceContext::new(&inputs, &mut engine, &mut soa, &mut diagnostics);
        let err = pipeline.apply(&mut hh, &mut cx, &mut NoopObserver).unwrap_err();
        assert!(matches!(err, PipelineError::Stage { stage: Stage::Fp, .. }));
        assert!(err.to_string().contains("88"));
        // ao still ran and recorded its checkpoint
        assert_eq!(hh.checkpoints.get(Stage::Ao), 1);
    }

    struct Locations;

    impl ChoiceSubModel for Locations {
        fn stage(&self) -> Stage {
            Stage::Uwsl
        }

        fn reset(&self, _: &mut Household) {}

        fn apply(&self, _: &mut Household, _: &mut ChoiceContext<'_>) -> ChoiceResult<()> {
            Ok(())
        }
    }

    #[test]
    fn usual_location_cannot_join_the_household_pipeline() {
        let result = PipelineBuilder::new(RunFlags::all()).model(Box::new(Locations)).build();
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }
}
