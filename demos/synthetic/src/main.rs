//! synthetic — end-to-end run of the household choice pipeline.
//!
//! Builds a synthetic region of 25 zones with 3 walk sub-zones each, a
//! population of a few hundred households, and runs:
//!
//! 1. usual work and school location choice under shadow pricing,
//! 2. the person result file for the final iteration,
//! 3. every other enabled sub-model, household by household.
//!
//! The utility engine is the table-driven stand-in, so choices are uniform
//! among available alternatives (or proportional to size).  An optional
//! first argument is either a properties file merged over the defaults or a
//! JSON run description with `exec` and `shadow` sections.

mod population;

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use env_logger::{Builder, Env};
use log::info;
use serde::{Deserialize, Serialize};

use ct_choice::{ChoiceSettings, ModelInputs, SizeTerms, TableEngine, UtilityEngine, ZoneSystem};
use ct_core::{DcPurpose, HouseholdId, PropertyMap, RandomStreamManager, Stage, TourCategory, ZoneId};
use ct_exec::{AnyExecutor, ExecConfig, Executor, PartitionPlan, PassJob, SharedEngineFactory};
use ct_household::{HouseholdStore, load_population_reader};
use ct_output::{CsvResultWriter, DEFAULT_BATCH_SIZE, PersonResultRow, result_path, write_results};
use ct_pipeline::{PipelineBuilder, RestartPoint, RunFlags};
use ct_shadow::{ShadowConfig, ShadowPriceSolver};

// ── Constants ─────────────────────────────────────────────────────────────────

const HOUSEHOLDS:   u32 = 400;
const ZONES:        u32 = 25;
const SUBZONES:     u8  = 3;
/// Zones 1..=PARKING_ZONES form the priced-parking core.
const PARKING_ZONES: u32 = 4;

const TOUR_CATEGORIES: [TourCategory; 4] = [
    TourCategory::Mandatory,
    TourCategory::Joint,
    TourCategory::IndividualNonMandatory,
    TourCategory::AtWork,
];

const SEED_KEY:    &str = "Model.Random.Seed";
const DEBUG_KEY:   &str = "Debug.Choice.Models.HouseholdIds";
const RESULTS_KEY: &str = "Results.UsualWorkAndSchoolLocationChoice";

const DEFAULT_PROPERTIES: &str = "\
# synthetic region defaults
Model.Random.Seed = 2024
Debug.Choice.Models.HouseholdIds = 1003

Execution.Strategy = local
Packet.Size = 50
Num.Threads = 4
Num.Initialization.Packets = 2
Initialization.Packet.Size = 10

UsualWorkAndSchoolLocationChoice.SampleOfAlternatives.SampleSize = 20
UsualWorkAndSchoolLocationChoice.ShadowPricing.MaximumIterations = 3
UsualWorkAndSchoolLocationChoice.ShadowPricing.OutputFile = output/synthetic/shadow_prices.csv
Results.UsualWorkAndSchoolLocationChoice = output/synthetic/wsloc_results.csv

RunModel.UsualWorkAndSchoolLocationChoice = true
RunModel.AutoOwnership = true
RunModel.FreeParking = true
RunModel.CoordinatedDailyActivityPattern = true
RunModel.IndividualMandatoryTourFrequency = true
RunModel.MandatoryTourDepartureTimeAndDuration = true
RunModel.MandatoryTourModeChoice = true
RunModel.JointTourFrequency = true
RunModel.JointTourLocationChoice = true
RunModel.JointTourDepartureTimeAndDuration = true
RunModel.JointTourModeChoice = true
RunModel.IndividualNonMandatoryTourFrequency = true
RunModel.IndividualNonMandatoryTourLocationChoice = true
RunModel.IndividualNonMandatoryTourDepartureTimeAndDuration = true
RunModel.IndividualNonMandatoryTourModeChoice = true
RunModel.AtWorkSubTourFrequency = true
RunModel.AtWorkSubTourLocationChoice = true
RunModel.AtWorkSubTourDepartureTimeAndDuration = true
RunModel.AtWorkSubTourModeChoice = true
RunModel.StopFrequency = true
RunModel.StopLocation = true
";

// ── Run description ───────────────────────────────────────────────────────────

/// The JSON form of the execution and shadow pricing settings.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct RunDescription {
    exec:   ExecConfig,
    shadow: ShadowConfig,
}

fn load_settings(arg: Option<PathBuf>) -> Result<(PropertyMap, RunDescription)> {
    let mut props = PropertyMap::from_reader(Cursor::new(DEFAULT_PROPERTIES))?;
    let json = arg.as_deref().filter(|p| p.extension().is_some_and(|e| e == "json"));

    if let Some(path) = arg.as_deref().filter(|_| json.is_none()) {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        props.merge_reader(file)?;
        println!("Properties merged from {}", path.display());
    }

    let description = match json {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            println!("Run description from {}", path.display());
            serde_json::from_reader(BufReader::new(file))?
        }
        None => RunDescription {
            exec:   ExecConfig::from_properties(&props)?,
            shadow: ShadowConfig::from_properties(&props)?,
        },
    };
    Ok((props, description))
}

// ── Region ────────────────────────────────────────────────────────────────────

/// Size terms that fall off with distance from zone 1.  Universities sit in
/// every fifth zone; sub-zone 0 has no walk access and half the size.
fn size_terms(zones: &ZoneSystem) -> SizeTerms {
    let mut sizes = SizeTerms::new(zones.num_alternatives());
    for alt in 0..zones.num_alternatives() {
        let Some(location) = zones.location(alt) else { continue };
        let zone = location.zone.0 as f64;
        let walk = if location.subzone == 0 { 0.5 } else { 1.0 };
        let core = 1.0 + 4.0 / zone;
        for purpose in DcPurpose::ALL {
            let size = match purpose {
                DcPurpose::University if location.zone.0 % 5 != 0 => 0.0,
                DcPurpose::University => 40.0,
                DcPurpose::SchoolGrade | DcPurpose::SchoolHigh => 8.0 + zone % 3.0,
                p if p.is_work() => 30.0 * core,
                _ => 10.0 * core,
            };
            sizes.set(purpose, alt, size * walk);
        }
    }
    sizes
}

fn engine_factory() -> SharedEngineFactory {
    Arc::new(|_worker: usize| -> Box<dyn UtilityEngine> { Box::new(TableEngine::new()) })
}

fn prepare_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let (props, run) = load_settings(std::env::args_os().nth(1).map(PathBuf::from))?;
    let seed = props.get_u64(SEED_KEY, 0)?;
    let debug_ids: Vec<u32> = props.get_list(DEBUG_KEY)?;

    println!("=== synthetic — household choice pipeline ===");
    println!("Households: {HOUSEHOLDS}  |  Zones: {ZONES} × {SUBZONES}  |  Seed: {seed}");
    println!();

    // 1. Population.
    let streams = RandomStreamManager::new(seed);
    let csv = population::generate(HOUSEHOLDS, ZONES, SUBZONES, seed);
    let mut store: HouseholdStore = load_population_reader(
        Cursor::new(csv.households),
        Cursor::new(csv.persons),
        &streams,
        &debug_ids,
    )?;
    println!("Population: {} households, {} persons", store.len(), store.person_count());

    // 2. Region and shared inputs.
    let zones = ZoneSystem::new(ZONES, SUBZONES).with_parking_zones((1..=PARKING_ZONES).map(ZoneId));
    let sizes = size_terms(&zones);
    let mut inputs = ModelInputs::new(zones, ChoiceSettings::from_properties(&props)?).with_sizes(sizes);

    // 3. Executor and packets.
    let mut executor = AnyExecutor::from_config(&run.exec, engine_factory())?;
    let plan = PartitionPlan::new(&store, &run.exec)?;
    println!(
        "Plan: {} packets ({} initialization) over {} households, {:?} executor",
        plan.len(),
        plan.initialization_packets(),
        plan.households(),
        executor.strategy()
    );
    println!();

    let flags = RunFlags::from_properties(&props)?;
    let t0 = Instant::now();

    // 4. Usual locations under shadow pricing, then their result file.
    if flags.is_enabled(Stage::Uwsl) {
        if let Some(base) = &run.shadow.output_file {
            prepare_parent(base)?;
        }
        let mut solver = ShadowPriceSolver::new(run.shadow.clone(), &store, &inputs)?;
        let outcomes = solver.run(&mut executor, &plan, &mut store, &mut inputs)?;

        println!("{:<10} {:>12} {:>12}", "Iteration", "Households", "Top %RMSE");
        println!("{}", "-".repeat(36));
        for outcome in &outcomes {
            let rmse = outcome
                .report
                .ranges
                .last()
                .and_then(|r| r.percent_rmse())
                .map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
            println!("{:<10} {:>12} {:>12}", outcome.iteration, outcome.pass.households(), rmse);
        }
        println!();

        let base = PathBuf::from(props.get_string(RESULTS_KEY, "wsloc_results.csv"));
        let path = result_path(&base, solver.next_iteration().saturating_sub(1));
        prepare_parent(&path)?;
        let mut writer = CsvResultWriter::create(&path)?;
        let rows = write_results(store.as_slice(), &mut writer, DEFAULT_BATCH_SIZE)?;
        println!("  {} : {rows} rows", path.display());
    }

    // 5. The rest of the household pipeline.
    let pipeline = PipelineBuilder::new(flags)
        .restart(RestartPoint::from_properties(&props)?)
        .build()?;
    let report = executor.run(&PassJob::new(&pipeline, &inputs), &plan, &mut store)?;
    report.log_summary("household pipeline");
    let elapsed = t0.elapsed();

    println!(
        "Pipeline: {} stages over {} households in {} packets",
        pipeline.stages().len(),
        report.households(),
        report.packets
    );
    println!("Run complete in {:.3} s", elapsed.as_secs_f64());
    println!();

    // 6. Debug households.
    for &id in &debug_ids {
        let Some(hh) = store.position(HouseholdId(id)).and_then(|i| store.get(i)) else {
            continue;
        };
        let tours: usize = TOUR_CATEGORIES.iter().map(|&c| hh.tour_keys(c).len()).sum();
        println!("Household {id}: {} persons, {tours} tours, {:?} autos", hh.persons.len(), hh.autos);
        for row in PersonResultRow::for_household(hh) {
            println!(
                "  person {:<3} {:<28} work {:>3}/{}  school {:>3}/{}",
                row.person_num,
                row.person_type,
                row.work_zone,
                row.work_subzone,
                row.school_zone,
                row.school_subzone
            );
        }
    }
    println!();

    info!("effective settings:\n{}", serde_json::to_string_pretty(&run)?);
    Ok(())
}
