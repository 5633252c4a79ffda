//! The shadow pricing loop.

use std::time::Instant;

use ct_choice::ModelInputs;
use ct_exec::{Executor, PartitionPlan, PassJob, PassReport};
use ct_household::{Household, HouseholdStore};
use ct_pipeline::PipelineOrchestrator;
use log::info;

use crate::{LocationTally, MaxDiffReport, ShadowConfig, ShadowPriceTable, ShadowResult, persist};

/// What one iteration produced.
#[derive(Clone, Debug)]
pub struct IterationOutcome {
    pub iteration: u32,
    pub modeled:   LocationTally,
    pub report:    MaxDiffReport,
    pub pass:      PassReport,
}

/// Balances usual work and school location choices against scaled size
/// terms.
///
/// Each iteration runs usual location choice over the whole store with the
/// current size terms, tallies the chosen locations per packet, merges the
/// tallies, reports the gap to the targets, moves the prices and writes the
/// new state to disk.  The store is left with the locations of the last
/// pass.
pub struct ShadowPriceSolver {
    config:         ShadowConfig,
    table:          ShadowPriceTable,
    pipeline:       PipelineOrchestrator,
    next_iteration: u32,
}

impl ShadowPriceSolver {
    /// Scale the size terms in `inputs` to the store's origins, then restore
    /// a saved table if one is configured.
    pub fn new(config: ShadowConfig, store: &HouseholdStore, inputs: &ModelInputs) -> ShadowResult<Self> {
        let origins = LocationTally::origins(store.as_slice(), &inputs.zones);
        let mut table = ShadowPriceTable::balance(&inputs.sizes, &origins, &config);
        let next_iteration = match &config.input_file {
            Some(path) => persist::restore(path, &mut table)? + 1,
            None => 0,
        };
        Ok(Self {
            config,
            table,
            pipeline: PipelineOrchestrator::usual_location(),
            next_iteration,
        })
    }

    pub fn table(&self) -> &ShadowPriceTable {
        &self.table
    }

    pub fn config(&self) -> &ShadowConfig {
        &self.config
    }

    /// Number of the next iteration to run.
    pub fn next_iteration(&self) -> u32 {
        self.next_iteration
    }

    /// Run `max_iterations` iterations.  `inputs` ends with the size terms
    /// for a following iteration.
    pub fn run<E: Executor>(
        &mut self,
        executor: &mut E,
        plan:     &PartitionPlan,
        store:    &mut HouseholdStore,
        inputs:   &mut ModelInputs,
    ) -> ShadowResult<Vec<IterationOutcome>> {
        info!(
            "shadow pricing: {} iterations from {} with {:?} executor",
            self.config.max_iterations,
            self.next_iteration,
            executor.strategy()
        );
        self.table.apply(&mut inputs.sizes);
        let mut outcomes = Vec::with_capacity(self.config.max_iterations as usize);
        for _ in 0..self.config.max_iterations {
            outcomes.push(self.iterate(executor, plan, store, inputs)?);
        }
        Ok(outcomes)
    }

    /// One iteration on the sizes already in `inputs`.
    pub fn iterate<E: Executor>(
        &mut self,
        executor: &mut E,
        plan:     &PartitionPlan,
        store:    &mut HouseholdStore,
        inputs:   &mut ModelInputs,
    ) -> ShadowResult<IterationOutcome> {
        let iteration = self.next_iteration;
        let started = Instant::now();
        inputs.iteration = iteration;
        info!("shadow pricing iteration {iteration}: start");

        let zones = &inputs.zones;
        let out = executor.run_pass(&PassJob::new(&self.pipeline, inputs), plan, store, |hhs: &[Household]| {
            LocationTally::destinations(hhs, zones)
        })?;
        let modeled = LocationTally::merged(&out.packets);
        out.report.log_summary(&format!("usual locations, iteration {iteration}"));

        let report = MaxDiffReport::compute(iteration, &self.table, &modeled);
        report.log();
        self.table.update_prices(&modeled);
        self.table.apply(&mut inputs.sizes);
        if let Some(base) = &self.config.output_file {
            persist::write_iteration(base, iteration, &self.table, &inputs.zones, &modeled)?;
        }
        self.table.roll_previous();

        self.next_iteration += 1;
        info!("shadow pricing iteration {iteration}: done in {:.2?}", started.elapsed());
        Ok(IterationOutcome { iteration, modeled, report, pass: out.report })
    }
}
