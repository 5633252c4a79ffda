//! Writing and restoring per-iteration shadow price tables.
//!
//! Each iteration writes `<stem>_<iteration>.csv`, one row per destination
//! alternative:
//!
//! ```text
//! alt,zone,subzone,<purpose>_origins,<purpose>_sizeOriginal,<purpose>_sizeScaled,
//!   <purpose>_sizePrevious,<purpose>_modeledDests,<purpose>_sizeFinal,<purpose>_shadowPrices, ...
//! ```
//!
//! plus `<stem>_<iteration>.json`, a [`ShadowSnapshot`] of the same state.
//! Either file can seed a later run.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use ct_choice::ZoneSystem;
use ct_core::DcPurpose;
use log::info;
use serde::{Deserialize, Serialize};

use crate::{LocationTally, PurposeDiff, PurposePrices, ShadowError, ShadowPriceTable, ShadowResult};

const COLUMNS: [&str; 7] = [
    "origins",
    "sizeOriginal",
    "sizeScaled",
    "sizePrevious",
    "modeledDests",
    "sizeFinal",
    "shadowPrices",
];

/// Everything needed to continue shadow pricing after `iteration`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShadowSnapshot {
    pub iteration:        u32,
    pub num_alternatives: usize,
    pub purposes:         Vec<PurposePrices>,
    /// Realized destinations, `[purpose][alternative]` in purpose order.
    pub modeled:          Vec<Vec<f64>>,
    /// Largest gaps between `modeled` and the scaled sizes, per purpose.
    #[serde(default)]
    pub max_diffs:        Vec<PurposeDiff>,
}

impl ShadowSnapshot {
    pub fn new(iteration: u32, table: &ShadowPriceTable, modeled: &LocationTally) -> Self {
        let n = table.num_alternatives();
        Self {
            iteration,
            num_alternatives: n,
            purposes: table.purposes().to_vec(),
            modeled: table.purposes().iter().map(|p| modeled.row(p.purpose, n)).collect(),
            max_diffs: PurposeDiff::compute_all(table, modeled),
        }
    }
}

/// `dir/shadow.csv` → `dir/shadow_3.<extension>`.
pub fn iteration_path(base: &Path, iteration: u32, extension: &str) -> PathBuf {
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("shadow_prices");
    base.with_file_name(format!("{stem}_{iteration}.{extension}"))
}

/// The iteration number at the end of a file stem, `shadow_3.csv` → 3.
pub fn iteration_from_path(path: &Path) -> ShadowResult<u32> {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    stem.rsplit_once('_')
        .and_then(|(_, n)| n.parse().ok())
        .ok_or_else(|| snapshot_error(path, "file name does not end in _<iteration>"))
}

/// Write both files for `iteration`; returns the CSV path.
pub fn write_iteration(
    base:      &Path,
    iteration: u32,
    table:     &ShadowPriceTable,
    zones:     &ZoneSystem,
    modeled:   &LocationTally,
) -> ShadowResult<PathBuf> {
    let csv_path = iteration_path(base, iteration, "csv");
    write_csv(&csv_path, table, zones, modeled)?;
    let json_path = iteration_path(base, iteration, "json");
    let writer = BufWriter::new(File::create(&json_path)?);
    serde_json::to_writer_pretty(writer, &ShadowSnapshot::new(iteration, table, modeled))?;
    info!("shadow prices for iteration {iteration} written to {}", csv_path.display());
    Ok(csv_path)
}

pub fn write_csv(path: &Path, table: &ShadowPriceTable, zones: &ZoneSystem, modeled: &LocationTally) -> ShadowResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    let mut header = vec!["alt".to_string(), "zone".to_string(), "subzone".to_string()];
    for p in table.purposes() {
        header.extend(COLUMNS.iter().map(|c| format!("{}_{c}", p.purpose.label())));
    }
    writer.write_record(&header)?;

    for alt in 0..table.num_alternatives() {
        let (zone, subzone) = zones.location(alt).map_or((0, 0), |l| (l.zone.0, l.subzone));
        let mut record = vec![(alt + 1).to_string(), zone.to_string(), subzone.to_string()];
        for p in table.purposes() {
            let values = [
                p.origins[alt],
                p.original[alt],
                p.scaled[alt],
                p.previous[alt],
                modeled.get(p.purpose, alt),
                p.size(alt),
                p.prices[alt],
            ];
            record.extend(values.iter().map(f64::to_string));
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Restore `table` from a saved CSV or JSON file and return the iteration
/// it was written for.
pub fn restore(path: &Path, table: &mut ShadowPriceTable) -> ShadowResult<u32> {
    let is_json = path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let iteration = if is_json {
        let snapshot: ShadowSnapshot = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        if snapshot.num_alternatives != table.num_alternatives() {
            return Err(snapshot_error(
                path,
                format!("{} alternatives, this run has {}", snapshot.num_alternatives, table.num_alternatives()),
            ));
        }
        let n = table.num_alternatives();
        if let Some(bad) = snapshot
            .purposes
            .iter()
            .find(|p| p.scaled.len() != n || p.prices.len() != n)
        {
            return Err(snapshot_error(path, format!("{}: rows do not match {n} alternatives", bad.purpose)));
        }
        table.restore(&snapshot.purposes);
        snapshot.iteration
    } else {
        let saved = read_csv(path, table)?;
        table.restore(&saved);
        iteration_from_path(path)?
    };
    info!("shadow prices restored from {} (iteration {iteration})", path.display());
    Ok(iteration)
}

/// Scaled sizes and prices of every mandatory purpose in a saved CSV.  The
/// other columns are there for people to read.
fn read_csv(path: &Path, table: &ShadowPriceTable) -> ShadowResult<Vec<PurposePrices>> {
    let n = table.num_alternatives();
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let column = |purpose: DcPurpose, name: &str| {
        let wanted = format!("{}_{name}", purpose.label());
        headers
            .iter()
            .position(|h| h.trim() == wanted)
            .ok_or_else(|| snapshot_error(path, format!("missing column {wanted:?}")))
    };

    let mut saved = Vec::with_capacity(table.purposes().len());
    let mut indices = Vec::with_capacity(table.purposes().len());
    for p in table.purposes() {
        indices.push([column(p.purpose, "sizeScaled")?, column(p.purpose, "shadowPrices")?]);
        saved.push(PurposePrices { scaled: Vec::with_capacity(n), prices: Vec::with_capacity(n), ..p.clone() });
    }

    let mut rows = 0;
    for record in reader.records() {
        let record = record?;
        rows += 1;
        for (s, cols) in saved.iter_mut().zip(&indices) {
            let value = |i: usize| -> ShadowResult<f64> {
                let field = record.get(i).unwrap_or_default().trim();
                field
                    .parse()
                    .map_err(|_| snapshot_error(path, format!("row {rows}: cannot parse {field:?} as a number")))
            };
            s.scaled.push(value(cols[0])?);
            s.prices.push(value(cols[1])?);
        }
    }
    if rows != n {
        return Err(snapshot_error(path, format!("{rows} rows, this run has {n} alternatives")));
    }
    Ok(saved)
}

fn snapshot_error(path: &Path, detail: impl Into<String>) -> ShadowError {
    ShadowError::Snapshot { path: path.to_path_buf(), detail: detail.into() }
}
