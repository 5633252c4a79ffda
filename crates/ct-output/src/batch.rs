//! Writing a whole household store in fixed-size batches.

use std::path::{Path, PathBuf};

use ct_household::Household;
use log::{debug, info};

use crate::{OutputResult, PersonResultRow, ResultWriter};

/// Households per batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 5000;

/// `out/wsloc.csv` → `out/wsloc_2.csv`; a name without an extension gets
/// the suffix at the end.
pub fn result_path(base: &Path, global_iteration: u32) -> PathBuf {
    let Some(stem) = base.file_stem().and_then(|s| s.to_str()) else {
        return base.to_path_buf();
    };
    let name = match base.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_{global_iteration}.{ext}"),
        None => format!("{stem}_{global_iteration}"),
    };
    base.with_file_name(name)
}

/// Write one row per person of `households`, `batch_size` households at a
/// time (0 means one batch), then finish the writer.  Returns the number of
/// rows written.
pub fn write_results<W: ResultWriter + ?Sized>(
    households: &[Household],
    writer:     &mut W,
    batch_size: usize,
) -> OutputResult<u64> {
    let batch_size = if batch_size == 0 { households.len().max(1) } else { batch_size };
    let mut rows = Vec::new();
    let mut written = 0u64;
    for (i, batch) in households.chunks(batch_size).enumerate() {
        rows.clear();
        rows.extend(batch.iter().flat_map(PersonResultRow::for_household));
        writer.write_rows(&rows)?;
        written += rows.len() as u64;
        debug!("result batch {i}: {} households, {} persons", batch.len(), rows.len());
    }
    writer.finish()?;
    info!("{written} person results written for {} households", households.len());
    Ok(written)
}
