//! The `ResultWriter` trait implemented by result backends.

use crate::{OutputResult, PersonResultRow};

pub trait ResultWriter {
    /// Write one batch of rows.
    fn write_rows(&mut self, rows: &[PersonResultRow]) -> OutputResult<()>;

    /// Flush everything written so far.  Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
