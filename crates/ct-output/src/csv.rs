//! CSV result file.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use ::csv::Writer;

use crate::writer::ResultWriter;
use crate::{OutputResult, PersonResultRow};

pub const HEADER: [&str; 14] = [
    "HHID",
    "HomeTAZ",
    "HomeSubZone",
    "Income",
    "PersonID",
    "PersonNum",
    "PersonType",
    "PersonAge",
    "EmploymentCategory",
    "StudentCategory",
    "WorkLocation",
    "WorkSubZone",
    "SchoolLocation",
    "SchoolSubZone",
];

/// Writes person rows to one CSV file, header first.
pub struct CsvResultWriter<W: Write = File> {
    out:      Writer<W>,
    rows:     u64,
    finished: bool,
}

impl CsvResultWriter<File> {
    /// Create (or truncate) `path` and write the header row.
    pub fn create(path: &Path) -> OutputResult<Self> {
        Self::from_writer(File::create(path)?)
    }
}

impl<W: Write> CsvResultWriter<W> {
    pub fn from_writer(inner: W) -> OutputResult<Self> {
        let mut out = Writer::from_writer(inner);
        out.write_record(HEADER)?;
        Ok(Self { out, rows: 0, finished: false })
    }

    /// Rows written so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(mut self) -> OutputResult<W> {
        self.finish()?;
        self.out.into_inner().map_err(|e| e.into_error().into())
    }
}

impl<W: Write> ResultWriter for CsvResultWriter<W> {
    fn write_rows(&mut self, rows: &[PersonResultRow]) -> OutputResult<()> {
        for row in rows {
            self.out.write_record(&[
                row.household_id.to_string(),
                row.home_zone.to_string(),
                row.home_subzone.to_string(),
                row.income.to_string(),
                row.person_id.to_string(),
                row.person_num.to_string(),
                row.person_type.to_string(),
                row.age.to_string(),
                row.employment_category.to_string(),
                row.student_category.to_string(),
                row.work_zone.to_string(),
                row.work_subzone.to_string(),
                row.school_zone.to_string(),
                row.school_subzone.to_string(),
            ])?;
        }
        self.rows += rows.len() as u64;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.out.flush()?;
        Ok(())
    }
}
