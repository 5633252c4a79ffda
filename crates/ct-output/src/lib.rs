//! `ct-output` — usual location results, one row per person.
//!
//! ```text
//! HHID,HomeTAZ,HomeSubZone,Income,PersonID,PersonNum,PersonType,PersonAge,
//! EmploymentCategory,StudentCategory,WorkLocation,WorkSubZone,SchoolLocation,SchoolSubZone
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut writer = CsvResultWriter::create(&result_path(&base, 1))?;
//! write_results(store.as_slice(), &mut writer, DEFAULT_BATCH_SIZE)?;
//! ```

pub mod batch;
pub mod csv;
pub mod error;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use batch::{DEFAULT_BATCH_SIZE, result_path, write_results};
pub use crate::csv::{CsvResultWriter, HEADER};
pub use error::{OutputError, OutputResult};
pub use row::PersonResultRow;
pub use writer::ResultWriter;
