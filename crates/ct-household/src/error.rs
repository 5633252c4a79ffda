//! Error types for ct-household.

use ct_core::{CoreError, HouseholdId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HouseholdError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{household}: {detail}")]
    Inconsistent {
        household: HouseholdId,
        detail:    String,
    },

    #[error("packet ranges must be sorted, disjoint and within 0..{len}: {detail}")]
    BadRanges {
        len:    usize,
        detail: String,
    },
}

pub type HouseholdResult<T> = Result<T, HouseholdError>;
