use ct_core::{CoreError, HouseholdId, Stage};
use ct_household::HouseholdError;
use thiserror::Error;

use crate::ModelPage;

#[derive(Debug, Error)]
pub enum ChoiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Household(#[from] HouseholdError),

    #[error("{stage}: no alternative available for household {household}")]
    NoAlternatives {
        stage:     Stage,
        household: HouseholdId,
    },

    #[error("{stage}: household {household}, person {person} has no {what}")]
    MissingLocation {
        stage:     Stage,
        household: HouseholdId,
        person:    u8,
        what:      &'static str,
    },

    #[error("page {page}: engine returned {got} utilities for {expected} alternatives")]
    AlternativeCount {
        page:     ModelPage,
        expected: usize,
        got:      usize,
    },
}

pub type ChoiceResult<T> = Result<T, ChoiceError>;
