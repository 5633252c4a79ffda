//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

use crate::HouseholdId;

/// Errors raised by the core primitives: property parsing and random streams.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing required property {0:?}")]
    MissingProperty(String),

    #[error("property {key:?}: cannot parse {value:?} as {expected}")]
    BadProperty {
        key:      String,
        value:    String,
        expected: &'static str,
    },

    #[error("parse error: {0}")]
    Parse(String),

    /// A rewind asked for a draw count the stream has not reached yet.  This
    /// always means the pipeline ran stages out of order.
    #[error("{household}: cannot rewind random stream to count {requested}, current count is {current}")]
    RewindPastCounter {
        household: HouseholdId,
        requested: u64,
        current:   u64,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for the core crate.
pub type CoreResult<T> = Result<T, CoreError>;
