use std::path::PathBuf;

use ct_core::CoreError;
use ct_exec::ExecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShadowError {
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A saved shadow price file that does not fit this run.
    #[error("shadow price file {path}: {detail}")]
    Snapshot { path: PathBuf, detail: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type ShadowResult<T> = Result<T, ShadowError>;
