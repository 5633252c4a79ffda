use ct_core::{CoreError, HouseholdId};
use ct_household::HouseholdError;
use ct_pipeline::PipelineError;
use thiserror::Error;

use crate::Packet;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("execution configuration error: {0}")]
    Config(String),

    /// A household failed; the whole run stops.
    #[error("packet {packet}: household {household} at index {index} failed: {source}")]
    PacketFailed {
        packet:    Packet,
        household: HouseholdId,
        index:     usize,
        #[source]
        source:    PipelineError,
    },

    #[error("worker failure: {0}")]
    Worker(String),

    #[error(transparent)]
    Household(#[from] HouseholdError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type ExecResult<T> = Result<T, ExecError>;
