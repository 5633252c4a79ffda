use ct_choice::ChoiceError;
use ct_core::{CoreError, HouseholdId, Stage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline configuration error: {0}")]
    Config(String),

    #[error("{stage} is enabled but its prerequisite {requires} is not")]
    MissingPrerequisite {
        stage:    Stage,
        requires: Stage,
    },

    #[error("unknown restart point {0:?}")]
    BadRestartPoint(String),

    #[error("{household}: {stage} failed: {source}")]
    Stage {
        household: HouseholdId,
        stage:     Stage,
        #[source]
        source:    ChoiceError,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
