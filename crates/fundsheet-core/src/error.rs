use thiserror::Error;

use fundsheet_sheets::StoreError;

use crate::data_source::SourceError;

/// Raw catalog record that cannot be flattened into rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("fund group has no id")]
    MissingGroupId,

    #[error("fund group '{group_id}' has no class list")]
    MissingClasses { group_id: String },

    #[error("class #{position} of fund group '{group_id}' has no id")]
    MissingClassId { group_id: String, position: usize },

    #[error("fund group '{group_id}' has unparsable settlement days '{value}'")]
    InvalidSettlementDays { group_id: String, value: String },
}

/// Failure that ends a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("worker task failed: {0}")]
    Task(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<tokio::task::JoinError> for PipelineError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::Task(error.to_string())
    }
}
