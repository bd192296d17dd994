use fundsheet_core::{PipelineError, SettingsError};
use fundsheet_sheets::StoreError;
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("invalid input: {0}")]
    Input(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Settings(_) | Self::Input(_) => 2,
            Self::Pipeline(error) => match error {
                PipelineError::InvalidInput(_) => 2,
                PipelineError::Source(_) | PipelineError::Task(_) => 3,
                PipelineError::Store(_) => 4,
                PipelineError::Mapping(_) => 5,
            },
            Self::Store(_) => 4,
            Self::Serialization(_) | Self::Io(_) => 10,
        }
    }
}
