use thiserror::Error;

/// Errors raised by tabular store operations.
///
/// Request-level variants carry the sheet and range they were issued against
/// so a failed pipeline run can be retried by hand.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid range '{range}': {reason}")]
    InvalidRange { range: String, reason: String },

    #[error("unknown sheet '{0}'")]
    UnknownSheet(String),

    #[error("request to {sheet}!{range} failed: {message}")]
    Request {
        sheet: String,
        range: String,
        message: String,
    },

    #[error("{sheet}!{range} returned status {status}: {body}")]
    Status {
        sheet: String,
        range: String,
        status: u16,
        body: String,
    },

    #[error("malformed response for {sheet}!{range}: {message}")]
    Decode {
        sheet: String,
        range: String,
        message: String,
    },

    #[error("sheets authentication failed: {0}")]
    Auth(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn invalid_range(range: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRange {
            range: range.into(),
            reason: reason.into(),
        }
    }
}
