use derive_builder::UninitializedFieldError;
use thiserror::Error;

/// Everything that can go wrong while answering a single query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The query ran fine but matched nothing the caller could use.
    #[error("{0}")]
    NotFound(String),

    #[error("invalid value {value:?} for filter {field}")]
    InvalidFilter { field: String, value: String },

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("incomplete query: {0}")]
    Incomplete(#[from] UninitializedFieldError),

    #[error(transparent)]
    Store(#[from] sqlx::Error),

    #[error("fail to serialize rows: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl QueryError {
    /// True when the caller sent something unusable, rather than the store failing.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidFilter { .. } | Self::UnknownField(_))
    }
}
