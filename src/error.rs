// Domain errors raised by the store before any state is touched

use thiserror::Error;

/// Errors the store raises on bad caller input.
///
/// These travel inside `eyre::Report`; use `report.downcast_ref::<StoreError>()`
/// to tell them apart from persistence failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl StoreError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        StoreError::InvalidArgument(message.into())
    }
}

/// Returns true when the report carries a `StoreError::InvalidArgument`.
pub fn is_invalid_argument(report: &eyre::Report) -> bool {
    matches!(report.downcast_ref::<StoreError>(), Some(StoreError::InvalidArgument(_)))
}
