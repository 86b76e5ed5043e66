use thiserror::Error;

/// Caller contract violations. Remote failures never surface here; they are
/// absorbed per category by the fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SuggestError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl SuggestError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SuggestError::InvalidInput(message.into())
    }
}
