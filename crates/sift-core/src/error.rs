use thiserror::Error;

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Failure reported by a [`KeyValueStore`](crate::store::KeyValueStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Error returned by [`SearchRepository`](crate::repository::SearchRepository)
/// operations.
///
/// A missing search or category is not an error: operations report it through
/// `None`, `false` or zero-count return values instead.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// User input rejected by a category or search rule. The message is meant
    /// to be shown to the user as-is.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RepositoryError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
