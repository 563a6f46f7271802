use thiserror::Error;

use crate::modules::kv::KvError;

#[derive(Debug, Error)]
pub enum LocationStoreError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("location '{0}' already exists")]
    DuplicateEntity(String),

    #[error("location '{0}' not found")]
    NotFound(String),

    #[error("backend unavailable: {0}")]
    BackendUnavailable(#[from] KvError),

    /// A multi-index write failed part way through.
    ///
    /// `rolled_back` reports whether every compensating write succeeded; when it
    /// is false the indexes may disagree until the location is rewritten.
    #[error("{operation} of location '{id}' failed part way (rolled back: {rolled_back}): {source}")]
    InconsistentState {
        operation: &'static str,
        id: String,
        rolled_back: bool,
        #[source]
        source: KvError,
    },
}

pub type StoreResult<T> = std::result::Result<T, LocationStoreError>;
