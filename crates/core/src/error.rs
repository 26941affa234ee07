use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("Search timed out after {0}ms")]
    Timeout(u64),

    #[error("Search cancelled")]
    Cancelled,

    #[error("Unrecognized response: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Dataset error: {0}")]
    Dataset(String),
}

impl SearchError {
    /// Errors that mean the remote endpoint could not answer, as opposed to the
    /// search being superseded.
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, SearchError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
