use std::error::Error as StdError;

use thiserror::Error;

/// Boxed transport-layer cause carried by [`CatalogError::Network`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid response - server returned status {0}")]
    InvalidResponse(u16),

    #[error("Failed to decode recipe catalog")]
    Decoding,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    Network(#[source] BoxError),
}

/// Error classification without the wrapped cause, for comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidUrl,
    InvalidResponse,
    Decoding,
    Storage,
    Network,
}

impl CatalogError {
    /// Wrap any transport failure as a `Network` error.
    pub fn network<E>(cause: E) -> Self
    where
        E: Into<BoxError>,
    {
        CatalogError::Network(cause.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            CatalogError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            CatalogError::Decoding => ErrorKind::Decoding,
            CatalogError::Storage(_) => ErrorKind::Storage,
            CatalogError::Network(_) => ErrorKind::Network,
        }
    }

    /// Message suitable for a dismissible banner in the UI.
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::InvalidUrl(_) => "The recipe source is misconfigured.".to_string(),
            CatalogError::InvalidResponse(429) => {
                "Server is busy. Please wait a moment and try again.".to_string()
            }
            CatalogError::InvalidResponse(status) => {
                format!("The recipe server responded with an error ({}).", status)
            }
            CatalogError::Decoding => "The recipe data could not be read.".to_string(),
            CatalogError::Storage(_) => "Saved recipes could not be accessed.".to_string(),
            CatalogError::Network(_) => "Network error. Check your connection.".to_string(),
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return CatalogError::InvalidResponse(status.as_u16());
        }
        if err.is_decode() {
            return CatalogError::Decoding;
        }
        CatalogError::Network(Box::new(err))
    }
}

impl From<rusqlite::Error> for CatalogError {
    fn from(err: rusqlite::Error) -> Self {
        CatalogError::Storage(err.to_string())
    }
}

impl From<tokio::task::JoinError> for CatalogError {
    fn from(err: tokio::task::JoinError) -> Self {
        CatalogError::Storage(format!("storage task failed: {}", err))
    }
}
