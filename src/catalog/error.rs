use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{op} request failed: {source}")]
    Request {
        op: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{op} failed with status {status}")]
    Status {
        op: &'static str,
        status: StatusCode,
    },

    #[error("{op} returned malformed json: {source}")]
    Decode {
        op: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("album {0} not found")]
    AlbumNotFound(u64),

    #[error("search term is empty")]
    EmptyTerm,
}

impl CatalogError {
    /// Whether another attempt has a reasonable chance of succeeding.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Request { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_body()
            }
            Self::Status { status, .. } => is_retriable_status(*status),
            _ => false,
        }
    }
}

pub(crate) fn is_retriable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
