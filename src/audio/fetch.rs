//! Getting preview bytes into memory: HTTP(S) through `reqwest`, or a local
//! file for `file://` URLs and bare paths.

use std::path::PathBuf;
use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("preview request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("preview request failed with status {0}")]
    Status(StatusCode),

    #[error("preview is empty")]
    Empty,
}

/// Local filesystem path for `url`, if it does not name a remote resource.
pub(crate) fn local_path(url: &str) -> Option<PathBuf> {
    if let Some(rest) = url.strip_prefix("file://") {
        return Some(PathBuf::from(rest));
    }
    if url.contains("://") {
        return None;
    }
    Some(PathBuf::from(url))
}

/// Lower-cased file extension of the last path segment, used as a decoder hint.
pub(crate) fn extension_hint(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = segment.rsplit_once('.')?;
    if ext.is_empty() || ext.len() > 5 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub(crate) fn fetch_bytes(client: &Client, url: &str) -> Result<Arc<[u8]>, FetchError> {
    let bytes: Vec<u8> = match local_path(url) {
        Some(path) => std::fs::read(&path).map_err(|source| FetchError::Read { path, source })?,
        None => {
            let resp = client.get(url).send()?;
            let status = resp.status();
            if !status.is_success() {
                return Err(FetchError::Status(status));
            }
            resp.bytes()?.to_vec()
        }
    };
    if bytes.is_empty() {
        return Err(FetchError::Empty);
    }
    Ok(Arc::from(bytes))
}
