//! Commands understood by the device thread and the errors it can surface.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::player::PlayTicket;

use super::fetch::FetchError;

#[derive(Debug)]
pub(super) enum DeviceCmd {
    /// Drop whatever is loaded and start fetching `url`.
    SetSource(String),
    ClearSource,
    Pause,
    Play(PlayTicket),
    /// Rewind to zero, re-decoding cached bytes or refetching after a failure.
    Reload,
    Seek(Duration),
    SetVolume(f32),
    /// Result of a background fetch started under `generation`.
    Fetched {
        generation: u64,
        result: Result<Arc<[u8]>, FetchError>,
    },
    Quit,
}

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no audio output device: {0}")]
    Open(#[from] rodio::StreamError),

    #[error("failed to build http client for previews: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to spawn audio thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("audio thread exited during startup")]
    Startup,
}
