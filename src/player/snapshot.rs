use std::sync::Arc;

use super::track::Track;

/// Transport mode of the engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TransportState {
    /// Nothing selected; no source attached.
    #[default]
    Idle,
    /// A track is selected and a play attempt is outstanding or waiting for
    /// the device to become ready.
    Loading,
    Playing,
    Paused,
    /// The current track finished and nothing follows it.
    Ended,
}

impl TransportState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Stopped",
            Self::Loading => "Loading",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Ended => "Ended",
        }
    }
}

/// Read-only view of the engine handed to presentation layers.
#[derive(Debug, Clone)]
pub struct PlayerSnapshot {
    pub queue: Arc<[Track]>,
    pub index: Option<usize>,
    pub current_track: Option<Track>,
    pub transport: TransportState,
    pub is_playing: bool,
    pub progress_ratio: f64,
    pub current_time_seconds: f64,
    pub duration_seconds: f64,
    pub volume: f32,
}

impl Default for PlayerSnapshot {
    fn default() -> Self {
        Self {
            queue: Arc::from(Vec::new()),
            index: None,
            current_track: None,
            transport: TransportState::Idle,
            is_playing: false,
            progress_ratio: 0.0,
            current_time_seconds: 0.0,
            duration_seconds: 0.0,
            volume: 0.0,
        }
    }
}
