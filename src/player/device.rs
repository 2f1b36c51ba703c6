//! Contract between the playback engine and the one audio output it drives.
//!
//! Commands are fire-and-forget; anything asynchronous (play outcome,
//! readiness, progress, end of stream) comes back as a [`DeviceEvent`] on the
//! channel handed to the engine at construction.

use std::time::Duration;

/// Correlates a `play` request with its eventual outcome.
pub type PlayTicket = u64;

/// Why a play request was refused.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlayRejection {
    /// No source is attached; retrying cannot help.
    NoSource,
    /// A source is attached but not decodable yet. A `CanPlay` follows once it is.
    NotReady,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// Periodic clock report for `source` while it is playing.
    Progress {
        source: String,
        current: Duration,
        duration: Option<Duration>,
    },
    /// `source` played to its natural end.
    Ended { source: String },
    /// `source` became playable (after a load or reload).
    CanPlay { source: String },
    /// `source` could not be fetched or decoded. No `CanPlay` will follow.
    LoadFailed { source: String },
    PlayResolved { ticket: PlayTicket },
    PlayRejected {
        ticket: PlayTicket,
        reason: PlayRejection,
    },
}

/// The single hardware-adjacent resource the engine owns.
///
/// Implementations must apply commands in call order. Assigning a source does
/// not imply the previous one stopped; callers pause first.
pub trait AudioOutput {
    /// Attach `url` as the next source. Loading starts in the background.
    fn set_source(&mut self, url: &str);
    /// Detach the current source and release anything decoded from it.
    fn clear_source(&mut self);
    /// The source most recently assigned, if still attached.
    fn source(&self) -> Option<&str>;
    /// Best-effort synchronous halt.
    fn pause(&mut self);
    /// Ask the device to start or resume. The outcome arrives as
    /// `PlayResolved` or `PlayRejected` carrying `ticket`.
    fn play(&mut self, ticket: PlayTicket);
    /// Rewind to zero and (re)begin loading the current source.
    fn reload(&mut self);
    fn set_position(&mut self, position: Duration);
    /// `volume` is already clamped to `[0, 1]`.
    fn set_volume(&mut self, volume: f32);
}
