//! Playback core: the queue, the transport state machine, and the contract
//! with the audio output they drive.
//!
//! There is exactly one [`PlaybackEngine`] per session. The composition root
//! owns it and lends it to whichever view needs to issue commands or read a
//! [`PlayerSnapshot`].

mod device;
mod engine;
mod loader;
mod snapshot;
mod track;

pub use device::*;
pub use engine::PlaybackEngine;
pub use loader::*;
pub use snapshot::*;
pub use track::Track;

#[cfg(test)]
pub(crate) mod fake;
