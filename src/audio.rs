//! The concrete audio output, built on `rodio`.
//!
//! A dedicated thread owns the output stream and at most one `Sink`.
//! [`RodioOutput`] is the command side of that thread and implements
//! [`crate::player::AudioOutput`]; previews are fetched on short-lived helper
//! threads and decoded from memory.

mod fetch;
mod player;
mod sink;
mod thread;
mod types;

pub use fetch::FetchError;
pub use player::RodioOutput;
pub use types::DeviceError;

#[cfg(test)]
mod tests;
