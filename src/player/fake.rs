//! Recording stand-in for the audio output, shared by unit tests.

use std::time::Duration;

use super::device::{AudioOutput, PlayTicket};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    SetSource(String),
    ClearSource,
    Pause,
    Play(PlayTicket),
    Reload,
    SetPosition(Duration),
    SetVolume(f32),
}

/// Records every command and models whether anything is audible.
#[derive(Default)]
pub(crate) struct FakeOutput {
    pub(crate) calls: Vec<Call>,
    pub(crate) source: Option<String>,
    pub(crate) audible: bool,
    pub(crate) overlapped: bool,
}

impl FakeOutput {
    pub(crate) fn plays(&self) -> Vec<PlayTicket> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Play(t) => Some(*t),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn last_play(&self) -> PlayTicket {
        *self.plays().last().expect("no play issued")
    }
}

impl AudioOutput for FakeOutput {
    fn set_source(&mut self, url: &str) {
        if self.audible {
            self.overlapped = true;
        }
        self.source = Some(url.to_string());
        self.calls.push(Call::SetSource(url.to_string()));
    }

    fn clear_source(&mut self) {
        self.source = None;
        self.audible = false;
        self.calls.push(Call::ClearSource);
    }

    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn pause(&mut self) {
        self.audible = false;
        self.calls.push(Call::Pause);
    }

    fn play(&mut self, ticket: PlayTicket) {
        self.audible = self.source.is_some();
        self.calls.push(Call::Play(ticket));
    }

    fn reload(&mut self) {
        self.calls.push(Call::Reload);
    }

    fn set_position(&mut self, position: Duration) {
        self.calls.push(Call::SetPosition(position));
    }

    fn set_volume(&mut self, volume: f32) {
        self.calls.push(Call::SetVolume(volume));
    }
}
