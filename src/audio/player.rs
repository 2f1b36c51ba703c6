use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::warn;

use crate::config::AudioSettings;
use crate::player::{AudioOutput, DeviceEvent, PlayTicket};

use super::thread::spawn_device_thread;
use super::types::{DeviceCmd, DeviceError};

/// The real audio output: a command handle to the device thread.
///
/// The source URL is mirrored here so `source()` answers synchronously.
pub struct RodioOutput {
    tx: Sender<DeviceCmd>,
    source: Option<String>,
    join: Option<JoinHandle<()>>,
}

impl RodioOutput {
    /// Open the default output device. The receiver carries every
    /// [`DeviceEvent`] and belongs to the playback engine.
    pub fn open(settings: &AudioSettings) -> Result<(Self, Receiver<DeviceEvent>), DeviceError> {
        let (tx, rx) = mpsc::channel::<DeviceCmd>();
        let (events_tx, events_rx) = mpsc::channel::<DeviceEvent>();
        let join = spawn_device_thread(settings, tx.clone(), rx, events_tx)?;
        Ok((
            Self {
                tx,
                source: None,
                join: Some(join),
            },
            events_rx,
        ))
    }

    fn send(&self, cmd: DeviceCmd) {
        if let Err(e) = self.tx.send(cmd) {
            warn!(cmd = ?e.0, "audio thread is gone, dropping command");
        }
    }
}

impl AudioOutput for RodioOutput {
    fn set_source(&mut self, url: &str) {
        self.source = Some(url.to_string());
        self.send(DeviceCmd::SetSource(url.to_string()));
    }

    fn clear_source(&mut self) {
        self.source = None;
        self.send(DeviceCmd::ClearSource);
    }

    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn pause(&mut self) {
        self.send(DeviceCmd::Pause);
    }

    fn play(&mut self, ticket: PlayTicket) {
        self.send(DeviceCmd::Play(ticket));
    }

    fn reload(&mut self) {
        self.send(DeviceCmd::Reload);
    }

    fn set_position(&mut self, position: Duration) {
        self.send(DeviceCmd::Seek(position));
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(DeviceCmd::SetVolume(volume));
    }
}

impl Drop for RodioOutput {
    fn drop(&mut self) {
        let _ = self.tx.send(DeviceCmd::Quit);
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}
