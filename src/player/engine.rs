//! The playback engine: one queue, one position, one transport state, and the
//! single [`AudioOutput`] they drive.
//!
//! Every public operation is synchronous and never fails. Work that completes
//! later on the device (play outcome, readiness, progress, end of stream) is
//! delivered through [`PlaybackEngine::pump_events`], which the owner calls
//! from its loop. Each track switch bumps `epoch`; deferred work captured
//! under an older epoch is dropped when it finally arrives.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::device::{AudioOutput, DeviceEvent, PlayRejection, PlayTicket};
use super::snapshot::{PlayerSnapshot, TransportState};
use super::track::Track;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum PlayKind {
    /// First attempt of a track switch.
    Initial,
    /// The single automatic retry after the device reported ready.
    Retry,
    /// User resumed a paused/ended/loading track.
    Resume,
}

#[derive(Debug, Copy, Clone)]
struct PendingPlay {
    ticket: PlayTicket,
    epoch: u64,
    kind: PlayKind,
}

pub struct PlaybackEngine<O: AudioOutput> {
    output: O,
    events: Receiver<DeviceEvent>,

    queue: Arc<[Track]>,
    index: Option<usize>,
    transport: TransportState,
    volume: f32,

    // Last clock report from the device for the current source.
    current_time: Duration,
    duration: Option<Duration>,

    epoch: u64,
    last_ticket: PlayTicket,
    pending: Option<PendingPlay>,
    // One-shot "retry when ready" listener, valid only for this epoch.
    armed_retry: Option<u64>,
    // Epoch whose automatic retry has already been used.
    retried_epoch: Option<u64>,
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

impl<O: AudioOutput> PlaybackEngine<O> {
    /// Take ownership of `output` and the receiving end of its event channel.
    /// The initial volume is clamped and applied immediately.
    pub fn new(mut output: O, events: Receiver<DeviceEvent>, volume: f32) -> Self {
        let volume = clamp_unit(volume);
        output.set_volume(volume);
        Self {
            output,
            events,
            queue: Arc::from(Vec::new()),
            index: None,
            transport: TransportState::Idle,
            volume,
            current_time: Duration::ZERO,
            duration: None,
            epoch: 0,
            last_ticket: 0,
            pending: None,
            armed_retry: None,
            retried_epoch: None,
        }
    }

    pub fn transport(&self) -> TransportState {
        self.transport
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn queue(&self) -> &[Track] {
        &self.queue
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.index.and_then(|i| self.queue.get(i))
    }

    /// Replace the whole queue. With an in-range `start`, switch to it;
    /// otherwise leave nothing selected.
    pub fn load_queue(&mut self, tracks: Vec<Track>, start: Option<usize>) {
        info!(len = tracks.len(), ?start, "loading queue");
        self.reset_selection();
        self.queue = Arc::from(tracks);
        if let Some(i) = start.filter(|&i| i < self.queue.len()) {
            self.switch_to(i);
        }
    }

    /// Switch to `index`. Out-of-range indices are ignored.
    pub fn play_at(&mut self, index: usize) {
        if index >= self.queue.len() {
            debug!(index, len = self.queue.len(), "play_at out of range, ignoring");
            return;
        }
        self.switch_to(index);
    }

    pub fn toggle(&mut self) {
        if self.current_track().is_none() {
            if !self.queue.is_empty() {
                self.switch_to(self.index.unwrap_or(0));
            }
            return;
        }

        match self.transport {
            TransportState::Playing => {
                self.pending = None;
                self.output.pause();
                self.transport = TransportState::Paused;
            }
            TransportState::Paused => {
                self.transport = TransportState::Playing;
                self.request_play(PlayKind::Resume);
            }
            TransportState::Ended => {
                // The device restarts a drained source from zero.
                self.current_time = Duration::ZERO;
                self.transport = TransportState::Playing;
                self.request_play(PlayKind::Resume);
            }
            TransportState::Loading => {
                // The device is not audible yet; the user asking again means "go now".
                self.request_play(PlayKind::Resume);
            }
            TransportState::Idle => {}
        }
    }

    pub fn next(&mut self) {
        if let Some(i) = self.index {
            if i + 1 < self.queue.len() {
                self.switch_to(i + 1);
            }
        }
    }

    /// Go back one track, or rewind when already at the first one.
    pub fn prev(&mut self) {
        match self.index {
            Some(0) => {
                self.output.set_position(Duration::ZERO);
                self.current_time = Duration::ZERO;
            }
            Some(i) => {
                self.switch_to(i - 1);
            }
            None => {}
        }
    }

    /// Seek to `ratio` of the known duration. Only honoured while playing or
    /// paused, and ignored while the duration is unknown.
    pub fn seek(&mut self, ratio: f64) {
        if !matches!(
            self.transport,
            TransportState::Playing | TransportState::Paused
        ) || self.current_track().is_none()
            || ratio.is_nan()
        {
            debug!(transport = ?self.transport, "seek ignored");
            return;
        }
        let Some(duration) = self.duration else {
            debug!("seek ignored, duration unknown");
            return;
        };
        let target = duration.mul_f64(ratio.clamp(0.0, 1.0));
        self.output.set_position(target);
        self.current_time = target;
    }

    pub fn set_volume(&mut self, level: f32) {
        self.volume = clamp_unit(level);
        self.output.set_volume(self.volume);
    }

    /// Halt playback, detach the source and forget the selection. The queue stays.
    pub fn stop(&mut self) {
        debug!("stop");
        self.reset_selection();
    }

    /// Drain every event the device has reported so far.
    pub fn pump_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    pub fn handle_event(&mut self, event: DeviceEvent) {
        match event {
            DeviceEvent::Progress {
                source,
                current,
                duration,
            } => {
                if !self.is_current_source(&source) {
                    return;
                }
                // Until the device knows the length there is nothing meaningful to show.
                let Some(duration) = duration.filter(|d| !d.is_zero()) else {
                    return;
                };
                self.current_time = current.min(duration);
                self.duration = Some(duration);
            }
            DeviceEvent::Ended { source } => {
                if !self.is_current_source(&source) || self.transport != TransportState::Playing {
                    debug!(%source, "ignoring stale ended");
                    return;
                }
                self.on_ended();
            }
            DeviceEvent::CanPlay { source } => {
                if self.armed_retry != Some(self.epoch) || !self.is_current_source(&source) {
                    return;
                }
                self.armed_retry = None;
                self.retried_epoch = Some(self.epoch);
                debug!(epoch = self.epoch, "device ready, retrying play once");
                self.request_play(PlayKind::Retry);
            }
            DeviceEvent::LoadFailed { source } => {
                if !self.is_current_source(&source) {
                    return;
                }
                warn!(%source, "preview could not be loaded");
                if matches!(
                    self.transport,
                    TransportState::Loading | TransportState::Playing
                ) {
                    self.give_up();
                }
            }
            DeviceEvent::PlayResolved { ticket } => {
                let Some(pending) = self.take_pending(ticket) else {
                    return;
                };
                debug!(kind = ?pending.kind, epoch = pending.epoch, "play resolved");
                self.armed_retry = None;
                self.transport = TransportState::Playing;
            }
            DeviceEvent::PlayRejected { ticket, reason } => {
                let Some(pending) = self.take_pending(ticket) else {
                    return;
                };
                match reason {
                    PlayRejection::NotReady if self.retried_epoch != Some(pending.epoch) => {
                        debug!(kind = ?pending.kind, epoch = pending.epoch, "device not ready, waiting");
                        self.armed_retry = Some(pending.epoch);
                        self.transport = TransportState::Loading;
                    }
                    _ => {
                        debug!(kind = ?pending.kind, ?reason, "play failed, giving up");
                        self.give_up();
                    }
                }
            }
        }
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        let current_time_seconds = self.current_time.as_secs_f64();
        let duration_seconds = self.duration.map_or(0.0, |d| d.as_secs_f64());
        let progress_ratio = if duration_seconds > 0.0 {
            (current_time_seconds / duration_seconds).clamp(0.0, 1.0)
        } else {
            0.0
        };
        PlayerSnapshot {
            queue: Arc::clone(&self.queue),
            index: self.index,
            current_track: self.current_track().cloned(),
            transport: self.transport,
            is_playing: self.transport == TransportState::Playing,
            progress_ratio,
            current_time_seconds,
            duration_seconds,
            volume: self.volume,
        }
    }

    #[cfg(test)]
    pub(crate) fn output(&self) -> &O {
        &self.output
    }

    /// Track-switch protocol. Returns false when the target is unplayable.
    fn switch_to(&mut self, index: usize) -> bool {
        let Some(track) = self.queue.get(index) else {
            return false;
        };
        let Some(url) = track.preview_url.clone() else {
            info!(index, title = %track.title, "track has no preview, not switching");
            self.halt();
            return false;
        };

        self.supersede();
        self.index = Some(index);
        self.transport = TransportState::Loading;
        self.current_time = Duration::ZERO;
        self.duration = None;
        info!(index, epoch = self.epoch, %url, "switching track");

        // Never let two sources overlap, even for one buffer.
        self.output.pause();
        if self.output.source() != Some(url.as_str()) {
            self.output.set_source(&url);
        }
        self.output.reload();
        self.request_play(PlayKind::Initial);
        true
    }

    fn on_ended(&mut self) {
        let Some(i) = self.index else {
            return;
        };
        if i + 1 < self.queue.len() && self.switch_to(i + 1) {
            return;
        }
        self.supersede();
        self.transport = TransportState::Ended;
    }

    fn request_play(&mut self, kind: PlayKind) {
        self.last_ticket += 1;
        let ticket = self.last_ticket;
        self.pending = Some(PendingPlay {
            ticket,
            epoch: self.epoch,
            kind,
        });
        self.output.play(ticket);
    }

    fn take_pending(&mut self, ticket: PlayTicket) -> Option<PendingPlay> {
        match self.pending {
            Some(p) if p.ticket == ticket && p.epoch == self.epoch => self.pending.take(),
            _ => {
                debug!(ticket, "dropping outcome of superseded play request");
                None
            }
        }
    }

    /// Invalidate every deferred action issued under the current epoch.
    fn supersede(&mut self) {
        self.epoch += 1;
        self.pending = None;
        self.armed_retry = None;
    }

    /// Abort without switching: whatever is current stops being audible.
    fn halt(&mut self) {
        self.supersede();
        if matches!(
            self.transport,
            TransportState::Playing | TransportState::Loading
        ) {
            self.output.pause();
            self.transport = TransportState::Paused;
        }
    }

    fn give_up(&mut self) {
        self.pending = None;
        self.armed_retry = None;
        self.output.pause();
        self.transport = if self.current_track().is_some() {
            TransportState::Paused
        } else {
            TransportState::Idle
        };
    }

    fn reset_selection(&mut self) {
        self.supersede();
        self.output.pause();
        if self.output.source().is_some() {
            self.output.clear_source();
        }
        self.index = None;
        self.transport = TransportState::Idle;
        self.current_time = Duration::ZERO;
        self.duration = None;
    }

    fn is_current_source(&self, source: &str) -> bool {
        self.current_track().is_some() && self.output.source() == Some(source)
    }
}
