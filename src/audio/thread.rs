use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, info, warn};

use crate::config::AudioSettings;
use crate::player::{DeviceEvent, PlayRejection, PlayTicket};

use super::fetch::{extension_hint, fetch_bytes};
use super::sink::create_paused_sink;
use super::types::{DeviceCmd, DeviceError};

enum Bytes {
    None,
    Pending,
    Ready(Arc<[u8]>),
    Failed,
}

struct Device {
    stream: OutputStream,
    http: Client,
    cmd_tx: Sender<DeviceCmd>,
    events: Sender<DeviceEvent>,

    source: Option<String>,
    generation: u64,
    bytes: Bytes,
    sink: Option<Sink>,
    duration: Option<Duration>,

    playing: bool,
    ended_reported: bool,
    volume: f32,
}

/// Spawn the thread owning the output stream. Returns once the stream is open
/// (or failed to open).
pub(super) fn spawn_device_thread(
    settings: &AudioSettings,
    cmd_tx: Sender<DeviceCmd>,
    rx: Receiver<DeviceCmd>,
    events: Sender<DeviceEvent>,
) -> Result<JoinHandle<()>, DeviceError> {
    let http = Client::builder()
        .user_agent(concat!("encore/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_millis(settings.fetch_timeout_ms))
        .build()
        .map_err(DeviceError::Client)?;
    let interval = Duration::from_millis(settings.progress_interval_ms);
    let (ready_tx, ready_rx) = std::sync::mpsc::channel::<Result<(), DeviceError>>();

    let handle = thread::Builder::new()
        .name("encore-audio".into())
        .spawn(move || {
            let mut stream = match OutputStreamBuilder::open_default_stream() {
                Ok(s) => s,
                Err(e) => {
                    let _ = ready_tx.send(Err(e.into()));
                    return;
                }
            };
            // rodio logs to stderr when OutputStream is dropped, which would
            // scribble over the TUI.
            stream.log_on_drop(false);
            let _ = ready_tx.send(Ok(()));

            let mut device = Device {
                stream,
                http,
                cmd_tx,
                events,
                source: None,
                generation: 0,
                bytes: Bytes::None,
                sink: None,
                duration: None,
                playing: false,
                ended_reported: false,
                volume: 1.0,
            };
            device.run(rx, interval);
        })
        .map_err(DeviceError::Spawn)?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(handle),
        Ok(Err(e)) => {
            let _ = handle.join();
            Err(e)
        }
        Err(_) => {
            let _ = handle.join();
            Err(DeviceError::Startup)
        }
    }
}

impl Device {
    fn run(&mut self, rx: Receiver<DeviceCmd>, interval: Duration) {
        let mut last_tick = Instant::now();
        loop {
            let wait = interval.saturating_sub(last_tick.elapsed());
            match rx.recv_timeout(wait) {
                Ok(DeviceCmd::Quit) => break,
                Ok(cmd) => self.handle(cmd),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            if last_tick.elapsed() >= interval {
                last_tick = Instant::now();
                self.tick();
            }
        }
        self.drop_sink();
        debug!("audio thread stopped");
    }

    fn emit(&self, event: DeviceEvent) {
        // The engine going away first is normal during shutdown.
        let _ = self.events.send(event);
    }

    fn handle(&mut self, cmd: DeviceCmd) {
        match cmd {
            DeviceCmd::SetSource(url) => {
                self.drop_sink();
                self.source = Some(url);
                self.start_fetch();
            }
            DeviceCmd::ClearSource => {
                self.drop_sink();
                self.generation += 1;
                self.source = None;
                self.bytes = Bytes::None;
            }
            DeviceCmd::Pause => {
                if let Some(sink) = &self.sink {
                    sink.pause();
                }
                self.playing = false;
            }
            DeviceCmd::Play(ticket) => self.play(ticket),
            DeviceCmd::Reload => self.reload(),
            DeviceCmd::Seek(position) => {
                if let Some(sink) = &self.sink {
                    match sink.try_seek(position) {
                        Ok(()) => self.ended_reported = false,
                        Err(e) => warn!(error = %e, ?position, "seek failed"),
                    }
                }
            }
            DeviceCmd::SetVolume(volume) => {
                self.volume = volume;
                if let Some(sink) = &self.sink {
                    sink.set_volume(volume);
                }
            }
            DeviceCmd::Fetched { generation, result } => {
                if generation != self.generation {
                    debug!(generation, current = self.generation, "dropping stale fetch");
                    return;
                }
                match result {
                    Ok(bytes) => {
                        info!(len = bytes.len(), "preview fetched");
                        self.bytes = Bytes::Ready(bytes);
                        self.decode();
                    }
                    Err(e) => {
                        warn!(error = %e, "preview fetch failed");
                        self.bytes = Bytes::Failed;
                        if let Some(source) = self.source.clone() {
                            self.emit(DeviceEvent::LoadFailed { source });
                        }
                    }
                }
            }
            DeviceCmd::Quit => {}
        }
    }

    fn play(&mut self, ticket: PlayTicket) {
        if self.source.is_none() {
            self.emit(DeviceEvent::PlayRejected {
                ticket,
                reason: PlayRejection::NoSource,
            });
            return;
        }
        if self.sink.as_ref().is_some_and(Sink::empty) {
            // Finished earlier; start over from the cached bytes.
            self.decode_quietly();
        }
        let Some(sink) = &self.sink else {
            let reason = match self.bytes {
                Bytes::Pending => PlayRejection::NotReady,
                _ => PlayRejection::NoSource,
            };
            self.emit(DeviceEvent::PlayRejected { ticket, reason });
            return;
        };
        sink.play();
        self.playing = true;
        self.ended_reported = false;
        self.emit(DeviceEvent::PlayResolved { ticket });
    }

    fn reload(&mut self) {
        self.playing = false;
        match self.bytes {
            Bytes::Ready(_) => self.decode(),
            Bytes::Failed => {
                debug!("refetching after failed load");
                self.drop_sink();
                self.start_fetch();
            }
            Bytes::Pending | Bytes::None => {}
        }
    }

    fn start_fetch(&mut self) {
        self.generation += 1;
        self.bytes = Bytes::Pending;
        let Some(url) = self.source.clone() else {
            return;
        };
        let generation = self.generation;
        let http = self.http.clone();
        let tx = self.cmd_tx.clone();
        debug!(%url, generation, "fetching preview");
        thread::spawn(move || {
            let result = fetch_bytes(&http, &url);
            let _ = tx.send(DeviceCmd::Fetched { generation, result });
        });
    }

    /// Rebuild the sink at zero and announce readiness (or failure).
    fn decode(&mut self) {
        let Some(source) = self.source.clone() else {
            return;
        };
        if self.decode_quietly() {
            self.emit(DeviceEvent::CanPlay { source });
        } else {
            self.emit(DeviceEvent::LoadFailed { source });
        }
    }

    fn decode_quietly(&mut self) -> bool {
        self.drop_sink();
        let (Some(source), Bytes::Ready(bytes)) = (&self.source, &self.bytes) else {
            return false;
        };
        let hint = extension_hint(source);
        match create_paused_sink(&self.stream, bytes, hint.as_deref(), self.volume) {
            Ok((sink, duration)) => {
                self.sink = Some(sink);
                self.duration = duration;
                self.ended_reported = false;
                true
            }
            Err(e) => {
                warn!(error = %e, %source, "failed to decode preview");
                false
            }
        }
    }

    fn drop_sink(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.duration = None;
        self.playing = false;
    }

    fn tick(&mut self) {
        if !self.playing {
            return;
        }
        let (Some(sink), Some(source)) = (&self.sink, self.source.clone()) else {
            return;
        };
        if !sink.empty() {
            let current = sink.get_pos();
            self.emit(DeviceEvent::Progress {
                source,
                current,
                duration: self.duration,
            });
            return;
        }
        if !self.ended_reported {
            self.ended_reported = true;
            self.playing = false;
            debug!(%source, "preview ended");
            self.emit(DeviceEvent::Ended { source });
        }
    }
}
