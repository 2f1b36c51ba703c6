//! MPRIS (D-Bus) surface so media keys and `playerctl` can drive the engine.
//!
//! The service runs on its own thread. Remote calls become [`ControlCmd`]s on
//! a channel the runtime drains; the runtime mirrors the engine back through
//! [`MprisHandle`], which signals `PropertiesChanged` when something moved.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_io::{Timer, block_on};
use tracing::{debug, warn};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::player::{AudioOutput, PlaybackEngine, Track, TransportState};

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.encore";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
}

/// Apply a remote command to the engine. Returns true when the app should quit.
pub fn apply_control<O: AudioOutput>(cmd: ControlCmd, engine: &mut PlaybackEngine<O>) -> bool {
    debug!(?cmd, "mpris command");
    match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play => {
            if engine.transport() != TransportState::Playing {
                engine.toggle();
            }
        }
        ControlCmd::Pause => {
            if engine.transport() == TransportState::Playing {
                engine.toggle();
            }
        }
        ControlCmd::PlayPause => engine.toggle(),
        ControlCmd::Stop => engine.stop(),
        ControlCmd::Next => engine.next(),
        ControlCmd::Prev => engine.prev(),
    }
    false
}

#[derive(Debug, Default, Clone, PartialEq)]
struct SharedState {
    playback: TransportState,
    track_id: Option<ObjectPath<'static>>,
    title: Option<String>,
    artist: Vec<String>,
    album: Option<String>,
    art_url: Option<String>,
    url: Option<String>,
    length_micros: Option<i64>,
}

fn playback_status(playback: TransportState) -> &'static str {
    match playback {
        TransportState::Playing | TransportState::Loading => "Playing",
        TransportState::Paused => "Paused",
        TransportState::Idle | TransportState::Ended => "Stopped",
    }
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<()>,
}

impl MprisHandle {
    fn update(&self, f: impl FnOnce(&mut SharedState)) {
        let Ok(mut s) = self.state.lock() else {
            return;
        };
        let before = s.clone();
        f(&mut s);
        if *s != before {
            let _ = self.notify.send(());
        }
    }

    pub fn set_playback(&self, playback: TransportState) {
        self.update(|s| s.playback = playback);
    }

    /// Mirror `track`. `length` is what the device reports for the preview,
    /// when known.
    pub fn set_track_metadata(&self, track: Option<&Track>, length: Option<Duration>) {
        self.update(|s| {
            let Some(t) = track else {
                let playback = s.playback;
                *s = SharedState {
                    playback,
                    ..SharedState::default()
                };
                return;
            };
            s.track_id = ObjectPath::try_from(format!("{OBJECT_PATH}/track/{}", t.id)).ok();
            s.title = Some(t.title.clone());
            s.artist = vec![t.artist.clone()];
            s.album = t.album.clone();
            s.art_url = t.cover_url.clone();
            s.url = t.preview_url.clone();
            s.length_micros = length.and_then(|d| i64::try_from(d.as_micros()).ok());
        });
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {}

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "encore"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

fn insert_value(map: &mut HashMap<String, OwnedValue>, key: &str, value: Value<'_>) {
    if let Ok(v) = OwnedValue::try_from(value) {
        map.insert(key.to_string(), v);
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        playback_status(s.playback)
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        if let Some(id) = &s.track_id {
            insert_value(&mut map, "mpris:trackid", Value::from(id.clone()));
        }
        if let Some(title) = &s.title {
            insert_value(&mut map, "xesam:title", Value::from(title.clone()));
        }
        if !s.artist.is_empty() {
            insert_value(&mut map, "xesam:artist", Value::from(s.artist.clone()));
        }
        if let Some(album) = &s.album {
            insert_value(&mut map, "xesam:album", Value::from(album.clone()));
        }
        if let Some(art) = &s.art_url {
            insert_value(&mut map, "mpris:artUrl", Value::from(art.clone()));
        }
        if let Some(url) = &s.url {
            insert_value(&mut map, "xesam:url", Value::from(url.clone()));
        }
        if let Some(len) = s.length_micros {
            insert_value(&mut map, "mpris:length", Value::from(len));
        }
        map
    }
}

/// Start the MPRIS service. Failure to reach the session bus is logged and
/// leaves the handle working as a no-op sink.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();

    let state_for_thread = state.clone();
    let spawned = std::thread::Builder::new()
        .name("encore-mpris".into())
        .spawn(move || {
            block_on(async move {
                if let Err(e) = serve(tx, state_for_thread, notify_rx).await {
                    warn!(error = %e, "MPRIS unavailable");
                }
            });
        });
    if let Err(e) = spawned {
        warn!(error = %e, "failed to spawn MPRIS thread");
    }

    MprisHandle {
        state,
        notify: notify_tx,
    }
}

async fn serve(
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
    notify: Receiver<()>,
) -> zbus::Result<()> {
    let connection = Connection::session().await?;
    connection.request_name(BUS_NAME).await?;

    let object_server = connection.object_server();
    object_server
        .at(OBJECT_PATH, RootIface { tx: tx.clone() })
        .await?;
    object_server
        .at(OBJECT_PATH, PlayerIface { tx, state })
        .await?;
    let player = object_server
        .interface::<_, PlayerIface>(OBJECT_PATH)
        .await?;
    debug!(name = BUS_NAME, "MPRIS service registered");

    loop {
        Timer::after(Duration::from_millis(200)).await;

        let mut changed = false;
        loop {
            match notify.try_recv() {
                Ok(()) => changed = true,
                Err(mpsc::TryRecvError::Empty) => break,
                // The app is shutting down.
                Err(mpsc::TryRecvError::Disconnected) => return Ok(()),
            }
        }
        if !changed {
            continue;
        }

        let iface = player.get().await;
        let emitter = player.signal_emitter();
        if let Err(e) = iface.playback_status_changed(emitter).await {
            debug!(error = %e, "failed to signal PlaybackStatus");
        }
        if let Err(e) = iface.metadata_changed(emitter).await {
            debug!(error = %e, "failed to signal Metadata");
        }
    }
}

#[cfg(test)]
mod tests;
