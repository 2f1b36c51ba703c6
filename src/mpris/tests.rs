use super::*;
use crate::player::fake::FakeOutput;
use crate::player::{DeviceEvent, PlaybackEngine};
use std::sync::mpsc;
use std::time::Duration;

fn make_track() -> Track {
    Track {
        id: 7,
        title: "Test Title".to_string(),
        artist: "Test Artist".to_string(),
        album: Some("Test Album".to_string()),
        preview_url: Some("https://audio.example/7.m4a".to_string()),
        duration_ms: Some(200_000),
        cover_url: Some("https://is1.example/7/1200x1200bb.jpg".to_string()),
        detail_url: None,
    }
}

fn handle() -> (MprisHandle, Arc<Mutex<SharedState>>, mpsc::Receiver<()>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();
    let handle = MprisHandle {
        state: state.clone(),
        notify: notify_tx,
    };
    (handle, state, notify_rx)
}

#[test]
fn set_track_metadata_sets_and_clears_shared_state() {
    let (handle, state, _rx) = handle();

    let track = make_track();
    handle.set_track_metadata(Some(&track), Some(Duration::from_micros(1_234_567)));

    {
        let s = state.lock().unwrap();
        assert_eq!(s.title.as_deref(), Some("Test Title"));
        assert_eq!(s.artist, vec!["Test Artist".to_string()]);
        assert_eq!(s.album.as_deref(), Some("Test Album"));
        assert_eq!(s.url.as_deref(), Some("https://audio.example/7.m4a"));
        assert_eq!(
            s.art_url.as_deref(),
            Some("https://is1.example/7/1200x1200bb.jpg")
        );
        assert_eq!(s.length_micros, Some(1_234_567));
        assert_eq!(
            s.track_id.as_ref().map(|p| p.as_str()),
            Some("/org/mpris/MediaPlayer2/track/7")
        );
    }

    handle.set_playback(TransportState::Paused);
    handle.set_track_metadata(None, None);
    {
        let s = state.lock().unwrap();
        assert_eq!(s.title, None);
        assert!(s.artist.is_empty());
        assert_eq!(s.album, None);
        assert_eq!(s.url, None);
        assert_eq!(s.length_micros, None);
        assert!(s.track_id.is_none());
        assert_eq!(s.playback, TransportState::Paused);
    }
}

#[test]
fn changes_are_notified_once_and_repeats_are_not() {
    let (handle, _state, rx) = handle();
    let track = make_track();

    handle.set_track_metadata(Some(&track), None);
    handle.set_track_metadata(Some(&track), None);
    handle.set_playback(TransportState::Playing);
    handle.set_playback(TransportState::Playing);

    assert_eq!(rx.try_iter().count(), 2);
}

#[test]
fn playback_status_maps_transport_to_mpris_strings() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    for (transport, expected) in [
        (TransportState::Idle, "Stopped"),
        (TransportState::Loading, "Playing"),
        (TransportState::Playing, "Playing"),
        (TransportState::Paused, "Paused"),
        (TransportState::Ended, "Stopped"),
    ] {
        state.lock().unwrap().playback = transport;
        assert_eq!(iface.playback_status(), expected, "{transport:?}");
    }
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let (handle, state, _rx) = handle();
    let (tx, _cmd_rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };
    assert!(iface.metadata().is_empty());

    handle.set_track_metadata(Some(&make_track()), Some(Duration::from_secs(30)));
    let map = iface.metadata();
    for k in [
        "mpris:trackid",
        "xesam:title",
        "xesam:artist",
        "xesam:album",
        "mpris:artUrl",
        "xesam:url",
        "mpris:length",
    ] {
        assert!(map.contains_key(k), "missing key: {k}");
    }
}

#[test]
fn interface_methods_forward_commands() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface { tx, state };

    iface.play_pause();
    iface.next();
    iface.previous();
    iface.stop();
    assert_eq!(
        rx.try_iter().collect::<Vec<_>>(),
        vec![
            ControlCmd::PlayPause,
            ControlCmd::Next,
            ControlCmd::Prev,
            ControlCmd::Stop
        ]
    );
}

fn engine_with_queue() -> (PlaybackEngine<FakeOutput>, mpsc::Sender<DeviceEvent>) {
    let (tx, rx) = mpsc::channel();
    let mut engine = PlaybackEngine::new(FakeOutput::default(), rx, 1.0);
    let tracks = (0..3)
        .map(|i| Track {
            id: i,
            preview_url: Some(format!("https://audio.example/{i}.m4a")),
            ..make_track()
        })
        .collect();
    engine.load_queue(tracks, None);
    (engine, tx)
}

#[test]
fn remote_commands_drive_the_engine() {
    let (mut engine, tx) = engine_with_queue();

    assert!(!apply_control(ControlCmd::Pause, &mut engine));
    assert_eq!(engine.transport(), TransportState::Idle);

    apply_control(ControlCmd::Play, &mut engine);
    assert_eq!(engine.index(), Some(0));
    let ticket = engine.output().last_play();
    tx.send(DeviceEvent::PlayResolved { ticket }).unwrap();
    engine.pump_events();
    assert_eq!(engine.transport(), TransportState::Playing);

    // Play while playing changes nothing.
    let calls = engine.output().calls.len();
    apply_control(ControlCmd::Play, &mut engine);
    assert_eq!(engine.output().calls.len(), calls);

    apply_control(ControlCmd::Pause, &mut engine);
    assert_eq!(engine.transport(), TransportState::Paused);
    apply_control(ControlCmd::PlayPause, &mut engine);
    assert_eq!(engine.transport(), TransportState::Playing);

    apply_control(ControlCmd::Next, &mut engine);
    assert_eq!(engine.index(), Some(1));
    apply_control(ControlCmd::Prev, &mut engine);
    assert_eq!(engine.index(), Some(0));

    apply_control(ControlCmd::Stop, &mut engine);
    assert_eq!(engine.index(), None);
    assert!(apply_control(ControlCmd::Quit, &mut engine));
}
