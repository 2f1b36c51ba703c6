//! Turns catalog records into queue entries and hands them to the engine.

use crate::catalog::{AlbumDetail, Song};

use super::device::AudioOutput;
use super::engine::PlaybackEngine;
use super::track::Track;

fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Queue for an album lookup, in album order. Tracks without a preview are
/// kept (they render, but cannot be played).
pub fn album_queue(detail: &AlbumDetail) -> Vec<Track> {
    let album = &detail.album;
    let cover = album.cover_url();
    detail
        .tracks
        .iter()
        .map(|t| Track {
            id: t.track_id,
            title: t.track_name.clone(),
            artist: album.artist_name.clone(),
            album: Some(album.collection_name.clone()),
            preview_url: non_blank(t.preview_url.as_deref()),
            duration_ms: t.track_time_millis,
            cover_url: cover.clone(),
            detail_url: non_blank(t.track_view_url.as_deref()),
        })
        .collect()
}

/// Queue for a song search result list.
pub fn song_queue(songs: &[Song]) -> Vec<Track> {
    songs
        .iter()
        .map(|s| Track {
            id: s.track_id,
            title: s.track_name.clone(),
            artist: s.artist_name.clone(),
            album: non_blank(s.collection_name.as_deref()),
            preview_url: non_blank(s.preview_url.as_deref()),
            duration_ms: s.track_time_millis,
            cover_url: s
                .artwork_url100
                .as_deref()
                .map(|u| u.replace("100x100", "1200x1200")),
            detail_url: non_blank(s.track_view_url.as_deref()),
        })
        .collect()
}

pub fn load_album<O: AudioOutput>(
    engine: &mut PlaybackEngine<O>,
    detail: &AlbumDetail,
    start: Option<usize>,
) {
    engine.load_queue(album_queue(detail), start);
}
