//! Application model: which screen is showing, what has been fetched for it,
//! and where the cursors are.
//!
//! Nothing here talks to the network or the audio device. The runtime feeds
//! catalog replies in and turns the [`TrackAction`]s handed out here into
//! engine calls.

use crate::catalog::{Album, AlbumDetail, ArtistCatalog, Song};
use crate::player::{Track, album_queue, song_queue};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Albums,
    /// The artist's songs from the search, playable as one queue.
    Songs,
    Album,
}

/// Per-screen fetch state.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Fetch<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Fetch<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// What the engine queue was last loaded from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QueueSource {
    Album(u64),
    Songs,
}

/// Result of activating the highlighted track.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrackAction {
    /// It is already the current track.
    Toggle,
    /// The queue already holds this view.
    PlayAt(usize),
    /// Replace the queue with this view, starting at the index.
    Load(usize),
}

pub struct App {
    pub artist: String,
    pub screen: Screen,
    pub catalog: Fetch<ArtistCatalog>,
    /// Bumped per search. Replies tagged with an older value are stale.
    pub search_seq: u64,

    /// Position in the filtered album view.
    pub album_selected: usize,
    pub filter_mode: bool,
    pub filter_query: String,

    /// Album the user most recently opened. Lookup replies for anything else are stale.
    pub requested_album: Option<u64>,
    pub album: Fetch<AlbumDetail>,

    /// Tracks of the Album or Songs screen, in queue order.
    pub tracks: Vec<Track>,
    pub track_selected: usize,
    pub queue_source: Option<QueueSource>,

    pub follow_playback: bool,
    pub details_window: bool,
}

impl App {
    pub fn new(artist: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            screen: Screen::Albums,
            catalog: Fetch::Idle,
            search_seq: 0,
            album_selected: 0,
            filter_mode: false,
            filter_query: String::new(),
            requested_album: None,
            album: Fetch::Idle,
            tracks: Vec::new(),
            track_selected: 0,
            queue_source: None,
            follow_playback: true,
            details_window: false,
        }
    }

    /// Mark the artist search as in flight and return its sequence number and
    /// the term to send.
    pub fn begin_search(&mut self) -> (u64, String) {
        self.search_seq += 1;
        self.catalog = Fetch::Loading;
        (self.search_seq, self.artist.clone())
    }

    /// Apply a search reply. Returns false when a newer search superseded it.
    pub fn finish_search(&mut self, seq: u64, result: Result<ArtistCatalog, String>) -> bool {
        if seq != self.search_seq {
            return false;
        }
        self.catalog = match result {
            Ok(c) => Fetch::Ready(c),
            Err(msg) => Fetch::Failed(msg),
        };
        self.album_selected = 0;
        true
    }

    pub fn albums(&self) -> &[Album] {
        self.catalog.ready().map_or(&[], |c| c.albums.as_slice())
    }

    pub fn songs(&self) -> &[Song] {
        self.catalog.ready().map_or(&[], |c| c.songs.as_slice())
    }

    pub fn album_count_text(&self) -> String {
        match self.albums().len() {
            1 => "1 album".to_string(),
            n => format!("{n} albums"),
        }
    }

    /// Indices into `albums()` that match the filter, in catalog order.
    pub fn display_indices(&self) -> Vec<usize> {
        let query = self.filter_query.trim();
        self.albums()
            .iter()
            .enumerate()
            .filter(|(_, a)| query.is_empty() || fuzzy_match_positions(&a.collection_name, query).is_some())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn selected_album(&self) -> Option<&Album> {
        let display = self.display_indices();
        display
            .get(self.album_selected)
            .and_then(|&i| self.albums().get(i))
    }

    /// Move the album cursor by one, wrapping at both ends.
    pub fn next_album(&mut self) {
        let len = self.display_indices().len();
        self.album_selected = wrap_next(self.album_selected, len);
    }

    pub fn prev_album(&mut self) {
        let len = self.display_indices().len();
        self.album_selected = wrap_prev(self.album_selected, len);
    }

    pub fn first_album(&mut self) {
        self.album_selected = 0;
    }

    pub fn last_album(&mut self) {
        self.album_selected = self.display_indices().len().saturating_sub(1);
    }

    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
    }

    /// Leave filter mode keeping the query applied.
    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }

    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.album_selected = 0;
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.album_selected = 0;
    }

    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.album_selected = 0;
    }

    /// Switch to the album screen for the highlighted album. Returns the id
    /// to look up.
    pub fn open_selected_album(&mut self) -> Option<u64> {
        let id = self.selected_album()?.collection_id;
        self.screen = Screen::Album;
        self.requested_album = Some(id);
        self.album = Fetch::Loading;
        self.tracks.clear();
        self.track_selected = 0;
        self.details_window = false;
        Some(id)
    }

    /// Re-request a failed album lookup.
    pub fn retry_album(&mut self) -> Option<u64> {
        if self.screen != Screen::Album || !matches!(self.album, Fetch::Failed(_)) {
            return None;
        }
        let id = self.requested_album?;
        self.album = Fetch::Loading;
        Some(id)
    }

    /// Apply a lookup reply. Returns false when it was stale and dropped.
    pub fn finish_album(&mut self, id: u64, result: Result<AlbumDetail, String>) -> bool {
        if self.screen != Screen::Album || self.requested_album != Some(id) {
            return false;
        }
        match result {
            Ok(detail) => {
                self.tracks = album_queue(&detail);
                self.track_selected = 0;
                self.album = Fetch::Ready(detail);
            }
            Err(msg) => self.album = Fetch::Failed(msg),
        }
        true
    }

    /// Show the artist's songs. Nothing happens until the search has results.
    pub fn open_songs(&mut self) -> bool {
        if self.songs().is_empty() {
            return false;
        }
        self.tracks = song_queue(self.songs());
        self.track_selected = 0;
        self.details_window = false;
        self.screen = Screen::Songs;
        true
    }

    /// Return to the album list. Returns true when a playback screen was left.
    pub fn back(&mut self) -> bool {
        if self.screen == Screen::Albums {
            return false;
        }
        self.screen = Screen::Albums;
        self.requested_album = None;
        self.album = Fetch::Idle;
        self.tracks.clear();
        self.track_selected = 0;
        self.queue_source = None;
        self.details_window = false;
        true
    }

    /// Source of the track list currently on screen.
    pub fn view_source(&self) -> Option<QueueSource> {
        match self.screen {
            Screen::Albums => None,
            Screen::Songs => Some(QueueSource::Songs),
            Screen::Album => self
                .album
                .ready()
                .map(|d| QueueSource::Album(d.album.collection_id)),
        }
    }

    /// Decide what activating the highlighted track means, given the engine's
    /// current index.
    pub fn activate_selected(&self, current: Option<usize>) -> Option<TrackAction> {
        let source = self.view_source()?;
        if self.track_selected >= self.tracks.len() {
            return None;
        }
        if self.queue_source != Some(source) {
            return Some(TrackAction::Load(self.track_selected));
        }
        if current == Some(self.track_selected) {
            Some(TrackAction::Toggle)
        } else {
            Some(TrackAction::PlayAt(self.track_selected))
        }
    }

    /// Record that the engine queue now mirrors the visible track list.
    pub fn mark_queue_loaded(&mut self) {
        self.queue_source = self.view_source();
    }

    /// Whether the engine queue belongs to what is on screen.
    pub fn queue_on_screen(&self) -> bool {
        self.queue_source.is_some() && self.queue_source == self.view_source()
    }

    pub fn next_track(&mut self) {
        self.track_selected = wrap_next(self.track_selected, self.tracks.len());
    }

    pub fn prev_track(&mut self) {
        self.track_selected = wrap_prev(self.track_selected, self.tracks.len());
    }

    pub fn first_track(&mut self) {
        self.track_selected = 0;
    }

    pub fn last_track(&mut self) {
        self.track_selected = self.tracks.len().saturating_sub(1);
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.tracks.get(self.track_selected)
    }

    /// Enable following playback (cursor follows the current track).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    /// Move the track cursor onto the engine's current index when following.
    pub fn follow(&mut self, current: Option<usize>) {
        if !self.follow_playback || !self.queue_on_screen() {
            return;
        }
        if let Some(i) = current.filter(|&i| i < self.tracks.len()) {
            self.track_selected = i;
        }
    }

    pub fn toggle_details_window(&mut self) {
        self.details_window = !self.details_window && self.selected_track().is_some();
    }
}

fn wrap_next(current: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (current + 1) % len }
}

fn wrap_prev(current: usize, len: usize) -> usize {
    match (current, len) {
        (_, 0) => 0,
        (0, len) => len - 1,
        (c, len) => c.min(len) - 1,
    }
}

/// Fuzzy/subsequence match: return the character positions in `title`
/// that match `query`, or `None` if not matched.
pub fn fuzzy_match_positions(title: &str, query: &str) -> Option<Vec<usize>> {
    if query.is_empty() {
        return Some(Vec::new());
    }

    let mut positions: Vec<usize> = Vec::new();
    let mut title_iter = title.chars().enumerate();

    for qc in query.chars() {
        let qc_low = qc.to_ascii_lowercase();
        loop {
            match title_iter.next() {
                Some((ti, tc)) if tc.to_ascii_lowercase() == qc_low => {
                    positions.push(ti);
                    break;
                }
                Some(_) => continue,
                None => return None,
            }
        }
    }

    Some(positions)
}
