use std::time::Duration;

/// A single queue entry. Immutable once built by the queue loader.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: u64,
    pub title: String,
    pub artist: String,
    /// Album/collection name, when the catalog knows it.
    pub album: Option<String>,
    /// Short audio preview. A track without one is unplayable.
    pub preview_url: Option<String>,
    /// Full-length duration reported by the catalog (not the preview length).
    pub duration_ms: Option<u64>,
    pub cover_url: Option<String>,
    pub detail_url: Option<String>,
}

impl Track {
    pub fn is_playable(&self) -> bool {
        self.preview_url.is_some()
    }

    pub fn duration_hint(&self) -> Option<Duration> {
        self.duration_ms.map(Duration::from_millis)
    }
}
