//! Catalog records as the iTunes Search API returns them, plus the shapes the
//! provider hands upward.

use serde::Deserialize;

/// An album (`wrapperType: "collection"`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub collection_id: u64,
    pub collection_name: String,
    pub artist_name: String,
    #[serde(default)]
    pub artwork_url100: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub collection_view_url: Option<String>,
    #[serde(default)]
    pub track_count: Option<u32>,
}

impl Album {
    /// Artwork URL rewritten to a larger rendition.
    pub fn cover_url(&self) -> Option<String> {
        self.artwork_url100
            .as_deref()
            .map(|u| u.replace("100x100", "1200x1200"))
    }

    pub fn release_year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
    }
}

/// A song from an artist search (`entity=song`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub track_id: u64,
    pub track_name: String,
    pub artist_name: String,
    #[serde(default)]
    pub collection_name: Option<String>,
    #[serde(default)]
    pub artwork_url100: Option<String>,
    #[serde(default)]
    pub track_time_millis: Option<u64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub track_view_url: Option<String>,
}

/// A track entry of an album lookup (`wrapperType: "track"`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumTrack {
    pub track_id: u64,
    pub track_name: String,
    #[serde(default)]
    pub track_number: Option<u32>,
    #[serde(default)]
    pub disc_number: Option<u32>,
    #[serde(default)]
    pub track_time_millis: Option<u64>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub track_view_url: Option<String>,
}

/// Result of an artist search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtistCatalog {
    /// Deduplicated by collection id, newest first.
    pub albums: Vec<Album>,
    pub songs: Vec<Song>,
}

/// Result of an album lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumDetail {
    pub album: Album,
    pub tracks: Vec<AlbumTrack>,
}
