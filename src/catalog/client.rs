use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CACHE_CONTROL;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::CatalogSettings;

use super::error::CatalogError;
use super::model::{Album, AlbumDetail, AlbumTrack, ArtistCatalog, Song};

/// Blocking client for the iTunes Search API.
///
/// Every request carries a timeout and is retried a bounded number of times
/// on timeouts, connection failures, 429 and 5xx responses.
pub struct CatalogClient {
    http: Client,
    base_url: String,
    search_limit: u32,
    retries: u32,
    retry_backoff: Duration,
}

impl CatalogClient {
    pub fn new(settings: &CatalogSettings) -> Result<Self, CatalogError> {
        let http = Client::builder()
            .user_agent(concat!("encore/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(CatalogError::Client)?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            search_limit: settings.search_limit,
            retries: settings.retries,
            retry_backoff: Duration::from_millis(settings.retry_backoff_ms),
        })
    }

    /// Albums (deduplicated, newest first) and songs credited to `term`.
    /// Both searches run concurrently.
    pub fn search_artist(&self, term: &str) -> Result<ArtistCatalog, CatalogError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(CatalogError::EmptyTerm);
        }

        let url = format!("{}/search", self.base_url);
        let limit = self.search_limit.to_string();
        let query = |entity: &'static str| {
            [
                ("term", term),
                ("entity", entity),
                ("attribute", "artistTerm"),
                ("limit", limit.as_str()),
            ]
        };

        let (albums, songs) = thread::scope(|s| {
            let albums = s.spawn(|| self.get_json("album search", &url, &query("album")));
            let songs = s.spawn(|| self.get_json("song search", &url, &query("song")));
            (
                albums.join().unwrap_or_else(|p| std::panic::resume_unwind(p)),
                songs.join().unwrap_or_else(|p| std::panic::resume_unwind(p)),
            )
        });

        let mut albums = dedup_albums(parse_entries::<Album>(&albums?, "collection"));
        sort_newest_first(&mut albums);
        let songs = parse_entries::<Song>(&songs?, "track");
        debug!(albums = albums.len(), songs = songs.len(), "artist search done");

        Ok(ArtistCatalog { albums, songs })
    }

    /// An album and its ordered track list.
    pub fn lookup_album(&self, collection_id: u64) -> Result<AlbumDetail, CatalogError> {
        let url = format!("{}/lookup", self.base_url);
        let id = collection_id.to_string();
        let value = self.get_json(
            "album lookup",
            &url,
            &[("id", id.as_str()), ("entity", "song")],
        )?;
        parse_lookup(&value, collection_id)
    }

    fn get_json(
        &self,
        op: &'static str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, CatalogError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.get_json_once(op, url, query) {
                Ok(v) => return Ok(v),
                Err(e) if e.is_retriable() && attempt <= self.retries => {
                    warn!(op, attempt, error = %e, "catalog request failed, retrying");
                    thread::sleep(self.retry_backoff);
                }
                Err(e) => {
                    warn!(op, attempt, error = %e, "catalog request failed");
                    return Err(e);
                }
            }
        }
    }

    fn get_json_once(
        &self,
        op: &'static str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, CatalogError> {
        debug!(op, url, ?query, "catalog request");
        let resp = self
            .http
            .get(url)
            .query(query)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .map_err(|source| CatalogError::Request { op, source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status { op, status });
        }

        let body = resp
            .text()
            .map_err(|source| CatalogError::Request { op, source })?;
        serde_json::from_str(&body).map_err(|source| CatalogError::Decode { op, source })
    }
}

fn results(value: &Value) -> &[Value] {
    value
        .get("results")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Decode every `results` entry whose `wrapperType` matches, skipping
/// entries that do not fit `T`.
pub(crate) fn parse_entries<T: DeserializeOwned>(value: &Value, wrapper_type: &str) -> Vec<T> {
    results(value)
        .iter()
        .filter(|entry| entry.get("wrapperType").and_then(Value::as_str) == Some(wrapper_type))
        .filter_map(|entry| match T::deserialize(entry) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!(error = %e, "skipping malformed catalog entry");
                None
            }
        })
        .collect()
}

/// Keep the first occurrence of each collection id.
pub(crate) fn dedup_albums(albums: Vec<Album>) -> Vec<Album> {
    let mut seen = HashSet::new();
    albums
        .into_iter()
        .filter(|a| seen.insert(a.collection_id))
        .collect()
}

/// ISO-8601 dates order lexically; albums without a date go last.
pub(crate) fn sort_newest_first(albums: &mut [Album]) {
    albums.sort_by(|a, b| b.release_date.cmp(&a.release_date));
}

pub(crate) fn parse_lookup(value: &Value, collection_id: u64) -> Result<AlbumDetail, CatalogError> {
    let album = parse_entries::<Album>(value, "collection")
        .into_iter()
        .next()
        .ok_or(CatalogError::AlbumNotFound(collection_id))?;
    let tracks = parse_entries::<AlbumTrack>(value, "track");
    Ok(AlbumDetail { album, tracks })
}
