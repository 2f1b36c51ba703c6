use super::client::{dedup_albums, parse_entries, parse_lookup, sort_newest_first};
use super::error::is_retriable_status;
use super::*;
use reqwest::StatusCode;
use serde_json::json;

fn album_json(id: u64, name: &str, date: &str) -> serde_json::Value {
    json!({
        "wrapperType": "collection",
        "collectionType": "Album",
        "collectionId": id,
        "collectionName": name,
        "artistName": "Twenty One Pilots",
        "artworkUrl100": format!("https://is1.example/{id}/100x100bb.jpg"),
        "releaseDate": date,
        "collectionViewUrl": format!("https://music.example/album/{id}"),
        "trackCount": 2
    })
}

#[test]
fn search_entries_are_deduplicated_and_sorted_newest_first() {
    let payload = json!({
        "resultCount": 4,
        "results": [
            album_json(1, "Vessel", "2013-01-08T08:00:00Z"),
            album_json(2, "Trench", "2018-10-05T07:00:00Z"),
            album_json(1, "Vessel (dup)", "2013-01-08T08:00:00Z"),
            album_json(3, "Blurryface", "2015-05-17T07:00:00Z"),
        ]
    });

    let mut albums = dedup_albums(parse_entries::<Album>(&payload, "collection"));
    sort_newest_first(&mut albums);

    let names: Vec<&str> = albums.iter().map(|a| a.collection_name.as_str()).collect();
    assert_eq!(names, vec!["Trench", "Blurryface", "Vessel"]);
}

#[test]
fn malformed_entries_and_other_wrapper_types_are_skipped() {
    let payload = json!({
        "results": [
            album_json(7, "Scaled and Icy", "2021-05-21T07:00:00Z"),
            { "wrapperType": "collection", "collectionName": "missing id" },
            { "wrapperType": "artist", "artistId": 9, "artistName": "x" },
        ]
    });

    let albums = parse_entries::<Album>(&payload, "collection");
    assert_eq!(albums.len(), 1);
    assert_eq!(albums[0].collection_id, 7);
}

#[test]
fn missing_results_array_yields_nothing() {
    let albums = parse_entries::<Album>(&json!({ "resultCount": 0 }), "collection");
    assert!(albums.is_empty());
}

#[test]
fn songs_keep_optional_preview_and_duration() {
    let payload = json!({
        "results": [
            {
                "wrapperType": "track",
                "kind": "song",
                "trackId": 11,
                "trackName": "Stressed Out",
                "artistName": "Twenty One Pilots",
                "collectionName": "Blurryface",
                "trackTimeMillis": 202_333,
                "previewUrl": "https://audio.example/11.m4a"
            },
            {
                "wrapperType": "track",
                "kind": "song",
                "trackId": 12,
                "trackName": "No Preview",
                "artistName": "Twenty One Pilots"
            }
        ]
    });

    let songs = parse_entries::<Song>(&payload, "track");
    assert_eq!(songs.len(), 2);
    assert_eq!(songs[0].track_time_millis, Some(202_333));
    assert_eq!(songs[0].preview_url.as_deref(), Some("https://audio.example/11.m4a"));
    assert_eq!(songs[1].preview_url, None);
    assert_eq!(songs[1].collection_name, None);
}

#[test]
fn lookup_splits_album_from_ordered_tracks() {
    let payload = json!({
        "resultCount": 3,
        "results": [
            album_json(5, "Clancy", "2024-05-24T07:00:00Z"),
            {
                "wrapperType": "track",
                "trackId": 51,
                "trackName": "Overcompensate",
                "trackNumber": 1,
                "trackTimeMillis": 236_000,
                "previewUrl": "https://audio.example/51.m4a",
                "trackViewUrl": "https://music.example/51"
            },
            {
                "wrapperType": "track",
                "trackId": 52,
                "trackName": "Next Semester",
                "trackNumber": 2
            }
        ]
    });

    let detail = parse_lookup(&payload, 5).unwrap();
    assert_eq!(detail.album.collection_name, "Clancy");
    let ids: Vec<u64> = detail.tracks.iter().map(|t| t.track_id).collect();
    assert_eq!(ids, vec![51, 52]);
    assert_eq!(detail.tracks[1].preview_url, None);
}

#[test]
fn lookup_without_collection_is_not_found() {
    let payload = json!({
        "results": [
            { "wrapperType": "track", "trackId": 1, "trackName": "Orphan" }
        ]
    });

    let err = parse_lookup(&payload, 42).unwrap_err();
    assert!(matches!(err, CatalogError::AlbumNotFound(42)));
    assert_eq!(err.to_string(), "album 42 not found");
}

#[test]
fn album_helpers_upscale_cover_and_extract_year() {
    let album: Album =
        serde_json::from_value(album_json(8, "Trench", "2018-10-05T07:00:00Z")).unwrap();
    assert_eq!(
        album.cover_url().as_deref(),
        Some("https://is1.example/8/1200x1200bb.jpg")
    );
    assert_eq!(album.release_year(), Some("2018"));

    let undated = Album {
        release_date: Some("n/a".into()),
        ..album
    };
    assert_eq!(undated.release_year(), None);
}

#[test]
fn retriable_statuses_are_throttling_and_server_errors() {
    assert!(is_retriable_status(StatusCode::TOO_MANY_REQUESTS));
    assert!(is_retriable_status(StatusCode::BAD_GATEWAY));
    assert!(is_retriable_status(StatusCode::SERVICE_UNAVAILABLE));
    assert!(!is_retriable_status(StatusCode::NOT_FOUND));
    assert!(!is_retriable_status(StatusCode::BAD_REQUEST));

    let err = CatalogError::Status {
        op: "album lookup",
        status: StatusCode::GATEWAY_TIMEOUT,
    };
    assert!(err.is_retriable());
    assert!(!CatalogError::EmptyTerm.is_retriable());
}

#[test]
fn empty_search_term_is_rejected_before_any_request() {
    let settings = crate::config::CatalogSettings {
        base_url: "http://127.0.0.1:9".into(),
        ..Default::default()
    };
    let client = CatalogClient::new(&settings).unwrap();
    assert!(matches!(
        client.search_artist("   "),
        Err(CatalogError::EmptyTerm)
    ));
}
