use std::io::Write;
use std::path::PathBuf;

use reqwest::blocking::Client;

use super::fetch::{FetchError, extension_hint, fetch_bytes, local_path};

#[test]
fn remote_urls_are_not_local_paths() {
    assert_eq!(local_path("https://audio.example/a.m4a"), None);
    assert_eq!(local_path("http://audio.example/a.m4a"), None);
}

#[test]
fn file_urls_and_bare_paths_are_local() {
    assert_eq!(
        local_path("file:///tmp/preview.m4a"),
        Some(PathBuf::from("/tmp/preview.m4a"))
    );
    assert_eq!(
        local_path("previews/a.mp3"),
        Some(PathBuf::from("previews/a.mp3"))
    );
}

#[test]
fn extension_hint_ignores_query_and_case() {
    assert_eq!(
        extension_hint("https://audio.example/p/mzaf_1.plus.aac.p.M4A?x=1#t").as_deref(),
        Some("m4a")
    );
    assert_eq!(extension_hint("/music/track.flac").as_deref(), Some("flac"));
}

#[test]
fn extension_hint_rejects_missing_or_odd_extensions() {
    assert_eq!(extension_hint("https://audio.example/stream"), None);
    assert_eq!(extension_hint("https://audio.example.com/"), None);
    assert_eq!(extension_hint("file:///tmp/clip."), None);
    assert_eq!(extension_hint("/tmp/clip.not-an-ext"), None);
}

#[test]
fn fetch_reads_local_files() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"ID3 fake audio").unwrap();
    let url = format!("file://{}", file.path().display());

    let bytes = fetch_bytes(&Client::new(), &url).unwrap();
    assert_eq!(&bytes[..], b"ID3 fake audio");
}

#[test]
fn fetch_reports_missing_and_empty_files() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.m4a");
    let err = fetch_bytes(&Client::new(), missing.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, FetchError::Read { .. }));
    assert!(err.to_string().contains("missing.m4a"));

    let empty = dir.path().join("empty.m4a");
    std::fs::write(&empty, b"").unwrap();
    let err = fetch_bytes(&Client::new(), empty.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, FetchError::Empty));
}
