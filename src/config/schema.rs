use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/encore/config.toml` or `~/.config/encore/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `ENCORE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub playback: PlaybackSettings,
    pub audio: AudioSettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// The one artist this session browses. A command-line argument wins.
    pub artist: String,
    /// Search API root, without a trailing `/search`.
    pub base_url: String,
    /// `limit` sent with each search request.
    pub search_limit: u32,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
    /// Extra attempts after a timeout, connect error, 429 or 5xx.
    pub retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            artist: "Twenty One Pilots".to_string(),
            base_url: "https://itunes.apple.com".to_string(),
            search_limit: 50,
            timeout_ms: 8000,
            retries: 1,
            retry_backoff_ms: 400,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Volume the engine starts with, in `[0, 1]`.
    pub default_volume: f32,
    /// Volume restored by `m` when unmuting.
    pub unmute_volume: f32,
    /// Change applied by `+` / `-`.
    pub volume_step: f32,
    /// Number of seconds to seek when pressing `H` / `L`.
    pub seek_step_seconds: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            default_volume: 0.8,
            unmute_volume: 0.8,
            volume_step: 0.05,
            seek_step_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// How often the device reports progress while playing (milliseconds).
    pub progress_interval_ms: u64,
    /// Timeout for downloading one preview (milliseconds).
    pub fetch_timeout_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            progress_interval_ms: 250,
            fetch_timeout_ms: 20_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Whether the track cursor follows the playing track.
    pub follow_playback: bool,

    /// The text rendered inside the top header box.
    pub header_text: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            follow_playback: true,
            header_text: " ~ encore ~ ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
    /// Log file. Defaults to `$XDG_STATE_HOME/encore/encore.log`.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            file: None,
        }
    }
}
