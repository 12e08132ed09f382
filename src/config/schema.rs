use std::path::PathBuf;

use serde::Deserialize;

/// Public demo instance of the NetEase-compatible API. Rate limited; users
/// should point `gateway.base_url` at their own deployment.
pub const DEFAULT_API_URL: &str = "https://netease-cloud-music-api-demo.vercel.app";

/// Old defaults that no longer work and are replaced on load.
pub(crate) const RETIRED_API_URLS: [&str; 2] = [
    "http://localhost:3000",
    "https://api-enhanced-six-ebon.vercel.app",
];

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/muse/config.toml` or `~/.config/muse/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `MUSE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub gateway: GatewaySettings,
    pub audio: AudioSettings,
    pub playback: PlaybackSettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    /// Base URL of the catalogue API (no trailing slash needed).
    pub base_url: String,
    /// Login cookie forwarded with every request.
    pub cookie: Option<String>,
    /// Per-request timeout (seconds).
    pub timeout_secs: u64,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            cookie: None,
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Output level at startup, 0.0 to 1.0.
    pub initial_volume: f32,
    /// How often the media clock reports elapsed time (milliseconds).
    pub tick_ms: u64,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            initial_volume: 0.7,
            tick_ms: 250,
            quit_fade_out_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// "Previous" restarts the current track once this many seconds have played.
    pub restart_threshold_secs: f64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            restart_threshold_secs: 3.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Whether the cursor starts in "follow playback" mode.
    pub follow_playback: bool,

    /// The text rendered inside the top header box.
    pub header_text: String,

    /// Whether the lyric pane is open at startup.
    pub show_lyrics: bool,

    /// Manual lyric scrubbing ends after this much idle time (milliseconds).
    pub lyric_scrub_timeout_ms: u64,

    /// Which track fields to show in the list and in what order.
    ///
    /// Example: ["artist", "title"]
    pub list_track_fields: Vec<TrackDisplayField>,

    /// Which track fields to show in the status "Song:" line, and in what order.
    pub now_playing_track_fields: Vec<TrackDisplayField>,

    /// Separator used to join track fields.
    pub track_separator: String,

    /// Which time fields to show for the status line, and in what order.
    ///
    /// Example: ["elapsed", "total", "remaining"]
    pub now_playing_time_fields: Vec<TimeField>,

    /// Separator used to join `now_playing_time_fields`.
    pub now_playing_time_separator: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            follow_playback: true,
            header_text: " ~ muse ~ ".to_string(),
            show_lyrics: true,
            lyric_scrub_timeout_ms: 3000,
            list_track_fields: vec![TrackDisplayField::Artist, TrackDisplayField::Title],
            now_playing_track_fields: vec![TrackDisplayField::Display],
            track_separator: " - ".to_string(),
            now_playing_time_fields: vec![TimeField::Elapsed, TimeField::Total],
            now_playing_time_separator: " / ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
    /// Volume change per `+` / `-` press.
    pub volume_step: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            scrub_seconds: 5,
            volume_step: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Log file; the terminal is owned by the UI.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeField {
    Elapsed,
    Total,
    Remaining,
}

#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackDisplayField {
    /// "artists - title".
    Display,
    #[serde(alias = "name")]
    Title,
    #[serde(alias = "artists")]
    Artist,
    Album,
}
