//! Response envelopes of the NetEase-compatible API.
//!
//! Only the fields the client reads are modelled; everything else is ignored.

use serde::Deserialize;
use serde_json::Value;

use crate::model::{Playlist, Track, User};

use super::error::GatewayError;

#[derive(Debug, Deserialize)]
pub(super) struct SongUrlResponse {
    #[serde(default)]
    pub data: Vec<SongUrlEntry>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SongUrlEntry {
    #[serde(default)]
    pub url: Option<String>,
}

impl SongUrlResponse {
    /// First non-empty URL, if the service returned one.
    pub fn first_url(self) -> Option<String> {
        self.data
            .into_iter()
            .next()
            .and_then(|e| e.url)
            .filter(|u| !u.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct LyricResponse {
    #[serde(default)]
    pub lrc: Option<LyricBlock>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LyricBlock {
    #[serde(default)]
    pub lyric: Option<String>,
}

impl LyricResponse {
    pub fn into_text(self) -> String {
        self.lrc.and_then(|b| b.lyric).unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PlaylistDetailResponse {
    pub playlist: Playlist,
}

#[derive(Debug, Deserialize)]
pub(super) struct SongsResponse {
    #[serde(default)]
    pub songs: Vec<Track>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserPlaylistsResponse {
    #[serde(default)]
    pub playlist: Vec<Playlist>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PersonalizedResponse {
    #[serde(default)]
    pub result: Vec<Playlist>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TopListResponse {
    #[serde(default)]
    pub list: Vec<Playlist>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TopPlaylistsResponse {
    #[serde(default)]
    pub playlists: Vec<Playlist>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RecommendResourceResponse {
    #[serde(default)]
    pub recommend: Vec<Playlist>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DailySongsResponse {
    #[serde(default)]
    pub data: Option<DailySongs>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DailySongs {
    #[serde(rename = "dailySongs", default)]
    pub daily_songs: Vec<Track>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TrackListResponse {
    #[serde(default)]
    pub data: Vec<Track>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserRecordResponse {
    #[serde(rename = "weekData", default)]
    pub week_data: Vec<RecordEntry>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RecordEntry {
    pub song: Track,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchResponse {
    #[serde(default)]
    pub result: Option<SearchResult>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct SearchResult {
    #[serde(default)]
    pub songs: Vec<Track>,
    #[serde(default)]
    pub playlists: Vec<Playlist>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LoginStatusResponse {
    #[serde(default)]
    pub data: Option<LoginStatusData>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LoginStatusData {
    #[serde(default)]
    pub profile: Option<User>,
}

/// Reject envelopes whose `code` field reports a failure.
pub(super) fn check_code(value: &Value) -> Result<(), GatewayError> {
    match value.get("code").and_then(Value::as_i64) {
        None | Some(200) => Ok(()),
        Some(code) => {
            let msg = value
                .get("msg")
                .or_else(|| value.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("request rejected")
                .to_string();
            Err(GatewayError::Service(code, msg))
        }
    }
}

pub(super) fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, GatewayError> {
    serde_json::from_value(value).map_err(|e| GatewayError::Decode(e.to_string()))
}
