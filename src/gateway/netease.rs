use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{GatewaySettings, normalize_base_url};
use crate::model::{Playlist, Track, TrackId, User};

use super::CatalogueGateway;
use super::error::GatewayError;
use super::responses::*;

const USER_AGENT: &str = concat!("muse/", env!("CARGO_PKG_VERSION"));
const PLAYLIST_TRACK_LIMIT: u32 = 1000;
const SEARCH_LIMIT: u32 = 30;
const SEARCH_TYPE_SONG: u32 = 1;
const SEARCH_TYPE_PLAYLIST: u32 = 1000;

/// Songs and playlists matching a keyword search.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub songs: Vec<Track>,
    pub playlists: Vec<Playlist>,
}

/// Client for a NetEase-Cloud-Music-compatible HTTP API.
pub struct NeteaseClient {
    http: reqwest::Client,
    base_url: String,
    cookie: Option<String>,
}

impl NeteaseClient {
    pub fn new(settings: &GatewaySettings) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: normalize_base_url(&settings.base_url),
            cookie: settings.cookie.clone().filter(|c| !c.trim().is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_logged_in(&self) -> bool {
        self.cookie.is_some()
    }

    /// Build the request URL: `path` under the base URL plus `query`, the
    /// cache-busting `timestamp` and the login cookie when present.
    pub(super) fn build_url(
        &self,
        path: &str,
        query: &[(&str, String)],
        timestamp_ms: u128,
    ) -> Result<Url, GatewayError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| GatewayError::Network(format!("invalid URL: {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("timestamp", &timestamp_ms.to_string());
            if let Some(cookie) = &self.cookie {
                pairs.append_pair("cookie", cookie);
            }
        }
        Ok(url)
    }

    async fn request(&self, path: &str, query: &[(&str, String)]) -> Result<Value, GatewayError> {
        let url = self.build_url(path, query, now_ms())?;
        debug!(path = %path, "Querying catalogue API");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Http(status.as_u16(), body));
        }

        let value: Value = response.json().await?;
        check_code(&value)?;
        Ok(value)
    }

    /// Probe `base_url` with a tiny search; true when it answers with HTTP 2xx.
    pub async fn check_connection(&self, base_url: &str) -> bool {
        let url = format!(
            "{}/search?keywords=test&limit=1",
            base_url.trim_end_matches('/')
        );
        match self.http.get(&url).send().await {
            Ok(res) => res.status().is_success(),
            Err(e) => {
                warn!(error = %e, "Connection check failed");
                false
            }
        }
    }

    pub async fn login_status(&self) -> Result<User, GatewayError> {
        if self.cookie.is_none() {
            return Err(GatewayError::Service(301, "not logged in".to_string()));
        }
        let value = self.request("/login/status", &[]).await?;
        let status: LoginStatusResponse = decode(value)?;
        status
            .data
            .and_then(|d| d.profile)
            .ok_or_else(|| GatewayError::Service(301, "session expired".to_string()))
    }

    pub async fn user_playlists(&self, uid: u64) -> Result<Vec<Playlist>, GatewayError> {
        if uid == 0 {
            return Ok(Vec::new());
        }
        let value = self
            .request("/user/playlist", &[("uid", uid.to_string())])
            .await?;
        Ok(decode::<UserPlaylistsResponse>(value)?.playlist)
    }

    pub async fn playlist_detail(&self, id: u64) -> Result<Playlist, GatewayError> {
        let value = self
            .request("/playlist/detail", &[("id", id.to_string())])
            .await?;
        Ok(decode::<PlaylistDetailResponse>(value)?.playlist)
    }

    pub async fn playlist_tracks(&self, id: u64) -> Result<Vec<Track>, GatewayError> {
        let value = self
            .request(
                "/playlist/track/all",
                &[
                    ("id", id.to_string()),
                    ("limit", PLAYLIST_TRACK_LIMIT.to_string()),
                    ("offset", "0".to_string()),
                ],
            )
            .await?;
        Ok(decode::<SongsResponse>(value)?.songs)
    }

    pub async fn daily_recommend(&self) -> Result<Vec<Track>, GatewayError> {
        let value = self.request("/recommend/songs", &[]).await?;
        Ok(decode::<DailySongsResponse>(value)?
            .data
            .map(|d| d.daily_songs)
            .unwrap_or_default())
    }

    pub async fn recommend_resource(&self) -> Result<Vec<Playlist>, GatewayError> {
        let value = self.request("/recommend/resource", &[]).await?;
        Ok(decode::<RecommendResourceResponse>(value)?.recommend)
    }

    /// Recommended playlists; works without logging in.
    pub async fn personalized(&self) -> Result<Vec<Playlist>, GatewayError> {
        let value = self
            .request("/personalized", &[("limit", "15".to_string())])
            .await?;
        let mut playlists = decode::<PersonalizedResponse>(value)?.result;
        for p in &mut playlists {
            p.creator.get_or_insert_with(|| User {
                nickname: "Recommended".to_string(),
                ..User::default()
            });
        }
        Ok(playlists)
    }

    pub async fn personal_fm(&self) -> Result<Vec<Track>, GatewayError> {
        let value = self.request("/personal_fm", &[]).await?;
        Ok(decode::<TrackListResponse>(value)?.data)
    }

    pub async fn top_lists(&self) -> Result<Vec<Playlist>, GatewayError> {
        let value = self.request("/toplist", &[]).await?;
        Ok(decode::<TopListResponse>(value)?.list)
    }

    pub async fn top_playlists(&self) -> Result<Vec<Playlist>, GatewayError> {
        let value = self
            .request(
                "/top/playlist",
                &[("limit", "30".to_string()), ("order", "hot".to_string())],
            )
            .await?;
        Ok(decode::<TopPlaylistsResponse>(value)?.playlists)
    }

    /// Tracks the user played most this week.
    pub async fn user_record(&self, uid: u64) -> Result<Vec<Track>, GatewayError> {
        let value = self
            .request(
                "/user/record",
                &[("uid", uid.to_string()), ("type", "1".to_string())],
            )
            .await?;
        Ok(decode::<UserRecordResponse>(value)?
            .week_data
            .into_iter()
            .map(|r| r.song)
            .collect())
    }

    pub async fn search(&self, keywords: &str) -> Result<SearchResults, GatewayError> {
        let songs = self.search_typed(keywords, SEARCH_TYPE_SONG).await?;
        let playlists = self.search_typed(keywords, SEARCH_TYPE_PLAYLIST).await?;
        Ok(SearchResults {
            songs: songs.songs,
            playlists: playlists.playlists,
        })
    }

    async fn search_typed(&self, keywords: &str, kind: u32) -> Result<SearchResult, GatewayError> {
        let value = self
            .request(
                "/search",
                &[
                    ("keywords", keywords.to_string()),
                    ("type", kind.to_string()),
                    ("limit", SEARCH_LIMIT.to_string()),
                ],
            )
            .await?;
        Ok(decode::<SearchResponse>(value)?.result.unwrap_or_default())
    }
}

#[async_trait]
impl CatalogueGateway for NeteaseClient {
    async fn resolve_stream_url(&self, id: TrackId) -> Result<String, GatewayError> {
        // The plain endpoint is the more reliable one on public instances.
        match self.request("/song/url", &[("id", id.to_string())]).await {
            Ok(value) => {
                if let Some(url) = decode::<SongUrlResponse>(value)?.first_url() {
                    return Ok(url);
                }
            }
            Err(e) => warn!(track_id = id, error = %e, "song/url failed, trying v1"),
        }

        let value = self
            .request(
                "/song/url/v1",
                &[("id", id.to_string()), ("level", "exhigh".to_string())],
            )
            .await?;
        decode::<SongUrlResponse>(value)?
            .first_url()
            .ok_or(GatewayError::NotFound(id))
    }

    async fn fetch_lyric(&self, id: TrackId) -> Result<String, GatewayError> {
        let value = self.request("/lyric", &[("id", id.to_string())]).await?;
        Ok(decode::<LyricResponse>(value)?.into_text())
    }
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}
