use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

pub type TrackId = u64;

/// Shown wherever a track has no usable artist credit.
pub const UNKNOWN_ARTIST: &str = "Unknown artist";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    #[serde(default)]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    #[serde(default)]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Cover image URL.
    #[serde(rename = "picUrl", default)]
    pub pic_url: Option<String>,
}

/// A playable catalogue entry.
///
/// Playlist endpoints use the short keys (`ar`, `al`, `dt`) while search
/// results use the long ones; both decode into the same record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "ar", alias = "artists", default, deserialize_with = "null_as_default")]
    pub artists: Vec<Artist>,
    #[serde(rename = "al", alias = "album", default, deserialize_with = "null_as_default")]
    pub album: Album,
    #[serde(rename = "dt", alias = "duration", default)]
    pub duration_ms: u64,
    /// Resolved stream URL, only present on the engine's copy of the playing track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Track {
    pub fn new(id: TrackId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            artists: Vec::new(),
            album: Album::default(),
            duration_ms: 0,
            url: None,
        }
    }

    /// Copy of this track annotated with a resolved stream URL.
    pub fn with_url(&self, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..self.clone()
        }
    }

    /// Copy of this track with any attached stream URL removed.
    pub fn without_url(&self) -> Self {
        Self {
            url: None,
            ..self.clone()
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        (self.duration_ms > 0).then(|| Duration::from_millis(self.duration_ms))
    }

    /// Artist names joined with `", "`, or [`UNKNOWN_ARTIST`] when empty.
    pub fn artist_names(&self) -> String {
        let names: Vec<&str> = self
            .artists
            .iter()
            .map(|a| a.name.trim())
            .filter(|n| !n.is_empty())
            .collect();
        if names.is_empty() {
            UNKNOWN_ARTIST.to_string()
        } else {
            names.join(", ")
        }
    }

    pub fn cover_url(&self) -> Option<&str> {
        self.album.pic_url.as_deref().filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "userId", default)]
    pub user_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nickname: String,
    #[serde(rename = "avatarUrl", default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(rename = "vipType", default)]
    pub vip_type: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "coverImgUrl", alias = "picUrl", default)]
    pub cover_img_url: Option<String>,
    #[serde(rename = "trackCount", default)]
    pub track_count: u64,
    #[serde(rename = "playCount", default)]
    pub play_count: u64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub creator: Option<User>,
    #[serde(rename = "updateFrequency", default)]
    pub update_frequency: Option<String>,
}

/// Decode JSON `null` as the type's default instead of failing.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
