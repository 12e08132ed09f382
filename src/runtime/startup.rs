use anyhow::{Context, bail};
use tracing::{info, warn};

use crate::gateway::NeteaseClient;
use crate::model::{Playlist, Track, User};

use super::cli::{Cli, ListKind};

/// Which tracks the session opens with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSource {
    Playlist(u64),
    Search(String),
    Builtin(ListKind),
}

impl ListSource {
    pub fn from_cli(cli: &Cli) -> Self {
        if let Some(id) = cli.playlist {
            return Self::Playlist(id);
        }
        if let Some(keywords) = cli.search.as_deref().map(str::trim) {
            if !keywords.is_empty() {
                return Self::Search(keywords.to_string());
            }
        }
        Self::Builtin(cli.list.unwrap_or(ListKind::Top))
    }
}

/// Check the service and the login, then fetch the opening track list and
/// a title for it.
pub async fn load_tracks(
    client: &NeteaseClient,
    source: &ListSource,
) -> anyhow::Result<(String, Vec<Track>)> {
    if !client.check_connection(client.base_url()).await {
        warn!(base_url = client.base_url(), "Catalogue service did not answer the connection check");
    }
    let user = if client.is_logged_in() {
        match client.login_status().await {
            Ok(user) => {
                info!(nickname = %user.nickname, "Logged in");
                Some(user)
            }
            Err(e) => {
                warn!(error = %e, "Login cookie was not accepted");
                None
            }
        }
    } else {
        None
    };

    let loaded = match source {
        ListSource::Playlist(id) => {
            let detail = client
                .playlist_detail(*id)
                .await
                .with_context(|| format!("loading playlist {id}"))?;
            open_playlist(client, detail).await?
        }
        ListSource::Search(keywords) => {
            let results = client
                .search(keywords)
                .await
                .with_context(|| format!("searching for {keywords:?}"))?;
            info!(
                songs = results.songs.len(),
                playlists = results.playlists.len(),
                "Search finished"
            );
            (format!("Search: {keywords}"), results.songs)
        }
        ListSource::Builtin(kind) => load_builtin(client, *kind, user.as_ref()).await?,
    };

    info!(title = %loaded.0, tracks = loaded.1.len(), "Track list loaded");
    Ok(loaded)
}

async fn load_builtin(
    client: &NeteaseClient,
    kind: ListKind,
    user: Option<&User>,
) -> anyhow::Result<(String, Vec<Track>)> {
    let user = match (kind.needs_login(), user) {
        (true, None) => bail!("the {kind:?} list needs a valid login cookie (gateway.cookie)"),
        (_, user) => user,
    };

    match kind {
        ListKind::Top => {
            let lists = client.top_lists().await.context("loading top lists")?;
            open_first(client, lists, "top lists").await
        }
        ListKind::Hot => {
            let lists = client
                .top_playlists()
                .await
                .context("loading hot playlists")?;
            open_first(client, lists, "hot playlists").await
        }
        ListKind::Recommended => {
            let lists = if user.is_some() {
                client
                    .recommend_resource()
                    .await
                    .context("loading recommended playlists")?
            } else {
                client
                    .personalized()
                    .await
                    .context("loading recommended playlists")?
            };
            open_first(client, lists, "recommended playlists").await
        }
        ListKind::Daily => {
            let tracks = client
                .daily_recommend()
                .await
                .context("loading daily recommendations")?;
            Ok(("Daily recommendations".to_string(), tracks))
        }
        ListKind::Fm => {
            let tracks = client.personal_fm().await.context("loading personal FM")?;
            Ok(("Personal FM".to_string(), tracks))
        }
        ListKind::History => {
            let uid = user.map_or(0, |u| u.user_id);
            let tracks = client
                .user_record(uid)
                .await
                .context("loading listening history")?;
            Ok(("This week".to_string(), tracks))
        }
        ListKind::Liked => {
            let uid = user.map_or(0, |u| u.user_id);
            let lists = client
                .user_playlists(uid)
                .await
                .context("loading user playlists")?;
            open_first(client, lists, "user playlists").await
        }
    }
}

async fn open_first(
    client: &NeteaseClient,
    lists: Vec<Playlist>,
    what: &str,
) -> anyhow::Result<(String, Vec<Track>)> {
    let Some(first) = lists.into_iter().next() else {
        bail!("the catalogue service returned no {what}");
    };
    open_playlist(client, first).await
}

async fn open_playlist(
    client: &NeteaseClient,
    playlist: Playlist,
) -> anyhow::Result<(String, Vec<Track>)> {
    let tracks = client
        .playlist_tracks(playlist.id)
        .await
        .with_context(|| format!("loading tracks of {}", playlist.name))?;
    Ok((playlist.name, tracks))
}
