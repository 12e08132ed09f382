use crate::config::TrackDisplayField;

use super::track::Track;

/// Build a display string for a track according to the provided `fields` and separator.
///
/// Fields that are empty for this track are skipped; when nothing is left the
/// track name is used as-is.
pub fn display_from_fields(track: &Track, fields: &[TrackDisplayField], sep: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    let title = track.name.trim();

    for f in fields {
        match f {
            TrackDisplayField::Display => {
                // "display" means "artists - title".
                parts.push(track.artist_names());
                if !title.is_empty() {
                    parts.push(title.to_string());
                }
            }
            TrackDisplayField::Title => {
                if !title.is_empty() {
                    parts.push(title.to_string());
                }
            }
            TrackDisplayField::Artist => {
                parts.push(track.artist_names());
            }
            TrackDisplayField::Album => {
                let album = track.album.name.trim();
                if !album.is_empty() {
                    parts.push(album.to_string());
                }
            }
        }
    }

    if parts.is_empty() {
        track.name.clone()
    } else {
        parts.join(sep)
    }
}
