use super::*;
use crate::config::TrackDisplayField;

fn track_with_artists(names: &[&str]) -> Track {
    let mut t = Track::new(1, "Song");
    t.artists = names
        .iter()
        .enumerate()
        .map(|(i, n)| Artist {
            id: i as u64,
            name: n.to_string(),
        })
        .collect();
    t.album = Album {
        id: 9,
        name: "Album".into(),
        pic_url: Some("https://img/cover.jpg".into()),
    };
    t
}

#[test]
fn display_from_fields_can_format_artist_title() {
    let t = track_with_artists(&["Artist"]);
    assert_eq!(
        display_from_fields(&t, &[TrackDisplayField::Artist, TrackDisplayField::Title], " - "),
        "Artist - Song"
    );
    assert_eq!(
        display_from_fields(&t, &[TrackDisplayField::Album], " - "),
        "Album"
    );
    assert_eq!(display_from_fields(&t, &[], " - "), "Song");
}

#[test]
fn artist_names_joins_and_falls_back() {
    assert_eq!(track_with_artists(&["A", " B "]).artist_names(), "A, B");
    assert_eq!(track_with_artists(&[]).artist_names(), UNKNOWN_ARTIST);
    assert_eq!(track_with_artists(&["  "]).artist_names(), UNKNOWN_ARTIST);
}

#[test]
fn with_url_annotates_a_copy() {
    let t = track_with_artists(&["A"]);
    let annotated = t.with_url("https://cdn/1.mp3");
    assert_eq!(annotated.url.as_deref(), Some("https://cdn/1.mp3"));
    assert_eq!(t.url, None);
    assert_eq!(annotated.without_url(), t);
}

#[test]
fn decodes_playlist_track_shape() {
    let json = r#"{
        "id": 186016,
        "name": "晴天",
        "ar": [{"id": 6452, "name": "周杰伦"}],
        "al": {"id": 18905, "name": "叶惠美", "picUrl": "https://p1/cover.jpg"},
        "dt": 269000
    }"#;
    let t: Track = serde_json::from_str(json).unwrap();
    assert_eq!(t.id, 186016);
    assert_eq!(t.artist_names(), "周杰伦");
    assert_eq!(t.cover_url(), Some("https://p1/cover.jpg"));
    assert_eq!(t.duration_ms, 269000);
    assert_eq!(t.url, None);
}

#[test]
fn decodes_search_track_shape_with_nulls() {
    let json = r#"{
        "id": 7,
        "name": "Song",
        "artists": [{"id": 1, "name": null}],
        "album": null,
        "duration": 1000
    }"#;
    let t: Track = serde_json::from_str(json).unwrap();
    assert_eq!(t.album, Album::default());
    assert_eq!(t.artist_names(), UNKNOWN_ARTIST);
    assert_eq!(t.duration(), Some(std::time::Duration::from_secs(1)));
}

#[test]
fn decodes_personalized_playlist_pic_url_as_cover() {
    let json = r#"{"id": 3, "name": "Mix", "picUrl": "https://p/3.jpg", "playCount": 12}"#;
    let p: Playlist = serde_json::from_str(json).unwrap();
    assert_eq!(p.cover_img_url.as_deref(), Some("https://p/3.jpg"));
    assert_eq!(p.track_count, 0);
    assert_eq!(p.play_count, 12);
}
