use super::load::{default_config_path, default_log_path, normalize_base_url, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_muse_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("MUSE_CONFIG_PATH", "/tmp/muse-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/muse-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("muse")
            .join("config.toml")
    );
}

#[test]
fn default_paths_fall_back_to_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::remove("XDG_STATE_HOME");
    let _g3 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.config/muse/config.toml")
    );
    assert_eq!(
        default_log_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/state/muse/muse.log")
    );
}

#[test]
fn normalize_base_url_strips_slash_and_replaces_retired_defaults() {
    assert_eq!(normalize_base_url("https://api.example/"), "https://api.example");
    assert_eq!(normalize_base_url(" https://api.example// "), "https://api.example");
    assert_eq!(normalize_base_url("http://localhost:3000/"), DEFAULT_API_URL);
    assert_eq!(
        normalize_base_url("https://api-enhanced-six-ebon.vercel.app"),
        DEFAULT_API_URL
    );
}

#[test]
fn defaults_are_valid() {
    let s = Settings::default();
    assert!(s.validate().is_ok());
    assert_eq!(s.audio.initial_volume, 0.7);
    assert_eq!(s.playback.restart_threshold_secs, 3.0);
    assert_eq!(s.gateway.base_url, DEFAULT_API_URL);
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut s = Settings::default();
    s.audio.tick_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.audio.initial_volume = 1.5;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.playback.restart_threshold_secs = -1.0;
    assert!(s.validate().is_err());
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[gateway]
base_url = "https://music.example.org/"
cookie = "MUSIC_U=abc"
timeout_secs = 5

[audio]
initial_volume = 0.4
tick_ms = 100
quit_fade_out_ms = 0

[playback]
restart_threshold_secs = 5.0

[controls]
scrub_seconds = 9
volume_step = 0.1

[ui]
follow_playback = false
header_text = "hello"
show_lyrics = false
list_track_fields = ["name"]
now_playing_track_fields = ["artists", "title", "album"]
track_separator = " • "
now_playing_time_fields = ["elapsed", "remaining"]
now_playing_time_separator = " | "

[log]
level = "debug"
file = "/tmp/muse.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("MUSE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("MUSE__AUDIO__TICK_MS");

    let s = Settings::load().unwrap();
    assert_eq!(s.gateway.base_url, "https://music.example.org");
    assert_eq!(s.gateway.cookie.as_deref(), Some("MUSIC_U=abc"));
    assert_eq!(s.gateway.timeout_secs, 5);
    assert_eq!(s.audio.initial_volume, 0.4);
    assert_eq!(s.audio.tick_ms, 100);
    assert_eq!(s.audio.quit_fade_out_ms, 0);
    assert_eq!(s.playback.restart_threshold_secs, 5.0);
    assert_eq!(s.controls.scrub_seconds, 9);
    assert!(!s.ui.follow_playback);
    assert!(!s.ui.show_lyrics);
    assert_eq!(s.ui.header_text, "hello");
    assert!(matches!(s.ui.list_track_fields[0], TrackDisplayField::Title));
    assert_eq!(s.ui.now_playing_track_fields.len(), 3);
    assert!(matches!(s.ui.now_playing_track_fields[0], TrackDisplayField::Artist));
    assert!(matches!(s.ui.now_playing_track_fields[2], TrackDisplayField::Album));
    assert_eq!(s.ui.track_separator, " • ");
    assert!(matches!(s.ui.now_playing_time_fields[1], TimeField::Remaining));
    assert_eq!(s.ui.now_playing_time_separator, " | ");
    assert_eq!(s.log.level, "debug");
    assert_eq!(s.log.file, Some(std::path::PathBuf::from("/tmp/muse.log")));
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
tick_ms = 250
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("MUSE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("MUSE__AUDIO__TICK_MS", "50");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.tick_ms, 50);
}
