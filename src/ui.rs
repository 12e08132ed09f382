//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::App;
use crate::config::{ControlsSettings, TimeField, UiSettings};
use crate::engine::PlayerPhase;
use crate::model::display_from_fields;

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("gg/G".to_string(), "top/bottom".to_string());
    map.insert("enter".to_string(), "play selected song".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("h/l".to_string(), "prev/next song".to_string());
    // H/L and +/- are filled dynamically from config.
    map.insert("/".to_string(), "filter".to_string());
    map.insert("v".to_string(), "lyrics".to_string());
    map.insert("J/K".to_string(), "scrub lyrics".to_string());
    map.insert("i".to_string(), "metadata".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating scrub seconds and volume step.
fn controls_text(controls: &ControlsSettings, lyric_view: bool) -> String {
    let order = [
        "j/k", "h/l", "H/L", "enter", "space/p", "+/-", "gg/G", "/", "v", "J/K", "i", "q",
    ];
    order
        .iter()
        .filter(|k| lyric_view || **k != "J/K")
        .filter_map(|k| match *k {
            "H/L" => Some(format!("[H/L] seek -/+{}s", controls.scrub_seconds)),
            "+/-" => Some(format!(
                "[+/-] volume {}%",
                (controls.volume_step * 100.0).round()
            )),
            _ => CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v)),
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or_default()
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
fn now_playing_time_text(
    elapsed: Duration,
    total: Option<Duration>,
    ui: &UiSettings,
) -> Option<String> {
    if ui.now_playing_time_fields.is_empty() {
        return None;
    }

    let mut parts: Vec<String> = Vec::new();
    for f in &ui.now_playing_time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_mmss(elapsed)),
            TimeField::Total => {
                if let Some(t) = total {
                    parts.push(format_mmss(t));
                }
            }
            TimeField::Remaining => {
                if let Some(t) = total {
                    let rem = t.saturating_sub(elapsed);
                    parts.push(format!("-{}", format_mmss(rem)));
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

fn phase_text(phase: PlayerPhase) -> &'static str {
    match phase {
        PlayerPhase::Idle => "Stopped",
        PlayerPhase::Loading => "Loading",
        PlayerPhase::Playing => "Playing",
        PlayerPhase::Paused => "Paused",
        PlayerPhase::Ended => "Ended",
        PlayerPhase::Errored => "Error",
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Format an optional duration, rounding up partial seconds, showing total seconds.
fn format_duration_mmss_ceil(d: Option<Duration>) -> String {
    let Some(d) = d else {
        return "-".to_string();
    };

    let mut total_secs = d.as_secs();
    if d.subsec_nanos() > 0 {
        total_secs = total_secs.saturating_add(1);
    }

    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{}:{:02} ({}s)", minutes, seconds, total_secs)
}

/// First and one-past-last index of a window of `height` rows over `total`
/// items that keeps `focus` centered where possible.
fn centered_window(total: usize, height: usize, focus: usize) -> (usize, usize) {
    if total <= height || height == 0 {
        return (0, total);
    }
    let half = height / 2;
    let mut start = focus.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn status_text(app: &App, ui: &UiSettings) -> String {
    let mut parts: Vec<String> = Vec::new();

    if app.follow_playback {
        parts.push(" CURSOR: Follow".to_string());
    } else {
        parts.push(" CURSOR: Free-roam".to_string());
    }

    let q = app.filter_query.trim();
    if app.filter_mode || !q.is_empty() {
        let mut filter_part = String::from("FILTER:");
        if !q.is_empty() {
            filter_part.push(' ');
            filter_part.push_str(q);
        }
        parts.push(filter_part);
    }

    let playback = &app.playback;
    if let Some(track) = &playback.current_track {
        let song = display_from_fields(track, &ui.now_playing_track_fields, &ui.track_separator);
        let total = if playback.duration > 0.0 {
            Some(seconds(playback.duration))
        } else {
            track.duration()
        };
        match now_playing_time_text(seconds(playback.progress), total, ui) {
            Some(time) => parts.push(format!("Song: {} [{}]", song, time)),
            None => parts.push(format!("Song: {}", song)),
        }
    }
    parts.push(phase_text(playback.phase).to_string());
    parts.push(format!("Vol: {:.0}%", playback.volume * 100.0));

    if !app.source_title.is_empty() {
        parts.push(format!("List: {}", app.source_title));
    }
    if let Some(msg) = &app.status {
        parts.push(format!("! {}", msg));
    }

    parts.join(" • ")
}

fn draw_track_list(frame: &mut Frame, app: &App, display: &[usize], area: Rect) {
    let q = app.filter_query.trim();
    let query_lower = if q.is_empty() {
        None
    } else if app.uses_lower_titles() {
        Some(q.to_lowercase())
    } else {
        None
    };

    // Only build ListItems for the visible window.
    let total = display.len();
    let sel_pos = display.iter().position(|&i| i == app.selected).unwrap_or(0);
    let (start, end) = centered_window(total, area.height.saturating_sub(2) as usize, sel_pos);
    let playing = app.playing_index();

    let visible_items: Vec<ListItem> = display[start..end]
        .iter()
        .map(|&i| {
            let title = app.title(i);
            let marker = if Some(i) == playing { "♪ " } else { "  " };
            let positions = if q.is_empty() {
                None
            } else {
                match query_lower.as_deref() {
                    Some(ql) => app.fuzzy_match_positions_for_track_lower(i, ql),
                    None => App::fuzzy_match_positions(title, q),
                }
            };

            let mut rendered = String::from(marker);
            match positions {
                Some(positions) => {
                    let mut pos_iter = positions.into_iter();
                    let mut next_pos = pos_iter.next();
                    for (ci, ch) in title.chars().enumerate() {
                        if next_pos == Some(ci) {
                            rendered.extend(ch.to_uppercase());
                            next_pos = pos_iter.next();
                        } else {
                            rendered.push(ch);
                        }
                    }
                }
                None => rendered.push_str(title),
            }
            ListItem::new(rendered)
        })
        .collect();

    let list = List::new(visible_items)
        .block(Block::default().borders(Borders::ALL).title(" tracks "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(sel_pos - start));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_lyrics(frame: &mut Frame, app: &App, area: Rect) {
    let lines = &app.lyrics.lines;
    let active = app.lyric_sync.active();
    let cursor = app.lyric_sync.scrub_cursor();
    let focus = cursor.or(app.lyric_center).unwrap_or(0);

    let height = area.height.saturating_sub(2) as usize;
    let (start, end) = centered_window(lines.len(), height, focus);

    let rendered: Vec<Line> = lines[start..end]
        .iter()
        .enumerate()
        .map(|(offset, line)| {
            let i = start + offset;
            let mut style = Style::default();
            if Some(i) == active {
                style = style.add_modifier(Modifier::BOLD);
            } else {
                style = style.add_modifier(Modifier::DIM);
            }
            if Some(i) == cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Line::styled(line.text.as_str(), style)
        })
        .collect();

    let title = if cursor.is_some() {
        " lyrics (enter seeks, esc resumes) "
    } else {
        " lyrics "
    };
    let pane = Paragraph::new(rendered)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(pane, area);
}

fn draw_metadata(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_sized(72, 9, area);
    frame.render_widget(Clear, popup_area);

    let meta = match app.selected_track() {
        Some(track) => format!(
            "Title: {}\nArtist: {}\nAlbum: {}\nDuration: {}\nCover: {}\nId: {}",
            track.name,
            track.artist_names(),
            if track.album.name.trim().is_empty() {
                "-"
            } else {
                track.album.name.as_str()
            },
            format_duration_mmss_ceil(track.duration()),
            track.cover_url().unwrap_or("-"),
            track.id,
        ),
        None => "No track selected".to_string(),
    };
    let meta_paragraph = Paragraph::new(meta)
        .block(
            Block::default()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .borders(Borders::ALL)
                .title(" metadata (i closes) "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(meta_paragraph, popup_area);
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    display: &[usize],
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" muse ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status_par = Paragraph::new(status_text(app, ui_settings))
        .slow_blink()
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    let list_area = if app.lyric_view {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);
        draw_lyrics(frame, app, halves[1]);
        halves[0]
    } else {
        chunks[2]
    };
    draw_track_list(frame, app, display, list_area);

    // Keep the popup inside the list area so it doesn't cover header/status/footer.
    if app.metadata_window {
        draw_metadata(frame, app, list_area);
    }

    let footer = Paragraph::new(controls_text(controls_settings, app.lyric_view))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}
