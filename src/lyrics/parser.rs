use std::sync::LazyLock;

use regex::Regex;

/// Text of the single line produced when a track has no usable lyrics.
pub const NO_LYRICS: &str = "No lyrics for this track";

/// A run of timestamps at the very start of a line, then the text.
static TIMED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:\[\d+:\d{1,2}\.\d{2,3}\])+)(.*)$").expect("timed line pattern")
});

static TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+):(\d{1,2})\.(\d{2,3})\]").expect("timestamp pattern"));

/// One lyric line and the second it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct LyricLine {
    pub time: f64,
    pub text: String,
}

impl LyricLine {
    pub fn is_placeholder(&self) -> bool {
        self.time == 0.0 && self.text == NO_LYRICS
    }
}

/// The single-line placeholder document.
pub fn no_lyrics() -> Vec<LyricLine> {
    vec![LyricLine {
        time: 0.0,
        text: NO_LYRICS.to_string(),
    }]
}

/// Parse `[mm:ss.xx]text` lyrics into lines sorted by time.
///
/// Timestamps must lead the line. A line may carry several; each yields its
/// own entry with the same text. Lines not starting with a timestamp,
/// metadata tags such as `[ar:...]` and entries whose text is blank are
/// dropped. Brackets later in the text are kept as text. Never fails: anything
/// without a usable line becomes [`no_lyrics`].
pub fn parse_lrc(raw: &str) -> Vec<LyricLine> {
    let mut lines = Vec::new();
    for line in raw.lines() {
        let Some(parts) = TIMED_LINE.captures(line.trim_start()) else {
            continue;
        };
        let text = parts[2].trim();
        if text.is_empty() {
            continue;
        }

        let times: Vec<f64> = TIMESTAMP
            .captures_iter(&parts[1])
            .filter_map(|caps| {
                let minutes: f64 = caps[1].parse().ok()?;
                let seconds: f64 = caps[2].parse().ok()?;
                let fraction = &caps[3];
                let mut millis: f64 = fraction.parse().ok()?;
                if fraction.len() == 2 {
                    millis *= 10.0;
                }
                Some(minutes * 60.0 + seconds + millis / 1000.0)
            })
            .collect();
        lines.extend(times.into_iter().map(|time| LyricLine {
            time,
            text: text.to_string(),
        }));
    }

    if lines.is_empty() {
        return no_lyrics();
    }
    lines.sort_by(|a, b| a.time.total_cmp(&b.time));
    lines
}
