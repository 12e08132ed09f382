use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Terminal player for NetEase-compatible music APIs.
#[derive(Debug, Default, Parser)]
#[command(name = "muse", version, about)]
pub struct Cli {
    /// Load the tracks of a playlist by id.
    #[arg(long, conflicts_with_all = ["search", "list"])]
    pub playlist: Option<u64>,

    /// Load the songs matching a keyword search.
    #[arg(long, conflicts_with = "list")]
    pub search: Option<String>,

    /// Open one of the service's built-in lists.
    #[arg(long, value_enum)]
    pub list: Option<ListKind>,

    /// Config file to use instead of the XDG default.
    #[arg(long, env = "MUSE_CONFIG_PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListKind {
    /// First chart of the top lists.
    Top,
    /// Hottest community playlist.
    Hot,
    /// First recommended playlist (personalised when logged in).
    Recommended,
    /// Today's recommended songs. Needs login.
    Daily,
    /// A batch of personal FM tracks. Needs login.
    Fm,
    /// Songs played most this week. Needs login.
    History,
    /// The user's own first playlist, usually their liked songs. Needs login.
    Liked,
}

impl ListKind {
    pub fn needs_login(self) -> bool {
        matches!(self, Self::Daily | Self::Fm | Self::History | Self::Liked)
    }
}
