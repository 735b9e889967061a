//! CLI argument definitions for the bible reader.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use bible_reader::core::BookOrder;

#[derive(Parser)]
#[command(
    name = "bible-reader",
    version,
    about = "Offline bible reader - download translations and read them"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Show more log output on the terminal (-v for debug, -vv for trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// List the known translations.
    Versions,

    /// Download a translation and store it for offline use.
    Download {
        /// Translation key, e.g. en_kjv.
        key: String,
    },

    /// Print a chapter and make its translation the one being read.
    Read(ReadArgs),

    /// List bookmarks, or open one.
    Bookmarks(BookmarksArgs),

    /// Show or change reader settings.
    Settings(SettingsArgs),
}

#[derive(Parser)]
pub struct BookmarksArgs {
    /// Open the bookmark at this position (0-based) and print its chapter.
    #[arg(long, value_name = "INDEX")]
    pub open: Option<usize>,

    /// Remove the bookmark at this position (0-based).
    #[arg(long, value_name = "INDEX", conflicts_with = "open")]
    pub remove: Option<usize>,
}

#[derive(Parser)]
pub struct ReadArgs {
    /// Translation key, e.g. en_kjv.
    pub key: String,

    /// Book name (default: the first book of the translation).
    #[arg(long)]
    pub book: Option<String>,

    /// 1-based chapter number.
    #[arg(long, default_value_t = 1)]
    pub chapter: u32,

    /// Bookmark the printed chapter.
    #[arg(long)]
    pub bookmark: bool,
}

#[derive(Parser)]
pub struct SettingsArgs {
    #[arg(long)]
    pub text_size: Option<u32>,

    #[arg(long, value_enum)]
    pub book_order: Option<BookOrderArg>,

    /// Keep the screen on while reading.
    #[arg(long)]
    pub wake_lock: Option<bool>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BookOrderArg {
    Normal,
    Alphabetical,
}

impl From<BookOrderArg> for BookOrder {
    fn from(arg: BookOrderArg) -> Self {
        match arg {
            BookOrderArg::Normal => BookOrder::Normal,
            BookOrderArg::Alphabetical => BookOrder::Alphabetical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("bible-reader").chain(args.iter().copied()))
    }

    #[test]
    fn test_read_defaults_to_first_chapter() {
        let Command::Read(args) = parse(&["read", "en_kjv"]).unwrap().command else {
            panic!("expected read");
        };
        assert_eq!(args.key, "en_kjv");
        assert_eq!(args.book, None);
        assert_eq!(args.chapter, 1);
        assert!(!args.bookmark);
    }

    #[test]
    fn test_read_takes_position_explicitly() {
        let cli = parse(&["read", "en_kjv", "--book", "Exodus", "--chapter", "2", "--bookmark"]);
        let Command::Read(args) = cli.unwrap().command else {
            panic!("expected read");
        };
        assert_eq!(args.book.as_deref(), Some("Exodus"));
        assert_eq!(args.chapter, 2);
        assert!(args.bookmark);
    }

    #[test]
    fn test_read_has_no_relative_navigation() {
        // Positions are not saved between runs, so there is nothing to move on from
        assert!(parse(&["read", "en_kjv", "--next"]).is_err());
        assert!(parse(&["read", "en_kjv", "--bookmark", "Morning"]).is_err());
    }

    #[test]
    fn test_bookmarks_open_conflicts_with_remove() {
        assert!(parse(&["bookmarks", "--open", "0", "--remove", "1"]).is_err());
        let Command::Bookmarks(args) = parse(&["bookmarks", "--open", "0"]).unwrap().command else {
            panic!("expected bookmarks");
        };
        assert_eq!(args.open, Some(0));
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(parse(&["versions"]).unwrap().log_level(), LevelFilter::Warn);
        assert_eq!(parse(&["-vv", "versions"]).unwrap().log_level(), LevelFilter::Debug);
    }
}
