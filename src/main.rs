//! Bible Reader CLI
//!
//! Drives the state layer from a terminal: lists and downloads translations,
//! prints chapters and manages bookmarks and settings. State is saved to the
//! same place a graphical shell would use.

use clap::Parser;
use std::sync::{Arc, PoisonError};

use bible_reader::config::AppConfig;
use bible_reader::core::{AppState, AppStateFactory, Screen, SharedBible};
use bible_reader::logging::init_logging;
use bible_reader::runtime::{HostRuntime, TokioRuntime};
use bible_reader::versions::HttpClient;

mod cli;

use crate::cli::{BookmarksArgs, Cli, Command, ReadArgs, SettingsArgs};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    let exit_code = match run(cli.command).await {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error}");
            1
        }
    };
    std::process::exit(exit_code);
}

async fn run(command: Command) -> Result<(), String> {
    let config = AppConfig::from_env()?;
    let runtime: Arc<dyn HostRuntime> = Arc::new(TokioRuntime::current()?);
    let factory = AppStateFactory::new();
    let mut state = factory.create(config, Arc::clone(&runtime))?;

    let result = match command {
        Command::Versions => {
            list_versions(&state);
            Ok(())
        }
        Command::Download { key } => download(&state, &key, runtime.as_ref()).await,
        Command::Read(args) => read(&mut state, args),
        Command::Bookmarks(args) => bookmarks(&mut state, args),
        Command::Settings(args) => {
            settings(&mut state, args);
            Ok(())
        }
    };

    // Don't leave the debounce timers to a runtime that is about to stop
    if state.pending_saves() > 0 {
        state.flush();
    }
    result
}

fn list_versions(state: &AppState) {
    for version in state.bible_versions().iter() {
        let marker = if version.is_downloaded() { "*" } else { " " };
        println!(
            "{} {:<16} {:<12} {}",
            marker,
            version.key(),
            version.language(),
            version.name()
        );
    }
}

async fn download(state: &AppState, key: &str, runtime: &dyn HostRuntime) -> Result<(), String> {
    let version = state
        .version(key)
        .cloned()
        .ok_or_else(|| format!("Unknown translation {:?}", key))?;

    if version.is_downloaded() {
        println!("{} is already downloaded", version.name());
        return Ok(());
    }

    let client = HttpClient::new(state.config().user_agent.clone());
    version.download(&client, runtime).await?;
    println!("{}: {}", version.name(), version.status());
    Ok(())
}

fn read(state: &mut AppState, args: ReadArgs) -> Result<(), String> {
    state.set_bible(Some(&args.key))?;
    let bible = state
        .bible()
        .ok_or_else(|| format!("{} could not be opened", args.key))?;

    {
        let mut guard = bible.lock().unwrap_or_else(PoisonError::into_inner);
        let book = match &args.book {
            Some(book) => book.clone(),
            None => guard
                .books()
                .first()
                .map(|b| b.name().to_string())
                .ok_or_else(|| format!("{} has no books", args.key))?,
        };
        if !guard.goto(&book, args.chapter) {
            return Err(format!("{} has no {} {}", args.key, book, args.chapter));
        }
    }

    print_chapter(&bible)?;

    if args.bookmark {
        state.bookmark_current(None)?;
    }
    state.set_screen(Screen::Reader);
    Ok(())
}

fn bookmarks(state: &mut AppState, args: BookmarksArgs) -> Result<(), String> {
    if let Some(index) = args.open {
        state.open_bookmark(index)?;
        let bible = state
            .bible()
            .ok_or_else(|| "No bible selected".to_string())?;
        return print_chapter(&bible);
    }

    if let Some(index) = args.remove {
        let removed = state
            .remove_bookmark(index)
            .ok_or_else(|| format!("No bookmark at position {}", index))?;
        println!("Removed {}", removed.name());
        return Ok(());
    }

    if state.bookmarks().is_empty() {
        println!("No bookmarks");
    }
    for index in 0..state.bookmarks().len() {
        let name = state.bookmarks()[index].name().to_string();
        let note = if state.bookmark_target(index).is_some() {
            ""
        } else {
            " (unavailable)"
        };
        println!("{:>3}  {}{}", index, name, note);
    }
    Ok(())
}

fn settings(state: &mut AppState, args: SettingsArgs) {
    if let Some(text_size) = args.text_size {
        state.set_text_size(text_size);
    }
    if let Some(book_order) = args.book_order {
        state.set_book_order(book_order.into());
    }
    if let Some(wake_lock) = args.wake_lock {
        state.set_wake_lock(wake_lock);
    }

    println!("text size:  {}", state.text_size());
    println!("book order: {:?}", state.book_order());
    println!("wake lock:  {}", state.wake_lock());
}

fn print_chapter(bible: &SharedBible) -> Result<(), String> {
    let guard = bible.lock().unwrap_or_else(PoisonError::into_inner);
    let (Some(book), Some(chapter)) = (guard.current_book(), guard.current_chapter()) else {
        return Err("The translation has no chapters".to_string());
    };
    drop(guard);

    println!("{} {}", book.name(), chapter.number());
    for verse in chapter.verses() {
        println!("{}", verse);
    }
    Ok(())
}
