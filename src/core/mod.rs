//! Core application logic and state
//!
//! This module contains:
//! - The loaded bible and its reading position
//! - Bookmarks and their lazy resolution
//! - Application-wide state, its persistence and debounced saves

mod bible;
mod bookmark;
mod debounce;
mod library;
mod memo;
mod persisted;
mod state;
mod theme;

pub use bible::{Bible, SharedBible};
pub use bookmark::{Bookmark, BookmarkState};
pub use debounce::SaveScheduler;
pub use library::BibleLibrary;
pub use memo::Memo;
pub use persisted::{PersistedState, StateStore};
pub use state::{
    AppState, AppStateFactory, BookOrder, DEFAULT_TEXT_SIZE, Screen, StateChange, StateObserver,
};
pub use theme::{Rgb, Theme};
