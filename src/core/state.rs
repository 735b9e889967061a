//! Application state
//!
//! [`AppState`] holds everything the UI shows besides scripture text: the
//! current screen, the catalog, the bible being read, bookmarks and reader
//! settings. Setters notify in a fixed order before returning:
//! 1. the persisted mapping is updated,
//! 2. a debounced save is scheduled (for persisted fields),
//! 3. registered observers run, in registration order.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError};

use crate::config::AppConfig;
use crate::runtime::HostRuntime;
use crate::scripture::{Book, Chapter};
use crate::versions::{Catalog, Version};

use super::bible::SharedBible;
use super::bookmark::Bookmark;
use super::debounce::SaveScheduler;
use super::library::BibleLibrary;
use super::persisted::{PersistedState, StateStore};
use super::theme::Theme;

/// Text size used until the reader picks one
pub const DEFAULT_TEXT_SIZE: u32 = 14;

/// Screens of the app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Translation picker / downloads
    #[default]
    Versions,
    Reader,
    Settings,
}

/// How the book list is ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookOrder {
    /// Order of the translation file (canonical order)
    #[default]
    Normal,
    Alphabetical,
}

/// A field of [`AppState`] that changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    Screen,
    Bookmarks,
    Bible,
    TextSize,
    BookOrder,
    WakeLock,
}

impl StateChange {
    /// Whether the change is written to the state file
    pub fn is_persisted(self) -> bool {
        !matches!(self, StateChange::Screen)
    }
}

/// Callback run after a field of [`AppState`] changed
pub type StateObserver = Box<dyn Fn(&AppState, StateChange) + Send>;

/// Hands out the application state, once
///
/// The app builds a single factory at startup; every part of the app that
/// needs the state receives it from whoever owns it.
#[derive(Debug, Default)]
pub struct AppStateFactory {
    created: AtomicBool,
}

impl AppStateFactory {
    pub const fn new() -> Self {
        Self {
            created: AtomicBool::new(false),
        }
    }

    /// Create the application state
    ///
    /// Fails if this factory already created one.
    pub fn create(
        &self,
        config: AppConfig,
        runtime: Arc<dyn HostRuntime>,
    ) -> Result<AppState, String> {
        if self.created.swap(true, Ordering::SeqCst) {
            return Err("AppState is a singleton, only one instance can exist!".to_string());
        }
        Ok(AppState::new(config, runtime))
    }
}

/// Application-wide state
pub struct AppState {
    config: AppConfig,
    screen: Screen,
    theme: Theme,
    bookmarks: Vec<Bookmark>,
    library: BibleLibrary,
    text_size: u32,
    book_order: BookOrder,
    wake_lock: bool,
    store: Arc<StateStore>,
    saves: SaveScheduler,
    runtime: Arc<dyn HostRuntime>,
    observers: Vec<StateObserver>,
}

impl AppState {
    /// Load saved state and derive the initial field values from it
    fn new(config: AppConfig, runtime: Arc<dyn HostRuntime>) -> Self {
        let store = Arc::new(StateStore::load(config.state_path()));
        let saved = store.snapshot();

        let mut library = BibleLibrary::new(Catalog::builtin(&config.downloads_dir()));
        let bible = saved
            .bible
            .as_deref()
            .and_then(|key| match library.get_bible(key) {
                Ok(bible) => Some(bible),
                Err(e) => {
                    log::warn!("Could not restore bible {:?}: {}", key, e);
                    None
                }
            });
        library.set_current(bible);

        let screen = if library.current().is_some() {
            Screen::Reader
        } else {
            Screen::Versions
        };

        let bookmarks = saved
            .bookmarks
            .unwrap_or_default()
            .into_iter()
            .map(Bookmark::from_state)
            .collect();

        let wake_lock = saved.wake_lock.unwrap_or(false);
        if wake_lock {
            runtime.set_keep_screen_on(true);
        }

        let saves = SaveScheduler::new(Arc::clone(&store), Arc::clone(&runtime), config.save_delay);

        Self {
            screen,
            theme: Theme::default(),
            bookmarks,
            library,
            text_size: saved.text_size.unwrap_or(DEFAULT_TEXT_SIZE),
            book_order: saved.book_order.unwrap_or_default(),
            wake_lock,
            store,
            saves,
            runtime,
            observers: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Register a callback for every field change
    pub fn observe(&mut self, observer: impl Fn(&AppState, StateChange) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    // --- Screen & theme ---

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn set_screen(&mut self, screen: Screen) {
        if self.screen != screen {
            self.screen = screen;
            self.notify(StateChange::Screen);
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    // --- Translations ---

    /// All known translations
    pub fn bible_versions(&self) -> &Catalog {
        self.library.catalog()
    }

    pub fn version(&self, key: &str) -> Option<&Version> {
        self.library.version(key)
    }

    pub fn library(&self) -> &BibleLibrary {
        &self.library
    }

    /// The bible for `key`, loaded once and cached
    pub fn get_bible(&mut self, key: &str) -> Result<SharedBible, String> {
        self.library.get_bible(key)
    }

    /// The bible being read
    pub fn bible(&self) -> Option<SharedBible> {
        self.library.current()
    }

    /// Switch to another translation, or to none
    pub fn set_bible(&mut self, key: Option<&str>) -> Result<(), String> {
        let bible = match key {
            Some(key) => Some(self.library.get_bible(key)?),
            None => None,
        };

        let unchanged = match (&bible, self.library.current()) {
            (Some(new), Some(current)) => Arc::ptr_eq(new, &current),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return Ok(());
        }

        self.library.set_current(bible);
        self.notify(StateChange::Bible);
        Ok(())
    }

    // --- Settings ---

    pub fn text_size(&self) -> u32 {
        self.text_size
    }

    pub fn set_text_size(&mut self, text_size: u32) {
        if self.text_size != text_size {
            self.text_size = text_size;
            self.notify(StateChange::TextSize);
        }
    }

    pub fn book_order(&self) -> BookOrder {
        self.book_order
    }

    pub fn set_book_order(&mut self, book_order: BookOrder) {
        if self.book_order != book_order {
            self.book_order = book_order;
            self.notify(StateChange::BookOrder);
        }
    }

    pub fn wake_lock(&self) -> bool {
        self.wake_lock
    }

    pub fn set_wake_lock(&mut self, wake_lock: bool) {
        if self.wake_lock != wake_lock {
            self.wake_lock = wake_lock;
            self.notify(StateChange::WakeLock);
        }
    }

    // --- Bookmarks ---

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn set_bookmarks(&mut self, bookmarks: Vec<Bookmark>) {
        self.bookmarks = bookmarks;
        self.notify(StateChange::Bookmarks);
    }

    pub fn add_bookmark(&mut self, bookmark: Bookmark) {
        self.bookmarks.push(bookmark);
        self.notify(StateChange::Bookmarks);
    }

    /// Bookmark the current position of the bible being read
    pub fn bookmark_current(&mut self, name: Option<String>) -> Result<(), String> {
        let bible = self
            .library
            .current()
            .ok_or_else(|| "No bible selected".to_string())?;

        let (book, chapter) = {
            let guard = bible.lock().unwrap_or_else(PoisonError::into_inner);
            (guard.current_book(), guard.current_chapter())
        };
        let (Some(book), Some(chapter)) = (book, chapter) else {
            return Err("No chapter selected".to_string());
        };

        self.add_bookmark(Bookmark::new(&bible, book, chapter, name));
        Ok(())
    }

    pub fn remove_bookmark(&mut self, index: usize) -> Option<Bookmark> {
        if index >= self.bookmarks.len() {
            return None;
        }
        let removed = self.bookmarks.remove(index);
        self.notify(StateChange::Bookmarks);
        Some(removed)
    }

    /// Resolve what a bookmark points at
    pub fn bookmark_target(
        &mut self,
        index: usize,
    ) -> Option<(SharedBible, Arc<Book>, Arc<Chapter>)> {
        let bookmark = self.bookmarks.get_mut(index)?;
        bookmark.target(&mut self.library)
    }

    /// Jump the reader to a bookmark
    pub fn open_bookmark(&mut self, index: usize) -> Result<(), String> {
        let bookmark = self
            .bookmarks
            .get_mut(index)
            .ok_or_else(|| format!("No bookmark at position {}", index))?;
        let name = bookmark.name().to_string();
        let (bible, book, chapter) = bookmark
            .target(&mut self.library)
            .ok_or_else(|| format!("Bookmark {:?} no longer points anywhere", name))?;

        {
            let mut guard = bible.lock().unwrap_or_else(PoisonError::into_inner);
            guard.set_current_book(book);
            guard.set_current_chapter(chapter);
        }

        let switched = !self
            .library
            .current()
            .is_some_and(|current| Arc::ptr_eq(&current, &bible));
        if switched {
            self.library.set_current(Some(bible));
            self.notify(StateChange::Bible);
        }

        self.set_screen(Screen::Reader);
        Ok(())
    }

    // --- Persistence ---

    /// Copy of the persisted mapping
    pub fn state(&self) -> PersistedState {
        self.store.snapshot()
    }

    /// Saves scheduled but not yet run
    pub fn pending_saves(&self) -> usize {
        self.saves.pending()
    }

    /// Write the state file now instead of waiting for the debounce
    pub fn flush(&self) -> bool {
        self.saves.flush()
    }

    fn notify(&mut self, change: StateChange) {
        self.mirror(change);

        if change.is_persisted() {
            self.saves.schedule();
        }

        let observers = std::mem::take(&mut self.observers);
        for observer in &observers {
            observer(self, change);
        }
        self.observers = observers;
    }

    /// Copy a changed field into the persisted mapping
    fn mirror(&self, change: StateChange) {
        match change {
            StateChange::Screen => {}
            StateChange::Bookmarks => {
                let bookmarks = self.bookmarks.iter().map(|b| b.state().clone()).collect();
                self.store.update(|s| s.bookmarks = Some(bookmarks));
            }
            StateChange::Bible => {
                let key = self.library.current().and_then(|bible| {
                    bible
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .version_key()
                        .map(str::to_string)
                });
                self.store.update(|s| s.bible = key);
                self.runtime.force_update();
            }
            StateChange::TextSize => {
                let text_size = self.text_size;
                self.store.update(|s| s.text_size = Some(text_size));
            }
            StateChange::BookOrder => {
                let book_order = self.book_order;
                self.store.update(|s| s.book_order = Some(book_order));
            }
            StateChange::WakeLock => {
                self.runtime.set_keep_screen_on(self.wake_lock);
                let wake_lock = self.wake_lock;
                self.store.update(|s| s.wake_lock = Some(wake_lock));
            }
        }
    }
}
