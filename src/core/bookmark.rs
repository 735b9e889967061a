//! Bookmarks into a bible
//!
//! Only the [`BookmarkState`] reference is saved. The bible, book and chapter
//! it points at are looked up again after a restart, each at most once, and
//! any lookup that fails (unknown translation, renamed book, chapter out of
//! range) simply resolves to nothing.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::scripture::{Book, Chapter};

use super::bible::{Bible, SharedBible};
use super::library::BibleLibrary;
use super::memo::Memo;

/// Persisted form of a bookmark
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkState {
    /// Translation key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bible: Option<String>,
    /// Book name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    /// 1-based chapter number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<u32>,
}

impl BookmarkState {
    pub fn new(bible: impl Into<String>, book: impl Into<String>, chapter: u32) -> Self {
        Self {
            bible: Some(bible.into()),
            book: Some(book.into()),
            chapter: Some(chapter),
        }
    }
}

/// A saved position in a bible
#[derive(Debug, Clone)]
pub struct Bookmark {
    name: String,
    state: BookmarkState,
    bible: Memo<Weak<Mutex<Bible>>>,
    book: Memo<Arc<Book>>,
    chapter: Memo<Arc<Chapter>>,
}

impl Bookmark {
    /// Bookmark a live position
    ///
    /// The saved reference is taken from the objects now; later changes to
    /// them are not reflected in it.
    pub fn new(
        bible: &SharedBible,
        book: Arc<Book>,
        chapter: Arc<Chapter>,
        name: Option<String>,
    ) -> Self {
        let key = bible
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .version_key()
            .map(str::to_string);

        let state = BookmarkState {
            bible: key,
            book: Some(book.name().to_string()),
            chapter: Some(chapter.number()),
        };

        Self {
            name: name.unwrap_or_else(|| default_name(&state)),
            state,
            bible: Memo::resolved(Arc::downgrade(bible)),
            book: Memo::resolved(book),
            chapter: Memo::resolved(chapter),
        }
    }

    /// Restore a bookmark from its saved reference
    pub fn from_state(state: BookmarkState) -> Self {
        Self {
            name: default_name(&state),
            state,
            bible: Memo::new(),
            book: Memo::new(),
            chapter: Memo::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The saved reference
    pub fn state(&self) -> &BookmarkState {
        &self.state
    }

    /// The bible this bookmark points into
    ///
    /// Prefers the bible currently being read, so opening a bookmark never
    /// loads a second translation; otherwise loads the saved translation.
    pub fn bible(&mut self, library: &mut BibleLibrary) -> Option<SharedBible> {
        let state = &self.state;
        let weak = self.bible.get_or_resolve(|| {
            if let Some(current) = library.current() {
                return Some(Arc::downgrade(&current));
            }
            let key = state.bible.as_deref()?;
            match library.get_bible(key) {
                Ok(bible) => Some(Arc::downgrade(&bible)),
                Err(e) => {
                    log::debug!("Bookmark {:?}: no bible: {}", key, e);
                    None
                }
            }
        })?;
        weak.upgrade()
    }

    /// The bookmarked book, looked up by name in [`Bookmark::bible`]
    pub fn book(&mut self, library: &mut BibleLibrary) -> Option<Arc<Book>> {
        if !self.book.is_resolved() {
            let bible = self.bible(library);
            let name = self.state.book.clone();
            self.book.get_or_resolve(|| {
                let bible = bible?;
                let name = name?;
                let found = bible
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .get_book(&name);
                found
            });
        }
        self.book.get_or_resolve(|| None)
    }

    /// The bookmarked chapter, by its 1-based number in [`Bookmark::book`]
    pub fn chapter(&mut self, library: &mut BibleLibrary) -> Option<Arc<Chapter>> {
        if !self.chapter.is_resolved() {
            let book = self.book(library);
            let number = self.state.chapter;
            self.chapter.get_or_resolve(|| book?.chapter(number?));
        }
        self.chapter.get_or_resolve(|| None)
    }

    /// Resolve everything at once
    pub fn target(
        &mut self,
        library: &mut BibleLibrary,
    ) -> Option<(SharedBible, Arc<Book>, Arc<Chapter>)> {
        let bible = self.bible(library)?;
        let book = self.book(library)?;
        let chapter = self.chapter(library)?;
        Some((bible, book, chapter))
    }
}

fn default_name(state: &BookmarkState) -> String {
    match (&state.book, state.chapter) {
        (Some(book), Some(chapter)) => format!("{} {}", book, chapter),
        (Some(book), None) => book.clone(),
        _ => "Bookmark".to_string(),
    }
}
