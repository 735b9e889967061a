//! A loaded translation and the current reading position

use serde_json::Value;
use std::sync::{Arc, Mutex};

use crate::scripture::{Book, Chapter};
use crate::storage;
use crate::versions::Version;

use super::state::BookOrder;

/// A bible shared between the app state, its cache and bookmarks
pub type SharedBible = Arc<Mutex<Bible>>;

/// A translation's books plus where the reader currently is
#[derive(Debug)]
pub struct Bible {
    version: Option<Version>,
    loading: bool,
    books: Vec<Arc<Book>>,
    current_book: Option<Arc<Book>>,
    current_chapter: Option<Arc<Chapter>>,
}

impl Default for Bible {
    fn default() -> Self {
        Self {
            version: None,
            loading: true,
            books: Vec::new(),
            current_book: None,
            current_chapter: None,
        }
    }
}

impl Bible {
    /// Load the books of an already downloaded translation
    pub fn load(version: Version) -> Result<Self, String> {
        let mut bible = Self::default();
        bible.set_version(version)?;
        Ok(bible)
    }

    /// Assign the translation and decode its books from disk
    ///
    /// The reading position moves to the first chapter of the first book.
    /// If decoding fails the bible is left empty (no books, no position) and
    /// the error is returned. `loading` is cleared either way.
    pub fn set_version(&mut self, version: Version) -> Result<(), String> {
        self.loading = true;
        let decoded = decode_books(version.path());
        self.version = Some(version);
        self.loading = false;

        match decoded {
            Ok(books) => {
                log::debug!("Loaded {} books from {:?}", books.len(), self.version_key());
                self.books = books;
                match self.books.first().cloned() {
                    Some(first) => self.set_current_book(first),
                    None => {
                        self.current_book = None;
                        self.current_chapter = None;
                    }
                }
                Ok(())
            }
            Err(e) => {
                log::warn!("Failed to load {:?}: {}", self.version_key(), e);
                self.books.clear();
                self.current_book = None;
                self.current_chapter = None;
                Err(e)
            }
        }
    }

    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    /// Key of the assigned translation
    pub fn version_key(&self) -> Option<&str> {
        self.version.as_ref().map(Version::key)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Books in file order
    pub fn books(&self) -> &[Arc<Book>] {
        &self.books
    }

    /// Books in the order the book list should show them
    pub fn ordered_books(&self, order: BookOrder) -> Vec<Arc<Book>> {
        let mut books = self.books.clone();
        if order == BookOrder::Alphabetical {
            books.sort_by_cached_key(|b| b.name().to_lowercase());
        }
        books
    }

    pub fn get_book(&self, name: &str) -> Option<Arc<Book>> {
        self.books.iter().find(|b| b.name() == name).cloned()
    }

    pub fn current_book(&self) -> Option<Arc<Book>> {
        self.current_book.clone()
    }

    pub fn current_chapter(&self) -> Option<Arc<Chapter>> {
        self.current_chapter.clone()
    }

    /// Move to a book; the chapter resets to its first one
    pub fn set_current_book(&mut self, book: Arc<Book>) {
        self.current_chapter = book.first_chapter();
        self.current_book = Some(book);
    }

    pub fn set_current_chapter(&mut self, chapter: Arc<Chapter>) {
        self.current_chapter = Some(chapter);
    }

    /// Move to a book by name
    pub fn select_book(&mut self, name: &str) -> bool {
        match self.get_book(name) {
            Some(book) => {
                self.set_current_book(book);
                true
            }
            None => false,
        }
    }

    /// Move to a chapter of the current book by its 1-based number
    pub fn select_chapter(&mut self, number: u32) -> bool {
        let chapter = self.current_book.as_ref().and_then(|b| b.chapter(number));
        match chapter {
            Some(chapter) => {
                self.current_chapter = Some(chapter);
                true
            }
            None => false,
        }
    }

    /// Move to a book and chapter at once
    ///
    /// The position is left unchanged if either does not exist.
    pub fn goto(&mut self, book: &str, chapter: u32) -> bool {
        let Some(book) = self.get_book(book) else {
            return false;
        };
        let Some(chapter) = book.chapter(chapter) else {
            return false;
        };
        self.current_book = Some(book);
        self.current_chapter = Some(chapter);
        true
    }

    /// Advance to the next chapter
    ///
    /// After the last chapter of a book this moves to the next book, and
    /// after the last book it wraps around to the first one.
    pub fn next_chapter(&mut self) {
        let Some(book) = self.current_book.clone() else {
            if let Some(first) = self.books.first().cloned() {
                self.set_current_book(first);
            }
            return;
        };

        let chapters = book.chapters();
        let position = self
            .current_chapter
            .as_ref()
            .and_then(|current| chapters.iter().position(|c| Arc::ptr_eq(c, current)));
        let next = position.map_or(0, |i| i + 1);

        if let Some(chapter) = chapters.get(next) {
            self.current_chapter = Some(Arc::clone(chapter));
            return;
        }

        let index = self.books.iter().position(|b| Arc::ptr_eq(b, &book));
        let next_book = index
            .and_then(|i| self.books.get(i + 1))
            .or_else(|| self.books.first())
            .cloned();
        if let Some(next_book) = next_book {
            self.set_current_book(next_book);
        }
    }
}

/// Decode the books of a translation file, skipping malformed entries
fn decode_books(path: &std::path::Path) -> Result<Vec<Arc<Book>>, String> {
    let raw: Vec<Value> = storage::read_msgpack(path)?;
    let books = raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, source)| match Book::from_source(source) {
            Ok(book) => Some(Arc::new(book)),
            Err(e) => {
                log::warn!("Skipping book {} in {:?}: {}", index + 1, path, e);
                None
            }
        })
        .collect();
    Ok(books)
}
