//! Scripture content: books, chapters and verses
//!
//! These are passive containers hydrated from the raw nested mappings stored
//! in a translation file. Derived data (chapters of a book, verses of a
//! chapter) is computed on first access and cached.

mod book;
mod chapter;
mod unescape;
mod verse;

pub use book::Book;
pub use chapter::{Chapter, RawVerses};
pub use unescape::unescape;
pub use verse::Verse;
