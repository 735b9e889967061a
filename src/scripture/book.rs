//! Books and their chapters

use serde_json::{Map, Value};
use std::sync::{Arc, OnceLock};

use super::chapter::Chapter;

/// A book of a translation, hydrated from its raw mapping
///
/// Expected source shape:
/// `{"abbrev": "gn", "book": "Genesis", "chapters": [{"1": {"1": "..."}}, ...]}`.
/// Chapters may also be plain verse lists (`[["...", "..."], ...]`).
#[derive(Debug)]
pub struct Book {
    name: String,
    abbrev: String,
    source: Map<String, Value>,
    chapters: OnceLock<Vec<Arc<Chapter>>>,
}

impl Book {
    /// Wrap a raw book mapping
    ///
    /// Fails if the source is not a mapping or carries no book name.
    pub fn from_source(source: Value) -> Result<Self, String> {
        let source = match source {
            Value::Object(source) => source,
            other => return Err(format!("Expected a book mapping, got {}", kind_of(&other))),
        };

        let name = source
            .get("book")
            .or_else(|| source.get("name"))
            .and_then(Value::as_str)
            .ok_or_else(|| "Book is missing its name".to_string())?
            .to_string();

        let abbrev = source
            .get("abbrev")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            name,
            abbrev,
            source,
            chapters: OnceLock::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn abbrev(&self) -> &str {
        &self.abbrev
    }

    pub fn source(&self) -> &Map<String, Value> {
        &self.source
    }

    /// Chapters in file order
    pub fn chapters(&self) -> &[Arc<Chapter>] {
        self.chapters
            .get_or_init(|| derive_chapters(&self.name, &self.source))
    }

    /// First chapter, if the book has any
    pub fn first_chapter(&self) -> Option<Arc<Chapter>> {
        self.chapters().first().cloned()
    }

    /// Chapter by its 1-based position
    pub fn chapter(&self, number: u32) -> Option<Arc<Chapter>> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        self.chapters().get(index).cloned()
    }
}

fn derive_chapters(book: &str, source: &Map<String, Value>) -> Vec<Arc<Chapter>> {
    let Some(raw_chapters) = source.get("chapters").and_then(Value::as_array) else {
        log::warn!("Book {} has no chapter list", book);
        return Vec::new();
    };

    raw_chapters
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            let position = u32::try_from(index + 1).ok()?;
            let chapter = match raw {
                // {"<number>": {"<verse>": "<text>"}}
                Value::Object(entry) => {
                    let (number, verses) = entry.iter().next()?;
                    let number = number.trim().parse::<u32>().unwrap_or(position);
                    match verses {
                        Value::Object(verses) => Chapter::new(number, verses.clone()),
                        Value::Array(verses) => Chapter::from_verse_list(number, verses),
                        other => {
                            log::warn!(
                                "{} {}: unexpected verses {}",
                                book,
                                number,
                                kind_of(other)
                            );
                            return None;
                        }
                    }
                }
                Value::Array(verses) => Chapter::from_verse_list(position, verses),
                other => {
                    log::warn!("{}: skipping chapter entry {}", book, kind_of(other));
                    return None;
                }
            };
            Some(Arc::new(chapter))
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
