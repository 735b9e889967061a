//! Chapters and their lazily derived verses

use serde_json::{Map, Value};
use std::sync::OnceLock;

use super::unescape::unescape;
use super::verse::Verse;

/// Raw verse mapping as found in a translation file: verse number → text
pub type RawVerses = Map<String, Value>;

/// A numbered chapter
///
/// Verses are derived from the raw mapping on first access and cached.
#[derive(Debug)]
pub struct Chapter {
    number: u32,
    source: RawVerses,
    verses: OnceLock<Vec<Verse>>,
}

impl Chapter {
    pub fn new(number: u32, source: RawVerses) -> Self {
        Self {
            number,
            source,
            verses: OnceLock::new(),
        }
    }

    /// Build a chapter from a plain list of verse texts, numbering from 1
    pub fn from_verse_list(number: u32, texts: &[Value]) -> Self {
        let source = texts
            .iter()
            .enumerate()
            .map(|(i, text)| ((i + 1).to_string(), text.clone()))
            .collect();
        Self::new(number, source)
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn source(&self) -> &RawVerses {
        &self.source
    }

    /// Verses sorted ascending by number
    pub fn verses(&self) -> &[Verse] {
        self.verses.get_or_init(|| derive_verses(self.number, &self.source))
    }

    /// Look up a verse by its number
    pub fn verse(&self, number: u32) -> Option<&Verse> {
        let verses = self.verses();
        verses
            .binary_search_by_key(&number, Verse::number)
            .ok()
            .map(|i| &verses[i])
    }
}

fn derive_verses(chapter: u32, source: &RawVerses) -> Vec<Verse> {
    let mut verses: Vec<Verse> = source
        .iter()
        .filter_map(|(key, value)| {
            let Ok(number) = key.trim().parse::<u32>() else {
                log::warn!("Chapter {}: skipping non-numeric verse key {:?}", chapter, key);
                return None;
            };
            let Some(text) = value.as_str() else {
                log::warn!("Chapter {}: verse {} has no text", chapter, number);
                return None;
            };
            Some(Verse::new(number, unescape(text)))
        })
        .collect();

    verses.sort_by_key(Verse::number);
    verses
}
