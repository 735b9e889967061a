//! Bible Reader
//!
//! State layer of an offline bible reader: a catalog of translations that
//! can be downloaded and cached, the scripture model decoded from them, and
//! the application state (position, bookmarks, settings) persisted across
//! runs.

pub mod config;
pub mod core;
pub mod logging;
pub mod runtime;
pub mod scripture;
pub mod storage;
pub mod versions;

#[cfg(test)]
mod test_fixtures;
