//! The persisted subset of the application state
//!
//! Saved to `<assets>/state.msgp` as a MessagePack map. A key is only present
//! once the matching setting has been changed (or was loaded), so files
//! written by older builds and partial files load without complaint.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::storage;

use super::bookmark::BookmarkState;
use super::state::BookOrder;

/// Everything written to the state file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Key of the translation being read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bible: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_order: Option<BookOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wake_lock: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmarks: Option<Vec<BookmarkState>>,
}

/// Owner of the persisted state and its file
///
/// Shared with the save scheduler, whose timed callbacks write it out.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    state: Mutex<PersistedState>,
    writes: AtomicUsize,
}

impl StateStore {
    /// Load the state file, or start empty if it is missing or unreadable
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match Self::try_load(&path) {
            Ok(state) => {
                log::info!("Loaded state: {:?}", state);
                state
            }
            Err(e) => {
                log::warn!("Failed to load state: {}", e);
                PersistedState::default()
            }
        };
        Self::with_state(path, state)
    }

    pub fn with_state(path: impl Into<PathBuf>, state: PersistedState) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(state),
            writes: AtomicUsize::new(0),
        }
    }

    fn try_load(path: &Path) -> Result<PersistedState, String> {
        if !path.exists() {
            return Err(format!("{:?} does not exist", path));
        }
        storage::read_msgpack(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> PersistedState {
        self.lock().clone()
    }

    /// Change the in-memory state (nothing is written)
    pub fn update<R>(&self, change: impl FnOnce(&mut PersistedState) -> R) -> R {
        change(&mut self.lock())
    }

    /// Write the state file; failures are logged, not returned
    pub fn save(&self) -> bool {
        let snapshot = self.snapshot();
        match storage::write_msgpack(&self.path, &snapshot) {
            Ok(()) => {
                self.writes.fetch_add(1, Ordering::SeqCst);
                log::debug!("Saved state to {:?}", self.path);
                true
            }
            Err(e) => {
                log::warn!("Failed to save state: {}", e);
                false
            }
        }
    }

    /// Number of successful writes since creation
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PersistedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
