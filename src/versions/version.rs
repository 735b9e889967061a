//! Bible translations and their download lifecycle
//!
//! A [`Version`] describes one translation. Downloading fetches the upstream
//! JSON, converts it to MessagePack under the downloads directory and marks
//! the version as downloaded. Clones of a Version share their download state,
//! so progress made by a download task is visible from the catalog entry.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::version_path_in;
use crate::runtime::HostRuntime;
use crate::storage;

use super::fetch::{Fetch, FetchSink};

/// Upstream location of the translation files
pub const SOURCE_URL_BASE: &str = "https://github.com/thiagobodruk/bible/raw/master/json";

/// Bytes preceding the JSON document in upstream files
const RESPONSE_PREFIX_LEN: usize = 3;

/// Download state shared between clones of a [`Version`]
#[derive(Debug, Default)]
struct DownloadState {
    downloaded: AtomicBool,
    downloading: AtomicBool,
    progress: AtomicU8,
    status: Mutex<String>,
}

impl DownloadState {
    fn set_status(&self, status: impl Into<String>) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status.into();
    }

    fn status(&self) -> String {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Clears the downloading flag however the download ends
struct DownloadingGuard<'a>(&'a DownloadState);

impl Drop for DownloadingGuard<'_> {
    fn drop(&mut self) {
        self.0.downloading.store(false, Ordering::SeqCst);
    }
}

/// Collects the streamed response body in memory
struct DownloadBuffer<'a> {
    data: Vec<u8>,
    state: &'a DownloadState,
}

impl FetchSink for DownloadBuffer<'_> {
    fn on_chunk(&mut self, chunk: &[u8]) {
        self.data.extend_from_slice(chunk);
    }

    fn on_progress(&mut self, percent: u8) {
        self.state.progress.store(percent.min(100), Ordering::SeqCst);
    }
}

/// One translation of the bible
#[derive(Debug, Clone)]
pub struct Version {
    name: String,
    key: String,
    language: String,
    url: String,
    path: PathBuf,
    state: Arc<DownloadState>,
}

impl Version {
    /// Describe a translation whose converted file lives in `downloads_dir`
    ///
    /// Whether it is downloaded is decided here, from the file's existence.
    pub fn new(
        name: impl Into<String>,
        language: impl Into<String>,
        key: impl Into<String>,
        downloads_dir: &Path,
    ) -> Self {
        let key = key.into();
        let url = format!("{}/{}.json", SOURCE_URL_BASE, key);
        let path = version_path_in(downloads_dir, &key);

        let state = DownloadState::default();
        state.downloaded.store(path.exists(), Ordering::SeqCst);

        Self {
            name: name.into(),
            key,
            language: language.into(),
            url,
            path,
            state: Arc::new(state),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Where the converted translation is stored
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_downloaded(&self) -> bool {
        self.state.downloaded.load(Ordering::SeqCst)
    }

    pub fn is_downloading(&self) -> bool {
        self.state.downloading.load(Ordering::SeqCst)
    }

    /// Download progress in percent
    pub fn progress(&self) -> u8 {
        self.state.progress.load(Ordering::SeqCst)
    }

    /// Human readable status of the last download
    pub fn status(&self) -> String {
        self.state.status()
    }

    /// Download and convert this translation
    ///
    /// The outcome is also reported through [`Version::status`]. Failed
    /// downloads are not retried; call this again to retry.
    pub async fn download(
        &self,
        fetcher: &dyn Fetch,
        runtime: &dyn HostRuntime,
    ) -> Result<(), String> {
        let state = self.state.as_ref();

        if state
            .downloading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::warn!("{} is already downloading", self.key);
            return Err(format!("{} is already downloading", self.name));
        }
        let _downloading = DownloadingGuard(state);

        state.progress.store(0, Ordering::SeqCst);
        state.set_status(format!("Downloading {}...", self.name));
        log::info!("Downloading {} from {}", self.key, self.url);

        let mut buffer = DownloadBuffer {
            data: Vec::new(),
            state,
        };

        let result = match fetcher.fetch(&self.url, &mut buffer).await {
            Ok(()) => {
                state.set_status("Converting...");
                runtime.force_update();
                self.convert(&buffer.data)
            }
            Err(e) => Err(e),
        };

        match &result {
            Ok(()) => {
                state.downloaded.store(true, Ordering::SeqCst);
                state.set_status("Done!");
                log::info!("Saved {} to {:?}", self.key, self.path);
            }
            Err(e) => {
                state.set_status(e.clone());
                log::warn!("Download of {} failed: {}", self.key, e);
            }
        }

        result
    }

    /// Convert a downloaded JSON body to the compact format at `path`
    fn convert(&self, body: &[u8]) -> Result<(), String> {
        let json = body.get(RESPONSE_PREFIX_LEN..).unwrap_or_default();
        let data: Value =
            serde_json::from_slice(json).map_err(|e| format!("Invalid translation data: {}", e))?;
        storage::write_msgpack(&self.path, &data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{CannedFetcher, GatedFetcher, ManualRuntime, sample_bible_json};
    use tempfile::TempDir;

    fn prefixed(json: &str) -> Vec<u8> {
        let mut body = vec![0xEF, 0xBB, 0xBF];
        body.extend_from_slice(json.as_bytes());
        body
    }

    #[test]
    fn test_url_and_path_derived_from_key() {
        let version = Version::new(
            "King James Version (KJV)",
            "English",
            "en_kjv",
            Path::new("/assets/downloads"),
        );
        assert_eq!(
            version.url(),
            "https://github.com/thiagobodruk/bible/raw/master/json/en_kjv.json"
        );
        assert_eq!(version.path(), Path::new("/assets/downloads/en_kjv.msgp"));
        assert_eq!(version.language(), "English");
    }

    #[test]
    fn test_downloaded_checked_at_construction() {
        let temp_dir = TempDir::new().unwrap();
        let before = Version::new("Test", "English", "en_test", temp_dir.path());
        assert!(!before.is_downloaded());

        std::fs::write(temp_dir.path().join("en_test.msgp"), b"x").unwrap();
        // Not re-checked for an existing instance
        assert!(!before.is_downloaded());

        let after = Version::new("Test", "English", "en_test", temp_dir.path());
        assert!(after.is_downloaded());
    }

    #[tokio::test]
    async fn test_download_converts_to_msgpack() {
        let temp_dir = TempDir::new().unwrap();
        let downloads = temp_dir.path().join("downloads");
        let version = Version::new("Test", "English", "en_test", &downloads);
        let fetcher = CannedFetcher::new(prefixed(&sample_bible_json().to_string()));
        let runtime = ManualRuntime::new();

        version.download(&fetcher, &runtime).await.unwrap();

        assert!(version.is_downloaded());
        assert!(!version.is_downloading());
        assert_eq!(version.status(), "Done!");
        assert_eq!(version.progress(), 100);
        assert_eq!(runtime.update_requests(), 1);
        assert_eq!(fetcher.requested_urls(), vec![version.url().to_string()]);

        let stored: Value = storage::read_msgpack(version.path()).unwrap();
        assert_eq!(stored, sample_bible_json());
    }

    #[tokio::test]
    async fn test_download_progress_shared_with_clones() {
        let temp_dir = TempDir::new().unwrap();
        let version = Version::new("Test", "English", "en_test", temp_dir.path());
        let catalog_entry = version.clone();
        let fetcher = CannedFetcher::new(prefixed("[]"));

        version.download(&fetcher, &ManualRuntime::new()).await.unwrap();

        assert!(catalog_entry.is_downloaded());
        assert_eq!(catalog_entry.status(), "Done!");
    }

    #[tokio::test]
    async fn test_download_invalid_json_reports_status() {
        let temp_dir = TempDir::new().unwrap();
        let version = Version::new("Test", "English", "en_test", temp_dir.path());
        let fetcher = CannedFetcher::new(prefixed("{not json"));

        let err = version
            .download(&fetcher, &ManualRuntime::new())
            .await
            .unwrap_err();

        assert!(!version.is_downloaded());
        assert!(!version.is_downloading());
        assert_eq!(version.status(), err);
        assert!(err.contains("Invalid translation data"));
        assert!(!version.path().exists());
    }

    #[tokio::test]
    async fn test_download_without_prefix_fails() {
        // The first three bytes are always dropped, even if they are JSON
        let temp_dir = TempDir::new().unwrap();
        let version = Version::new("Test", "English", "en_test", temp_dir.path());
        let fetcher = CannedFetcher::new(b"{\"a\": 1}".to_vec());

        assert!(version.download(&fetcher, &ManualRuntime::new()).await.is_err());
        assert!(!version.is_downloaded());
    }

    #[tokio::test]
    async fn test_download_network_failure() {
        let temp_dir = TempDir::new().unwrap();
        let version = Version::new("Test", "English", "en_test", temp_dir.path());
        let fetcher = CannedFetcher::failing("Download failed with status 404 Not Found");
        let runtime = ManualRuntime::new();

        let err = version.download(&fetcher, &runtime).await.unwrap_err();

        assert_eq!(err, "Download failed with status 404 Not Found");
        assert_eq!(version.status(), err);
        assert!(!version.is_downloading());
        assert_eq!(runtime.update_requests(), 0);
    }

    #[tokio::test]
    async fn test_download_can_be_retried() {
        let temp_dir = TempDir::new().unwrap();
        let version = Version::new("Test", "English", "en_test", temp_dir.path());

        let failing = CannedFetcher::failing("offline");
        assert!(version.download(&failing, &ManualRuntime::new()).await.is_err());

        let working = CannedFetcher::new(prefixed("[]"));
        version.download(&working, &ManualRuntime::new()).await.unwrap();
        assert!(version.is_downloaded());
    }

    #[tokio::test]
    async fn test_second_download_rejected_while_in_flight() {
        let temp_dir = TempDir::new().unwrap();
        let version = Version::new("Test", "English", "en_test", temp_dir.path());
        let fetcher = Arc::new(GatedFetcher::new(prefixed("[]")));

        let first = {
            let version = version.clone();
            let fetcher = Arc::clone(&fetcher);
            tokio::spawn(async move {
                let runtime = ManualRuntime::new();
                version.download(fetcher.as_ref(), &runtime).await
            })
        };

        fetcher.wait_started().await;
        assert!(version.is_downloading());
        let status = version.status();
        assert_eq!(status, "Downloading Test...");

        let second = version.download(fetcher.as_ref(), &ManualRuntime::new()).await;
        assert_eq!(second, Err("Test is already downloading".to_string()));
        assert_eq!(version.status(), status);
        assert!(version.is_downloading());

        fetcher.release();
        first.await.unwrap().unwrap();

        assert!(!version.is_downloading());
        assert!(version.is_downloaded());
        assert_eq!(version.status(), "Done!");
    }
}
