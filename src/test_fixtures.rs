//! Test fixtures shared by the unit tests
//!
//! A small three-book translation, a host runtime driven by a virtual clock
//! and a fetcher that serves canned bodies instead of hitting the network.

#![cfg(test)]

use futures::future::BoxFuture;
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

use crate::runtime::{HostRuntime, TimedCallback};
use crate::storage;
use crate::versions::{Fetch, FetchSink, Version};

/// Genesis (2 chapters), Exodus (2 chapters), Jude (1 chapter)
pub fn sample_bible_json() -> Value {
    json!([
        {
            "abbrev": "gn",
            "book": "Genesis",
            "chapters": [
                {"1": {
                    "1": "In the beginning God created the heaven and the earth.",
                    "2": "And the earth was without form, and void."
                }},
                {"2": {
                    "1": "Thus the heavens and the earth were finished.",
                    "2": "And on the seventh day God ended his work."
                }}
            ]
        },
        {
            "abbrev": "ex",
            "book": "Exodus",
            "chapters": [
                {"1": {"1": "Now these are the names of the children of Israel."}},
                {"2": {"1": "And there went a man of the house of Levi."}}
            ]
        },
        {
            "abbrev": "jud",
            "book": "Jude",
            "chapters": [
                {"1": {
                    "1": "Jude, the servant of Jesus Christ, and brother of James.",
                    "2": "Mercy unto you, and peace, and love, be multiplied."
                }}
            ]
        }
    ])
}

/// Store the sample translation as `<dir>/<key>.msgp` and return its version
pub fn write_sample_version(dir: &Path, key: &str) -> Version {
    let path = crate::config::version_path_in(dir, key);
    storage::write_msgpack(&path, &sample_bible_json()).expect("Failed to write sample version");
    let version = Version::new(format!("Sample {}", key), "English", key, dir);
    assert!(version.is_downloaded());
    version
}

struct Timer {
    due: Duration,
    seq: usize,
    callback: TimedCallback,
}

/// Host runtime with a clock that only moves when told to
#[derive(Default)]
pub struct ManualRuntime {
    now: Mutex<Duration>,
    timers: Mutex<Vec<Timer>>,
    next_seq: AtomicUsize,
    update_requests: AtomicUsize,
    keep_screen_on: AtomicBool,
}

impl ManualRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward, running every callback that falls due
    ///
    /// Callbacks run in due order (ties in scheduling order). A callback
    /// may schedule further timers; those run too if they fall due in time.
    pub fn advance(&self, by: Duration) {
        let target = *self.now.lock().unwrap() + by;

        loop {
            let next = {
                let mut timers = self.timers.lock().unwrap();
                let index = timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.seq))
                    .map(|(i, _)| i);
                index.map(|i| timers.remove(i))
            };

            let Some(timer) = next else { break };
            *self.now.lock().unwrap() = timer.due;
            (timer.callback)();
        }

        *self.now.lock().unwrap() = target;
    }

    pub fn update_requests(&self) -> usize {
        self.update_requests.load(Ordering::SeqCst)
    }

    pub fn keep_screen_on(&self) -> bool {
        self.keep_screen_on.load(Ordering::SeqCst)
    }
}

impl HostRuntime for ManualRuntime {
    fn force_update(&self) {
        self.update_requests.fetch_add(1, Ordering::SeqCst);
    }

    fn timed_call(&self, delay: Duration, callback: TimedCallback) {
        let due = *self.now.lock().unwrap() + delay;
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.timers.lock().unwrap().push(Timer { due, seq, callback });
    }

    fn set_keep_screen_on(&self, keep_on: bool) {
        self.keep_screen_on.store(keep_on, Ordering::SeqCst);
    }
}

/// Fetcher serving a fixed body, or failing with a fixed error
pub struct CannedFetcher {
    body: Result<Vec<u8>, String>,
    requested: Mutex<Vec<String>>,
}

impl CannedFetcher {
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body: Ok(body),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            body: Err(error.to_string()),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl Fetch for CannedFetcher {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
        sink: &'a mut dyn FetchSink,
    ) -> BoxFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.requested.lock().unwrap().push(url.to_string());
            let body = self.body.clone()?;

            // Deliver in a few pieces, like a real response
            let chunk_size = body.len().div_ceil(3).max(1);
            let total = body.len().max(1);
            let mut sent = 0;
            for chunk in body.chunks(chunk_size) {
                sink.on_chunk(chunk);
                sent += chunk.len();
                sink.on_progress(u8::try_from(sent * 100 / total).unwrap_or(100));
            }
            sink.on_progress(100);
            Ok(())
        })
    }
}

/// Fetcher that holds the response until [`GatedFetcher::release`] is called
pub struct GatedFetcher {
    body: Vec<u8>,
    started: Notify,
    released: Notify,
}

impl GatedFetcher {
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            started: Notify::new(),
            released: Notify::new(),
        }
    }

    /// Wait until a fetch is in flight
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    /// Let the in-flight fetch deliver its body
    pub fn release(&self) {
        self.released.notify_one();
    }
}

impl Fetch for GatedFetcher {
    fn fetch<'a>(
        &'a self,
        _url: &'a str,
        sink: &'a mut dyn FetchSink,
    ) -> BoxFuture<'a, Result<(), String>> {
        Box::pin(async move {
            sink.on_progress(0);
            self.started.notify_one();
            self.released.notified().await;

            sink.on_chunk(&self.body);
            sink.on_progress(100);
            Ok(())
        })
    }
}
