//! Streaming HTTP fetch
//!
//! A translation download is a single GET whose body is handed over chunk by
//! chunk, alongside a percentage computed from the response length.

use futures::StreamExt;
use futures::future::BoxFuture;
use reqwest::header::{HeaderValue, USER_AGENT};

/// Receives a streamed response body
pub trait FetchSink: Send {
    /// A chunk of the body arrived
    fn on_chunk(&mut self, chunk: &[u8]);

    /// Download progress in percent (0-100)
    fn on_progress(&mut self, percent: u8);
}

/// Issues streaming GET requests
pub trait Fetch: Send + Sync {
    /// Fetch `url`, feeding the body into `sink`
    ///
    /// Resolves once the whole body has been delivered.
    fn fetch<'a>(
        &'a self,
        url: &'a str,
        sink: &'a mut dyn FetchSink,
    ) -> BoxFuture<'a, Result<(), String>>;
}

/// [`Fetch`] implementation on top of reqwest
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpClient {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            user_agent: user_agent.into(),
        }
    }

    async fn fetch_streaming(&self, url: &str, sink: &mut dyn FetchSink) -> Result<(), String> {
        log::info!("Fetching {}", url);

        let user_agent = HeaderValue::from_str(&self.user_agent)
            .map_err(|e| format!("Invalid user agent: {}", e))?;

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Download failed with status {}", status));
        }

        let total = response.content_length().unwrap_or(0);
        let mut received: u64 = 0;
        let mut last_percent = None;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| format!("Download interrupted: {}", e))?;
            received += chunk.len() as u64;
            sink.on_chunk(&chunk);

            if let Some(percent) = progress_percent(received, total) {
                if last_percent != Some(percent) {
                    last_percent = Some(percent);
                    sink.on_progress(percent);
                }
            }
        }

        if last_percent != Some(100) {
            sink.on_progress(100);
        }

        log::info!("Fetched {} bytes from {}", received, url);
        Ok(())
    }
}

impl Fetch for HttpClient {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
        sink: &'a mut dyn FetchSink,
    ) -> BoxFuture<'a, Result<(), String>> {
        Box::pin(self.fetch_streaming(url, sink))
    }
}

/// Percentage of `received` out of `total`, if the total is known
fn progress_percent(received: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let percent = received.saturating_mul(100) / total;
    Some(percent.min(100) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(0, 1000), Some(0));
        assert_eq!(progress_percent(500, 1000), Some(50));
        assert_eq!(progress_percent(1000, 1000), Some(100));
        // Servers occasionally send more than announced
        assert_eq!(progress_percent(1500, 1000), Some(100));
    }

    #[test]
    fn test_progress_percent_unknown_total() {
        assert_eq!(progress_percent(100, 0), None);
    }

    #[test]
    fn test_http_client_keeps_user_agent() {
        let client = HttpClient::new("bible-reader/test");
        assert_eq!(client.user_agent, "bible-reader/test");
    }
}
