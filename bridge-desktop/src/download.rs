//! Downloader Implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    download::Downloader,
    error::{BridgeError, Result},
};
use futures_util::StreamExt;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::time::sleep;
use tracing::{debug, warn};
use uuid::Uuid;

/// Retry behavior for connection-level failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    fn delay_for(&self, attempt: u32) -> Duration {
        let exponential = self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1));
        exponential.min(self.max_delay)
    }
}

/// Reqwest-based downloader
///
/// Streams the response body into a uniquely named `.part` file under a
/// staging directory. Each call gets its own file, so concurrent downloads of
/// the same URL never share a path.
pub struct ReqwestDownloader {
    client: Client,
    staging_dir: PathBuf,
    retry: RetryPolicy,
}

impl ReqwestDownloader {
    /// Create a downloader staging files under the system temp directory
    pub fn new() -> Self {
        Self::with_staging_dir(std::env::temp_dir().join("recital-downloads"))
    }

    /// Create a downloader staging files under `staging_dir`
    pub fn with_staging_dir(staging_dir: PathBuf) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(4)
            .user_agent(concat!("recital-player/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                Client::new()
            });

        Self {
            client,
            staging_dir,
            retry: RetryPolicy::default(),
        }
    }

    /// Use a custom HTTP client
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Override the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn temp_path(&self) -> PathBuf {
        self.staging_dir.join(format!("{}.part", Uuid::new_v4()))
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.client.get(url).send().await {
                Ok(response) => return Ok(response),
                Err(e) if (e.is_connect() || e.is_timeout()) && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        error = %e,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Download request failed, retrying"
                    );
                    sleep(delay).await;
                }
                Err(e) => return Err(BridgeError::Transport(e.to_string())),
            }
        }
    }

    async fn stream_to_file(&self, response: reqwest::Response, path: &PathBuf) -> Result<u64> {
        let mut file = fs::File::create(path).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| BridgeError::Transport(e.to_string()))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }
}

impl Default for ReqwestDownloader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Downloader for ReqwestDownloader {
    async fn download(&self, url: &str) -> Result<PathBuf> {
        let response = self.send(url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::Transport(format!("HTTP error: {}", status)));
        }

        fs::create_dir_all(&self.staging_dir).await?;
        let path = self.temp_path();

        match self.stream_to_file(response, &path).await {
            Ok(bytes) => {
                debug!(bytes, file = ?path.file_name(), "Download finished");
                Ok(path)
            }
            Err(e) => {
                // A partial file is useless to the caller
                let _ = fs::remove_file(&path).await;
                Err(e)
            }
        }
    }
}
