//! Durable download primitive.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::Result;

/// Fetches a URL into a temporary local file.
///
/// Each call must produce its own temporary file so that two concurrent
/// downloads of the same URL never write to the same path. The caller takes
/// ownership of the returned file and is expected to move or delete it.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, url: &str) -> Result<PathBuf>;
}
