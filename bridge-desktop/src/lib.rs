//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `FileSystemAccess` using `tokio::fs` and `dirs` app directories
//! - `SettingsStore` using a SQLite-backed key-value table
//! - `Downloader` streaming with `reqwest` into unique temp files
//!
//! The catalog and media player have no desktop default; hosts always
//! inject those.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestDownloader, SqliteSettingsStore, TokioFileSystem};
//!
//! let fs = TokioFileSystem::new();
//! let downloader = ReqwestDownloader::new();
//! let settings = SqliteSettingsStore::new(data_dir.join("settings.db")).await?;
//! ```

mod download;
mod filesystem;
mod settings;

pub use download::{ReqwestDownloader, RetryPolicy};
pub use filesystem::TokioFileSystem;
pub use settings::SqliteSettingsStore;
