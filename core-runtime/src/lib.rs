//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the recital player core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the playback crate depends on.
//! It establishes the logging conventions, the bridge wiring checked at
//! startup, and the event broadcasting used to notify hosts.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
