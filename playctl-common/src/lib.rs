//! # Playback Control Common Library
//!
//! Shared code for the playback control plane:
//! - Error type used by configuration and other shared helpers
//! - Microsecond time constants and conversions
//! - TOML configuration loading
//! - Logging initialisation

pub mod config;
pub mod error;
pub mod logging;
pub mod time;

pub use config::PlayctlConfig;
pub use error::{Error, Result};
