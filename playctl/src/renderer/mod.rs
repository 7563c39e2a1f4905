//! Renderer lifecycle
//!
//! A renderer is one per-track decoding stage. [`BaseRenderer`] owns the
//! lifecycle state machine and timestamp bookkeeping shared by every
//! renderer; the track-specific behavior plugs in through [`RendererHooks`].
//!
//! ```text
//! Disabled --enable--> Enabled --start--> Started
//!    ^                  |   ^                |
//!    +-----disable------+   +------stop------+
//! ```

pub mod base;
pub mod capabilities;

pub use base::{BaseRenderer, RendererHooks, StreamAttachment};
pub use capabilities::{
    AdaptiveSupport, FormatSupport, RendererCapabilities, RendererConfiguration, TunnelingSupport,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererState {
    /// No stream attached; initial state
    Disabled,
    /// Stream attached, not rendering
    Enabled,
    /// Stream attached and rendering
    Started,
}

impl fmt::Display for RendererState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RendererState::Disabled => write!(f, "disabled"),
            RendererState::Enabled => write!(f, "enabled"),
            RendererState::Started => write!(f, "started"),
        }
    }
}
