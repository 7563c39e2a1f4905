//! Renderer capability levels

use serde::{Deserialize, Serialize};
use std::fmt;

/// How well a renderer supports a given format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatSupport {
    /// The renderer can play the format
    Handled,
    /// The renderer supports the type but the format exceeds its limits
    /// (e.g. resolution or bitrate)
    ExceedsCapabilities,
    /// The format needs a DRM scheme the renderer cannot use
    UnsupportedDrm,
    /// The renderer handles the top-level type but not this subtype
    UnsupportedSubtype,
    /// The renderer does not handle this type of format at all
    UnsupportedType,
}

impl FormatSupport {
    pub fn is_handled(&self) -> bool {
        matches!(self, FormatSupport::Handled)
    }
}

impl fmt::Display for FormatSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatSupport::Handled => write!(f, "handled"),
            FormatSupport::ExceedsCapabilities => write!(f, "exceeds_capabilities"),
            FormatSupport::UnsupportedDrm => write!(f, "unsupported_drm"),
            FormatSupport::UnsupportedSubtype => write!(f, "unsupported_subtype"),
            FormatSupport::UnsupportedType => write!(f, "unsupported_type"),
        }
    }
}

/// Whether a renderer can switch between formats without interruption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptiveSupport {
    Seamless,
    NotSeamless,
    NotSupported,
}

/// Whether a renderer can play a format in tunneling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TunnelingSupport {
    Supported,
    NotSupported,
}

/// Capabilities a renderer reports for one format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RendererCapabilities {
    pub format_support: FormatSupport,
    pub adaptive_support: AdaptiveSupport,
    pub tunneling_support: TunnelingSupport,
}

impl RendererCapabilities {
    /// Capabilities with the given format support, non-seamless adaptation and
    /// no tunneling
    pub fn new(format_support: FormatSupport) -> Self {
        Self {
            format_support,
            adaptive_support: AdaptiveSupport::NotSeamless,
            tunneling_support: TunnelingSupport::NotSupported,
        }
    }
}

/// Configuration a renderer is enabled with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RendererConfiguration {
    /// Render in tunneling mode
    pub tunneling: bool,
}

impl RendererConfiguration {
    pub const DEFAULT: RendererConfiguration = RendererConfiguration { tunneling: false };
}
