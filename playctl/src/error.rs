//! Error types for playctl
//!
//! Three families:
//! - [`Error`]: what control operations return. Precondition violations
//!   (illegal transitions, missing stream, period misuse) are programming
//!   errors and are never recovered.
//! - [`LoadError`]: upstream I/O failures while loading media. These are fed
//!   to the load error handling policy and surface through `maybe_throw_*`
//!   polls, never through sample reads.
//! - [`RendererError`]: a failure inside a renderer, wrapped with the renderer
//!   index, the offending format and that format's support level.

use crate::format::Format;
use crate::renderer::{FormatSupport, RendererState};
use crate::source::MediaPeriodId;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Main error type for playctl
#[derive(Error, Debug)]
pub enum Error {
    /// Operation not allowed in the renderer's current state
    #[error("Invalid state: cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: RendererState,
    },

    /// The current stream was marked final and cannot be replaced
    #[error("Invalid state: current stream is final and cannot be replaced")]
    StreamFinal,

    /// Operation needs an attached sample stream
    #[error("Invalid state: no sample stream attached")]
    NoStream,

    /// `create_period` called a second time
    #[error("Period {0} was already created")]
    PeriodAlreadyCreated(MediaPeriodId),

    /// Operation needs a live period that does not exist (yet, or any more)
    #[error("Period {0} has no live period")]
    PeriodUnavailable(MediaPeriodId),

    /// Upstream load failure
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Renderer failure with context
    #[error(transparent)]
    Renderer(#[from] RendererError),

    /// Shared configuration / I/O failure
    #[error(transparent)]
    Common(#[from] playctl_common::Error),
}

/// Convenience Result type using playctl Error
pub type Result<T> = std::result::Result<T, Error>;

/// Upstream I/O failure while loading media
#[derive(Error, Debug, Clone)]
pub enum LoadError {
    /// HTTP response with a non-2xx status code
    #[error("Response code: {code} ({message}) for {uri}")]
    InvalidResponseCode {
        code: u16,
        message: String,
        uri: String,
    },

    /// HTTP failure without a response (connection, TLS, ...)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Malformed or unsupported media data
    #[error("Parser error: {0}")]
    Parser(String),

    /// Other I/O failure
    #[error("I/O error: {0}")]
    Io(Arc<std::io::Error>),
}

impl LoadError {
    /// HTTP status code, if this error carries one
    pub fn response_code(&self) -> Option<u16> {
        match self {
            LoadError::InvalidResponseCode { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether this is a parser (malformed data) error
    pub fn is_parser_error(&self) -> bool {
        matches!(self, LoadError::Parser(_))
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::Io(Arc::new(err))
    }
}

/// Boxed error used as the cause of a [`RendererError`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error raised by a renderer, with enough context for user-visible diagnostics
#[derive(Debug)]
pub struct RendererError {
    /// Underlying failure
    pub cause: BoxError,
    /// Name reported by the renderer
    pub renderer_name: String,
    /// Index of the renderer within the pipeline
    pub renderer_index: usize,
    /// Format in use when the failure happened
    pub format: Option<Format>,
    /// Support level the renderer reports for `format`
    pub format_support: FormatSupport,
}

impl fmt::Display for RendererError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} error, index={}, format=",
            self.renderer_name, self.renderer_index
        )?;
        match &self.format {
            Some(format) => write!(f, "{}", format)?,
            None => write!(f, "none")?,
        }
        write!(f, ", format_supported={}: {}", self.format_support, self.cause)
    }
}

impl std::error::Error for RendererError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.cause.as_ref())
    }
}
