//! # Playback Control Library (playctl)
//!
//! Control plane of a streaming media playback pipeline.
//!
//! **Purpose:** Govern how per-track renderers are enabled, fed timed samples
//! and torn down; hand out media periods before their source has finished
//! preparing; and classify segment load failures into retry or exclusion
//! decisions.
//!
//! **Architecture:** Single-threaded control objects (`Rc`/`RefCell`, no locks).
//! Loading happens elsewhere and becomes visible through polls
//! (`maybe_throw_*`) and callbacks.
//!
//! - [`renderer`]: renderer lifecycle state machine and timestamp bookkeeping
//! - [`source`]: sample streams, media periods/sources, the deferred period
//! - [`load_error`]: retry/exclusion policy for failed loads
//! - [`track_selection`]: selection objects handed to periods
//! - [`metadata`]: one-shot track metadata retrieval

pub mod error;
pub mod format;
pub mod load_error;
pub mod metadata;
pub mod renderer;
pub mod source;
pub mod track_selection;

pub use error::{Error, LoadError, RendererError, Result};
pub use format::{DecoderInputBuffer, Format, FormatHolder, TrackType};
pub use load_error::{DefaultLoadErrorHandlingPolicy, LoadErrorAction, LoadErrorHandlingPolicy};
pub use renderer::{BaseRenderer, RendererHooks, RendererState};
pub use source::{DeferredPeriod, MediaPeriod, MediaPeriodId, MediaSource, SampleStream};
