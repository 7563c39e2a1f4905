//! Sample streams, media periods and media sources
//!
//! The collaborator traits ([`SampleStream`], [`MediaPeriod`], [`MediaSource`])
//! are implemented by format-specific code outside this crate.
//! [`DeferredPeriod`] masks a period whose source is not ready yet.

pub mod allocator;
pub mod deferred;
pub mod media_source;
pub mod period;
pub mod sample_stream;
pub mod track;

pub use allocator::{Allocation, Allocator, DefaultAllocator, SharedAllocator};
pub use deferred::{DeferredPeriod, PrepareListener};
pub use media_source::{MediaSource, SharedMediaSource, SourceCaller, SourceInfo};
pub use period::{MediaPeriod, MediaPeriodId, PeriodCallback, SeekParameters, SharedPeriodCallback};
pub use sample_stream::{EmptySampleStream, ReadResult, SampleStream, SharedSampleStream};
pub use track::{TrackGroup, TrackGroupArray};
