//! Media period abstraction

use crate::error::LoadError;
use crate::source::sample_stream::SharedSampleStream;
use crate::source::track::TrackGroupArray;
use crate::track_selection::TrackSelection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Identity of a media period within a source's timeline
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaPeriodId {
    /// Unique identifier of the period in the timeline
    pub period_uid: Uuid,
    /// Sequence number of the window the period belongs to, if known
    pub window_sequence_number: Option<u64>,
}

impl MediaPeriodId {
    pub fn new(period_uid: Uuid) -> Self {
        Self {
            period_uid,
            window_sequence_number: None,
        }
    }

    pub fn with_window_sequence_number(period_uid: Uuid, window_sequence_number: u64) -> Self {
        Self {
            period_uid,
            window_sequence_number: Some(window_sequence_number),
        }
    }

    /// Copy of this id pointing at a different period uid
    pub fn copy_with_period_uid(&self, period_uid: Uuid) -> Self {
        Self {
            period_uid,
            ..self.clone()
        }
    }
}

impl fmt::Display for MediaPeriodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.window_sequence_number {
            Some(seq) => write!(f, "{}#{}", self.period_uid, seq),
            None => write!(f, "{}", self.period_uid),
        }
    }
}

/// Receives preparation progress from a media period
///
/// Callbacks carry the id of the period they concern rather than the period
/// itself, so a receiver never needs to borrow the period that is calling it.
pub trait PeriodCallback {
    /// The period finished preparing; its track groups are available
    fn on_prepared(&self, id: &MediaPeriodId);

    /// The period wants `continue_loading` to be called
    fn on_continue_loading_requested(&self, id: &MediaPeriodId);
}

pub type SharedPeriodCallback = Rc<dyn PeriodCallback>;

/// How far a seek may move from the requested position to land on a sync point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekParameters {
    pub tolerance_before_us: i64,
    pub tolerance_after_us: i64,
}

impl SeekParameters {
    /// Seek exactly to the requested position
    pub const EXACT: SeekParameters = SeekParameters {
        tolerance_before_us: 0,
        tolerance_after_us: 0,
    };

    /// Seek to whichever sync point is closest
    pub const CLOSEST_SYNC: SeekParameters = SeekParameters {
        tolerance_before_us: i64::MAX,
        tolerance_after_us: i64::MAX,
    };

    /// Seek to the sync point at or before the requested position
    pub const PREVIOUS_SYNC: SeekParameters = SeekParameters {
        tolerance_before_us: i64::MAX,
        tolerance_after_us: 0,
    };

    /// Seek to the sync point at or after the requested position
    pub const NEXT_SYNC: SeekParameters = SeekParameters {
        tolerance_before_us: 0,
        tolerance_after_us: i64::MAX,
    };

    /// Pick the seek position given the sync points around `position_us`
    ///
    /// Returns `position_us` itself when neither sync point is within tolerance.
    pub fn resolve_seek_position_us(
        &self,
        position_us: i64,
        first_sync_us: i64,
        second_sync_us: i64,
    ) -> i64 {
        if *self == Self::EXACT {
            return position_us;
        }
        let min_us = position_us.saturating_sub(self.tolerance_before_us);
        let max_us = position_us.saturating_add(self.tolerance_after_us);
        let first_ok = min_us <= first_sync_us && first_sync_us <= max_us;
        let second_ok = min_us <= second_sync_us && second_sync_us <= max_us;
        match (first_ok, second_ok) {
            (true, true) => {
                if (first_sync_us - position_us).abs() <= (second_sync_us - position_us).abs() {
                    first_sync_us
                } else {
                    second_sync_us
                }
            }
            (true, false) => first_sync_us,
            (false, true) => second_sync_us,
            (false, false) => position_us,
        }
    }
}

impl Default for SeekParameters {
    fn default() -> Self {
        Self::EXACT
    }
}

/// A bounded, seekable segment of a playback timeline backed by one source
pub trait MediaPeriod {
    /// Start preparing; `callback.on_prepared` fires once track groups are known
    fn prepare(&mut self, callback: SharedPeriodCallback, position_us: i64);

    /// Return a pending preparation error without consuming it
    fn maybe_throw_prepare_error(&self) -> Result<(), LoadError>;

    /// Track groups; only meaningful once prepared
    fn track_groups(&self) -> TrackGroupArray;

    /// Apply a track selection
    ///
    /// `streams[i]` is kept when `may_retain_stream_flags[i]` allows it,
    /// replaced with a new stream (setting `stream_reset_flags[i]`) or cleared.
    /// Returns the actual position from which samples will be provided.
    fn select_tracks(
        &mut self,
        selections: &[Option<Box<dyn TrackSelection>>],
        may_retain_stream_flags: &[bool],
        streams: &mut [Option<SharedSampleStream>],
        stream_reset_flags: &mut [bool],
        position_us: i64,
    ) -> i64;

    /// Discard buffered media up to `position_us`
    fn discard_buffer(&mut self, position_us: i64, to_keyframe: bool);

    /// Position of a pending discontinuity, or `TIME_UNSET`
    fn read_discontinuity(&mut self) -> i64;

    /// Buffered position, or `TIME_END_OF_SOURCE` when fully buffered
    fn buffered_position_us(&self) -> i64;

    /// Seek and return the actual position
    fn seek_to_us(&mut self, position_us: i64) -> i64;

    /// Position a seek to `position_us` would actually land on
    fn adjusted_seek_position_us(&self, position_us: i64, seek_parameters: SeekParameters) -> i64;

    /// Position of the next load, or `TIME_END_OF_SOURCE`
    fn next_load_position_us(&self) -> i64;

    /// Let the period discard media it no longer wants to keep buffered
    fn reevaluate_buffer(&mut self, position_us: i64);

    /// Ask the period to continue loading; returns whether it made progress
    fn continue_loading(&mut self, position_us: i64) -> bool;

    /// Whether a load is in progress
    fn is_loading(&self) -> bool;
}
