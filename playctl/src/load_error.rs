//! Load error handling policy
//!
//! Decides what happens after a media load fails: exclude the failing track
//! for a while, retry after a delay, or give up. Policies are pure functions
//! of the error and its context and can be shared across threads.

use crate::error::LoadError;
use crate::format::{Format, TrackType};
use playctl_common::config::LoadErrorConfig;
use playctl_common::time::{is_set, us_to_ms};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Default minimum number of retries before a load error is surfaced
pub const DEFAULT_MIN_LOADABLE_RETRY_COUNT: u32 = 3;

/// Minimum number of retries for progressive live streams
pub const DEFAULT_MIN_LOADABLE_RETRY_COUNT_PROGRESSIVE_LIVE: u32 = 6;

/// Kind of data a load was fetching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Unknown,
    Media,
    MediaInitialization,
    Drm,
    Manifest,
    TimeSynchronization,
    Ad,
    /// Media of a progressive live stream
    MediaProgressiveLive,
    /// Application-defined data type
    Custom(u32),
}

/// Byte range of a load
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataSpec {
    pub uri: String,
    /// Offset of the first byte
    pub position: u64,
    /// Number of bytes, or `None` for "until the end"
    pub length: Option<u64>,
}

impl DataSpec {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            position: 0,
            length: None,
        }
    }
}

static NEXT_LOAD_TASK_ID: AtomicU64 = AtomicU64::new(0);

/// Information about one load attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadEventInfo {
    /// Id of the load task, stable across retries
    pub load_task_id: u64,
    pub data_spec: DataSpec,
    /// URI after redirects
    pub uri: String,
    pub response_headers: HashMap<String, Vec<String>>,
    /// Monotonic clock time at which the event happened
    pub elapsed_realtime_ms: u64,
    pub load_duration_ms: u64,
    pub bytes_loaded: u64,
}

impl LoadEventInfo {
    /// Process-wide unique, increasing load task id
    pub fn new_id() -> u64 {
        NEXT_LOAD_TASK_ID.fetch_add(1, Ordering::Relaxed)
    }

    /// Event for `data_spec` with a fresh task id and no progress yet
    pub fn new(data_spec: DataSpec) -> Self {
        let uri = data_spec.uri.clone();
        Self {
            load_task_id: Self::new_id(),
            data_spec,
            uri,
            response_headers: HashMap::new(),
            elapsed_realtime_ms: 0,
            load_duration_ms: 0,
            bytes_loaded: 0,
        }
    }
}

/// What the load was for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLoadData {
    pub data_type: DataType,
    pub track_type: TrackType,
    pub track_format: Option<Format>,
    /// Start of the loaded media, if it is media with known timing
    pub media_start_time_ms: Option<i64>,
    pub media_end_time_ms: Option<i64>,
}

impl MediaLoadData {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            track_type: TrackType::Unknown,
            track_format: None,
            media_start_time_ms: None,
            media_end_time_ms: None,
        }
    }

    /// Set the media time range from microsecond positions; reserved values
    /// leave the bound unknown
    pub fn with_media_time_us(mut self, start_us: i64, end_us: i64) -> Self {
        self.media_start_time_ms = is_set(start_us).then(|| us_to_ms(start_us));
        self.media_end_time_ms = is_set(end_us).then(|| us_to_ms(end_us));
        self
    }
}

/// A failed load and its context
#[derive(Debug, Clone, Copy)]
pub struct LoadErrorInfo<'a> {
    pub load_event_info: &'a LoadEventInfo,
    pub media_load_data: &'a MediaLoadData,
    pub error: &'a LoadError,
    /// Number of errors for this load task so far, starting at 1
    pub error_count: u32,
}

impl<'a> LoadErrorInfo<'a> {
    pub fn new(
        load_event_info: &'a LoadEventInfo,
        media_load_data: &'a MediaLoadData,
        error: &'a LoadError,
        error_count: u32,
    ) -> Self {
        Self {
            load_event_info,
            media_load_data,
            error,
            error_count,
        }
    }
}

/// Decides how load errors are handled
pub trait LoadErrorHandlingPolicy: Send + Sync {
    /// How long to exclude the track that failed to load, or `None` to not
    /// exclude it
    fn exclusion_duration_for(&self, info: &LoadErrorInfo<'_>) -> Option<Duration>;

    /// Delay before retrying the load, or `None` if the error is fatal
    fn retry_delay_for(&self, info: &LoadErrorInfo<'_>) -> Option<Duration>;

    /// Number of retries to attempt before an error is surfaced to the player
    fn minimum_loadable_retry_count(&self, data_type: DataType) -> u32;
}

/// Default policy
///
/// - HTTP 404 and 410 exclude the track for the configured duration (60 s)
/// - parser errors are never retried
/// - everything else is retried after `min((count - 1) * step, max)`,
///   1 s steps up to 5 s by default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultLoadErrorHandlingPolicy {
    config: LoadErrorConfig,
}

impl DefaultLoadErrorHandlingPolicy {
    pub fn new(config: LoadErrorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoadErrorConfig {
        &self.config
    }
}

impl Default for DefaultLoadErrorHandlingPolicy {
    fn default() -> Self {
        Self::new(LoadErrorConfig::default())
    }
}

impl LoadErrorHandlingPolicy for DefaultLoadErrorHandlingPolicy {
    fn exclusion_duration_for(&self, info: &LoadErrorInfo<'_>) -> Option<Duration> {
        match info.error.response_code() {
            Some(404) | Some(410) => Some(self.config.exclusion_duration()),
            _ => None,
        }
    }

    fn retry_delay_for(&self, info: &LoadErrorInfo<'_>) -> Option<Duration> {
        if info.error.is_parser_error() {
            return None;
        }
        let attempts = u64::from(info.error_count.saturating_sub(1));
        let delay = Duration::from_millis(attempts.saturating_mul(self.config.retry_delay_step_ms));
        Some(delay.min(self.config.max_retry_delay()))
    }

    fn minimum_loadable_retry_count(&self, data_type: DataType) -> u32 {
        if let Some(count) = self.config.min_loadable_retry_count {
            return count;
        }
        match data_type {
            DataType::MediaProgressiveLive => DEFAULT_MIN_LOADABLE_RETRY_COUNT_PROGRESSIVE_LIVE,
            _ => DEFAULT_MIN_LOADABLE_RETRY_COUNT,
        }
    }
}

/// Combined outcome for one failed load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorAction {
    /// Retry the load after `delay`
    Retry { delay: Duration },
    /// Exclude the track for `duration` and load another one instead
    Exclude { duration: Duration },
    /// Give up; the error is fatal for this load
    DontRetryFatal,
}

impl LoadErrorAction {
    pub fn is_retry(&self) -> bool {
        matches!(self, LoadErrorAction::Retry { .. })
    }
}

/// Decide what to do with a failed load
///
/// Exclusion is preferred when the caller has an alternative track to switch
/// to (`can_exclude`); otherwise the retry decision applies.
pub fn resolve_action(
    policy: &dyn LoadErrorHandlingPolicy,
    info: &LoadErrorInfo<'_>,
    can_exclude: bool,
) -> LoadErrorAction {
    if can_exclude {
        if let Some(duration) = policy.exclusion_duration_for(info) {
            debug!(
                "Load task {} excluded for {:?} after: {}",
                info.load_event_info.load_task_id, duration, info.error
            );
            return LoadErrorAction::Exclude { duration };
        }
    }
    match policy.retry_delay_for(info) {
        Some(delay) => {
            debug!(
                "Load task {} retry #{} in {:?} after: {}",
                info.load_event_info.load_task_id, info.error_count, delay, info.error
            );
            LoadErrorAction::Retry { delay }
        }
        None => {
            debug!(
                "Load task {} failed fatally: {}",
                info.load_event_info.load_task_id, info.error
            );
            LoadErrorAction::DontRetryFatal
        }
    }
}

/// Whether `error_count` errors exceed the retries the policy grants
/// `data_type`; past that point a retried error is also reported
pub fn exceeds_minimum_retry_count(
    policy: &dyn LoadErrorHandlingPolicy,
    data_type: DataType,
    error_count: u32,
) -> bool {
    error_count > policy.minimum_loadable_retry_count(data_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use playctl_common::time::TIME_UNSET;

    #[test]
    fn test_new_ids_increase() {
        let first = LoadEventInfo::new_id();
        let second = LoadEventInfo::new_id();
        assert!(second > first);
    }

    #[test]
    fn test_load_event_info_copies_uri() {
        let info = LoadEventInfo::new(DataSpec::new("https://cdn.example.com/a.m4s"));
        assert_eq!(info.uri, "https://cdn.example.com/a.m4s");
        assert_eq!(info.bytes_loaded, 0);
    }

    #[test]
    fn test_media_time_range() {
        let data = MediaLoadData::new(DataType::Media).with_media_time_us(2_000_500, TIME_UNSET);
        assert_eq!(data.media_start_time_ms, Some(2_000));
        assert_eq!(data.media_end_time_ms, None);
    }

    #[test]
    fn test_minimum_retry_count_defaults() {
        let policy = DefaultLoadErrorHandlingPolicy::default();
        assert_eq!(policy.minimum_loadable_retry_count(DataType::Media), 3);
        assert_eq!(
            policy.minimum_loadable_retry_count(DataType::MediaProgressiveLive),
            6
        );
        assert!(!exceeds_minimum_retry_count(&policy, DataType::Media, 3));
        assert!(exceeds_minimum_retry_count(&policy, DataType::Media, 4));
    }

    #[test]
    fn test_configured_minimum_retry_count_wins() {
        let policy = DefaultLoadErrorHandlingPolicy::new(LoadErrorConfig {
            min_loadable_retry_count: Some(1),
            ..LoadErrorConfig::default()
        });
        assert_eq!(
            policy.minimum_loadable_retry_count(DataType::MediaProgressiveLive),
            1
        );
    }

    #[test]
    fn test_retry_delay_capped_by_configured_max() {
        let policy = DefaultLoadErrorHandlingPolicy::new(LoadErrorConfig {
            retry_delay_step_ms: 2_000,
            max_retry_delay_ms: 3_000,
            ..LoadErrorConfig::default()
        });
        let event = LoadEventInfo::new(DataSpec::new("https://cdn.example.com/b.m4s"));
        let data = MediaLoadData::new(DataType::Media);
        let error = LoadError::Http("connection reset".to_string());

        let delay = |count| policy.retry_delay_for(&LoadErrorInfo::new(&event, &data, &error, count));
        assert_eq!(delay(2), Some(Duration::from_millis(2_000)));
        assert_eq!(delay(3), Some(Duration::from_millis(3_000)));
        assert_eq!(delay(u32::MAX), Some(Duration::from_millis(3_000)));
    }

    #[test]
    fn test_policy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DefaultLoadErrorHandlingPolicy>();
    }
}
