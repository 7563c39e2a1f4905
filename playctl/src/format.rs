//! Media format descriptors and sample buffers
//!
//! These are the values that flow through [`SampleStream`](crate::source::SampleStream)
//! reads: a [`FormatHolder`] receives format changes, a [`DecoderInputBuffer`]
//! receives samples.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of track a renderer handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackType {
    Unknown,
    Default,
    Audio,
    Video,
    Text,
    Metadata,
    CameraMotion,
    None,
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackType::Unknown => "unknown",
            TrackType::Default => "default",
            TrackType::Audio => "audio",
            TrackType::Video => "video",
            TrackType::Text => "text",
            TrackType::Metadata => "metadata",
            TrackType::CameraMotion => "camera_motion",
            TrackType::None => "none",
        };
        write!(f, "{}", name)
    }
}

/// Description of one media format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    pub id: Option<String>,
    pub sample_mime_type: Option<String>,
    pub codecs: Option<String>,
    pub bitrate: Option<u32>,
    pub channel_count: Option<u32>,
    pub sample_rate: Option<u32>,
    pub language: Option<String>,

    /// Offset added to subsample timestamps (e.g. subtitle cues), or
    /// [`Format::OFFSET_SAMPLE_RELATIVE`] if they are relative to their sample.
    pub subsample_offset_us: i64,
}

impl Format {
    /// Subsample timestamps are relative to the timestamp of their sample.
    pub const OFFSET_SAMPLE_RELATIVE: i64 = i64::MAX;

    /// Format with only a sample MIME type set
    pub fn with_mime_type(mime_type: impl Into<String>) -> Self {
        Self {
            sample_mime_type: Some(mime_type.into()),
            ..Self::default()
        }
    }

    /// Copy of this format with the subsample offset replaced
    pub fn with_subsample_offset_us(&self, subsample_offset_us: i64) -> Self {
        Self {
            subsample_offset_us,
            ..self.clone()
        }
    }

    /// Whether subsample timestamps are relative to their sample
    pub fn is_sample_relative(&self) -> bool {
        self.subsample_offset_us == Self::OFFSET_SAMPLE_RELATIVE
    }
}

impl Default for Format {
    fn default() -> Self {
        Self {
            id: None,
            sample_mime_type: None,
            codecs: None,
            bitrate: None,
            channel_count: None,
            sample_rate: None,
            language: None,
            subsample_offset_us: Self::OFFSET_SAMPLE_RELATIVE,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn opt<T: fmt::Display>(value: &Option<T>) -> String {
            value
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "?".to_string())
        }
        write!(
            f,
            "Format({}, {}, {}, {}, [{}, {}], {})",
            opt(&self.id),
            opt(&self.sample_mime_type),
            opt(&self.codecs),
            opt(&self.bitrate),
            opt(&self.channel_count),
            opt(&self.sample_rate),
            opt(&self.language),
        )
    }
}

/// Receives a format when a stream read yields one
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatHolder {
    pub format: Option<Format>,
}

impl FormatHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.format = None;
    }
}

/// Sample is a key frame
pub const BUFFER_FLAG_KEY_FRAME: u32 = 1;
/// Buffer marks the end of the stream; it carries no sample data
pub const BUFFER_FLAG_END_OF_STREAM: u32 = 1 << 2;
/// Sample should be decoded but not rendered
pub const BUFFER_FLAG_DECODE_ONLY: u32 = 1 << 31;

/// Input buffer for one encoded sample
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecoderInputBuffer {
    /// Presentation timestamp in microseconds
    pub time_us: i64,
    /// Combination of `BUFFER_FLAG_*` values
    pub flags: u32,
    /// Encoded sample data
    pub data: Vec<u8>,
}

impl DecoderInputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.time_us = 0;
        self.flags = 0;
        self.data.clear();
    }

    pub fn add_flag(&mut self, flag: u32) {
        self.flags |= flag;
    }

    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag == flag
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.has_flag(BUFFER_FLAG_END_OF_STREAM)
    }

    pub fn is_key_frame(&self) -> bool {
        self.has_flag(BUFFER_FLAG_KEY_FRAME)
    }

    pub fn is_decode_only(&self) -> bool {
        self.has_flag(BUFFER_FLAG_DECODE_ONLY)
    }
}
