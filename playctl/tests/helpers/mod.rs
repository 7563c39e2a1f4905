//! Test helpers for playctl integration tests
//!
//! Provides scripted fakes for the collaborator traits:
//! - FakeSampleStream: plays back a queue of formats, samples and end of stream
//! - FakeMediaSource / FakeMediaPeriod: record every call in a shared log
//! - RecordingHooks: renderer hooks that record the order they fire in
//! - RecordingCallback / RecordingListener: record period callbacks

#![allow(dead_code)]

pub mod fake_source;
pub mod fake_stream;
pub mod recording;

// Each test binary uses a different subset
#[allow(unused_imports)]
pub use fake_source::{FakeMediaSource, PrepareMode};
#[allow(unused_imports)]
pub use fake_stream::{FakeSampleStream, StreamItem};
#[allow(unused_imports)]
pub use recording::{HookEvent, RecordingCallback, RecordingHooks, RecordingListener};

use playctl::error::LoadError;

/// HTTP status error for `uri`
pub fn http_error(code: u16, message: &str) -> LoadError {
    LoadError::InvalidResponseCode {
        code,
        message: message.to_string(),
        uri: "https://cdn.example.com/segment-7.m4s".to_string(),
    }
}
