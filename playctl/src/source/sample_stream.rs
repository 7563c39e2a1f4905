//! Sample stream abstraction

use crate::error::LoadError;
use crate::format::{DecoderInputBuffer, FormatHolder, BUFFER_FLAG_END_OF_STREAM};
use std::cell::RefCell;
use std::rc::Rc;

/// Outcome of [`SampleStream::read_data`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadResult {
    /// A format was written to the format holder
    FormatRead,
    /// A sample (or the end-of-stream marker) was written to the buffer
    BufferRead,
    /// Nothing is available right now
    NothingRead,
}

/// Ordered source of timed samples and format changes for one track
pub trait SampleStream {
    /// Whether data is available to be read
    fn is_ready(&self) -> bool;

    /// Return a pending fatal error without consuming it
    fn maybe_throw_error(&self) -> Result<(), LoadError>;

    /// Read a format, a sample or the end-of-stream marker
    ///
    /// With `format_required` set a sample is never read, only the current
    /// format (or the end of the stream / nothing).
    fn read_data(
        &mut self,
        format_holder: &mut FormatHolder,
        buffer: &mut DecoderInputBuffer,
        format_required: bool,
    ) -> ReadResult;

    /// Skip to the key frame before `position_us`, or to the end of the
    /// stream if `position_us` is beyond it. Returns the number of skipped samples.
    fn skip_data(&mut self, position_us: i64) -> usize;
}

/// Sample stream handle shared between the period that produced it and the
/// renderer reading it
pub type SharedSampleStream = Rc<RefCell<dyn SampleStream>>;

/// Stream that is always at its end
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySampleStream;

impl EmptySampleStream {
    pub fn shared() -> SharedSampleStream {
        Rc::new(RefCell::new(EmptySampleStream))
    }
}

impl SampleStream for EmptySampleStream {
    fn is_ready(&self) -> bool {
        true
    }

    fn maybe_throw_error(&self) -> Result<(), LoadError> {
        Ok(())
    }

    fn read_data(
        &mut self,
        _format_holder: &mut FormatHolder,
        buffer: &mut DecoderInputBuffer,
        _format_required: bool,
    ) -> ReadResult {
        buffer.clear();
        buffer.add_flag(BUFFER_FLAG_END_OF_STREAM);
        ReadResult::BufferRead
    }

    fn skip_data(&mut self, _position_us: i64) -> usize {
        0
    }
}
