//! Scripted sample stream

use playctl::error::LoadError;
use playctl::format::{
    DecoderInputBuffer, Format, FormatHolder, BUFFER_FLAG_END_OF_STREAM, BUFFER_FLAG_KEY_FRAME,
};
use playctl::source::{ReadResult, SampleStream, SharedSampleStream};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// One scripted read result
#[derive(Debug, Clone)]
pub enum StreamItem {
    Format(Format),
    Sample { time_us: i64 },
    /// Repeats forever once reached
    EndOfStream,
}

/// Sample stream that replays a fixed script
pub struct FakeSampleStream {
    items: VecDeque<StreamItem>,
    pub ready: bool,
    pub error: Option<LoadError>,
    pub skip_positions: Vec<i64>,
    pub skip_result: usize,
}

impl FakeSampleStream {
    pub fn new(items: Vec<StreamItem>) -> Self {
        Self {
            items: items.into(),
            ready: true,
            error: None,
            skip_positions: Vec::new(),
            skip_result: 0,
        }
    }

    /// Stream that only yields end of stream
    pub fn end_of_stream_only() -> Self {
        Self::new(vec![StreamItem::EndOfStream])
    }

    /// Samples at the given timestamps, followed by end of stream
    pub fn samples(times_us: &[i64]) -> Self {
        let mut items: Vec<StreamItem> = times_us
            .iter()
            .map(|&time_us| StreamItem::Sample { time_us })
            .collect();
        items.push(StreamItem::EndOfStream);
        Self::new(items)
    }

    /// Concrete handle for scripting plus the trait-object handle for the renderer
    pub fn into_shared(self) -> (Rc<RefCell<FakeSampleStream>>, SharedSampleStream) {
        let concrete = Rc::new(RefCell::new(self));
        let shared: SharedSampleStream = concrete.clone();
        (concrete, shared)
    }

    pub fn shared(self) -> SharedSampleStream {
        self.into_shared().1
    }
}

impl SampleStream for FakeSampleStream {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn maybe_throw_error(&self) -> Result<(), LoadError> {
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn read_data(
        &mut self,
        format_holder: &mut FormatHolder,
        buffer: &mut DecoderInputBuffer,
        _format_required: bool,
    ) -> ReadResult {
        match self.items.front().cloned() {
            None => ReadResult::NothingRead,
            Some(StreamItem::EndOfStream) => {
                buffer.clear();
                buffer.add_flag(BUFFER_FLAG_END_OF_STREAM);
                ReadResult::BufferRead
            }
            Some(StreamItem::Format(format)) => {
                self.items.pop_front();
                format_holder.format = Some(format);
                ReadResult::FormatRead
            }
            Some(StreamItem::Sample { time_us }) => {
                self.items.pop_front();
                buffer.clear();
                buffer.time_us = time_us;
                buffer.add_flag(BUFFER_FLAG_KEY_FRAME);
                buffer.data.extend_from_slice(&[0u8; 16]);
                ReadResult::BufferRead
            }
        }
    }

    fn skip_data(&mut self, position_us: i64) -> usize {
        self.skip_positions.push(position_us);
        self.skip_result
    }
}
