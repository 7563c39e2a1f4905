//! Base renderer state machine
//!
//! [`BaseRenderer`] enforces the lifecycle transitions, keeps the sample
//! stream attached while enabled and translates stream timestamps into
//! renderer time by adding the stream offset. Track-specific renderers supply
//! a [`RendererHooks`] implementation; every hook fires after the transition
//! it describes.

use crate::error::{BoxError, Error, RendererError, Result};
use crate::format::{DecoderInputBuffer, Format, FormatHolder, TrackType};
use crate::renderer::capabilities::{
    AdaptiveSupport, FormatSupport, RendererCapabilities, RendererConfiguration,
};
use crate::renderer::RendererState;
use crate::source::{ReadResult, SharedSampleStream};
use playctl_common::time::TIME_END_OF_SOURCE;
use tracing::debug;

/// Track-specific behavior plugged into a [`BaseRenderer`]
///
/// Only `name` and `supports_format` are required; the lifecycle hooks are
/// no-ops by default.
pub trait RendererHooks {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// Capabilities for `format`
    fn supports_format(&self, format: &Format) -> Result<RendererCapabilities>;

    /// Whether the renderer can adapt between formats of different MIME types
    fn supports_mixed_mime_type_adaptation(&self) -> AdaptiveSupport {
        AdaptiveSupport::NotSupported
    }

    /// Renderer was enabled; the stream is not attached yet
    fn on_enabled(&mut self, _joining: bool, _may_render_start_of_stream: bool) -> Result<()> {
        Ok(())
    }

    /// A new stream was attached
    fn on_stream_changed(
        &mut self,
        _formats: &[Format],
        _start_position_us: i64,
        _offset_us: i64,
    ) -> Result<()> {
        Ok(())
    }

    /// Position was reset (enable, seek)
    fn on_position_reset(&mut self, _position_us: i64, _joining: bool) -> Result<()> {
        Ok(())
    }

    fn on_started(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_stopped(&mut self) {}

    fn on_disabled(&mut self) {}

    fn on_reset(&mut self) {}
}

/// Stream handed to a renderer by `enable` or `replace_stream`
#[derive(Clone)]
pub struct StreamAttachment {
    /// Formats the renderer may receive from the stream
    pub formats: Vec<Format>,
    pub stream: SharedSampleStream,
    /// Position of the first sample the renderer will render, in renderer time
    pub start_position_us: i64,
    /// Offset added to every stream timestamp to get renderer time
    pub offset_us: i64,
}

impl StreamAttachment {
    pub fn new(
        formats: Vec<Format>,
        stream: SharedSampleStream,
        start_position_us: i64,
        offset_us: i64,
    ) -> Self {
        Self {
            formats,
            stream,
            start_position_us,
            offset_us,
        }
    }
}

/// Renderer lifecycle and timestamp bookkeeping for one track
pub struct BaseRenderer<H: RendererHooks> {
    track_type: TrackType,
    index: usize,
    hooks: H,
    state: RendererState,
    configuration: Option<RendererConfiguration>,
    format_holder: FormatHolder,
    stream: Option<SharedSampleStream>,
    stream_formats: Vec<Format>,
    stream_offset_us: i64,
    last_reset_position_us: i64,
    reading_position_us: i64,
    stream_is_final: bool,
}

impl<H: RendererHooks> BaseRenderer<H> {
    pub fn new(track_type: TrackType, hooks: H) -> Self {
        Self {
            track_type,
            index: 0,
            hooks,
            state: RendererState::Disabled,
            configuration: None,
            format_holder: FormatHolder::new(),
            stream: None,
            stream_formats: Vec::new(),
            stream_offset_us: 0,
            last_reset_position_us: 0,
            reading_position_us: TIME_END_OF_SOURCE,
            stream_is_final: false,
        }
    }

    pub fn track_type(&self) -> TrackType {
        self.track_type
    }

    pub fn name(&self) -> &str {
        self.hooks.name()
    }

    /// Index of the renderer within the pipeline
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub fn state(&self) -> RendererState {
        self.state
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Configuration from the most recent `enable`
    pub fn configuration(&self) -> Option<RendererConfiguration> {
        self.configuration
    }

    /// Attached stream; `None` while disabled
    pub fn stream(&self) -> Option<&SharedSampleStream> {
        self.stream.as_ref()
    }

    /// Formats of the attached stream
    pub fn stream_formats(&self) -> &[Format] {
        &self.stream_formats
    }

    pub fn stream_offset_us(&self) -> i64 {
        self.stream_offset_us
    }

    /// Position passed to the most recent enable or position reset
    pub fn last_reset_position_us(&self) -> i64 {
        self.last_reset_position_us
    }

    /// Highest renderer-time timestamp read, or `TIME_END_OF_SOURCE`
    pub fn reading_position_us(&self) -> i64 {
        self.reading_position_us
    }

    pub fn has_read_stream_to_end(&self) -> bool {
        self.reading_position_us == TIME_END_OF_SOURCE
    }

    /// Mark the attached stream as the last one before the renderer is disabled
    pub fn set_current_stream_final(&mut self) {
        self.stream_is_final = true;
    }

    pub fn is_current_stream_final(&self) -> bool {
        self.stream_is_final
    }

    /// Scratch format holder, cleared before it is handed out
    pub fn format_holder(&mut self) -> &mut FormatHolder {
        self.format_holder.clear();
        &mut self.format_holder
    }

    pub fn supports_format(&self, format: &Format) -> Result<RendererCapabilities> {
        self.hooks.supports_format(format)
    }

    pub fn supports_mixed_mime_type_adaptation(&self) -> AdaptiveSupport {
        self.hooks.supports_mixed_mime_type_adaptation()
    }

    /// Enable the renderer and attach its first stream
    ///
    /// # Errors
    /// Fails with [`Error::InvalidState`] unless disabled. A failing hook is
    /// returned as-is and leaves the renderer enabled; the caller disables it.
    pub fn enable(
        &mut self,
        configuration: RendererConfiguration,
        attachment: StreamAttachment,
        position_us: i64,
        joining: bool,
        may_render_start_of_stream: bool,
    ) -> Result<()> {
        self.require_state("enable", &[RendererState::Disabled])?;
        debug!(
            "[Renderer {}] Enabling {} at {}us (joining={})",
            self.index,
            self.hooks.name(),
            position_us,
            joining
        );
        self.configuration = Some(configuration);
        self.state = RendererState::Enabled;
        self.last_reset_position_us = position_us;
        self.hooks.on_enabled(joining, may_render_start_of_stream)?;
        self.attach_stream(attachment)?;
        // Reading position stays at the stream offset set by attach_stream
        self.hooks.on_position_reset(position_us, joining)
    }

    /// Enabled -> Started
    pub fn start(&mut self) -> Result<()> {
        self.require_state("start", &[RendererState::Enabled])?;
        self.state = RendererState::Started;
        debug!("[Renderer {}] Started", self.index);
        self.hooks.on_started()
    }

    /// Started -> Enabled
    pub fn stop(&mut self) -> Result<()> {
        self.require_state("stop", &[RendererState::Started])?;
        self.state = RendererState::Enabled;
        debug!("[Renderer {}] Stopped", self.index);
        self.hooks.on_stopped();
        Ok(())
    }

    /// Enabled -> Disabled; detaches the stream
    pub fn disable(&mut self) -> Result<()> {
        self.require_state("disable", &[RendererState::Enabled])?;
        self.format_holder.clear();
        self.state = RendererState::Disabled;
        self.stream = None;
        self.stream_formats.clear();
        self.stream_is_final = false;
        debug!("[Renderer {}] Disabled", self.index);
        self.hooks.on_disabled();
        Ok(())
    }

    /// Release resources held while disabled
    pub fn reset(&mut self) -> Result<()> {
        self.require_state("reset", &[RendererState::Disabled])?;
        self.format_holder.clear();
        debug!("[Renderer {}] Reset", self.index);
        self.hooks.on_reset();
        Ok(())
    }

    /// Swap in the stream of the next period
    ///
    /// # Errors
    /// [`Error::InvalidState`] while disabled, [`Error::StreamFinal`] if the
    /// current stream was marked final.
    pub fn replace_stream(&mut self, attachment: StreamAttachment) -> Result<()> {
        self.require_state(
            "replace stream",
            &[RendererState::Enabled, RendererState::Started],
        )?;
        self.attach_stream(attachment)
    }

    /// Reset the position after a seek
    pub fn reset_position(&mut self, position_us: i64) -> Result<()> {
        self.require_state(
            "reset position",
            &[RendererState::Enabled, RendererState::Started],
        )?;
        self.stream_is_final = false;
        self.last_reset_position_us = position_us;
        self.reading_position_us = position_us;
        self.hooks.on_position_reset(position_us, false)
    }

    /// Read from the attached stream, translating timestamps to renderer time
    ///
    /// An end-of-stream buffer is only passed on once the stream is final;
    /// before that the renderer sees [`ReadResult::NothingRead`] so a
    /// following stream can be attached seamlessly.
    pub fn read_source(
        &mut self,
        format_holder: &mut FormatHolder,
        buffer: &mut DecoderInputBuffer,
        format_required: bool,
    ) -> Result<ReadResult> {
        let stream = self.stream.as_ref().ok_or(Error::NoStream)?;
        let result = stream
            .borrow_mut()
            .read_data(format_holder, buffer, format_required);
        match result {
            ReadResult::BufferRead if buffer.is_end_of_stream() => {
                self.reading_position_us = TIME_END_OF_SOURCE;
                if self.stream_is_final {
                    Ok(ReadResult::BufferRead)
                } else {
                    Ok(ReadResult::NothingRead)
                }
            }
            ReadResult::BufferRead => {
                buffer.time_us = buffer.time_us.saturating_add(self.stream_offset_us);
                self.reading_position_us = self.reading_position_us.max(buffer.time_us);
                Ok(ReadResult::BufferRead)
            }
            ReadResult::FormatRead => {
                if let Some(format) = format_holder.format.as_mut() {
                    if !format.is_sample_relative() {
                        format.subsample_offset_us = format
                            .subsample_offset_us
                            .saturating_add(self.stream_offset_us);
                    }
                }
                Ok(ReadResult::FormatRead)
            }
            ReadResult::NothingRead => Ok(ReadResult::NothingRead),
        }
    }

    /// Skip stream samples up to `position_us` (renderer time)
    pub fn skip_source(&mut self, position_us: i64) -> Result<usize> {
        let stream = self.stream.as_ref().ok_or(Error::NoStream)?;
        let skipped = stream
            .borrow_mut()
            .skip_data(position_us.saturating_sub(self.stream_offset_us));
        Ok(skipped)
    }

    /// Whether the source can provide data now
    ///
    /// After reading to the end of the stream this is true only for a final
    /// stream.
    pub fn is_source_ready(&self) -> bool {
        if self.has_read_stream_to_end() {
            return self.stream_is_final;
        }
        self.stream
            .as_ref()
            .is_some_and(|stream| stream.borrow().is_ready())
    }

    /// Return a pending stream error without consuming it
    pub fn maybe_throw_stream_error(&self) -> Result<()> {
        let stream = self.stream.as_ref().ok_or(Error::NoStream)?;
        stream.borrow().maybe_throw_error()?;
        Ok(())
    }

    /// Wrap `cause` with this renderer's context
    ///
    /// The format's support level comes from the renderer's own query. A
    /// failing query is logged and reported as [`FormatSupport::Handled`].
    pub fn create_renderer_error(
        &self,
        cause: impl Into<BoxError>,
        format: Option<&Format>,
    ) -> RendererError {
        let format_support = match format {
            Some(format) => match self.hooks.supports_format(format) {
                Ok(capabilities) => capabilities.format_support,
                Err(e) => {
                    debug!(
                        "[Renderer {}] Format support query failed while building error: {}",
                        self.index, e
                    );
                    FormatSupport::Handled
                }
            },
            None => FormatSupport::Handled,
        };
        RendererError {
            cause: cause.into(),
            renderer_name: self.hooks.name().to_string(),
            renderer_index: self.index,
            format: format.cloned(),
            format_support,
        }
    }

    fn attach_stream(&mut self, attachment: StreamAttachment) -> Result<()> {
        if self.stream_is_final {
            return Err(Error::StreamFinal);
        }
        let StreamAttachment {
            formats,
            stream,
            start_position_us,
            offset_us,
        } = attachment;
        debug!(
            "[Renderer {}] Attaching stream: {} formats, start={}us, offset={}us",
            self.index,
            formats.len(),
            start_position_us,
            offset_us
        );
        self.stream = Some(stream);
        self.reading_position_us = offset_us;
        self.stream_offset_us = offset_us;
        self.stream_formats = formats;
        self.hooks
            .on_stream_changed(&self.stream_formats, start_position_us, offset_us)
    }

    fn require_state(&self, operation: &'static str, allowed: &[RendererState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}
