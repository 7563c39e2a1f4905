//! Recording renderer hooks, period callbacks and prepare listeners

use playctl::error::{Error, LoadError, Result};
use playctl::format::Format;
use playctl::renderer::{FormatSupport, RendererCapabilities, RendererHooks};
use playctl::source::{MediaPeriodId, PeriodCallback, PrepareListener};
use std::cell::RefCell;
use std::rc::Rc;

/// A hook invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    Enabled {
        joining: bool,
        may_render_start_of_stream: bool,
    },
    StreamChanged {
        format_count: usize,
        start_position_us: i64,
        offset_us: i64,
    },
    PositionReset {
        position_us: i64,
        joining: bool,
    },
    Started,
    Stopped,
    Disabled,
    Reset,
}

/// Renderer hooks that record every call
#[derive(Clone, Default)]
pub struct RecordingHooks {
    pub events: Rc<RefCell<Vec<HookEvent>>>,
    /// Support reported for every format with a MIME type
    pub format_support: Option<FormatSupport>,
    /// Make `on_enabled` fail
    pub fail_on_enabled: bool,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<HookEvent> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    fn record(&self, event: HookEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl RendererHooks for RecordingHooks {
    fn name(&self) -> &str {
        "RecordingRenderer"
    }

    fn supports_format(&self, format: &Format) -> Result<RendererCapabilities> {
        if format.sample_mime_type.is_none() {
            return Err(Error::Load(LoadError::Parser("format has no MIME type".to_string())));
        }
        Ok(RendererCapabilities::new(
            self.format_support.unwrap_or(FormatSupport::Handled),
        ))
    }

    fn on_enabled(&mut self, joining: bool, may_render_start_of_stream: bool) -> Result<()> {
        self.record(HookEvent::Enabled {
            joining,
            may_render_start_of_stream,
        });
        if self.fail_on_enabled {
            return Err(Error::Load(LoadError::Http("decoder unavailable".to_string())));
        }
        Ok(())
    }

    fn on_stream_changed(
        &mut self,
        formats: &[Format],
        start_position_us: i64,
        offset_us: i64,
    ) -> Result<()> {
        self.record(HookEvent::StreamChanged {
            format_count: formats.len(),
            start_position_us,
            offset_us,
        });
        Ok(())
    }

    fn on_position_reset(&mut self, position_us: i64, joining: bool) -> Result<()> {
        self.record(HookEvent::PositionReset {
            position_us,
            joining,
        });
        Ok(())
    }

    fn on_started(&mut self) -> Result<()> {
        self.record(HookEvent::Started);
        Ok(())
    }

    fn on_stopped(&mut self) {
        self.record(HookEvent::Stopped);
    }

    fn on_disabled(&mut self) {
        self.record(HookEvent::Disabled);
    }

    fn on_reset(&mut self) {
        self.record(HookEvent::Reset);
    }
}

/// Period callback recording the ids it was called with
#[derive(Default)]
pub struct RecordingCallback {
    pub prepared: RefCell<Vec<MediaPeriodId>>,
    pub continue_loading_requested: RefCell<Vec<MediaPeriodId>>,
}

impl RecordingCallback {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn prepared_count(&self) -> usize {
        self.prepared.borrow().len()
    }
}

impl PeriodCallback for RecordingCallback {
    fn on_prepared(&self, id: &MediaPeriodId) {
        self.prepared.borrow_mut().push(id.clone());
    }

    fn on_continue_loading_requested(&self, id: &MediaPeriodId) {
        self.continue_loading_requested.borrow_mut().push(id.clone());
    }
}

/// Prepare listener recording completions and errors
#[derive(Default)]
pub struct RecordingListener {
    pub completed: RefCell<Vec<MediaPeriodId>>,
    pub errors: RefCell<Vec<(MediaPeriodId, String)>>,
}

impl RecordingListener {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }
}

impl PrepareListener for RecordingListener {
    fn on_prepare_complete(&self, id: &MediaPeriodId) {
        self.completed.borrow_mut().push(id.clone());
    }

    fn on_prepare_error(&self, id: &MediaPeriodId, error: &LoadError) {
        self.errors.borrow_mut().push((id.clone(), error.to_string()));
    }
}
