//! Fake media source and period sharing one call log

use playctl::error::LoadError;
use playctl::format::Format;
use playctl::source::{
    EmptySampleStream, MediaPeriod, MediaPeriodId, MediaSource, SeekParameters, SharedAllocator,
    SharedMediaSource, SharedPeriodCallback, SharedSampleStream, SourceCaller, SourceInfo,
    TrackGroup, TrackGroupArray,
};
use playctl::track_selection::TrackSelection;
use playctl_common::time::{TIME_END_OF_SOURCE, TIME_UNSET};
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

/// When a fake period reports that it is prepared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepareMode {
    /// Inside `prepare`
    Immediate,
    /// Only when the test calls `FakeMediaSource::complete_preparation`
    Manual,
    /// `prepare` requests loading; the first `continue_loading` prepares
    AfterContinueLoading,
}

/// Everything the fake source and its periods were asked to do
#[derive(Default)]
pub struct PeriodLog {
    pub source_prepared: bool,
    pub source_released: bool,
    pub created_ids: Vec<MediaPeriodId>,
    pub create_positions: Vec<i64>,
    pub prepare_positions: Vec<i64>,
    pub select_positions: Vec<i64>,
    pub discard_positions: Vec<i64>,
    pub reevaluate_positions: Vec<i64>,
    pub continue_loading_positions: Vec<i64>,
    pub released_periods: usize,
    pub refresh_error: Option<LoadError>,
    pub prepare_error: Option<LoadError>,
    pub loading: bool,
    callback: Option<(MediaPeriodId, SharedPeriodCallback)>,
    caller: Option<Rc<dyn SourceCaller>>,
}

pub type SharedLog = Rc<RefCell<PeriodLog>>;

pub struct FakeMediaPeriod {
    id: MediaPeriodId,
    log: SharedLog,
    mode: PrepareMode,
    track_groups: TrackGroupArray,
    prepared: bool,
}

impl FakeMediaPeriod {
    fn callback(&self) -> Option<SharedPeriodCallback> {
        self.log
            .borrow()
            .callback
            .as_ref()
            .map(|(_, callback)| Rc::clone(callback))
    }
}

impl MediaPeriod for FakeMediaPeriod {
    fn prepare(&mut self, callback: SharedPeriodCallback, position_us: i64) {
        {
            let mut log = self.log.borrow_mut();
            log.prepare_positions.push(position_us);
            log.callback = Some((self.id.clone(), Rc::clone(&callback)));
        }
        match self.mode {
            PrepareMode::Immediate => {
                self.prepared = true;
                callback.on_prepared(&self.id);
            }
            PrepareMode::AfterContinueLoading => {
                self.log.borrow_mut().loading = true;
                callback.on_continue_loading_requested(&self.id);
            }
            PrepareMode::Manual => {}
        }
    }

    fn maybe_throw_prepare_error(&self) -> Result<(), LoadError> {
        match &self.log.borrow().prepare_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn track_groups(&self) -> TrackGroupArray {
        self.track_groups.clone()
    }

    fn select_tracks(
        &mut self,
        selections: &[Option<Box<dyn TrackSelection>>],
        _may_retain_stream_flags: &[bool],
        streams: &mut [Option<SharedSampleStream>],
        stream_reset_flags: &mut [bool],
        position_us: i64,
    ) -> i64 {
        self.log.borrow_mut().select_positions.push(position_us);
        for (i, selection) in selections.iter().enumerate() {
            if let (Some(_), Some(stream)) = (selection, streams.get_mut(i)) {
                *stream = Some(EmptySampleStream::shared());
                if let Some(flag) = stream_reset_flags.get_mut(i) {
                    *flag = true;
                }
            }
        }
        position_us
    }

    fn discard_buffer(&mut self, position_us: i64, _to_keyframe: bool) {
        self.log.borrow_mut().discard_positions.push(position_us);
    }

    fn read_discontinuity(&mut self) -> i64 {
        TIME_UNSET
    }

    fn buffered_position_us(&self) -> i64 {
        if self.prepared {
            TIME_END_OF_SOURCE
        } else {
            0
        }
    }

    fn seek_to_us(&mut self, position_us: i64) -> i64 {
        position_us
    }

    fn adjusted_seek_position_us(&self, position_us: i64, seek_parameters: SeekParameters) -> i64 {
        // Key frames every second
        let previous = position_us - position_us.rem_euclid(1_000_000);
        seek_parameters.resolve_seek_position_us(position_us, previous, previous + 1_000_000)
    }

    fn next_load_position_us(&self) -> i64 {
        if self.log.borrow().loading {
            0
        } else {
            TIME_END_OF_SOURCE
        }
    }

    fn reevaluate_buffer(&mut self, position_us: i64) {
        self.log.borrow_mut().reevaluate_positions.push(position_us);
    }

    fn continue_loading(&mut self, position_us: i64) -> bool {
        self.log
            .borrow_mut()
            .continue_loading_positions
            .push(position_us);
        if self.mode == PrepareMode::AfterContinueLoading && !self.prepared {
            self.prepared = true;
            self.log.borrow_mut().loading = false;
            if let Some(callback) = self.callback() {
                callback.on_prepared(&self.id);
            }
            return true;
        }
        false
    }

    fn is_loading(&self) -> bool {
        self.log.borrow().loading
    }
}

/// Media source producing [`FakeMediaPeriod`]s
pub struct FakeMediaSource {
    log: SharedLog,
    mode: PrepareMode,
    period_uid: Uuid,
    track_groups: TrackGroupArray,
    /// Report the timeline inside `prepare_source`
    pub refresh_on_prepare: bool,
}

impl FakeMediaSource {
    pub fn new(mode: PrepareMode) -> Self {
        Self {
            log: SharedLog::default(),
            mode,
            period_uid: Uuid::new_v4(),
            track_groups: TrackGroupArray::new(vec![
                TrackGroup::new(vec![Format::with_mime_type("video/avc")]),
                TrackGroup::new(vec![
                    Format::with_mime_type("audio/mp4a-latm"),
                    Format::with_mime_type("audio/opus"),
                ]),
            ]),
            refresh_on_prepare: true,
        }
    }

    pub fn log(&self) -> SharedLog {
        Rc::clone(&self.log)
    }

    pub fn period_uid(&self) -> Uuid {
        self.period_uid
    }

    pub fn track_groups(&self) -> &TrackGroupArray {
        &self.track_groups
    }

    pub fn into_shared(self) -> (Rc<RefCell<FakeMediaSource>>, SharedMediaSource) {
        let concrete = Rc::new(RefCell::new(self));
        let shared: SharedMediaSource = concrete.clone();
        (concrete, shared)
    }

    /// Report the timeline to the caller registered in `prepare_source`
    pub fn refresh_timeline(&self) {
        let caller = self.log.borrow().caller.clone();
        if let Some(caller) = caller {
            caller.on_source_info_refreshed(&SourceInfo::new(self.period_uid));
        }
    }

    /// Finish preparing the most recently prepared period
    pub fn complete_preparation(&self) {
        let callback = self.log.borrow().callback.clone();
        if let Some((id, callback)) = callback {
            callback.on_prepared(&id);
        }
    }
}

impl MediaSource for FakeMediaSource {
    fn prepare_source(&mut self, caller: Rc<dyn SourceCaller>) {
        {
            let mut log = self.log.borrow_mut();
            log.source_prepared = true;
            log.caller = Some(Rc::clone(&caller));
        }
        if self.refresh_on_prepare {
            caller.on_source_info_refreshed(&SourceInfo::new(self.period_uid));
        }
    }

    fn maybe_throw_source_info_refresh_error(&self) -> Result<(), LoadError> {
        match &self.log.borrow().refresh_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn create_period(
        &mut self,
        id: &MediaPeriodId,
        _allocator: SharedAllocator,
        start_position_us: i64,
    ) -> Box<dyn MediaPeriod> {
        {
            let mut log = self.log.borrow_mut();
            log.created_ids.push(id.clone());
            log.create_positions.push(start_position_us);
        }
        Box::new(FakeMediaPeriod {
            id: id.clone(),
            log: Rc::clone(&self.log),
            mode: self.mode,
            track_groups: self.track_groups.clone(),
            prepared: false,
        })
    }

    fn release_period(&mut self, _period: Box<dyn MediaPeriod>) {
        self.log.borrow_mut().released_periods += 1;
    }

    fn release_source(&mut self) {
        let mut log = self.log.borrow_mut();
        log.source_released = true;
        log.caller = None;
    }
}
