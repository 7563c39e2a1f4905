//! Deferred media period
//!
//! A [`DeferredPeriod`] is handed to the playback coordinator before the media
//! source that will back it can create the real ("live") period. The
//! coordinator can already call `prepare`, poll for errors and ask about
//! loading; once the source is ready, [`DeferredPeriod::create_period`]
//! creates the live period and replays the pending prepare call.
//!
//! Preparation progress from the live period flows through an internal relay
//! that re-addresses callbacks to the deferred period's id, forwards them to
//! the coordinator's callback and notifies an optional [`PrepareListener`].

use crate::error::{Error, LoadError, Result};
use crate::source::allocator::SharedAllocator;
use crate::source::media_source::SharedMediaSource;
use crate::source::period::{
    MediaPeriod, MediaPeriodId, PeriodCallback, SeekParameters, SharedPeriodCallback,
};
use crate::source::sample_stream::SharedSampleStream;
use crate::source::track::TrackGroupArray;
use crate::track_selection::TrackSelection;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, warn};

/// Listener for preparation events of a deferred period
pub trait PrepareListener {
    /// Preparing the period completed
    fn on_prepare_complete(&self, id: &MediaPeriodId);

    /// First error while refreshing source info or preparing the period
    fn on_prepare_error(&self, id: &MediaPeriodId, error: &LoadError);
}

/// Relays live period callbacks to the coordinator under the deferred id
struct PrepareRelay {
    id: MediaPeriodId,
    callback: RefCell<Option<SharedPeriodCallback>>,
    listener: RefCell<Option<Rc<dyn PrepareListener>>>,
    notified_prepare_complete: Cell<bool>,
}

impl PrepareRelay {
    fn callback(&self) -> Option<SharedPeriodCallback> {
        self.callback.borrow().clone()
    }

    fn listener(&self) -> Option<Rc<dyn PrepareListener>> {
        self.listener.borrow().clone()
    }
}

impl PeriodCallback for PrepareRelay {
    fn on_prepared(&self, _live_id: &MediaPeriodId) {
        match self.callback() {
            Some(callback) => callback.on_prepared(&self.id),
            None => warn!("Period {} prepared without a registered callback", self.id),
        }
        if self.notified_prepare_complete.get() {
            return;
        }
        if let Some(listener) = self.listener() {
            self.notified_prepare_complete.set(true);
            listener.on_prepare_complete(&self.id);
        }
    }

    fn on_continue_loading_requested(&self, _live_id: &MediaPeriodId) {
        if let Some(callback) = self.callback() {
            callback.on_continue_loading_requested(&self.id);
        }
    }
}

/// Media period that defers creating its live period until the source is ready
pub struct DeferredPeriod {
    id: MediaPeriodId,
    source: SharedMediaSource,
    allocator: SharedAllocator,
    relay: Rc<PrepareRelay>,
    live: Option<Box<dyn MediaPeriod>>,
    created: bool,
    prepare_called: bool,
    prepare_position_us: i64,
    prepare_position_override_us: Option<i64>,
    notified_prepare_error: bool,
}

impl DeferredPeriod {
    /// Create a deferred period
    ///
    /// # Arguments
    /// * `source` - Source that will create the live period
    /// * `id` - Id of this period
    /// * `allocator` - Allocator passed on to the live period
    /// * `prepare_position_us` - Expected start position
    pub fn new(
        source: SharedMediaSource,
        id: MediaPeriodId,
        allocator: SharedAllocator,
        prepare_position_us: i64,
    ) -> Self {
        let relay = Rc::new(PrepareRelay {
            id: id.clone(),
            callback: RefCell::new(None),
            listener: RefCell::new(None),
            notified_prepare_complete: Cell::new(false),
        });
        Self {
            id,
            source,
            allocator,
            relay,
            live: None,
            created: false,
            prepare_called: false,
            prepare_position_us,
            prepare_position_override_us: None,
            notified_prepare_error: false,
        }
    }

    pub fn id(&self) -> &MediaPeriodId {
        &self.id
    }

    /// Source this period was created for
    pub fn source(&self) -> &SharedMediaSource {
        &self.source
    }

    /// Set a listener for preparation events
    ///
    /// With a listener set, [`DeferredPeriod::maybe_throw_prepare_error`] no
    /// longer returns errors; the first one is passed to the listener instead.
    pub fn set_prepare_listener(&mut self, listener: Rc<dyn PrepareListener>) {
        *self.relay.listener.borrow_mut() = Some(listener);
    }

    /// Position the period was asked to prepare at
    pub fn prepare_position_us(&self) -> i64 {
        self.prepare_position_us
    }

    /// Pending prepare position override, if any
    pub fn prepare_position_override_us(&self) -> Option<i64> {
        self.prepare_position_override_us
    }

    /// Override the position at which the live period is prepared
    ///
    /// Must be called before [`DeferredPeriod::create_period`] to affect the
    /// live period's prepare call. It always applies to the first
    /// `select_tracks` call made at the original prepare position.
    pub fn override_prepare_position_us(&mut self, position_us: i64) {
        if self.created {
            warn!(
                "Prepare position override {}us set after period {} was created",
                position_us, self.id
            );
        }
        self.prepare_position_override_us = Some(position_us);
    }

    /// Whether a live period currently backs this period
    pub fn is_created(&self) -> bool {
        self.live.is_some()
    }

    /// Create the live period and replay a pending prepare call
    ///
    /// # Errors
    /// Returns [`Error::PeriodAlreadyCreated`] if called more than once.
    pub fn create_period(&mut self, id: &MediaPeriodId) -> Result<()> {
        if self.created {
            return Err(Error::PeriodAlreadyCreated(self.id.clone()));
        }
        let position_us = self.effective_prepare_position_us();
        debug!(
            "Creating live period {} for deferred period {} at {}us",
            id, self.id, position_us
        );
        let mut live = self
            .source
            .borrow_mut()
            .create_period(id, Rc::clone(&self.allocator), position_us);
        self.created = true;
        if self.prepare_called {
            live.prepare(self.relay_callback(), position_us);
        }
        self.live = Some(live);
        Ok(())
    }

    /// Release the live period back to the source
    ///
    /// Safe to call before the live period exists and safe to repeat.
    pub fn release_period(&mut self) {
        if let Some(live) = self.live.take() {
            debug!("Releasing live period of {}", self.id);
            self.source.borrow_mut().release_period(live);
        }
    }

    /// Start preparing
    ///
    /// The callback is stored; if the live period exists it is prepared right
    /// away, otherwise when it is created. The live period is always prepared
    /// at the deferred prepare position (with any override applied), not at
    /// `position_us`.
    pub fn prepare(&mut self, callback: SharedPeriodCallback, position_us: i64) {
        *self.relay.callback.borrow_mut() = Some(callback);
        self.prepare_called = true;
        let effective_us = self.effective_prepare_position_us();
        if position_us != effective_us {
            debug!(
                "Period {} prepare requested at {}us, using {}us",
                self.id, position_us, effective_us
            );
        }
        let relay = self.relay_callback();
        if let Some(live) = self.live.as_mut() {
            live.prepare(relay, effective_us);
        }
    }

    /// Check for a pending source or preparation error
    ///
    /// Before the live period exists the source's refresh error is checked,
    /// afterwards the live period's prepare error. With a prepare listener set
    /// the first error goes to the listener (exactly once) and `Ok` is returned.
    pub fn maybe_throw_prepare_error(&mut self) -> std::result::Result<(), LoadError> {
        let result = match &self.live {
            Some(live) => live.maybe_throw_prepare_error(),
            None => self.source.borrow().maybe_throw_source_info_refresh_error(),
        };
        let Err(error) = result else {
            return Ok(());
        };
        let Some(listener) = self.relay.listener() else {
            return Err(error);
        };
        if !self.notified_prepare_error {
            self.notified_prepare_error = true;
            warn!("Period {} failed to prepare: {}", self.id, error);
            listener.on_prepare_error(&self.id, &error);
        }
        Ok(())
    }

    pub fn track_groups(&self) -> Result<TrackGroupArray> {
        Ok(self.live()?.track_groups())
    }

    /// Apply a track selection on the live period
    ///
    /// A pending prepare position override replaces `position_us` when it
    /// equals the original prepare position; the override is then cleared.
    pub fn select_tracks(
        &mut self,
        selections: &[Option<Box<dyn TrackSelection>>],
        may_retain_stream_flags: &[bool],
        streams: &mut [Option<SharedSampleStream>],
        stream_reset_flags: &mut [bool],
        position_us: i64,
    ) -> Result<i64> {
        let mut position_us = position_us;
        if let Some(override_us) = self.prepare_position_override_us {
            if position_us == self.prepare_position_us {
                debug!(
                    "Period {} selecting tracks at override {}us instead of {}us",
                    self.id, override_us, position_us
                );
                position_us = override_us;
                self.prepare_position_override_us = None;
            }
        }
        Ok(self.live_mut()?.select_tracks(
            selections,
            may_retain_stream_flags,
            streams,
            stream_reset_flags,
            position_us,
        ))
    }

    pub fn discard_buffer(&mut self, position_us: i64, to_keyframe: bool) -> Result<()> {
        self.live_mut()?.discard_buffer(position_us, to_keyframe);
        Ok(())
    }

    pub fn read_discontinuity(&mut self) -> Result<i64> {
        Ok(self.live_mut()?.read_discontinuity())
    }

    pub fn buffered_position_us(&self) -> Result<i64> {
        Ok(self.live()?.buffered_position_us())
    }

    pub fn seek_to_us(&mut self, position_us: i64) -> Result<i64> {
        Ok(self.live_mut()?.seek_to_us(position_us))
    }

    pub fn adjusted_seek_position_us(
        &self,
        position_us: i64,
        seek_parameters: SeekParameters,
    ) -> Result<i64> {
        Ok(self
            .live()?
            .adjusted_seek_position_us(position_us, seek_parameters))
    }

    pub fn next_load_position_us(&self) -> Result<i64> {
        Ok(self.live()?.next_load_position_us())
    }

    pub fn reevaluate_buffer(&mut self, position_us: i64) -> Result<()> {
        self.live_mut()?.reevaluate_buffer(position_us);
        Ok(())
    }

    /// Continue loading; `false` while no live period exists
    pub fn continue_loading(&mut self, position_us: i64) -> bool {
        self.live
            .as_mut()
            .is_some_and(|live| live.continue_loading(position_us))
    }

    /// Whether the live period is loading; `false` while none exists
    pub fn is_loading(&self) -> bool {
        self.live.as_ref().is_some_and(|live| live.is_loading())
    }

    fn effective_prepare_position_us(&self) -> i64 {
        self.prepare_position_override_us
            .unwrap_or(self.prepare_position_us)
    }

    fn relay_callback(&self) -> SharedPeriodCallback {
        Rc::clone(&self.relay) as SharedPeriodCallback
    }

    fn live(&self) -> Result<&dyn MediaPeriod> {
        self.live
            .as_deref()
            .ok_or_else(|| Error::PeriodUnavailable(self.id.clone()))
    }

    fn live_mut(&mut self) -> Result<&mut (dyn MediaPeriod + 'static)> {
        match self.live.as_deref_mut() {
            Some(live) => Ok(live),
            None => Err(Error::PeriodUnavailable(self.id.clone())),
        }
    }
}
