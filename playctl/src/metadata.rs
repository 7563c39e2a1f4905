//! One-shot track metadata retrieval
//!
//! Prepares a media source just far enough to learn its track groups, then
//! releases it. The period is requested through a [`DeferredPeriod`] before
//! the source has reported its timeline, the same way a player would.

use crate::error::Result;
use crate::source::allocator::{DefaultAllocator, DEFAULT_BUFFER_SEGMENT_SIZE};
use crate::source::{
    DeferredPeriod, MediaPeriodId, PeriodCallback, SharedMediaSource, SourceCaller, SourceInfo,
    TrackGroupArray,
};
use playctl_common::config::MetadataConfig;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, info};
use uuid::Uuid;

/// Records the first timeline the source reports
#[derive(Default)]
struct TimelineRecorder {
    info: RefCell<Option<SourceInfo>>,
}

impl TimelineRecorder {
    fn info(&self) -> Option<SourceInfo> {
        self.info.borrow().clone()
    }
}

impl SourceCaller for TimelineRecorder {
    fn on_source_info_refreshed(&self, info: &SourceInfo) {
        let mut slot = self.info.borrow_mut();
        if slot.is_some() {
            // Dynamic timeline updates do not affect the period being prepared
            debug!("Ignoring timeline update for period {}", info.period_uid);
            return;
        }
        *slot = Some(info.clone());
    }
}

/// Records period preparation progress
#[derive(Default)]
struct PreparationRecorder {
    prepared: Cell<bool>,
    continue_loading_requested: Cell<bool>,
}

impl PeriodCallback for PreparationRecorder {
    fn on_prepared(&self, _id: &MediaPeriodId) {
        self.prepared.set(true);
    }

    fn on_continue_loading_requested(&self, _id: &MediaPeriodId) {
        self.continue_loading_requested.set(true);
    }
}

/// Retrieve the track groups of `source` without playing it
///
/// Pending source and preparation errors are polled every
/// `config.error_poll_interval_ms` and end the retrieval. The period and the
/// source are released whether or not retrieval succeeds.
///
/// The returned future is not `Send`; drive it on a current-thread runtime or
/// a `LocalSet`.
pub async fn retrieve_metadata(
    source: SharedMediaSource,
    config: &MetadataConfig,
) -> Result<TrackGroupArray> {
    let timeline = Rc::new(TimelineRecorder::default());
    let preparation = Rc::new(PreparationRecorder::default());
    let allocator = DefaultAllocator::shared(true, DEFAULT_BUFFER_SEGMENT_SIZE);
    let mut period = DeferredPeriod::new(
        Rc::clone(&source),
        MediaPeriodId::new(Uuid::new_v4()),
        allocator,
        0,
    );
    period.prepare(Rc::clone(&preparation) as Rc<dyn PeriodCallback>, 0);

    debug!("Preparing source for metadata retrieval");
    source
        .borrow_mut()
        .prepare_source(Rc::clone(&timeline) as Rc<dyn SourceCaller>);

    let result = poll_until_prepared(&mut period, &timeline, &preparation, config).await;

    period.release_period();
    source.borrow_mut().release_source();
    match &result {
        Ok(groups) => info!("Retrieved {} track groups", groups.len()),
        Err(e) => info!("Metadata retrieval failed: {}", e),
    }
    result
}

async fn poll_until_prepared(
    period: &mut DeferredPeriod,
    timeline: &TimelineRecorder,
    preparation: &PreparationRecorder,
    config: &MetadataConfig,
) -> Result<TrackGroupArray> {
    let mut ticker = tokio::time::interval(config.error_poll_interval());
    loop {
        if !period.is_created() {
            if let Some(info) = timeline.info() {
                period.create_period(&MediaPeriodId::new(info.period_uid))?;
            }
        }
        if preparation.continue_loading_requested.replace(false) {
            period.continue_loading(0);
        }
        if preparation.prepared.get() {
            return period.track_groups();
        }
        period.maybe_throw_prepare_error()?;
        ticker.tick().await;
    }
}
