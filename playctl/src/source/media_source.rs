//! Media source abstraction

use crate::error::LoadError;
use crate::source::allocator::SharedAllocator;
use crate::source::period::{MediaPeriod, MediaPeriodId};
use playctl_common::time::TIME_UNSET;
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

/// Timeline information a source reports once it has been refreshed
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    /// Uid of the first period in the timeline
    pub period_uid: Uuid,
    /// Period duration, or `TIME_UNSET` if unknown
    pub duration_us: i64,
    pub is_seekable: bool,
    pub is_live: bool,
}

impl SourceInfo {
    pub fn new(period_uid: Uuid) -> Self {
        Self {
            period_uid,
            duration_us: TIME_UNSET,
            is_seekable: false,
            is_live: false,
        }
    }
}

/// Receives timeline updates from a source being prepared
pub trait SourceCaller {
    fn on_source_info_refreshed(&self, info: &SourceInfo);
}

/// Provides media periods for a piece of media
pub trait MediaSource {
    /// Start preparing the source; `caller` receives timeline updates
    fn prepare_source(&mut self, caller: Rc<dyn SourceCaller>);

    /// Return a pending error from refreshing source info without consuming it
    fn maybe_throw_source_info_refresh_error(&self) -> Result<(), LoadError>;

    /// Create the period identified by `id`, starting at `start_position_us`
    fn create_period(
        &mut self,
        id: &MediaPeriodId,
        allocator: SharedAllocator,
        start_position_us: i64,
    ) -> Box<dyn MediaPeriod>;

    /// Take back a period created by [`MediaSource::create_period`]
    fn release_period(&mut self, period: Box<dyn MediaPeriod>);

    /// Release the source; no further timeline updates are delivered
    fn release_source(&mut self);
}

pub type SharedMediaSource = Rc<RefCell<dyn MediaSource>>;
