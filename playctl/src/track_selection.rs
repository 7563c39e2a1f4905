//! Track selections handed to media periods
//!
//! Scoring which tracks to play happens elsewhere; this module only holds the
//! resulting selections and turns selection definitions into selection
//! objects.

use crate::format::Format;
use crate::source::TrackGroup;
use tracing::debug;

/// Why a track was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionReason {
    #[default]
    Unknown,
    Initial,
    Manual,
    Adaptive,
    Trickplay,
    Custom(u32),
}

/// Selection of one or more tracks from a single [`TrackGroup`]
pub trait TrackSelection {
    fn group(&self) -> &TrackGroup;

    /// Number of selected tracks
    fn length(&self) -> usize;

    /// Group index of the `index`-th selected track
    fn index_in_track_group(&self, index: usize) -> Option<usize>;

    /// Group index of the track currently playing
    fn selected_index_in_track_group(&self) -> usize;

    fn selected_format(&self) -> Option<&Format> {
        self.group().format(self.selected_index_in_track_group())
    }

    fn selection_reason(&self) -> SelectionReason;
}

/// Tracks of one group a selection should be made from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSelectionDefinition {
    pub group: TrackGroup,
    /// Indices into `group`
    pub tracks: Vec<usize>,
    pub reason: SelectionReason,
}

impl TrackSelectionDefinition {
    pub fn new(group: TrackGroup, tracks: Vec<usize>) -> Self {
        Self {
            group,
            tracks,
            reason: SelectionReason::Unknown,
        }
    }
}

/// Selection of exactly one track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedTrackSelection {
    group: TrackGroup,
    track: usize,
    reason: SelectionReason,
}

impl FixedTrackSelection {
    pub fn new(group: TrackGroup, track: usize, reason: SelectionReason) -> Self {
        Self {
            group,
            track,
            reason,
        }
    }
}

impl TrackSelection for FixedTrackSelection {
    fn group(&self) -> &TrackGroup {
        &self.group
    }

    fn length(&self) -> usize {
        1
    }

    fn index_in_track_group(&self, index: usize) -> Option<usize> {
        (index == 0).then_some(self.track)
    }

    fn selected_index_in_track_group(&self) -> usize {
        self.track
    }

    fn selection_reason(&self) -> SelectionReason {
        self.reason
    }
}

/// Create one selection per definition
///
/// The first definition with more than one track gets an adaptive selection
/// from `adaptive_factory`; every other non-empty definition gets a
/// [`FixedTrackSelection`] of its first track. Missing or empty definitions
/// yield `None`.
pub fn create_track_selections_for_definitions<F>(
    definitions: &[Option<TrackSelectionDefinition>],
    mut adaptive_factory: F,
) -> Vec<Option<Box<dyn TrackSelection>>>
where
    F: FnMut(&TrackSelectionDefinition) -> Box<dyn TrackSelection>,
{
    let mut created_adaptive = false;
    definitions
        .iter()
        .enumerate()
        .map(|(renderer, definition)| {
            let definition = definition.as_ref()?;
            let first = *definition.tracks.first()?;
            if definition.tracks.len() > 1 && !created_adaptive {
                created_adaptive = true;
                debug!(
                    "Adaptive selection of {} tracks for renderer {}",
                    definition.tracks.len(),
                    renderer
                );
                return Some(adaptive_factory(definition));
            }
            let fixed: Box<dyn TrackSelection> = Box::new(FixedTrackSelection::new(
                definition.group.clone(),
                first,
                definition.reason,
            ));
            Some(fixed)
        })
        .collect()
}
