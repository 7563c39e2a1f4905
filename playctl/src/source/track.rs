//! Track groups exposed by a prepared period

use crate::format::Format;
use serde::Serialize;

/// Group of tracks carrying the same content in different formats
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackGroup {
    formats: Vec<Format>,
}

impl TrackGroup {
    pub fn new(formats: Vec<Format>) -> Self {
        Self { formats }
    }

    /// Number of tracks in the group
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    pub fn format(&self, index: usize) -> Option<&Format> {
        self.formats.get(index)
    }

    pub fn formats(&self) -> &[Format] {
        &self.formats
    }

    /// Index of the track with the given format
    pub fn index_of(&self, format: &Format) -> Option<usize> {
        self.formats.iter().position(|f| f == format)
    }
}

/// Ordered collection of track groups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrackGroupArray {
    groups: Vec<TrackGroup>,
}

impl TrackGroupArray {
    pub fn new(groups: Vec<TrackGroup>) -> Self {
        Self { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TrackGroup> {
        self.groups.get(index)
    }

    pub fn index_of(&self, group: &TrackGroup) -> Option<usize> {
        self.groups.iter().position(|g| g == group)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackGroup> {
        self.groups.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_lookup() {
        let aac = Format::with_mime_type("audio/mp4a-latm");
        let opus = Format::with_mime_type("audio/opus");
        let group = TrackGroup::new(vec![aac.clone(), opus.clone()]);

        assert_eq!(group.len(), 2);
        assert_eq!(group.index_of(&opus), Some(1));
        assert_eq!(group.format(0), Some(&aac));
        assert_eq!(group.format(2), None);

        let groups = TrackGroupArray::new(vec![group.clone()]);
        assert_eq!(groups.index_of(&group), Some(0));
        assert!(TrackGroupArray::default().is_empty());
    }
}
