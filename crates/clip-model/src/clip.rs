//! Clip descriptor types.
//!
//! A clip is the unit the compiling service turns into one `.m2ts` stream
//! and its `.clpi` clip information. It owns an ordered list of
//! synchronization groups, each mapping track identities to source files,
//! plus a clip-level track list that fixes stream order.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::format::{FrameRate, VideoFormat};
use crate::language::Language;

/// Elementary stream coding type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodingType {
    /// Presentation graphics (PGS) subtitles.
    PresentationGraphics,
}

impl CodingType {
    /// `stream_coding_type` value in clip information.
    pub fn code(self) -> u8 {
        match self {
            CodingType::PresentationGraphics => 0x90,
        }
    }

    /// First transport stream PID of this coding type's range.
    pub fn base_pid(self) -> u16 {
        match self {
            CodingType::PresentationGraphics => 0x1200,
        }
    }
}

/// Identity of one elementary stream.
///
/// `stream_index` numbers streams of the same coding type within a clip, so
/// two subtitles sharing a language are still separate tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EsTrack {
    pub coding_type: CodingType,
    pub language: Language,
    pub stream_index: u16,
}

impl EsTrack {
    pub fn new(coding_type: CodingType, language: Language, stream_index: u16) -> Self {
        Self {
            coding_type,
            language,
            stream_index,
        }
    }

    /// Presentation graphics subtitle track.
    pub fn subtitle(language: Language, stream_index: u16) -> Self {
        Self::new(CodingType::PresentationGraphics, language, stream_index)
    }

    /// Transport stream PID the compiler assigns to this track.
    pub fn pid(&self) -> u16 {
        self.coding_type.base_pid().saturating_add(self.stream_index)
    }
}

impl fmt::Display for EsTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}#{}[{}]",
            self.coding_type, self.stream_index, self.language
        )
    }
}

/// Source binding for one track. The file is only read, never owned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EsEntry {
    pub source: PathBuf,
}

impl EsEntry {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// A synchronization group of elementary streams sharing a timing offset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EsGroup {
    /// Offset applied to every entry in the group.
    pub sync_offset: Duration,

    #[serde(with = "entry_list")]
    entries: BTreeMap<EsTrack, EsEntry>,
}

impl EsGroup {
    pub fn new(sync_offset: Duration) -> Self {
        Self {
            sync_offset,
            entries: BTreeMap::new(),
        }
    }

    /// Bind a track to its source. A track may appear only once per group.
    pub fn insert(&mut self, track: EsTrack, entry: EsEntry) -> Result<(), ModelError> {
        if !track.language.is_valid() {
            return Err(ModelError::InvalidLanguage { track });
        }
        if self.entries.contains_key(&track) {
            return Err(ModelError::DuplicateTrack { track });
        }
        self.entries.insert(track, entry);
        Ok(())
    }

    pub fn get(&self, track: &EsTrack) -> Option<&EsEntry> {
        self.entries.get(track)
    }

    pub fn contains(&self, track: &EsTrack) -> bool {
        self.entries.contains_key(track)
    }

    pub fn entries(&self) -> &BTreeMap<EsTrack, EsEntry> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Clip-level record of a track's participation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EsTrackDescriptor {
    /// Index of the owning group in [`ClipDescriptor::groups`].
    pub group: usize,
    pub track: EsTrack,
}

/// Description of one compilable output clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipDescriptor {
    clip_id: u32,
    in_time_offset: Duration,
    video_format: VideoFormat,
    video_frame_rate: FrameRate,
    groups: Vec<EsGroup>,
    tracks: Vec<EsTrackDescriptor>,
}

impl ClipDescriptor {
    /// Create an empty clip. Format and frame rate must both be known.
    pub fn new(
        clip_id: u32,
        in_time_offset: Duration,
        video_format: VideoFormat,
        video_frame_rate: FrameRate,
    ) -> Result<Self, ModelError> {
        if !video_format.is_known() {
            return Err(ModelError::UnknownVideoFormat);
        }
        if !video_frame_rate.is_known() {
            return Err(ModelError::UnknownFrameRate);
        }
        Ok(Self {
            clip_id,
            in_time_offset,
            video_format,
            video_frame_rate,
            groups: vec![],
            tracks: vec![],
        })
    }

    /// Append a group, returning its index.
    ///
    /// Tracks already present in another group are rejected.
    pub fn add_group(&mut self, group: EsGroup) -> Result<usize, ModelError> {
        if let Some(track) = group
            .entries
            .keys()
            .find(|track| self.groups.iter().any(|g| g.contains(track)))
        {
            return Err(ModelError::TrackInMultipleGroups { track: *track });
        }
        self.groups.push(group);
        Ok(self.groups.len() - 1)
    }

    /// Declare a track at clip level. It must already have an entry in `group`.
    pub fn add_track(&mut self, group: usize, track: EsTrack) -> Result<(), ModelError> {
        let owner = self
            .groups
            .get(group)
            .ok_or(ModelError::MissingGroup { index: group })?;
        if !owner.contains(&track) {
            return Err(ModelError::MissingEntry { track });
        }
        if self.tracks.iter().any(|d| d.track == track) {
            return Err(ModelError::DuplicateTrack { track });
        }
        self.tracks.push(EsTrackDescriptor { group, track });
        Ok(())
    }

    /// Check every structural invariant. Useful for descriptors that did
    /// not come through the mutating API (e.g. deserialized ones).
    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.video_format.is_known() {
            return Err(ModelError::UnknownVideoFormat);
        }
        if !self.video_frame_rate.is_known() {
            return Err(ModelError::UnknownFrameRate);
        }

        for (i, descriptor) in self.tracks.iter().enumerate() {
            let track = descriptor.track;
            if self.tracks[..i].iter().any(|d| d.track == track) {
                return Err(ModelError::DuplicateTrack { track });
            }
            let owner = self
                .groups
                .get(descriptor.group)
                .ok_or(ModelError::MissingGroup {
                    index: descriptor.group,
                })?;
            if !owner.contains(&track) {
                return Err(ModelError::MissingEntry { track });
            }
            if self.groups.iter().filter(|g| g.contains(&track)).count() > 1 {
                return Err(ModelError::TrackInMultipleGroups { track });
            }
            if !track.language.is_valid() {
                return Err(ModelError::InvalidLanguage { track });
            }
        }

        Ok(())
    }

    pub fn clip_id(&self) -> u32 {
        self.clip_id
    }

    pub fn in_time_offset(&self) -> Duration {
        self.in_time_offset
    }

    pub fn video_format(&self) -> VideoFormat {
        self.video_format
    }

    pub fn video_frame_rate(&self) -> FrameRate {
        self.video_frame_rate
    }

    pub fn groups(&self) -> &[EsGroup] {
        &self.groups
    }

    pub fn tracks(&self) -> &[EsTrackDescriptor] {
        &self.tracks
    }

    /// Source entry for a declared track.
    pub fn entry_for(&self, descriptor: &EsTrackDescriptor) -> Option<&EsEntry> {
        self.groups
            .get(descriptor.group)
            .and_then(|g| g.get(&descriptor.track))
    }

    /// Iterate all source files in clip track order.
    pub fn sources(&self) -> impl Iterator<Item = &Path> {
        self.tracks
            .iter()
            .filter_map(|d| self.entry_for(d))
            .map(|e| e.source.as_path())
    }

    /// Stream file name inside the compiler's `STREAM` directory.
    pub fn stream_file_name(&self) -> String {
        format!("{:05}.m2ts", self.clip_id)
    }

    /// Clip information file name inside the compiler's `CLIPINF` directory.
    pub fn clip_info_file_name(&self) -> String {
        format!("{:05}.clpi", self.clip_id)
    }
}

/// Violations of clip descriptor invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Video format must be known")]
    UnknownVideoFormat,

    #[error("Video frame rate must be known")]
    UnknownFrameRate,

    #[error("Track {track} has an invalid language")]
    InvalidLanguage { track: EsTrack },

    #[error("Duplicate track {track}")]
    DuplicateTrack { track: EsTrack },

    #[error("No group at index {index}")]
    MissingGroup { index: usize },

    #[error("Track {track} has no entry in its group")]
    MissingEntry { track: EsTrack },

    #[error("Track {track} appears in more than one group")]
    TrackInMultipleGroups { track: EsTrack },
}

/// Entry maps serialize as a list since JSON keys must be strings.
mod entry_list {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{EsEntry, EsTrack};

    #[derive(Serialize, Deserialize)]
    struct Record {
        track: EsTrack,
        #[serde(flatten)]
        entry: EsEntry,
    }

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<EsTrack, EsEntry>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(map.iter().map(|(track, entry)| Record {
            track: *track,
            entry: entry.clone(),
        }))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<EsTrack, EsEntry>, D::Error> {
        let records = Vec::<Record>::deserialize(deserializer)?;
        let mut map = BTreeMap::new();
        for record in records {
            if map.insert(record.track, record.entry).is_some() {
                return Err(D::Error::custom(format!(
                    "duplicate track {}",
                    record.track
                )));
            }
        }
        Ok(map)
    }
}
