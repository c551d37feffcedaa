//! Subtitle clip construction from raw command-line inputs.
//!
//! Validation runs completely before anything is built, in a fixed order:
//! language count, language tokens, video format, frame rate. The builder
//! touches neither the filesystem nor the network.

use std::path::PathBuf;
use std::time::Duration;

use crate::clip::{ClipDescriptor, EsEntry, EsGroup, EsTrack, ModelError};
use crate::format::{FrameRate, VideoFormat};
use crate::language::Language;

/// Builds a single-group presentation graphics clip.
#[derive(Debug, Clone)]
pub struct SubtitleClipBuilder {
    clip_id: u32,
    in_time_offset: Duration,
    default_language: String,
}

impl SubtitleClipBuilder {
    /// `default_language` is the token used for every subtitle when no
    /// languages are supplied (typically the caller's UI locale).
    pub fn new(default_language: impl Into<String>) -> Self {
        Self {
            clip_id: 0,
            in_time_offset: Duration::ZERO,
            default_language: default_language.into(),
        }
    }

    pub fn clip_id(mut self, clip_id: u32) -> Self {
        self.clip_id = clip_id;
        self
    }

    pub fn in_time_offset(mut self, offset: Duration) -> Self {
        self.in_time_offset = offset;
        self
    }

    /// Validate the inputs and build the clip descriptor.
    pub fn build(
        &self,
        subtitles: &[PathBuf],
        languages: &[String],
        video_format: &str,
        frame_rate: &str,
    ) -> Result<ClipDescriptor, BuildError> {
        if subtitles.is_empty() {
            return Err(BuildError::NoSubtitles);
        }
        if !languages.is_empty() && languages.len() != subtitles.len() {
            return Err(BuildError::LanguageCountMismatch {
                languages: languages.len(),
                subtitles: subtitles.len(),
            });
        }

        let resolved = if languages.is_empty() {
            let language = normalize_language(&self.default_language)?;
            vec![language; subtitles.len()]
        } else {
            languages
                .iter()
                .map(|token| normalize_language(token))
                .collect::<Result<Vec<_>, _>>()?
        };

        let format = VideoFormat::from_token(video_format);
        if !format.is_known() {
            return Err(BuildError::UnknownVideoFormat {
                token: video_format.to_string(),
            });
        }
        let rate = FrameRate::from_token(frame_rate);
        if !rate.is_known() {
            return Err(BuildError::UnknownFrameRate {
                token: frame_rate.to_string(),
            });
        }

        let mut group = EsGroup::new(Duration::ZERO);
        let mut tracks = Vec::with_capacity(subtitles.len());
        for (index, (path, language)) in subtitles.iter().zip(resolved).enumerate() {
            let stream_index =
                u16::try_from(index).map_err(|_| BuildError::TooManySubtitles {
                    count: subtitles.len(),
                })?;
            let track = EsTrack::subtitle(language, stream_index);
            group.insert(track, EsEntry::new(path.clone()))?;
            tracks.push(track);
        }

        let mut clip = ClipDescriptor::new(self.clip_id, self.in_time_offset, format, rate)?;
        let index = clip.add_group(group)?;
        for track in tracks {
            clip.add_track(index, track)?;
        }

        tracing::debug!(
            clip_id = clip.clip_id(),
            tracks = clip.tracks().len(),
            format = format.token(),
            frame_rate = rate.token(),
            "Built subtitle clip"
        );

        Ok(clip)
    }
}

fn normalize_language(token: &str) -> Result<Language, BuildError> {
    match Language::from_token(token) {
        Language::Invalid => Err(BuildError::InvalidLanguage {
            token: token.to_string(),
        }),
        language => Ok(language),
    }
}

/// Input validation failures. None of them has side effects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("At least one subtitle input is required")]
    NoSubtitles,

    #[error("Too many subtitle inputs: {count}")]
    TooManySubtitles { count: usize },

    #[error("Got {languages} language(s) for {subtitles} subtitle input(s)")]
    LanguageCountMismatch { languages: usize, subtitles: usize },

    #[error("Invalid language: {token}")]
    InvalidLanguage { token: String },

    #[error("Unknown video format: {token}")]
    UnknownVideoFormat { token: String },

    #[error("Unknown frame rate: {token}")]
    UnknownFrameRate { token: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    fn tokens(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_count_mismatch_checked_first() {
        let err = SubtitleClipBuilder::new("eng")
            .build(&paths(&["a.sup", "b.sup"]), &tokens(&["xyz"]), "bogus", "bogus")
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::LanguageCountMismatch {
                languages: 1,
                subtitles: 2
            }
        );
    }

    #[test]
    fn test_first_invalid_language_reported() {
        let err = SubtitleClipBuilder::new("eng")
            .build(
                &paths(&["a.sup", "b.sup", "c.sup"]),
                &tokens(&["eng", "klingon", "zzz"]),
                "1080p",
                "23.976",
            )
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::InvalidLanguage {
                token: "klingon".to_string()
            }
        );
    }

    #[test]
    fn test_language_checked_before_format() {
        let err = SubtitleClipBuilder::new("eng")
            .build(&paths(&["a.sup"]), &tokens(&["zzz"]), "bogus", "23.976")
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidLanguage { .. }));
    }

    #[test]
    fn test_unknown_format_and_rate() {
        let builder = SubtitleClipBuilder::new("eng");
        assert_eq!(
            builder
                .build(&paths(&["a.sup"]), &[], "2160p", "23.976")
                .unwrap_err(),
            BuildError::UnknownVideoFormat {
                token: "2160p".to_string()
            }
        );
        assert_eq!(
            builder
                .build(&paths(&["a.sup"]), &[], "1080p", "30")
                .unwrap_err(),
            BuildError::UnknownFrameRate {
                token: "30".to_string()
            }
        );
    }

    #[test]
    fn test_empty_subtitles_rejected() {
        assert_eq!(
            SubtitleClipBuilder::new("eng")
                .build(&[], &[], "1080p", "24")
                .unwrap_err(),
            BuildError::NoSubtitles
        );
    }

    #[test]
    fn test_invalid_default_language_only_matters_when_used() {
        let builder = SubtitleClipBuilder::new("C");
        assert!(builder
            .build(&paths(&["a.sup"]), &tokens(&["jpn"]), "1080p", "24")
            .is_ok());
        assert_eq!(
            builder
                .build(&paths(&["a.sup"]), &[], "1080p", "24")
                .unwrap_err(),
            BuildError::InvalidLanguage {
                token: "C".to_string()
            }
        );
    }

    #[test]
    fn test_builder_options_are_applied() {
        let clip = SubtitleClipBuilder::new("eng")
            .clip_id(3)
            .in_time_offset(Duration::from_secs(600))
            .build(&paths(&["a.sup"]), &[], "720p", "59.94")
            .unwrap();
        assert_eq!(clip.clip_id(), 3);
        assert_eq!(clip.in_time_offset(), Duration::from_secs(600));
        assert_eq!(clip.video_format(), VideoFormat::Vi720p);
        assert_eq!(clip.video_frame_rate(), FrameRate::Vi59);
        assert_eq!(clip.groups()[0].sync_offset, Duration::ZERO);
    }
}
