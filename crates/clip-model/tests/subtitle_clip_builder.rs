use std::path::PathBuf;

use bdclip_clip_model::{
    BuildError, CodingType, FrameRate, Language, SubtitleClipBuilder, VideoFormat,
};
use proptest::prelude::*;

fn subtitle_paths(count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| PathBuf::from(format!("/subs/track{i}.sup")))
        .collect()
}

#[test]
fn distinct_languages_produce_one_track_per_input_in_order() {
    let subtitles = subtitle_paths(3);
    let languages = vec!["jpn".to_string(), "en".to_string(), "fra".to_string()];

    let clip = SubtitleClipBuilder::new("eng")
        .build(&subtitles, &languages, "1080p", "23.976")
        .expect("valid inputs should build");

    assert_eq!(clip.video_format(), VideoFormat::Vi1080p);
    assert_eq!(clip.video_frame_rate(), FrameRate::Vi23);
    assert_eq!(clip.groups().len(), 1);
    assert_eq!(clip.groups()[0].len(), 3);
    assert_eq!(clip.tracks().len(), 3);

    let expected = [Language::Japanese, Language::English, Language::French];
    for (i, descriptor) in clip.tracks().iter().enumerate() {
        assert_eq!(descriptor.group, 0);
        assert_eq!(descriptor.track.coding_type, CodingType::PresentationGraphics);
        assert_eq!(descriptor.track.language, expected[i]);
        assert_eq!(
            clip.entry_for(descriptor).map(|e| e.source.clone()),
            Some(subtitles[i].clone())
        );
    }
    assert!(clip.validate().is_ok());
}

#[test]
fn empty_language_list_uses_default_for_every_track() {
    let subtitles = subtitle_paths(4);
    let clip = SubtitleClipBuilder::new(Language::from_locale("de_DE.UTF-8").code())
        .build(&subtitles, &[], "1080i", "29.97")
        .expect("default language should apply");

    assert_eq!(clip.tracks().len(), 4);
    assert_eq!(clip.groups()[0].len(), 4);
    assert!(clip
        .tracks()
        .iter()
        .all(|d| d.track.language == Language::German));
    let sources: Vec<_> = clip.sources().map(|p| p.to_path_buf()).collect();
    assert_eq!(sources, subtitles);
}

proptest! {
    #[test]
    fn mismatched_language_count_always_fails(n in 1usize..8, m in 1usize..8) {
        prop_assume!(n != m);
        let languages = vec!["eng".to_string(); m];
        let result = SubtitleClipBuilder::new("eng")
            .build(&subtitle_paths(n), &languages, "1080p", "24");
        prop_assert_eq!(
            result.unwrap_err(),
            BuildError::LanguageCountMismatch { languages: m, subtitles: n }
        );
    }

    #[test]
    fn every_built_track_has_exactly_one_entry(n in 1usize..16) {
        let clip = SubtitleClipBuilder::new("jpn")
            .build(&subtitle_paths(n), &[], "720p", "50")
            .unwrap();
        prop_assert_eq!(clip.tracks().len(), n);
        for descriptor in clip.tracks() {
            let owners = clip
                .groups()
                .iter()
                .filter(|g| g.contains(&descriptor.track))
                .count();
            prop_assert_eq!(owners, 1);
        }
    }
}
