//! Video format and frame rate enumerations.
//!
//! Both are closed sets taken from the Blu-ray clip information format.
//! Tokens outside the set map to `Unknown`.

use serde::{Deserialize, Serialize};

/// Video format of the clip's muxing profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoFormat {
    #[serde(rename = "480i")]
    Vi480i,
    #[serde(rename = "576i")]
    Vi576i,
    #[serde(rename = "480p")]
    Vi480p,
    #[serde(rename = "1080i")]
    Vi1080i,
    #[serde(rename = "720p")]
    Vi720p,
    #[serde(rename = "1080p")]
    Vi1080p,
    #[serde(rename = "576p")]
    Vi576p,
    #[serde(rename = "unknown")]
    Unknown,
}

/// Video frame rate of the clip's muxing profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameRate {
    /// 24000/1001
    #[serde(rename = "23.976")]
    Vi23,
    #[serde(rename = "24")]
    Vi24,
    #[serde(rename = "25")]
    Vi25,
    /// 30000/1001
    #[serde(rename = "29.97")]
    Vi29,
    #[serde(rename = "50")]
    Vi50,
    /// 60000/1001
    #[serde(rename = "59.94")]
    Vi59,
    #[serde(rename = "unknown")]
    Unknown,
}

const VIDEO_FORMATS: &[(VideoFormat, &str, u8)] = &[
    (VideoFormat::Vi480i, "480i", 1),
    (VideoFormat::Vi576i, "576i", 2),
    (VideoFormat::Vi480p, "480p", 3),
    (VideoFormat::Vi1080i, "1080i", 4),
    (VideoFormat::Vi720p, "720p", 5),
    (VideoFormat::Vi1080p, "1080p", 6),
    (VideoFormat::Vi576p, "576p", 7),
];

const FRAME_RATES: &[(FrameRate, &str, u8)] = &[
    (FrameRate::Vi23, "23.976", 1),
    (FrameRate::Vi24, "24", 2),
    (FrameRate::Vi25, "25", 3),
    (FrameRate::Vi29, "29.97", 4),
    (FrameRate::Vi50, "50", 6),
    (FrameRate::Vi59, "59.94", 7),
];

/// Zero-padded spellings accepted in addition to the canonical tokens.
const FRAME_RATE_ALIASES: &[(&str, FrameRate)] =
    &[("29.970", FrameRate::Vi29), ("59.940", FrameRate::Vi59)];

impl VideoFormat {
    /// Every known format (excludes `Unknown`).
    pub fn all() -> impl Iterator<Item = VideoFormat> {
        VIDEO_FORMATS.iter().map(|(f, ..)| *f)
    }

    /// Map a token such as `1080p` to a format, or `Unknown`.
    ///
    /// Matching is exact: no trimming or case folding.
    pub fn from_token(token: &str) -> VideoFormat {
        VIDEO_FORMATS
            .iter()
            .find(|(_, name, _)| token == *name)
            .map(|(f, ..)| *f)
            .unwrap_or(VideoFormat::Unknown)
    }

    /// Canonical token.
    pub fn token(self) -> &'static str {
        VIDEO_FORMATS
            .iter()
            .find(|(f, ..)| *f == self)
            .map(|(_, name, _)| *name)
            .unwrap_or("unknown")
    }

    /// `video_format` field value in clip information (0 for `Unknown`).
    pub fn code(self) -> u8 {
        VIDEO_FORMATS
            .iter()
            .find(|(f, ..)| *f == self)
            .map(|(.., code)| *code)
            .unwrap_or(0)
    }

    pub fn is_known(self) -> bool {
        self != VideoFormat::Unknown
    }
}

impl FrameRate {
    /// Every known frame rate (excludes `Unknown`).
    pub fn all() -> impl Iterator<Item = FrameRate> {
        FRAME_RATES.iter().map(|(r, ..)| *r)
    }

    /// Map a token such as `23.976` to a frame rate, or `Unknown`.
    ///
    /// Matching is exact, as for [`VideoFormat::from_token`].
    pub fn from_token(token: &str) -> FrameRate {
        FRAME_RATES
            .iter()
            .find(|(_, name, _)| token == *name)
            .map(|(r, ..)| *r)
            .or_else(|| {
                FRAME_RATE_ALIASES
                    .iter()
                    .find(|(alias, _)| token == *alias)
                    .map(|(_, r)| *r)
            })
            .unwrap_or(FrameRate::Unknown)
    }

    /// Canonical token.
    pub fn token(self) -> &'static str {
        FRAME_RATES
            .iter()
            .find(|(r, ..)| *r == self)
            .map(|(_, name, _)| *name)
            .unwrap_or("unknown")
    }

    /// `frame_rate` field value in clip information (0 for `Unknown`).
    pub fn code(self) -> u8 {
        FRAME_RATES
            .iter()
            .find(|(r, ..)| *r == self)
            .map(|(.., code)| *code)
            .unwrap_or(0)
    }

    pub fn is_known(self) -> bool {
        self != FrameRate::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_documented_format_tokens() {
        assert_eq!(VideoFormat::from_token("1080p"), VideoFormat::Vi1080p);
        assert_eq!(VideoFormat::from_token("1080i"), VideoFormat::Vi1080i);
        assert_eq!(VideoFormat::from_token("720p"), VideoFormat::Vi720p);
        assert_eq!(VideoFormat::from_token("576i"), VideoFormat::Vi576i);
    }

    #[test]
    fn test_documented_frame_rate_tokens() {
        assert_eq!(FrameRate::from_token("23.976"), FrameRate::Vi23);
        assert_eq!(FrameRate::from_token("24"), FrameRate::Vi24);
        assert_eq!(FrameRate::from_token("29.97"), FrameRate::Vi29);
        assert_eq!(FrameRate::from_token("59.94"), FrameRate::Vi59);
        assert_eq!(FrameRate::from_token("29.970"), FrameRate::Vi29);
        assert_eq!(FrameRate::from_token("59.940"), FrameRate::Vi59);
    }

    #[test]
    fn test_out_of_set_tokens_are_unknown() {
        for token in ["", "4k", "1080", "2160p", "unknown", "720P", " 1080p "] {
            assert_eq!(VideoFormat::from_token(token), VideoFormat::Unknown);
        }
        for token in ["", "30", "60", "23.98", "unknown", " 24 ", "29.97\n"] {
            assert_eq!(FrameRate::from_token(token), FrameRate::Unknown);
        }
    }

    #[test]
    fn test_tokens_resolve_back() {
        for format in VideoFormat::all() {
            assert_eq!(VideoFormat::from_token(format.token()), format);
            assert!(format.code() > 0);
        }
        for rate in FrameRate::all() {
            assert_eq!(FrameRate::from_token(rate.token()), rate);
            assert!(rate.code() > 0);
        }
        assert_eq!(FrameRate::Vi50.code(), 6);
        assert_eq!(VideoFormat::Unknown.code(), 0);
    }

    #[test]
    fn test_serde_uses_tokens() {
        assert_eq!(
            serde_json::to_string(&VideoFormat::Vi1080p).unwrap(),
            "\"1080p\""
        );
        assert_eq!(serde_json::to_string(&FrameRate::Vi23).unwrap(), "\"23.976\"");
    }

    proptest! {
        #[test]
        fn prop_format_is_known_only_for_closed_set(token in ".{0,10}") {
            let format = VideoFormat::from_token(&token);
            let expected = VideoFormat::all().any(|f| f.token() == token);
            prop_assert_eq!(format.is_known(), expected);
        }

        #[test]
        fn prop_frame_rate_is_known_only_for_closed_set(token in "[0-9.]{0,7}") {
            let rate = FrameRate::from_token(&token);
            let expected = FrameRate::all().any(|r| r.token() == token)
                || FRAME_RATE_ALIASES.iter().any(|(alias, _)| *alias == token);
            prop_assert_eq!(rate.is_known(), expected);
        }
    }
}
