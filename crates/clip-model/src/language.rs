//! Stream language tags.
//!
//! Blu-ray clip information stores languages as ISO 639-2 codes. Tokens are
//! accepted in the bibliographic (`fre`), terminology (`fra`) and two-letter
//! (`fr`) forms, case-insensitively.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Canonical language of an elementary stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    Arabic,
    Chinese,
    Czech,
    Danish,
    Dutch,
    English,
    Finnish,
    French,
    German,
    Greek,
    Hebrew,
    Hindi,
    Hungarian,
    Indonesian,
    Italian,
    Japanese,
    Korean,
    Norwegian,
    Polish,
    Portuguese,
    Russian,
    Spanish,
    Swedish,
    Thai,
    Turkish,
    Ukrainian,
    Vietnamese,
    /// Token did not match any known language.
    Invalid,
}

/// (language, ISO 639-2/B, ISO 639-2/T, ISO 639-1)
const LANGUAGE_CODES: &[(Language, &str, &str, &str)] = &[
    (Language::Arabic, "ara", "ara", "ar"),
    (Language::Chinese, "chi", "zho", "zh"),
    (Language::Czech, "cze", "ces", "cs"),
    (Language::Danish, "dan", "dan", "da"),
    (Language::Dutch, "dut", "nld", "nl"),
    (Language::English, "eng", "eng", "en"),
    (Language::Finnish, "fin", "fin", "fi"),
    (Language::French, "fre", "fra", "fr"),
    (Language::German, "ger", "deu", "de"),
    (Language::Greek, "gre", "ell", "el"),
    (Language::Hebrew, "heb", "heb", "he"),
    (Language::Hindi, "hin", "hin", "hi"),
    (Language::Hungarian, "hun", "hun", "hu"),
    (Language::Indonesian, "ind", "ind", "id"),
    (Language::Italian, "ita", "ita", "it"),
    (Language::Japanese, "jpn", "jpn", "ja"),
    (Language::Korean, "kor", "kor", "ko"),
    (Language::Norwegian, "nor", "nor", "no"),
    (Language::Polish, "pol", "pol", "pl"),
    (Language::Portuguese, "por", "por", "pt"),
    (Language::Russian, "rus", "rus", "ru"),
    (Language::Spanish, "spa", "spa", "es"),
    (Language::Swedish, "swe", "swe", "sv"),
    (Language::Thai, "tha", "tha", "th"),
    (Language::Turkish, "tur", "tur", "tr"),
    (Language::Ukrainian, "ukr", "ukr", "uk"),
    (Language::Vietnamese, "vie", "vie", "vi"),
];

impl Language {
    /// Every valid language, in code table order.
    pub fn all() -> impl Iterator<Item = Language> {
        LANGUAGE_CODES.iter().map(|(lang, ..)| *lang)
    }

    /// Map a language token to its canonical value.
    ///
    /// Unrecognized tokens yield [`Language::Invalid`].
    pub fn from_token(token: &str) -> Language {
        let token = token.trim().to_ascii_lowercase();
        LANGUAGE_CODES
            .iter()
            .find(|(_, bib, term, short)| token == *bib || token == *term || token == *short)
            .map(|(lang, ..)| *lang)
            .unwrap_or(Language::Invalid)
    }

    /// Map a locale identifier (`en_US.UTF-8`, `ja-JP`, `fr`) to a language.
    ///
    /// Only the primary subtag is considered. `C` and `POSIX` are invalid.
    pub fn from_locale(locale: &str) -> Language {
        let primary = locale
            .split(['_', '-', '.', '@'])
            .next()
            .unwrap_or_default();
        Self::from_token(primary)
    }

    /// ISO 639-2/B code as stored in clip information, or `und` for
    /// [`Language::Invalid`].
    pub fn code(self) -> &'static str {
        LANGUAGE_CODES
            .iter()
            .find(|(lang, ..)| *lang == self)
            .map(|(_, bib, ..)| *bib)
            .unwrap_or("und")
    }

    pub fn is_valid(self) -> bool {
        self != Language::Invalid
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        match Language::from_token(&token) {
            Language::Invalid => Err(serde::de::Error::custom(format!(
                "unknown language code: {token}"
            ))),
            lang => Ok(lang),
        }
    }
}
