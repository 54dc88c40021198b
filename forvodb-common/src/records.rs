//! Metadata record types
//!
//! Records move through two stages: the raw per-line shape as it appears
//! in `metadata.jsonl` (every field optional, trusting nothing), and the
//! validated [`AudioClip`] that only exists once the audio file behind it
//! has been located on disk.

use serde::Deserialize;

/// One line of the metadata log, as logged by the dump exporter.
///
/// All fields are lenient: the exporter omits fields freely and the
/// aggregator is responsible for deciding what is usable.
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataLine {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub headword: String,
    /// Original percent-encoded query; when it differs from `headword`
    /// the decoded query is the authoritative headword.
    #[serde(default)]
    pub query_word: Option<String>,
    /// Positional contributor triple: username, gender, country.
    /// May be shorter; extra elements are ignored.
    #[serde(default)]
    pub origin: Vec<String>,
    #[serde(default)]
    pub votes: i64,
    #[serde(default)]
    pub download_url: String,
    #[serde(default)]
    pub id: i64,
}

/// Positional fallback for the `origin` field.
///
/// length 0: all defaults; 1: username only; 2: username + gender;
/// >= 3: full triple, extras ignored. The username default is
/// `"unknown"`, gender and country default to empty.
pub fn split_origin(origin: &[String]) -> (String, String, String) {
    let username = origin
        .first()
        .cloned()
        .unwrap_or_else(|| "unknown".to_string());
    let gender = origin.get(1).cloned().unwrap_or_default();
    let country = origin.get(2).cloned().unwrap_or_default();
    (username, gender, country)
}

/// A pronunciation recording whose audio file exists on disk.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub username: String,
    /// Free-text gender label; `"male"` / `"female"` select a badge,
    /// anything else renders without one.
    pub gender: String,
    /// Free-text country name, resolved via the country mapping.
    pub country: String,
    pub votes: i64,
    /// Path relative to the dump root.
    pub file_path: String,
    pub download_url: String,
    pub audio_id: i64,
}

/// Grouping key for aggregation; `Ord` so groups flush in a stable order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WordKey {
    pub language: String,
    pub headword: String,
}

impl WordKey {
    pub fn new(language: impl Into<String>, headword: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            headword: headword.into(),
        }
    }
}
