//! Metadata log aggregation
//!
//! Streams the newline-delimited metadata log and folds usable records
//! into per-word groups. Memory is bounded by the number of distinct
//! (language, headword) keys, never by log length. Malformed lines are
//! counted and skipped; they never abort the run.

use crate::locate::AudioLocator;
use forvodb_common::records::{split_origin, AudioClip, MetadataLine, WordKey};
use forvodb_common::Result;
use std::collections::BTreeMap;
use std::io::BufRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Groups flush in key order, so output and batch boundaries are
/// reproducible across runs over the same input.
pub type WordGroups = BTreeMap<WordKey, Vec<AudioClip>>;

/// Lines between progress log messages.
const PROGRESS_INTERVAL: u64 = 10_000;

/// Per-run aggregation counters, reported in the final summary.
#[derive(Debug, Default, Clone)]
pub struct AggregateStats {
    pub lines_read: u64,
    pub accepted: u64,
    pub malformed: u64,
    pub missing_fields: u64,
    pub audio_missing: u64,
    pub interrupted: bool,
}

pub struct MetadataAggregator<'a> {
    locator: &'a AudioLocator,
}

impl<'a> MetadataAggregator<'a> {
    pub fn new(locator: &'a AudioLocator) -> Self {
        Self { locator }
    }

    /// Stream the log and build word groups.
    ///
    /// The cancellation token is polled once per line; on cancel the
    /// groups collected so far are returned with `interrupted` set so the
    /// caller can still commit them.
    pub fn aggregate<R: BufRead>(
        &self,
        reader: R,
        cancel: &CancellationToken,
    ) -> Result<(WordGroups, AggregateStats)> {
        let mut groups = WordGroups::new();
        let mut stats = AggregateStats::default();

        for line in reader.lines() {
            if cancel.is_cancelled() {
                info!("Aggregation cancelled after {} lines", stats.lines_read);
                stats.interrupted = true;
                break;
            }

            let line = line?;
            stats.lines_read += 1;
            if stats.lines_read % PROGRESS_INTERVAL == 0 {
                info!("Processed {} metadata entries...", stats.lines_read);
            }

            let entry: MetadataLine = match serde_json::from_str(line.trim()) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Error parsing JSON on line {}: {}", stats.lines_read, e);
                    stats.malformed += 1;
                    continue;
                }
            };

            if entry.language.is_empty() || entry.headword.is_empty() {
                debug!("Line {}: missing language or headword", stats.lines_read);
                stats.missing_fields += 1;
                continue;
            }

            let headword = corrected_headword(&entry);
            let (username, gender, country) = split_origin(&entry.origin);

            let Some(file_path) = self.locator.locate(&entry.language, &username, &headword)
            else {
                debug!(
                    "Audio file not found for {}/{}/{}",
                    entry.language, username, headword
                );
                stats.audio_missing += 1;
                continue;
            };

            let key = WordKey::new(entry.language.clone(), headword);
            groups.entry(key).or_default().push(AudioClip {
                username,
                gender,
                country,
                votes: entry.votes,
                file_path,
                download_url: entry.download_url,
                audio_id: entry.id,
            });
            stats.accepted += 1;
        }

        info!(
            "Collected {} valid audio entries from {} lines ({} unique words)",
            stats.accepted,
            stats.lines_read,
            groups.len()
        );
        Ok((groups, stats))
    }
}

/// The `query_word` field, when present and different from the stored
/// headword, carries the original percent-encoded query and wins after
/// decoding. A value that fails to decode is used as-is.
fn corrected_headword(entry: &MetadataLine) -> String {
    match &entry.query_word {
        Some(query) if query != &entry.headword => urlencoding::decode(query)
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| query.clone()),
        _ => entry.headword.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;

    fn audio_tree(files: &[&str]) -> (tempfile::TempDir, AudioLocator) {
        let dir = tempfile::tempdir().unwrap();
        for rel in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, b"audio").unwrap();
        }
        let locator = AudioLocator::new(dir.path());
        (dir, locator)
    }

    fn aggregate(log: &str, locator: &AudioLocator) -> (WordGroups, AggregateStats) {
        let aggregator = MetadataAggregator::new(locator);
        let cancel = CancellationToken::new();
        aggregator.aggregate(Cursor::new(log), &cancel).unwrap()
    }

    #[test]
    fn test_groups_by_language_and_headword() {
        let (_dir, locator) = audio_tree(&["en/alice/cat.opus", "en/bob/cat.mp3"]);
        let log = concat!(
            r#"{"language":"en","headword":"cat","origin":["alice","female","France"],"votes":5,"id":1}"#,
            "\n",
            r#"{"language":"en","headword":"cat","origin":["bob","male","Japan"],"votes":10,"id":2}"#,
            "\n",
        );

        let (groups, stats) = aggregate(log, &locator);
        assert_eq!(stats.accepted, 2);
        assert_eq!(groups.len(), 1);

        let clips = &groups[&WordKey::new("en", "cat")];
        assert_eq!(clips.len(), 2);
        // Arrival order within the group
        assert_eq!(clips[0].username, "alice");
        assert_eq!(clips[1].username, "bob");
    }

    #[test]
    fn test_malformed_line_skipped_not_fatal() {
        let (_dir, locator) = audio_tree(&["en/alice/cat.opus"]);
        let log = concat!(
            "{this is not json}\n",
            r#"{"language":"en","headword":"cat","origin":["alice","female","France"]}"#,
            "\n",
        );

        let (groups, stats) = aggregate(log, &locator);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.accepted, 1);
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_missing_language_or_headword_skipped() {
        let (_dir, locator) = audio_tree(&["en/alice/cat.opus"]);
        let log = concat!(
            r#"{"headword":"cat","origin":["alice"]}"#,
            "\n",
            r#"{"language":"en","origin":["alice"]}"#,
            "\n",
        );

        let (groups, stats) = aggregate(log, &locator);
        assert_eq!(stats.missing_fields, 2);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_query_word_corrects_headword() {
        let (_dir, locator) = audio_tree(&["de/erika/rün.mp3"]);
        let log = concat!(
            r#"{"language":"de","headword":"run","query_word":"r%C3%BCn","origin":["erika","female","Germany"]}"#,
            "\n",
        );

        let (groups, _stats) = aggregate(log, &locator);
        assert!(groups.contains_key(&WordKey::new("de", "rün")));
        assert!(!groups.contains_key(&WordKey::new("de", "run")));
    }

    #[test]
    fn test_short_origin_defaults() {
        let (_dir, locator) = audio_tree(&["en/carol/cat.ogg"]);
        let log = concat!(
            r#"{"language":"en","headword":"cat","origin":["carol"],"votes":2}"#,
            "\n",
        );

        let (groups, stats) = aggregate(log, &locator);
        assert_eq!(stats.accepted, 1);
        let clips = &groups[&WordKey::new("en", "cat")];
        assert_eq!(clips[0].username, "carol");
        assert_eq!(clips[0].gender, "");
        assert_eq!(clips[0].country, "");
    }

    #[test]
    fn test_missing_audio_file_drops_record() {
        let (_dir, locator) = audio_tree(&["en/alice/cat.opus"]);
        let log = concat!(
            r#"{"language":"en","headword":"cat","origin":["alice","female","France"]}"#,
            "\n",
            r#"{"language":"en","headword":"cat","origin":["ghost","male","Japan"]}"#,
            "\n",
        );

        let (groups, stats) = aggregate(log, &locator);
        assert_eq!(stats.audio_missing, 1);
        assert_eq!(groups[&WordKey::new("en", "cat")].len(), 1);
    }

    #[test]
    fn test_cancelled_before_start_reads_nothing() {
        let (_dir, locator) = audio_tree(&["en/alice/cat.opus"]);
        let aggregator = MetadataAggregator::new(&locator);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let log = r#"{"language":"en","headword":"cat","origin":["alice"]}"#;
        let (groups, stats) = aggregator
            .aggregate(Cursor::new(log), &cancel)
            .unwrap();
        assert!(stats.interrupted);
        assert_eq!(stats.lines_read, 0);
        assert!(groups.is_empty());
    }
}
