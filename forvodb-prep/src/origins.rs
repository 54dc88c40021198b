//! Origin statistics extraction
//!
//! First preparation step: scan the metadata log for one language and
//! collect the distinct contributor genders, countries, and
//! (gender, country) combinations. The downstream mapping and icon steps
//! work from this file instead of re-reading the full log.

use forvodb_common::records::MetadataLine;
use forvodb_common::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Lines between progress log messages.
const PROGRESS_INTERVAL: u64 = 100_000;

/// Distinct origin values for one language, kept sorted.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OriginStats {
    pub unique_genders_origin: BTreeSet<String>,
    pub unique_countries_origin: BTreeSet<String>,
    pub unique_combinations: BTreeSet<(String, String)>,
}

/// Scan the log, keeping entries of the requested language whose origin
/// carries the full contributor triple. Returns the stats and the number
/// of matching entries.
pub fn scan<R: BufRead>(reader: R, language: &str) -> Result<(OriginStats, u64)> {
    let mut stats = OriginStats::default();
    let mut processed = 0u64;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let entry: MetadataLine = match serde_json::from_str(line.trim()) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping invalid JSON line {}: {}", line_no + 1, e);
                continue;
            }
        };

        if entry.language != language {
            continue;
        }
        if entry.origin.len() < 3 {
            continue;
        }

        let gender = entry.origin[1].trim().to_string();
        let country = entry.origin[2].trim().to_string();

        stats.unique_genders_origin.insert(gender.clone());
        stats.unique_countries_origin.insert(country.clone());
        stats.unique_combinations.insert((gender, country));

        processed += 1;
        if processed % PROGRESS_INTERVAL == 0 {
            info!("Processed {} entries...", processed);
        }
    }

    Ok((stats, processed))
}

/// Run the origins step: scan `input` and write the stats file next to
/// the current directory as `{stem}_{language}_origin_stats.json`.
pub fn run(input: &Path, language: &str) -> Result<PathBuf> {
    let file = File::open(input)?;
    let (stats, processed) = scan(BufReader::new(file), language)?;

    info!("Finished processing. Total matching entries: {}", processed);
    info!("Unique genders: {}", stats.unique_genders_origin.len());
    info!("Unique countries: {}", stats.unique_countries_origin.len());
    info!("Unique combinations: {}", stats.unique_combinations.len());

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("metadata");
    let output = PathBuf::from(format!("{}_{}_origin_stats.json", stem, language));
    std::fs::write(&output, serde_json::to_string_pretty(&stats)?)?;

    info!("Results saved to: {}", output.display());
    Ok(output)
}
