//! Country mapping and flag download
//!
//! Second preparation step: map the free-text country names collected by
//! the origins step to ISO codes using the restcountries dataset, and
//! fetch a circle-flag SVG per mapped code. Downloads are best-effort:
//! one attempt per country, failures recorded in the mapping entry and
//! never retried.

use forvodb_common::country::CountryMapping;
use forvodb_common::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};
use unicode_normalization::UnicodeNormalization;

const FLAG_URL_BASE: &str = "https://hatscripts.github.io/circle-flags/flags";

/// The slice of the origin stats file this step reads.
#[derive(Debug, Deserialize)]
pub struct OriginCountries {
    #[serde(default)]
    pub unique_countries_origin: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CountryName {
    #[serde(default)]
    common: String,
    #[serde(default)]
    official: String,
}

/// One record of the restcountries dataset; only the naming fields are
/// consulted.
#[derive(Debug, Deserialize)]
struct CountryRecord {
    #[serde(default)]
    cca2: Option<String>,
    #[serde(default)]
    cca3: Option<String>,
    name: CountryName,
    #[serde(default, rename = "altSpellings")]
    alt_spellings: Vec<String>,
    #[serde(default)]
    translations: HashMap<String, CountryName>,
}

/// Fold a free-text country name to a lookup key: NFKD decomposition,
/// non-ASCII dropped, lowercased, trimmed.
pub fn normalize_country_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .nfkd()
        .filter(|c| c.is_ascii())
        .collect()
}

/// Build the normalized-name -> ISO-code index from the restcountries
/// records. Every known spelling of a country (common, official,
/// alternate, translated) maps to its cca2 code, falling back to cca3.
fn build_country_index(records: &[CountryRecord]) -> HashMap<String, String> {
    let mut index = HashMap::new();

    for record in records {
        let Some(code) = record.cca2.clone().or_else(|| record.cca3.clone()) else {
            continue;
        };

        let mut add = |name: &str| {
            if !name.is_empty() {
                index.insert(normalize_country_name(name), code.clone());
            }
        };

        add(&record.name.common);
        add(&record.name.official);
        for alt in &record.alt_spellings {
            add(alt);
        }
        for translation in record.translations.values() {
            add(&translation.common);
            add(&translation.official);
        }
    }

    index
}

/// Fetch one flag SVG into `flags_dir`, returning the stored filename.
async fn download_flag(
    client: &reqwest::Client,
    code: &str,
    flags_dir: &Path,
) -> std::result::Result<String, String> {
    let filename = format!("{}.svg", code);
    let url = format!("{}/{}.svg", FLAG_URL_BASE, code.to_lowercase());

    let response = client
        .get(&url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| e.to_string())?;
    let bytes = response.bytes().await.map_err(|e| e.to_string())?;

    std::fs::write(flags_dir.join(&filename), &bytes).map_err(|e| e.to_string())?;
    Ok(filename)
}

/// Run the flags step end to end.
pub async fn run(
    origins_file: &Path,
    countries_file: &Path,
    output: &Path,
    flags_dir: &Path,
) -> Result<()> {
    let stats: OriginCountries =
        serde_json::from_str(&std::fs::read_to_string(origins_file)?)?;
    let records: Vec<CountryRecord> =
        serde_json::from_str(&std::fs::read_to_string(countries_file)?)?;

    let index = build_country_index(&records);
    std::fs::create_dir_all(flags_dir)?;

    let client = reqwest::Client::new();
    let mut results = Vec::with_capacity(stats.unique_countries_origin.len());

    for country in &stats.unique_countries_origin {
        let normalized = normalize_country_name(country);

        let mapping = match index.get(&normalized) {
            Some(code) => match download_flag(&client, code, flags_dir).await {
                Ok(flag_file) => CountryMapping {
                    original_name: country.clone(),
                    normalized_name: normalized,
                    iso_code: Some(code.clone()),
                    flag_file: Some(flag_file),
                    error: None,
                },
                Err(e) => {
                    warn!("Flag download failed for {} ({}): {}", country, code, e);
                    CountryMapping {
                        original_name: country.clone(),
                        normalized_name: normalized,
                        iso_code: Some(code.clone()),
                        flag_file: None,
                        error: Some(e),
                    }
                }
            },
            None => CountryMapping {
                original_name: country.clone(),
                normalized_name: normalized,
                iso_code: None,
                flag_file: None,
                error: Some("Country not found in mapping".to_string()),
            },
        };
        results.push(mapping);
    }

    std::fs::write(output, serde_json::to_string_pretty(&results)?)?;

    let mapped = results.iter().filter(|r| r.iso_code.is_some()).count();
    let downloaded = results.iter().filter(|r| r.flag_file.is_some()).count();
    info!("Processed {} countries", results.len());
    info!("Successfully mapped: {}", mapped);
    info!("Flags downloaded: {}", downloaded);
    info!("Results saved to {}", output.display());
    info!("Flags saved to {}", flags_dir.display());

    Ok(())
}
