//! Icon resolution
//!
//! Maps a contributor's gender and country to a pre-rendered composite
//! icon file. Pure lookup: filesystem existence checks only, no mutation.

use forvodb_common::country::CountryMapping;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

pub struct IconResolver {
    icons_dir: PathBuf,
    countries: HashMap<String, CountryMapping>,
}

impl IconResolver {
    pub fn new(icons_dir: PathBuf, countries: HashMap<String, CountryMapping>) -> Self {
        Self {
            icons_dir,
            countries,
        }
    }

    /// Resolve to an icon path relative to the dump root.
    ///
    /// Gender is normalized to `male` / `female`; any other label renders
    /// without a badge. Candidate filenames are tried in strict priority
    /// order: gender-specific composite, neutral composite, bare flag.
    /// A miss is not an error for the caller; the record is simply not
    /// rendered.
    pub fn resolve(&self, gender: &str, country: &str) -> Option<String> {
        let gender_lower = gender.to_lowercase();
        let gender_prefix = match gender_lower.as_str() {
            "male" | "female" => format!("{}_", gender_lower),
            _ => String::new(),
        };

        let Some(mapping) = self.countries.get(&country.to_lowercase()) else {
            debug!("Country mapping not found for: {}", country);
            return None;
        };
        let Some(iso_code) = mapping.iso_code.as_deref() else {
            debug!("Country has no ISO code: {}", country);
            return None;
        };

        let candidates = [
            format!("{}{}.svg", gender_prefix, iso_code),
            format!("_{}.svg", iso_code),
            format!("{}.svg", iso_code),
        ];

        for candidate in candidates {
            if self.icons_dir.join(&candidate).exists() {
                return Some(format!("icons/{}", candidate));
            }
        }

        debug!("Icon not found for {}_{} (ISO: {})", gender, country, iso_code);
        None
    }
}
