//! Country mapping loading
//!
//! The mapping file is a JSON array produced by the `forvodb-prep flags`
//! step. The core only consults `original_name` (lowercased key),
//! `iso_code`, and `flag_file`; entries that failed to resolve keep
//! `iso_code: null` and an `error` message for auditing.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// One resolved (or unresolved) country name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryMapping {
    pub original_name: String,
    #[serde(default)]
    pub normalized_name: String,
    #[serde(default)]
    pub iso_code: Option<String>,
    #[serde(default)]
    pub flag_file: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Load country mappings keyed by lowercased original name.
///
/// A missing or unparseable file degrades to an empty map: icon
/// resolution then fails for every record, but the run itself proceeds.
pub fn load_country_mappings(path: &Path) -> HashMap<String, CountryMapping> {
    match try_load(path) {
        Ok(map) => {
            info!("Loaded {} country mappings", map.len());
            map
        }
        Err(e) => {
            warn!(
                "Country mappings unavailable ({}): {}",
                path.display(),
                e
            );
            HashMap::new()
        }
    }
}

fn try_load(path: &Path) -> Result<HashMap<String, CountryMapping>> {
    let contents = std::fs::read_to_string(path)?;
    let mappings: Vec<CountryMapping> = serde_json::from_str(&contents)?;

    let mut lookup = HashMap::with_capacity(mappings.len());
    for mapping in mappings {
        lookup.insert(mapping.original_name.to_lowercase(), mapping);
    }
    Ok(lookup)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_keyed_by_lowercased_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("country_mappings.json");
        std::fs::write(
            &path,
            r#"[
                {"original_name": "France", "normalized_name": "france", "iso_code": "FR", "flag_file": "FR.svg", "error": null},
                {"original_name": "Atlantis", "normalized_name": "atlantis", "iso_code": null, "flag_file": null, "error": "Country not found in mapping"}
            ]"#,
        )
        .unwrap();

        let map = load_country_mappings(&path);
        assert_eq!(map.len(), 2);
        assert_eq!(map["france"].iso_code.as_deref(), Some("FR"));
        assert!(map["atlantis"].iso_code.is_none());
    }

    #[test]
    fn test_missing_file_degrades_to_empty() {
        let map = load_country_mappings(Path::new("/nonexistent/mappings.json"));
        assert!(map.is_empty());
    }

    #[test]
    fn test_malformed_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("country_mappings.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load_country_mappings(&path).is_empty());
    }
}
