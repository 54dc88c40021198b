//! Title and description generation
//!
//! Final preparation step: resolve a language code against the language
//! name table and write the static title/description files that ship
//! with a packaged dictionary.

use forvodb_common::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Generate `title.html` and `description.html` in `output_dir`.
pub fn run(language_code: &str, languages_file: &Path, output_dir: &Path) -> Result<()> {
    let contents = fs::read_to_string(languages_file)?;
    let languages: HashMap<String, String> = serde_json::from_str(&contents)?;

    let language = languages.get(language_code).ok_or_else(|| {
        Error::NotFound(format!(
            "Language code '{}' not found in {}",
            language_code,
            languages_file.display()
        ))
    })?;

    let title = format!("Forvo {}", language);
    let description = format!("All Forvo {} audios uploaded until 2021.", language);

    fs::create_dir_all(output_dir)?;
    fs::write(output_dir.join("title.html"), &title)?;
    fs::write(output_dir.join("description.html"), &description)?;

    info!("Generated:");
    info!("  - title.html: {}", title);
    info!("  - description.html: {}", description);
    Ok(())
}
