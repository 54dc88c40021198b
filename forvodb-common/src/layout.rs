//! Dump directory layout and validation
//!
//! A pronunciation dump is a root directory containing the metadata log,
//! a pre-rendered icon directory, the country mapping file, and
//! per-language/per-user audio subdirectories.

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Well-known file and directory names inside a dump root.
pub const METADATA_FILE: &str = "metadata.jsonl";
pub const ICONS_DIR: &str = "icons";
pub const COUNTRY_MAPPINGS_FILE: &str = "country_mappings.json";

/// Resolved paths inside one dump root directory.
#[derive(Debug, Clone)]
pub struct DumpLayout {
    root: PathBuf,
}

impl DumpLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The dump root. Audio files live directly under it as
    /// `{language}/{username}/{headword}{ext}`.
    pub fn audio_root(&self) -> &Path {
        &self.root
    }

    /// The newline-delimited metadata log.
    pub fn metadata_file(&self) -> PathBuf {
        self.root.join(METADATA_FILE)
    }

    /// Directory of pre-rendered composite icons.
    pub fn icons_dir(&self) -> PathBuf {
        self.root.join(ICONS_DIR)
    }

    /// Country name to ISO code mapping file.
    pub fn country_mappings_file(&self) -> PathBuf {
        self.root.join(COUNTRY_MAPPINGS_FILE)
    }

    /// Validate the layout before any store mutation.
    ///
    /// The root directory, metadata log, and icons directory are all
    /// required; a missing country mapping file is not fatal (the loader
    /// degrades to an empty mapping).
    pub fn validate(&self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(Error::NotFound(format!(
                "Root directory not found: {}",
                self.root.display()
            )));
        }

        let metadata = self.metadata_file();
        if !metadata.is_file() {
            return Err(Error::NotFound(format!(
                "Metadata file not found: {}",
                metadata.display()
            )));
        }

        let icons = self.icons_dir();
        if !icons.is_dir() {
            return Err(Error::NotFound(format!(
                "Icons directory not found: {}",
                icons.display()
            )));
        }

        Ok(())
    }
}
