//! Audio file location
//!
//! Recordings live at `{root}/{language}/{username}/{headword}{ext}`.
//! The headword must already be URL-decoded by the caller.

use std::path::PathBuf;

/// Accepted audio extensions, in lookup priority order.
pub const AUDIO_EXTENSIONS: [&str; 3] = [".opus", ".mp3", ".ogg"];

pub struct AudioLocator {
    root: PathBuf,
}

impl AudioLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Return the first existing recording path, relative to the dump
    /// root, or None when the contributor's file is absent under every
    /// accepted extension.
    pub fn locate(&self, language: &str, username: &str, headword: &str) -> Option<String> {
        for ext in AUDIO_EXTENSIONS {
            let relative = format!("{}/{}/{}{}", language, username, headword, ext);
            if self.root.join(&relative).is_file() {
                return Some(relative);
            }
        }
        None
    }
}
