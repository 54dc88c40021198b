//! # forvodb-build
//!
//! Builds the two pronunciation dictionary stores from a dump directory:
//! streams the metadata log, groups recordings by (language, headword),
//! renders one HTML snippet per word, and persists words plus their audio
//! lists in resumable batches.

pub mod aggregate;
pub mod icons;
pub mod locate;
pub mod render;
pub mod run;
pub mod store;
