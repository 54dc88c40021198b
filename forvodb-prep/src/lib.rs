//! # forvodb-prep
//!
//! Preparation steps that produce the inputs `forvodb-build` consumes:
//! contributor origin statistics, the country-name to ISO-code mapping
//! with downloaded flag images, composite pronunciation icons, and the
//! per-language title/description files. Each step reads and writes
//! plain files; none of them touch the stores.

pub mod compose;
pub mod describe;
pub mod flags;
pub mod origins;
