//! SQLite store access for forvodb
//!
//! Two stores are produced per run: the relational word store
//! (words + audio_files) and the flattened mdx store for generic
//! dictionary lookup.

pub mod init;
pub mod mdx;
pub mod words;

pub use init::{init_mdx_store, init_word_store};
