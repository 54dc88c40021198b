//! Store initialization
//!
//! Schema creation is idempotent: every table and index is created with
//! IF NOT EXISTS, so re-running a build over existing stores is safe.

use crate::Result;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

/// Open (creating if needed) the relational word store.
pub async fn init_word_store(db_path: &Path) -> Result<SqlitePool> {
    let pool = connect(db_path).await?;

    create_words_table(&pool).await?;
    create_audio_files_table(&pool).await?;

    info!("Word store initialized: {}", db_path.display());
    Ok(pool)
}

/// Open (creating if needed) the simplified mdx store.
pub async fn init_mdx_store(db_path: &Path) -> Result<SqlitePool> {
    let pool = connect(db_path).await?;

    create_mdx_table(&pool).await?;

    info!("Mdx store initialized: {}", db_path.display());
    Ok(pool)
}

async fn connect(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to store: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    Ok(pool)
}

/// Create the words table and its indexes.
///
/// One row per (language, headword); `html_content` is the rendered
/// pronunciation snippet. `audio_count` counts every record collected for
/// the word, which can exceed the entries visible in `html_content` when
/// some records had no resolvable icon.
pub async fn create_words_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS words (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            language TEXT NOT NULL,
            headword TEXT NOT NULL,
            html_content TEXT NOT NULL,
            audio_count INTEGER DEFAULT 0,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(language, headword)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_words_language_headword ON words(language, headword)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the audio_files table and its indexes.
pub async fn create_audio_files_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS audio_files (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            word_id INTEGER,
            username TEXT,
            gender TEXT,
            country TEXT,
            votes INTEGER DEFAULT 0,
            file_path TEXT,
            download_url TEXT,
            audio_id INTEGER,
            FOREIGN KEY (word_id) REFERENCES words (id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_audio_word_id ON audio_files(word_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_audio_votes ON audio_files(votes DESC)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the mdx table and its indexes.
pub async fn create_mdx_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS mdx (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            entry TEXT NOT NULL,
            paraphrase TEXT NOT NULL,
            language TEXT,
            audio_count INTEGER DEFAULT 0,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(entry, language)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_mdx_entry ON mdx(entry)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_mdx_language ON mdx(language)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_mdx_entry_language ON mdx(entry, language)")
        .execute(pool)
        .await?;

    Ok(())
}
