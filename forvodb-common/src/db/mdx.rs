//! Mdx store operations
//!
//! The mdx store mirrors each word entry in a flattened shape consumed by
//! generic dictionary tooling: `entry` is the headword, `paraphrase` the
//! rendered HTML.

use crate::Result;
use sqlx::{SqliteConnection, SqlitePool};

/// Upsert one mdx entry under (entry, language) uniqueness.
pub async fn upsert_entry(
    conn: &mut SqliteConnection,
    entry: &str,
    paraphrase: &str,
    language: &str,
    audio_count: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO mdx (entry, paraphrase, language, audio_count, created_at)
        VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(entry, language) DO UPDATE SET
            paraphrase = excluded.paraphrase,
            audio_count = excluded.audio_count,
            created_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(entry)
    .bind(paraphrase)
    .bind(language)
    .bind(audio_count)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Count total mdx entries in the store.
pub async fn count_entries(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mdx")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
