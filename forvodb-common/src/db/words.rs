//! Word store operations
//!
//! Writes run inside the caller's transaction, so all functions take a
//! `&mut SqliteConnection` rather than a pool; the store writer commits
//! in batches. Count queries run against the pool directly.

use crate::records::AudioClip;
use crate::Result;
use sqlx::{SqliteConnection, SqlitePool};

/// Upsert a word row, keeping its row id stable across rewrites.
///
/// `ON CONFLICT ... DO UPDATE` rather than `INSERT OR REPLACE`: a replace
/// would assign a fresh rowid and silently orphan the previous run's
/// audio_files children. `created_at` is refreshed because a rewrite
/// replaces the entry wholesale.
pub async fn upsert_word(
    conn: &mut SqliteConnection,
    language: &str,
    headword: &str,
    html_content: &str,
    audio_count: i64,
) -> Result<i64> {
    sqlx::query(
        r#"
        INSERT INTO words (language, headword, html_content, audio_count, created_at)
        VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(language, headword) DO UPDATE SET
            html_content = excluded.html_content,
            audio_count = excluded.audio_count,
            created_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(language)
    .bind(headword)
    .bind(html_content)
    .bind(audio_count)
    .execute(&mut *conn)
    .await?;

    let id: i64 = sqlx::query_scalar("SELECT id FROM words WHERE language = ? AND headword = ?")
        .bind(language)
        .bind(headword)
        .fetch_one(&mut *conn)
        .await?;

    Ok(id)
}

/// Remove all audio_files children of a word.
pub async fn clear_audio_files(conn: &mut SqliteConnection, word_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM audio_files WHERE word_id = ?")
        .bind(word_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Insert one audio_files child row.
pub async fn insert_audio_file(
    conn: &mut SqliteConnection,
    word_id: i64,
    clip: &AudioClip,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO audio_files
        (word_id, username, gender, country, votes, file_path, download_url, audio_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(word_id)
    .bind(&clip.username)
    .bind(&clip.gender)
    .bind(&clip.country)
    .bind(clip.votes)
    .bind(&clip.file_path)
    .bind(&clip.download_url)
    .bind(clip.audio_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Write one word and its full child list, replacing any prior children.
pub async fn replace_word(
    conn: &mut SqliteConnection,
    language: &str,
    headword: &str,
    html_content: &str,
    clips: &[AudioClip],
) -> Result<i64> {
    let word_id = upsert_word(conn, language, headword, html_content, clips.len() as i64).await?;
    clear_audio_files(conn, word_id).await?;
    for clip in clips {
        insert_audio_file(conn, word_id, clip).await?;
    }
    Ok(word_id)
}

/// Count total words in the store.
pub async fn count_words(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM words")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Count total audio file rows in the store.
pub async fn count_audio_files(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audio_files")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
