//! Store writer
//!
//! Persists aggregated word groups into the two stores in batches. Both
//! stores commit together every `batch_size` completed groups and once at
//! the end, so an interrupted run loses at most one partial batch and
//! never corrupts committed ones.

use crate::aggregate::WordGroups;
use crate::render::SnippetRenderer;
use forvodb_common::db::{mdx, words};
use forvodb_common::records::{AudioClip, WordKey};
use forvodb_common::Result;
use sqlx::{SqliteConnection, SqlitePool};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Counters from one flush pass.
#[derive(Debug, Default, Clone)]
pub struct FlushOutcome {
    pub words_written: u64,
    pub clips_written: u64,
    pub groups_skipped: u64,
    pub interrupted: bool,
}

pub struct StoreWriter {
    words_pool: SqlitePool,
    mdx_pool: SqlitePool,
    batch_size: usize,
}

impl StoreWriter {
    pub fn new(words_pool: SqlitePool, mdx_pool: SqlitePool, batch_size: usize) -> Self {
        Self {
            words_pool,
            mdx_pool,
            batch_size: batch_size.max(1),
        }
    }

    /// Write every group: render its snippet, upsert the word entry and
    /// its children, mirror it into the mdx store.
    ///
    /// Cancellation is polled per group; staged groups are committed on
    /// the way out, the in-flight group is not. A store error on a single
    /// group skips that group and continues.
    pub async fn flush(
        &self,
        groups: &WordGroups,
        renderer: &SnippetRenderer<'_>,
        cancel: &CancellationToken,
    ) -> Result<FlushOutcome> {
        info!("Creating store entries for {} unique words...", groups.len());

        let mut outcome = FlushOutcome::default();
        let mut words_tx = self.words_pool.begin().await?;
        let mut mdx_tx = self.mdx_pool.begin().await?;
        let mut staged = 0usize;

        for (key, clips) in groups {
            if cancel.is_cancelled() {
                info!("Flush cancelled; committing {} staged groups", staged);
                outcome.interrupted = true;
                break;
            }

            let html = renderer.render(clips);
            match write_group(&mut words_tx, &mut mdx_tx, key, clips, &html).await {
                Ok(()) => {
                    outcome.words_written += 1;
                    outcome.clips_written += clips.len() as u64;
                    staged += 1;
                }
                Err(e) => {
                    error!("Store error for {}/{}: {}", key.language, key.headword, e);
                    outcome.groups_skipped += 1;
                    continue;
                }
            }

            if staged >= self.batch_size {
                words_tx.commit().await?;
                mdx_tx.commit().await?;
                info!("Processed {} words...", outcome.words_written);
                words_tx = self.words_pool.begin().await?;
                mdx_tx = self.mdx_pool.begin().await?;
                staged = 0;
            }
        }

        // Final commit: the trailing partial batch, or whatever was
        // staged when the cancel flag was honored.
        words_tx.commit().await?;
        mdx_tx.commit().await?;

        info!(
            "Flushed {} words ({} groups skipped)",
            outcome.words_written, outcome.groups_skipped
        );
        Ok(outcome)
    }
}

async fn write_group(
    words_conn: &mut SqliteConnection,
    mdx_conn: &mut SqliteConnection,
    key: &WordKey,
    clips: &[AudioClip],
    html: &str,
) -> Result<()> {
    words::replace_word(words_conn, &key.language, &key.headword, html, clips).await?;
    mdx::upsert_entry(
        mdx_conn,
        &key.headword,
        html,
        &key.language,
        clips.len() as i64,
    )
    .await?;
    Ok(())
}
