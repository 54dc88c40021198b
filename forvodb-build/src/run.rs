//! Run controller
//!
//! Drives one full build: layout validation, mapping load, streaming
//! aggregation, batched flush, final counts. Interruption always takes
//! the final-commit path; the stores are closed on every exit path.

use crate::aggregate::{AggregateStats, MetadataAggregator};
use crate::icons::IconResolver;
use crate::locate::AudioLocator;
use crate::render::SnippetRenderer;
use crate::store::{FlushOutcome, StoreWriter};
use forvodb_common::country::load_country_mappings;
use forvodb_common::db::{init_mdx_store, init_word_store, mdx, words};
use forvodb_common::layout::DumpLayout;
use forvodb_common::Result;
use sqlx::SqlitePool;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Build pipeline states, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    ValidatingLayout,
    LoadingMappings,
    StreamingAggregate,
    Flushing,
    Interrupted,
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Init => "INIT",
            RunState::ValidatingLayout => "VALIDATING_LAYOUT",
            RunState::LoadingMappings => "LOADING_MAPPINGS",
            RunState::StreamingAggregate => "STREAMING_AGGREGATE",
            RunState::Flushing => "FLUSHING",
            RunState::Interrupted => "INTERRUPTED",
            RunState::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// Final run report.
#[derive(Debug)]
pub struct RunSummary {
    pub words_total: i64,
    pub audio_files_total: i64,
    pub mdx_entries_total: i64,
    pub aggregate: AggregateStats,
    pub flush: FlushOutcome,
    pub interrupted: bool,
}

pub struct Processor {
    layout: DumpLayout,
    db_path: PathBuf,
    simple_db_path: PathBuf,
    batch_size: usize,
    state: RunState,
}

impl Processor {
    pub fn new(
        root_dir: PathBuf,
        db_path: PathBuf,
        simple_db_path: PathBuf,
        batch_size: usize,
    ) -> Self {
        Self {
            layout: DumpLayout::new(root_dir),
            db_path,
            simple_db_path,
            batch_size,
            state: RunState::Init,
        }
    }

    fn enter(&mut self, next: RunState) {
        info!("State: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Execute one build end to end.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<RunSummary> {
        self.enter(RunState::ValidatingLayout);
        self.layout.validate()?;

        self.enter(RunState::LoadingMappings);
        let countries = load_country_mappings(&self.layout.country_mappings_file());

        let words_pool = init_word_store(&self.db_path).await?;
        let mdx_pool = match init_mdx_store(&self.simple_db_path).await {
            Ok(pool) => pool,
            Err(e) => {
                words_pool.close().await;
                return Err(e);
            }
        };

        let result = self
            .drive(&words_pool, &mdx_pool, countries, &cancel)
            .await;

        words_pool.close().await;
        mdx_pool.close().await;

        let summary = result?;
        self.enter(if summary.interrupted {
            RunState::Interrupted
        } else {
            RunState::Done
        });
        self.log_summary(&summary);
        Ok(summary)
    }

    async fn drive(
        &mut self,
        words_pool: &SqlitePool,
        mdx_pool: &SqlitePool,
        countries: std::collections::HashMap<String, forvodb_common::country::CountryMapping>,
        cancel: &CancellationToken,
    ) -> Result<RunSummary> {
        let locator = AudioLocator::new(self.layout.audio_root());
        let resolver = IconResolver::new(self.layout.icons_dir(), countries);
        let renderer = SnippetRenderer::new(&resolver);
        let aggregator = MetadataAggregator::new(&locator);
        let writer = StoreWriter::new(words_pool.clone(), mdx_pool.clone(), self.batch_size);

        self.enter(RunState::StreamingAggregate);
        info!("Starting metadata processing...");
        let metadata = File::open(self.layout.metadata_file())?;
        let (groups, aggregate) = aggregator.aggregate(BufReader::new(metadata), cancel)?;

        self.enter(RunState::Flushing);
        let flush = writer.flush(&groups, &renderer, cancel).await?;

        let interrupted = aggregate.interrupted || flush.interrupted;
        Ok(RunSummary {
            words_total: words::count_words(words_pool).await?,
            audio_files_total: words::count_audio_files(words_pool).await?,
            mdx_entries_total: mdx::count_entries(mdx_pool).await?,
            aggregate,
            flush,
            interrupted,
        })
    }

    fn log_summary(&self, summary: &RunSummary) {
        info!("Store statistics:");
        info!("  Word store ({}):", self.db_path.display());
        info!("    - Total words: {}", summary.words_total);
        info!("    - Total audio files: {}", summary.audio_files_total);
        info!("  Mdx store ({}):", self.simple_db_path.display());
        info!("    - Total entries: {}", summary.mdx_entries_total);
        info!(
            "  Skipped: {} malformed, {} missing fields, {} without audio, {} store errors",
            summary.aggregate.malformed,
            summary.aggregate.missing_fields,
            summary.aggregate.audio_missing,
            summary.flush.groups_skipped
        );
    }
}
