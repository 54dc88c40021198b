//! End-to-end tests for the build pipeline
//!
//! Each test lays out a miniature dump (audio tree, icons, country
//! mappings, metadata log), runs the full processor, and inspects the
//! resulting stores.

use forvodb_build::run::Processor;
use sqlx::SqlitePool;
use std::fs;
use std::path::Path;
use tokio_util::sync::CancellationToken;

const COUNTRY_MAPPINGS: &str = r#"[
    {"original_name": "France", "normalized_name": "france", "iso_code": "FR", "flag_file": "FR.svg", "error": null},
    {"original_name": "Japan", "normalized_name": "japan", "iso_code": "JP", "flag_file": "JP.svg", "error": null}
]"#;

fn write_file(path: &Path, contents: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Dump with one two-recording word ("en"/"cat"), one record whose audio
/// file is missing, one word without any resolvable icon, and one
/// malformed log line.
fn standard_dump() -> tempfile::TempDir {
    let dump = tempfile::tempdir().unwrap();
    let root = dump.path();

    write_file(&root.join("en/alice/cat.opus"), b"audio");
    write_file(&root.join("en/bob/cat.mp3"), b"audio");
    write_file(&root.join("en/carol/dog.ogg"), b"audio");

    write_file(&root.join("icons/female_FR.svg"), b"<svg/>");
    write_file(&root.join("icons/male_JP.svg"), b"<svg/>");

    write_file(&root.join("country_mappings.json"), COUNTRY_MAPPINGS.as_bytes());

    let log = concat!(
        r#"{"language":"en","headword":"cat","origin":["alice","female","France"],"votes":5,"id":11}"#,
        "\n",
        r#"{"language":"en","headword":"cat","origin":["bob","male","Japan"],"votes":10,"id":12}"#,
        "\n",
        r#"{"language":"en","headword":"cat","origin":["ghost","male","Japan"],"votes":99,"id":13}"#,
        "\n",
        "{not json}\n",
        r#"{"language":"en","headword":"dog","origin":["carol","female","Wonderland"],"votes":0,"id":14}"#,
        "\n",
    );
    write_file(&root.join("metadata.jsonl"), log.as_bytes());

    dump
}

async fn run_build(root: &Path, out: &Path) -> forvodb_build::run::RunSummary {
    let mut processor = Processor::new(
        root.to_path_buf(),
        out.join("forvo_database.db"),
        out.join("forvo_simple.db"),
        1000,
    );
    processor.run(CancellationToken::new()).await.unwrap()
}

async fn open(path: &Path) -> SqlitePool {
    SqlitePool::connect(&format!("sqlite://{}", path.display()))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_full_build_aggregates_and_renders() {
    let dump = standard_dump();
    let out = tempfile::tempdir().unwrap();

    let summary = run_build(dump.path(), out.path()).await;

    assert!(!summary.interrupted);
    assert_eq!(summary.words_total, 2);
    // cat keeps alice+bob (ghost's audio is missing); dog keeps carol
    assert_eq!(summary.audio_files_total, 3);
    assert_eq!(summary.mdx_entries_total, 2);
    assert_eq!(summary.aggregate.malformed, 1);
    assert_eq!(summary.aggregate.audio_missing, 1);

    let pool = open(&out.path().join("forvo_database.db")).await;

    let (html, audio_count): (String, i64) = sqlx::query_as(
        "SELECT html_content, audio_count FROM words WHERE language = 'en' AND headword = 'cat'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    assert_eq!(audio_count, 2);
    // Higher-voted bob renders before alice
    let bob = html.find("sound://en/bob/cat.mp3").unwrap();
    let alice = html.find("sound://en/alice/cat.opus").unwrap();
    assert!(bob < alice);
    assert!(html.contains("icons/male_JP.svg"));
    assert!(html.contains("icons/female_FR.svg"));

    pool.close().await;
}

#[tokio::test]
async fn test_unresolvable_icon_word_still_stored() {
    let dump = standard_dump();
    let out = tempfile::tempdir().unwrap();

    run_build(dump.path(), out.path()).await;

    let pool = open(&out.path().join("forvo_database.db")).await;
    let (html, audio_count): (String, i64) = sqlx::query_as(
        "SELECT html_content, audio_count FROM words WHERE language = 'en' AND headword = 'dog'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    // The recording exists, so it counts; but with no icon for
    // "Wonderland" nothing is rendered.
    assert_eq!(audio_count, 1);
    assert!(!html.contains("pronunciation-item"));
    assert!(!html.contains("<style>"));

    pool.close().await;
}

#[tokio::test]
async fn test_mdx_store_mirrors_word_store() {
    let dump = standard_dump();
    let out = tempfile::tempdir().unwrap();

    run_build(dump.path(), out.path()).await;

    let words_pool = open(&out.path().join("forvo_database.db")).await;
    let mdx_pool = open(&out.path().join("forvo_simple.db")).await;

    let word_html: String = sqlx::query_scalar(
        "SELECT html_content FROM words WHERE language = 'en' AND headword = 'cat'",
    )
    .fetch_one(&words_pool)
    .await
    .unwrap();

    let (paraphrase, audio_count): (String, i64) = sqlx::query_as(
        "SELECT paraphrase, audio_count FROM mdx WHERE entry = 'cat' AND language = 'en'",
    )
    .fetch_one(&mdx_pool)
    .await
    .unwrap();

    assert_eq!(paraphrase, word_html);
    assert_eq!(audio_count, 2);

    words_pool.close().await;
    mdx_pool.close().await;
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let dump = standard_dump();
    let out = tempfile::tempdir().unwrap();

    let first = run_build(dump.path(), out.path()).await;
    let second = run_build(dump.path(), out.path()).await;

    // Keyed upserts + child replacement: a second pass over the same
    // input must not grow either store.
    assert_eq!(first.words_total, second.words_total);
    assert_eq!(first.audio_files_total, second.audio_files_total);
    assert_eq!(first.mdx_entries_total, second.mdx_entries_total);
}

#[tokio::test]
async fn test_missing_layout_is_fatal_before_store_mutation() {
    let dump = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    // Root exists but has neither metadata log nor icons directory
    let mut processor = Processor::new(
        dump.path().to_path_buf(),
        out.path().join("forvo_database.db"),
        out.path().join("forvo_simple.db"),
        1000,
    );
    let result = processor.run(CancellationToken::new()).await;

    assert!(result.is_err());
    assert!(!out.path().join("forvo_database.db").exists());
}

#[tokio::test]
async fn test_pre_cancelled_run_commits_nothing_and_exits_cleanly() {
    let dump = standard_dump();
    let out = tempfile::tempdir().unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut processor = Processor::new(
        dump.path().to_path_buf(),
        out.path().join("forvo_database.db"),
        out.path().join("forvo_simple.db"),
        1000,
    );
    let summary = processor.run(cancel).await.unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.words_total, 0);
    assert_eq!(summary.mdx_entries_total, 0);
}

#[tokio::test]
async fn test_small_batch_size_commits_every_group() {
    let dump = standard_dump();
    let out = tempfile::tempdir().unwrap();

    let mut processor = Processor::new(
        dump.path().to_path_buf(),
        out.path().join("forvo_database.db"),
        out.path().join("forvo_simple.db"),
        1,
    );
    let summary = processor.run(CancellationToken::new()).await.unwrap();

    assert_eq!(summary.words_total, 2);
    assert_eq!(summary.flush.words_written, 2);
}
