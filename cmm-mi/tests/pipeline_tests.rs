//! Media pipeline state machine tests
//!
//! Drive the pipeline directly with fake collaborators over a temp data
//! folder: first-contact materialization, the monotonic version gate,
//! supersession, and per-registration failure isolation.

mod helpers;

use cmm_mi::services::media_cache::MediaCache;
use cmm_mi::services::media_pipeline::{
    MediaPipeline, PipelineError, PipelineItem, PipelineOutcome,
};
use helpers::{FakeConverter, FakeFetcher, FakeTagger};
use std::sync::atomic::Ordering;

const KEY: &str = "Juvenile_Ladies_Short_Program_Mai_Nguyen";
const LOCATOR: &str = "https://example.com/music/program";

fn item(source_index: u32) -> PipelineItem {
    PipelineItem {
        asset_key: KEY.to_string(),
        competitor_name: "Mai Nguyen".to_string(),
        slot_name: "Juvenile Ladies Short Program".to_string(),
        locator: LOCATOR.to_string(),
        source_index,
    }
}

fn pipeline_with(
    dir: &std::path::Path,
    fetcher: FakeFetcher,
    converter: FakeConverter,
    tagger: FakeTagger,
) -> MediaPipeline {
    let cache = MediaCache::new(dir);
    cache.ensure_dirs().unwrap();
    MediaPipeline::new(cache, Box::new(fetcher), Box::new(converter), Box::new(tagger))
}

#[tokio::test]
async fn test_first_contact_materializes_version_one() {
    let dir = tempfile::tempdir().unwrap();
    let mut fetcher = FakeFetcher::new();
    fetcher.insert(LOCATOR, "program music.mp3", b"audio-bytes-1");
    let fetches = fetcher.calls();

    let pipeline = pipeline_with(dir.path(), fetcher, FakeConverter::new(), FakeTagger::new());

    let outcome = pipeline.process(&item(1)).await.unwrap();
    assert_eq!(outcome, PipelineOutcome::Refreshed { version: 1 });
    assert_eq!(fetches.load(Ordering::SeqCst), 1);

    // Raw cached under {source_index}_{key} with the original extension
    let raw = pipeline.cache().locate_raw(KEY, 1).unwrap().unwrap();
    assert_eq!(raw, pipeline.cache().raw_path(KEY, 1, "mp3"));

    // Converted asset tagged with name, slot and version; no suffix at v1
    let converted = pipeline.cache().converted_path(KEY);
    let (version, title, album) = FakeTagger::header_of(&converted).unwrap();
    assert_eq!(version, 1);
    assert_eq!(title, "Mai Nguyen");
    assert_eq!(album, "Juvenile Ladies Short Program");

    assert_eq!(pipeline.duration(KEY), 150);
}

#[tokio::test]
async fn test_equal_version_is_a_noop() {
    // Embedded version 1, attributed submission also 1: no conversion
    let dir = tempfile::tempdir().unwrap();
    let mut fetcher = FakeFetcher::new();
    fetcher.insert(LOCATOR, "program.mp3", b"audio-bytes-1");

    let converter = FakeConverter::new();
    let conversions = converter.calls();
    let pipeline = pipeline_with(dir.path(), fetcher, converter, FakeTagger::new());

    pipeline.process(&item(1)).await.unwrap();
    assert_eq!(conversions.load(Ordering::SeqCst), 1);

    let outcome = pipeline.process(&item(1)).await.unwrap();
    assert_eq!(outcome, PipelineOutcome::UpToDate);
    assert_eq!(conversions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_newer_submission_supersedes() {
    let dir = tempfile::tempdir().unwrap();
    let mut fetcher = FakeFetcher::new();
    fetcher.insert(LOCATOR, "program.mp3", b"audio-bytes");

    let pipeline = pipeline_with(dir.path(), fetcher, FakeConverter::new(), FakeTagger::new());

    pipeline.process(&item(1)).await.unwrap();
    let outcome = pipeline.process(&item(3)).await.unwrap();
    assert_eq!(outcome, PipelineOutcome::Refreshed { version: 3 });

    let converted = pipeline.cache().converted_path(KEY);
    let (version, title, _) = FakeTagger::header_of(&converted).unwrap();
    assert_eq!(version, 3);
    assert_eq!(title, "Mai Nguyen v3");

    // Downgrade attempt after the fact is a no-op
    let outcome = pipeline.process(&item(2)).await.unwrap();
    assert_eq!(outcome, PipelineOutcome::UpToDate);
    assert_eq!(FakeTagger::header_of(&converted).unwrap().0, 3);
}

#[tokio::test]
async fn test_monotonic_over_rerun_sequence() {
    // Processing indices in order always leaves the maximum embedded,
    // however many times the batch re-runs
    let dir = tempfile::tempdir().unwrap();
    let mut fetcher = FakeFetcher::new();
    fetcher.insert(LOCATOR, "program.wav", b"audio");

    let pipeline = pipeline_with(dir.path(), fetcher, FakeConverter::new(), FakeTagger::new());

    for index in [1, 2, 4] {
        pipeline.process(&item(index)).await.unwrap();
    }
    for _ in 0..2 {
        let outcome = pipeline.process(&item(4)).await.unwrap();
        assert_eq!(outcome, PipelineOutcome::UpToDate);
    }

    let converted = pipeline.cache().converted_path(KEY);
    assert_eq!(FakeTagger::header_of(&converted).unwrap().0, 4);
}

#[tokio::test]
async fn test_unsupported_extension_stays_raw_cached() {
    let dir = tempfile::tempdir().unwrap();
    let mut fetcher = FakeFetcher::new();
    fetcher.insert(LOCATOR, "program.ogg", b"vorbis-bytes");

    let pipeline = pipeline_with(dir.path(), fetcher, FakeConverter::new(), FakeTagger::new());

    let result = pipeline.process(&item(1)).await;
    assert!(matches!(result, Err(PipelineError::UnsupportedFormat(_))));

    // Raw file persisted, nothing converted
    assert!(pipeline.cache().locate_raw(KEY, 1).unwrap().is_some());
    assert!(!pipeline.cache().converted_path(KEY).exists());
    assert_eq!(pipeline.duration(KEY), 0);
}

#[tokio::test]
async fn test_failed_conversion_preserves_prior_asset() {
    let dir = tempfile::tempdir().unwrap();

    // First run materializes version 1
    let mut fetcher = FakeFetcher::new();
    fetcher.insert(LOCATOR, "program.mp3", b"first");
    let pipeline = pipeline_with(dir.path(), fetcher, FakeConverter::new(), FakeTagger::new());
    pipeline.process(&item(1)).await.unwrap();

    // Second run: version 2 arrives as an unsupported container
    let mut fetcher = FakeFetcher::new();
    fetcher.insert(LOCATOR, "program.ogg", b"second");
    let pipeline = pipeline_with(dir.path(), fetcher, FakeConverter::new(), FakeTagger::new());
    let result = pipeline.process(&item(2)).await;
    assert!(matches!(result, Err(PipelineError::UnsupportedFormat(_))));

    // The version 1 asset is untouched
    let converted = pipeline.cache().converted_path(KEY);
    assert_eq!(FakeTagger::header_of(&converted).unwrap().0, 1);
}

#[tokio::test]
async fn test_failed_tag_write_rolls_back() {
    let dir = tempfile::tempdir().unwrap();
    let mut fetcher = FakeFetcher::new();
    fetcher.insert(LOCATOR, "program.mp3", b"audio");

    let pipeline = pipeline_with(dir.path(), fetcher, FakeConverter::new(), FakeTagger::failing());

    let result = pipeline.process(&item(1)).await;
    assert!(matches!(result, Err(PipelineError::Tag(_))));

    // No partial tag state: neither staging nor canonical file remains
    assert!(!pipeline.cache().converted_path(KEY).exists());
    assert!(!pipeline.cache().staging_path(KEY).exists());
    // Raw cache entry remains for the next run
    assert!(pipeline.cache().locate_raw(KEY, 1).unwrap().is_some());
}

#[tokio::test]
async fn test_failed_encoder_rolls_back() {
    let dir = tempfile::tempdir().unwrap();
    let mut fetcher = FakeFetcher::new();
    fetcher.insert(LOCATOR, "program.mp3", b"audio");

    let pipeline = pipeline_with(dir.path(), fetcher, FakeConverter::failing(), FakeTagger::new());

    let result = pipeline.process(&item(1)).await;
    assert!(matches!(result, Err(PipelineError::Convert(_))));
    assert!(!pipeline.cache().converted_path(KEY).exists());
    assert!(!pipeline.cache().staging_path(KEY).exists());
}

#[tokio::test]
async fn test_fetch_failure_leaves_no_state() {
    let dir = tempfile::tempdir().unwrap();
    // No fixture registered: every fetch fails
    let pipeline = pipeline_with(
        dir.path(),
        FakeFetcher::new(),
        FakeConverter::new(),
        FakeTagger::new(),
    );

    let result = pipeline.process(&item(1)).await;
    assert!(matches!(result, Err(PipelineError::Fetch(_))));
    assert!(pipeline.cache().locate_raw(KEY, 1).unwrap().is_none());
    assert_eq!(pipeline.duration(KEY), 0);
}

#[tokio::test]
async fn test_raw_cache_hit_skips_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let mut fetcher = FakeFetcher::new();
    fetcher.insert(LOCATOR, "program.mp3", b"audio");
    let fetches = fetcher.calls();

    let pipeline = pipeline_with(dir.path(), fetcher, FakeConverter::new(), FakeTagger::new());

    pipeline.process(&item(1)).await.unwrap();
    pipeline.process(&item(1)).await.unwrap();
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}
