/*!
 * Workflow tests against a directory-backed project
 */

use std::path::Path;
use std::sync::Arc;

use scriptcaps::app_config::{Config, SequenceConfig};
use scriptcaps::app_controller::{Controller, WorkflowRequest};
use scriptcaps::errors::{PlayheadError, WorkflowError};
use scriptcaps::file_utils::FileManager;
use scriptcaps::host::local::LocalProjectHost;
use scriptcaps::host::{DurationStrategy, HostBridge};
use scriptcaps::srt_encoder::SrtEncoding;
use crate::common;

fn project_config(root: &Path, sequence: Option<SequenceConfig>) -> Config {
    let mut config = Config::default();
    config.project.root = root.join("project");
    config.project.sequence = sequence;
    config.subtitles.temp_dir = Some(root.join("scratch"));
    config
}

fn twenty_second_sequence() -> SequenceConfig {
    SequenceConfig {
        end_seconds: Some(20.0),
        playhead_seconds: Some(75.4),
        ..SequenceConfig::default()
    }
}

/// Test a full run imports into the bin and writes a track manifest
#[tokio::test]
async fn test_run_withLocalProject_shouldImportAndWriteTrack() -> anyhow::Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let script = common::create_test_file(temp_dir.path(), "script.txt", "Hello world\nGoodbye")?;
    let config = project_config(temp_dir.path(), Some(twenty_second_sequence()));
    let host = Arc::new(LocalProjectHost::from_config(&config));
    let bin_dir = config.bin_path();
    let captions_dir = host.captions_dir();
    let controller = Controller::new(config, host);

    let outcome = controller
        .run_subtitle_workflow(&WorkflowRequest::auto(script.to_string_lossy(), 1.0))
        .await?;

    assert_eq!(outcome.encoding, SrtEncoding::Utf8Unix);
    let bin_files = FileManager::list_files(&bin_dir)?;
    assert_eq!(bin_files.len(), 1);
    assert!(outcome.asset.name.starts_with("0000_temp_subtitles_"));

    let imported = std::fs::read_to_string(&bin_files[0])?;
    assert!(imported.contains("00:00:00,000 --> 00:00:13,333"));
    assert!(imported.contains("00:00:13,333 --> 00:00:20,000"));

    let manifests = FileManager::list_files(&captions_dir)?;
    assert_eq!(manifests.len(), 1);
    let manifest: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&manifests[0])?)?;
    assert_eq!(manifest["start_at_seconds"], 0.0);
    assert_eq!(manifest["captions"].as_array().map(Vec::len), Some(2));
    assert_eq!(manifest["captions"][1]["text"], "Goodbye");
    Ok(())
}

/// Test a BOM-only project accepts the second attempt
#[tokio::test]
async fn test_run_withBomRequiringProject_shouldImportWindowsEncoding() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script = common::create_test_file(temp_dir.path(), "script.txt", "One two three\nFour")?;
    let config = project_config(temp_dir.path(), Some(twenty_second_sequence()));
    let host = Arc::new(LocalProjectHost::from_config(&config).requiring_bom());
    let bin_dir = config.bin_path();
    let controller = Controller::new(config, host);

    let outcome = controller
        .run_subtitle_workflow(&WorkflowRequest::manual(
            script.to_string_lossy(),
            1.0,
            "00:00:00",
            "00:00:08",
        ))
        .await?;

    assert_eq!(outcome.encoding, SrtEncoding::Utf8BomWindows);
    let bin_files = FileManager::list_files(&bin_dir)?;
    assert_eq!(bin_files.len(), 1);
    let bytes = std::fs::read(&bin_files[0])?;
    assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
    assert!(String::from_utf8(bytes)?.contains("00:00:00,000 --> 00:00:06,000\r\nOne two three\r\n"));
    Ok(())
}

/// Test a project without a sequence refuses to run
#[tokio::test]
async fn test_run_withoutSequence_shouldFail() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script = common::create_test_file(temp_dir.path(), "script.txt", "Hello")?;
    let config = project_config(temp_dir.path(), None);
    let host = Arc::new(LocalProjectHost::from_config(&config));
    let controller = Controller::new(config, host);

    let result = controller
        .run_subtitle_workflow(&WorkflowRequest::auto(script.to_string_lossy(), 1.0))
        .await;

    assert_eq!(result, Err(WorkflowError::NoActiveSequence));
    assert_eq!(controller.playhead_time_formatted().await, Err(PlayheadError::NoActiveSequence));
    Ok(())
}

/// Test the sequence settings answer the duration probes
#[tokio::test]
async fn test_probe_sequence_duration_withClipEnds_shouldReportLatestEnd() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let sequence = SequenceConfig {
        clip_ends: vec![12.0, 48.5, 30.0],
        ..SequenceConfig::default()
    };
    let config = project_config(temp_dir.path(), Some(sequence));
    let host = LocalProjectHost::from_config(&config);

    assert_eq!(host.probe_sequence_duration(DurationStrategy::SequenceEnd).await?, None);
    assert_eq!(host.probe_sequence_duration(DurationStrategy::ClipExtent).await?, Some(48.5));
    assert_eq!(scriptcaps::host::resolve_sequence_duration(&host, 60.0).await, Some(48.5));
    Ok(())
}

/// Test imports that are not SRT leave the bin unchanged
#[tokio::test]
async fn test_import_file_withNonSrtFile_shouldRefuse() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = project_config(temp_dir.path(), Some(twenty_second_sequence()));
    let host = LocalProjectHost::from_config(&config);
    let notes = common::create_test_file(temp_dir.path(), "notes.srt", "not captions at all")?;

    let bin = host.insertion_bin().await?.expect("local project always has a bin");
    assert!(!host.import_file(&notes, &bin).await?);
    assert_eq!(host.bin_item_count(&bin).await?, 0);
    Ok(())
}

/// Test playhead pickup from the project sequence
#[tokio::test]
async fn test_playhead_time_formatted_withLocalSequence_shouldFloor() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = project_config(temp_dir.path(), Some(twenty_second_sequence()));
    let host = Arc::new(LocalProjectHost::from_config(&config));
    let controller = Controller::new(config, host);

    assert_eq!(controller.playhead_time_formatted().await?, "00:01:15");
    Ok(())
}

/// Test an older bin file whose name sorts last does not hide the new import
#[tokio::test]
async fn test_run_withExistingBinFile_shouldBuildTrackFromNewImport() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script = common::create_test_file(temp_dir.path(), "script.txt", "Hello world\nGoodbye")?;
    let config = project_config(temp_dir.path(), Some(twenty_second_sequence()));
    let bin_dir = config.bin_path();
    FileManager::ensure_dir(&bin_dir)?;
    common::create_test_file(&bin_dir, "interview.srt", "1\n00:00:00,000 --> 00:00:01,000\nOld\n\n")?;
    let host = Arc::new(LocalProjectHost::from_config(&config));
    let captions_dir = host.captions_dir();
    let controller = Controller::new(config, host.clone());

    let outcome = controller
        .run_subtitle_workflow(&WorkflowRequest::auto(script.to_string_lossy(), 1.0))
        .await?;

    assert!(outcome.asset.name.contains("temp_subtitles_"));
    let bin = host.insertion_bin().await?.expect("local project always has a bin");
    assert_eq!(host.bin_item_count(&bin).await?, 2);
    assert_eq!(host.bin_item(&bin, 0).await?.map(|a| a.name), Some("interview.srt".to_string()));

    let manifests = FileManager::list_files(&captions_dir)?;
    assert_eq!(manifests.len(), 1);
    let manifest: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&manifests[0])?)?;
    assert_eq!(manifest["captions"][0]["text"], "Hello world");
    Ok(())
}

/// Test a deleted import does not make the next one overwrite a bin file
#[tokio::test]
async fn test_import_file_afterDeletedImport_shouldNotOverwriteAndKeepNewestLast() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = project_config(temp_dir.path(), Some(twenty_second_sequence()));
    let host = LocalProjectHost::from_config(&config);
    let first = common::create_test_file(temp_dir.path(), "a.srt", "1\n00:00:00,000 --> 00:00:01,000\nFirst\n\n")?;
    let second = common::create_test_file(temp_dir.path(), "b.srt", "1\n00:00:00,000 --> 00:00:01,000\nSecond\n\n")?;

    let bin = host.insertion_bin().await?.expect("local project always has a bin");
    assert!(host.import_file(&first, &bin).await?);
    assert!(host.import_file(&second, &bin).await?);
    std::fs::remove_file(config.bin_path().join("0000_a.srt"))?;
    std::fs::write(&second, "1\n00:00:00,000 --> 00:00:01,000\nSecond again\n\n")?;
    assert!(host.import_file(&second, &bin).await?);

    assert_eq!(host.bin_item_count(&bin).await?, 2);
    let newest = host.bin_item(&bin, 1).await?.map(|a| a.name);
    assert_eq!(newest, Some("0002_b.srt".to_string()));
    assert!(std::fs::read_to_string(config.bin_path().join("0001_b.srt"))?.contains("Second\n"));

    let names: Vec<String> = serde_json::from_str(&std::fs::read_to_string(host.bin_order_path())?)?;
    assert_eq!(names, vec!["0001_b.srt", "0002_b.srt"]);
    Ok(())
}
