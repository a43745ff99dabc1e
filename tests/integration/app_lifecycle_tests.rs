/*!
 * Integration tests for the application controller
 */

use anyhow::Result;
use std::sync::Arc;

use crate::common;
use revealvoice::app_controller::{Controller, FolderSummary};
use revealvoice::file_utils::FileManager;
use revealvoice::providers::mock::MockSynthesizer;

/// Test a single document narrated into a named output
#[tokio::test]
async fn test_run_withSampleDeck_shouldWriteDocumentAndClips() -> Result<()> {
    common::init_test_logger();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_deck(temp_dir.path(), "deck.html")?;
    let output = temp_dir.path().join("talk.html");

    let controller = Controller::with_config(common::mock_config())?;
    let report = controller
        .run(input, output.clone(), false)
        .await?
        .expect("run should not be skipped");

    assert_eq!(report.inserted(), 2);
    assert_eq!(report.skipped(), 1);

    let markup = FileManager::read_to_string(&output)?;
    assert!(markup.contains("<audio data-autoplay src=\"talk.001.mp3\" data-voice=\"alloy\"></audio><aside class=\"notes\">Welcome"));
    assert!(markup.contains("<audio data-autoplay src=\"talk.002.mp3\" data-voice=\"alloy\"></audio><aside class=\"notes\">Thanks"));

    let clip = std::fs::read(temp_dir.path().join("talk.001.mp3"))?;
    assert_eq!(clip, MockSynthesizer::audio_for("Welcome to the talk.", "alloy").to_vec());
    assert!(FileManager::file_exists(temp_dir.path().join("talk.002.mp3")));
    assert!(!FileManager::file_exists(temp_dir.path().join("talk.003.mp3")));
    Ok(())
}

/// Test that an existing output is only replaced with force
#[tokio::test]
async fn test_run_withExistingOutput_shouldRequireForce() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_deck(temp_dir.path(), "deck.html")?;
    let output = common::create_test_file(temp_dir.path(), "talk.html", "old")?;

    let controller = Controller::with_config(common::mock_config())?;

    let skipped = controller.run(input.clone(), output.clone(), false).await?;
    assert!(skipped.is_none());
    assert_eq!(FileManager::read_to_string(&output)?, "old");

    let forced = controller.run(input, output.clone(), true).await?;
    assert!(forced.is_some());
    assert!(FileManager::read_to_string(&output)?.contains("talk.001.mp3"));
    Ok(())
}

/// Test dry run functionality
#[tokio::test]
async fn test_dry_run_withTestData_shouldNotProduceOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_deck(temp_dir.path(), "deck.html")?;
    let output = temp_dir.path().join("talk.html");

    let synth = MockSynthesizer::working();
    let controller = Controller::with_config(common::mock_config())?
        .with_synthesizer(Arc::new(synth.clone()))
        .with_dry_run(true);
    let report = controller.run(input, output.clone(), false).await?.unwrap();

    assert_eq!(report.artifacts(), vec!["talk.001.mp3", "talk.002.mp3"]);
    assert_eq!(synth.request_count(), 2);
    assert!(!output.exists());
    assert!(!temp_dir.path().join("talk.001.mp3").exists());
    Ok(())
}

/// Test that a malformed document fails without writing anything
#[tokio::test]
async fn test_run_withMalformedDocument_shouldFailWithoutOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "broken.html", "<aside>hi</aside><!-- never closed")?;
    let output = temp_dir.path().join("out.html");

    let synth = MockSynthesizer::working();
    let controller = Controller::with_config(common::mock_config())?.with_synthesizer(Arc::new(synth.clone()));
    let result = controller.run(input, output.clone(), false).await;

    assert!(result.is_err());
    assert_eq!(synth.request_count(), 0);
    assert!(!output.exists());
    Ok(())
}

/// Test input validation errors
#[tokio::test]
async fn test_run_withBadPaths_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_deck(temp_dir.path(), "deck.html")?;
    let controller = Controller::with_config(common::mock_config())?;

    assert!(controller
        .run(temp_dir.path().join("missing.html"), temp_dir.path().join("o.html"), false)
        .await
        .is_err());
    assert!(controller.run(input.clone(), input, true).await.is_err());
    assert!(controller.run_folder(temp_dir.path().join("nope"), false).await.is_err());
    Ok(())
}

/// Test folder mode over several decks
#[tokio::test]
async fn test_run_folder_withTwoDecks_shouldNarrateEachOnce() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_deck(temp_dir.path(), "one.html")?;
    common::create_test_file(temp_dir.path(), "two.html", &common::generate_deck(3))?;

    let controller = Controller::with_config(common::mock_config())?;

    let first = controller.run_folder(temp_dir.path().to_path_buf(), false).await?;
    assert_eq!(first, FolderSummary { narrated: 2, skipped: 0, failed: 0 });
    assert!(FileManager::file_exists(temp_dir.path().join("one.narrated.html")));
    assert!(FileManager::file_exists(temp_dir.path().join("two.narrated.003.mp3")));

    // Outputs of the first pass are not picked up as inputs
    let second = controller.run_folder(temp_dir.path().to_path_buf(), false).await?;
    assert_eq!(second, FolderSummary { narrated: 0, skipped: 2, failed: 0 });
    Ok(())
}
