/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::common;
use revealvoice::file_utils::FileManager;

#[test]
fn test_generate_output_path_withHtmlInput_shouldInsertNarratedSuffix() {
    let output = FileManager::generate_output_path("/talks/deck.html");
    assert_eq!(output, PathBuf::from("/talks/deck.narrated.html"));

    let output = FileManager::generate_output_path("slides");
    assert_eq!(output, PathBuf::from("slides.narrated.html"));
}

#[test]
fn test_clip_base_name_withOutputPath_shouldUseStem() {
    assert_eq!(FileManager::clip_base_name("/out/talk.html"), "talk");
    assert_eq!(FileManager::clip_base_name("deck.narrated.html"), "deck.narrated");
    assert_eq!(FileManager::clip_base_name(""), "narration");
}

#[test]
fn test_clip_dir_withBareFileName_shouldBeEmpty() {
    assert_eq!(FileManager::clip_dir("/out/talk.html"), PathBuf::from("/out"));
    assert_eq!(FileManager::clip_dir("talk.html"), PathBuf::from(""));
    // An empty directory is the current one and must not be created
    assert!(FileManager::ensure_dir(Path::new("")).is_ok());
}

#[test]
fn test_find_documents_withMixedFiles_shouldSkipNarratedOutputs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    std::fs::create_dir(dir.join("nested"))?;

    common::create_test_deck(dir, "b.html")?;
    common::create_test_deck(dir, "a.htm")?;
    common::create_test_deck(&dir.join("nested"), "c.HTML")?;
    common::create_test_file(dir, "b.narrated.html", "<p>done</p>")?;
    common::create_test_file(dir, "notes.txt", "ignored")?;

    let found: Vec<String> = FileManager::find_documents(dir)?
        .iter()
        .map(|p| p.strip_prefix(dir).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();

    assert_eq!(found, vec!["a.htm", "b.html", "nested/c.HTML"]);
    Ok(())
}

#[test]
fn test_write_to_file_withMissingParent_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let target = temp_dir.path().join("deep").join("out.html");

    FileManager::write_to_file(&target, "<p>hi</p>")?;

    assert!(FileManager::file_exists(&target));
    assert_eq!(FileManager::read_to_string(&target)?, "<p>hi</p>");
    assert!(FileManager::read_to_string(temp_dir.path().join("missing.html")).is_err());
    Ok(())
}
