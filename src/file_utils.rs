use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Suffix inserted before the extension of annotated documents in folder mode
pub const NARRATED_SUFFIX: &str = "narrated";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Base name of the clips written next to an output document: its file stem
    pub fn clip_base_name<P: AsRef<Path>>(output_file: P) -> String {
        output_file
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "narration".to_string())
    }

    /// Directory clips are written to: the output document's directory
    pub fn clip_dir<P: AsRef<Path>>(output_file: P) -> PathBuf {
        output_file
            .as_ref()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    // @generates: Output path for an annotated document in folder mode
    pub fn generate_output_path<P: AsRef<Path>>(input_file: P) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default().to_string_lossy();
        let extension = input_file
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_else(|| "html".to_string());
        let file_name = format!("{}.{}.{}", stem, NARRATED_SUFFIX, extension);
        input_file.with_file_name(file_name)
    }

    /// Find files with a specific extension in a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let normalized_ext = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(normalized_ext) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        result.sort();
        Ok(result)
    }

    /// Documents a folder run should annotate: markup files that are not
    /// themselves outputs of an earlier run
    pub fn find_documents<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut documents = Self::find_files(dir.as_ref(), "html")?;
        documents.extend(Self::find_files(dir.as_ref(), "htm")?);
        documents.retain(|path| {
            let stem = path.file_stem().unwrap_or_default().to_string_lossy();
            !stem.ends_with(&format!(".{}", NARRATED_SUFFIX))
        });
        documents.sort();
        Ok(documents)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
