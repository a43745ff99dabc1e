use anyhow::{Context, Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::Config;
use crate::document;
use crate::file_utils::FileManager;
use crate::narration::{
    ClipWriter, FsClipWriter, MemoryClipWriter, Pipeline, PipelineOptions, RunReport, UnitOutcome,
};
use crate::providers::{self, Synthesizer, mock::MockSynthesizer};

// @module: Application controller for document narration

/// Outcome of a folder run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FolderSummary {
    pub narrated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller for document narration
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Synthesizer used instead of the configured provider
    synthesizer: Option<Arc<dyn Synthesizer>>,
    // @field: Narrate with the mock backend and write nothing
    dry_run: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            synthesizer: None,
            dry_run: false,
        })
    }

    /// Use a specific synthesizer rather than the configured provider
    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn Synthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Synthesize with the mock backend and leave the file system untouched
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn synthesizer(&self) -> Result<Arc<dyn Synthesizer>> {
        if let Some(synthesizer) = &self.synthesizer {
            return Ok(Arc::clone(synthesizer));
        }
        if self.dry_run {
            return Ok(Arc::new(MockSynthesizer::working()));
        }
        providers::from_config(&self.config.synthesis)
    }

    fn progress_bar(multi_progress: &MultiProgress, len: u64, unit: &str) -> ProgressBar {
        let progress_bar = multi_progress.add(ProgressBar::new(len));
        let style = ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}}",
                unit
            ))
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }

    /// Narrate one document into `output_file`, writing clips beside it.
    /// Returns `None` when the output exists and `force_overwrite` is off.
    pub async fn run(
        &self,
        input_file: PathBuf,
        output_file: PathBuf,
        force_overwrite: bool,
    ) -> Result<Option<RunReport>> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(&input_file, &output_file, &multi_progress, force_overwrite)
            .await
    }

    async fn run_with_progress(
        &self,
        input_file: &Path,
        output_file: &Path,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<Option<RunReport>> {
        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }
        if input_file == output_file {
            return Err(anyhow!("Output file must differ from the input file: {:?}", input_file));
        }
        if output_file.exists() && !force_overwrite && !self.dry_run {
            warn!(
                "Skipping {:?}, output already exists (use -f to force overwrite)",
                output_file
            );
            return Ok(None);
        }

        let markup = FileManager::read_to_string(input_file)?;
        let parsed = document::parse(&markup)
            .with_context(|| format!("Failed to parse document: {:?}", input_file))?;

        let clip_base = FileManager::clip_base_name(output_file);
        let clip_writer: Arc<dyn ClipWriter> = if self.dry_run {
            Arc::new(MemoryClipWriter::new())
        } else {
            let clip_dir = FileManager::clip_dir(output_file);
            FileManager::ensure_dir(&clip_dir)?;
            Arc::new(FsClipWriter::new(clip_dir))
        };

        let options = PipelineOptions::from_config(&self.config, &clip_base);
        let pipeline = Pipeline::new(options, self.synthesizer()?, clip_writer);
        let preview = pipeline.preview(&parsed);
        for (clip, text) in &preview {
            debug!("{} <- {:?}", clip, text);
        }

        let progress_bar = Self::progress_bar(multi_progress, preview.len() as u64, "clips");
        let bar = progress_bar.clone();
        let pipeline = pipeline.with_progress(move |done, _total| bar.set_position(done as u64));

        let output = pipeline.run(parsed).await?;
        progress_bar.finish_and_clear();

        for unit in &output.report.units {
            match &unit.outcome {
                UnitOutcome::Inserted(_) => {}
                UnitOutcome::SynthesisFailed(reason) | UnitOutcome::WriteFailed(reason) => {
                    warn!("No audio for annotation #{}: {}", unit.sequence, reason)
                }
                other => warn!("Annotation #{} ended with {:?}", unit.sequence, other),
            }
        }

        if self.dry_run {
            info!(
                "Dry run: {} clip(s) would be written next to {:?}",
                output.report.inserted(),
                output_file
            );
        } else {
            FileManager::write_to_file(output_file, &output.markup)?;
            info!("Success: {:?}", output_file);
        }

        Ok(Some(output.report))
    }

    /// Narrate every markup document in a directory tree into
    /// `<stem>.narrated.<ext>` files next to the sources
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<FolderSummary> {
        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let documents = FileManager::find_documents(&input_dir)?;
        if documents.is_empty() {
            return Err(anyhow!("No HTML documents found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = Self::progress_bar(&multi_progress, documents.len() as u64, "files");
        folder_pb.set_message("Processing files");

        let mut summary = FolderSummary::default();
        for document in &documents {
            let file_name = document
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let output_file = FileManager::generate_output_path(document);
            match self
                .run_with_progress(document, &output_file, &multi_progress, force_overwrite)
                .await
            {
                Ok(Some(_)) => summary.narrated += 1,
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing {:?}: {:#}", document, e);
                    summary.failed += 1;
                }
            }
            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");
        info!(
            "Finished folder: {} narrated, {} skipped, {} failed",
            summary.narrated, summary.skipped, summary.failed
        );
        Ok(summary)
    }
}
