// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use revealvoice::app_config::{self, Config, SynthesisProvider};
use revealvoice::app_controller::Controller;
use revealvoice::file_utils::FileManager;

/// CLI Wrapper for SynthesisProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSynthesisProvider {
    #[value(name = "openai")]
    OpenAI,
    #[value(name = "elevenlabs")]
    ElevenLabs,
    Mock,
}

impl From<CliSynthesisProvider> for SynthesisProvider {
    fn from(cli_provider: CliSynthesisProvider) -> Self {
        match cli_provider {
            CliSynthesisProvider::OpenAI => SynthesisProvider::OpenAI,
            CliSynthesisProvider::ElevenLabs => SynthesisProvider::ElevenLabs,
            CliSynthesisProvider::Mock => SynthesisProvider::Mock,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for revealvoice
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct NarrateArgs {
    /// Input document or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Output document (defaults to <input>.narrated.html)
    #[arg(value_name = "OUTPUT_PATH")]
    output_path: Option<PathBuf>,

    /// Voice used for every clip
    #[arg(short, long)]
    voice: Option<String>,

    /// Speech synthesis provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliSynthesisProvider>,

    /// Model name for the active provider
    #[arg(short, long)]
    model: Option<String>,

    /// Configuration file path
    #[arg(short, long = "config", default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Tag of the annotation elements to narrate
    #[arg(long)]
    marker_tag: Option<String>,

    /// Synthesize with the mock backend and write nothing
    #[arg(long)]
    dry_run: bool,
}

/// revealvoice - spoken narration for slide decks
///
/// Reads a markup document, synthesizes speech for each speaker note and
/// writes the document back with an audio reference in front of every note.
#[derive(Parser, Debug)]
#[command(name = "revealvoice")]
#[command(version)]
#[command(about = "Narrate slide deck speaker notes with synthesized speech")]
#[command(long_about = "revealvoice turns the <aside> speaker notes of a slide deck into audio clips and
inserts an <audio> reference before each note.

EXAMPLES:
    revealvoice deck.html                        # Writes deck.narrated.html and deck.narrated.001.mp3, ...
    revealvoice deck.html talk.html              # Writes talk.html and talk.001.mp3, ...
    revealvoice -v nova deck.html talk.html      # Use a specific voice
    revealvoice -p elevenlabs -v <voice-id> deck.html
    revealvoice --dry-run deck.html              # Show what would be narrated
    revealvoice -f /talks/                       # Narrate every deck in a directory
    revealvoice completions bash > revealvoice.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    openai     - OpenAI-compatible speech API (OPENAI_API_KEY)
    elevenlabs - ElevenLabs API (ELEVENLABS_API_KEY)
    mock       - Offline placeholder audio")]
#[command(args_conflicts_with_subcommands = true)]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    narrate: NarrateArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger::new(LevelFilter::Trace)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for a log level
    fn decoration(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => ("", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let now = chrono::Local::now().format("%H:%M:%S.%3f");
        let (emoji, color) = Self::decoration(record.level());
        let mut stderr = std::io::stderr();
        let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, emoji, record.args());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config has been read
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "revealvoice", &mut std::io::stdout());
            Ok(())
        }
        None => run_narrate(cli.narrate).await,
    }
}

// @loads: Config file, or writes the default one when missing
fn load_config(config_path: &str, persist_default: bool) -> Result<Config> {
    if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .with_context(|| format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        return serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", config_path));
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();
    if persist_default {
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", config_path))?;
    }
    Ok(config)
}

// @applies: Command line overrides on top of the loaded config
fn apply_overrides(config: &mut Config, options: &NarrateArgs) {
    if let Some(provider) = &options.provider {
        config.synthesis.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.synthesis.active_provider_config_mut().model = model.clone();
    }
    if let Some(voice) = &options.voice {
        config.voice = voice.clone();
    }
    if let Some(tag) = &options.marker_tag {
        config.marker_tag = tag.to_lowercase();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    if options.dry_run {
        config.synthesis.provider = SynthesisProvider::Mock;
    }
}

async fn run_narrate(options: NarrateArgs) -> Result<()> {
    let input_path = options
        .input_path
        .clone()
        .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;

    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = load_config(&options.config_path, !options.dry_run)?;
    apply_overrides(&mut config, &options);
    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    info!(
        "Narrating with {} (voice '{}')",
        config.synthesis.provider.display_name(),
        config.voice
    );

    let controller = Controller::with_config(config)?.with_dry_run(options.dry_run);

    if FileManager::dir_exists(&input_path) {
        if options.output_path.is_some() {
            return Err(anyhow!("OUTPUT_PATH cannot be used with a directory input"));
        }
        let summary = controller.run_folder(input_path, options.force_overwrite).await?;
        if summary.failed > 0 {
            return Err(anyhow!("{} document(s) failed", summary.failed));
        }
    } else if FileManager::file_exists(&input_path) {
        let output_path = options
            .output_path
            .clone()
            .unwrap_or_else(|| FileManager::generate_output_path(&input_path));
        controller
            .run(input_path, output_path, options.force_overwrite)
            .await?;
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }

    Ok(())
}
