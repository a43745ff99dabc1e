use anyhow::{Result, anyhow};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::default::Default;
use url::Url;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Voice used for every clip
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Tag of the elements whose text gets narrated
    #[serde(default = "default_marker_tag")]
    pub marker_tag: String,

    /// Synthesis backend config
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Clip naming and reference node options
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Speech synthesis provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisProvider {
    // @provider: OpenAI-compatible speech endpoint
    #[default]
    OpenAI,
    // @provider: ElevenLabs
    ElevenLabs,
    // @provider: In-process mock, no network
    Mock,
}

impl SynthesisProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::ElevenLabs => "ElevenLabs",
            Self::Mock => "Mock",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::ElevenLabs => "elevenlabs".to_string(),
            Self::Mock => "mock".to_string(),
        }
    }

    // @returns: Environment variable consulted when no key is configured
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::ElevenLabs => Some("ELEVENLABS_API_KEY"),
            Self::Mock => None,
        }
    }
}

impl std::fmt::Display for SynthesisProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for SynthesisProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "elevenlabs" => Ok(Self::ElevenLabs),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Max synthesis calls in flight
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: SynthesisProvider) -> Self {
        let (model, endpoint) = match provider_type {
            SynthesisProvider::OpenAI => (default_openai_model(), default_openai_endpoint()),
            SynthesisProvider::ElevenLabs => {
                (default_elevenlabs_model(), default_elevenlabs_endpoint())
            }
            SynthesisProvider::Mock => (String::new(), String::new()),
        };
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model,
            api_key: String::new(),
            endpoint,
            concurrent_requests: default_concurrent_requests(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Synthesis service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SynthesisConfig {
    /// Synthesis provider to use
    #[serde(default)]
    pub provider: SynthesisProvider,

    /// Available synthesis providers
    #[serde(default = "default_available_providers")]
    pub available_providers: Vec<ProviderConfig>,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            provider: SynthesisProvider::default(),
            available_providers: default_available_providers(),
        }
    }
}

/// Clip naming and reference node settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    /// Zero padding of the sequence number in clip names
    #[serde(default = "default_sequence_width")]
    pub sequence_width: usize,

    /// Emit `data-autoplay` on inserted audio elements
    #[serde(default = "default_true")]
    pub autoplay: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sequence_width: default_sequence_width(),
            autoplay: true,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

static TAG_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_:.-]*$").expect("valid tag name pattern"));

fn default_voice() -> String {
    "alloy".to_string()
}

/// Reveal.js keeps speaker notes in `<aside class="notes">`
fn default_marker_tag() -> String {
    "aside".to_string()
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_sequence_width() -> usize {
    3
}

fn default_true() -> bool {
    true
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_elevenlabs_endpoint() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_openai_model() -> String {
    "tts-1".to_string()
}

fn default_elevenlabs_model() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_available_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new(SynthesisProvider::OpenAI),
        ProviderConfig::new(SynthesisProvider::ElevenLabs),
        ProviderConfig::new(SynthesisProvider::Mock),
    ]
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.voice.trim().is_empty() {
            return Err(anyhow!("Voice must not be empty"));
        }

        if !TAG_NAME.is_match(&self.marker_tag) {
            return Err(anyhow!("Invalid marker tag: '{}'", self.marker_tag));
        }

        if !(1..=9).contains(&self.output.sequence_width) {
            return Err(anyhow!(
                "Sequence width must be between 1 and 9, got {}",
                self.output.sequence_width
            ));
        }

        if self.synthesis.provider != SynthesisProvider::Mock {
            let endpoint = self.synthesis.get_endpoint();
            if !endpoint.is_empty() {
                Url::parse(&endpoint)
                    .map_err(|e| anyhow!("Invalid endpoint '{}': {}", endpoint, e))?;
            }

            if self.synthesis.get_api_key().is_empty() {
                return Err(anyhow!(
                    "API key is required for {} provider (set it in the config or via {})",
                    self.synthesis.provider.display_name(),
                    self.synthesis.provider.api_key_env_var().unwrap_or("the environment")
                ));
            }
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            voice: default_voice(),
            marker_tag: default_marker_tag(),
            synthesis: SynthesisConfig::default(),
            output: OutputConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl SynthesisConfig {
    /// Get the active provider configuration
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &SynthesisProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider configuration, created on demand
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let index = match self
            .available_providers
            .iter()
            .position(|p| p.provider_type == provider_str)
        {
            Some(index) => index,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[index]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            SynthesisProvider::OpenAI => default_openai_model(),
            SynthesisProvider::ElevenLabs => default_elevenlabs_model(),
            SynthesisProvider::Mock => String::new(),
        }
    }

    /// Get the API key for the active provider, falling back to the environment
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        self.provider
            .api_key_env_var()
            .and_then(|var| std::env::var(var).ok())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            SynthesisProvider::OpenAI => default_openai_endpoint(),
            SynthesisProvider::ElevenLabs => default_elevenlabs_endpoint(),
            SynthesisProvider::Mock => String::new(),
        }
    }

    /// Max synthesis calls in flight for the active provider
    pub fn optimal_concurrent_requests(&self) -> usize {
        self.get_active_provider_config()
            .map(|p| p.concurrent_requests)
            .filter(|n| *n > 0)
            .unwrap_or_else(default_concurrent_requests)
    }

    /// Request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .unwrap_or_else(default_timeout_secs)
    }
}
