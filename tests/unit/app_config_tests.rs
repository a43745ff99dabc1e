/*!
 * Tests for application configuration functionality
 */

use revealvoice::PipelineOptions;
use revealvoice::app_config::{Config, LogLevel, ProviderConfig, SynthesisProvider};
use std::str::FromStr;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.voice, "alloy");
    assert_eq!(config.marker_tag, "aside");
    assert_eq!(config.synthesis.provider, SynthesisProvider::OpenAI);
    assert_eq!(config.output.sequence_width, 3);
    assert!(config.output.autoplay);
    assert_eq!(config.log_level, LogLevel::Info);

    let openai = config
        .synthesis
        .get_provider_config(&SynthesisProvider::OpenAI)
        .expect("OpenAI provider config should exist");
    assert_eq!(openai.model, "tts-1");
    assert_eq!(openai.endpoint, "https://api.openai.com/v1");
    assert_eq!(openai.concurrent_requests, 4);
    assert_eq!(openai.timeout_secs, 60);
}

/// Test that a partial config file is completed with defaults
#[test]
fn test_deserialize_withPartialJson_shouldFillDefaults() {
    let json = r#"{
        "voice": "nova",
        "synthesis": {
            "provider": "elevenlabs",
            "available_providers": [
                { "type": "elevenlabs", "api_key": "xi-key", "concurrent_requests": 2 }
            ]
        }
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.voice, "nova");
    assert_eq!(config.marker_tag, "aside");
    assert_eq!(config.synthesis.provider, SynthesisProvider::ElevenLabs);
    assert_eq!(config.synthesis.get_api_key(), "xi-key");
    assert_eq!(config.synthesis.optimal_concurrent_requests(), 2);
    assert_eq!(config.synthesis.get_timeout_secs(), 60);
    // Model and endpoint were left blank, so the provider defaults apply
    assert_eq!(config.synthesis.get_model(), "eleven_multilingual_v2");
    assert_eq!(config.synthesis.get_endpoint(), "https://api.elevenlabs.io");
    assert!(config.validate().is_ok());
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    config.synthesis.provider = SynthesisProvider::Mock;
    assert!(config.validate().is_ok());

    config.voice = "   ".to_string();
    assert!(config.validate().is_err());
    config.voice = "alloy".to_string();

    config.marker_tag = "not a tag".to_string();
    assert!(config.validate().is_err());
    config.marker_tag = "aside".to_string();

    config.output.sequence_width = 0;
    assert!(config.validate().is_err());
    config.output.sequence_width = 3;
    assert!(config.validate().is_ok());
}

/// Test that clips are named as MP3 whatever the config file says
#[test]
fn test_pipeline_options_withLegacyClipExtension_shouldNameMp3Clips() {
    let json = r#"{
        "voice": "nova",
        "output": { "clip_extension": "ogg", "sequence_width": 3 }
    }"#;
    let config: Config = serde_json::from_str(json).expect("legacy key should be ignored");

    let options = PipelineOptions::from_config(&config, "talk");

    assert_eq!(options.namer.clip_name(1), "talk.001.mp3");
}

/// Test that remote providers require an API key and a parseable endpoint
#[test]
fn test_config_validation_withRemoteProvider_shouldCheckKeyAndEndpoint() {
    let mut config = Config::default();
    config.synthesis.provider = SynthesisProvider::ElevenLabs;

    {
        let provider = config.synthesis.active_provider_config_mut();
        provider.api_key = "secret".to_string();
        provider.endpoint = "not a url".to_string();
    }
    assert!(config.validate().is_err());

    config.synthesis.active_provider_config_mut().endpoint = "https://tts.example.com".to_string();
    assert!(config.validate().is_ok());
}

/// Test that mutable access creates a missing provider entry
#[test]
fn test_active_provider_config_mut_withMissingEntry_shouldCreateIt() {
    let mut config = Config::default();
    config.synthesis.available_providers.clear();
    config.synthesis.provider = SynthesisProvider::OpenAI;

    config.synthesis.active_provider_config_mut().model = "tts-1-hd".to_string();

    assert_eq!(config.synthesis.available_providers.len(), 1);
    assert_eq!(config.synthesis.get_model(), "tts-1-hd");
}

/// Test provider name parsing and display
#[test]
fn test_provider_from_str_withVariousNames_shouldParse() {
    assert_eq!(SynthesisProvider::from_str("OpenAI").unwrap(), SynthesisProvider::OpenAI);
    assert_eq!(SynthesisProvider::from_str("elevenlabs").unwrap(), SynthesisProvider::ElevenLabs);
    assert_eq!(SynthesisProvider::from_str("MOCK").unwrap(), SynthesisProvider::Mock);
    assert!(SynthesisProvider::from_str("polly").is_err());

    assert_eq!(SynthesisProvider::ElevenLabs.to_string(), "elevenlabs");
    assert_eq!(SynthesisProvider::ElevenLabs.display_name(), "ElevenLabs");
    assert_eq!(SynthesisProvider::Mock.api_key_env_var(), None);
    assert_eq!(ProviderConfig::new(SynthesisProvider::Mock).provider_type, "mock");
}

/// Test log level mapping
#[test]
fn test_log_level_to_level_filter_shouldMapEveryLevel() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
    assert_eq!(LogLevel::Info.to_level_filter(), log::LevelFilter::Info);
    assert_eq!(LogLevel::Debug.to_level_filter(), log::LevelFilter::Debug);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
