/*!
 * Speech synthesis backends.
 *
 * This module contains client implementations for the supported providers:
 * - OpenAI: OpenAI-compatible `/audio/speech` endpoint
 * - ElevenLabs: ElevenLabs text-to-speech API
 * - Mock: in-process synthesizer used by tests and dry runs
 */

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{SynthesisConfig, SynthesisProvider};
use crate::errors::SynthesisError;

/// Common trait for all speech synthesis backends
///
/// Implementations are shared across concurrently running narration tasks,
/// hence the `Send + Sync` bound.
#[async_trait]
pub trait Synthesizer: Send + Sync + Debug {
    /// Turn `text` into encoded audio spoken by `voice`
    ///
    /// # Returns
    /// * `Result<Bytes, SynthesisError>` - The audio bytes or an error
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Bytes, SynthesisError>;

    /// Short backend name for logs
    fn name(&self) -> &str;
}

/// Build the synthesizer selected by the configuration
pub fn from_config(config: &SynthesisConfig) -> Result<Arc<dyn Synthesizer>> {
    let timeout = Duration::from_secs(config.get_timeout_secs());
    let synthesizer: Arc<dyn Synthesizer> = match config.provider {
        SynthesisProvider::OpenAI => Arc::new(openai::OpenAiSpeech::new(
            config.get_api_key(),
            config.get_endpoint(),
            config.get_model(),
            timeout,
        )?),
        SynthesisProvider::ElevenLabs => Arc::new(elevenlabs::ElevenLabs::new(
            config.get_api_key(),
            config.get_endpoint(),
            config.get_model(),
            timeout,
        )?),
        SynthesisProvider::Mock => Arc::new(mock::MockSynthesizer::working()),
    };
    Ok(synthesizer)
}

/// Map a non-success HTTP response onto a synthesis error
pub(crate) async fn error_from_response(response: reqwest::Response) -> SynthesisError {
    let status = response.status();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    match status.as_u16() {
        401 | 403 => SynthesisError::AuthenticationError(message),
        code => SynthesisError::ApiError {
            status_code: code,
            message,
        },
    }
}

pub mod elevenlabs;
pub mod mock;
pub mod openai;
