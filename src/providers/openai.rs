use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, error};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::errors::SynthesisError;

use super::{Synthesizer, error_from_response};

/// Client for OpenAI-compatible speech endpoints
#[derive(Debug)]
pub struct OpenAiSpeech {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, e.g. `https://api.openai.com/v1`
    endpoint: String,
    /// Speech model
    model: String,
}

/// Request body for `POST /audio/speech`
#[derive(Debug, Serialize)]
pub struct SpeechRequest<'a> {
    /// The model to use
    pub model: &'a str,
    /// Text to speak
    pub input: &'a str,
    /// Voice identifier
    pub voice: &'a str,
    /// Audio container
    pub response_format: &'a str,
}

impl OpenAiSpeech {
    /// Create a new client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for OpenAI speech")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
        })
    }

    fn speech_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://api.openai.com/v1/audio/speech".to_string()
        } else {
            format!("{}/audio/speech", self.endpoint.trim_end_matches('/'))
        }
    }
}

#[async_trait]
impl Synthesizer for OpenAiSpeech {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Bytes, SynthesisError> {
        let request = SpeechRequest {
            model: &self.model,
            input: text,
            voice,
            response_format: "mp3",
        };

        let mut builder = self.client.post(self.speech_url()).json(&request);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SynthesisError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let err = error_from_response(response).await;
            error!("OpenAI speech error: {}", err);
            return Err(err);
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::RequestFailed(e.to_string()))?;
        if audio.is_empty() {
            return Err(SynthesisError::EmptyAudio(voice.to_string()));
        }
        debug!("OpenAI returned {} bytes of audio", audio.len());
        Ok(audio)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
