use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, error};
use reqwest::{Client, header};
use serde::Serialize;
use std::time::Duration;

use crate::errors::SynthesisError;

use super::{Synthesizer, error_from_response};

const XI_API_KEY_HEADER: &str = "xi-api-key";

/// ElevenLabs text-to-speech client. The voice is an ElevenLabs voice id.
#[derive(Debug)]
pub struct ElevenLabs {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct TextToSpeechBody<'a> {
    text: &'a str,
    model_id: &'a str,
}

impl ElevenLabs {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for ElevenLabs")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
        })
    }

    fn voice_url(&self, voice: &str) -> String {
        let base = if self.endpoint.is_empty() {
            "https://api.elevenlabs.io"
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/v1/text-to-speech/{}", base, voice)
    }
}

#[async_trait]
impl Synthesizer for ElevenLabs {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Bytes, SynthesisError> {
        if self.api_key.is_empty() {
            return Err(SynthesisError::AuthenticationError(
                "ElevenLabs API key is not set".to_string(),
            ));
        }

        let response = self
            .client
            .post(self.voice_url(voice))
            .header(XI_API_KEY_HEADER, &self.api_key)
            .header(header::ACCEPT, "audio/mpeg")
            .json(&TextToSpeechBody {
                text,
                model_id: &self.model,
            })
            .send()
            .await
            .map_err(|e| SynthesisError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let err = error_from_response(response).await;
            error!("ElevenLabs error: {}", err);
            return Err(err);
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::RequestFailed(e.to_string()))?;
        if audio.is_empty() {
            return Err(SynthesisError::EmptyAudio(voice.to_string()));
        }
        debug!("ElevenLabs returned {} bytes for voice {}", audio.len(), voice);
        Ok(audio)
    }

    fn name(&self) -> &str {
        "elevenlabs"
    }
}
