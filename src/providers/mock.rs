/*!
 * Mock synthesizer implementations for testing and dry runs.
 *
 * This module provides a mock synthesizer that simulates different behaviors:
 * - `MockSynthesizer::working()` - Always succeeds with fake audio
 * - `MockSynthesizer::intermittent(n)` - Fails every n-th request
 * - `MockSynthesizer::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::SynthesisError;
use crate::providers::Synthesizer;

/// Behavior mode for the mock synthesizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails every Nth request
    Intermittent { fail_every: usize },
    /// Fails whenever the text equals the given payload
    FailOnText(&'static str),
    /// Always fails with an error
    Failing,
    /// Earlier requests take longer, so completions arrive in reverse order
    Staggered { base_ms: u64 },
}

/// Mock synthesizer for testing narration behavior
#[derive(Debug, Clone)]
pub struct MockSynthesizer {
    behavior: MockBehavior,
    /// Shared between clones
    request_count: Arc<AtomicUsize>,
    /// (text, voice) of every request, in arrival order
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockSynthesizer {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn fail_on(text: &'static str) -> Self {
        Self::new(MockBehavior::FailOnText(text))
    }

    pub fn staggered(base_ms: u64) -> Self {
        Self::new(MockBehavior::Staggered { base_ms })
    }

    /// Number of synthesis calls received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Snapshot of received (text, voice) pairs
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().clone()
    }

    /// The fake audio produced for a given request
    pub fn audio_for(text: &str, voice: &str) -> Bytes {
        Bytes::from(format!("MOCK-MP3:{}:{}", voice, text))
    }
}

#[async_trait]
impl Synthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Bytes, SynthesisError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push((text.to_string(), voice.to_string()));

        match self.behavior {
            MockBehavior::Working => Ok(Self::audio_for(text, voice)),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(SynthesisError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(Self::audio_for(text, voice))
                }
            }

            MockBehavior::FailOnText(target) => {
                if text == target {
                    Err(SynthesisError::ApiError {
                        message: format!("Simulated failure for '{}'", text),
                        status_code: 500,
                    })
                } else {
                    Ok(Self::audio_for(text, voice))
                }
            }

            MockBehavior::Failing => Err(SynthesisError::ApiError {
                message: "Simulated synthesizer failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Staggered { base_ms } => {
                tokio::time::sleep(Duration::from_millis(base_ms / (count as u64 + 1))).await;
                Ok(Self::audio_for(text, voice))
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
