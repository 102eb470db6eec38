use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{AudioSample, DomainError};

/// Result of a recognition request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionResult {
    /// Transcribed text. Never empty; an empty transcript is reported as
    /// `Unintelligible` instead.
    pub text: String,
}

/// Port for speech recognition.
///
/// Implementations call an external recognition service. No retries happen
/// at this layer; a single failed attempt surfaces immediately.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Transcribe a captured utterance to text.
    ///
    /// Fails with `Unintelligible` when the service understood nothing
    /// (distinct from a transport error), `RecognitionService` for
    /// transport or service-side errors with provider detail preserved,
    /// or `RecognitionTimeout` when the request timed out client-side.
    async fn transcribe(&self, sample: &AudioSample) -> Result<TranscriptionResult, DomainError>;
}
