use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::adapters::wav;
use crate::domain::config::RecognitionConfig;
use crate::domain::{AudioSample, DomainError};
use crate::ports::{SpeechRecognizer, TranscriptionResult};

/// Speech recognition over Deepgram's pre-recorded listen API.
///
/// One POST per utterance, no retries; a failed attempt surfaces
/// immediately with the provider detail preserved.
pub struct DeepgramRecognizer {
    client: Client,
    endpoint: Url,
    api_key: String,
    language: String,
}

impl DeepgramRecognizer {
    pub fn new(config: &RecognitionConfig) -> Result<Self, DomainError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| DomainError::Config(format!("Invalid recognition endpoint: {e}")))?;

        let client = Client::builder()
            .use_rustls_tls()
            .user_agent(format!("Voxlate/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                DomainError::RecognitionService(format!("Failed to create HTTP client: {e}"))
            })?;

        info!(endpoint = %endpoint, language = %config.language, "DeepgramRecognizer created");

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl SpeechRecognizer for DeepgramRecognizer {
    async fn transcribe(&self, sample: &AudioSample) -> Result<TranscriptionResult, DomainError> {
        if sample.buffer().is_empty() {
            return Err(DomainError::Unintelligible);
        }

        let body = wav::encode_wav(sample.buffer())?;

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("language", &self.language)
            .append_pair("punctuate", "true");

        debug!(
            duration_secs = sample.buffer().duration_secs(),
            bytes = body.len(),
            "Sending utterance for recognition"
        );

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "audio/wav")
            .header(AUTHORIZATION, format!("Token {}", self.api_key))
            .body(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::RecognitionService(format!(
                "HTTP {status} from speech service"
            )));
        }

        let parsed: ListenResponse = response
            .json()
            .await
            .map_err(|e| DomainError::RecognitionService(format!("Malformed response: {e}")))?;

        match parsed.transcript() {
            Some(text) => {
                info!(chars = text.len(), "Utterance recognized");
                Ok(TranscriptionResult { text })
            }
            None => Err(DomainError::Unintelligible),
        }
    }
}

fn map_transport_error(err: reqwest::Error) -> DomainError {
    if err.is_timeout() {
        DomainError::RecognitionTimeout(err.to_string())
    } else {
        DomainError::RecognitionService(err.to_string())
    }
}

#[derive(Debug, Deserialize, Default)]
struct ListenResponse {
    #[serde(default)]
    results: ListenResults,
}

#[derive(Debug, Deserialize, Default)]
struct ListenResults {
    #[serde(default)]
    channels: Vec<ListenChannel>,
}

#[derive(Debug, Deserialize, Default)]
struct ListenChannel {
    #[serde(default)]
    alternatives: Vec<ListenAlternative>,
}

#[derive(Debug, Deserialize, Default)]
struct ListenAlternative {
    #[serde(default)]
    transcript: String,
}

impl ListenResponse {
    /// Best transcript, or None when the service understood nothing.
    fn transcript(&self) -> Option<String> {
        let text = self
            .results
            .channels
            .first()?
            .alternatives
            .first()?
            .transcript
            .trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_extraction() {
        let parsed: ListenResponse = serde_json::from_str(
            r#"{
                "results": {
                    "channels": [
                        { "alternatives": [ { "transcript": "hello world", "confidence": 0.98 } ] }
                    ]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(parsed.transcript().as_deref(), Some("hello world"));
    }

    #[test]
    fn test_blank_transcript_means_unintelligible() {
        let parsed: ListenResponse = serde_json::from_str(
            r#"{ "results": { "channels": [ { "alternatives": [ { "transcript": "  " } ] } ] } }"#,
        )
        .unwrap();
        assert!(parsed.transcript().is_none());
    }

    #[test]
    fn test_missing_channels_means_unintelligible() {
        let parsed: ListenResponse = serde_json::from_str(r#"{ "results": {} }"#).unwrap();
        assert!(parsed.transcript().is_none());
    }
}
