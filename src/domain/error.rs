use thiserror::Error;

/// Domain-level errors for Voxlate.
///
/// Every pipeline stage maps its provider-specific failures onto one of
/// these variants; the Display strings are the user-visible status lines.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Listening timed out while waiting for speech to start")]
    CaptureTimeout,

    #[error("Audio device error: {message}")]
    AudioDevice { message: String },

    #[error("Speech recognition could not understand the audio")]
    Unintelligible,

    #[error("Speech recognition request failed: {0}")]
    RecognitionService(String),

    #[error("Speech recognition timed out: {0}")]
    RecognitionTimeout(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("History file not found: {0}")]
    HistoryNotFound(String),

    #[error("History file is corrupted: {0}")]
    HistoryCorrupt(String),

    #[error("History I/O error: {0}")]
    HistoryIo(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for DomainError {
    fn from(err: toml::de::Error) -> Self {
        DomainError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DomainError {
    fn from(err: toml::ser::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_failures_have_distinct_messages() {
        let messages = [
            DomainError::CaptureTimeout.to_string(),
            DomainError::Unintelligible.to_string(),
            DomainError::RecognitionService("boom".to_string()).to_string(),
            DomainError::Translation("boom".to_string()).to_string(),
            DomainError::HistoryCorrupt("boom".to_string()).to_string(),
        ];

        for (i, a) in messages.iter().enumerate() {
            for b in messages.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_provider_detail_is_preserved() {
        let err = DomainError::RecognitionService("HTTP 503 from speech service".to_string());
        assert!(err.to_string().contains("HTTP 503"));
    }
}
