use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Target sample rate in Hz.
    pub sample_rate: u32,
    /// Bounded wait for speech to start, in seconds.
    pub listen_timeout_secs: u64,
    /// Hard cap on a single utterance, in seconds.
    pub max_utterance_secs: u32,
    /// Trailing silence that ends an utterance, in milliseconds.
    pub silence_hold_ms: u64,
    /// RMS level (0.0 - 1.0) that counts as speech onset.
    pub speech_threshold: f32,
    /// Input device name, or None for the system default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// File name of the capture spool inside the data directory.
    pub spool_file: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            listen_timeout_secs: 5,
            max_utterance_secs: 30,
            silence_hold_ms: 800,
            speech_threshold: 0.015,
            device: None,
            spool_file: "capture.wav".to_string(),
        }
    }
}

impl AudioConfig {
    /// Utterance cap in samples at the target rate.
    pub fn max_utterance_samples(&self) -> usize {
        self.max_utterance_secs as usize * self.sample_rate as usize
    }
}

/// Speech-recognition service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Recognition endpoint URL.
    pub endpoint: String,
    /// API key sent as the request token.
    pub api_key: String,
    /// Spoken language (ISO 639-1 code).
    pub language: String,
    /// Client-side request timeout, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.deepgram.com/v1/listen".to_string(),
            api_key: String::new(),
            language: "en".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Translation service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Translation endpoint URL.
    pub endpoint: String,
    /// Target language (ISO 639-1 code).
    pub target_language: String,
    /// Client-side request timeout, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
            target_language: "fa".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// History persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// File name of the history file inside the data directory.
    pub file: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            file: "translation_history.json".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Enable file logging with rotation.
    pub file_logging: bool,
    /// Maximum number of log files to keep.
    pub max_files: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: true,
            max_files: 7,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub audio: AudioConfig,
    pub recognition: RecognitionConfig,
    pub translation: TranslationConfig,
    pub history: HistoryConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Create a new AppConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the history file path against the data directory.
    pub fn history_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.history.file)
    }

    /// Resolve the capture spool path against the data directory.
    pub fn spool_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.audio.spool_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::new();
        assert_eq!(config.audio.sample_rate, 16_000);
        assert_eq!(config.audio.listen_timeout_secs, 5);
        assert_eq!(config.translation.target_language, "fa");
        assert_eq!(config.history.file, "translation_history.json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_max_utterance_samples() {
        let config = AudioConfig::default();
        assert_eq!(config.max_utterance_samples(), 30 * 16_000);
    }

    #[test]
    fn test_paths_resolve_against_data_dir() {
        let config = AppConfig::new();
        let data_dir = Path::new("/tmp/voxlate");
        assert_eq!(
            config.history_path(data_dir),
            Path::new("/tmp/voxlate/translation_history.json")
        );
        assert_eq!(
            config.spool_path(data_dir),
            Path::new("/tmp/voxlate/capture.wav")
        );
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [translation]
            target_language = "ar"
            "#,
        )
        .unwrap();
        assert_eq!(config.translation.target_language, "ar");
        assert_eq!(config.audio.sample_rate, 16_000);
    }
}
