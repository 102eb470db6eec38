pub mod audio;
pub mod config;
pub mod history;
pub mod recognizer;
pub mod translator;

pub use audio::AudioCapture;
pub use config::ConfigStore;
pub use history::HistoryStore;
pub use recognizer::{SpeechRecognizer, TranscriptionResult};
pub use translator::{TranslationResult, Translator};
