pub mod audio_cpal;
pub mod config_store;
pub mod deepgram;
pub mod json_history;
pub mod translate_gtx;
pub mod wav;

pub use audio_cpal::CpalUtteranceCapture;
pub use config_store::TomlConfigStore;
pub use deepgram::DeepgramRecognizer;
pub use json_history::JsonHistoryStore;
pub use translate_gtx::GtxTranslator;
