use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Result of a translation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResult {
    /// The final renderable form: translated, letterforms joined, and
    /// reordered for bidirectional display. Not the raw translated text.
    pub display_text: String,
}

/// Port for translation into a target language.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_language` and shape the result for
    /// visual rendering.
    ///
    /// Fails with `Translation` carrying the underlying cause; callers
    /// display the failure rather than crash.
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<TranslationResult, DomainError>;
}
