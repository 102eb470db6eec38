use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::domain::config::TranslationConfig;
use crate::domain::display::shape_for_display;
use crate::domain::DomainError;
use crate::ports::{TranslationResult, Translator};

/// Translation over the public gtx endpoint.
///
/// The service returns the plain translated string; the adapter then joins
/// positional letterforms and reorders for bidirectional display, in that
/// order, before handing the text back.
pub struct GtxTranslator {
    client: Client,
    endpoint: Url,
}

impl GtxTranslator {
    pub fn new(config: &TranslationConfig) -> Result<Self, DomainError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| DomainError::Config(format!("Invalid translation endpoint: {e}")))?;

        let client = Client::builder()
            .use_rustls_tls()
            .user_agent(format!("Voxlate/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| DomainError::Translation(format!("Failed to create HTTP client: {e}")))?;

        info!(endpoint = %endpoint, "GtxTranslator created");

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Translator for GtxTranslator {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<TranslationResult, DomainError> {
        if text.trim().is_empty() {
            return Err(DomainError::Translation("Nothing to translate".to_string()));
        }

        let url = Url::parse_with_params(
            self.endpoint.as_str(),
            &[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target_language),
                ("dt", "t"),
                ("q", text),
            ],
        )
        .map_err(|e| DomainError::Translation(e.to_string()))?;

        debug!(target = %target_language, chars = text.len(), "Requesting translation");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::Translation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::Translation(format!(
                "HTTP {status} from translation service"
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| DomainError::Translation(format!("Malformed response: {e}")))?;

        let translated = extract_translation(&payload)?;
        let display_text = shape_for_display(&translated);

        info!(chars = display_text.len(), "Translation complete");

        Ok(TranslationResult { display_text })
    }
}

/// Pull the translated string out of the gtx payload: an array whose first
/// element is a list of segments, each segment's first element being a
/// translated chunk.
fn extract_translation(payload: &Value) -> Result<String, DomainError> {
    let segments = payload
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| DomainError::Translation("Unexpected response shape".to_string()))?;

    let mut translated = String::new();
    for segment in segments {
        if let Some(chunk) = segment.get(0).and_then(Value::as_str) {
            translated.push_str(chunk);
        }
    }

    if translated.trim().is_empty() {
        return Err(DomainError::Translation("Empty translation".to_string()));
    }
    Ok(translated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_translation_concatenates_segments() {
        let payload = json!([
            [["سلام ", "hello ", null, null, 10], ["دنیا", "world", null, null, 10]],
            null,
            "en"
        ]);
        assert_eq!(extract_translation(&payload).unwrap(), "سلام دنیا");
    }

    #[test]
    fn test_extract_translation_rejects_unexpected_shape() {
        let payload = json!({ "error": "nope" });
        let err = extract_translation(&payload).unwrap_err();
        assert!(matches!(err, DomainError::Translation(_)));
    }

    #[test]
    fn test_extract_translation_rejects_empty_result() {
        let payload = json!([[], null, "en"]);
        assert!(extract_translation(&payload).is_err());
    }
}
