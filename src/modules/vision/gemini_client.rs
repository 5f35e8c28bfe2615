use async_trait::async_trait;
use base64::prelude::*;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::VisionConfig;
use crate::modules::vision::{DescriptionProvider, ProviderError};
use crate::shared::constants::DESCRIPTION_PROMPT;

// =============================================================================
// WIRE TYPES (generateContent)
// =============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, trimmed
    fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// Google Gemini `generateContent` client
pub struct GeminiClient {
    client: Client,
    api_key: String,
    url: String,
}

impl GeminiClient {
    pub fn new(config: &VisionConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent("GeoCleanCore/0.1 (waste-report-system)")
            .build()?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            config.endpoint,
            urlencoding::encode(&config.model)
        );

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            url,
        })
    }
}

#[async_trait]
impl DescriptionProvider for GeminiClient {
    async fn describe(&self, image: &[u8], mime_type: &str) -> Result<String, ProviderError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    RequestPart::Text {
                        text: DESCRIPTION_PROMPT,
                    },
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type,
                            data: BASE64_STANDARD.encode(image),
                        },
                    },
                ],
            }],
        };

        debug!(
            "Requesting description for {} byte image ({})",
            image.len(),
            mime_type
        );

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        parsed.first_text().ok_or(ProviderError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn parse(raw: &str) -> GenerateContentResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_first_text_joins_parts_and_trims() {
        let response = parse(
            r#"{
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{"text": "  Waste is "}, {"text": "detected: plastic bottles.\n"}]
                    },
                    "finishReason": "STOP"
                }]
            }"#,
        );
        assert_eq!(
            response.first_text().as_deref(),
            Some("Waste is detected: plastic bottles.")
        );
    }

    #[test]
    fn test_first_text_empty_cases() {
        assert_eq!(parse(r#"{}"#).first_text(), None);
        assert_eq!(parse(r#"{"candidates": []}"#).first_text(), None);
        assert_eq!(
            parse(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).first_text(),
            None
        );
        assert_eq!(
            parse(r#"{"candidates": [{"content": {"parts": [{"text": "   "}]}}]}"#).first_text(),
            None
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    RequestPart::Text { text: "prompt" },
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/png",
                            data: BASE64_STANDARD.encode(b"abc"),
                        },
                    },
                ],
            }],
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "contents": [{
                    "parts": [
                        {"text": "prompt"},
                        {"inlineData": {"mimeType": "image/png", "data": "YWJj"}}
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_url_includes_model() {
        let client = GeminiClient::new(&VisionConfig {
            api_key: "key".to_string(),
            model: "gemini-1.5-flash".to_string(),
            endpoint: "http://localhost:9999".to_string(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();
        assert_eq!(
            client.url,
            "http://localhost:9999/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_request_error() {
        let client = GeminiClient::new(&VisionConfig {
            api_key: "key".to_string(),
            model: "gemini-1.5-flash".to_string(),
            endpoint: "http://127.0.0.1:1".to_string(),
            timeout: Duration::from_secs(2),
        })
        .unwrap();

        let result = client.describe(b"image", "image/jpeg").await;
        assert!(matches!(result, Err(ProviderError::Request(_))));
    }
}
