use std::sync::Arc;

use crate::modules::vision::DescriptionProvider;
use crate::shared::constants::{DEFAULT_IMAGE_MIME_TYPE, FALLBACK_DESCRIPTION};

/// Best-effort image descriptions: provider failures never reach the caller
pub struct DescriptionService {
    provider: Arc<dyn DescriptionProvider>,
}

impl DescriptionService {
    pub fn new(provider: Arc<dyn DescriptionProvider>) -> Self {
        Self { provider }
    }

    /// Describe an image, substituting [`FALLBACK_DESCRIPTION`] on any error
    pub async fn describe_or_fallback(&self, image: &[u8], content_type: Option<&str>) -> String {
        let mime_type = content_type
            .filter(|ct| ct.starts_with("image/"))
            .unwrap_or(DEFAULT_IMAGE_MIME_TYPE);

        match self.provider.describe(image, mime_type).await {
            Ok(description) => description,
            Err(e) => {
                tracing::warn!("Image description failed, using fallback: {}", e);
                FALLBACK_DESCRIPTION.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{FailingProvider, StubProvider};

    #[tokio::test]
    async fn test_returns_provider_description() {
        let provider = Arc::new(StubProvider::new("No waste is detected in the image."));
        let service = DescriptionService::new(provider.clone());

        let description = service
            .describe_or_fallback(b"img", Some("image/png"))
            .await;

        assert_eq!(description, "No waste is detected in the image.");
        assert_eq!(provider.calls(), 1);
        assert_eq!(provider.last_mime_type().as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn test_non_image_content_type_defaults_to_jpeg() {
        let provider = Arc::new(StubProvider::new("ok"));
        let service = DescriptionService::new(provider.clone());

        service
            .describe_or_fallback(b"img", Some("application/octet-stream"))
            .await;
        assert_eq!(provider.last_mime_type().as_deref(), Some("image/jpeg"));

        service.describe_or_fallback(b"img", None).await;
        assert_eq!(provider.last_mime_type().as_deref(), Some("image/jpeg"));
    }

    #[tokio::test]
    async fn test_failure_uses_fallback() {
        let service = DescriptionService::new(Arc::new(FailingProvider));

        let description = service.describe_or_fallback(b"img", None).await;

        assert_eq!(description, FALLBACK_DESCRIPTION);
    }
}
