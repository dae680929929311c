//! Image-to-prompt enrichment call.

use async_trait::async_trait;
use designflow_core::constants::ANALYSIS_INSTRUCTION;

use crate::ai_types::{ChatRequest, ContentPart, Message};
use crate::client::{LlmClient, truncate};
use crate::error::LlmError;

/// Produces a generation prompt for a design image.
#[async_trait]
pub trait DescriptionGenerator: Send + Sync {
    /// Returns non-empty, trimmed text describing the image at `image_url`.
    async fn describe(&self, image_url: &str) -> Result<String, LlmError>;
}

impl LlmClient {
    /// Sends the fixed analysis instruction together with the image reference.
    ///
    /// # Errors
    /// Returns `LlmError::EmptyResponse` if the model answers with blank text,
    /// or any transport/status error from [`LlmClient::chat_completion`].
    pub async fn describe_design_image(&self, image_url: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message::user(vec![
                ContentPart::text(ANALYSIS_INSTRUCTION),
                ContentPart::image(image_url),
            ])],
            max_tokens: Some(self.max_tokens),
        };

        let content = self.chat_completion(&request).await?;
        let text = content.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        tracing::debug!(image_url, prompt = truncate(text, 80), "Design image described");
        Ok(text.to_owned())
    }
}

#[async_trait]
impl DescriptionGenerator for LlmClient {
    async fn describe(&self, image_url: &str) -> Result<String, LlmError> {
        self.describe_design_image(image_url).await
    }
}
