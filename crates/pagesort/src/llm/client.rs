//! High-level LLM operations: page transcription and file-name generation.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, instrument};

use crate::config::LlmConfig;
use crate::document::{FileNameGeneration, PageContent};

use super::error::LlmError;
use super::model::{DecodingParams, Model, DECODING};
use super::prompts;
use super::response::{parse_file_name_generation, response_schema};
use super::transport::{HttpTransport, MessagesTransport};
use super::wire::{ContentBlock, ImageSource, Message, MessagesRequest};

/// Client for the two LLM operations the pipeline needs.
///
/// Every request carries [`DECODING`]; callers only choose the model.
#[derive(Clone)]
pub struct LlmClient {
    transport: Arc<dyn MessagesTransport>,
    default_model: Model,
}

impl LlmClient {
    pub fn new(transport: Arc<dyn MessagesTransport>, default_model: Model) -> Self {
        Self {
            transport,
            default_model,
        }
    }

    /// Builds a client talking HTTPS to the configured endpoint.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::new(Arc::new(transport), config.default_model))
    }

    pub fn default_model(&self) -> Model {
        self.default_model
    }

    pub fn decoding(&self) -> DecodingParams {
        DECODING
    }

    fn build_request(&self, model: Model, messages: Vec<Message>) -> MessagesRequest {
        MessagesRequest {
            model: model.id().to_string(),
            max_tokens: DECODING.max_tokens,
            temperature: DECODING.temperature,
            top_p: DECODING.top_p,
            top_k: DECODING.top_k,
            system: prompts::SYSTEM_MESSAGE.to_string(),
            messages,
        }
    }

    async fn complete(&self, request: MessagesRequest) -> Result<String, LlmError> {
        let response = self.transport.send(&request).await?;
        match response.last_text() {
            Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
            _ => Err(LlmError::EmptyResponse),
        }
    }

    /// Transcribes one page into an XML fragment `<page number="N">...</page>`.
    ///
    /// The reply is prefilled with the opening tag, which is prepended to the
    /// returned text.
    #[instrument(skip(self, page), fields(page = %page.page_number, model = %model))]
    pub async fn transcribe_page(
        &self,
        model: Model,
        page: &PageContent,
    ) -> Result<String, LlmError> {
        if page.image.is_none() && page.text.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(LlmError::EmptyPage {
                page: page.page_number.clone(),
            });
        }

        let mut content = vec![ContentBlock::text(prompts::page_intro(&page.page_number))];
        if let Some(image) = &page.image {
            content.push(ContentBlock::Image {
                source: ImageSource::base64(image.media_type.clone(), STANDARD.encode(&image.data)),
            });
        }
        if let Some(text) = page.text.as_deref().filter(|t| !t.trim().is_empty()) {
            content.push(ContentBlock::text(prompts::page_text_hint(text)));
        }
        content.push(ContentBlock::text(prompts::page_instructions(&page.page_number)));

        let prefill = prompts::page_prefill(&page.page_number);
        let request = self.build_request(
            model,
            vec![Message::user(content), Message::prefill(prefill.clone())],
        );

        let text = self.complete(request).await?;
        debug!(chars = text.len(), "Page transcribed");
        Ok(format!("{}{}", prefill, text))
    }

    /// Generates a file name and reasoning record from a document transcript.
    ///
    /// Fails with [`LlmError::SchemaMismatch`] when the answer does not
    /// satisfy the response schema.
    #[instrument(skip(self, transcript), fields(model = %model))]
    pub async fn generate_file_name(
        &self,
        model: Model,
        transcript: &str,
    ) -> Result<FileNameGeneration, LlmError> {
        let prompt = prompts::file_name_prompt(transcript, response_schema());
        let request = self.build_request(
            model,
            vec![
                Message::user(vec![ContentBlock::text(prompt)]),
                Message::prefill("{"),
            ],
        );

        let text = self.complete(request).await?;
        let generation = parse_file_name_generation(&format!("{{{}", text))?;
        debug!(file_name = %generation.file_name, "File name generated");
        Ok(generation)
    }
}
