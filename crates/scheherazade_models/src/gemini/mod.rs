//! Gemini REST client implementing [`ScheherazadeDriver`].

mod dto;

use async_trait::async_trait;
use dto::{GenerateContentResponse, response_text, to_wire_request};
use reqwest::Client;
use scheherazade_core::{GenerateRequest, GenerateResponse, ScheherazadeDriver};
use scheherazade_error::{ModelError, ModelErrorKind, ScheherazadeResult};
use tracing::{debug, error, instrument};

/// Default model used for narrative generation.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates a new Gemini client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - API key for authentication
    /// * `model` - Model identifier, e.g. `gemini-2.0-flash`
    #[instrument(skip(api_key), fields(model = %model))]
    pub fn new(api_key: String, model: String) -> Self {
        debug!(model = %model, "Created Gemini client");
        Self {
            client: Client::new(),
            api_key,
            model,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Creates a client from the `GEMINI_API_KEY` environment variable
    /// with the default model.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is not set.
    pub fn from_env() -> ScheherazadeResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ModelError::new(ModelErrorKind::MissingApiKey))?;
        Ok(Self::new(api_key, DEFAULT_MODEL.to_string()))
    }

    /// Overrides the endpoint base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Returns the model name.
    pub fn model_name(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ScheherazadeDriver for GeminiClient {
    #[instrument(skip(self, req), fields(model = %self.model))]
    async fn generate(&self, req: &GenerateRequest) -> ScheherazadeResult<GenerateResponse> {
        let model = req.model.as_deref().unwrap_or(&self.model);
        let url = format!("{}/{}:generateContent", self.base_url, model);
        let wire_request = to_wire_request(req);

        debug!(
            model = %model,
            message_count = req.messages.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "HTTP request failed");
                ModelError::new(ModelErrorKind::ApiRequest(format!("Request failed: {}", e)))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = %status, error = %error_text, "Gemini API error");

            return Err(ModelError::new(ModelErrorKind::HttpStatus {
                status_code: status.as_u16(),
                message: error_text,
            })
            .into());
        }

        let decoded: GenerateContentResponse = response.json().await.map_err(|e| {
            error!(error = ?e, "Failed to parse response");
            ModelError::new(ModelErrorKind::ResponseParsing(format!(
                "Failed to parse JSON: {}",
                e
            )))
        })?;

        let text = response_text(&decoded);
        if text.is_empty() {
            return Err(ModelError::new(ModelErrorKind::EmptyResponse).into());
        }

        debug!(
            candidates = decoded.candidates.len(),
            chars = text.len(),
            "Received response"
        );

        Ok(GenerateResponse { text })
    }
}
