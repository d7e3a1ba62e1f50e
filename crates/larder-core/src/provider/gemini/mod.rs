//! Google Gemini backend.
//!
//! - recipe generation: `models/{model}:generateContent` with a JSON response schema
//! - illustration: `models/{model}:predict` (Imagen), square aspect ratio
//! - narration: `models/{model}:generateContent` with an audio response modality
//!
//! Authentication uses the `x-goog-api-key` header.

mod generate;
mod illustrate;
mod speech;
mod wire;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub use generate::parse_recipe_payload;

use super::{GenerationError, GenerationRequest, RecipeBackend, ServiceError};
use crate::config::Service;
use crate::http::get_http_client;
use crate::recipe::{Illustration, Recipe};
use crate::settings::Settings;

#[derive(Clone)]
pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
    tts_model: String,
    voice: String,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("tts_model", &self.tts_model)
            .field("voice", &self.voice)
            .finish()
    }
}

impl GeminiProvider {
    /// Build a provider from settings; fails when no API key can be found
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.api_key().ok_or_else(|| {
            anyhow::anyhow!(
                "No Gemini API key configured.\n\
                 Set it with: larder setup\n\
                 Or export {}",
                crate::config::API_KEY_ENV_VAR
            )
        })?;

        Ok(Self {
            api_key,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            text_model: settings.model_for(Service::Generation),
            image_model: settings.model_for(Service::Illustration),
            tts_model: settings.model_for(Service::Narration),
            voice: settings.voice.clone(),
            timeout: settings.request_timeout_secs.map(Duration::from_secs),
        })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    /// POST a JSON body and decode the JSON reply
    async fn post<B, R>(&self, model: &str, method: &str, body: &B) -> Result<R, ServiceError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(model, method);
        crate::verbose!("POST {url}");

        let client = get_http_client().map_err(|e| ServiceError::Api {
            status: 0,
            body: format!("{e:#}"),
        })?;

        let mut request = client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ServiceError::Api { status, body });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl RecipeBackend for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate_recipe(
        &self,
        request: &GenerationRequest,
    ) -> Result<Recipe, GenerationError> {
        generate::generate_recipe(self, request).await
    }

    async fn illustrate(&self, title: &str) -> Result<Illustration> {
        illustrate::illustrate(self, title).await
    }

    async fn synthesize_speech(&self, text: &str) -> Result<Vec<u8>> {
        speech::synthesize(self, text).await
    }
}
