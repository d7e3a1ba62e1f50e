//! Generative-AI backends.
//!
//! The app talks to one backend for all three services (recipe generation,
//! illustration, narration). `GeminiProvider` is the hosted implementation;
//! tests substitute their own.

mod error;
pub mod gemini;

use anyhow::Result;
use async_trait::async_trait;

pub use error::{GenerationError, ServiceError};
pub use gemini::GeminiProvider;

use crate::capture::StillImage;
use crate::recipe::{Illustration, Recipe};

/// Text prompt used when no photo accompanies the craving
pub const TEXT_PROMPT_PREFIX: &str = "Create a recipe for:";

/// Text prompt sent alongside a photo of ingredients
pub const IMAGE_PROMPT_PREFIX: &str =
    "Identify the ingredients in this image and create a recipe using them.";

/// What the user asked for: a craving and optionally a photo of ingredients
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub craving: String,
    pub image: Option<StillImage>,
}

impl GenerationRequest {
    pub fn text(craving: impl Into<String>) -> Self {
        Self {
            craving: craving.into(),
            image: None,
        }
    }

    pub fn with_image(craving: impl Into<String>, image: StillImage) -> Self {
        Self {
            craving: craving.into(),
            image: Some(image),
        }
    }

    /// The text part of the prompt
    pub fn prompt(&self) -> String {
        let craving = self.craving.trim();
        match (&self.image, craving.is_empty()) {
            (Some(_), true) => IMAGE_PROMPT_PREFIX.to_string(),
            (Some(_), false) => format!("{IMAGE_PROMPT_PREFIX} {craving}"),
            (None, _) => format!("{TEXT_PROMPT_PREFIX} {craving}"),
        }
    }

    /// Nothing to generate from
    pub fn is_empty(&self) -> bool {
        self.craving.trim().is_empty() && self.image.is_none()
    }
}

/// Hosted generation, illustration and speech services
#[async_trait]
pub trait RecipeBackend: Send + Sync {
    /// Backend identifier for logs
    fn name(&self) -> &'static str;

    /// Generate a complete, validated recipe with a fresh id and timestamp
    async fn generate_recipe(
        &self,
        request: &GenerationRequest,
    ) -> Result<Recipe, GenerationError>;

    /// Render one square picture of the dish
    async fn illustrate(&self, title: &str) -> Result<Illustration>;

    /// Synthesize speech for one instruction.
    ///
    /// Returns raw signed 16-bit little-endian mono PCM at 24 kHz.
    async fn synthesize_speech(&self, text: &str) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_only_prompt() {
        let request = GenerationRequest::text("  spicy ramen ");
        assert_eq!(request.prompt(), "Create a recipe for: spicy ramen");
        assert!(!request.is_empty());
    }

    #[test]
    fn image_prompt_appends_craving() {
        let image = StillImage::jpeg(vec![0xFF, 0xD8, 0xFF, 0xD9]);
        let request = GenerationRequest::with_image("something quick", image.clone());
        assert_eq!(
            request.prompt(),
            format!("{IMAGE_PROMPT_PREFIX} something quick")
        );

        let bare = GenerationRequest::with_image("", image);
        assert_eq!(bare.prompt(), IMAGE_PROMPT_PREFIX);
    }

    #[test]
    fn blank_request_is_empty() {
        assert!(GenerationRequest::text("   ").is_empty());
    }
}
