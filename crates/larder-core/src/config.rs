use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary environment variable holding the Gemini API key
pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

/// Older deployments exported the key under this generic name
pub const LEGACY_API_KEY_ENV_VAR: &str = "API_KEY";

/// Base URL for the Generative Language API
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Prebuilt voice used for step narration
pub const DEFAULT_VOICE: &str = "Kore";

/// Camera device opened by the capture adapter on Linux
pub const DEFAULT_CAMERA_DEVICE: &str = "/dev/video0";

/// The three hosted model services the assistant talks to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    /// Structured recipe generation (text + optional image in, JSON out)
    Generation,
    /// Dish illustration (prompt in, square image out)
    Illustration,
    /// Step narration (instruction in, 24 kHz PCM out)
    Narration,
}

impl Service {
    /// Get the string identifier for this service
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Generation => "generation",
            Service::Illustration => "illustration",
            Service::Narration => "narration",
        }
    }

    /// Model used when the settings file does not override it
    pub fn default_model(&self) -> &'static str {
        match self {
            Service::Generation => "gemini-2.5-flash",
            Service::Illustration => "imagen-4.0-generate-001",
            Service::Narration => "gemini-2.5-flash-preview-tts",
        }
    }

    /// List all services
    pub fn all() -> &'static [Service] {
        &[Service::Generation, Service::Illustration, Service::Narration]
    }

    /// Human-readable display name for this service
    pub fn display_name(&self) -> &'static str {
        match self {
            Service::Generation => "Recipe generation",
            Service::Illustration => "Illustration",
            Service::Narration => "Narration",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Service {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "generation" | "text" | "recipe" => Ok(Service::Generation),
            "illustration" | "image" => Ok(Service::Illustration),
            "narration" | "speech" | "tts" => Ok(Service::Narration),
            _ => Err(format!(
                "Unknown service: {}. Available: generation, illustration, narration",
                s
            )),
        }
    }
}
