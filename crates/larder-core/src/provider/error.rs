use thiserror::Error;

/// Transport-level failure talking to a hosted service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Failed to send request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },
}

/// Why a recipe could not be produced.
///
/// The UI collapses all of these into one generic notice; the variants exist
/// for logs and tests.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Service returned no recipe")]
    EmptyResponse,

    #[error("Malformed recipe JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Recipe is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Nothing to generate from: enter a craving or add a photo")]
    EmptyRequest,
}
