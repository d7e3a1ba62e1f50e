//! Shared HTTP client.
//!
//! One `reqwest::Client` per process so every Gemini call reuses the same
//! connection pool.

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;

static HTTP_CLIENT: OnceCell<reqwest::Client> = OnceCell::new();

const USER_AGENT: &str = concat!("larder/", env!("CARGO_PKG_VERSION"));

/// Get (or lazily build) the shared HTTP client
pub fn get_http_client() -> Result<&'static reqwest::Client> {
    HTTP_CLIENT.get_or_try_init(|| {
        reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")
    })
}
