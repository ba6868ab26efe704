mod client;
mod pacer;
mod parse;

pub use client::LlmClient;
pub use pacer::Pacer;
pub use parse::{parse_json_response, strip_code_fence};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("empty completion: response carried no text content")]
    EmptyCompletion,

    #[error("failed to parse structured response: {0}")]
    Parse(String),
}
