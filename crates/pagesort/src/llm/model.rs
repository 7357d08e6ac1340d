//! Hosted model choices and the fixed decoding configuration.

use serde::{Deserialize, Serialize};

/// Hosted model used for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    /// Faster, cheaper tier.
    Haiku,
    /// Stronger, slower tier.
    #[default]
    Sonnet,
}

impl Model {
    /// The provider's model identifier.
    pub fn id(&self) -> &'static str {
        match self {
            Model::Haiku => "claude-3-haiku-20240307",
            Model::Sonnet => "claude-3-5-sonnet-20240620",
        }
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecodingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_tokens: u32,
}

/// Deterministic, low-variance decoding for structured extraction.
pub const DECODING: DecodingParams = DecodingParams {
    temperature: 0.0,
    top_p: 0.0,
    top_k: 0,
    max_tokens: 4096,
};
