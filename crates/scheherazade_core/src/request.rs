//! Request and response types for text generation.

use crate::Message;
use serde::{Deserialize, Serialize};

/// Hard ceiling on generated output size, in tokens.
///
/// The pipeline always uses the same ceiling regardless of segment size;
/// the segment planner keeps per-segment targets within it.
pub const MAX_OUTPUT_TOKENS: u32 = 65_536;

/// Default sampling temperature for narrative generation.
pub const DEFAULT_TEMPERATURE: f32 = 0.9;

/// Default nucleus sampling threshold.
pub const DEFAULT_TOP_P: f32 = 0.95;

/// Fixed sampling configuration for a generation call.
///
/// # Examples
///
/// ```
/// use scheherazade_core::GenerationConfig;
///
/// let config = GenerationConfig::default();
/// assert_eq!(config.max_output_tokens, 65_536);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Sampling temperature
    pub temperature: f32,
    /// Nucleus sampling threshold
    pub top_p: f32,
    /// Hard output-size ceiling in tokens
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        }
    }
}

/// A text generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GenerateRequest {
    /// Conversation messages, system instruction first when present
    pub messages: Vec<Message>,
    /// Sampling configuration
    pub config: GenerationConfig,
    /// Optional model override
    pub model: Option<String>,
}

impl GenerateRequest {
    /// Creates a request from a single user prompt with default sampling.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(prompt)],
            config: GenerationConfig::default(),
            model: None,
        }
    }
}

/// The response from a generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Generated text, candidates concatenated in order
    pub text: String,
}
