//! Wire types for the Gemini `generateContent` REST endpoint.

use scheherazade_core::{GenerateRequest, Role};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
    pub generation_config: WireGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Part {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SystemInstruction {
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireGenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub content: Option<Content>,
}

/// Convert a pipeline request into Gemini wire format.
///
/// System messages become the `systemInstruction` block; user and
/// assistant turns map to `user`/`model` contents.
pub(crate) fn to_wire_request(req: &GenerateRequest) -> GenerateContentRequest {
    let mut system_parts = Vec::new();
    let mut contents = Vec::new();

    for message in &req.messages {
        match message.role() {
            Role::System => system_parts.push(Part {
                text: message.content().to_string(),
            }),
            Role::User => contents.push(Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: message.content().to_string(),
                }],
            }),
            Role::Assistant => contents.push(Content {
                role: Some("model".to_string()),
                parts: vec![Part {
                    text: message.content().to_string(),
                }],
            }),
        }
    }

    let system_instruction = if system_parts.is_empty() {
        None
    } else {
        Some(SystemInstruction {
            parts: system_parts,
        })
    };

    GenerateContentRequest {
        contents,
        system_instruction,
        generation_config: WireGenerationConfig {
            temperature: req.config.temperature,
            top_p: req.config.top_p,
            max_output_tokens: req.config.max_output_tokens,
        },
    }
}

/// Concatenate candidate text parts in order.
pub(crate) fn response_text(response: &GenerateContentResponse) -> String {
    let mut texts = Vec::new();
    for candidate in &response.candidates {
        if let Some(content) = &candidate.content {
            for part in &content.parts {
                texts.push(part.text.as_str());
            }
        }
    }
    texts.join("\n")
}
