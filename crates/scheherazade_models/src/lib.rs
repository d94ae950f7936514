//! Model provider integration for the Scheherazade narrative pipeline.

mod gemini;

pub use gemini::{DEFAULT_MODEL, GeminiClient};
