//! Core data types for the Scheherazade narrative pipeline.
//!
//! This crate provides the foundation data types shared across the
//! pipeline crates, and the [`ScheherazadeDriver`] trait that abstracts
//! the text-completion endpoint.

mod driver;
mod message;
mod request;
mod role;

pub use driver::ScheherazadeDriver;
pub use message::Message;
pub use request::{
    DEFAULT_TEMPERATURE, DEFAULT_TOP_P, GenerateRequest, GenerateResponse, GenerationConfig,
    MAX_OUTPUT_TOKENS,
};
pub use role::Role;
