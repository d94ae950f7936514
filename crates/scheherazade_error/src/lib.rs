//! Error types for the Scheherazade narrative pipeline.
//!
//! Component-level pipeline functions never throw past their own boundary
//! (parsing, analysis and recap all have documented default returns), so
//! the taxonomy here is deliberately small: model-call errors with
//! quota/unavailable classification, and configuration errors.

mod config;
mod model;

pub use config::ConfigError;
pub use model::{FailureClass, ModelError, ModelErrorKind};

/// Crate-level error variants.
#[derive(Debug, derive_more::From)]
pub enum ScheherazadeErrorKind {
    /// Model call error
    Model(ModelError),
    /// Configuration error
    Config(ConfigError),
}

impl std::fmt::Display for ScheherazadeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheherazadeErrorKind::Model(e) => write!(f, "{}", e),
            ScheherazadeErrorKind::Config(e) => write!(f, "{}", e),
        }
    }
}

/// Scheherazade error with kind discrimination.
#[derive(Debug)]
pub struct ScheherazadeError(Box<ScheherazadeErrorKind>);

impl ScheherazadeError {
    /// Create a new error from a kind.
    pub fn new(kind: ScheherazadeErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ScheherazadeErrorKind {
        &self.0
    }

    /// Classify this error for fallback routing.
    ///
    /// Non-model errors are always [`FailureClass::Other`].
    pub fn failure_class(&self) -> FailureClass {
        match self.kind() {
            ScheherazadeErrorKind::Model(e) => e.failure_class(),
            ScheherazadeErrorKind::Config(_) => FailureClass::Other,
        }
    }
}

impl std::fmt::Display for ScheherazadeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Scheherazade Error: {}", self.0)
    }
}

impl std::error::Error for ScheherazadeError {}

// Generic From implementation for any type that converts to ScheherazadeErrorKind
impl<T> From<T> for ScheherazadeError
where
    T: Into<ScheherazadeErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Scheherazade operations.
pub type ScheherazadeResult<T> = std::result::Result<T, ScheherazadeError>;
