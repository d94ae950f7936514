//! Configuration error types.

use std::panic::Location;

/// Configuration error carrying the raise site.
///
/// # Examples
///
/// ```
/// use scheherazade_error::ConfigError;
///
/// let err = ConfigError::new("pacing interval must be positive");
/// assert!(err.message.contains("pacing"));
/// assert!(format!("{}", err).contains("invalid pipeline configuration"));
/// ```
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// What was wrong with the configuration
    pub message: String,
    /// Where the error was raised
    pub location: &'static Location<'static>,
}

impl ConfigError {
    /// Create a configuration error at the caller's location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: Location::caller(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid pipeline configuration: {} ({})",
            self.message, self.location
        )
    }
}

impl std::error::Error for ConfigError {}
