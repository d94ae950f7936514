//! Model-call error types and failure classification.

/// Coarse failure classification used for fallback routing.
///
/// The pipeline never retries within a run; it only needs to know whether
/// the model endpoint refused us for quota/availability reasons or failed
/// some other way. Both routes lead to the fallback artifact, but they are
/// logged and surfaced differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// Quota exhausted, rate limited, or the service is unavailable.
    QuotaExhausted,
    /// Any other model-call failure.
    Other,
}

/// Specific error conditions for model calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModelErrorKind {
    /// API key not found in environment
    MissingApiKey,
    /// API request failed before a response arrived (transport error)
    ApiRequest(String),
    /// HTTP error with status code and message
    HttpStatus {
        /// HTTP status code
        status_code: u16,
        /// Error message from the response body
        message: String,
    },
    /// Response arrived but could not be decoded
    ResponseParsing(String),
    /// Response decoded but contained no text candidates
    EmptyResponse,
}

impl std::fmt::Display for ModelErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelErrorKind::MissingApiKey => {
                write!(f, "GEMINI_API_KEY environment variable not set")
            }
            ModelErrorKind::ApiRequest(msg) => write!(f, "Model API request failed: {}", msg),
            ModelErrorKind::HttpStatus {
                status_code,
                message,
            } => write!(f, "HTTP {} error: {}", status_code, message),
            ModelErrorKind::ResponseParsing(msg) => {
                write!(f, "Failed to parse model response: {}", msg)
            }
            ModelErrorKind::EmptyResponse => {
                write!(f, "Model response contained no text candidates")
            }
        }
    }
}

/// Message markers that indicate quota exhaustion when no structured
/// status code is available. Provider SDKs are inconsistent about how
/// quota errors surface, so the substring net stays as a compatibility
/// fallback behind the status-code check.
const QUOTA_MARKERS: [&str; 4] = ["quota", "RESOURCE_EXHAUSTED", "rate limit", "unavailable"];

impl ModelErrorKind {
    /// Classify this error for fallback routing.
    ///
    /// HTTP 429 and 503 are authoritative quota/availability signals.
    /// For errors without a status code, falls back to matching known
    /// quota markers in the message text.
    ///
    /// # Examples
    ///
    /// ```
    /// use scheherazade_error::{FailureClass, ModelErrorKind};
    ///
    /// let err = ModelErrorKind::HttpStatus {
    ///     status_code: 429,
    ///     message: "Resource has been exhausted".to_string(),
    /// };
    /// assert_eq!(err.failure_class(), FailureClass::QuotaExhausted);
    ///
    /// let err = ModelErrorKind::ResponseParsing("bad JSON".to_string());
    /// assert_eq!(err.failure_class(), FailureClass::Other);
    /// ```
    pub fn failure_class(&self) -> FailureClass {
        match self {
            ModelErrorKind::HttpStatus { status_code, .. } => match status_code {
                429 | 503 => FailureClass::QuotaExhausted,
                _ => FailureClass::Other,
            },
            ModelErrorKind::ApiRequest(msg) => classify_message(msg),
            _ => FailureClass::Other,
        }
    }
}

fn classify_message(msg: &str) -> FailureClass {
    let lowered = msg.to_lowercase();
    if QUOTA_MARKERS
        .iter()
        .any(|marker| lowered.contains(&marker.to_lowercase()))
    {
        FailureClass::QuotaExhausted
    } else {
        FailureClass::Other
    }
}

/// Model error with source location tracking.
///
/// # Examples
///
/// ```
/// use scheherazade_error::{ModelError, ModelErrorKind};
///
/// let err = ModelError::new(ModelErrorKind::MissingApiKey);
/// assert!(format!("{}", err).contains("GEMINI_API_KEY"));
/// ```
#[derive(Debug, Clone)]
pub struct ModelError {
    /// The kind of error that occurred
    pub kind: ModelErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ModelError {
    /// Create a new ModelError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ModelErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Classify this error for fallback routing.
    pub fn failure_class(&self) -> FailureClass {
        self.kind.failure_class()
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Model Error: {} at line {} in {}",
            self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for ModelError {}
