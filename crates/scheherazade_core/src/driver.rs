//! The driver trait: the opaque text-completion boundary.

use crate::{GenerateRequest, GenerateResponse};
use async_trait::async_trait;
use scheherazade_error::ScheherazadeResult;

/// A fallible text-completion endpoint.
///
/// This is the only boundary in the pipeline that may return an error.
/// The orchestrator is the single layer responsible for catching driver
/// errors and deciding fallback; every other component has a documented
/// default return.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use scheherazade_core::{GenerateRequest, GenerateResponse, ScheherazadeDriver};
/// use scheherazade_error::ScheherazadeResult;
///
/// struct EchoDriver;
///
/// #[async_trait]
/// impl ScheherazadeDriver for EchoDriver {
///     async fn generate(&self, req: &GenerateRequest) -> ScheherazadeResult<GenerateResponse> {
///         let text = req
///             .messages
///             .last()
///             .map(|m| m.content().to_string())
///             .unwrap_or_default();
///         Ok(GenerateResponse { text })
///     }
/// }
/// ```
#[async_trait]
pub trait ScheherazadeDriver: Send + Sync {
    /// Generate a completion for the given request.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is unreachable, over quota, or
    /// produces an undecodable response.
    async fn generate(&self, req: &GenerateRequest) -> ScheherazadeResult<GenerateResponse>;
}
