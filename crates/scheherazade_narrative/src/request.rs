//! The caller-facing generation request.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Immutable input to the orchestrator for one run.
///
/// # Examples
///
/// ```
/// use scheherazade_narrative::GenerationRequest;
///
/// let request = GenerationRequest::new("Continue where episode 3 ended")
///     .with_target_pages(80)
///     .with_style_aware(true);
///
/// assert_eq!(request.target_pages(), &Some(80));
/// assert!(*request.style_aware());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct GenerationRequest {
    /// User instruction text
    instruction: String,
    /// Target length in pages; `None` requests short-form generation
    target_pages: Option<i64>,
    /// Inject relationship/timeline context
    graph_aware: bool,
    /// Inject style-profile context and enforce it in post-processing
    style_aware: bool,
    /// Open/unrestricted mode: suppress all project/episode context
    open_mode: bool,
}

impl GenerationRequest {
    /// Creates a short-form request with all modes off.
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            target_pages: None,
            graph_aware: false,
            style_aware: false,
            open_mode: false,
        }
    }

    /// Sets a page target, switching the run to long-form planning.
    pub fn with_target_pages(mut self, pages: i64) -> Self {
        self.target_pages = Some(pages);
        self
    }

    /// Sets graph-aware mode.
    pub fn with_graph_aware(mut self, graph_aware: bool) -> Self {
        self.graph_aware = graph_aware;
        self
    }

    /// Sets style-aware mode.
    pub fn with_style_aware(mut self, style_aware: bool) -> Self {
        self.style_aware = style_aware;
        self
    }

    /// Sets open/unrestricted mode.
    pub fn with_open_mode(mut self, open_mode: bool) -> Self {
        self.open_mode = open_mode;
        self
    }
}
