//! The final artifact returned to the caller.

use crate::extraction::MetadataRecord;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// The complete result of a generation run.
///
/// Always well-formed: either a genuine generation or the deterministic
/// fallback. Lifecycle ends at return; persistence is the caller's
/// responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct Artifact {
    /// The strict metadata record
    metadata: MetadataRecord,
    /// Carry-forward recap from the final state of the run
    recap: String,
    /// The post-processed narrative continuation
    continuation: String,
    /// True when this artifact is the static fallback
    fallback_used: bool,
}

impl Artifact {
    /// Assemble an artifact from its three sections.
    pub fn new(
        metadata: MetadataRecord,
        recap: impl Into<String>,
        continuation: impl Into<String>,
        fallback_used: bool,
    ) -> Self {
        Self {
            metadata,
            recap: recap.into(),
            continuation: continuation.into(),
            fallback_used,
        }
    }

    /// Render the artifact as a single text blob: metadata block, recap
    /// block, then the continuation, in fixed order.
    ///
    /// Callers needing only the narrative strip the first two sections;
    /// that stripping is a presentation-layer concern.
    pub fn render(&self) -> String {
        let metadata_json = serde_json::to_string_pretty(&self.metadata)
            .unwrap_or_else(|_| "{}".to_string());
        format!(
            "METADATA:\n{}\n\nRECAP:\n{}\n\nCONTINUATION:\n{}",
            metadata_json, self.recap, self.continuation
        )
    }
}
