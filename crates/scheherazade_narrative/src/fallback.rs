//! The deterministic fallback artifact.
//!
//! When the pipeline cannot complete normally, the caller still receives
//! a well-formed response: a static, non-model-generated placeholder with
//! an honest metadata record.

use crate::artifact::Artifact;
use crate::extraction::MetadataRecord;
use crate::request::GenerationRequest;
use scheherazade_error::FailureClass;
use tracing::warn;

const FALLBACK_RECAP: &str = "No recap is available for this run.";

const FALLBACK_BODY: &str = "The generation service could not complete this run. \
This placeholder continuation preserves the response contract; the story itself \
is unchanged and can be continued once the service recovers.";

/// Build the fallback artifact for an aborted run.
pub fn fallback_artifact(request: &GenerationRequest, class: FailureClass) -> Artifact {
    warn!(failure_class = ?class, "Substituting fallback artifact");

    let reason = match class {
        FailureClass::QuotaExhausted => {
            "generation aborted: model quota exhausted or service unavailable"
        }
        FailureClass::Other => "generation aborted: model call failed",
    };

    let metadata = MetadataRecord {
        assumptions_made: vec![reason.to_string()],
        confidence_score: 0.0,
        style_profile_used: if *request.style_aware() {
            "requested but not applied".to_string()
        } else {
            "none".to_string()
        },
        ..MetadataRecord::default()
    };

    Artifact::new(metadata, FALLBACK_RECAP, FALLBACK_BODY, true)
}
