//! Generation orchestration for the Scheherazade narrative pipeline.
//!
//! This crate drives a text-completion model through a sequence of
//! bounded segment calls to produce a target-length artifact while
//! preserving continuity across calls:
//!
//! - [`context`] assembles the layered generation context
//! - [`planner`] turns a page target into a segment plan
//! - [`analyzer`] extracts continuity facts from each segment
//! - [`recap`] compresses accumulated facts into a carry-forward recap
//! - [`extraction`] recovers the strict metadata record from model text
//! - [`postprocess`] enforces formatting invariants deterministically
//! - [`orchestrator`] composes everything into one end-to-end run
//!
//! The caller always receives a complete, well-formed [`Artifact`] —
//! either a genuine generation or the deterministic fallback.

pub mod analyzer;
pub mod artifact;
pub mod context;
pub mod extraction;
pub mod fallback;
pub mod orchestrator;
pub mod planner;
pub mod postprocess;
pub mod recap;
mod request;
mod settings;

pub use analyzer::{ContinuityAnalysis, ContinuityAnalyzer};
pub use artifact::Artifact;
pub use context::{
    ContextAssembler, ContextBundle, ContextSources, ConversationTurn, EpisodeFacts,
    EpisodeSummary, ProjectFacts, RelationshipGraph, StyleProfile,
};
pub use extraction::MetadataRecord;
pub use fallback::fallback_artifact;
pub use orchestrator::{Orchestrator, RunOutcome, RunState};
pub use planner::{SegmentPlan, plan};
pub use postprocess::{PostProcessOptions, postprocess};
pub use recap::{FALLBACK_RECAP, RecapSynthesizer};
pub use request::GenerationRequest;
pub use settings::PipelineSettings;
