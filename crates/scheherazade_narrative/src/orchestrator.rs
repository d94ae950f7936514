//! The generation orchestrator: one explicit state machine per run.
//!
//! Segments are generated strictly sequentially — each prompt carries the
//! recap of everything before it, so there is no parallelism opportunity
//! within a run. The orchestrator is the only layer that catches driver
//! errors; everything below it has a documented default return.

use crate::analyzer::{ContinuityAnalysis, ContinuityAnalyzer};
use crate::artifact::Artifact;
use crate::context::{ContextAssembler, ContextBundle, ContextSources};
use crate::extraction::{self, MetadataRecord};
use crate::fallback::fallback_artifact;
use crate::planner::{SegmentPlan, plan};
use crate::postprocess::{PostProcessOptions, postprocess};
use crate::recap::RecapSynthesizer;
use crate::request::GenerationRequest;
use crate::settings::PipelineSettings;
use derive_getters::Getters;
use scheherazade_core::{GenerateRequest, Message, ScheherazadeDriver};
use scheherazade_rate_limit::Pacer;
use tracing::{debug, info, instrument, warn};

/// States of a generation run.
///
/// Modeled as an explicit tagged type so tests can assert on the
/// transition log directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum RunState {
    Idle,
    Planning,
    Generating(usize),
    Analyzing(usize),
    Recapping,
    PostProcessing,
    Extracting,
    Done,
    Fallback,
}

/// Everything a finished run reports back.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct RunOutcome {
    /// The artifact (genuine or fallback), always well-formed
    artifact: Artifact,
    /// Ordered state transitions the run went through
    transitions: Vec<RunState>,
    /// Number of segment-generation calls attempted
    generation_attempts: u32,
}

/// Drives a complete generation run end to end.
pub struct Orchestrator<D: ScheherazadeDriver> {
    driver: D,
    pacer: Pacer,
    settings: PipelineSettings,
}

impl<D: ScheherazadeDriver> Orchestrator<D> {
    /// Create an orchestrator with the given driver and settings.
    pub fn new(driver: D, settings: PipelineSettings) -> Self {
        let pacer = Pacer::new(settings.pacing);
        Self {
            driver,
            pacer,
            settings,
        }
    }

    /// Get a reference to the underlying driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Execute one generation run.
    ///
    /// The caller always receives a complete outcome: either a genuine
    /// generation or the deterministic fallback artifact. This method
    /// never returns an error.
    #[instrument(skip_all, fields(target_pages = ?request.target_pages(), open = request.open_mode()))]
    pub async fn run(&self, request: &GenerationRequest, sources: &ContextSources) -> RunOutcome {
        let mut run = Run::new();

        run.transition(RunState::Planning);
        let plan = match request.target_pages() {
            Some(pages) => plan(*pages),
            None => plan(1),
        };
        info!(
            segments = plan.segment_count(),
            pages_per_segment = plan.pages_per_segment(),
            "Run planned"
        );

        let mut sources = sources.clone();
        sources.history_budget = sources.history_budget.or(Some(self.settings.history_budget));
        let bundle = ContextAssembler::build(request, &sources);

        let body = match self.generate_segments(request, &plan, &bundle, &mut run).await {
            Ok(body) => body,
            Err(outcome) => return outcome,
        };

        run.transition(RunState::PostProcessing);
        let options = PostProcessOptions {
            style_aware: *request.style_aware(),
            style_profile: sources.style_profile.as_ref(),
        };
        let processed = postprocess(&body, &options);
        self.check_length(&processed, &plan);

        run.transition(RunState::Extracting);
        let mut metadata = extraction::extract(&processed);
        if *request.style_aware() {
            if let Some(profile) = &sources.style_profile {
                metadata.style_profile_used = profile.name.clone();
            }
        }
        let continuation = extraction::strip_metadata_block(&processed);

        run.transition(RunState::Done);
        info!(
            segments = run.segments.len(),
            chars = continuation.len(),
            "Run complete"
        );

        RunOutcome {
            artifact: Artifact::new(metadata, run.final_recap.clone(), continuation, false),
            transitions: run.transitions,
            generation_attempts: run.generation_attempts,
        }
    }

    /// The segment loop: Generating(i) → Analyzing(i) → Recapping → ….
    ///
    /// Returns the concatenated raw segment text, or the finished
    /// fallback outcome when a model call fails.
    async fn generate_segments(
        &self,
        request: &GenerationRequest,
        plan: &SegmentPlan,
        bundle: &ContextBundle,
        run: &mut Run,
    ) -> Result<String, RunOutcome> {
        let analyzer = ContinuityAnalyzer::new(&self.driver);
        let synthesizer = RecapSynthesizer::new(&self.driver);
        let segment_count = *plan.segment_count() as usize;
        let mut recap: Option<String> = None;

        for index in 0..segment_count {
            run.transition(RunState::Generating(index));
            self.pacer.pace().await;
            run.generation_attempts += 1;

            let prompt = segment_prompt(request, plan, bundle, index, recap.as_deref());
            let response = match self.driver.generate(&prompt).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(segment = index, error = %e, "Segment generation failed");
                    return Err(run.fail(request, e.failure_class()));
                }
            };
            run.segments.push(response.text);

            // Every segment of a multi-segment run is analyzed, even the
            // last; only the recap after the final analysis is skipped.
            if plan.is_multi_segment() {
                run.transition(RunState::Analyzing(index));
                let analysis = match analyzer.analyze(&run.segments[index], index).await {
                    Ok(analysis) => analysis,
                    Err(e) => {
                        warn!(segment = index, error = %e, "Continuity analysis call failed");
                        return Err(run.fail(request, e.failure_class()));
                    }
                };
                run.analyses.push(analysis);

                let is_last = index + 1 == segment_count;
                if !is_last {
                    run.transition(RunState::Recapping);
                    let text = synthesizer.synthesize(&run.analyses, plan).await;
                    run.final_recap = text.clone();
                    recap = Some(text);
                }
            }
        }

        Ok(run.segments.join("\n\n"))
    }

    /// Advisory length check: logs a warning when the artifact lands
    /// well under the page-based estimate. Never re-triggers generation.
    fn check_length(&self, text: &str, plan: &SegmentPlan) {
        let words = text.split_whitespace().count() as u64;
        let estimate = u64::from(*plan.target_pages()) * u64::from(self.settings.words_per_page);
        if estimate > 0 && words * 100 < estimate * 60 {
            warn!(
                words,
                estimated_words = estimate,
                target_pages = plan.target_pages(),
                "Generated text is well under the target length estimate"
            );
        } else {
            debug!(words, estimated_words = estimate, "Length check passed");
        }
    }
}

/// Mutable bookkeeping for one run. Cleared at run end by going out of
/// scope; nothing here outlives the call.
struct Run {
    transitions: Vec<RunState>,
    segments: Vec<String>,
    analyses: Vec<ContinuityAnalysis>,
    final_recap: String,
    generation_attempts: u32,
}

impl Run {
    fn new() -> Self {
        Self {
            transitions: vec![RunState::Idle],
            segments: Vec::new(),
            analyses: Vec::new(),
            final_recap: String::new(),
            generation_attempts: 0,
        }
    }

    fn transition(&mut self, state: RunState) {
        debug!(state = %state, "State transition");
        self.transitions.push(state);
    }

    fn fail(
        &mut self,
        request: &GenerationRequest,
        class: scheherazade_error::FailureClass,
    ) -> RunOutcome {
        self.transition(RunState::Fallback);
        RunOutcome {
            artifact: fallback_artifact(request, class),
            transitions: std::mem::take(&mut self.transitions),
            generation_attempts: self.generation_attempts,
        }
    }
}

/// Build the prompt for one segment.
///
/// Segment N's prompt carries the full recap derived from segments
/// 0..N-1 verbatim; the final segment additionally asks for the metadata
/// block the extractor recovers afterwards.
fn segment_prompt(
    request: &GenerationRequest,
    plan: &SegmentPlan,
    bundle: &ContextBundle,
    index: usize,
    recap: Option<&str>,
) -> GenerateRequest {
    let mut sections: Vec<String> = Vec::new();

    let context = bundle.render();
    if !context.is_empty() {
        sections.push(context);
    }

    if let Some(recap) = recap {
        sections.push(format!("STORY SO FAR:\n{}", recap));
    }

    let pages = plan.pages_for(index as u32);
    let segment_count = *plan.segment_count();
    if segment_count > 1 {
        sections.push(format!(
            "Write part {part} of {total} of the continuation: about {pages} pages of \
scripted narrative. Do not conclude the story; later parts will continue it.",
            part = index + 1,
            total = segment_count,
            pages = pages,
        ));
    } else {
        sections.push(format!(
            "Write the continuation: about {} pages of scripted narrative.",
            pages
        ));
    }

    sections.push(format!("INSTRUCTION:\n{}", request.instruction()));

    let is_last = index as u32 + 1 == segment_count;
    if is_last {
        sections.push(
            "After the narrative, append a line reading METADATA: followed by a JSON \
object with fields: episode_number, last_scene_id, last_scene_summary, \
main_characters, current_tone_style, open_threads, assumptions_made, \
confidence_score, style_profile_used."
                .to_string(),
        );
    }

    GenerateRequest {
        messages: vec![
            Message::system(
                "You are a professional screenwriter continuing a serialized story. \
Respect every continuity fact you are given.",
            ),
            Message::user(sections.join("\n\n")),
        ],
        config: Default::default(),
        model: None,
    }
}
