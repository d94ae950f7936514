//! Carry-forward recap synthesis.
//!
//! Before each segment after the first, the accumulated continuity facts
//! are compressed into prose the next segment's prompt carries verbatim.
//! The synthesizer never fails the run: a driver error yields a fixed
//! literal recap instead.

use crate::analyzer::ContinuityAnalysis;
use crate::planner::SegmentPlan;
use scheherazade_core::{GenerateRequest, ScheherazadeDriver};
use tracing::{debug, instrument, warn};

/// Returned when the recap model call fails. Deliberately generic: it
/// keeps the next prompt well-formed without inventing facts.
pub const FALLBACK_RECAP: &str = "Recap unavailable. Continue the story directly from where \
the previous segment ended, keeping all established characters, tone and open plot threads \
consistent.";

/// Synthesizes recaps from accumulated continuity analyses.
pub struct RecapSynthesizer<'a, D: ScheherazadeDriver> {
    driver: &'a D,
}

impl<'a, D: ScheherazadeDriver> RecapSynthesizer<'a, D> {
    /// Create a synthesizer borrowing the run's driver.
    pub fn new(driver: &'a D) -> Self {
        Self { driver }
    }

    /// Compress all prior analyses into one carry-forward recap.
    ///
    /// Aggregates are computed deterministically (ordered unions, naive
    /// progress percentage); the model only turns them into prose. On
    /// model failure the fixed literal [`FALLBACK_RECAP`] is returned.
    #[instrument(skip(self, analyses), fields(analyses = analyses.len()))]
    pub async fn synthesize(&self, analyses: &[ContinuityAnalysis], plan: &SegmentPlan) -> String {
        let prompt = recap_prompt(analyses, plan);

        match self
            .driver
            .generate(&GenerateRequest::from_prompt(prompt))
            .await
        {
            Ok(response) if !response.text.trim().is_empty() => {
                debug!(chars = response.text.len(), "Recap synthesized");
                response.text
            }
            Ok(_) => {
                warn!("Recap call returned empty text, using fallback recap");
                FALLBACK_RECAP.to_string()
            }
            Err(e) => {
                warn!(error = %e, "Recap call failed, using fallback recap");
                FALLBACK_RECAP.to_string()
            }
        }
    }
}

/// Ordered union preserving first-seen order.
fn union<'a>(lists: impl Iterator<Item = &'a [String]>) -> Vec<String> {
    let mut seen = Vec::new();
    for list in lists {
        for item in list {
            if !seen.contains(item) {
                seen.push(item.clone());
            }
        }
    }
    seen
}

fn recap_prompt(analyses: &[ContinuityAnalysis], plan: &SegmentPlan) -> String {
    let characters = union(analyses.iter().map(|a| a.characters.as_slice()));
    let open_threads = union(analyses.iter().map(|a| a.open_threads.as_slice()));
    let completed = analyses.len() as u32;
    let progress = (completed * 100) / (*plan.segment_count()).max(1);

    let summaries = analyses
        .iter()
        .map(|a| {
            format!(
                "Segment {}: tone {}; events: {}",
                a.segment_index + 1,
                a.emotional_tone,
                if a.key_events.is_empty() {
                    "(none recorded)".to_string()
                } else {
                    a.key_events.join("; ")
                }
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are maintaining continuity for a serialized story. {completed} of {total} \
segments are written ({progress}% complete). Using the aggregates and per-segment \
summaries below, write a recap organized under exactly these headings:\n\
1. CHARACTERS AND RELATIONSHIPS\n\
2. OPEN PLOT THREADS\n\
3. ESTABLISHED TONE AND STYLE\n\
4. CURRENT STORY POSITION\n\
Finish with one short paragraph of continuity guidance for the next segment.\n\n\
Characters so far: {characters}\n\
Open threads: {threads}\n\n\
Per-segment summaries:\n{summaries}",
        completed = completed,
        total = plan.segment_count(),
        progress = progress,
        characters = if characters.is_empty() {
            "(none recorded)".to_string()
        } else {
            characters.join(", ")
        },
        threads = if open_threads.is_empty() {
            "(none recorded)".to_string()
        } else {
            open_threads.join("; ")
        },
        summaries = summaries,
    )
}
