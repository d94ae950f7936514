//! Per-segment continuity analysis.
//!
//! One model call per segment turns raw generated text into a structured
//! continuity fact set. Extraction failures degrade to a default record;
//! only a driver error propagates (it is a model-boundary failure and the
//! orchestrator decides fallback).

use crate::extraction::{clean_json, first_json_object, normalize_confidence};
use scheherazade_core::{GenerateRequest, ScheherazadeDriver};
use scheherazade_error::ScheherazadeResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// How much segment text to include in the analysis prompt. Continuity
/// facts concentrate at the end of a segment, so the tail is kept.
const ANALYSIS_TEXT_BUDGET: usize = 8_000;

/// Structured continuity facts for one generated segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContinuityAnalysis {
    /// Index of the segment this analysis covers (0-based)
    pub segment_index: usize,
    /// Number of scenes in the segment
    pub scene_count: u32,
    /// Characters present in the segment
    pub characters: Vec<String>,
    /// Plot developments introduced
    pub plot_developments: Vec<String>,
    /// Dominant emotional tone
    pub emotional_tone: String,
    /// Key events, in order
    pub key_events: Vec<String>,
    /// Threads left open at segment end
    pub open_threads: Vec<String>,
    /// Scene-transition markers the segment used
    pub transition_markers: Vec<String>,
    /// Analyzer confidence, 0 to 1
    pub confidence_score: f32,
}

impl Default for ContinuityAnalysis {
    fn default() -> Self {
        Self {
            segment_index: 0,
            scene_count: 1,
            characters: Vec::new(),
            plot_developments: Vec::new(),
            emotional_tone: "unknown".to_string(),
            key_events: Vec::new(),
            open_threads: Vec::new(),
            transition_markers: Vec::new(),
            confidence_score: 0.3,
        }
    }
}

impl ContinuityAnalysis {
    /// The degraded record returned when extraction fails completely.
    pub fn degraded(segment_index: usize) -> Self {
        Self {
            segment_index,
            ..Self::default()
        }
    }
}

/// Analyzes generated segments for continuity facts.
pub struct ContinuityAnalyzer<'a, D: ScheherazadeDriver> {
    driver: &'a D,
}

impl<'a, D: ScheherazadeDriver> ContinuityAnalyzer<'a, D> {
    /// Create an analyzer borrowing the run's driver.
    pub fn new(driver: &'a D) -> Self {
        Self { driver }
    }

    /// Analyze one segment's raw text.
    ///
    /// The reply is recovered with the same cascade the metadata
    /// extractor uses (direct parse, cleanup parse); if recovery fails
    /// completely the degraded record is returned. Analysis must tolerate
    /// arbitrary text — a malformed segment still gets analyzed.
    ///
    /// # Errors
    ///
    /// Returns an error only when the model call itself fails.
    #[instrument(skip(self, segment_text), fields(segment_index, chars = segment_text.len()))]
    pub async fn analyze(
        &self,
        segment_text: &str,
        segment_index: usize,
    ) -> ScheherazadeResult<ContinuityAnalysis> {
        let prompt = analysis_prompt(segment_text, segment_index);
        let response = self
            .driver
            .generate(&GenerateRequest::from_prompt(prompt))
            .await?;

        let mut analysis = parse_analysis(&response.text).unwrap_or_else(|| {
            warn!(segment_index, "Continuity extraction failed, using degraded record");
            ContinuityAnalysis::degraded(segment_index)
        });
        analysis.segment_index = segment_index;
        analysis.confidence_score = normalize_confidence(analysis.confidence_score);
        if analysis.scene_count == 0 {
            analysis.scene_count = 1;
        }

        debug!(
            segment_index,
            scene_count = analysis.scene_count,
            characters = analysis.characters.len(),
            open_threads = analysis.open_threads.len(),
            confidence = analysis.confidence_score,
            "Segment analyzed"
        );

        Ok(analysis)
    }
}

fn parse_analysis(reply: &str) -> Option<ContinuityAnalysis> {
    let block = first_json_object(reply)?;
    serde_json::from_str(&block)
        .ok()
        .or_else(|| serde_json::from_str(&clean_json(&block)).ok())
}

fn analysis_prompt(segment_text: &str, segment_index: usize) -> String {
    let tail_start = segment_text
        .len()
        .saturating_sub(ANALYSIS_TEXT_BUDGET);
    // Snap to a char boundary.
    let tail_start = (tail_start..segment_text.len())
        .find(|i| segment_text.is_char_boundary(*i))
        .unwrap_or(0);
    let excerpt = &segment_text[tail_start..];

    format!(
        "You are a continuity supervisor. Analyze the following narrative \
segment (segment {index}) and reply with ONLY a JSON object with these \
fields: scene_count (number), characters (string array), \
plot_developments (string array), emotional_tone (string), key_events \
(string array), open_threads (string array), transition_markers (string \
array), confidence_score (number between 0 and 1).\n\nSEGMENT \
TEXT:\n{excerpt}",
        index = segment_index + 1,
    )
}
