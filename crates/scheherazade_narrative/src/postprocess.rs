//! Deterministic post-processing of generated text.
//!
//! No model call. Rules run in a fixed order and every rule is
//! idempotent: running the pass twice over already-clean text yields the
//! same text.

use crate::context::StyleProfile;
use std::sync::OnceLock;
use tracing::debug;

/// Scene-transition cues. Domain-standard tokens: kept verbatim in every
/// language mode, but normalized onto their own line.
pub const TRANSITION_CUES: [&str; 6] = [
    "CUT TO:",
    "SMASH CUT TO:",
    "MATCH CUT TO:",
    "DISSOLVE TO:",
    "FADE IN:",
    "FADE OUT.",
];

/// Terminal cues the model emits despite instructions. A run never
/// terminates the underlying narrative, so these are always removed.
const ENDING_CUES: [&str; 6] = [
    "THE END",
    "THE STORY HAS ENDED",
    "END OF STORY",
    "END OF EPISODE",
    "END OF SCRIPT",
    "FIN.",
];

/// Phrases the model uses to disclaim the style profile. The profile is
/// a caller decision; the model does not get to override it.
const STYLE_DISCLAIMERS: [&str; 4] = [
    "style profile was not used",
    "style profile could not be applied",
    "did not use the style profile",
    "without using the style profile",
];

/// Fixed translation table enforcing English production vocabulary on
/// generic descriptive tokens. Transition cues are exempt by design.
const TRANSLATION_TABLE: [(&str, &str); 8] = [
    ("실내", "INT."),
    ("실외", "EXT."),
    ("낮", "DAY"),
    ("밤", "NIGHT"),
    ("아침", "MORNING"),
    ("저녁", "EVENING"),
    ("잠시 후", "MOMENTS LATER"),
    ("한편", "MEANWHILE"),
];

const STYLE_CONFIRMATION_HEADER: &str = "[VOICE CHECK]";

/// Options controlling the post-processing pass.
#[derive(Debug, Clone, Default)]
pub struct PostProcessOptions<'a> {
    /// Style-aware mode: scrub disclaimers and append the confirmation block
    pub style_aware: bool,
    /// The profile to confirm, when style-aware
    pub style_profile: Option<&'a StyleProfile>,
}

/// Run the full post-processing pass.
///
/// Rule order is fixed: chunk markers, emphasis markup, transition-cue
/// placement, ending cues, style enforcement, vocabulary normalization.
pub fn postprocess(text: &str, options: &PostProcessOptions<'_>) -> String {
    let mut output = strip_chunk_markers(text);
    output = strip_emphasis(&output);
    output = normalize_transition_cues(&output);
    output = strip_ending_cues(&output);
    if options.style_aware {
        output = enforce_style_profile(&output, options.style_profile);
    }
    output = translate_vocabulary(&output);

    debug!(
        before = text.len(),
        after = output.len(),
        "Post-processing complete"
    );
    output
}

/// (a) Remove internal chunk/section markers that must never reach the
/// caller, e.g. `[SEGMENT 3]`, `=== PART 2 ===`, `--- CHUNK 1 ---`.
fn strip_chunk_markers(text: &str) -> String {
    static MARKER: OnceLock<regex::Regex> = OnceLock::new();
    let marker = MARKER.get_or_init(|| {
        regex::Regex::new(r"(?mi)^\s*(?:[=\-*#]{2,}\s*)?\[?(?:SEGMENT|PART|CHUNK)\s*\d+(?:\s*/\s*\d+)?\]?(?:\s*[=\-*#]{2,})?\s*$")
            .expect("valid regex")
    });
    drop_matching_lines(text, |line| marker.is_match(line))
}

/// (b) Remove forbidden inline emphasis markup (`**`, `__`).
fn strip_emphasis(text: &str) -> String {
    text.replace("**", "").replace("__", "")
}

/// (c) Scene-transition cues occupy their own line; the model tends to
/// fuse them onto the preceding description.
fn normalize_transition_cues(text: &str) -> String {
    let mut lines = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim_end();
        let mut handled = false;
        for cue in TRANSITION_CUES {
            if let Some(position) = trimmed.find(cue) {
                let before = trimmed[..position].trim_end();
                let after = trimmed[position + cue.len()..].trim_start();
                // Already alone on its line: leave untouched.
                if before.is_empty() && after.is_empty() {
                    break;
                }
                if !before.is_empty() {
                    lines.push(before.to_string());
                }
                lines.push(cue.to_string());
                if !after.is_empty() {
                    lines.push(after.to_string());
                }
                handled = true;
                break;
            }
        }
        if !handled {
            lines.push(trimmed.to_string());
        }
    }
    lines.join("\n")
}

/// (d) Remove model-emitted "story has ended" cues. Continuation is
/// always possible by contract.
fn strip_ending_cues(text: &str) -> String {
    drop_matching_lines(text, |line| {
        let upper = line.trim().trim_matches(['*', '-', '=', ' ']).to_uppercase();
        ENDING_CUES
            .iter()
            .any(|cue| upper == *cue || upper == format!("{}.", cue))
    })
}

/// (e) Scrub model commentary claiming the style profile was skipped and
/// append a confirmation block naming the profile's key attributes.
fn enforce_style_profile(text: &str, profile: Option<&StyleProfile>) -> String {
    let mut output = drop_matching_lines(text, |line| {
        let lowered = line.to_lowercase();
        STYLE_DISCLAIMERS
            .iter()
            .any(|phrase| lowered.contains(phrase))
    });

    // Idempotence: never append a second confirmation block.
    if output.contains(STYLE_CONFIRMATION_HEADER) {
        return output;
    }

    if let Some(profile) = profile {
        let attributes = if profile.attributes.is_empty() {
            "(no attributes listed)".to_string()
        } else {
            profile.attributes.join(", ")
        };
        output.push_str(&format!(
            "\n\n{} Written in the \"{}\" voice: {}",
            STYLE_CONFIRMATION_HEADER, profile.name, attributes
        ));
    }
    output
}

/// (f) Normalize generic descriptive vocabulary to the target language.
/// Replacement targets contain none of the source tokens, so the table
/// is idempotent by construction.
fn translate_vocabulary(text: &str) -> String {
    let mut output = text.to_string();
    for (source, target) in TRANSLATION_TABLE {
        output = output.replace(source, target);
    }
    output
}

fn drop_matching_lines(text: &str, predicate: impl Fn(&str) -> bool) -> String {
    text.lines()
        .filter(|line| !predicate(line))
        .collect::<Vec<_>>()
        .join("\n")
}
