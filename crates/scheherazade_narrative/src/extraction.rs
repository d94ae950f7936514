//! Structured metadata extraction from loosely-formatted model text.
//!
//! The extractor is an ordered cascade of recovery strategies, tried in
//! sequence until one produces a record. It never returns an error:
//! callers can always treat the result as a fully-populated record with
//! array-valued list fields and a confidence score in [0, 1].

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Marker headings that introduce a metadata block, most specific first.
const BLOCK_MARKERS: [&str; 6] = [
    "METADATA:",
    "METADATA",
    "## METADATA",
    "**METADATA**",
    "[METADATA]",
    "Metadata:",
];

/// A key that identifies an object as a metadata record even without a
/// heading marker.
const RECOGNIZABLE_KEYS: [&str; 3] = ["episode_number", "last_scene_id", "open_threads"];

/// The strict, externally-visible metadata contract.
///
/// Every list field is always an array (never null) and
/// `confidence_score` is always within [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataRecord {
    /// Episode number the continuation belongs to
    pub episode_number: u32,
    /// Identifier of the last scene generated
    pub last_scene_id: String,
    /// One-paragraph summary of the last scene
    pub last_scene_summary: String,
    /// Characters active in the continuation
    pub main_characters: Vec<String>,
    /// Dominant tone/style of the continuation
    pub current_tone_style: String,
    /// Unresolved plot threads
    pub open_threads: Vec<String>,
    /// Assumptions the generator made where the context was silent
    pub assumptions_made: Vec<String>,
    /// Generator confidence, 0 to 1
    pub confidence_score: f32,
    /// Name of the style profile applied, or "none"
    pub style_profile_used: String,
}

impl Default for MetadataRecord {
    fn default() -> Self {
        Self {
            episode_number: 1,
            last_scene_id: "S1".to_string(),
            last_scene_summary: "unknown".to_string(),
            main_characters: Vec::new(),
            current_tone_style: "unknown".to_string(),
            open_threads: Vec::new(),
            assumptions_made: Vec::new(),
            confidence_score: 0.5,
            style_profile_used: "none".to_string(),
        }
    }
}

/// Normalize a raw confidence value into [0, 1].
///
/// Values in (1, 100] are treated as percentages; values above 100 clamp
/// to 1.0; negative or non-finite values floor to 0.1.
pub fn normalize_confidence(raw: f32) -> f32 {
    if !raw.is_finite() {
        return 0.1;
    }
    if raw < 0.0 {
        return 0.1;
    }
    if raw > 100.0 {
        return 1.0;
    }
    if raw > 1.0 {
        return raw / 100.0;
    }
    raw
}

/// Extract a metadata record from arbitrary model text.
///
/// Strategies are attempted in order; the first success wins. If every
/// strategy fails the default record is returned — extraction never
/// propagates a parse error.
///
/// # Examples
///
/// ```
/// use scheherazade_narrative::extraction::extract;
///
/// let record = extract("complete garbage, no JSON at all");
/// assert_eq!(record.episode_number, 1);
/// assert!(record.main_characters.is_empty());
/// ```
pub fn extract(raw: &str) -> MetadataRecord {
    let block = locate_block(raw);

    let strategies: [fn(&str) -> Option<MetadataRecord>; 4] = [
        parse_direct,
        parse_cleaned,
        harvest_fields,
        parse_truncated,
    ];

    if let Some(block) = block {
        for (index, strategy) in strategies.iter().enumerate() {
            if let Some(mut record) = strategy(&block) {
                debug!(strategy = index, "Metadata recovered");
                record.confidence_score = normalize_confidence(record.confidence_score);
                return record;
            }
        }
    }

    warn!("All extraction strategies failed, returning default record");
    MetadataRecord::default()
}

/// Locate the candidate metadata block inside raw model text.
///
/// Tries each heading marker in order, then falls back to any JSON
/// object containing a recognizable required key.
fn locate_block(raw: &str) -> Option<String> {
    for marker in BLOCK_MARKERS {
        if let Some(position) = raw.find(marker) {
            let after = &raw[position + marker.len()..];
            if let Some(block) = first_json_object(after) {
                return Some(block);
            }
        }
    }

    // No heading: accept any object that carries a recognizable key.
    let mut search_from = 0;
    while let Some(offset) = raw[search_from..].find('{') {
        let start = search_from + offset;
        match first_json_object(&raw[start..]) {
            Some(block) => {
                if RECOGNIZABLE_KEYS.iter().any(|key| block.contains(key)) {
                    return Some(block);
                }
                search_from = start + 1;
            }
            None => {
                // Unbalanced tail; keep it so the truncation strategy
                // gets a chance to close it.
                let tail = &raw[start..];
                if RECOGNIZABLE_KEYS.iter().any(|key| tail.contains(key)) {
                    return Some(tail.to_string());
                }
                search_from = start + 1;
            }
        }
    }
    None
}

/// Return the first brace-balanced JSON object in `text`, respecting
/// string literals and escapes.
pub(crate) fn first_json_object(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[start..start + offset + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Strategy 1: parse the block as-is.
fn parse_direct(block: &str) -> Option<MetadataRecord> {
    serde_json::from_str(block).ok()
}

/// Strategy 2: cleanup pass, then parse.
///
/// Strips trailing commas and control characters, quotes bare keys and
/// normalizes line breaks — the usual damage in model-emitted JSON.
fn parse_cleaned(block: &str) -> Option<MetadataRecord> {
    serde_json::from_str(&clean_json(block)).ok()
}

pub(crate) fn clean_json(block: &str) -> String {
    static TRAILING_COMMA: OnceLock<regex::Regex> = OnceLock::new();
    static BARE_KEY: OnceLock<regex::Regex> = OnceLock::new();

    let trailing_comma =
        TRAILING_COMMA.get_or_init(|| regex::Regex::new(r",\s*([}\]])").expect("valid regex"));
    let bare_key = BARE_KEY
        .get_or_init(|| regex::Regex::new(r#"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:"#).expect("valid regex"));

    let normalized: String = block
        .replace("\r\n", "\n")
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    let without_commas = trailing_comma.replace_all(&normalized, "$1");
    bare_key.replace_all(&without_commas, "$1\"$2\":").into_owned()
}

/// Strategy 3: per-field pattern harvest.
///
/// Extracts each required field independently and assembles a record
/// manually, substituting defaults for anything not found. Succeeds only
/// if at least one field was recovered.
fn harvest_fields(block: &str) -> Option<MetadataRecord> {
    let mut record = MetadataRecord::default();
    let mut found = false;

    if let Some(value) = harvest_number(block, "episode_number") {
        record.episode_number = value as u32;
        found = true;
    }
    if let Some(value) = harvest_string(block, "last_scene_id") {
        record.last_scene_id = value;
        found = true;
    }
    if let Some(value) = harvest_string(block, "last_scene_summary") {
        record.last_scene_summary = value;
        found = true;
    }
    if let Some(value) = harvest_string(block, "current_tone_style") {
        record.current_tone_style = value;
        found = true;
    }
    if let Some(value) = harvest_string(block, "style_profile_used") {
        record.style_profile_used = value;
        found = true;
    }
    if let Some(value) = harvest_list(block, "main_characters") {
        record.main_characters = value;
        found = true;
    }
    if let Some(value) = harvest_list(block, "open_threads") {
        record.open_threads = value;
        found = true;
    }
    if let Some(value) = harvest_list(block, "assumptions_made") {
        record.assumptions_made = value;
        found = true;
    }
    if let Some(value) = harvest_float(block, "confidence_score") {
        record.confidence_score = value;
        found = true;
    }

    found.then_some(record)
}

fn field_regex(name: &str, value_pattern: &str) -> regex::Regex {
    regex::Regex::new(&format!(r#""?{}"?\s*:\s*{}"#, name, value_pattern)).expect("valid regex")
}

fn harvest_number(block: &str, name: &str) -> Option<i64> {
    field_regex(name, r"(-?\d+)")
        .captures(block)
        .and_then(|c| c[1].parse().ok())
}

fn harvest_float(block: &str, name: &str) -> Option<f32> {
    field_regex(name, r"(-?\d+(?:\.\d+)?)")
        .captures(block)
        .and_then(|c| c[1].parse().ok())
}

fn harvest_string(block: &str, name: &str) -> Option<String> {
    field_regex(name, r#""((?:[^"\\]|\\.)*)""#)
        .captures(block)
        .map(|c| c[1].replace("\\\"", "\""))
}

fn harvest_list(block: &str, name: &str) -> Option<Vec<String>> {
    let captures = field_regex(name, r"\[([^\]]*)\]").captures(block)?;
    let inner = &captures[1];
    let items: Vec<String> = regex::Regex::new(r#""((?:[^"\\]|\\.)*)""#)
        .expect("valid regex")
        .captures_iter(inner)
        .map(|c| c[1].replace("\\\"", "\""))
        .collect();
    Some(items)
}

/// Strategy 4: truncate at the last syntactically complete field, close
/// the object artificially, then parse.
fn parse_truncated(block: &str) -> Option<MetadataRecord> {
    // Walk backwards over candidate cut points: end of a string value,
    // a number, a list, or a nested close.
    let mut cut = block.len();
    while cut > 1 {
        let candidate = &block[..cut];
        let boundary = candidate.rfind(|c| matches!(c, '"' | ']' | '}' | '0'..='9'))?;
        let mut closed = candidate[..=boundary].to_string();
        closed = closed.trim_end_matches(',').to_string();

        // Close any strings left open by the cut.
        let quote_count = closed.matches('"').count() - closed.matches("\\\"").count();
        if quote_count % 2 == 1 {
            closed.push('"');
        }

        let open_braces = closed.matches('{').count();
        let close_braces = closed.matches('}').count();
        let open_brackets = closed.matches('[').count();
        let close_brackets = closed.matches(']').count();
        for _ in close_brackets..open_brackets {
            closed.push(']');
        }
        for _ in close_braces..open_braces {
            closed.push('}');
        }

        if let Some(record) = parse_direct(&closed).or_else(|| parse_cleaned(&closed)) {
            return Some(record);
        }
        cut = boundary;
    }
    None
}

/// Remove the raw metadata block from a text body.
///
/// Used after extraction so the artifact's continuation section does not
/// repeat the serialized record. Returns the input unchanged when no
/// block is present.
pub fn strip_metadata_block(text: &str) -> String {
    for marker in BLOCK_MARKERS {
        if let Some(position) = text.find(marker) {
            let after = &text[position + marker.len()..];
            if let Some(block) = first_json_object(after) {
                if let Some(block_offset) = after.find(&block) {
                    let end = position + marker.len() + block_offset + block.len();
                    let mut result = String::with_capacity(text.len());
                    result.push_str(text[..position].trim_end());
                    let tail = text[end..].trim_start();
                    if !tail.is_empty() {
                        result.push_str("\n\n");
                        result.push_str(tail);
                    }
                    return result;
                }
            }
        }
    }
    text.to_string()
}
