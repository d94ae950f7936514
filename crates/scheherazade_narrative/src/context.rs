//! Context assembly: a pure, deterministic textual context bundle.
//!
//! The assembler never omits a section silently. When an input is
//! missing it renders an explicit "(not available)" placeholder, because
//! downstream prompt consumers key off the section labels.

use crate::request::GenerationRequest;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Maximum prior episodes included in the bundle.
pub const MAX_PRIOR_EPISODES: usize = 3;

/// Bounds for the conversation-history budget.
pub const MIN_HISTORY_TURNS: usize = 5;
pub const MAX_HISTORY_TURNS: usize = 50;

/// Placeholder rendered when a section's input is missing.
const NOT_AVAILABLE: &str = "(not available)";

/// Facts about the project the episode belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectFacts {
    /// Project title
    pub title: String,
    /// Genre description
    pub genre: String,
    /// One-line premise
    pub logline: String,
    /// Named characters with short descriptions
    pub characters: Vec<String>,
}

/// Facts about the episode currently being generated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EpisodeFacts {
    /// Episode number within the project
    pub number: u32,
    /// Episode title
    pub title: String,
    /// Outline or synopsis for this episode
    pub outline: String,
}

/// Compressed summary of a previously generated episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Episode number
    pub number: u32,
    /// Episode title
    pub title: String,
    /// Summary text
    pub summary: String,
}

/// One prior turn of the user/model conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Speaker label, e.g. "user" or "assistant"
    pub speaker: String,
    /// Turn text
    pub text: String,
}

/// A writing-voice profile selected by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleProfile {
    /// Profile name
    pub name: String,
    /// Key attributes of the voice, most important first
    pub attributes: Vec<String>,
}

/// Relationship and timeline facts derived from the project graph.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RelationshipGraph {
    /// Character relationship statements
    pub relationships: Vec<String>,
    /// Timeline notes in chronological order
    pub timeline: Vec<String>,
}

/// All context inputs available for one generation run.
///
/// Gathering these from storage is the caller's concern; the pipeline
/// only reads them.
#[derive(Debug, Clone, Default)]
pub struct ContextSources {
    pub project: Option<ProjectFacts>,
    pub episode: Option<EpisodeFacts>,
    pub prior_episodes: Vec<EpisodeSummary>,
    pub recent_turns: Vec<ConversationTurn>,
    pub style_profile: Option<StyleProfile>,
    pub graph: Option<RelationshipGraph>,
    /// Caller-supplied history budget; clamped to 5..=50 turns
    pub history_budget: Option<usize>,
}

/// Immutable snapshot of rendered context, built fresh per run.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ContextBundle {
    /// Rendered project facts section
    project_section: String,
    /// Rendered current-episode section
    episode_section: String,
    /// Rendered prior-episode section (most recent first, capped)
    prior_episodes_section: String,
    /// Rendered conversation-history section
    history_section: String,
    /// Rendered style section, present only in style-aware mode
    style_section: Option<String>,
    /// Rendered relationship/timeline section, present only in graph-aware mode
    graph_section: Option<String>,
    /// True when open/unrestricted mode suppressed all context injection
    open_mode: bool,
}

impl ContextBundle {
    /// Render the bundle as a labelled text block for prompt inclusion.
    ///
    /// In open mode the bundle renders empty: the prompt stays
    /// context-free by contract.
    pub fn render(&self) -> String {
        if self.open_mode {
            return String::new();
        }

        let mut sections = vec![
            format!("PROJECT:\n{}", self.project_section),
            format!("CURRENT EPISODE:\n{}", self.episode_section),
            format!("PRIOR EPISODES:\n{}", self.prior_episodes_section),
            format!("RECENT CONVERSATION:\n{}", self.history_section),
        ];
        if let Some(style) = &self.style_section {
            sections.push(format!("STYLE PROFILE:\n{}", style));
        }
        if let Some(graph) = &self.graph_section {
            sections.push(format!("RELATIONSHIPS AND TIMELINE:\n{}", graph));
        }
        sections.join("\n\n")
    }
}

/// Builds [`ContextBundle`] values. Pure and deterministic: no I/O, no
/// clock, no randomness.
pub struct ContextAssembler;

impl ContextAssembler {
    /// Assemble the context bundle for one generation run.
    ///
    /// Style and graph sections render only when the corresponding mode
    /// flag on `request` is active; their presence never changes how the
    /// other sections format.
    pub fn build(request: &GenerationRequest, sources: &ContextSources) -> ContextBundle {
        let budget = sources
            .history_budget
            .unwrap_or(MAX_HISTORY_TURNS)
            .clamp(MIN_HISTORY_TURNS, MAX_HISTORY_TURNS);

        let project_section = match &sources.project {
            Some(p) => render_project(p),
            None => NOT_AVAILABLE.to_string(),
        };

        let episode_section = match &sources.episode {
            Some(e) => format!("Episode {} - {}\n{}", e.number, e.title, e.outline),
            None => NOT_AVAILABLE.to_string(),
        };

        let prior_episodes_section = render_prior_episodes(&sources.prior_episodes);
        let history_section = render_history(&sources.recent_turns, budget);

        let style_section = if *request.style_aware() {
            Some(match &sources.style_profile {
                Some(profile) => {
                    format!("{}: {}", profile.name, profile.attributes.join(", "))
                }
                None => NOT_AVAILABLE.to_string(),
            })
        } else {
            None
        };

        let graph_section = if *request.graph_aware() {
            Some(match &sources.graph {
                Some(graph) => render_graph(graph),
                None => NOT_AVAILABLE.to_string(),
            })
        } else {
            None
        };

        ContextBundle {
            project_section,
            episode_section,
            prior_episodes_section,
            history_section,
            style_section,
            graph_section,
            open_mode: *request.open_mode(),
        }
    }
}

fn render_project(project: &ProjectFacts) -> String {
    let characters = if project.characters.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        project.characters.join("; ")
    };
    format!(
        "Title: {}\nGenre: {}\nLogline: {}\nCharacters: {}",
        project.title, project.genre, project.logline, characters
    )
}

fn render_prior_episodes(episodes: &[EpisodeSummary]) -> String {
    if episodes.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    // Most recent episodes are at the end of the caller's list.
    let start = episodes.len().saturating_sub(MAX_PRIOR_EPISODES);
    episodes[start..]
        .iter()
        .map(|e| format!("Episode {} - {}: {}", e.number, e.title, e.summary))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_history(turns: &[ConversationTurn], budget: usize) -> String {
    if turns.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    let start = turns.len().saturating_sub(budget);
    turns[start..]
        .iter()
        .map(|t| format!("{}: {}", t.speaker, t.text))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_graph(graph: &RelationshipGraph) -> String {
    let relationships = if graph.relationships.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        graph.relationships.join("\n")
    };
    let timeline = if graph.timeline.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        graph.timeline.join("\n")
    };
    format!("Relationships:\n{}\nTimeline:\n{}", relationships, timeline)
}
