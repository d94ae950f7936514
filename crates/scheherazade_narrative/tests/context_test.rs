//! Tests for deterministic context assembly.

use scheherazade_narrative::{
    ContextAssembler, ContextSources, ConversationTurn, EpisodeFacts, EpisodeSummary,
    GenerationRequest, ProjectFacts, RelationshipGraph, StyleProfile,
};

fn turn(index: usize) -> ConversationTurn {
    ConversationTurn {
        speaker: "user".to_string(),
        text: format!("turn {}", index),
    }
}

fn episode_summary(number: u32) -> EpisodeSummary {
    EpisodeSummary {
        number,
        title: format!("Episode {}", number),
        summary: format!("summary of episode {}", number),
    }
}

fn full_sources() -> ContextSources {
    ContextSources {
        project: Some(ProjectFacts {
            title: "Harbor Lights".to_string(),
            genre: "drama".to_string(),
            logline: "A pilot returns home.".to_string(),
            characters: vec!["Mira - the pilot".to_string(), "Joon - her brother".to_string()],
        }),
        episode: Some(EpisodeFacts {
            number: 4,
            title: "Landfall".to_string(),
            outline: "Mira finds the hangar empty.".to_string(),
        }),
        prior_episodes: (1..=3).map(episode_summary).collect(),
        recent_turns: (0..10).map(turn).collect(),
        style_profile: Some(StyleProfile {
            name: "Noir".to_string(),
            attributes: vec!["terse dialogue".to_string()],
        }),
        graph: Some(RelationshipGraph {
            relationships: vec!["Mira is Joon's sister".to_string()],
            timeline: vec!["Year 1: the crash".to_string()],
        }),
        history_budget: None,
    }
}

#[test]
fn test_missing_inputs_render_placeholders() {
    let request = GenerationRequest::new("continue");
    let bundle = ContextAssembler::build(&request, &ContextSources::default());
    let rendered = bundle.render();

    assert!(rendered.contains("PROJECT:\n(not available)"));
    assert!(rendered.contains("CURRENT EPISODE:\n(not available)"));
    assert!(rendered.contains("PRIOR EPISODES:\n(not available)"));
    assert!(rendered.contains("RECENT CONVERSATION:\n(not available)"));
}

#[test]
fn test_full_sources_render_labelled_sections() {
    let request = GenerationRequest::new("continue");
    let bundle = ContextAssembler::build(&request, &full_sources());
    let rendered = bundle.render();

    assert!(rendered.contains("Title: Harbor Lights"));
    assert!(rendered.contains("Episode 4 - Landfall"));
    assert!(rendered.contains("summary of episode 3"));
    assert!(rendered.contains("user: turn 9"));
}

#[test]
fn test_prior_episodes_cap_at_three_most_recent() {
    let request = GenerationRequest::new("continue");
    let mut sources = full_sources();
    sources.prior_episodes = (1..=7).map(episode_summary).collect();

    let rendered = ContextAssembler::build(&request, &sources).render();
    assert!(!rendered.contains("summary of episode 4"));
    assert!(rendered.contains("summary of episode 5"));
    assert!(rendered.contains("summary of episode 6"));
    assert!(rendered.contains("summary of episode 7"));
}

#[test]
fn test_history_budget_keeps_most_recent_turns() {
    let request = GenerationRequest::new("continue");
    let mut sources = full_sources();
    sources.recent_turns = (0..100).map(turn).collect();
    sources.history_budget = Some(10);

    let rendered = ContextAssembler::build(&request, &sources).render();
    assert!(!rendered.contains("turn 89\n"));
    assert!(rendered.contains("turn 90"));
    assert!(rendered.contains("turn 99"));
}

#[test]
fn test_history_budget_is_clamped() {
    let request = GenerationRequest::new("continue");
    let mut sources = full_sources();
    sources.recent_turns = (0..100).map(turn).collect();

    // Below the lower bound: clamps up to 5.
    sources.history_budget = Some(1);
    let rendered = ContextAssembler::build(&request, &sources).render();
    assert!(rendered.contains("turn 95"));
    assert!(!rendered.contains("turn 94\n"));

    // Above the upper bound: clamps down to 50.
    sources.history_budget = Some(10_000);
    let rendered = ContextAssembler::build(&request, &sources).render();
    assert!(rendered.contains("turn 50"));
    assert!(!rendered.contains("turn 49\n"));
}

#[test]
fn test_style_section_present_only_in_style_aware_mode() {
    let sources = full_sources();

    let plain = ContextAssembler::build(&GenerationRequest::new("continue"), &sources).render();
    assert!(!plain.contains("STYLE PROFILE:"));

    let styled = ContextAssembler::build(
        &GenerationRequest::new("continue").with_style_aware(true),
        &sources,
    )
    .render();
    assert!(styled.contains("STYLE PROFILE:\nNoir: terse dialogue"));
}

#[test]
fn test_graph_section_present_only_in_graph_aware_mode() {
    let sources = full_sources();

    let plain = ContextAssembler::build(&GenerationRequest::new("continue"), &sources).render();
    assert!(!plain.contains("RELATIONSHIPS AND TIMELINE:"));

    let graphed = ContextAssembler::build(
        &GenerationRequest::new("continue").with_graph_aware(true),
        &sources,
    )
    .render();
    assert!(graphed.contains("RELATIONSHIPS AND TIMELINE:"));
    assert!(graphed.contains("Mira is Joon's sister"));
    assert!(graphed.contains("Year 1: the crash"));
}

#[test]
fn test_mode_flags_do_not_change_other_sections() {
    let sources = full_sources();
    let plain = ContextAssembler::build(&GenerationRequest::new("continue"), &sources);
    let styled = ContextAssembler::build(
        &GenerationRequest::new("continue")
            .with_style_aware(true)
            .with_graph_aware(true),
        &sources,
    );

    assert_eq!(plain.project_section(), styled.project_section());
    assert_eq!(plain.episode_section(), styled.episode_section());
    assert_eq!(plain.prior_episodes_section(), styled.prior_episodes_section());
    assert_eq!(plain.history_section(), styled.history_section());
}

#[test]
fn test_open_mode_renders_empty() {
    let request = GenerationRequest::new("write anything").with_open_mode(true);
    let bundle = ContextAssembler::build(&request, &full_sources());
    assert_eq!(bundle.render(), "");
}
