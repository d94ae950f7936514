//! End-to-end orchestrator tests against a scripted mock driver.

use async_trait::async_trait;
use scheherazade_core::{GenerateRequest, GenerateResponse, ScheherazadeDriver};
use scheherazade_error::{ModelError, ModelErrorKind, ScheherazadeResult};
use scheherazade_narrative::{
    ContextSources, GenerationRequest, Orchestrator, PipelineSettings, RunState, StyleProfile,
};
use scheherazade_rate_limit::PacingConfig;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

/// Scripted driver: answers generation, analysis and recap prompts with
/// distinguishable canned text and records every prompt it sees.
#[derive(Default)]
struct MockDriver {
    fail_generation_call: Option<u32>,
    fail_analysis_call: Option<u32>,
    generation_calls: AtomicU32,
    analysis_calls: AtomicU32,
    recap_calls: AtomicU32,
    prompts: Mutex<Vec<String>>,
}

impl MockDriver {
    fn quota_error() -> ModelError {
        ModelError::new(ModelErrorKind::HttpStatus {
            status_code: 429,
            message: "Resource has been exhausted (e.g. check quota).".to_string(),
        })
    }
}

#[async_trait]
impl ScheherazadeDriver for MockDriver {
    async fn generate(&self, req: &GenerateRequest) -> ScheherazadeResult<GenerateResponse> {
        let prompt = req
            .messages
            .iter()
            .map(|m| m.content().as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt.clone());

        if prompt.contains("continuity supervisor") {
            let call = self.analysis_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_analysis_call == Some(call) {
                return Err(Self::quota_error().into());
            }
            let text = format!(
                r#"{{"scene_count": 2, "characters": ["Hero{call}"], "emotional_tone": "tense", "key_events": ["event {call}"], "open_threads": ["thread {call}"], "confidence_score": 0.8}}"#,
            );
            return Ok(GenerateResponse { text });
        }

        if prompt.contains("maintaining continuity") {
            let call = self.recap_calls.fetch_add(1, Ordering::SeqCst) + 1;
            return Ok(GenerateResponse {
                text: format!("RECAP#{} covering all earlier segments.", call),
            });
        }

        let call = self.generation_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_generation_call == Some(call) {
            return Err(Self::quota_error().into());
        }
        let mut text = format!("SEGMENT-TEXT-{}\n\nTHE END", call);
        if prompt.contains("append a line reading METADATA:") {
            text.push_str(
                "\n\nMETADATA: {\"episode_number\": 7, \"last_scene_id\": \"S9\", \"confidence_score\": 0.8}",
            );
        }
        Ok(GenerateResponse { text })
    }
}

fn fast_settings() -> PipelineSettings {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    PipelineSettings {
        pacing: PacingConfig { min_interval_ms: 0 },
        ..PipelineSettings::default()
    }
}

fn gen_prompts(orchestrator: &Orchestrator<MockDriver>) -> Vec<String> {
    orchestrator
        .driver()
        .prompts
        .lock()
        .unwrap()
        .iter()
        .filter(|p| p.contains("INSTRUCTION:"))
        .cloned()
        .collect()
}

#[tokio::test]
async fn test_short_form_run_completes_with_minimal_transitions() {
    let orchestrator = Orchestrator::new(MockDriver::default(), fast_settings());
    let request = GenerationRequest::new("Continue the scene");
    let outcome = orchestrator.run(&request, &ContextSources::default()).await;

    assert_eq!(
        outcome.transitions(),
        &vec![
            RunState::Idle,
            RunState::Planning,
            RunState::Generating(0),
            RunState::PostProcessing,
            RunState::Extracting,
            RunState::Done,
        ]
    );
    assert_eq!(*outcome.generation_attempts(), 1);

    let artifact = outcome.artifact();
    assert!(!artifact.fallback_used());
    assert!(artifact.continuation().contains("SEGMENT-TEXT-1"));
    assert!(!artifact.continuation().contains("THE END"));
    assert!(!artifact.continuation().contains("METADATA"));
    assert_eq!(artifact.metadata().episode_number, 7);
    assert_eq!(artifact.metadata().last_scene_id, "S9");
    assert_eq!(artifact.metadata().style_profile_used, "none");
}

#[tokio::test]
async fn test_quota_failure_mid_run_yields_fallback_without_further_attempts() {
    let driver = MockDriver {
        fail_generation_call: Some(2),
        ..MockDriver::default()
    };
    let orchestrator = Orchestrator::new(driver, fast_settings());
    let request = GenerationRequest::new("Continue").with_target_pages(50);
    let outcome = orchestrator.run(&request, &ContextSources::default()).await;

    assert_eq!(
        outcome.transitions(),
        &vec![
            RunState::Idle,
            RunState::Planning,
            RunState::Generating(0),
            RunState::Analyzing(0),
            RunState::Recapping,
            RunState::Generating(1),
            RunState::Fallback,
        ]
    );
    assert_eq!(*outcome.generation_attempts(), 2);
    assert_eq!(
        orchestrator.driver().generation_calls.load(Ordering::SeqCst),
        2
    );

    let artifact = outcome.artifact();
    assert!(artifact.fallback_used());
    assert_eq!(artifact.metadata().confidence_score, 0.0);
    assert!(
        artifact.metadata().assumptions_made[0].contains("quota exhausted"),
        "fallback reason should name the quota classification"
    );
}

#[tokio::test]
async fn test_analysis_failure_also_routes_to_fallback() {
    let driver = MockDriver {
        fail_analysis_call: Some(1),
        ..MockDriver::default()
    };
    let orchestrator = Orchestrator::new(driver, fast_settings());
    let request = GenerationRequest::new("Continue").with_target_pages(50);
    let outcome = orchestrator.run(&request, &ContextSources::default()).await;

    assert!(outcome.artifact().fallback_used());
    assert_eq!(*outcome.generation_attempts(), 1);
    assert_eq!(
        outcome.transitions().last(),
        Some(&RunState::Fallback)
    );
    assert!(outcome.transitions().contains(&RunState::Analyzing(0)));
}

#[tokio::test]
async fn test_long_form_run_carries_recap_forward() {
    let orchestrator = Orchestrator::new(MockDriver::default(), fast_settings());
    let request = GenerationRequest::new("Continue").with_target_pages(50);
    let outcome = orchestrator.run(&request, &ContextSources::default()).await;

    assert!(!outcome.artifact().fallback_used());
    assert_eq!(*outcome.generation_attempts(), 5);
    assert_eq!(
        outcome
            .transitions()
            .iter()
            .filter(|s| matches!(s, RunState::Generating(_)))
            .count(),
        5
    );
    assert_eq!(outcome.transitions().last(), Some(&RunState::Done));

    // Every segment is analyzed, the last one included; only the recap
    // after the final analysis is skipped.
    assert_eq!(
        orchestrator.driver().analysis_calls.load(Ordering::SeqCst),
        5
    );
    assert!(outcome.transitions().contains(&RunState::Analyzing(4)));
    let after_last_analysis = outcome
        .transitions()
        .iter()
        .position(|s| *s == RunState::Analyzing(4))
        .unwrap();
    assert_eq!(
        outcome.transitions()[after_last_analysis + 1],
        RunState::PostProcessing
    );

    let prompts = gen_prompts(&orchestrator);
    assert_eq!(prompts.len(), 5);

    // The first segment has nothing to recap.
    assert!(!prompts[0].contains("STORY SO FAR:"));

    // Segment 3's prompt carries the recap of segments 1-2 and nothing
    // of its own not-yet-generated content.
    assert!(prompts[2].contains("STORY SO FAR:"));
    assert!(prompts[2].contains("RECAP#2"));
    assert!(!prompts[2].contains("RECAP#1"));
    assert!(!prompts[2].contains("SEGMENT-TEXT-3"));

    // Only the final segment asks for the metadata block; every earlier
    // segment is told not to conclude.
    for prompt in &prompts[..4] {
        assert!(prompt.contains("Do not conclude"));
        assert!(!prompt.contains("append a line reading METADATA:"));
    }
    assert!(prompts[4].contains("append a line reading METADATA:"));

    // The recap prompt aggregates analyses of all completed segments.
    let recap_prompts: Vec<String> = orchestrator
        .driver()
        .prompts
        .lock()
        .unwrap()
        .iter()
        .filter(|p| p.contains("maintaining continuity"))
        .cloned()
        .collect();
    assert_eq!(recap_prompts.len(), 4);
    assert!(recap_prompts[1].contains("2 of 5"));
    assert!(recap_prompts[1].contains("Hero1"));
    assert!(recap_prompts[1].contains("Hero2"));

    // Segment text concatenates in order; ending cues never survive.
    let continuation = outcome.artifact().continuation();
    let first = continuation.find("SEGMENT-TEXT-1");
    let last = continuation.find("SEGMENT-TEXT-5");
    assert!(first.is_some() && last.is_some() && first < last);
    assert!(!continuation.contains("THE END"));
}

#[tokio::test]
async fn test_style_aware_run_confirms_profile_in_artifact() {
    let orchestrator = Orchestrator::new(MockDriver::default(), fast_settings());
    let request = GenerationRequest::new("Continue").with_style_aware(true);
    let sources = ContextSources {
        style_profile: Some(StyleProfile {
            name: "Noir".to_string(),
            attributes: vec!["terse dialogue".to_string()],
        }),
        ..ContextSources::default()
    };
    let outcome = orchestrator.run(&request, &sources).await;

    let artifact = outcome.artifact();
    assert!(!artifact.fallback_used());
    assert_eq!(artifact.metadata().style_profile_used, "Noir");
    assert!(artifact.continuation().contains("[VOICE CHECK]"));
    assert!(artifact.continuation().contains("terse dialogue"));

    let prompts = gen_prompts(&orchestrator);
    assert!(prompts[0].contains("STYLE PROFILE:"));
}

#[tokio::test]
async fn test_open_mode_suppresses_context_injection() {
    let orchestrator = Orchestrator::new(MockDriver::default(), fast_settings());
    let request = GenerationRequest::new("Write anything you like").with_open_mode(true);
    let sources = ContextSources::default();
    let outcome = orchestrator.run(&request, &sources).await;

    assert!(!outcome.artifact().fallback_used());
    let prompts = gen_prompts(&orchestrator);
    assert!(!prompts[0].contains("PROJECT:"));
    assert!(!prompts[0].contains("RECENT CONVERSATION:"));
    assert!(prompts[0].contains("Write anything you like"));
}
