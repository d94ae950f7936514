//! Tests for the rendered artifact contract.

use scheherazade_narrative::{Artifact, MetadataRecord};

#[test]
fn test_render_orders_sections_metadata_recap_continuation() {
    let metadata = MetadataRecord {
        episode_number: 3,
        last_scene_id: "S12".to_string(),
        main_characters: vec!["Mira".to_string()],
        ..MetadataRecord::default()
    };
    let artifact = Artifact::new(
        metadata,
        "Mira still holds the letter.",
        "INT. - HANGAR, NIGHT\n\nShe waits.",
        false,
    );

    let rendered = artifact.render();
    let metadata_at = rendered.find("METADATA:").expect("metadata header");
    let recap_at = rendered.find("RECAP:").expect("recap header");
    let continuation_at = rendered.find("CONTINUATION:").expect("continuation header");
    assert!(metadata_at < recap_at);
    assert!(recap_at < continuation_at);

    // The metadata block is the serialized record, not a summary of it.
    let metadata_block = &rendered[metadata_at..recap_at];
    assert!(metadata_block.contains("\"episode_number\": 3"));
    assert!(metadata_block.contains("\"last_scene_id\": \"S12\""));
    assert!(metadata_block.contains("\"Mira\""));

    assert!(rendered.contains("RECAP:\nMira still holds the letter."));
    assert!(rendered.contains("CONTINUATION:\nINT. - HANGAR, NIGHT"));
}

#[test]
fn test_rendered_metadata_round_trips() {
    let artifact = Artifact::new(MetadataRecord::default(), "recap", "body", false);
    let rendered = artifact.render();

    let start = rendered.find('{').expect("serialized record");
    let end = rendered.find("\n\nRECAP:").expect("recap follows metadata");
    let record: MetadataRecord =
        serde_json::from_str(&rendered[start..end]).expect("valid JSON record");
    assert_eq!(record, MetadataRecord::default());
}

#[test]
fn test_section_getters_expose_parts_unrendered() {
    let artifact = Artifact::new(MetadataRecord::default(), "the recap", "the body", true);
    assert_eq!(artifact.recap(), "the recap");
    assert_eq!(artifact.continuation(), "the body");
    assert!(*artifact.fallback_used());
    assert_eq!(artifact.metadata().style_profile_used, "none");
}
