//! Tests for pipeline settings loading.

use scheherazade_narrative::PipelineSettings;

// One test function: the environment override is process-global, so the
// missing-file, file, and env layers are checked sequentially.
#[test]
fn test_load_from_layers_defaults_file_and_environment() {
    // Missing file: every field keeps its default.
    let settings = PipelineSettings::load_from("scheherazade_no_such_config").unwrap();
    assert_eq!(settings, PipelineSettings::default());
    assert_eq!(settings.pacing.min_interval_ms, 5_000);
    assert_eq!(settings.words_per_page, 250);
    assert_eq!(settings.history_budget, 50);

    // File overrides named fields, the rest stay default.
    let stem = std::env::temp_dir().join(format!("scheherazade_settings_{}", std::process::id()));
    let path = stem.with_extension("toml");
    std::fs::write(
        &path,
        "words_per_page = 300\n\n[pacing]\nmin_interval_ms = 1234\n",
    )
    .unwrap();
    let stem_str = stem.to_string_lossy().into_owned();

    let settings = PipelineSettings::load_from(&stem_str).unwrap();
    assert_eq!(settings.words_per_page, 300);
    assert_eq!(settings.pacing.min_interval_ms, 1234);
    assert_eq!(settings.history_budget, 50);

    // Environment layers on top of the file.
    unsafe { std::env::set_var("SCHEHERAZADE__HISTORY_BUDGET", "7") };
    let settings = PipelineSettings::load_from(&stem_str).unwrap();
    unsafe { std::env::remove_var("SCHEHERAZADE__HISTORY_BUDGET") };
    assert_eq!(settings.history_budget, 7);
    assert_eq!(settings.words_per_page, 300);

    std::fs::remove_file(&path).ok();
}
