//! Pipeline settings with file and environment loading.

use scheherazade_error::{ConfigError, ScheherazadeResult};
use scheherazade_rate_limit::PacingConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

fn default_words_per_page() -> u32 {
    250
}

fn default_history_budget() -> usize {
    50
}

/// Tunable settings for the generation pipeline.
///
/// Loaded from an optional TOML file plus `SCHEHERAZADE_*` environment
/// variables; every field has a sensible default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Pacing between consecutive model calls
    pub pacing: PacingConfig,
    /// Words assumed per page for the advisory length check
    pub words_per_page: u32,
    /// Conversation-history budget passed to the context assembler
    pub history_budget: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            pacing: PacingConfig::default(),
            words_per_page: default_words_per_page(),
            history_budget: default_history_budget(),
        }
    }
}

impl PipelineSettings {
    /// Load settings from `scheherazade.toml` (if present) overlaid with
    /// `SCHEHERAZADE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is present but malformed.
    pub fn load() -> ScheherazadeResult<Self> {
        Self::load_from("scheherazade")
    }

    /// Load settings from a named config file stem plus environment.
    pub fn load_from(file_stem: &str) -> ScheherazadeResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(file_stem).required(false))
            .add_source(
                config::Environment::with_prefix("SCHEHERAZADE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build settings: {}", e)))?
            .try_deserialize::<Self>()
            .map_err(|e| ConfigError::new(format!("Failed to deserialize settings: {}", e)))?;

        debug!(
            pacing_ms = settings.pacing.min_interval_ms,
            words_per_page = settings.words_per_page,
            history_budget = settings.history_budget,
            "Loaded pipeline settings"
        );
        Ok(settings)
    }
}
