//! Batch generation over a roster of character archetypes.
//!
//! Each sprite runs to completion before the next starts. A failure is
//! logged and recorded, and the batch moves on to the next archetype.

use std::path::{Path, PathBuf};

use crate::api::Transport;
use crate::config::SpriteConfig;
use crate::error::{Result, SpriteError};
use crate::types::{GenerationRequest, OutputFile};

use super::pipeline::SpritePipeline;
use super::poller::Pause;

/// One sprite sheet to generate: an archetype name and its prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteSpec {
    /// Archetype name, used for the output file name.
    pub name: String,
    pub prompt: String,
}

impl SpriteSpec {
    pub fn new(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
        }
    }

    /// File name for this archetype's sprite sheet.
    pub fn file_name(&self) -> String {
        format!("{}_scenario.png", self.name)
    }
}

/// Built-in character roster.
pub const DEFAULT_ROSTER: [(&str, &str); 5] = [
    (
        "male_warrior",
        "8-bit RPG male warrior character sprite sheet, with a large sword and shield",
    ),
    (
        "female_archer",
        "8-bit RPG female archer character sprite sheet, with a bow and quiver",
    ),
    (
        "goblin_rogue",
        "8-bit RPG goblin rogue character sprite sheet, with daggers and leather armor",
    ),
    (
        "wizard",
        "8-bit RPG wizard character sprite sheet, wearing robes and holding a magical staff",
    ),
    (
        "armored_knight",
        "8-bit RPG heavily armored knight character sprite sheet, with a full helmet and a longsword",
    ),
];

/// Returns the built-in roster as specs.
pub fn default_roster() -> Vec<SpriteSpec> {
    DEFAULT_ROSTER
        .iter()
        .map(|(name, prompt)| SpriteSpec::new(*name, *prompt))
        .collect()
}

/// Builds the request for `spec` from the shared settings in `template`.
///
/// Only the prompt differs between sprites in a batch.
pub fn request_for(spec: &SpriteSpec, template: &GenerationRequest) -> GenerationRequest {
    GenerationRequest {
        prompt: spec.prompt.clone(),
        ..template.clone()
    }
}

/// Request template using the configured model and reference asset.
pub fn template_from_config(config: &SpriteConfig) -> GenerationRequest {
    GenerationRequest::new(
        String::new(),
        config.reference_asset_id.clone(),
        config.model_id.clone(),
    )
}

/// Outcome of one sprite in a batch.
#[derive(Debug)]
pub struct SpriteOutcome {
    pub name: String,
    pub path: PathBuf,
    pub result: Result<OutputFile>,
}

/// Per-archetype results of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<SpriteOutcome>,
}

impl BatchReport {
    /// Files written successfully.
    pub fn succeeded(&self) -> impl Iterator<Item = &OutputFile> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    /// Failed archetypes with their errors.
    pub fn failed(&self) -> impl Iterator<Item = (&str, &SpriteError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.name.as_str(), e)))
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Runs every spec through `pipeline`, writing into `output_dir`.
///
/// Creates `output_dir` if needed; failing to create it aborts the whole
/// batch since no sprite could be saved.
pub fn run_batch<T, P>(
    pipeline: &SpritePipeline<T, P>,
    specs: &[SpriteSpec],
    template: &GenerationRequest,
    output_dir: &Path,
) -> Result<BatchReport>
where
    T: Transport,
    P: Pause,
{
    std::fs::create_dir_all(output_dir)
        .map_err(|e| SpriteError::output_write_failed(output_dir, e))?;

    let mut report = BatchReport::default();

    for (index, spec) in specs.iter().enumerate() {
        let path = output_dir.join(spec.file_name());
        let span = tracing::info_span!("sprite", name = %spec.name);
        let _enter = span.enter();

        tracing::info!(
            "generating sprite sheet {}/{}: {}",
            index + 1,
            specs.len(),
            spec.prompt
        );

        let result = pipeline.run_sprite_generation(&request_for(spec, template), &path);
        if let Err(ref e) = result {
            tracing::error!(error = %e, "sprite generation failed");
        }

        report.outcomes.push(SpriteOutcome {
            name: spec.name.clone(),
            path,
            result,
        });
    }

    Ok(report)
}
