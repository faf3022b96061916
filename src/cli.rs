//! Command-line interface.
//!
//! Without `--prompt` the built-in roster is generated; with it, a single
//! custom sprite sheet.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::SpriteConfig;
use crate::error::{Result, SpriteError};
use crate::generation::batch::{default_roster, template_from_config, SpriteSpec};
use crate::types::{
    GenerationRequest, DEFAULT_GUIDANCE, DEFAULT_INFERENCE_STEPS, DEFAULT_NUM_SAMPLES,
    DEFAULT_STRENGTH,
};

/// Archetype name used for `--prompt` runs without `--name`.
pub const CUSTOM_SPRITE_NAME: &str = "custom";

/// scenario-sprites: character sprite sheets via Scenario img2img
#[derive(Parser, Debug)]
#[command(name = "scenario-sprites")]
#[command(about = "Generate transparent character sprite sheets with the Scenario API")]
#[command(version)]
pub struct Cli {
    /// Prompt for a single custom sprite sheet (skips the built-in roster)
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Archetype name for the custom sprite (used in the output file name)
    #[arg(short, long, requires = "prompt")]
    pub name: Option<String>,

    /// Only generate these roster archetypes (repeatable)
    #[arg(long, conflicts_with = "prompt")]
    pub only: Vec<String>,

    /// List the built-in roster and exit
    #[arg(long)]
    pub list: bool,

    /// Directory for generated PNG files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Scenario model ID
    #[arg(long)]
    pub model_id: Option<String>,

    /// Reference sprite sheet asset ID
    #[arg(long)]
    pub image_id: Option<String>,

    /// img2img strength (0.0-1.0)
    #[arg(long, default_value_t = DEFAULT_STRENGTH)]
    pub strength: f32,

    /// Number of samples per request
    #[arg(long, default_value_t = DEFAULT_NUM_SAMPLES)]
    pub samples: u32,

    /// Guidance scale
    #[arg(long, default_value_t = DEFAULT_GUIDANCE)]
    pub guidance: f32,

    /// Number of inference steps
    #[arg(long, default_value_t = DEFAULT_INFERENCE_STEPS)]
    pub steps: u32,

    /// Seconds between job status checks
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub poll_interval: Option<u64>,

    /// Maximum status checks per job before giving up
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: Option<u32>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Returns true if generating a single custom sprite.
    pub fn is_single_mode(&self) -> bool {
        self.prompt.is_some()
    }

    /// Applies command-line overrides on top of the environment config.
    pub fn apply_to(&self, config: &mut SpriteConfig) {
        if let Some(ref dir) = self.output_dir {
            config.output_dir = Some(dir.clone());
        }
        if let Some(ref model_id) = self.model_id {
            config.model_id = model_id.clone();
        }
        if let Some(ref image_id) = self.image_id {
            config.reference_asset_id = image_id.clone();
        }
        if let Some(secs) = self.poll_interval {
            config.poll.interval = Duration::from_secs(secs);
        }
        if let Some(attempts) = self.max_attempts {
            config.poll.max_attempts = Some(attempts);
        }
    }

    /// Request template shared by every sprite in this run.
    pub fn request_template(&self, config: &SpriteConfig) -> GenerationRequest {
        template_from_config(config)
            .with_strength(self.strength)
            .with_num_samples(self.samples)
            .with_guidance(self.guidance)
            .with_inference_steps(self.steps)
    }

    /// Sprites to generate in this run.
    ///
    /// Fails if `--only` names an archetype missing from the roster.
    pub fn specs(&self) -> Result<Vec<SpriteSpec>> {
        if let Some(ref prompt) = self.prompt {
            let name = self.name.as_deref().unwrap_or(CUSTOM_SPRITE_NAME);
            return Ok(vec![SpriteSpec::new(name, prompt.clone())]);
        }

        let roster = default_roster();
        if self.only.is_empty() {
            return Ok(roster);
        }

        if let Some(unknown) = self
            .only
            .iter()
            .find(|name| !roster.iter().any(|s| &s.name == *name))
        {
            return Err(SpriteError::invalid_request(format!(
                "Unknown archetype '{}' (run with --list to see the roster)",
                unknown
            )));
        }

        Ok(roster
            .into_iter()
            .filter(|s| self.only.contains(&s.name))
            .collect())
    }
}
