//! scenario-sprites: character sprite sheet generation via the Scenario API.
//!
//! Submits img2img jobs against a reference sprite sheet, polls them to
//! completion, chains a background-removal job on the result, and saves the
//! transparent PNG locally.
//!
//! # Modules
//!
//! - [`api`]: Typed Scenario API client and HTTP transport
//! - [`generation`]: Job poller, two-stage sprite pipeline, batch runs
//! - [`types`]: Request, job and output types
//! - [`config`]: Runtime configuration (SpriteConfig, PollConfig, Credentials)
//! - [`error`]: Error types and codes (SpriteError, ErrorCode)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::path::Path;
//! use scenario_sprites::{GenerationRequest, SpriteConfig, SpritePipeline};
//!
//! let config = SpriteConfig::from_env()?;
//! let pipeline = SpritePipeline::from_config(&config)?;
//!
//! let request = GenerationRequest::new(
//!     "8-bit RPG wizard character sprite sheet",
//!     &config.reference_asset_id,
//!     &config.model_id,
//! );
//! let output = pipeline.run_sprite_generation(&request, Path::new("wizard.png"))?;
//! println!("{} bytes, {}", output.bytes_written, output.content_hash);
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use config::{Credentials, PollConfig, SpriteConfig};
pub use error::{ErrorCode, Result, SpriteError};
pub use generation::{poll_job, run_batch, BatchReport, SpritePipeline, SpriteSpec};
pub use types::{AssetId, GenerationRequest, JobHandle, JobState, JobStatus, OutputFile};
