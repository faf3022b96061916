//! Core types for scenario-sprites.
//!
//! - [`GenerationRequest`]: img2img parameters for one sprite sheet
//! - [`JobHandle`], [`JobStatus`]: remote job identity and polled state
//! - [`OutputFile`]: the PNG written at the end of a pipeline run

mod job;
mod output;
mod request;

pub use job::{AssetId, JobHandle, JobOutput, JobState, JobStatus};
pub use output::{compute_content_hash, OutputFile};
pub use request::{
    GenerationRequest, DEFAULT_GUIDANCE, DEFAULT_INFERENCE_STEPS, DEFAULT_NUM_SAMPLES,
    DEFAULT_STRENGTH,
};
