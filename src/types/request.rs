//! GenerationRequest type for img2img sprite sheet requests.
//!
//! Serializes directly to the body of `POST /generate/img2img`.

use serde::Serialize;

use crate::error::{Result, SpriteError};

/// Default img2img strength (how far the result may drift from the reference).
pub const DEFAULT_STRENGTH: f32 = 0.75;

/// Default number of images generated per request.
pub const DEFAULT_NUM_SAMPLES: u32 = 1;

/// Default classifier-free guidance scale.
pub const DEFAULT_GUIDANCE: f32 = 3.5;

/// Default number of diffusion steps.
pub const DEFAULT_INFERENCE_STEPS: u32 = 28;

/// Parameters for one image-to-image sprite sheet generation.
///
/// Field names serialize in the camelCase form the Scenario API expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Text description of the sprite sheet.
    pub prompt: String,

    /// Asset ID of the reference sprite sheet.
    pub image_id: String,

    /// Strength of the transformation (0.0 keeps the reference, 1.0 ignores it).
    pub strength: f32,

    /// Number of images to generate.
    pub num_samples: u32,

    /// Guidance scale.
    pub guidance: f32,

    /// Number of inference steps.
    pub num_inference_steps: u32,

    /// Scenario model ID.
    pub model_id: String,
}

impl GenerationRequest {
    /// Creates a request with default strength, samples, guidance and steps.
    pub fn new(
        prompt: impl Into<String>,
        image_id: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            image_id: image_id.into(),
            strength: DEFAULT_STRENGTH,
            num_samples: DEFAULT_NUM_SAMPLES,
            guidance: DEFAULT_GUIDANCE,
            num_inference_steps: DEFAULT_INFERENCE_STEPS,
            model_id: model_id.into(),
        }
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_num_samples(mut self, num_samples: u32) -> Self {
        self.num_samples = num_samples;
        self
    }

    pub fn with_guidance(mut self, guidance: f32) -> Self {
        self.guidance = guidance;
        self
    }

    pub fn with_inference_steps(mut self, steps: u32) -> Self {
        self.num_inference_steps = steps;
        self
    }

    /// Validates request parameters before anything is sent.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(SpriteError::invalid_request("Prompt cannot be empty"));
        }
        if self.image_id.trim().is_empty() {
            return Err(SpriteError::invalid_request(
                "Reference image asset ID cannot be empty",
            ));
        }
        if self.model_id.trim().is_empty() {
            return Err(SpriteError::invalid_request("Model ID cannot be empty"));
        }
        if !(0.0..=1.0).contains(&self.strength) {
            return Err(SpriteError::invalid_request(format!(
                "Strength must be between 0 and 1, got {}",
                self.strength
            )));
        }
        if self.num_samples == 0 {
            return Err(SpriteError::invalid_request("numSamples must be at least 1"));
        }
        if self.num_inference_steps == 0 {
            return Err(SpriteError::invalid_request(
                "numInferenceSteps must be at least 1",
            ));
        }
        Ok(())
    }
}
