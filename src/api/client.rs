//! Typed client for the Scenario generation and jobs endpoints.

use serde_json::{json, Value};

use crate::error::{ErrorCode, Result, SpriteError};
use crate::types::{AssetId, GenerationRequest, JobHandle, JobStatus};

use super::transport::Transport;

/// Endpoint for image-to-image generation.
pub const IMG2IMG_PATH: &str = "/generate/img2img";

/// Endpoint for background removal.
pub const REMOVE_BACKGROUND_PATH: &str = "/generate/remove-background";

/// Output format requested from background removal.
pub const REMOVE_BACKGROUND_FORMAT: &str = "png";

/// Scenario API client over an arbitrary [`Transport`].
pub struct ScenarioApi<T> {
    transport: T,
}

impl<T: Transport> ScenarioApi<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Submits an img2img job and returns its handle.
    pub fn submit_img2img(&self, request: &GenerationRequest) -> Result<JobHandle> {
        let body = serde_json::to_value(request).map_err(|e| {
            SpriteError::with_source(
                ErrorCode::InvalidRequest,
                "Failed to encode generation request",
                e,
            )
        })?;

        let response = self.transport.post_json(IMG2IMG_PATH, &body)?;
        parse_job_id(&response, "img2img")
    }

    /// Submits a background-removal job for `asset` and returns its handle.
    pub fn submit_remove_background(&self, asset: &AssetId) -> Result<JobHandle> {
        let body = json!({
            "assetId": asset.as_str(),
            "outputFormat": REMOVE_BACKGROUND_FORMAT,
        });

        let response = self.transport.post_json(REMOVE_BACKGROUND_PATH, &body)?;
        parse_job_id(&response, "remove-background")
    }

    /// Fetches the current status of a job.
    pub fn job_status(&self, job: &JobHandle) -> Result<JobStatus> {
        let response = self.transport.get_json(&format!("/jobs/{}", job))?;
        JobStatus::from_json(job, response)
    }

    /// Downloads a finished asset from its output URL.
    pub fn download(&self, url: &str) -> Result<Vec<u8>> {
        self.transport.fetch_bytes(url)
    }
}

/// Extracts `jobId` from a submission response.
fn parse_job_id(response: &Value, kind: &str) -> Result<JobHandle> {
    let job_id = response
        .get("jobId")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            SpriteError::protocol(format!(
                "No jobId in {} response: {}",
                kind,
                serde_json::to_string(response).unwrap_or_default()
            ))
        })?;

    JobHandle::new(job_id)
}
