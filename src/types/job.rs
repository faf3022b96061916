//! Remote job types returned by the Scenario jobs API.
//!
//! A [`JobHandle`] identifies a submitted job; polling it yields a
//! [`JobStatus`] whose [`JobState`] decides whether to keep waiting.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SpriteError};

/// Identifier of a job accepted by the remote service.
///
/// Never empty. Valid only until the job reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle(String);

impl JobHandle {
    /// Wraps a job ID, rejecting blank identifiers.
    pub fn new(job_id: impl Into<String>) -> Result<Self> {
        let job_id = job_id.into();
        if job_id.trim().is_empty() {
            return Err(SpriteError::protocol("Job ID is empty"));
        }
        Ok(Self(job_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a remote image asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(asset_id: impl Into<String>) -> Self {
        Self(asset_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coarse state of a remote job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    /// Queued, running, or any status string not recognised as terminal.
    #[default]
    InProgress,
    /// Finished with outputs.
    Succeeded,
    /// Finished with an error.
    Failed,
}

impl JobState {
    /// Maps a wire status string to a state.
    ///
    /// Only `success`/`succeeded` and `failure`/`failed` are terminal.
    pub fn parse(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "success" | "succeeded" => JobState::Succeeded,
            "failure" | "failed" => JobState::Failed,
            _ => JobState::InProgress,
        }
    }

    /// Returns true if no further polling is needed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

/// One output descriptor of a finished job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOutput {
    /// Assets produced by this output (img2img jobs). `null` reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub asset_ids: Vec<AssetId>,

    /// Direct download URL (background-removal jobs).
    #[serde(default)]
    pub url: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<AssetId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<AssetId>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Snapshot of a job as reported by `GET /jobs/{jobId}`.
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatus {
    pub job_id: JobHandle,
    pub state: JobState,
    /// Status string exactly as the service sent it.
    pub raw_status: String,
    pub progress: Option<f64>,
    pub outputs: Vec<JobOutput>,
    pub error: Option<String>,
}

#[derive(Deserialize)]
struct WireJobStatus {
    status: Option<String>,
    #[serde(default)]
    progress: Option<f64>,
    #[serde(default)]
    outputs: Option<Vec<JobOutput>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl JobStatus {
    /// Parses a job status payload.
    ///
    /// A payload without a `status` string is a protocol error.
    pub fn from_json(job_id: &JobHandle, value: serde_json::Value) -> Result<Self> {
        let wire: WireJobStatus = serde_json::from_value(value).map_err(|e| {
            SpriteError::with_source(
                crate::error::ErrorCode::Protocol,
                format!("Malformed status payload for job {}", job_id),
                e,
            )
        })?;

        let raw_status = wire.status.ok_or_else(|| {
            SpriteError::protocol(format!("Status payload for job {} has no status", job_id))
        })?;

        let error = match wire.error {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        };

        Ok(Self {
            job_id: job_id.clone(),
            state: JobState::parse(&raw_status),
            raw_status,
            progress: wire.progress,
            outputs: wire.outputs.unwrap_or_default(),
            error,
        })
    }

    /// First asset ID of the first output, if any.
    pub fn first_asset_id(&self) -> Option<&AssetId> {
        self.outputs.first().and_then(|o| o.asset_ids.first())
    }

    /// Download URL of the first output, if any.
    pub fn first_url(&self) -> Option<&str> {
        self.outputs
            .first()
            .and_then(|o| o.url.as_deref())
            .filter(|u| !u.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    fn handle() -> JobHandle {
        JobHandle::new("job_abc").unwrap()
    }

    #[test]
    fn job_handle_rejects_blank() {
        assert_eq!(JobHandle::new("").unwrap_err().code, ErrorCode::Protocol);
        assert!(JobHandle::new("   ").is_err());
        assert_eq!(handle().as_str(), "job_abc");
    }

    #[test]
    fn state_parsing() {
        assert_eq!(JobState::parse("success"), JobState::Succeeded);
        assert_eq!(JobState::parse("succeeded"), JobState::Succeeded);
        assert_eq!(JobState::parse("failure"), JobState::Failed);
        assert_eq!(JobState::parse("FAILED"), JobState::Failed);
        assert_eq!(JobState::parse("in-progress"), JobState::InProgress);
        assert_eq!(JobState::parse("queued"), JobState::InProgress);
        assert_eq!(JobState::parse("canceled"), JobState::InProgress);
    }

    #[test]
    fn terminal_states() {
        assert!(JobState::Succeeded.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(!JobState::InProgress.is_terminal());
    }

    #[test]
    fn parses_success_payload() {
        let status = JobStatus::from_json(
            &handle(),
            json!({
                "status": "success",
                "progress": 100,
                "outputs": [{"assetIds": ["asset_1", "asset_2"]}]
            }),
        )
        .unwrap();
        assert_eq!(status.state, JobState::Succeeded);
        assert_eq!(status.progress, Some(100.0));
        assert_eq!(status.first_asset_id().unwrap().as_str(), "asset_1");
        assert!(status.first_url().is_none());
    }

    #[test]
    fn parses_url_output() {
        let status = JobStatus::from_json(
            &handle(),
            json!({"status": "success", "outputs": [{"url": "https://cdn/x.png"}]}),
        )
        .unwrap();
        assert_eq!(status.first_url(), Some("https://cdn/x.png"));
        assert!(status.first_asset_id().is_none());
    }

    #[test]
    fn null_asset_ids_next_to_url() {
        let status = JobStatus::from_json(
            &handle(),
            json!({
                "status": "success",
                "outputs": [{"assetIds": null, "url": "https://cdn/U.png"}]
            }),
        )
        .unwrap();
        assert_eq!(status.first_url(), Some("https://cdn/U.png"));
        assert!(status.outputs[0].asset_ids.is_empty());

        let running = JobStatus::from_json(
            &handle(),
            json!({"status": "in-progress", "outputs": [{"assetIds": null, "url": null}]}),
        )
        .unwrap();
        assert_eq!(running.state, JobState::InProgress);
    }

    #[test]
    fn error_object_is_stringified() {
        let status = JobStatus::from_json(
            &handle(),
            json!({"status": "failure", "error": {"message": "nsfw"}}),
        )
        .unwrap();
        assert_eq!(status.state, JobState::Failed);
        assert!(status.error.unwrap().contains("nsfw"));
    }

    #[test]
    fn missing_status_is_protocol_error() {
        let err = JobStatus::from_json(&handle(), json!({"progress": 0.5})).unwrap_err();
        assert_eq!(err.code, ErrorCode::Protocol);

        let err = JobStatus::from_json(&handle(), json!(["not", "an", "object"])).unwrap_err();
        assert_eq!(err.code, ErrorCode::Protocol);
    }
}
