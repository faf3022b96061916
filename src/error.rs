//! Error types for scenario-sprites.
//!
//! Every failure in the sprite pipeline maps to one [`ErrorCode`], so callers
//! can tell a network problem from a malformed response or a job that the
//! remote service itself rejected.

use std::fmt;

/// Error codes describing why a sprite request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// HTTP or network failure, including non-2xx responses.
    /// Trigger: DNS/TLS/connect errors, 4xx/5xx from the API or asset host.
    Transport,

    /// Response arrived but did not contain the expected JSON fields.
    /// Trigger: missing `jobId`, empty `outputs`, missing `url`, non-JSON body.
    Protocol,

    /// The remote job reached its failed terminal state.
    /// Trigger: job status `failure`.
    RemoteJobFailure,

    /// Required configuration is missing or invalid.
    /// Trigger: `SCENARIO_API_KEY` or `SCENARIO_API_SECRET` unset.
    Configuration,

    /// Polling gave up before the job reached a terminal state.
    /// Trigger: attempt cap or wall-clock limit exceeded.
    Timeout,

    /// Generation parameters failed local validation.
    /// Trigger: empty prompt, strength outside 0..=1, zero samples or steps.
    InvalidRequest,

    /// The downloaded image could not be written to disk.
    /// Trigger: missing directory, permissions, disk full.
    OutputWriteFailed,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Transport => "TRANSPORT_ERROR",
            ErrorCode::Protocol => "PROTOCOL_ERROR",
            ErrorCode::RemoteJobFailure => "REMOTE_JOB_FAILURE",
            ErrorCode::Configuration => "CONFIGURATION_ERROR",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::OutputWriteFailed => "OUTPUT_WRITE_FAILED",
        }
    }

    /// Returns a human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::Transport => "HTTP request to the Scenario API or asset host failed",
            ErrorCode::Protocol => "Scenario API response was missing expected fields",
            ErrorCode::RemoteJobFailure => "Scenario job finished in a failed state",
            ErrorCode::Configuration => "Required configuration is missing or invalid",
            ErrorCode::Timeout => "Scenario job did not finish within the polling limit",
            ErrorCode::InvalidRequest => "Generation request parameters are invalid",
            ErrorCode::OutputWriteFailed => "Failed to write the sprite sheet to disk",
        }
    }

    /// Returns a recovery hint suggesting how to resolve this error.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCode::Transport => {
                "Check network access to api.cloud.scenario.com and that the API key \
                 and secret are valid (401/403 indicate bad credentials)"
            }
            ErrorCode::Protocol => {
                "The API may have changed shape; rerun with --verbose to log the raw response"
            }
            ErrorCode::RemoteJobFailure => {
                "Inspect the reported job error; adjust the prompt, model ID or reference asset"
            }
            ErrorCode::Configuration => {
                "Set SCENARIO_API_KEY and SCENARIO_API_SECRET in the environment or a .env file"
            }
            ErrorCode::Timeout => {
                "Increase SCENARIO_POLL_MAX_ATTEMPTS or SCENARIO_POLL_TIMEOUT_SECS, \
                 or check the job in the Scenario dashboard"
            }
            ErrorCode::InvalidRequest => {
                "Use a non-empty prompt, strength between 0 and 1, and at least one sample and step"
            }
            ErrorCode::OutputWriteFailed => {
                "Check that the output directory exists and is writable"
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for sprite generation.
#[derive(Debug)]
pub struct SpriteError {
    /// The error code identifying the type of error.
    pub code: ErrorCode,
    /// Human-readable error message with context.
    pub message: String,
    /// Optional underlying cause of the error.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SpriteError {
    /// Creates a new SpriteError with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new SpriteError with an underlying cause.
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a TRANSPORT_ERROR for a non-2xx response.
    pub fn http_status(status: u16, url: &str, body: &str) -> Self {
        let body = body.trim();
        let message = if body.is_empty() {
            format!("HTTP {} from {}", status, url)
        } else {
            format!("HTTP {} from {}: {}", status, url, body)
        };
        Self::new(ErrorCode::Transport, message)
    }

    /// Creates a TRANSPORT_ERROR wrapping a client-side failure.
    pub fn transport(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::with_source(ErrorCode::Transport, context, source)
    }

    /// Creates a PROTOCOL_ERROR.
    pub fn protocol(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::Protocol, reason)
    }

    /// Creates a REMOTE_JOB_FAILURE carrying the service-reported detail.
    pub fn remote_job_failure(job_id: &str, detail: Option<&str>) -> Self {
        Self::new(
            ErrorCode::RemoteJobFailure,
            format!(
                "Job {} failed: {}",
                job_id,
                detail.unwrap_or("no error detail reported")
            ),
        )
    }

    /// Creates a CONFIGURATION_ERROR for a missing environment variable.
    pub fn missing_config(var: &str) -> Self {
        Self::new(
            ErrorCode::Configuration,
            format!("{} is not set", var),
        )
    }

    /// Creates a TIMEOUT error.
    pub fn timeout(job_id: &str, attempts: u32) -> Self {
        Self::new(
            ErrorCode::Timeout,
            format!(
                "Job {} still running after {} status checks",
                job_id, attempts
            ),
        )
    }

    /// Creates a TIMEOUT error for a job that outlived the polling deadline.
    pub fn poll_deadline(job_id: &str, limit: std::time::Duration) -> Self {
        Self::new(
            ErrorCode::Timeout,
            format!(
                "Job {} still running at the {}s polling deadline",
                job_id,
                limit.as_secs_f64()
            ),
        )
    }

    /// Creates an INVALID_REQUEST error.
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, reason)
    }

    /// Creates an OUTPUT_WRITE_FAILED error.
    pub fn output_write_failed(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::with_source(
            ErrorCode::OutputWriteFailed,
            format!("Failed to write {}: {}", path.display(), source),
            source,
        )
    }
}

impl fmt::Display for SpriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}. Recovery: {}",
            self.code,
            self.message,
            self.code.recovery_hint()
        )
    }
}

impl std::error::Error for SpriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type alias using SpriteError.
pub type Result<T> = std::result::Result<T, SpriteError>;
