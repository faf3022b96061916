//! Job status polling.
//!
//! Waits for a submitted Scenario job to reach a terminal state by checking
//! its status at a fixed interval. The wait happens on the calling thread
//! through a [`Pause`] so tests can observe it without sleeping.

use std::time::{Duration, Instant};

use crate::api::{ScenarioApi, Transport};
use crate::config::PollConfig;
use crate::error::{Result, SpriteError};
use crate::types::{JobHandle, JobState, JobStatus};

/// Blocks the calling thread between status checks.
pub trait Pause {
    fn pause(&self, duration: Duration);
}

/// [`Pause`] backed by `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Pause for ThreadSleep {
    fn pause(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<P: Pause + ?Sized> Pause for &P {
    fn pause(&self, duration: Duration) {
        (**self).pause(duration)
    }
}

/// Polls `job` until it succeeds, fails, or exceeds the poll limits.
///
/// The first status check happens immediately; every later check is
/// preceded by exactly one `poll.interval` pause. A check that would go out
/// after `poll.timeout` is never made.
///
/// # Errors
///
/// - `REMOTE_JOB_FAILURE` when the job reports a failed status
/// - `TIMEOUT` when `poll.max_attempts` or `poll.timeout` is exceeded
/// - `TRANSPORT_ERROR` / `PROTOCOL_ERROR` from the status request itself
pub fn poll_job<T, P>(
    api: &ScenarioApi<T>,
    job: &JobHandle,
    poll: &PollConfig,
    pause: &P,
) -> Result<JobStatus>
where
    T: Transport,
    P: Pause,
{
    let started = Instant::now();
    let mut attempts: u32 = 0;
    let mut last_status = String::new();

    loop {
        attempts += 1;

        let status = api.job_status(job)?;

        match status.state {
            JobState::Succeeded => {
                tracing::info!(job_id = %job, attempts, "job completed successfully");
                return Ok(status);
            }
            JobState::Failed => {
                tracing::warn!(
                    job_id = %job,
                    error = status.error.as_deref().unwrap_or("unknown"),
                    "job failed"
                );
                return Err(SpriteError::remote_job_failure(
                    job.as_str(),
                    status.error.as_deref(),
                ));
            }
            JobState::InProgress => {
                if status.raw_status != last_status {
                    tracing::info!(
                        job_id = %job,
                        status = %status.raw_status,
                        "job status changed"
                    );
                    last_status = status.raw_status.clone();
                }
                tracing::debug!(
                    job_id = %job,
                    status = %status.raw_status,
                    progress = status.progress.unwrap_or(0.0),
                    attempt = attempts,
                    "job still running"
                );
            }
        }

        if poll.max_attempts.is_some_and(|max| attempts >= max) {
            return Err(SpriteError::timeout(job.as_str(), attempts));
        }
        if let Some(limit) = poll.timeout {
            if started.elapsed().saturating_add(poll.interval) >= limit {
                return Err(SpriteError::poll_deadline(job.as_str(), limit));
            }
        }

        pause.pause(poll.interval);
    }
}
