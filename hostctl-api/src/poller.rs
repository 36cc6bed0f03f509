//! Waiting for asynchronous jobs.
//!
//! A job is polled at a fixed interval until its status is `"End"` or the
//! wait budget runs out. Fetch failures are retried until the deadline;
//! only the timeout is reported, carrying the last failure seen. A wait
//! ends either with the finished job or with `HcError::JobTimeout`.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use hostctl_core::error::{HcError, HcResult};

use crate::endpoints::jobs::JobResponse;

/// Anything that can report the current status of a job.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Fetch the current status of `job_id`.
    async fn fetch_job(&self, job_id: &str) -> HcResult<JobResponse>;
}

/// Deadline used when the timeout does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Fixed-interval job poller.
#[derive(Debug, Clone, Copy)]
pub struct JobPoller {
    timeout: Duration,
    interval: Duration,
}

/// Loop state for one wait.
struct PollProgress {
    deadline: Instant,
    attempts: u32,
    last_error: Option<HcError>,
}

impl PollProgress {
    fn new(timeout: Duration) -> Self {
        let now = Instant::now();
        Self {
            deadline: now.checked_add(timeout).unwrap_or(now + FAR_FUTURE),
            attempts: 0,
            last_error: None,
        }
    }

    fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    fn expired(&self) -> bool {
        self.remaining().is_zero()
    }

    fn into_timeout(self, job_id: &str) -> HcError {
        warn!(job_id, attempts = self.attempts, "gave up waiting for job");
        HcError::JobTimeout {
            job_id: job_id.to_string(),
            last_error: self.last_error.map(Box::new),
        }
    }
}

impl JobPoller {
    /// Create a poller with an overall `timeout` and fetch spacing `interval`.
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Overall budget of one wait.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Spacing between fetches.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll `source` until `job_id` ends or the budget is spent.
    ///
    /// Never runs longer than the timeout: each fetch is cut off at the
    /// deadline and the sleep between fetches is shortened to fit.
    pub async fn wait<S>(&self, source: &S, job_id: &str) -> HcResult<JobResponse>
    where
        S: JobSource + ?Sized,
    {
        let mut progress = PollProgress::new(self.timeout);

        loop {
            progress.attempts += 1;
            let budget = progress.remaining();

            let fetched = match tokio::time::timeout(budget, source.fetch_job(job_id)).await {
                Ok(result) => result,
                Err(_) => Err(HcError::Timeout(format!(
                    "job status fetch cut off after {:.1}s",
                    budget.as_secs_f64()
                ))),
            };

            match fetched {
                Ok(job) if job.is_terminal() => {
                    info!(job_id, attempts = progress.attempts, "job finished");
                    return Ok(job);
                }
                Ok(job) => {
                    debug!(job_id, status = %job.job_status, attempt = progress.attempts, "job pending");
                    progress.last_error = None;
                }
                Err(e) => {
                    warn!(job_id, attempt = progress.attempts, "job status fetch failed: {e}");
                    progress.last_error = Some(e);
                }
            }

            if progress.expired() {
                return Err(progress.into_timeout(job_id));
            }
            tokio::time::sleep(self.interval.min(progress.remaining())).await;
            if progress.expired() {
                return Err(progress.into_timeout(job_id));
            }
        }
    }
}
