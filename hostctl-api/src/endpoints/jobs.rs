//! Job status endpoint.

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use hostctl_core::constants;
use hostctl_core::error::HcResult;

use crate::client::{ApiClient, RequestContext};
use crate::poller::{JobPoller, JobSource};

/// Status of a server-side job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResponse {
    pub job_id: String,
    pub job_status: String,
}

impl JobResponse {
    /// Whether the job has reached `"End"`.
    pub fn is_terminal(&self) -> bool {
        self.job_status == constants::JOB_STATUS_END
    }
}

impl ApiClient {
    /// Get job status by job id.
    pub async fn get_job(&self, ctx: &RequestContext, job_id: &str) -> HcResult<JobResponse> {
        self.send_json(ctx, Method::GET, &[constants::JOBS_PATH, job_id], None)
            .await
    }

    /// Poller configured with this client's current timeout and interval.
    pub fn job_poller(&self) -> JobPoller {
        JobPoller::new(self.async_timeout(), self.poll_interval())
    }

    /// Block until `job_id` ends or the async timeout elapses.
    pub async fn wait_async_job(&self, job_id: &str) -> HcResult<JobResponse> {
        self.job_poller().wait(self, job_id).await
    }
}

#[async_trait]
impl JobSource for ApiClient {
    async fn fetch_job(&self, job_id: &str) -> HcResult<JobResponse> {
        self.get_job(&RequestContext::background(), job_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_status() {
        let job = |status: &str| JobResponse {
            job_id: "j".into(),
            job_status: status.into(),
        };
        assert!(job("End").is_terminal());
        assert!(!job("end").is_terminal());
        assert!(!job("Running").is_terminal());
    }

    #[test]
    fn test_job_poller_uses_client_settings() {
        let mut client = ApiClient::new("http://localhost", "", "")
            .unwrap()
            .with_poll_interval(std::time::Duration::from_millis(200));
        client.set_async_timeout(std::time::Duration::from_secs(9));

        let poller = client.job_poller();
        assert_eq!(poller.timeout(), std::time::Duration::from_secs(9));
        assert_eq!(poller.interval(), std::time::Duration::from_millis(200));
    }
}
