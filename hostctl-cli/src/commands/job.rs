//! Job commands - read and wait on asynchronous jobs.

use std::time::Instant;

use clap::Subcommand;
use console::style;

use hostctl_api::{JobResponse, RequestContext};
use hostctl_core::config::ConfigHandle;
use hostctl_core::error::HcResult;
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum JobAction {
    /// Show the current status of a job.
    Get {
        /// Job identifier.
        job_id: String,
    },
    /// Wait until a job ends or the timeout passes.
    Wait {
        /// Job identifier.
        job_id: String,
    },
}

pub async fn run(config: ConfigHandle, action: JobAction, format: OutputFormat) -> HcResult<()> {
    let api = super::create_api_client(&config).await?;

    match action {
        JobAction::Get { job_id } => {
            let job = api.get_job(&RequestContext::background(), &job_id).await?;
            print_job(&job, None, format)
        }
        JobAction::Wait { job_id } => {
            if let OutputFormat::Text = format {
                eprintln!(
                    "{} job {} (timeout {}s)",
                    style("Waiting for").dim(),
                    style(&job_id).cyan(),
                    api.async_timeout().as_secs()
                );
            }
            let start = Instant::now();
            let job = api.wait_async_job(&job_id).await?;
            print_job(&job, Some(start.elapsed().as_secs_f64()), format)
        }
    }
}

fn print_job(job: &JobResponse, waited_secs: Option<f64>, format: OutputFormat) -> HcResult<()> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::json!({
                "job_id": job.job_id,
                "job_status": job.job_status,
                "finished": job.is_terminal(),
            });
            if let Some(secs) = waited_secs {
                json["waited_secs"] = serde_json::json!(secs);
            }
            super::print_json(&json)
        }
        OutputFormat::Text => {
            let status = if job.is_terminal() {
                style(job.job_status.as_str()).green()
            } else {
                style(job.job_status.as_str()).yellow()
            };
            match waited_secs {
                Some(secs) => println!("Job {}: {status} after {secs:.1}s", style(&job.job_id).cyan()),
                None => println!("Job {}: {status}", style(&job.job_id).cyan()),
            }
            Ok(())
        }
    }
}
