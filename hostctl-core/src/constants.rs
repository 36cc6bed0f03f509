//! Application-wide constants.

/// Application name, also used for config and data directories.
pub const APP_NAME: &str = "hostctl";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Job status value marking a finished job.
pub const JOB_STATUS_END: &str = "End";

/// Path segment of the job status endpoint.
pub const JOBS_PATH: &str = "jobs";

/// Default collection segment for list/add/delete.
pub const DEFAULT_RESOURCE_PATH: &str = "path";

/// Default per-request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Default budget for waiting on a single job, in seconds.
pub const DEFAULT_JOB_TIMEOUT_SECS: u64 = 60;

/// Default spacing between job status fetches, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Smallest accepted spacing between job status fetches, in milliseconds.
pub const MIN_POLL_INTERVAL_MS: u64 = 10;

/// Connect timeout applied to the HTTP transport, in seconds.
pub const CONNECT_TIMEOUT_SECS: u64 = 15;
