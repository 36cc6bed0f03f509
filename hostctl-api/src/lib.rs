//! hostctl API - HTTP client for the resource and job REST API.
//!
//! Covers listing, adding and deleting resources, reading job status, and
//! waiting for asynchronous jobs to finish.

pub mod client;
pub mod endpoints;
pub mod poller;
pub mod response;

// Re-export key types
pub use client::{ApiClient, RequestContext};
pub use endpoints::jobs::JobResponse;
pub use endpoints::resources::{AddParams, ListEntry, OperationResponse};
pub use poller::{JobPoller, JobSource};
pub use response::{decode, decode_response};
