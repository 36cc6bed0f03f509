//! Global error types for hostctl.
//!
//! Every failure the client can report is a variant of `HcError`, with
//! conversions from the underlying library errors.

use thiserror::Error;

/// Convenience type alias for Results using HcError.
pub type HcResult<T> = Result<T, HcError>;

/// Unified error type for the API client, configuration and CLI.
#[derive(Error, Debug)]
pub enum HcError {
    // -- Configuration errors --
    /// Endpoint URL or configuration file could not be used.
    #[error("configuration error: {0}")]
    Config(String),

    /// A caller-supplied value cannot be placed in a request.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // -- Network errors --
    /// HTTP request failed before a response body was fully read.
    #[error("transport error: {0}")]
    Transport(String),

    /// A single HTTP request exceeded its per-request timeout.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// The server answered with a non-2xx status.
    #[error("api error (status {status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    // -- Payload errors --
    /// Response body was not valid JSON for the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Request body could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),

    // -- Job errors --
    /// An asynchronous job did not reach its terminal status in time.
    #[error(
        "job \"{job_id}\" timed out, last error: {}",
        .last_error.as_ref().map(|e| e.to_string()).unwrap_or_else(|| "none".to_string())
    )]
    JobTimeout {
        /// Identifier of the job being waited on.
        job_id: String,
        /// Most recent fetch failure, if any.
        #[source]
        last_error: Option<Box<HcError>>,
    },

    // -- File/IO errors --
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl HcError {
    /// Whether this error came from the network layer rather than the payload.
    pub fn is_transport(&self) -> bool {
        matches!(self, HcError::Transport(_) | HcError::Timeout(_))
    }
}

impl From<serde_json::Error> for HcError {
    fn from(e: serde_json::Error) -> Self {
        HcError::Decode(e.to_string())
    }
}

impl From<toml::de::Error> for HcError {
    fn from(e: toml::de::Error) -> Self {
        HcError::Config(e.to_string())
    }
}
