//! Response decoding.
//!
//! Bodies are read to the end before parsing, and the response is consumed
//! by the call whether or not decoding succeeds.

use reqwest::Response;
use serde::de::DeserializeOwned;

use hostctl_core::error::{HcError, HcResult};

/// Parse a JSON body into `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> HcResult<T> {
    serde_json::from_slice(bytes).map_err(|e| HcError::Decode(e.to_string()))
}

/// Read the whole response body and parse it as JSON into `T`.
pub async fn decode_response<T: DeserializeOwned>(response: Response) -> HcResult<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| HcError::Transport(format!("failed to read response body: {e}")))?;
    decode(&bytes)
}
