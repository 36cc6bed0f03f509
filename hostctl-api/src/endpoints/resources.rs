//! Resource endpoints: list, add, delete.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use hostctl_core::error::{HcError, HcResult};

use crate::client::{ApiClient, RequestContext};

/// Parameters for adding a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddParams {
    #[serde(rename = "ipaddress")]
    pub ip_address: String,
    pub port: u16,
}

/// One row of the resource listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    pub id: String,
    pub name: i64,
}

/// Job handle returned by mutating operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResponse {
    pub job_id: String,
    pub job_status: i64,
}

impl ApiClient {
    /// List all resources, in server order.
    pub async fn list(&self, ctx: &RequestContext) -> HcResult<Vec<ListEntry>> {
        let segments = self.resource_segments();
        self.send_json(ctx, Method::GET, &segments, None).await
    }

    /// Add a resource under `id`. Waits for the job in async mode.
    pub async fn add(
        &self,
        ctx: &RequestContext,
        id: &str,
        params: &AddParams,
    ) -> HcResult<OperationResponse> {
        let body = serde_json::to_value(params).map_err(|e| HcError::Encode(e.to_string()))?;
        let mut segments = self.resource_segments();
        segments.push(id);

        let resp: OperationResponse = self
            .send_json(ctx, Method::POST, &segments, Some(&body))
            .await?;
        info!(id, job_id = %resp.job_id, "add accepted");

        self.settle(&resp).await?;
        Ok(resp)
    }

    /// Delete the resource `id`. Waits for the job in async mode.
    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> HcResult<OperationResponse> {
        let mut segments = self.resource_segments();
        segments.push(id);

        let resp: OperationResponse = self.send_json(ctx, Method::DELETE, &segments, None).await?;
        info!(id, job_id = %resp.job_id, "delete accepted");

        self.settle(&resp).await?;
        Ok(resp)
    }

    /// In async mode, wait for the job behind a mutating call.
    async fn settle(&self, resp: &OperationResponse) -> HcResult<()> {
        if self.is_async() {
            self.wait_async_job(&resp.job_id).await?;
        }
        Ok(())
    }
}
