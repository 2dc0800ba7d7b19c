//! Reports API.
//!
//! Regular users can only file reports; listing them is reserved for
//! moderation deployments.

use crate::client::PosterClient;
use crate::error::Result;
use crate::types::{Ack, CreateReportRequest, ReportListResponse};

/// Reports API client.
pub struct ReportsApi {
    client: PosterClient,
}

impl ReportsApi {
    pub(crate) fn new(client: PosterClient) -> Self {
        Self { client }
    }

    /// File a report against a user or a post.
    pub async fn create(&self, request: &CreateReportRequest) -> Result<Ack> {
        self.client.post("report/create", request).await
    }

    /// List filed reports.
    pub async fn all(&self) -> Result<ReportListResponse> {
        self.client.get("report/all").await
    }
}
