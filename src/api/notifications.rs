//! Notifications API.

use crate::client::PosterClient;
use crate::error::Result;
use crate::types::{Ack, NotificationListResponse};

/// Notifications API client.
pub struct NotificationsApi {
    client: PosterClient,
}

impl NotificationsApi {
    pub(crate) fn new(client: PosterClient) -> Self {
        Self { client }
    }

    /// Get a page of the authenticated user's notifications.
    ///
    /// Notifications churn constantly, so this read bypasses the cache.
    pub async fn all(&self, page: u32) -> Result<NotificationListResponse> {
        self.client.get(&format!("notification/all/{page}")).await
    }

    /// Mark a single notification as read.
    pub async fn mark_read(&self, notification_id: &str) -> Result<Ack> {
        self.client
            .patch_empty(&format!("notification/read/id/{notification_id}"))
            .await
    }

    /// Mark every notification as read.
    pub async fn mark_all_read(&self) -> Result<Ack> {
        self.client.patch_empty("notification/read/all").await
    }
}
