//! Comments API.

use serde_json::json;

use crate::client::PosterClient;
use crate::error::Result;
use crate::types::{Ack, AddCommentRequest, AddCommentResponse, CommentListResponse, CommentResponse};

/// Comments API client.
pub struct CommentsApi {
    client: PosterClient,
}

impl CommentsApi {
    pub(crate) fn new(client: PosterClient) -> Self {
        Self { client }
    }

    /// Add a comment to a post.
    pub async fn create(&self, request: &AddCommentRequest) -> Result<AddCommentResponse> {
        self.client.post("comment/create", request).await
    }

    /// Delete a comment by id.
    pub async fn delete(&self, comment_id: &str) -> Result<Ack> {
        self.client
            .delete(&format!("comment/delete/{comment_id}"))
            .await
    }

    /// Get a comment by id.
    pub async fn get(&self, comment_id: &str) -> Result<CommentResponse> {
        self.client.get(&format!("comment/{comment_id}")).await
    }

    /// List the comments on a post.
    pub async fn by_post(&self, post_id: &str) -> Result<CommentListResponse> {
        self.client.get(&format!("comment/post/{post_id}")).await
    }

    /// Like a comment.
    pub async fn like(&self, comment_id: &str) -> Result<Ack> {
        self.client
            .post("comment/like", &json!({ "commentId": comment_id }))
            .await
    }
}
