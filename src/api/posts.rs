//! Posts API.

use serde_json::json;

use crate::client::PosterClient;
use crate::error::Result;
use crate::types::{Ack, CreatePostRequest, CreatePostResponse, PostListResponse, PostResponse};

/// Posts API client.
pub struct PostsApi {
    client: PosterClient,
}

impl PostsApi {
    pub(crate) fn new(client: PosterClient) -> Self {
        Self { client }
    }

    /// Create a post.
    pub async fn create(&self, request: &CreatePostRequest) -> Result<CreatePostResponse> {
        self.client.post("post/create", request).await
    }

    /// Delete a post by id.
    pub async fn delete(&self, post_id: &str) -> Result<Ack> {
        self.client.delete(&format!("post/delete/{post_id}")).await
    }

    /// List the posts authored by a user.
    pub async fn by_author(&self, user_id: &str) -> Result<PostListResponse> {
        self.client.get(&format!("post/author/{user_id}")).await
    }

    /// Get a post by id.
    pub async fn get(&self, post_id: &str) -> Result<PostResponse> {
        self.client.get(&format!("post/{post_id}")).await
    }

    /// Search posts by query string.
    pub async fn search(&self, query: &str) -> Result<PostListResponse> {
        self.client
            .post("post/search", &json!({ "searchQuery": query }))
            .await
    }

    /// Like a post.
    pub async fn like(&self, post_id: &str) -> Result<Ack> {
        self.client
            .post("post/like", &json!({ "postId": post_id }))
            .await
    }
}
