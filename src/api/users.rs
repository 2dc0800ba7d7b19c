//! Users API: accounts, sessions, profiles, follows, and the home feed.

use std::time::Duration;

use serde_json::json;

use crate::client::PosterClient;
use crate::error::Result;
use crate::types::{
    Ack, AuthResponse, DeleteAccountRequest, LoginRequest, LoginResponse, PostListResponse,
    ProfileResponse, RegisterRequest, RegisterResponse, ResetPasswordRequest,
    UpdateUserInfoRequest, UploadResponse, UserListResponse,
};

/// Users API client.
pub struct UsersApi {
    client: PosterClient,
}

impl UsersApi {
    pub(crate) fn new(client: PosterClient) -> Self {
        Self { client }
    }

    /// Register a new user.
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse> {
        self.client.post("user/register", request).await
    }

    /// Log in and obtain a bearer token.
    ///
    /// The token is returned, not applied; call
    /// [`PosterClient::set_auth_token`] to attach it.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        self.client.post("user/login", request).await
    }

    /// Request a password reset for the given email.
    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<Ack> {
        self.client.post("user/reset-password", request).await
    }

    /// Invalidate the current session server-side.
    pub async fn logout(&self) -> Result<Ack> {
        self.client.post_empty("user/logout").await
    }

    /// Look up the authenticated user.
    pub async fn auth(&self) -> Result<AuthResponse> {
        self.client.get("user/auth").await
    }

    /// Get a user profile by username, cached under the default TTL.
    ///
    /// Profiles are good cache candidates: feed rendering resolves the same
    /// authors repeatedly, so a profile page usually finds its data already
    /// in memory.
    pub async fn profile(&self, username: &str) -> Result<ProfileResponse> {
        self.profile_inner(username, None).await
    }

    /// Get a user profile by username, cached with an explicit TTL.
    pub async fn profile_with_ttl(&self, username: &str, ttl: Duration) -> Result<ProfileResponse> {
        self.profile_inner(username, Some(ttl)).await
    }

    async fn profile_inner(&self, username: &str, ttl: Option<Duration>) -> Result<ProfileResponse> {
        let key = format!("userProfile_{username}");
        let client = self.client.clone();
        let path = format!("user/profile/{username}");
        self.client
            .cached_request(&key, ttl, || async move { client.get(&path).await })
            .await
    }

    /// Get a user profile by id, cached under the default TTL.
    pub async fn profile_by_id(&self, id: &str) -> Result<ProfileResponse> {
        let key = format!("userProfileById_{id}");
        let client = self.client.clone();
        let path = format!("user/profile/id/{id}");
        self.client
            .cached_request(&key, None, || async move { client.get(&path).await })
            .await
    }

    /// List recently registered users.
    pub async fn new_users(&self) -> Result<UserListResponse> {
        self.client.get("analytics/new/users").await
    }

    /// Update the authenticated user's account details.
    pub async fn update_info(&self, request: &UpdateUserInfoRequest) -> Result<Ack> {
        self.client.post("user/update-info", request).await
    }

    /// Delete the authenticated user's account.
    pub async fn delete_account(&self, request: &DeleteAccountRequest) -> Result<Ack> {
        self.client.post("user/delete-account", request).await
    }

    /// Replace the authenticated user's profile picture.
    pub async fn update_profile_picture(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse> {
        self.client
            .post_image("user/profile-image", file_name, bytes)
            .await
    }

    /// Follow a user.
    pub async fn follow(&self, user_id: &str) -> Result<Ack> {
        self.client
            .post("user/follow", &json!({ "userIdToFollow": user_id }))
            .await
    }

    /// Get a page of the authenticated user's home feed.
    ///
    /// The feed is volatile, so it bypasses the cache.
    pub async fn home_feed(&self, page: u32) -> Result<PostListResponse> {
        self.client.get(&format!("user/feed/{page}")).await
    }

    /// List the users a user follows, cached under the default TTL.
    pub async fn following(&self, user_id: &str) -> Result<UserListResponse> {
        let key = format!("following_{user_id}");
        let client = self.client.clone();
        let path = format!("user/following/{user_id}");
        self.client
            .cached_request(&key, None, || async move { client.get(&path).await })
            .await
    }

    /// List a user's followers, cached under the default TTL.
    pub async fn followers(&self, user_id: &str) -> Result<UserListResponse> {
        let key = format!("followers_{user_id}");
        let client = self.client.clone();
        let path = format!("user/followers/{user_id}");
        self.client
            .cached_request(&key, None, || async move { client.get(&path).await })
            .await
    }
}
