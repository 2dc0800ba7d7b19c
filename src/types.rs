//! Request and response types shared across the API surface.
//!
//! The Poster API wraps payloads in a thin envelope carrying a human
//! readable `message`; response types here mirror that envelope. Fields the
//! server omits on some deployments are optional or defaulted so older
//! backends keep deserializing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Generic acknowledgement returned by mutating endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    /// Human-readable status message.
    pub message: String,
}

/// A Poster user as returned in envelopes and lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier.
    pub id: String,
    /// Unique handle.
    pub username: String,
    /// Email, present only on self-lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Profile biography.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Profile image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    /// Follower count, when the endpoint includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers_count: Option<u64>,
    /// Following count, when the endpoint includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following_count: Option<u64>,
}

/// Registration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Response to a successful registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: User,
}

/// Login parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

/// Response to a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: Option<String>,
    /// Bearer token for subsequent requests.
    pub token: String,
}

/// Password reset parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

/// Response to the authenticated self-lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub user: User,
}

/// A profile lookup envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub user: User,
}

/// Account detail update parameters. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInfoRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_username: Option<String>,
}

/// Account deletion parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountRequest {
    pub user_id: String,
    pub username_or_email: String,
    pub password: String,
}

/// A list of users (followers, following, analytics).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub users: Vec<User>,
}

/// A post on the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    /// Author user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Post creation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Response to a post creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostResponse {
    pub message: String,
    pub post_id: String,
}

/// A single-post envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub post: Post,
}

/// A list of posts (feed, author lookups, search).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub posts: Vec<Post>,
}

/// A comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Comment creation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    pub post_id: String,
    pub content: String,
}

/// Response to a comment creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentResponse {
    pub message: String,
    pub comment_id: String,
}

/// A single-comment envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub comment: Comment,
}

/// A list of comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentListResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// A conversation between two or more users.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<ChatMessage>,
}

/// Response to starting a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartConversationResponse {
    pub message: String,
    pub conversation_id: String,
}

/// A list of conversations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationListResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub conversations: Vec<Conversation>,
}

/// A chat message within a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Response to sending a chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

/// A message thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// A notification addressed to the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    /// Notification kind as reported by the server (like, follow, comment).
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub read: bool,
    /// Kind-specific payload, passed through unmodified.
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A page of notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationListResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

/// Response to an image upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    /// URL of the stored image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Report creation parameters. Exactly one target should be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    pub reason: String,
}

/// A list of reports. Report payloads are deployment-defined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportListResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub reports: Vec<Value>,
}
