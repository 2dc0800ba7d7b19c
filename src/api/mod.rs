//! Endpoint groups of the Poster API.
//!
//! Each group maps its public methods 1:1 onto remote endpoints: serialize a
//! small parameter object or interpolate an identifier into the path, send,
//! and unwrap the response envelope. Read-mostly lookups keyed by a stable
//! identifier (profiles, follower lists) route through the client's cache;
//! mutations and volatile reads go straight to the transport.

mod comments;
mod conversations;
mod notifications;
mod posts;
mod reports;
mod spotify;
mod uploads;
mod users;

pub use comments::CommentsApi;
pub use conversations::ConversationsApi;
pub use notifications::NotificationsApi;
pub use posts::PostsApi;
pub use reports::ReportsApi;
pub use spotify::SpotifyApi;
pub use uploads::UploadsApi;
pub use users::UsersApi;
