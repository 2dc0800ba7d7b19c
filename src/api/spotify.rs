//! Spotify integration API.
//!
//! Payloads here are defined by Spotify and passed through as raw JSON
//! rather than being re-modelled on the client.

use serde_json::Value;

use crate::client::PosterClient;
use crate::error::Result;
use crate::types::Ack;

/// Spotify API client.
pub struct SpotifyApi {
    client: PosterClient,
}

impl SpotifyApi {
    pub(crate) fn new(client: PosterClient) -> Self {
        Self { client }
    }

    /// Begin linking the authenticated user's Spotify account.
    pub async fn link(&self) -> Result<Value> {
        self.client.get("spotify/auth").await
    }

    /// Unlink the authenticated user's Spotify account.
    pub async fn unlink(&self) -> Result<Ack> {
        self.client.get("spotify/unlink").await
    }

    /// Top artists for a user, or for the authenticated user when `user_id`
    /// is `None`.
    pub async fn top_artists(&self, user_id: Option<&str>) -> Result<Value> {
        self.client.get(&suffixed("spotify/top/artists", user_id)).await
    }

    /// Top tracks for a user, or for the authenticated user when `user_id`
    /// is `None`.
    pub async fn top_tracks(&self, user_id: Option<&str>) -> Result<Value> {
        self.client.get(&suffixed("spotify/top/tracks", user_id)).await
    }

    /// The track a user is currently playing, or the authenticated user's
    /// when `user_id` is `None`.
    pub async fn currently_playing(&self, user_id: Option<&str>) -> Result<Value> {
        self.client.get(&suffixed("spotify/playing", user_id)).await
    }
}

/// Append an optional user id segment to a path.
fn suffixed(path: &str, user_id: Option<&str>) -> String {
    match user_id {
        Some(id) => format!("{path}/{id}"),
        None => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffixed_with_user_id() {
        assert_eq!(
            suffixed("spotify/top/artists", Some("u7")),
            "spotify/top/artists/u7"
        );
    }

    #[test]
    fn test_suffixed_without_user_id() {
        assert_eq!(suffixed("spotify/playing", None), "spotify/playing");
    }
}
