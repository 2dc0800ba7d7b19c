//! Conversations and messaging API.
//!
//! Covers conversation lifecycle plus the REST side of chat: sending
//! messages, signalling typing, and reading threads. Incoming messages and
//! typing events arrive on the realtime channel instead.

use serde_json::json;

use crate::client::PosterClient;
use crate::error::Result;
use crate::types::{
    Ack, ConversationListResponse, SendMessageResponse, StartConversationResponse, ThreadResponse,
};

/// Conversations API client.
pub struct ConversationsApi {
    client: PosterClient,
}

impl ConversationsApi {
    pub(crate) fn new(client: PosterClient) -> Self {
        Self { client }
    }

    /// Start a conversation with the given participants.
    ///
    /// `participants` holds the other members' user ids; the authenticated
    /// user is included implicitly.
    pub async fn create(&self, participants: &[String]) -> Result<StartConversationResponse> {
        self.client
            .post("conversation/create", &json!({ "participants": participants }))
            .await
    }

    /// Delete a conversation by id.
    pub async fn delete(&self, conversation_id: &str) -> Result<Ack> {
        self.client
            .delete(&format!("conversation/delete/{conversation_id}"))
            .await
    }

    /// List all conversations the authenticated user participates in.
    pub async fn all(&self) -> Result<ConversationListResponse> {
        self.client.get("conversation/all").await
    }

    /// Send a message to a conversation.
    pub async fn send_message(
        &self,
        conversation_id: &str,
        content: &str,
    ) -> Result<SendMessageResponse> {
        self.client
            .post(
                "message/send",
                &json!({ "conversationId": conversation_id, "content": content }),
            )
            .await
    }

    /// Signal that the authenticated user is typing in a conversation.
    pub async fn typing(&self, conversation_id: &str) -> Result<Ack> {
        self.client
            .post("message/typing", &json!({ "conversationId": conversation_id }))
            .await
    }

    /// Get the message thread for a conversation.
    pub async fn thread(&self, conversation_id: &str) -> Result<ThreadResponse> {
        self.client
            .get(&format!("message/thread/{conversation_id}"))
            .await
    }
}
