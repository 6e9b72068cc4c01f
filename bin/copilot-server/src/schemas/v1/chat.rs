//! Chat API request / response types.
//!
//! The wire shape matches what the marketing-site widget sends: camelCase
//! field names, an ordered `messages` list and an optional stakeholder
//! section label.

use copilot_core::{ChatTurn, StakeholderSection};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /v1/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Conversation history, oldest first.  Append-only from the client's
    /// perspective; the server never reorders or deduplicates.  An absent
    /// list deserializes as empty and is rejected by the handler.
    #[serde(default)]
    pub messages: Vec<ChatTurn>,
    /// Which stakeholder landing page the visitor is on, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub current_section: Option<StakeholderSection>,
    /// When `true` (the default, matching the site widget), the reply is
    /// streamed as incremental plain text.
    #[serde(default = "default_stream")]
    pub stream: bool,
}

fn default_stream() -> bool {
    true
}

/// Non-streaming success body: the assistant's whole reply.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatReply {
    pub message: String,
}
