//! Chat request types.
//!
//! These are the JSON bodies POSTed to the streaming chat endpoint.

use serde::{Deserialize, Serialize};

use crate::errors::{RequestError, Result};
use crate::identifier::SessionId;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// End user.
    User,
    /// Model reply.
    Assistant,
}

/// One message in the conversation sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who wrote the message.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a message.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Body of a streaming chat request.
///
/// ```rust
/// use chatstream_core::ChatRequest;
///
/// let request = ChatRequest::user("Hello", "gpt-4o").with_session(12);
/// let json = serde_json::to_value(&request).unwrap();
/// assert_eq!(json["sessionId"], 12);
/// assert_eq!(json["stream"], true);
/// assert_eq!(json["messages"][0]["role"], "user");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Conversation so far.
    pub messages: Vec<ChatMessage>,
    /// Session the request belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    /// Ask the backend for an event stream.
    #[serde(default = "default_stream")]
    pub stream: bool,
    /// Model name selected by the caller.
    pub model: String,
}

fn default_stream() -> bool {
    true
}

impl ChatRequest {
    /// Create a streaming request from a message list.
    pub fn new(messages: Vec<ChatMessage>, model: impl Into<String>) -> Self {
        Self {
            messages,
            session_id: None,
            stream: true,
            model: model.into(),
        }
    }

    /// Create a streaming request carrying a single user message.
    pub fn user(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new(vec![ChatMessage::user(text)], model)
    }

    /// Attach a session id.
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<SessionId>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Append a message.
    #[must_use]
    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Check the request is complete enough to send.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no messages or the model name is blank.
    pub fn validate(&self) -> Result<()> {
        if self.messages.is_empty() {
            return Err(RequestError::NoMessages);
        }
        if self.model.trim().is_empty() {
            return Err(RequestError::EmptyModel);
        }
        Ok(())
    }
}
