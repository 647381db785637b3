//! Append-only conversation history for one chat session

use crate::error::{ConversationError, Result};
use crate::llm::LlmMessage;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Ordered message history. Messages are never edited or removed.
#[derive(Debug, Clone)]
pub struct Conversation {
    id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    messages: Vec<LlmMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn messages(&self) -> &[LlmMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a message.
    ///
    /// Tool messages must answer a call of the closest preceding assistant
    /// message, with only tool messages in between, and each call is answered
    /// at most once.
    pub fn push(&mut self, message: LlmMessage) -> Result<()> {
        if let LlmMessage::Tool { tool_call_id, .. } = &message {
            check_tool_reply(&self.messages, tool_call_id)?;
        }
        self.messages.push(message);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Append a user message
    pub fn push_user<S: Into<String>>(&mut self, content: S) {
        self.messages.push(LlmMessage::user(content));
        self.updated_at = Utc::now();
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

fn check_tool_reply(history: &[LlmMessage], tool_call_id: &str) -> Result<()> {
    let mut answered = Vec::new();
    for message in history.iter().rev() {
        match message {
            LlmMessage::Tool {
                tool_call_id: id, ..
            } => answered.push(id.as_str()),
            LlmMessage::Assistant { tool_calls, .. } => {
                if !tool_calls.iter().any(|call| call.id == tool_call_id) {
                    break;
                }
                if answered.contains(&tool_call_id) {
                    return Err(ConversationError::DuplicateToolResult {
                        tool_call_id: tool_call_id.to_string(),
                    }
                    .into());
                }
                return Ok(());
            }
            _ => break,
        }
    }

    Err(ConversationError::OrphanToolMessage {
        tool_call_id: tool_call_id.to_string(),
    }
    .into())
}

/// True when every tool message in `messages` answers a call of the closest
/// preceding assistant message exactly once
pub fn is_well_formed(messages: &[LlmMessage]) -> bool {
    messages.iter().enumerate().all(|(i, message)| match message {
        LlmMessage::Tool { tool_call_id, .. } => {
            check_tool_reply(&messages[..i], tool_call_id).is_ok()
        }
        _ => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::tools::ToolCall;
    use serde_json::json;

    fn call(id: &str) -> ToolCall {
        ToolCall::with_id(id, "search_papers", json!({"topic": "rust"}))
    }

    #[test]
    fn test_new_conversation() {
        let conversation = Conversation::new();
        assert!(conversation.is_empty());
        assert!(!conversation.id().is_empty());
        assert!(conversation.updated_at() >= conversation.created_at());
    }

    #[test]
    fn test_tool_reply_accepted() {
        let mut conversation = Conversation::new();
        conversation.push_user("find papers");
        conversation
            .push(LlmMessage::assistant_with_tools(None, vec![call("a"), call("b")]))
            .unwrap();
        conversation.push(LlmMessage::tool("a", "1")).unwrap();
        conversation.push(LlmMessage::tool("b", "2")).unwrap();
        conversation.push(LlmMessage::assistant("done")).unwrap();

        assert_eq!(conversation.len(), 5);
        assert!(is_well_formed(conversation.messages()));
    }

    #[test]
    fn test_orphan_tool_message_rejected() {
        let mut conversation = Conversation::new();
        conversation.push_user("hello");
        let err = conversation.push(LlmMessage::tool("a", "1")).unwrap_err();
        assert!(matches!(
            err,
            Error::Conversation(ConversationError::OrphanToolMessage { .. })
        ));
        assert_eq!(conversation.len(), 1);
    }

    #[test]
    fn test_unknown_call_id_rejected() {
        let mut conversation = Conversation::new();
        conversation
            .push(LlmMessage::assistant_with_tools(None, vec![call("a")]))
            .unwrap();
        assert!(conversation.push(LlmMessage::tool("zzz", "1")).is_err());
    }

    #[test]
    fn test_duplicate_reply_rejected() {
        let mut conversation = Conversation::new();
        conversation
            .push(LlmMessage::assistant_with_tools(None, vec![call("a")]))
            .unwrap();
        conversation.push(LlmMessage::tool("a", "1")).unwrap();
        let err = conversation.push(LlmMessage::tool("a", "2")).unwrap_err();
        assert!(matches!(
            err,
            Error::Conversation(ConversationError::DuplicateToolResult { .. })
        ));
    }

    #[test]
    fn test_reply_to_older_assistant_rejected() {
        let mut conversation = Conversation::new();
        conversation
            .push(LlmMessage::assistant_with_tools(None, vec![call("a")]))
            .unwrap();
        conversation.push(LlmMessage::tool("a", "1")).unwrap();
        conversation.push(LlmMessage::assistant("ok")).unwrap();
        conversation.push_user("again");
        assert!(conversation.push(LlmMessage::tool("a", "1")).is_err());
    }

    #[test]
    fn test_is_well_formed_detects_gap() {
        let messages = vec![
            LlmMessage::assistant_with_tools(None, vec![call("a")]),
            LlmMessage::user("interrupt"),
            LlmMessage::tool("a", "1"),
        ];
        assert!(!is_well_formed(&messages));
    }
}
