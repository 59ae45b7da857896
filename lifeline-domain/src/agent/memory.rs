use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::llm::{ChatMessage, Role};

/// Per-user conversation history held in process memory
///
/// Each user's history is capped at `max_messages`, rounded down to whole
/// user/model exchanges; the oldest exchanges are dropped first, so a stored
/// history always opens with a user message. Nothing survives a restart.
#[derive(Debug)]
pub struct ConversationMemory {
    conversations: RwLock<HashMap<i64, Vec<ChatMessage>>>,
    max_messages: usize,
}

impl ConversationMemory {
    pub fn new(max_messages: usize) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            max_messages: (max_messages - max_messages % 2).max(2),
        }
    }

    /// Copy of the user's history, oldest first
    pub async fn history(&self, user_id: i64) -> Vec<ChatMessage> {
        self.conversations
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Append messages and return the number now held for the user
    pub async fn append(&self, user_id: i64, messages: Vec<ChatMessage>) -> usize {
        let mut conversations = self.conversations.write().await;
        let history = conversations.entry(user_id).or_default();
        history.extend(messages);
        if history.len() > self.max_messages {
            let excess = history.len() - self.max_messages;
            history.drain(..excess);
        }
        let stray = history.iter().take_while(|m| m.role != Role::User).count();
        history.drain(..stray);
        history.len()
    }

    /// Forget the user's history; `true` if there was any
    pub async fn clear(&self, user_id: i64) -> bool {
        self.conversations.write().await.remove(&user_id).is_some()
    }

    pub async fn len(&self, user_id: i64) -> usize {
        self.conversations
            .read()
            .await
            .get(&user_id)
            .map(Vec::len)
            .unwrap_or(0)
    }
}
