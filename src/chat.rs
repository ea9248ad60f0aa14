//! Client-side chat state: the message list and in-flight request count.
//!
//! Messages are only ever appended. A submitted question is shown at once;
//! its answer is appended whenever its request resolves, so overlapping
//! requests may answer out of submission order. A failed request leaves the
//! list unchanged.

use serde::{Deserialize, Serialize};

use crate::rag::HistoryMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Handle for one in-flight question; consumed by `ChatState::resolve`.
#[derive(Debug, PartialEq, Eq)]
pub struct RequestTicket {
    id: u64,
    pub question: String,
    pub history: Vec<HistoryMessage>,
}

impl RequestTicket {
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Default)]
pub struct ChatState {
    messages: Vec<Message>,
    pending: usize,
    next_id: u64,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Appends the user's message and opens a request for it.
    ///
    /// Blank input is ignored. The ticket carries the history as it stood
    /// before this question.
    pub fn submit(&mut self, text: &str) -> Option<RequestTicket> {
        if text.trim().is_empty() {
            return None;
        }

        let history = self.history_payload();
        self.messages.push(Message {
            role: Role::User,
            content: text.to_string(),
        });
        self.pending += 1;
        self.next_id += 1;

        Some(RequestTicket {
            id: self.next_id,
            question: text.to_string(),
            history,
        })
    }

    /// Closes a request, appending the answer on success.
    pub fn resolve<E>(&mut self, ticket: RequestTicket, outcome: Result<String, E>)
    where
        E: std::fmt::Display,
    {
        self.pending = self.pending.saturating_sub(1);
        match outcome {
            Ok(answer) => self.messages.push(Message {
                role: Role::Assistant,
                content: answer,
            }),
            Err(err) => {
                tracing::warn!("Request {} failed: {}", ticket.id, err);
            }
        }
    }

    /// The conversation so far, shaped for `chatHistory`.
    pub fn history_payload(&self) -> Vec<HistoryMessage> {
        self.messages
            .iter()
            .map(|m| HistoryMessage::new(m.role.as_str(), m.content.clone()))
            .collect()
    }
}
