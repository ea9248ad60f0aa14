//! Fixed question-answering prompt and chat-history transcript rendering.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::vector::VectorMatch;

/// The prompt sent to the completion model. Placeholders are filled once,
/// left to right, so braces inside user input are never re-expanded.
pub const QUESTION_PROMPT: &str = "Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.
----------
CONTEXT: {context}
----------
CHAT HISTORY: {chatHistory}
----------
QUESTION: {question}
----------
Helpful Answer:";

/// One prior exchange as sent by a client in `chatHistory`.
///
/// Accepts `role` or the UI's `type` field. Either may be absent, and
/// non-string values are rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    #[serde(default, alias = "type", deserialize_with = "text_from_any")]
    pub role: String,
    #[serde(default, deserialize_with = "text_from_any")]
    pub content: String,
}

impl HistoryMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Reads one history entry from arbitrary JSON.
    ///
    /// Objects contribute their `role` (or `type`) and `content`; any other
    /// value is taken as role-less content.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => {
                let role = map.get("role").or_else(|| map.get("type"));
                Self::new(
                    role.map(value_text).unwrap_or_default(),
                    map.get("content").map(value_text).unwrap_or_default(),
                )
            }
            other => Self::new("", value_text(other)),
        }
    }
}

/// Reads a `chatHistory` payload. Anything other than an array is treated
/// as no history.
pub fn history_from_value(value: &Value) -> Option<Vec<HistoryMessage>> {
    value
        .as_array()
        .map(|items| items.iter().map(HistoryMessage::from_value).collect())
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn text_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_text(&value))
}

fn speaker_label(role: &str) -> Option<&'static str> {
    match role.to_ascii_lowercase().as_str() {
        "human" | "user" => Some("Human"),
        "ai" | "assistant" | "llm" => Some("Assistant"),
        _ => None,
    }
}

/// Renders history as a transcript, one line per message in order.
pub fn serialize_chat_history(history: &[HistoryMessage]) -> String {
    history
        .iter()
        .map(|message| match speaker_label(&message.role) {
            Some(label) => format!("{}: {}", label, message.content),
            None => message.content.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Space-joins the text of every match. No de-duplication or truncation;
/// a match without `pageContent` contributes an empty string.
pub fn concatenate_matches(matches: &[VectorMatch]) -> String {
    matches
        .iter()
        .map(|m| m.page_content().unwrap_or_default())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn fill_question_prompt(context: &str, chat_history: &str, question: &str) -> String {
    render_template(
        QUESTION_PROMPT,
        &[
            ("context", context),
            ("chatHistory", chat_history),
            ("question", question),
        ],
    )
}

fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replacement = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match replacement {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
