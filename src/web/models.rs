use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    /// `[{"role": "user", "content": "..."}, ...]`, forwarded to the model as-is.
    pub messages: Vec<Value>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub workshop_code: Option<String>,
}

impl ChatRequest {
    /// Total characters of `content` across object-shaped entries.
    ///
    /// Entries that are not objects contribute nothing. Multi-part content
    /// counts the `text` of each part.
    pub fn content_chars(&self) -> usize {
        self.messages
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|entry| entry.get("content"))
            .map(content_chars)
            .sum()
    }
}

fn content_chars(content: &Value) -> usize {
    match content {
        Value::String(text) => text.chars().count(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .map(|text| text.chars().count())
            .sum(),
        _ => 0,
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
