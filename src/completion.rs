//! Chat-completion wire types and the per-query request builder.

use serde::{Deserialize, Deserializer, Serialize};

use crate::capabilities::{CapabilityDeclaration, CapabilityRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Whether the model may call a declared capability on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallPolicy {
    Auto,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(rename = "functions")]
    pub capabilities: Vec<CapabilityDeclaration>,
    #[serde(rename = "function_call")]
    pub call_policy: CallPolicy,
}

/// Builds a fresh single-message turn. Nothing carries over between queries.
pub fn build_request(
    model: &str,
    registry: &CapabilityRegistry,
    user_text: &str,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![ChatMessage::user(user_text)],
        capabilities: registry.declarations(),
        call_policy: CallPolicy::Auto,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResponseMessage {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default)]
    pub function_call: Option<CallRequest>,
}

/// A structured call request produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CallRequest {
    #[serde(rename = "name")]
    pub capability_name: String,
    #[serde(rename = "arguments", default)]
    pub arguments_json: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
