//! Language-model sessions.
//!
//! The scheduler only depends on the [`LanguageModel`] and [`ChatSession`]
//! traits; [`OpenAiModel`] implements them for any OpenAI-compatible API.

use std::sync::LazyLock;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
    CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::DebateError;

/// One persistent conversation with a model under a fixed persona.
#[async_trait]
pub trait ChatSession: Send {
    /// Send `message` as the next user turn and return the model's reply.
    ///
    /// On error the session history is unchanged, so the session stays
    /// usable. Dropping the returned future abandons the call.
    async fn send(&mut self, message: &str) -> Result<String, DebateError>;
}

/// The provider operations the debate core relies on.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Allocate a new session seeded with `persona` as its system
    /// instruction. Performs no I/O.
    fn create_session(&self, persona: &str) -> Box<dyn ChatSession>;

    /// One-shot generation constrained to the JSON `schema`.
    async fn generate_structured(
        &self,
        prompt: &str,
        schema_name: &str,
        schema: &Value,
    ) -> Result<Value, DebateError>;
}

/// OpenAI-compatible model backend.
#[derive(Clone)]
pub struct OpenAiModel {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAiModel {
    pub fn new(config: &ProviderConfig) -> Result<Self, DebateError> {
        let http_client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| {
                DebateError::ConfigError(format!("Failed to create HTTP client: {}", e))
            })?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(&config.api_base);

        Ok(Self {
            client: Client::with_config(openai_config).with_http_client(http_client),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    fn create_session(&self, persona: &str) -> Box<dyn ChatSession> {
        Box::new(OpenAiSession {
            client: self.client.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            history: vec![ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessage {
                    content: persona.to_string().into(),
                    name: None,
                },
            )],
        })
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        schema_name: &str,
        schema: &Value,
    ) -> Result<Value, DebateError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![user_message(prompt)])
            .response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    description: None,
                    name: schema_name.to_string(),
                    schema: Some(schema.clone()),
                    strict: Some(true),
                },
            })
            .build()?;

        let response = self.client.chat().create(request).await?;
        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| {
                DebateError::MalformedResponse("structured response had no content".to_string())
            })?;

        serde_json::from_str(&content).map_err(|e| {
            DebateError::MalformedResponse(format!("structured response is not JSON: {}", e))
        })
    }
}

struct OpenAiSession {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    /// System persona first, then alternating user/assistant turns.
    history: Vec<ChatCompletionRequestMessage>,
}

#[async_trait]
impl ChatSession for OpenAiSession {
    async fn send(&mut self, message: &str) -> Result<String, DebateError> {
        let user_turn = user_message(message);
        let mut messages = self.history.clone();
        messages.push(user_turn.clone());

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(self.temperature)
            .messages(messages)
            .build()?;

        debug!(model = %self.model, turns = self.history.len(), "sending chat turn");
        let response = self.client.chat().create(request).await?;
        let raw = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        let reply = sanitize_response(&raw);
        if reply.is_empty() {
            return Err(DebateError::Provider(format!(
                "model '{}' returned an empty reply",
                self.model
            )));
        }

        self.history.push(user_turn);
        self.history.push(ChatCompletionRequestMessage::Assistant(
            ChatCompletionRequestAssistantMessage {
                content: Some(reply.clone().into()),
                name: None,
                tool_calls: None,
                refusal: None,
                audio: None,
                function_call: None,
            },
        ));

        Ok(reply)
    }
}

fn user_message(text: &str) -> ChatCompletionRequestMessage {
    ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
        content: text.to_string().into(),
        name: None,
    })
}

/// Reasoning/internal tags whose content never belongs in a debate reply.
const REASONING_TAGS: &[&str] = &[
    "thinking",
    "think",
    "reflection",
    "reflect",
    "internal",
    "reasoning",
    "thought",
    "scratch",
    "scratchpad",
    "plan",
    "analysis",
    "analyze",
    "consider",
    "pondering",
    "deliberation",
];

static REASONING_BLOCKS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    REASONING_TAGS
        .iter()
        .filter_map(|tag| Regex::new(&format!(r"(?is)<{tag}[^>]*>.*?</{tag}>")).ok())
        .collect()
});

static ORPHAN_TAG: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"</?[\w]+[^>]*>").ok());

static WHITESPACE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\s+").ok());

/// Strip reasoning blocks, stray XML-like tags and markdown emphasis from
/// a model reply, collapsing whitespace.
pub fn sanitize_response(response: &str) -> String {
    let mut result = response.to_string();

    for re in REASONING_BLOCKS.iter() {
        result = re.replace_all(&result, "").into_owned();
    }

    if let Some(re) = ORPHAN_TAG.as_ref() {
        result = re.replace_all(&result, "").into_owned();
    }

    result = result.replace('*', "");

    if let Some(re) = WHITESPACE.as_ref() {
        result = re.replace_all(&result, " ").into_owned();
    }

    result.trim().to_string()
}
