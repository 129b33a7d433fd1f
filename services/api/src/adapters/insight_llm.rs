//! services/api/src/adapters/insight_llm.rs
//!
//! This module contains the adapter for the insight chat LLM.
//! It implements the `InsightService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        responses::{CreateResponseArgs, Tool, WebSearchTool},
        chat::{
            ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
            CreateChatCompletionRequestArgs,
        },
    },
    Client,
};
use async_trait::async_trait;
use fleet_core::ports::{
    InsightMode, InsightReply, InsightRequest, InsightService, PortError, PortResult, Source,
};
use regex::Regex;
use tracing::info;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `InsightService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiInsightAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    think_model: String,
}

impl OpenAiInsightAdapter {
    /// Creates a new `OpenAiInsightAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, think_model: String) -> Self {
        Self {
            client,
            model,
            think_model,
        }
    }

    /// Plain chat completion against `model`.
    async fn complete(&self, model: &str, request: &InsightRequest) -> PortResult<InsightReply> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(request.system_instruction.clone())
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.prompt.clone())
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(InsightReply {
            text,
            sources: Vec::new(),
        })
    }

    /// Web-grounded answer through the Responses API.
    async fn search(&self, request: &InsightRequest) -> PortResult<InsightReply> {
        let search_request = CreateResponseArgs::default()
            .model(&self.model)
            .instructions(request.system_instruction.clone())
            .input(request.prompt.clone())
            .tools(vec![Tool::WebSearch(WebSearchTool::default())])
            .max_output_tokens(1000u32)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .responses()
            .create(search_request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let raw = response.output_text().unwrap_or_default();
        let (text, sources) = split_citations(&raw)?;
        info!("Search answer carried {} citation(s).", sources.len());
        Ok(InsightReply { text, sources })
    }
}

/// Pulls markdown link citations out of `text`.
///
/// Both `([title](uri))` and bare `[title](uri)` forms are removed from the
/// text and returned as sources, de-duplicated by uri in order of appearance.
pub fn split_citations(text: &str) -> PortResult<(String, Vec<Source>)> {
    let citation = Regex::new(r"\(?\[([^\]]+)\]\((https?://[^)\s]+)\)\)?")
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
    let spaces = Regex::new(r"[ \t]{2,}").map_err(|e| PortError::Unexpected(e.to_string()))?;

    let mut sources: Vec<Source> = Vec::new();
    for caps in citation.captures_iter(text) {
        let uri = caps[2].to_string();
        if sources.iter().any(|s| s.uri == uri) {
            continue;
        }
        let title = caps[1].trim();
        sources.push(Source {
            title: if title.is_empty() { uri.clone() } else { title.to_string() },
            uri,
        });
    }

    let stripped = citation.replace_all(text, "");
    let cleaned = stripped
        .lines()
        .map(|line| spaces.replace_all(line, " ").trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
        .replace(" .", ".")
        .trim()
        .to_string();

    Ok((cleaned, sources))
}

//=========================================================================================
// `InsightService` Trait Implementation
//=========================================================================================

#[async_trait]
impl InsightService for OpenAiInsightAdapter {
    async fn ask(&self, request: InsightRequest) -> PortResult<InsightReply> {
        match request.mode {
            InsightMode::Standard => self.complete(&self.model, &request).await,
            InsightMode::Think => self.complete(&self.think_model, &request).await,
            InsightMode::Search => self.search(&request).await,
        }
    }
}

/// Stands in for the LLM when no API key is configured; every call fails, so
/// the chat records its fallback reply.
#[derive(Clone, Default)]
pub struct DisabledInsightAdapter;

#[async_trait]
impl InsightService for DisabledInsightAdapter {
    async fn ask(&self, _request: InsightRequest) -> PortResult<InsightReply> {
        Err(PortError::Unexpected(
            "No insight provider is configured".to_string(),
        ))
    }
}
