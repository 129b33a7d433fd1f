//! crates/fleet_core/src/chat.rs
//!
//! The insight chat: a running conversation with the external AI
//! collaborator, scoped to the signed-in user.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::domain::{User, UserRole};
use crate::ports::{
    InsightMode, InsightReply, InsightRequest, InsightService, PortResult, Source,
};

pub const FALLBACK_REPLY: &str = "Neural bridge disrupted.";
pub const EMPTY_REPLY: &str = "Diagnostic failed. Please repeat query.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_thinking: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
}

impl ChatMessage {
    fn new(role: ChatRole, text: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            text,
            timestamp: Utc::now(),
            is_thinking: false,
            sources: Vec::new(),
        }
    }
}

/// Builds the standing instruction sent with every prompt.
pub fn system_instruction(user: &User) -> String {
    let role = match user.role {
        UserRole::Admin => "ADMIN",
        UserRole::Operator => "OPERATOR",
        UserRole::Customer => "CUSTOMER",
    };
    format!(
        "You are the InfraPulse 360 Strategic Advisor for a construction logistics fleet.\n\
         You are speaking with {} (role: {}).\n\
         Provide data-driven insights on:\n\
         - Predictive delay detection (traffic and weather).\n\
         - Vehicle assignment for pending bookings.\n\
         - Site productivity analysis.\n\
         - Cost leakage detection.\n\
         Tone: professional, analytical, decisive.",
        user.full_name, role
    )
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatSession {
    #[serde(skip)]
    id: String,
    system_instruction: String,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(user: &User) -> Self {
        let welcome = format!(
            "Tactical Interface Initialized. Hello, {}. I am InfraPulse 360's operational core. \
             How can I optimize our logistics today?",
            user.full_name
        );
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            system_instruction: system_instruction(user),
            messages: vec![ChatMessage::new(ChatRole::Model, welcome)],
        }
    }

    /// Identifies this conversation across a reset.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Records the user's side of an exchange and returns the request to send.
    /// Blank prompts are ignored.
    pub fn begin(&mut self, prompt: &str, mode: InsightMode) -> Option<InsightRequest> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return None;
        }
        self.messages
            .push(ChatMessage::new(ChatRole::User, prompt.to_string()));
        Some(InsightRequest {
            prompt: prompt.to_string(),
            mode,
            system_instruction: self.system_instruction.clone(),
        })
    }

    /// Turns the collaborator's answer into the model message. A failed call
    /// is not retried: the fallback reply is used instead.
    pub fn reply(mode: InsightMode, answer: PortResult<InsightReply>) -> ChatMessage {
        match answer {
            Ok(reply) => {
                info!(?mode, sources = reply.sources.len(), "Insight received.");
                let text = if reply.text.trim().is_empty() {
                    EMPTY_REPLY.to_string()
                } else {
                    reply.text
                };
                let mut message = ChatMessage::new(ChatRole::Model, text);
                message.is_thinking = mode == InsightMode::Think;
                message.sources = reply.sources;
                message
            }
            Err(e) => {
                error!("Insight request failed: {}", e);
                ChatMessage::new(ChatRole::Model, FALLBACK_REPLY.to_string())
            }
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Sends one prompt and appends both sides of the exchange.
    ///
    /// Returns the model's message, or `None` when the prompt is blank.
    pub async fn send(
        &mut self,
        insight: &dyn InsightService,
        prompt: &str,
        mode: InsightMode,
    ) -> Option<&ChatMessage> {
        let request = self.begin(prompt, mode)?;
        let answer = insight.ask(request).await;
        self.push(Self::reply(mode, answer));
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PortError;
    use crate::seed;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedInsight {
        reply: PortResult<InsightReply>,
        seen: Mutex<Vec<InsightRequest>>,
    }

    impl ScriptedInsight {
        fn answering(text: &str, sources: Vec<Source>) -> Self {
            Self {
                reply: Ok(InsightReply {
                    text: text.to_string(),
                    sources,
                }),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(PortError::Unexpected("connection reset".to_string())),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl InsightService for ScriptedInsight {
        async fn ask(&self, request: InsightRequest) -> PortResult<InsightReply> {
            self.seen.lock().unwrap().push(request);
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(e) => Err(PortError::Unexpected(e.to_string())),
            }
        }
    }

    fn admin() -> User {
        seed::users().remove(0)
    }

    #[tokio::test]
    async fn session_opens_with_a_welcome() {
        let session = ChatSession::new(&admin());
        assert_eq!(session.messages().len(), 1);
        assert!(session.messages()[0].text.contains("System Administrator"));
    }

    #[tokio::test]
    async fn reply_carries_sources_and_instruction_names_role() {
        let insight = ScriptedInsight::answering(
            "Diesel prices are up 3%.",
            vec![Source {
                title: "Fuel Report".to_string(),
                uri: "https://example.com/fuel".to_string(),
            }],
        );
        let mut session = ChatSession::new(&admin());

        let reply = session
            .send(&insight, "fuel outlook?", InsightMode::Search)
            .await
            .unwrap()
            .clone();

        assert_eq!(reply.role, ChatRole::Model);
        assert_eq!(reply.sources.len(), 1);
        assert_eq!(session.messages().len(), 3);

        let seen = insight.seen.lock().unwrap();
        assert_eq!(seen[0].mode, InsightMode::Search);
        assert!(seen[0].system_instruction.contains("ADMIN"));
    }

    #[tokio::test]
    async fn failure_becomes_fallback_message() {
        let insight = ScriptedInsight::failing();
        let mut session = ChatSession::new(&admin());

        let reply = session
            .send(&insight, "status?", InsightMode::Standard)
            .await
            .unwrap();
        assert_eq!(reply.text, FALLBACK_REPLY);
        assert_eq!(insight.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_prompt_is_ignored() {
        let insight = ScriptedInsight::answering("unused", Vec::new());
        let mut session = ChatSession::new(&admin());

        assert!(session.send(&insight, "   ", InsightMode::Think).await.is_none());
        assert_eq!(session.messages().len(), 1);
        assert!(insight.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_answer_is_replaced() {
        let insight = ScriptedInsight::answering("  ", Vec::new());
        let mut session = ChatSession::new(&admin());

        let reply = session
            .send(&insight, "anything", InsightMode::Think)
            .await
            .unwrap();
        assert_eq!(reply.text, EMPTY_REPLY);
        assert!(reply.is_thinking);
    }
}
