//! One stylist conversation. Messages live only as long as the session.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::chips::ChipPicker;
use super::intent::{ParsedIntent, parse_intent};
use super::script::{self, FALLBACK_REPLY};
use crate::api_types::{Product, SurveyRequest, VibeReply, VibeRequest};
use crate::backend::Backend;
use crate::errors::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Append-only conversation, optionally about one product.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    messages: Vec<ChatMessage>,
    product: Option<Product>,
    chips: ChipPicker,
    last_intent: Option<ParsedIntent>,
    quick_questions_visible: bool,
    awaiting_reply: bool,
}

impl ChatSession {
    /// Open a session with the assistant's greeting.
    pub fn new<R: Rng + ?Sized>(product: Option<Product>, rng: &mut R) -> Self {
        let greeting = script::greeting(product.as_ref(), rng);
        Self {
            id: Uuid::new_v4(),
            messages: vec![ChatMessage::assistant(greeting)],
            product,
            chips: ChipPicker::new(),
            last_intent: None,
            quick_questions_visible: true,
            awaiting_reply: false,
        }
    }

    /// Identifies this session so late replies can be matched to it.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn product(&self) -> Option<&Product> {
        self.product.as_ref()
    }

    pub fn last_intent(&self) -> Option<ParsedIntent> {
        self.last_intent
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn chips(&self) -> &ChipPicker {
        &self.chips
    }

    pub fn chips_mut(&mut self) -> &mut ChipPicker {
        &mut self.chips
    }

    /// Quick questions still on offer; empty once one has been asked.
    pub fn quick_questions(&self) -> Vec<String> {
        if self.quick_questions_visible {
            script::quick_questions(self.product.as_ref())
        } else {
            Vec::new()
        }
    }

    /// Ask the quick question at a 1-based `position` and answer it from the script.
    pub fn ask_quick(&mut self, position: usize) -> Result<&ChatMessage, Error> {
        let question = position
            .checked_sub(1)
            .and_then(|i| self.quick_questions().into_iter().nth(i))
            .ok_or_else(|| {
                Error::InvalidInput(format!("quick question {position} is not available"))
            })?;
        self.quick_questions_visible = false;
        Ok(self.ask_scripted(&question))
    }

    /// Answer `question` from the script without calling the backend.
    pub fn ask_scripted(&mut self, question: &str) -> &ChatMessage {
        let reply = script::scripted_reply(question, self.product.as_ref());
        self.messages.push(ChatMessage::user(question));
        self.push_assistant(reply)
    }

    /// Record a free-text question and build the backend request for it.
    pub fn prepare(&mut self, text: &str) -> Result<VibeRequest, Error> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidInput("Message cannot be empty".to_string()));
        }
        let intent = parse_intent(text);
        debug!(?intent, "parsed stylist query");

        self.messages.push(ChatMessage::user(text));
        self.last_intent = Some(intent);
        self.awaiting_reply = true;
        Ok(intent.to_vibe_request(Some(text)))
    }

    /// Append the assistant's answer to the pending question. Failures become the canned reply.
    pub fn resolve(&mut self, reply: Result<VibeReply, Error>) -> &ChatMessage {
        self.awaiting_reply = false;
        let content = match reply {
            Ok(reply) => {
                let detail = if reply.explanation.trim().is_empty() {
                    reply.vibe
                } else {
                    reply.explanation
                };
                format!("Based on your query, here's my recommendation: {detail}")
            }
            Err(e) => {
                warn!(error = %e, "stylist backend unavailable, using fallback reply");
                FALLBACK_REPLY.to_string()
            }
        };
        self.push_assistant(content)
    }

    /// Ask a free-text question and wait for the backend's answer.
    pub async fn send(&mut self, text: &str, backend: &dyn Backend) -> Result<&ChatMessage, Error> {
        let request = self.prepare(text)?;
        let reply = backend.ai_vibe(&request).await;
        Ok(self.resolve(reply))
    }

    /// Survey body for "show me pieces": a completed chip pick, else the last parsed query.
    pub fn recommendation_request(&self) -> Option<SurveyRequest> {
        self.chips
            .to_request()
            .or_else(|| self.last_intent.map(|intent| intent.to_survey_request()))
    }

    fn push_assistant(&mut self, content: String) -> &ChatMessage {
        self.messages.push(ChatMessage::assistant(content));
        &self.messages[self.messages.len() - 1]
    }
}
