pub mod providers;

use std::sync::Arc;
use tracing::info;

use crate::config::ChatConfig;
use crate::error::{Error, Result};
use crate::memory::{ConversationMemory, normalize_user_id};
use crate::types::Turn;
use providers::CompletionProvider;

/// Number of remembered turns included ahead of the new message.
pub const HISTORY_TURNS: usize = 8;

pub const SYSTEM_PROMPT: &str = "You are FLEXIBLE AI — a helpful assistant created by Akin Saye Sokpah. Be concise, helpful, and safe.";

/// Answer for questions about who built the assistant.
pub const CREATOR_REPLY: &str = "I was created by Akin Saye Sokpah. Email: sokpahakinsaye81@gmail.com. Facebook: https://www.facebook.com/profile.php?id=61583456361691. He studies at Smythe University College, Sinkor, Liberia.";

/// Phrases that route a message to [`CREATOR_REPLY`]. Matched against the
/// lower-cased message.
pub const CREATOR_TRIGGERS: [&str; 3] = ["who created you", "your creator", "who made you"];

pub const FALLBACK_REPLY: &str = "Sorry, I could not generate a response.";

pub const MISSING_KEY_MESSAGE: &str = "OPENAI_API_KEY not set in environment";

/// Whether a message asks about the assistant's creator.
pub fn asks_about_creator(message: &str) -> bool {
    let lower = message.to_lowercase();
    CREATOR_TRIGGERS.iter().any(|phrase| lower.contains(phrase))
}

/// Assemble the messages sent upstream: system instruction, remembered
/// history, then the new user message.
pub fn build_prompt(system: &str, history: Vec<Turn>, message: &str) -> Vec<Turn> {
    let mut prompt = Vec::with_capacity(history.len() + 2);
    prompt.push(Turn::system(system));
    prompt.extend(history);
    prompt.push(Turn::user(message));
    prompt
}

/// Relays chat messages to the completion API and keeps short-term memory
/// of each user's conversation.
pub struct CompletionRelay {
    memory: Arc<dyn ConversationMemory>,
    provider: Option<Arc<dyn CompletionProvider>>,
}

impl CompletionRelay {
    /// `provider` is `None` when no API credential is configured; chat
    /// requests that need the API then fail with a configuration error.
    pub fn new(
        memory: Arc<dyn ConversationMemory>,
        provider: Option<Arc<dyn CompletionProvider>>,
    ) -> Self {
        Self { memory, provider }
    }

    pub fn from_config(config: &ChatConfig, memory: Arc<dyn ConversationMemory>) -> Self {
        let provider = match providers::from_config(config) {
            Some(p) => {
                info!(model = p.model(), "completion provider configured");
                Some(Arc::new(p) as Arc<dyn CompletionProvider>)
            }
            None => {
                info!("no API key configured, chat will only answer canned questions");
                None
            }
        };
        Self::new(memory, provider)
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Produce a reply for `message` from `user_id`.
    ///
    /// On success exactly one assistant turn is recorded. The user turn is
    /// recorded only when the completion API answered, after the prompt
    /// snapshot was taken.
    pub async fn complete(&self, user_id: Option<&str>, message: &str) -> Result<String> {
        if message.is_empty() {
            return Err(Error::validation("No message"));
        }
        let user_id = normalize_user_id(user_id);

        // The canned answer does not remember the question.
        if asks_about_creator(message) {
            info!(user = %user_id, "answering creator question");
            self.memory
                .record(user_id, Turn::assistant(CREATOR_REPLY))
                .await;
            return Ok(CREATOR_REPLY.to_string());
        }

        let history = self.memory.recent_turns(user_id, HISTORY_TURNS).await;
        let prompt = build_prompt(SYSTEM_PROMPT, history, message);

        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| Error::Configuration(MISSING_KEY_MESSAGE.to_string()))?;

        let reply = provider
            .complete(&prompt)
            .await?
            .unwrap_or_else(|| FALLBACK_REPLY.to_string());

        self.memory.record(user_id, Turn::user(message)).await;
        self.memory
            .record(user_id, Turn::assistant(reply.clone()))
            .await;

        info!(user = %user_id, history = prompt.len() - 2, "relayed chat message");
        Ok(reply)
    }
}
