//! The movie assistant.
//!
//! Each question is sent as exactly two turns: a fixed system instruction and
//! the user's prompt. The reply arrives as a stream of fragments which are
//! handed to the caller as they come and folded into the final reply.

use futures::StreamExt;

use crate::{
    chat::{ChatMessage, ChatStream},
    error::FinderError,
    LLMProvider,
};

/// System instruction sent with every question.
pub const SYSTEM_PROMPT: &str = "You are a helpful AI movie assistant.";

/// Sampling temperature used unless configured otherwise.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Warning shown for blank prompts.
pub const BLANK_PROMPT_WARNING: &str = "Please enter a question.";

pub struct Assistant {
    provider: Box<dyn LLMProvider>,
    system_prompt: String,
}

impl Assistant {
    pub fn new(provider: Box<dyn LLMProvider>) -> Self {
        Self {
            provider,
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    /// Replaces the fixed system instruction.
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Rejects blank or whitespace-only prompts.
    pub fn validate(prompt: &str) -> Result<&str, FinderError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(FinderError::InvalidRequest(BLANK_PROMPT_WARNING.to_string()));
        }
        Ok(prompt)
    }

    /// The conversation sent for `prompt`: system instruction, then the user turn.
    pub fn messages(&self, prompt: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system().content(&self.system_prompt).build(),
            ChatMessage::user().content(prompt).build(),
        ]
    }

    /// Opens the reply stream. Blank prompts fail before any request is made.
    pub async fn stream(&self, prompt: &str) -> Result<ChatStream, FinderError> {
        let prompt = Self::validate(prompt)?;
        self.provider.chat_stream(&self.messages(prompt)).await
    }

    /// Asks `prompt`, calling `on_fragment` with each fragment as it arrives.
    ///
    /// Returns the accumulated reply. The first failing fragment aborts the
    /// whole answer; fragments already shown are not returned.
    pub async fn ask<F>(&self, prompt: &str, mut on_fragment: F) -> Result<String, FinderError>
    where
        F: FnMut(&str),
    {
        let mut stream = self.stream(prompt).await.map_err(|e| {
            if !e.is_validation() {
                log::warn!("chat request failed: {e}");
            }
            e
        })?;

        let mut reply = String::new();
        while let Some(fragment) = stream.next().await {
            let fragment = fragment.map_err(|e| {
                log::warn!("chat stream aborted after {} bytes: {e}", reply.len());
                e
            })?;
            reply.push_str(&fragment);
            on_fragment(&fragment);
        }

        log::debug!("assistant reply complete, {} bytes", reply.len());
        Ok(reply)
    }
}
