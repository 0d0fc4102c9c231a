//! Groq API client implementation for chat and speech.
//!
//! This module provides integration with Groq's hosted models through their
//! OpenAI-compatible API. It is the default chat backend.

use crate::{
    providers::openai_compatible::{OpenAICompatibleConfig, OpenAICompatibleProvider},
    LLMProvider,
};

/// Groq configuration for the generic provider
pub struct GroqConfig;

impl OpenAICompatibleConfig for GroqConfig {
    const PROVIDER_NAME: &'static str = "Groq";
    const DEFAULT_BASE_URL: &'static str = "https://api.groq.com/openai/v1/";
    const DEFAULT_MODEL: &'static str = "llama-3.3-70b-versatile";
    const DEFAULT_SPEECH_MODEL: &'static str = "playai-tts";
    const DEFAULT_VOICE: &'static str = "Fritz-PlayAI";
    const SPEECH_FORMAT: &'static str = "wav";
}

pub type Groq = OpenAICompatibleProvider<GroqConfig>;

impl LLMProvider for Groq {}

#[cfg(test)]
const LLM_API_KEY_ENV: &str = "GROQ_API_KEY";

#[tokio::test]
async fn test_groq_chat_stream() -> Result<(), Box<dyn std::error::Error>> {
    use crate::{
        builder::{LLMBackend, LLMBuilder},
        chat::ChatMessage,
    };
    use futures::StreamExt;

    let api_key = match std::env::var(LLM_API_KEY_ENV) {
        Ok(key) => key,
        Err(_) => {
            eprintln!("test test_groq_chat_stream ... ignored, {LLM_API_KEY_ENV} not set");
            return Ok(());
        }
    };
    let llm = LLMBuilder::new()
        .backend(LLMBackend::Groq)
        .api_key(api_key)
        .max_tokens(128)
        .temperature(0.7)
        .build()?;

    let messages = vec![
        ChatMessage::system().content("You are a helpful AI movie assistant.").build(),
        ChatMessage::user().content("Name one movie released in 2010.").build(),
    ];
    let mut stream = llm.chat_stream(&messages).await?;
    let mut complete_text = String::new();
    while let Some(fragment) = stream.next().await {
        complete_text.push_str(&fragment?);
    }
    assert!(
        !complete_text.is_empty(),
        "Expected response message, got empty text"
    );
    Ok(())
}

#[tokio::test]
async fn test_groq_bad_key_is_auth_error() -> Result<(), Box<dyn std::error::Error>> {
    use crate::{
        builder::{LLMBackend, LLMBuilder},
        chat::ChatMessage,
        error::FinderError,
    };

    if std::env::var(LLM_API_KEY_ENV).is_err() {
        eprintln!("test test_groq_bad_key_is_auth_error ... ignored, {LLM_API_KEY_ENV} not set");
        return Ok(());
    }
    let llm = LLMBuilder::new()
        .backend(LLMBackend::Groq)
        .api_key("gsk_invalid")
        .build()?;
    let messages = vec![ChatMessage::user().content("Hello.").build()];
    match llm.chat_stream(&messages).await {
        Err(FinderError::AuthError(_)) => Ok(()),
        Err(e) => panic!("expected an auth error, got {e}"),
        Ok(_) => panic!("expected an auth error, got a stream"),
    }
}
