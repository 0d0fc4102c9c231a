//! OpenAI API client implementation using the OpenAI-compatible base
//!
//! Usable both as a chat backend and as a speech backend (`tts-1`).

use crate::{
    providers::openai_compatible::{OpenAICompatibleConfig, OpenAICompatibleProvider},
    LLMProvider,
};

/// OpenAI configuration for the generic provider
pub struct OpenAIConfig;

impl OpenAICompatibleConfig for OpenAIConfig {
    const PROVIDER_NAME: &'static str = "OpenAI";
    const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1/";
    const DEFAULT_MODEL: &'static str = "gpt-4.1-nano";
    const DEFAULT_SPEECH_MODEL: &'static str = "tts-1";
    const DEFAULT_VOICE: &'static str = "alloy";
}

/// Type alias for OpenAI client using the generic provider
pub type OpenAI = OpenAICompatibleProvider<OpenAIConfig>;

impl LLMProvider for OpenAI {}

#[cfg(test)]
const LLM_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[tokio::test]
async fn test_openai_speech() -> Result<(), Box<dyn std::error::Error>> {
    use crate::builder::{LLMBackend, LLMBuilder};

    let api_key = match std::env::var(LLM_API_KEY_ENV) {
        Ok(key) => key,
        Err(_) => {
            eprintln!("test test_openai_speech ... ignored, {LLM_API_KEY_ENV} not set");
            return Ok(());
        }
    };
    let tts = LLMBuilder::new()
        .backend(LLMBackend::OpenAI)
        .api_key(api_key)
        .voice("ash")
        .build()?;

    let audio = tts.speech("Inception is a 2010 science fiction film.").await?;
    assert!(!audio.is_empty(), "Expected audio bytes");
    assert_eq!(tts.audio_extension(), "mp3");
    Ok(())
}
