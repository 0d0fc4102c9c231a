//! Builder module for configuring and instantiating chat and speech providers.
//!
//! The same builder produces the chat client (`groq`, `openai`) and the speech
//! client (`google-translate`, `groq`, `openai`); the backend decides which
//! capabilities actually work.

use crate::{error::FinderError, LLMProvider};
use std::fmt;

/// Supported backend providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LLMBackend {
    /// Groq OpenAI-compatible API (chat and speech)
    Groq,
    /// OpenAI API (chat and speech)
    OpenAI,
    /// Google Translate speech endpoint (speech only, no key)
    GoogleTranslate,
}

impl LLMBackend {
    /// Environment variable holding the API key for this backend, if it needs one.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            LLMBackend::Groq => Some("GROQ_API_KEY"),
            LLMBackend::OpenAI => Some("OPENAI_API_KEY"),
            LLMBackend::GoogleTranslate => None,
        }
    }
}

/// Implements string parsing for LLMBackend enum.
///
/// The parsing is case-insensitive.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use movie_finder::builder::LLMBackend;
///
/// let backend = LLMBackend::from_str("groq").unwrap();
/// assert_eq!(backend, LLMBackend::Groq);
///
/// let err = LLMBackend::from_str("invalid").unwrap_err();
/// assert!(err.to_string().contains("Unknown backend"));
/// ```
impl std::str::FromStr for LLMBackend {
    type Err = FinderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "groq" => Ok(LLMBackend::Groq),
            "openai" => Ok(LLMBackend::OpenAI),
            "google-translate" | "google_translate" | "gtts" => Ok(LLMBackend::GoogleTranslate),
            _ => Err(FinderError::InvalidRequest(format!("Unknown backend: {s}"))),
        }
    }
}

impl fmt::Display for LLMBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LLMBackend::Groq => write!(f, "groq"),
            LLMBackend::OpenAI => write!(f, "openai"),
            LLMBackend::GoogleTranslate => write!(f, "google-translate"),
        }
    }
}

/// Builder for configuring and instantiating providers.
#[derive(Debug, Default, Clone)]
pub struct LLMBuilder {
    /// Selected backend provider
    backend: Option<LLMBackend>,
    /// API key for authentication with the provider
    api_key: Option<String>,
    /// Base URL for API requests
    base_url: Option<String>,
    /// Chat model identifier
    model: Option<String>,
    /// Maximum tokens to generate in responses
    max_tokens: Option<u32>,
    /// Temperature parameter for controlling response randomness
    temperature: Option<f32>,
    /// System prompt prepended to every request
    system: Option<String>,
    /// Request timeout duration in seconds
    timeout_seconds: Option<u64>,
    /// Text-to-speech model identifier
    speech_model: Option<String>,
    /// Voice used for speech synthesis
    voice: Option<String>,
    /// Spoken language for key-less speech
    language: Option<String>,
}

impl LLMBuilder {
    /// Creates a new empty builder instance with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backend provider to use.
    pub fn backend(mut self, backend: LLMBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Sets the API key for authentication.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL for API requests.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the chat model identifier to use.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the maximum number of tokens to generate.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the temperature for controlling response randomness.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the system prompt/context.
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Sets the request timeout in seconds.
    pub fn timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    /// Sets the text-to-speech model.
    pub fn speech_model(mut self, model: impl Into<String>) -> Self {
        self.speech_model = Some(model.into());
        self
    }

    /// Sets the voice used for speech synthesis.
    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    /// Sets the spoken language (key-less speech only).
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Builds and returns a configured provider instance.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No backend is specified
    /// - Required backend feature is not enabled
    /// - The backend needs an API key and none was given
    /// - The base URL does not parse
    pub fn build(self) -> Result<Box<dyn LLMProvider>, FinderError> {
        let backend = self
            .backend
            .ok_or_else(|| FinderError::InvalidRequest("No backend specified".to_string()))?;

        log::debug!("building {backend} provider");

        #[allow(unused_variables)]
        let provider: Box<dyn LLMProvider> = match backend {
            LLMBackend::Groq => {
                #[cfg(not(feature = "groq"))]
                return Err(FinderError::InvalidRequest(
                    "Groq feature not enabled".to_string(),
                ));

                #[cfg(feature = "groq")]
                {
                    let key = self.api_key.ok_or_else(|| {
                        FinderError::AuthError("No API key provided for Groq".to_string())
                    })?;
                    Box::new(crate::backends::groq::Groq::new(
                        key,
                        self.base_url,
                        self.model,
                        self.max_tokens,
                        self.temperature,
                        self.timeout_seconds,
                        self.system,
                        self.speech_model,
                        self.voice,
                    )?)
                }
            }
            LLMBackend::OpenAI => {
                #[cfg(not(feature = "openai"))]
                return Err(FinderError::InvalidRequest(
                    "OpenAI feature not enabled".to_string(),
                ));

                #[cfg(feature = "openai")]
                {
                    let key = self.api_key.ok_or_else(|| {
                        FinderError::AuthError("No API key provided for OpenAI".to_string())
                    })?;
                    Box::new(crate::backends::openai::OpenAI::new(
                        key,
                        self.base_url,
                        self.model,
                        self.max_tokens,
                        self.temperature,
                        self.timeout_seconds,
                        self.system,
                        self.speech_model,
                        self.voice,
                    )?)
                }
            }
            LLMBackend::GoogleTranslate => {
                #[cfg(not(feature = "google_translate"))]
                return Err(FinderError::InvalidRequest(
                    "Google Translate feature not enabled".to_string(),
                ));

                #[cfg(feature = "google_translate")]
                {
                    Box::new(crate::backends::google_translate::GoogleTranslate::new(
                        self.base_url,
                        self.language,
                        self.timeout_seconds,
                    ))
                }
            }
        };

        #[allow(unreachable_code)]
        Ok(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_backend_names() {
        assert_eq!(LLMBackend::from_str("GROQ").unwrap(), LLMBackend::Groq);
        assert_eq!(LLMBackend::from_str("openai").unwrap(), LLMBackend::OpenAI);
        assert_eq!(
            LLMBackend::from_str("gtts").unwrap(),
            LLMBackend::GoogleTranslate
        );
        assert_eq!(LLMBackend::GoogleTranslate.to_string(), "google-translate");
    }

    #[test]
    fn missing_backend_is_rejected() {
        assert!(matches!(
            LLMBuilder::new().build(),
            Err(FinderError::InvalidRequest(_))
        ));
    }

    #[cfg(feature = "groq")]
    #[test]
    fn groq_requires_a_key() {
        let result = LLMBuilder::new().backend(LLMBackend::Groq).build();
        assert!(matches!(result, Err(FinderError::AuthError(_))));
    }

    #[cfg(feature = "google_translate")]
    #[test]
    fn google_translate_needs_no_key() {
        let tts = LLMBuilder::new()
            .backend(LLMBackend::GoogleTranslate)
            .build()
            .unwrap();
        assert_eq!(tts.audio_extension(), "mp3");
    }
}
