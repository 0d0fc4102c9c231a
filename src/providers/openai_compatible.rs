//! OpenAI-compatible API client base implementation
//!
//! This module provides a generic base for OpenAI-compatible APIs that can be reused
//! across providers such as Groq and OpenAI. It covers streaming chat completions
//! and the `audio/speech` endpoint.

use crate::{
    chat::{create_sse_stream, ChatMessage, ChatProvider, ChatRole, ChatStream},
    error::FinderError,
    tts::TextToSpeechProvider,
};
use async_trait::async_trait;
use either::*;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::time::Duration;

/// Generic OpenAI-compatible provider
///
/// Different providers customize behavior by implementing the `OpenAICompatibleConfig` trait.
pub struct OpenAICompatibleProvider<T: OpenAICompatibleConfig> {
    pub api_key: String,
    pub base_url: Url,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub system: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub speech_model: String,
    pub voice: String,
    pub client: Client,
    _phantom: PhantomData<T>,
}

/// Configuration trait for OpenAI-compatible providers
pub trait OpenAICompatibleConfig: Send + Sync {
    /// The name of the provider (e.g., "Groq", "OpenAI")
    const PROVIDER_NAME: &'static str;

    /// Default base URL for the provider, with a trailing slash
    const DEFAULT_BASE_URL: &'static str;

    /// Default chat model for the provider
    const DEFAULT_MODEL: &'static str;

    /// Chat completions endpoint path
    const CHAT_ENDPOINT: &'static str = "chat/completions";

    /// Speech synthesis endpoint path
    const SPEECH_ENDPOINT: &'static str = "audio/speech";

    /// Default text-to-speech model
    const DEFAULT_SPEECH_MODEL: &'static str;

    /// Default text-to-speech voice
    const DEFAULT_VOICE: &'static str;

    /// Audio container requested from the speech endpoint
    const SPEECH_FORMAT: &'static str = "mp3";

    /// Custom headers to add to requests
    fn custom_headers() -> Option<Vec<(String, String)>> {
        None
    }
}

/// Generic OpenAI-compatible chat message
#[derive(Serialize, Debug)]
pub struct OpenAICompatibleChatMessage<'a> {
    pub role: &'a str,
    #[serde(with = "either::serde_untagged")]
    pub content: Either<Vec<MessageContent<'a>>, &'a str>,
}

#[derive(Serialize, Debug)]
pub struct MessageContent<'a> {
    #[serde(rename = "type")]
    pub message_type: &'a str,
    pub text: &'a str,
}

/// Generic OpenAI-compatible chat request
#[derive(Serialize, Debug)]
pub struct OpenAICompatibleChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<OpenAICompatibleChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub stream: bool,
}

/// Streaming response structures
#[derive(Deserialize, Debug)]
pub struct ChatStreamChunk {
    #[serde(default)]
    pub choices: Vec<ChatStreamChoice>,
    pub error: Option<ChatStreamError>,
}

#[derive(Deserialize, Debug)]
pub struct ChatStreamChoice {
    #[serde(default)]
    pub delta: ChatStreamDelta,
}

#[derive(Deserialize, Debug, Default)]
pub struct ChatStreamDelta {
    pub content: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ChatStreamError {
    pub message: String,
}

#[derive(Serialize, Debug)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

impl<T: OpenAICompatibleConfig> OpenAICompatibleProvider<T> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<String>,
        model: Option<String>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
        timeout_seconds: Option<u64>,
        system: Option<String>,
        speech_model: Option<String>,
        voice: Option<String>,
    ) -> Result<Self, FinderError> {
        let mut builder = Client::builder();
        if let Some(sec) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(sec));
        }

        let base_url = base_url.unwrap_or_else(|| T::DEFAULT_BASE_URL.to_owned());
        // Url::join drops the last path segment unless the base ends with '/'
        let base_url = if base_url.ends_with('/') {
            base_url
        } else {
            format!("{base_url}/")
        };

        Ok(Self {
            api_key: api_key.into(),
            base_url: Url::parse(&base_url).map_err(|e| {
                FinderError::InvalidRequest(format!("invalid base URL {base_url}: {e}"))
            })?,
            model: model.unwrap_or_else(|| T::DEFAULT_MODEL.to_string()),
            max_tokens,
            temperature,
            system,
            timeout_seconds,
            speech_model: speech_model.unwrap_or_else(|| T::DEFAULT_SPEECH_MODEL.to_string()),
            voice: voice.unwrap_or_else(|| T::DEFAULT_VOICE.to_string()),
            client: builder
                .build()
                .map_err(|e| FinderError::HttpError(e.to_string()))?,
            _phantom: PhantomData,
        })
    }

    /// Builds the request body. A configured system prompt goes first.
    pub fn chat_request<'a>(&'a self, messages: &'a [ChatMessage]) -> OpenAICompatibleChatRequest<'a> {
        let mut openai_msgs: Vec<OpenAICompatibleChatMessage> =
            messages.iter().map(chat_message_to_api_message).collect();

        if let Some(system) = &self.system {
            openai_msgs.insert(
                0,
                OpenAICompatibleChatMessage {
                    role: "system",
                    content: Left(vec![MessageContent {
                        message_type: "text",
                        text: system,
                    }]),
                },
            );
        }

        OpenAICompatibleChatRequest {
            model: &self.model,
            messages: openai_msgs,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: true,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, FinderError> {
        self.base_url
            .join(path)
            .map_err(|e| FinderError::HttpError(e.to_string()))
    }

    fn ensure_api_key(&self) -> Result<(), FinderError> {
        if self.api_key.is_empty() {
            return Err(FinderError::AuthError(format!(
                "Missing {} API key",
                T::PROVIDER_NAME
            )));
        }
        Ok(())
    }

    fn authorized(&self, mut request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request = request.bearer_auth(&self.api_key);
        if let Some(headers) = T::custom_headers() {
            for (key, value) in headers {
                request = request.header(key, value);
            }
        }
        if let Some(timeout) = self.timeout_seconds {
            request = request.timeout(Duration::from_secs(timeout));
        }
        request
    }
}

#[async_trait]
impl<T: OpenAICompatibleConfig> ChatProvider for OpenAICompatibleProvider<T> {
    /// Stream chat responses as a stream of text fragments
    async fn chat_stream(&self, messages: &[ChatMessage]) -> Result<ChatStream, FinderError> {
        self.ensure_api_key()?;

        let body = self.chat_request(messages);
        let url = self.endpoint(T::CHAT_ENDPOINT)?;
        let request = self.authorized(self.client.post(url).json(&body));

        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(&body) {
                log::trace!("{} request payload: {}", T::PROVIDER_NAME, json);
            }
        }

        let response = request.send().await?;
        log::debug!("{} HTTP status: {}", T::PROVIDER_NAME, response.status());

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(FinderError::from_status(T::PROVIDER_NAME, status, error_text));
        }

        Ok(create_sse_stream(response.bytes_stream(), parse_stream_chunk))
    }
}

#[async_trait]
impl<T: OpenAICompatibleConfig> TextToSpeechProvider for OpenAICompatibleProvider<T> {
    async fn speech(&self, text: &str) -> Result<Vec<u8>, FinderError> {
        self.ensure_api_key()?;

        let body = SpeechRequest {
            model: &self.speech_model,
            input: text,
            voice: &self.voice,
            response_format: T::SPEECH_FORMAT,
        };
        let url = self.endpoint(T::SPEECH_ENDPOINT)?;
        let resp = self
            .authorized(self.client.post(url).json(&body))
            .send()
            .await?;

        log::debug!("{} speech HTTP status: {}", T::PROVIDER_NAME, resp.status());

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await?;
            return Err(FinderError::from_status(T::PROVIDER_NAME, status, error_text));
        }

        Ok(resp.bytes().await?.to_vec())
    }

    fn audio_extension(&self) -> &'static str {
        T::SPEECH_FORMAT
    }
}

/// Maps a chat message onto the wire format. System prompts use the content-part form.
pub fn chat_message_to_api_message(chat_msg: &ChatMessage) -> OpenAICompatibleChatMessage<'_> {
    OpenAICompatibleChatMessage {
        role: chat_msg.role.as_str(),
        content: match chat_msg.role {
            ChatRole::System => Left(vec![MessageContent {
                message_type: "text",
                text: &chat_msg.content,
            }]),
            ChatRole::User | ChatRole::Assistant => Right(chat_msg.content.as_str()),
        },
    }
}

/// Parses one SSE `data:` payload into its content delta.
///
/// Undecodable payloads and in-band error objects abort the stream.
pub fn parse_stream_chunk(data: &str) -> Result<Option<String>, FinderError> {
    let chunk: ChatStreamChunk =
        serde_json::from_str(data).map_err(|e| FinderError::ResponseFormatError {
            message: format!("Failed to decode stream chunk: {e}"),
            raw_response: data.to_string(),
        })?;

    if let Some(error) = chunk.error {
        return Err(FinderError::ProviderError(error.message));
    }

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestConfig;

    impl OpenAICompatibleConfig for TestConfig {
        const PROVIDER_NAME: &'static str = "Test";
        const DEFAULT_BASE_URL: &'static str = "https://example.invalid/v1/";
        const DEFAULT_MODEL: &'static str = "test-model";
        const DEFAULT_SPEECH_MODEL: &'static str = "test-tts";
        const DEFAULT_VOICE: &'static str = "test-voice";
    }

    fn provider(system: Option<String>) -> OpenAICompatibleProvider<TestConfig> {
        OpenAICompatibleProvider::new(
            "key",
            None,
            None,
            None,
            Some(0.7),
            None,
            system,
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn request_body_has_system_then_user_and_streams() {
        let p = provider(None);
        let messages = vec![
            ChatMessage::system().content("You are a helpful AI movie assistant.").build(),
            ChatMessage::user().content("Suggest a movie after 2019").build(),
        ];
        let json = serde_json::to_value(p.chat_request(&messages)).unwrap();

        assert_eq!(json["model"], "test-model");
        assert_eq!(json["stream"], true);
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!(json.get("max_tokens").is_none());
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(
            json["messages"][0]["content"][0]["text"],
            "You are a helpful AI movie assistant."
        );
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "Suggest a movie after 2019");
    }

    #[test]
    fn configured_system_prompt_is_prepended() {
        let p = provider(Some("be brief".into()));
        let messages = vec![ChatMessage::user().content("hi").build()];
        let json = serde_json::to_value(p.chat_request(&messages)).unwrap();
        assert_eq!(json["messages"].as_array().unwrap().len(), 2);
        assert_eq!(json["messages"][0]["role"], "system");
    }

    #[test]
    fn base_url_without_trailing_slash_keeps_its_path() {
        let p = OpenAICompatibleProvider::<TestConfig>::new(
            "key",
            Some("https://api.groq.com/openai/v1".into()),
            None,
            None,
            None,
            None,
            None,
            None,
            None,
        )
        .unwrap();
        assert_eq!(
            p.endpoint(TestConfig::CHAT_ENDPOINT).unwrap().as_str(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = OpenAICompatibleProvider::<TestConfig>::new(
            "key",
            Some("not a url".into()),
            None,
            None,
            None,
            None,
            None,
            None,
            None,
        );
        assert!(matches!(result, Err(FinderError::InvalidRequest(_))));
    }

    #[test]
    fn parses_content_delta() {
        let data = r#"{"id":"x","choices":[{"index":0,"delta":{"content":"Heat"}}]}"#;
        assert_eq!(parse_stream_chunk(data).unwrap(), Some("Heat".to_string()));
    }

    #[test]
    fn role_only_and_final_chunks_yield_nothing() {
        let role = r#"{"choices":[{"delta":{"role":"assistant","content":""}}]}"#;
        let last = r#"{"choices":[{"delta":{},"finish_reason":"stop"}],"x_groq":{"usage":{}}}"#;
        assert_eq!(parse_stream_chunk(role).unwrap(), None);
        assert_eq!(parse_stream_chunk(last).unwrap(), None);
    }

    #[test]
    fn in_band_error_aborts() {
        let data = r#"{"error":{"message":"model overloaded"}}"#;
        assert!(matches!(
            parse_stream_chunk(data),
            Err(FinderError::ProviderError(ref m)) if m == "model overloaded"
        ));
    }

    #[test]
    fn malformed_chunk_aborts() {
        assert!(matches!(
            parse_stream_chunk("{not json"),
            Err(FinderError::ResponseFormatError { .. })
        ));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let p = OpenAICompatibleProvider::<TestConfig>::new(
            "", None, None, None, None, None, None, None, None,
        )
        .unwrap();
        let messages = vec![ChatMessage::user().content("hi").build()];
        assert!(matches!(
            p.chat_stream(&messages).await,
            Err(FinderError::AuthError(_))
        ));
        assert!(matches!(p.speech("hi").await, Err(FinderError::AuthError(_))));
    }
}
